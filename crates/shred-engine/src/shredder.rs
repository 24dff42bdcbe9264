//! # Shredder — Orchestrator
//!
//! Runs the two validation lanes over one canonical event and merges the
//! results:
//!
//! 1. **Unstructured-event lane** — `ue_properties`, one schema-enveloped
//!    object, at most one document.
//! 2. **Context lane** — `contexts`, a JSON array of schema-enveloped
//!    objects, one document per element, each validated independently with
//!    indexed error attribution.
//!
//! The lanes are independent: a failure in one never suppresses the
//! diagnostics of the other. Errors accumulate across lanes and across
//! context elements, and the event fails as a whole or not at all;
//! partial output would break the all-or-nothing lineage contract the
//! downstream store relies on. Failed events are triaged once, so one
//! shredding pass must report every defect.

use std::sync::Arc;

use serde_json::Value;

use shred_core::validated::collect_all;
use shred_core::Validated;
use shred_registry::SchemaRepository;
use shred_schema::{json_kind, EnvelopeValidator, SelfDescribing};

use crate::event::CanonicalEvent;
use crate::extract::extract_json_field;
use crate::lineage::{attach_lineage, ShreddedDocument};

/// Input field carrying the unstructured-event JSON.
pub const UE_PROPERTIES_FIELD: &str = "ue_properties";

/// Error-attribution name for the contexts field.
pub const CONTEXT_FIELD: &str = "context";

/// Shreds canonical events against a schema repository.
///
/// One instance may be shared across worker threads; `shred` is a pure
/// function of the event plus read-only repository access, and shredding
/// the same event twice against the same repository state yields identical
/// output.
pub struct Shredder<R> {
    validator: EnvelopeValidator<R>,
}

impl<R: SchemaRepository + 'static> Shredder<R> {
    /// Create a shredder resolving schemas through `registry`.
    pub fn new(registry: Arc<R>) -> Self {
        Self {
            validator: EnvelopeValidator::new(registry),
        }
    }

    /// Shred one event into its lineage-stamped documents, or the full
    /// list of reasons it cannot be shredded.
    ///
    /// An event with neither embedded payload is valid and shreds to an
    /// empty list.
    pub fn shred(&self, event: &CanonicalEvent) -> Validated<Vec<ShreddedDocument>> {
        let unstruct = self.unstruct_lane(event);
        let contexts = self.context_lane(event);
        unstruct
            .zip_with(contexts, |mut documents, context_documents| {
                documents.extend(context_documents);
                documents
            })
            .map(|documents| attach_lineage(documents, event))
    }

    /// Extract and validate the unstructured-event payload: at most one
    /// schema-enveloped object.
    fn unstruct_lane(&self, event: &CanonicalEvent) -> Validated<Vec<SelfDescribing>> {
        match extract_json_field(UE_PROPERTIES_FIELD, event.ue_properties.as_deref()) {
            Ok(None) => Validated::Valid(Vec::new()),
            Ok(Some(instance)) => self
                .validator
                .validate(UE_PROPERTIES_FIELD, &instance, true)
                .map(|document| document.into_iter().collect()),
            Err(e) => Validated::from_error(e),
        }
    }

    /// Extract the contexts array and validate every element
    /// independently, accumulating all failures.
    fn context_lane(&self, event: &CanonicalEvent) -> Validated<Vec<SelfDescribing>> {
        let elements = match extract_json_field(CONTEXT_FIELD, event.contexts.as_deref()) {
            Ok(None) => return Validated::Valid(Vec::new()),
            Ok(Some(Value::Array(elements))) => elements,
            Ok(Some(other)) => {
                return Validated::fail(
                    CONTEXT_FIELD,
                    format!(
                        "expected a JSON array of context objects, got {}",
                        json_kind(&other)
                    ),
                );
            }
            Err(e) => return Validated::from_error(e),
        };

        collect_all(elements.iter().enumerate().map(|(index, element)| {
            self.validator
                .validate(&format!("{CONTEXT_FIELD}[{index}]"), element, true)
                .map(|document| document.into_iter().collect::<Vec<_>>())
        }))
        .map(|nested| nested.into_iter().flatten().collect())
    }
}
