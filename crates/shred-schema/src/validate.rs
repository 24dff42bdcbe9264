//! # Envelope Validation
//!
//! Runtime validation of self-describing JSON instances against schemas
//! resolved from the repository.
//!
//! ## Resolution
//!
//! The envelope's `schema` key carries an `iglu:` URI; it is parsed into a
//! [`SchemaKey`] and resolved through the repository. `$ref` URIs inside
//! schema documents resolve through the same repository via a custom
//! retriever, so validation never reaches the network. Each schema's own
//! `$schema` declaration selects the JSON Schema draft.
//!
//! ## Failure Policy
//!
//! Every failure on this path becomes [`ShredError`] data attributed to the
//! caller-supplied field name: shape errors (non-object instance, missing
//! envelope keys, malformed references), resolution errors (unknown or
//! unreadable keys; any repository failure is terminal, the validator
//! performs no retries), and constraint errors (one per violated rule, via
//! `iter_errors`, accumulated to the end).

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use jsonschema::{Retrieve, Uri, Validator};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use shred_core::{SchemaKey, ShredError, Validated};
use shred_registry::{RegistryError, SchemaRepository};

/// Envelope key naming the schema.
const SCHEMA_KEY: &str = "schema";
/// Envelope key holding the payload.
const DATA_KEY: &str = "data";

/// A validated payload stripped of its envelope and tagged with its
/// resolved schema key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelfDescribing {
    /// The resolved schema identity.
    pub schema: SchemaKey,
    /// The validated payload.
    pub data: Value,
}

/// A single schema constraint violation with structured context.
#[derive(Debug, Clone)]
pub struct Violation {
    /// JSON Pointer path to the violating field in the instance.
    pub instance_path: String,
    /// JSON Pointer path within the schema that triggered the error.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.instance_path, self.message)
        }
    }
}

/// Error resolving or compiling a schema document.
#[derive(Error, Debug)]
pub enum SchemaBuildError {
    /// The schema reference did not resolve in the repository.
    #[error("unresolvable schema: {0}")]
    Unresolvable(#[from] RegistryError),

    /// The resolved document is not a compilable JSON Schema.
    #[error("schema {key} does not compile: {reason}")]
    Uncompilable {
        /// The key whose document failed to compile.
        key: SchemaKey,
        /// Compiler detail.
        reason: String,
    },
}

/// Resolves `$ref` URIs inside schema documents through the repository.
///
/// This prevents the jsonschema crate from making network requests for
/// cross-schema references: `iglu:` URIs resolve against the registry, and
/// anything else (draft metaschemas, stray absolute URIs) resolves to a
/// permissive schema so compilation proceeds locally.
struct RegistryRetriever<R> {
    registry: Arc<R>,
}

impl<R: SchemaRepository> Retrieve for RegistryRetriever<R> {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        if let Ok(key) = SchemaKey::parse(uri.as_str()) {
            if let Ok(schema) = self.registry.resolve(&key) {
                return Ok((*schema).clone());
            }
        }
        Ok(serde_json::json!({}))
    }
}

/// Validates self-describing JSON instances against registry schemas.
///
/// ## Thread Safety
///
/// `EnvelopeValidator` is `Send + Sync`; compiled validators are cached
/// per key behind an `RwLock` and shared across concurrent shredding
/// calls. Aside from repository reads and cache fills, validation is
/// idempotent and side-effect-free.
pub struct EnvelopeValidator<R> {
    registry: Arc<R>,
    compiled: RwLock<HashMap<SchemaKey, Arc<Validator>>>,
}

impl<R: SchemaRepository + 'static> EnvelopeValidator<R> {
    /// Create a validator resolving schemas through `registry`.
    pub fn new(registry: Arc<R>) -> Self {
        Self {
            registry,
            compiled: RwLock::new(HashMap::new()),
        }
    }

    /// Validate one instance presumed to carry a schema envelope.
    ///
    /// `field` names the input position for error attribution.
    /// `require_envelope` controls the treatment of instances without a
    /// `schema` key: at positions where the envelope is mandatory its
    /// absence is a failure; otherwise the payload passes through
    /// unvalidated as `Valid(None)`.
    ///
    /// On success returns the payload stripped of its envelope and tagged
    /// with the resolved key. On failure returns every accumulated error:
    /// shape, resolution, and constraint failures all surface as
    /// field-attributed [`ShredError`]s.
    pub fn validate(
        &self,
        field: &str,
        instance: &Value,
        require_envelope: bool,
    ) -> Validated<Option<SelfDescribing>> {
        let Some(envelope) = instance.as_object() else {
            return Validated::fail(
                field,
                format!("expected a JSON object, got {}", json_kind(instance)),
            );
        };

        let reference = match envelope.get(SCHEMA_KEY) {
            None if require_envelope => {
                return Validated::fail(
                    field,
                    "missing schema reference (no \"schema\" key on instance)",
                );
            }
            None => return Validated::Valid(None),
            Some(Value::String(reference)) => reference,
            Some(other) => {
                return Validated::fail(
                    field,
                    format!("schema reference must be a string, got {}", json_kind(other)),
                );
            }
        };

        let key = match SchemaKey::parse(reference) {
            Ok(key) => key,
            Err(e) => return Validated::fail(field, e.to_string()),
        };

        let Some(data) = envelope.get(DATA_KEY) else {
            return Validated::fail(
                field,
                format!("self-describing instance for {key} has no \"data\" payload"),
            );
        };

        let validator = match self.compiled_for(&key) {
            Ok(validator) => validator,
            Err(e) => return Validated::fail(field, e.to_string()),
        };

        let violations: Vec<ShredError> = validator
            .iter_errors(data)
            .map(|e| {
                let violation = Violation {
                    instance_path: e.instance_path.to_string(),
                    schema_path: e.schema_path.to_string(),
                    message: e.to_string(),
                };
                ShredError::new(field, violation.to_string())
            })
            .collect();

        if violations.is_empty() {
            Validated::Valid(Some(SelfDescribing {
                schema: key,
                data: data.clone(),
            }))
        } else {
            Validated::Invalid(violations)
        }
    }

    /// Resolve and compile the schema for `key` without validating
    /// anything against it. Used by registry linting.
    pub fn precompile(&self, key: &SchemaKey) -> Result<(), SchemaBuildError> {
        self.compiled_for(key).map(|_| ())
    }

    /// Number of schemas compiled so far.
    pub fn compiled_count(&self) -> usize {
        self.compiled
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Fetch the compiled validator for `key`, building and caching it on
    /// first use.
    fn compiled_for(&self, key: &SchemaKey) -> Result<Arc<Validator>, SchemaBuildError> {
        if let Some(validator) = self
            .compiled
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
        {
            return Ok(Arc::clone(validator));
        }

        let schema = self.registry.resolve(key)?;

        let validator = jsonschema::options()
            .with_retriever(RegistryRetriever {
                registry: Arc::clone(&self.registry),
            })
            .build(&schema)
            .map_err(|e| SchemaBuildError::Uncompilable {
                key: key.clone(),
                reason: e.to_string(),
            })?;

        let validator = Arc::new(validator);
        self.compiled
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone(), Arc::clone(&validator));
        Ok(validator)
    }
}

/// A short, article-prefixed name for a JSON value's type, for error
/// messages.
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shred_registry::InMemoryRegistry;

    fn click_key() -> SchemaKey {
        SchemaKey::parse("iglu:com.acme/click/jsonschema/1-0-0").unwrap()
    }

    fn click_schema() -> Value {
        json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "self": {
                "vendor": "com.acme",
                "name": "click",
                "format": "jsonschema",
                "version": "1-0-0",
            },
            "type": "object",
            "properties": {
                "target": {"type": "string"},
                "count": {"type": "integer", "minimum": 0},
            },
            "required": ["target"],
            "additionalProperties": false,
        })
    }

    fn validator() -> EnvelopeValidator<InMemoryRegistry> {
        let registry = InMemoryRegistry::new().with_schema(click_key(), click_schema());
        EnvelopeValidator::new(Arc::new(registry))
    }

    fn errors(validated: Validated<Option<SelfDescribing>>) -> Vec<ShredError> {
        match validated {
            Validated::Invalid(errors) => errors,
            Validated::Valid(v) => panic!("expected Invalid, got Valid({v:?})"),
        }
    }

    #[test]
    fn test_valid_instance() {
        let instance = json!({
            "schema": "iglu:com.acme/click/jsonschema/1-0-0",
            "data": {"target": "button"},
        });
        let result = validator().validate("ue_properties", &instance, true);
        match result {
            Validated::Valid(Some(doc)) => {
                assert_eq!(doc.schema, click_key());
                assert_eq!(doc.data, json!({"target": "button"}));
            }
            other => panic!("expected valid self-describing doc, got {other:?}"),
        }
    }

    #[test]
    fn test_non_object_instance() {
        let result = validator().validate("context[0]", &json!([1, 2]), true);
        let errs = errors(result);
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].field, "context[0]");
        assert!(errs[0].message.contains("expected a JSON object, got an array"));
    }

    #[test]
    fn test_missing_envelope_required() {
        let result = validator().validate("ue_properties", &json!({"target": "x"}), true);
        let errs = errors(result);
        assert_eq!(errs.len(), 1);
        assert!(errs[0].message.contains("missing schema reference"));
    }

    #[test]
    fn test_missing_envelope_optional_passes_through() {
        let result = validator().validate("ue_properties", &json!({"target": "x"}), false);
        assert_eq!(result, Validated::Valid(None));
    }

    #[test]
    fn test_non_string_schema_reference() {
        let instance = json!({"schema": 42, "data": {}});
        let errs = errors(validator().validate("ue_properties", &instance, true));
        assert!(errs[0].message.contains("schema reference must be a string"));
    }

    #[test]
    fn test_malformed_schema_reference() {
        let instance = json!({"schema": "com.acme/click/jsonschema/1-0-0", "data": {}});
        let errs = errors(validator().validate("ue_properties", &instance, true));
        assert!(errs[0].message.contains("missing the iglu: scheme"));
    }

    #[test]
    fn test_missing_data_payload() {
        let instance = json!({"schema": "iglu:com.acme/click/jsonschema/1-0-0"});
        let errs = errors(validator().validate("ue_properties", &instance, true));
        assert!(errs[0].message.contains("no \"data\" payload"));
    }

    #[test]
    fn test_unresolvable_schema_single_error_names_key() {
        let instance = json!({
            "schema": "iglu:com.acme/missing/jsonschema/1-0-0",
            "data": {},
        });
        let errs = errors(validator().validate("ue_properties", &instance, true));
        assert_eq!(errs.len(), 1);
        assert!(errs[0].message.contains("unresolvable schema"));
        assert!(errs[0]
            .message
            .contains("iglu:com.acme/missing/jsonschema/1-0-0"));
    }

    #[test]
    fn test_version_mismatch_is_unresolvable() {
        // Only 1-0-0 is registered; an event emitted against 1-0-1 fails
        // resolution rather than being coerced.
        let instance = json!({
            "schema": "iglu:com.acme/click/jsonschema/1-0-1",
            "data": {"target": "button"},
        });
        let errs = errors(validator().validate("ue_properties", &instance, true));
        assert_eq!(errs.len(), 1);
        assert!(errs[0].message.contains("unresolvable schema"));
    }

    #[test]
    fn test_constraint_violations_accumulate() {
        // Missing required "target" AND non-integer "count": both reported.
        let instance = json!({
            "schema": "iglu:com.acme/click/jsonschema/1-0-0",
            "data": {"count": "many"},
        });
        let errs = errors(validator().validate("context[3]", &instance, true));
        assert!(errs.len() >= 2, "expected both violations, got {errs:?}");
        assert!(errs.iter().all(|e| e.field == "context[3]"));
        assert!(errs.iter().any(|e| e.message.contains("target")));
        assert!(errs.iter().any(|e| e.message.contains("count")));
    }

    #[test]
    fn test_violation_paths_in_messages() {
        let instance = json!({
            "schema": "iglu:com.acme/click/jsonschema/1-0-0",
            "data": {"target": "x", "count": -3},
        });
        let errs = errors(validator().validate("ue_properties", &instance, true));
        assert!(
            errs.iter().any(|e| e.message.contains("/count")),
            "expected a JSON-Pointer path in {errs:?}"
        );
    }

    #[test]
    fn test_compiled_validator_cached() {
        let v = validator();
        let instance = json!({
            "schema": "iglu:com.acme/click/jsonschema/1-0-0",
            "data": {"target": "a"},
        });
        assert_eq!(v.compiled_count(), 0);
        assert!(v.validate("ue_properties", &instance, true).is_valid());
        assert_eq!(v.compiled_count(), 1);
        assert!(v.validate("ue_properties", &instance, true).is_valid());
        assert_eq!(v.compiled_count(), 1);
    }

    #[test]
    fn test_precompile_reports_uncompilable() {
        let key = click_key();
        let registry = InMemoryRegistry::new()
            .with_schema(key.clone(), json!({"type": "not-a-real-type"}));
        let v = EnvelopeValidator::new(Arc::new(registry));
        let err = v.precompile(&key).unwrap_err();
        assert!(matches!(err, SchemaBuildError::Uncompilable { .. }));
    }

    #[test]
    fn test_precompile_reports_unresolvable() {
        let v = EnvelopeValidator::new(Arc::new(InMemoryRegistry::new()));
        let err = v.precompile(&click_key()).unwrap_err();
        assert!(matches!(err, SchemaBuildError::Unresolvable(_)));
    }

    #[test]
    fn test_cross_schema_ref_resolves_through_registry() {
        let parent_key = SchemaKey::parse("iglu:com.acme/parent/jsonschema/1-0-0").unwrap();
        let child_key = SchemaKey::parse("iglu:com.acme/geo/jsonschema/1-0-0").unwrap();
        let registry = InMemoryRegistry::new()
            .with_schema(
                parent_key,
                json!({
                    "type": "object",
                    "properties": {
                        "geo": {"$ref": "iglu:com.acme/geo/jsonschema/1-0-0"},
                    },
                    "required": ["geo"],
                }),
            )
            .with_schema(
                child_key,
                json!({
                    "type": "object",
                    "properties": {"lat": {"type": "number"}},
                    "required": ["lat"],
                }),
            );
        let v = EnvelopeValidator::new(Arc::new(registry));

        let valid = json!({
            "schema": "iglu:com.acme/parent/jsonschema/1-0-0",
            "data": {"geo": {"lat": 1.5}},
        });
        assert!(v.validate("ue_properties", &valid, true).is_valid());

        let invalid = json!({
            "schema": "iglu:com.acme/parent/jsonschema/1-0-0",
            "data": {"geo": {}},
        });
        assert!(!v.validate("ue_properties", &invalid, true).is_valid());
    }

    #[test]
    fn test_violation_display_root() {
        let violation = Violation {
            instance_path: String::new(),
            schema_path: "/required".to_string(),
            message: r#""target" is a required property"#.to_string(),
        };
        assert!(violation.to_string().starts_with("(root): "));
    }

    #[test]
    fn test_violation_display_with_path() {
        let violation = Violation {
            instance_path: "/count".to_string(),
            schema_path: "/properties/count/minimum".to_string(),
            message: "-3 is less than the minimum of 0".to_string(),
        };
        assert_eq!(
            violation.to_string(),
            "/count: -3 is less than the minimum of 0"
        );
    }
}
