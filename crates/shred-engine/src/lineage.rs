//! # Lineage — Joining Shredded Output Back to Its Root Event
//!
//! Every shredded document carries the identity of the event it came from
//! and its position in the event's document tree. Downstream storage joins
//! per-schema tables back to the root events table on these columns, so
//! they must be copied exactly: a document whose `root_id` or
//! `root_tstamp` differs from its parent event is silently unjoinable.
//!
//! Lineage is stamped in one pure pass over the merged document list,
//! after both validation lanes have finished; the validators never see or
//! mutate lineage state.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use shred_core::{SchemaKey, Timestamp};
use shred_schema::SelfDescribing;

use crate::event::{CanonicalEvent, EventId};

/// Identity of the root event table in lineage columns.
pub const REF_ROOT: &str = "events";

/// One unit of shredded output: a validated, schema-tagged payload plus
/// the lineage columns tying it to its root event.
///
/// The unstructured event and every context are direct children of the
/// root (contexts are siblings of each other, not nested), so `ref_tree`
/// and `ref_parent` both point straight at [`REF_ROOT`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShreddedDocument {
    /// The resolved schema identity of this document.
    pub schema: SchemaKey,
    /// The validated payload, stripped of its envelope.
    pub data: Value,
    /// Identifier of the originating event.
    pub root_id: EventId,
    /// Timestamp of the originating event.
    pub root_tstamp: Timestamp,
    /// Root event type.
    pub ref_root: String,
    /// Ordered path from the root to this document.
    pub ref_tree: Vec<String>,
    /// Identity of this document's immediate parent in the tree.
    pub ref_parent: String,
}

/// Stamp lineage onto validated documents.
///
/// A pure post-processing pass: every document receives the same root
/// identifiers from `event`, preserving list order (unstructured event
/// first, then contexts in array order).
pub fn attach_lineage(
    documents: Vec<SelfDescribing>,
    event: &CanonicalEvent,
) -> Vec<ShreddedDocument> {
    documents
        .into_iter()
        .map(|doc| ShreddedDocument {
            schema: doc.schema,
            data: doc.data,
            root_id: event.root_id.clone(),
            root_tstamp: event.root_tstamp,
            ref_root: REF_ROOT.to_string(),
            ref_tree: vec![REF_ROOT.to_string()],
            ref_parent: REF_ROOT.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event() -> CanonicalEvent {
        CanonicalEvent {
            root_id: EventId::new("e1"),
            root_tstamp: Timestamp::parse("2014-01-01T00:00:00Z").unwrap(),
            ue_properties: None,
            contexts: None,
        }
    }

    fn doc(name: &str) -> SelfDescribing {
        SelfDescribing {
            schema: SchemaKey::new("com.acme", name, "jsonschema", "1-0-0").unwrap(),
            data: json!({"n": name}),
        }
    }

    #[test]
    fn test_every_document_carries_root_identity() {
        let stamped = attach_lineage(vec![doc("click"), doc("page")], &event());
        assert_eq!(stamped.len(), 2);
        for d in &stamped {
            assert_eq!(d.root_id, EventId::new("e1"));
            assert_eq!(d.root_tstamp.to_iso8601(), "2014-01-01T00:00:00Z");
            assert_eq!(d.ref_root, "events");
            assert_eq!(d.ref_tree, vec!["events".to_string()]);
            assert_eq!(d.ref_parent, "events");
        }
    }

    #[test]
    fn test_order_preserved() {
        let stamped = attach_lineage(vec![doc("first"), doc("second")], &event());
        assert_eq!(stamped[0].schema.name(), "first");
        assert_eq!(stamped[1].schema.name(), "second");
    }

    #[test]
    fn test_empty_list_stays_empty() {
        assert!(attach_lineage(vec![], &event()).is_empty());
    }

    #[test]
    fn test_document_serializes_flat() {
        let stamped = attach_lineage(vec![doc("click")], &event());
        let json = serde_json::to_value(&stamped[0]).unwrap();
        assert_eq!(json["schema"], "iglu:com.acme/click/jsonschema/1-0-0");
        assert_eq!(json["root_id"], "e1");
        assert_eq!(json["root_tstamp"], "2014-01-01T00:00:00Z");
        assert_eq!(json["ref_tree"], json!(["events"]));
    }
}
