//! # shred-engine — JSON Shredding
//!
//! Turns one canonical event into either a flat list of schema-tagged,
//! lineage-stamped documents or the full list of reasons it cannot be
//! shredded.
//!
//! ## Pipeline
//!
//! 1. [`extract`] — pull the embedded JSON strings (`ue_properties`,
//!    `contexts`) out of the event; absence is not an error, malformed
//!    JSON is.
//! 2. [`shredder`] — validate the unstructured-event object and every
//!    context-array element independently, accumulating errors across
//!    both lanes; the event fails as a whole or not at all.
//! 3. [`lineage`] — stamp `root_id`/`root_tstamp`/`ref_*` onto the merged
//!    document list in one post-processing pass.
//! 4. [`tabular`] — project each document to the flat row of its
//!    per-schema table, serialized canonically so identical events shred
//!    to identical bytes.
//!
//! Shredding is a pure, synchronous function of one event plus read access
//! to the schema repository; calls are independent and may run in parallel
//! across worker threads.

pub mod event;
pub mod extract;
pub mod lineage;
pub mod shredder;
pub mod tabular;

pub use event::{CanonicalEvent, EventId};
pub use extract::extract_json_field;
pub use lineage::{attach_lineage, ShreddedDocument, REF_ROOT};
pub use shredder::{Shredder, CONTEXT_FIELD, UE_PROPERTIES_FIELD};
pub use tabular::TabularError;
