//! # shred-schema — Self-Describing JSON Validation
//!
//! Validates self-describing JSON instances (`{"schema": "...", "data":
//! {...}}` envelopes) against schemas resolved from a
//! [`SchemaRepository`](shred_registry::SchemaRepository).
//!
//! The [`EnvelopeValidator`] is the single validation interface of the
//! shredder: it is parameterized by the resolved schema document, never by
//! per-schema generated code, so one validator instance covers every
//! schema the registry can resolve.
//!
//! ## Error Accumulation
//!
//! Validation is a trust boundary: instances that fail are rejected with a
//! structured error per violated constraint, including the JSON-Pointer
//! path of the violating field. Constraint checking never stops at the
//! first violation.

pub mod validate;

pub use validate::{
    json_kind, EnvelopeValidator, SchemaBuildError, SelfDescribing, Violation,
};
