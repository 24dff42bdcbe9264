//! # Validated — Accumulating Result
//!
//! [`Validated<T>`] is the shredder's result type: either a valid value or
//! a non-empty list of [`ShredError`]s. Unlike `Result`, the combining
//! operations merge error lists from both sides instead of short-circuiting
//! on the first failure, so one shredding pass reports every defect in an
//! event. Failed events are triaged once in a failed-events store;
//! re-triage is expensive.
//!
//! Sequencing within one computation (parse, then validate) still uses
//! [`Validated::and_then`], which short-circuits: there is nothing to
//! validate once parsing has failed. Accumulation happens *across*
//! independent computations, via [`Validated::zip_with`] and
//! [`collect_all`].

use serde::{Deserialize, Serialize};

use crate::error::ShredError;

/// A value that is either valid or carries the full list of reasons it is
/// not.
///
/// # Invariant
///
/// `Invalid` holds a non-empty error list. All constructors and combinators
/// in this module preserve that invariant; code building `Invalid` directly
/// must supply at least one error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Validated<T> {
    /// The computation succeeded.
    Valid(T),
    /// The computation failed; every accumulated reason, in input order.
    Invalid(Vec<ShredError>),
}

impl<T> Validated<T> {
    /// A failed computation with a single field-attributed error.
    pub fn fail(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid(vec![ShredError::new(field, message)])
    }

    /// A failed computation from an already-built error.
    pub fn from_error(error: ShredError) -> Self {
        Self::Invalid(vec![error])
    }

    /// Whether this is `Valid`.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// Apply `f` to the valid value, passing errors through.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Validated<U> {
        match self {
            Self::Valid(value) => Validated::Valid(f(value)),
            Self::Invalid(errors) => Validated::Invalid(errors),
        }
    }

    /// Sequence a dependent computation. Short-circuits: if `self` is
    /// already invalid, `f` never runs. Use [`Validated::zip_with`] for
    /// independent computations whose errors should accumulate.
    pub fn and_then<U>(self, f: impl FnOnce(T) -> Validated<U>) -> Validated<U> {
        match self {
            Self::Valid(value) => f(value),
            Self::Invalid(errors) => Validated::Invalid(errors),
        }
    }

    /// Combine two independent computations, accumulating errors.
    ///
    /// If both sides are valid, `f` merges the values. If either side is
    /// invalid, the result is invalid and carries the errors of *both*
    /// sides, `self`'s first.
    pub fn zip_with<U, V>(
        self,
        other: Validated<U>,
        f: impl FnOnce(T, U) -> V,
    ) -> Validated<V> {
        match (self, other) {
            (Self::Valid(a), Validated::Valid(b)) => Validated::Valid(f(a, b)),
            (Self::Invalid(mut left), Validated::Invalid(right)) => {
                left.extend(right);
                Validated::Invalid(left)
            }
            (Self::Invalid(errors), Validated::Valid(_))
            | (Self::Valid(_), Validated::Invalid(errors)) => Validated::Invalid(errors),
        }
    }

    /// Convert to a `Result` at the framework boundary.
    pub fn into_result(self) -> Result<T, Vec<ShredError>> {
        match self {
            Self::Valid(value) => Ok(value),
            Self::Invalid(errors) => Err(errors),
        }
    }
}

/// Collect many independent computations, accumulating every error.
///
/// Valid values are collected in input order; if any computation failed,
/// the result is invalid and carries all errors from all failed
/// computations, in input order. An empty iterator is `Valid(vec![])`.
pub fn collect_all<T>(items: impl IntoIterator<Item = Validated<T>>) -> Validated<Vec<T>> {
    let mut values = Vec::new();
    let mut errors = Vec::new();
    for item in items {
        match item {
            Validated::Valid(value) => values.push(value),
            Validated::Invalid(item_errors) => errors.extend(item_errors),
        }
    }
    if errors.is_empty() {
        Validated::Valid(values)
    } else {
        Validated::Invalid(errors)
    }
}
