//! Verification failure taxonomy.
//!
//! # Design
//! Every comparison entry point fails fast with the first differing field.
//! `Mismatch` always carries the field name plus both values so a failing
//! test names the exact divergence instead of dumping two whole messages.
//! `MissingHeader` is split out from `Mismatch` because "header absent" and
//! "header present with the wrong value" are different bugs in practice.

use std::fmt;

use crate::failure::CanonicalErrorCode;

/// Errors reported by the comparison and failure-assertion entry points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    /// A specific field differs between expected and actual.
    Mismatch {
        field: String,
        expected: String,
        actual: String,
    },

    /// An expected header is absent from the actual header set.
    MissingHeader { name: String },

    /// The observed input could not be decomposed into an HTTP message
    /// (bad start line, unknown method, non-UTF-8 captured body).
    Malformed { detail: String },

    /// An operation expected to fail completed successfully.
    ExpectedFailureNotRaised { expected: CanonicalErrorCode },

    /// An operation failed, but not with the expected category of error.
    UnexpectedErrorKind {
        expected: CanonicalErrorCode,
        actual: String,
    },
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchError::Mismatch {
                field,
                expected,
                actual,
            } => {
                write!(f, "{field} mismatch: expected `{expected}`, actual `{actual}`")
            }
            MatchError::MissingHeader { name } => {
                write!(f, "expected header `{name}` is missing")
            }
            MatchError::Malformed { detail } => {
                write!(f, "malformed HTTP message: {detail}")
            }
            MatchError::ExpectedFailureNotRaised { expected } => {
                write!(f, "expected failure `{expected}` not raised")
            }
            MatchError::UnexpectedErrorKind { expected, actual } => {
                write!(f, "expected failure `{expected}`, got unrelated error: {actual}")
            }
        }
    }
}

impl std::error::Error for MatchError {}

impl MatchError {
    /// Shorthand for a field mismatch; keeps comparison sites one line.
    pub(crate) fn mismatch(
        field: impl Into<String>,
        expected: impl fmt::Display,
        actual: impl fmt::Display,
    ) -> Self {
        MatchError::Mismatch {
            field: field.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}
