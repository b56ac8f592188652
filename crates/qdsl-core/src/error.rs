//! Error types for the query engine.
//!
//! Four families, matching the stages a query passes through: a query can
//! fail to validate, fail to resolve its paths, be asked of a backend that
//! can't do it, or fail while actually running. Each family implements
//! `std::error::Error` on its own so callers can match narrowly; `Error`
//! is the umbrella type returned by the crate's public entry points.

use thiserror::Error;

/// Result type for query engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while validating a [`crate::ast::Query`] against the
/// operator registry, before any path resolution happens.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("unknown operator '{operator}'{}", suggestion.as_ref().map(|s| format!(", did you mean '{s}'?")).unwrap_or_default())]
    UnknownOperator {
        operator: String,
        suggestion: Option<String>,
    },

    #[error("operator '{operator}' is not supported by the {backend} backend")]
    OperatorNotSupportedByBackend { operator: String, backend: String },

    #[error("operator '{operator}' expects a {expected} value, got {got}")]
    ValueShapeMismatch {
        operator: String,
        expected: String,
        got: String,
    },

    #[error("group has no conditions or sub-groups")]
    EmptyGroup,

    #[error("NOT group must wrap exactly one child, found {arity}")]
    InvalidNot { arity: usize },

    /// `limit`/`offset` are `u32` on [`crate::ast::Query`], so negative
    /// paging can't reach `validate` at all — this variant exists for a
    /// caller's own wire-level decoding step (e.g. rejecting a negative
    /// JSON number before it's even parsed into a `Query`), not for
    /// anything this validator itself constructs.
    #[error("invalid paging parameters: {detail}")]
    InvalidPaging { detail: String },

    #[error("query nesting depth {actual} exceeds the configured maximum of {max}")]
    DepthExceeded { actual: u32, max: u32 },

    #[error("malformed path '{path}'")]
    MalformedPath { path: String },
}

/// Errors raised while resolving a dotted path to a memory accessor chain
/// or a SQL join plan.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolutionError {
    #[error("unknown field '{path}'{}", suggestion.as_ref().map(|s| format!(", did you mean '{s}'?")).unwrap_or_default())]
    UnknownField {
        path: String,
        suggestion: Option<String>,
    },

    #[error("invalid leaf at '{path}': {reason}")]
    InvalidLeaf { path: String, reason: String },

    #[error("relation reference at '{path}' is ambiguous")]
    AmbiguousRelation { path: String },
}

/// Errors raised when a validated query asks a backend to do something it
/// structurally cannot do, or when execution against that backend fails.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("failed to translate operator '{op}': {detail}")]
    TranslationFailed { op: String, detail: String },

    #[error("execution failed: {cause}")]
    ExecutionFailed { cause: String },
}

/// Errors raised while a query is actually being evaluated by the memory
/// backend.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("invalid regex pattern '{pattern}'")]
    InvalidRegex { pattern: String },

    #[error("type mismatch for operator '{op}': lhs is {lhs_kind}, rhs is {rhs_kind}")]
    TypeMismatch {
        op: String,
        lhs_kind: String,
        rhs_kind: String,
    },
}

/// Umbrella error type for the crate's public API.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_operator_message_with_suggestion() {
        let err = ValidationError::UnknownOperator {
            operator: "equals".into(),
            suggestion: Some("=".into()),
        };
        assert!(err.to_string().contains("did you mean '='"));
    }

    #[test]
    fn test_unknown_operator_message_without_suggestion() {
        let err = ValidationError::UnknownOperator {
            operator: "zzz".into(),
            suggestion: None,
        };
        assert_eq!(err.to_string(), "unknown operator 'zzz'");
    }

    #[test]
    fn test_error_from_conversions() {
        let e: Error = ResolutionError::InvalidLeaf {
            path: "orders".into(),
            reason: "relation-valued, not scalar".into(),
        }
        .into();
        assert!(matches!(e, Error::Resolution(_)));
    }

    #[test]
    fn test_depth_exceeded_message() {
        let err = ValidationError::DepthExceeded { actual: 10, max: 8 };
        assert_eq!(
            err.to_string(),
            "query nesting depth 10 exceeds the configured maximum of 8"
        );
    }
}
