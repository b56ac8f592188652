//! The validator (§4.C): structural checks plus operator resolution.
//!
//! Validation runs before path resolution and is parameterized by the
//! effective backend's permitted operator set, so the same AST can be
//! valid against the memory backend and invalid against SQL (or vice
//! versa) depending on which operators it uses.

use crate::ast::{Condition, Group, GroupOp, Node, Query, Value};
use crate::error::ValidationError;
use crate::operator::{Arity, Backend, OperatorSet, OperatorTag, ValueKind};
use crate::util::closest_match;

/// Validate `query` against `permitted` (the operator set for `backend`,
/// the chosen backend), `max_depth` (the configured nesting limit), and
/// `edit_distance_threshold` (how fuzzy a "did you mean" suggestion on an
/// unknown operator is allowed to be).
///
/// Returns the first violation found, in a fixed pre-order walk: a query
/// with several problems always reports the same one first, run to run.
///
/// `limit`/`offset` are never cross-checked against each other here: a
/// zero limit and an unbounded query with a nonzero offset are both
/// valid paging requests (§4.B), so the only failure mode left to the
/// evaluators is an out-of-range page, not a malformed one.
pub fn validate(
    query: &Query,
    permitted: &OperatorSet,
    backend: Backend,
    max_depth: u32,
    edit_distance_threshold: usize,
) -> Result<(), ValidationError> {
    let depth = query.depth();
    if depth > max_depth {
        return Err(ValidationError::DepthExceeded {
            actual: depth,
            max: max_depth,
        });
    }

    for group in &query.groups {
        validate_group(group, permitted, backend, edit_distance_threshold)?;
    }
    Ok(())
}

fn validate_group(
    group: &Group,
    permitted: &OperatorSet,
    backend: Backend,
    edit_distance_threshold: usize,
) -> Result<(), ValidationError> {
    if group.children.is_empty() {
        return Err(ValidationError::EmptyGroup);
    }
    if group.op == GroupOp::Not && group.children.len() != 1 {
        return Err(ValidationError::InvalidNot {
            arity: group.children.len(),
        });
    }
    for child in &group.children {
        match child {
            Node::Group(g) => validate_group(g, permitted, backend, edit_distance_threshold)?,
            Node::Condition(c) => validate_condition(c, permitted, backend, edit_distance_threshold)?,
        }
    }
    Ok(())
}

fn validate_condition(
    condition: &Condition,
    permitted: &OperatorSet,
    backend: Backend,
    edit_distance_threshold: usize,
) -> Result<(), ValidationError> {
    let tag = match OperatorTag::from_str_opt(&condition.operator) {
        Some(tag) => tag,
        None => {
            let suggestion = closest_match(
                &condition.operator,
                permitted.iter().map(OperatorTag::as_str),
                edit_distance_threshold,
            )
            .map(str::to_string);
            return Err(ValidationError::UnknownOperator {
                operator: condition.operator.clone(),
                suggestion,
            });
        }
    };

    if !permitted.contains(tag) {
        return Err(ValidationError::OperatorNotSupportedByBackend {
            operator: tag.as_str().to_string(),
            backend: backend.as_str().to_string(),
        });
    }

    let info = tag.info();
    match (info.arity, &condition.value) {
        (Arity::Unary, Some(v)) => {
            return Err(ValidationError::ValueShapeMismatch {
                operator: tag.as_str().to_string(),
                expected: describe_kind(ValueKind::None).to_string(),
                got: v.kind().to_string(),
            });
        }
        (Arity::Unary, None) => {}
        (Arity::Binary | Arity::NAry, None) => {
            return Err(ValidationError::ValueShapeMismatch {
                operator: tag.as_str().to_string(),
                expected: describe_kind(info.value_kind).to_string(),
                got: "none".to_string(),
            });
        }
        (Arity::Binary | Arity::NAry, Some(v)) => {
            if !value_matches_kind(v, info.value_kind) {
                return Err(ValidationError::ValueShapeMismatch {
                    operator: tag.as_str().to_string(),
                    expected: describe_kind(info.value_kind).to_string(),
                    got: v.kind().to_string(),
                });
            }
        }
    }

    Ok(())
}

fn value_matches_kind(value: &Value, kind: ValueKind) -> bool {
    match kind {
        ValueKind::None => value.is_null(),
        ValueKind::Scalar => matches!(
            value,
            Value::Null
                | Value::Bool(_)
                | Value::Int(_)
                | Value::Real(_)
                | Value::String(_)
                | Value::Timestamp(_)
        ),
        ValueKind::Pattern | ValueKind::TokenString => matches!(value, Value::String(_)),
        ValueKind::List => matches!(value, Value::List(_)),
        ValueKind::RangePair => matches!(value, Value::Between(_, _)),
        ValueKind::Geometry => matches!(value, Value::Geometry(_)),
        ValueKind::Bbox => matches!(value, Value::Bbox(_)),
        ValueKind::DwithinPair => matches!(value, Value::DWithin { .. }),
        ValueKind::Json => matches!(value, Value::Json(_)),
    }
}

fn describe_kind(kind: ValueKind) -> &'static str {
    match kind {
        ValueKind::None => "none",
        ValueKind::Scalar => "scalar",
        ValueKind::Pattern => "pattern string",
        ValueKind::TokenString => "token string",
        ValueKind::List => "list",
        ValueKind::RangePair => "range pair",
        ValueKind::Geometry => "geometry",
        ValueKind::Bbox => "bbox",
        ValueKind::DwithinPair => "dwithin pair",
        ValueKind::Json => "json",
    }
}
