//! The in-memory evaluator (§4.F): a predicate interpreter over plain
//! JSON-shaped records, for callers with no database behind them —
//! in-process caches, fixtures, test doubles.
//!
//! A streamed query with no `order_by` is filtered and paged lazily,
//! record by record, never buffering the whole source. One with
//! `order_by` needs every record before it can know the first one to
//! emit, so by default it buffers a full snapshot first
//! (`QdslConfig::stream_order_buffer`). A caller that would rather keep
//! streaming lazily than pay that buffering cost can turn the flag off;
//! the tradeoff is that `order_by` is then silently not honored and
//! results come back in encounter order instead.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use futures::{Stream, StreamExt};
use regex::{Regex, RegexBuilder};

use crate::ast::{Condition, Group, GroupOp, Node, OrderDirection, Query, Value};
use crate::error::RuntimeError;
use crate::operator::OperatorTag;

/// A record the memory evaluator can filter and sort. Implemented for
/// `serde_json::Value` out of the box; callers with their own record
/// type need only expose its JSON projection.
pub trait Record {
    fn as_json(&self) -> &serde_json::Value;
}

impl Record for serde_json::Value {
    fn as_json(&self) -> &serde_json::Value {
        self
    }
}

/// Per-evaluation cache of compiled regexes, so a `regex`/`iregex`
/// condition compiles its pattern once per `evaluate` call rather than
/// once per record.
#[derive(Default)]
struct RegexCache(HashMap<(String, bool), Regex>);

impl RegexCache {
    fn get_or_compile(&mut self, pattern: &str, case_insensitive: bool) -> Result<&Regex, RuntimeError> {
        let key = (pattern.to_string(), case_insensitive);
        if !self.0.contains_key(&key) {
            tracing::trace!(pattern, case_insensitive, "compiling regex");
            let compiled = RegexBuilder::new(pattern)
                .case_insensitive(case_insensitive)
                .build()
                .map_err(|_| RuntimeError::InvalidRegex {
                    pattern: pattern.to_string(),
                })?;
            self.0.insert(key.clone(), compiled);
        }
        Ok(self.0.get(&key).expect("just inserted"))
    }
}

/// Does `record` satisfy every one of `groups` (the query's top-level
/// groups, implicitly AND-ed together)?
fn record_matches<R: Record>(
    groups: &[Group],
    record: &R,
    cache: &mut RegexCache,
) -> Result<bool, RuntimeError> {
    for group in groups {
        if !eval_group(record.as_json(), group, cache)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Filter `records` against `query`, ignoring its `limit`/`offset`/
/// `order_by` — those are applied by [`evaluate`], which wraps this.
fn filter<'r, R: Record>(
    query: &Query,
    records: &'r [R],
) -> Result<Vec<&'r R>, RuntimeError> {
    let mut cache = RegexCache::default();
    let mut out = Vec::new();
    for record in records {
        if record_matches(&query.groups, record, &mut cache)? {
            out.push(record);
        }
    }
    Ok(out)
}

/// Filter, sort, and page `records` against `query`.
pub fn evaluate<'r, R: Record>(query: &Query, records: &'r [R]) -> Result<Vec<&'r R>, RuntimeError> {
    let mut matched = filter(query, records)?;
    sort_in_place(&mut matched, query);
    Ok(page(matched, query))
}

/// The streaming counterpart of [`evaluate`].
///
/// With no `order_by` there's nothing to buffer for: each record is
/// matched as it arrives and emitted in encounter order, with
/// `limit`/`offset` applied positionally as the stream runs. With an
/// `order_by`, the first row can't be known without seeing every row,
/// so unless `stream_order_buffer` is `false` this collects a full
/// snapshot, evaluates it with [`evaluate`], and re-streams the result.
/// Turning `stream_order_buffer` off trades that buffering cost away in
/// exchange for `order_by` silently not being honored — rows still come
/// back filtered and paged, just in encounter order.
pub fn evaluate_stream<R>(
    query: Query,
    records: impl Stream<Item = R> + Send + 'static,
    stream_order_buffer: bool,
) -> Pin<Box<dyn Stream<Item = Result<R, RuntimeError>> + Send>>
where
    R: Record + Clone + Send + Sync + 'static,
{
    if !query.order_by.is_empty() && stream_order_buffer {
        let snapshot_and_evaluate = futures::stream::once(async move {
            let snapshot: Vec<R> = records.collect().await;
            tracing::debug!(count = snapshot.len(), "buffered stream before evaluating");
            evaluate(&query, &snapshot)
                .map(|rows| rows.into_iter().cloned().collect::<Vec<R>>())
        });

        return Box::pin(snapshot_and_evaluate.flat_map(
            |result| -> Pin<Box<dyn Stream<Item = Result<R, RuntimeError>> + Send>> {
                match result {
                    Ok(rows) => Box::pin(futures::stream::iter(rows.into_iter().map(Ok))),
                    Err(e) => Box::pin(futures::stream::iter(vec![Err(e)])),
                }
            },
        ));
    }

    if !query.order_by.is_empty() {
        tracing::debug!("streaming without buffering: order_by will not be honored");
    }

    let offset = query.offset.unwrap_or(0) as usize;
    let limit = query.limit.map(|n| n as usize);
    let groups = query.groups;

    let matched = records
        .scan(RegexCache::default(), move |cache, record| {
            let outcome = match record_matches(&groups, &record, cache) {
                Ok(true) => Some(Ok(record)),
                Ok(false) => None,
                Err(e) => Some(Err(e)),
            };
            futures::future::ready(Some(outcome))
        })
        .filter_map(futures::future::ready)
        .skip(offset);

    match limit {
        Some(n) => Box::pin(matched.take(n)),
        None => Box::pin(matched),
    }
}

fn eval_group(
    json: &serde_json::Value,
    group: &Group,
    cache: &mut RegexCache,
) -> Result<bool, RuntimeError> {
    match group.op {
        GroupOp::And => {
            for child in &group.children {
                if !eval_node(json, child, cache)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        GroupOp::Or => {
            for child in &group.children {
                if eval_node(json, child, cache)? {
                    return Ok(true);
                }
            }
            Ok(group.children.is_empty())
        }
        GroupOp::Not => {
            // Validated AST guarantees exactly one child.
            match group.children.first() {
                Some(child) => Ok(!eval_node(json, child, cache)?),
                None => Ok(true),
            }
        }
    }
}

fn eval_node(
    json: &serde_json::Value,
    node: &Node,
    cache: &mut RegexCache,
) -> Result<bool, RuntimeError> {
    match node {
        Node::Group(g) => eval_group(json, g, cache),
        Node::Condition(c) => eval_condition(json, c, cache),
    }
}

fn eval_condition(
    json: &serde_json::Value,
    condition: &Condition,
    cache: &mut RegexCache,
) -> Result<bool, RuntimeError> {
    let tag = OperatorTag::from_str_opt(&condition.operator).ok_or_else(|| {
        RuntimeError::TypeMismatch {
            op: condition.operator.clone(),
            lhs_kind: "unknown".to_string(),
            rhs_kind: "unknown".to_string(),
        }
    })?;
    let segments = condition.field.segments();
    let leaves = collect_leaves(json, segments);
    eval_operator(tag, &leaves, condition.value.as_ref(), json, condition, cache)
}

/// Walk `value` down `segments`, treating every array encountered along
/// the way as an existential quantifier: the collected leaves are every
/// value reachable by picking *some* element out of each array on the
/// path.
fn collect_leaves<'a>(value: &'a serde_json::Value, segments: &[String]) -> Vec<&'a serde_json::Value> {
    if let serde_json::Value::Array(items) = value {
        return items.iter().flat_map(|v| collect_leaves(v, segments)).collect();
    }
    match segments.split_first() {
        None => vec![value],
        Some((head, rest)) => match value.get(head.as_str()) {
            Some(next) => collect_leaves(next, rest),
            None => vec![],
        },
    }
}

/// Fetch the field's immediate value without existential flattening —
/// `all` needs one concrete array to test superset containment against,
/// not an existential match over nested lists.
fn raw_value<'a>(value: &'a serde_json::Value, segments: &[String]) -> Option<&'a serde_json::Value> {
    match segments.split_first() {
        None => Some(value),
        Some((head, rest)) => raw_value(value.get(head.as_str())?, rest),
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Scalar {
    Num(f64),
    Str(String),
    Bool(bool),
    Time(DateTime<Utc>),
}

impl Scalar {
    fn from_json(v: &serde_json::Value) -> Option<Self> {
        match v {
            serde_json::Value::Bool(b) => Some(Scalar::Bool(*b)),
            serde_json::Value::Number(n) => n.as_f64().map(Scalar::Num),
            serde_json::Value::String(s) => {
                if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                    Some(Scalar::Time(dt.with_timezone(&Utc)))
                } else {
                    Some(Scalar::Str(s.clone()))
                }
            }
            _ => None,
        }
    }

    fn from_ast(v: &Value) -> Option<Self> {
        match v {
            Value::Bool(b) => Some(Scalar::Bool(*b)),
            Value::Int(i) => Some(Scalar::Num(*i as f64)),
            Value::Real(f) => Some(Scalar::Num(*f)),
            Value::String(s) => Some(Scalar::Str(s.clone())),
            Value::Timestamp(t) => Some(Scalar::Time(*t)),
            _ => None,
        }
    }

    fn partial_cmp(&self, other: &Scalar) -> Option<Ordering> {
        match (self, other) {
            (Scalar::Num(a), Scalar::Num(b)) => a.partial_cmp(b),
            (Scalar::Str(a), Scalar::Str(b)) => Some(a.cmp(b)),
            (Scalar::Bool(a), Scalar::Bool(b)) => Some(a.cmp(b)),
            (Scalar::Time(a), Scalar::Time(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

fn leaf_string(leaf: &serde_json::Value) -> Option<&str> {
    leaf.as_str()
}

const REGEX_META_CHARS: &[char] = &[
    '.', '^', '$', '*', '+', '?', '(', ')', '[', ']', '{', '}', '|', '\\',
];

/// Translate a SQL `LIKE` pattern (`%`/`_` wildcards) into an anchored
/// regex, escaping every character the regex engine would otherwise
/// treat specially.
fn sql_like_to_regex(pattern: &str) -> String {
    let mut out = String::from("^");
    for ch in pattern.chars() {
        match ch {
            '%' => out.push_str(".*"),
            '_' => out.push('.'),
            c if REGEX_META_CHARS.contains(&c) => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push('$');
    out
}

fn eval_operator(
    tag: OperatorTag,
    leaves: &[&serde_json::Value],
    operand: Option<&Value>,
    json: &serde_json::Value,
    condition: &Condition,
    cache: &mut RegexCache,
) -> Result<bool, RuntimeError> {
    use OperatorTag::*;

    match tag {
        IsNull => Ok(leaves.is_empty() || leaves.iter().any(|l| l.is_null())),
        IsNotNull => Ok(!leaves.is_empty() && leaves.iter().all(|l| !l.is_null())),
        IsEmpty => Ok(leaves.iter().any(|l| l.as_str() == Some(""))),
        IsNotEmpty => Ok(leaves.iter().any(|l| matches!(l.as_str(), Some(s) if !s.is_empty()))),

        Eq | Neq | Gt | Gte | Lt | Lte => {
            let operand = operand.and_then(Scalar::from_ast).ok_or_else(|| type_mismatch(&tag, operand))?;
            let matches_leaf = |leaf: &&serde_json::Value| -> bool {
                match Scalar::from_json(leaf) {
                    Some(scalar) => match scalar.partial_cmp(&operand) {
                        Some(ord) => match tag {
                            Eq => ord == Ordering::Equal,
                            Neq => ord != Ordering::Equal,
                            Gt => ord == Ordering::Greater,
                            Gte => ord != Ordering::Less,
                            Lt => ord == Ordering::Less,
                            Lte => ord != Ordering::Greater,
                            _ => unreachable!(),
                        },
                        None => false,
                    },
                    None => tag == Neq,
                }
            };
            Ok(leaves.iter().any(matches_leaf))
        }

        In | NotIn => {
            let Some(Value::List(items)) = operand else {
                return Err(type_mismatch(&tag, operand));
            };
            let operands: Vec<Scalar> = items.iter().filter_map(Scalar::from_ast).collect();
            let is_member = |leaf: &&serde_json::Value| -> bool {
                Scalar::from_json(leaf)
                    .map(|s| operands.iter().any(|o| s.partial_cmp(o) == Some(Ordering::Equal)))
                    .unwrap_or(false)
            };
            Ok(match tag {
                In => leaves.iter().any(is_member),
                NotIn => leaves.iter().any(|l| !is_member(l)),
                _ => unreachable!(),
            })
        }

        All => {
            let Some(Value::List(items)) = operand else {
                return Err(type_mismatch(&tag, operand));
            };
            let Some(serde_json::Value::Array(target)) = raw_value(json, condition.field.segments()) else {
                return Ok(false);
            };
            let value_scalars: Vec<Scalar> = items.iter().filter_map(Scalar::from_ast).collect();
            Ok(target.iter().filter_map(Scalar::from_json).all(|t| {
                value_scalars.iter().any(|o| t.partial_cmp(o) == Some(Ordering::Equal))
            }))
        }

        Between | NotBetween => {
            let Some(Value::Between(lo, hi)) = operand else {
                return Err(type_mismatch(&tag, operand));
            };
            let (Some(lo), Some(hi)) = (Scalar::from_ast(lo), Scalar::from_ast(hi)) else {
                return Err(type_mismatch(&tag, operand));
            };
            let in_range = |leaf: &&serde_json::Value| -> bool {
                match Scalar::from_json(leaf) {
                    Some(s) => {
                        s.partial_cmp(&lo) != Some(Ordering::Less)
                            && s.partial_cmp(&hi) != Some(Ordering::Greater)
                    }
                    None => false,
                }
            };
            Ok(match tag {
                Between => leaves.iter().any(in_range),
                NotBetween => leaves.iter().any(|l| !in_range(l)),
                _ => unreachable!(),
            })
        }

        Like | NotLike | ILike | NotILike => {
            let Some(Value::String(pattern)) = operand else {
                return Err(type_mismatch(&tag, operand));
            };
            let case_insensitive = matches!(tag, ILike | NotILike);
            let regex = cache.get_or_compile(&sql_like_to_regex(pattern), case_insensitive)?;
            let matches = leaves.iter().any(|l| {
                leaf_string(l).map(|s| regex.is_match(s)).unwrap_or(false)
            });
            Ok(if matches!(tag, NotLike | NotILike) { !matches } else { matches })
        }

        Contains | IContains | StartsWith | IStartsWith | EndsWith | IEndsWith => {
            let Some(Value::String(needle)) = operand else {
                return Err(type_mismatch(&tag, operand));
            };
            let case_insensitive = matches!(tag, IContains | IStartsWith | IEndsWith);
            let needle = if case_insensitive { needle.to_lowercase() } else { needle.clone() };
            Ok(leaves.iter().any(|l| {
                let Some(s) = leaf_string(l) else { return false };
                let s = if case_insensitive { s.to_lowercase() } else { s.to_string() };
                match tag {
                    Contains | IContains => s.contains(&needle),
                    StartsWith | IStartsWith => s.starts_with(&needle),
                    EndsWith | IEndsWith => s.ends_with(&needle),
                    _ => unreachable!(),
                }
            }))
        }

        Regex | IRegex => {
            let Some(Value::String(pattern)) = operand else {
                return Err(type_mismatch(&tag, operand));
            };
            let regex = cache.get_or_compile(pattern, tag == IRegex)?;
            Ok(leaves.iter().any(|l| leaf_string(l).map(|s| regex.is_match(s)).unwrap_or(false)))
        }

        JsonbContains | JsonbContainedBy | JsonbHasKey | JsonbHasAnyKeys | JsonbHasAllKeys
        | JsonbPathExists | Intersects | Within | ContainsGeom | Touches | Crosses | Overlaps
        | Disjoint | GeomEquals | DistanceLt | Dwithin | BboxIntersects | Fts | FtsPhrase => {
            Err(RuntimeError::TypeMismatch {
                op: tag.as_str().to_string(),
                lhs_kind: "memory".to_string(),
                rhs_kind: "sql-only-operator".to_string(),
            })
        }
    }
}

fn type_mismatch(tag: &OperatorTag, operand: Option<&Value>) -> RuntimeError {
    RuntimeError::TypeMismatch {
        op: tag.as_str().to_string(),
        lhs_kind: "field".to_string(),
        rhs_kind: operand.map(Value::kind).unwrap_or("none").to_string(),
    }
}

fn sort_in_place<R: Record>(records: &mut [&R], query: &Query) {
    if query.order_by.is_empty() {
        return;
    }
    records.sort_by(|a, b| {
        for key in &query.order_by {
            let segments = key.path.segments();
            let av = raw_value(a.as_json(), segments).and_then(Scalar::from_json);
            let bv = raw_value(b.as_json(), segments).and_then(Scalar::from_json);
            // Missing/unknown values sort last for ASC, first for DESC;
            // two present values compare normally (reversed for DESC).
            let ord = match (av, bv) {
                (Some(a), Some(b)) => {
                    let base = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
                    match key.direction {
                        OrderDirection::Asc => base,
                        OrderDirection::Desc => base.reverse(),
                    }
                }
                (Some(_), None) => match key.direction {
                    OrderDirection::Asc => Ordering::Less,
                    OrderDirection::Desc => Ordering::Greater,
                },
                (None, Some(_)) => match key.direction {
                    OrderDirection::Asc => Ordering::Greater,
                    OrderDirection::Desc => Ordering::Less,
                },
                (None, None) => Ordering::Equal,
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
}

fn page<'r, R>(records: Vec<&'r R>, query: &Query) -> Vec<&'r R> {
    let offset = query.offset.unwrap_or(0) as usize;
    let skipped: Vec<&'r R> = records.into_iter().skip(offset).collect();
    match query.limit {
        Some(limit) => skipped.into_iter().take(limit as usize).collect(),
        None => skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Condition, DottedPath, GroupOp, OrderKey};
    use serde_json::json;

    fn cond(field: &str, op: &str, value: Option<Value>) -> Node {
        Node::Condition(Condition::new(DottedPath::parse(field).unwrap(), op, value))
    }

    fn query_with(children: Vec<Node>) -> Query {
        Query {
            groups: vec![Group::new(GroupOp::And, children)],
            limit: None,
            offset: None,
            order_by: vec![],
        }
    }

    #[test]
    fn test_simple_equality() {
        let records = vec![json!({"status": "active"}), json!({"status": "closed"})];
        let query = query_with(vec![cond("status", "=", Some(Value::String("active".into())))]);
        let result = evaluate(&query, &records).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0]["status"], "active");
    }

    #[test]
    fn test_existential_list_traversal() {
        let records = vec![json!({"tags": ["a", "b"]}), json!({"tags": ["c"]})];
        let query = query_with(vec![cond("tags", "=", Some(Value::String("b".into())))]);
        let result = evaluate(&query, &records).unwrap();
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_and_group_empty_children_is_true_per_semantics() {
        let group = Group::new(GroupOp::And, vec![]);
        let mut cache = RegexCache::default();
        assert!(eval_group(&json!({}), &group, &mut cache).unwrap());
    }

    #[test]
    fn test_or_group_empty_children_is_false_per_semantics() {
        let group = Group::new(GroupOp::Or, vec![]);
        let mut cache = RegexCache::default();
        assert!(!eval_group(&json!({}), &group, &mut cache).unwrap());
    }

    #[test]
    fn test_not_group() {
        let records = vec![json!({"archived": true}), json!({"archived": false})];
        let query = Query {
            groups: vec![Group::new(
                GroupOp::Not,
                vec![cond("archived", "=", Some(Value::Bool(true)))],
            )],
            limit: None,
            offset: None,
            order_by: vec![],
        };
        let result = evaluate(&query, &records).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0]["archived"], false);
    }

    #[test]
    fn test_icontains_is_case_insensitive() {
        let records = vec![json!({"name": "Alice Smith"})];
        let query = query_with(vec![cond("name", "icontains", Some(Value::String("ALICE".into())))]);
        assert_eq!(evaluate(&query, &records).unwrap().len(), 1);
    }

    #[test]
    fn test_all_requires_field_subset_of_value() {
        // field tags=["a","b"] is a subset of the condition's value list,
        // even though the value list carries an extra element ("c") the
        // field doesn't have — `all` must still match.
        let records = vec![json!({"tags": ["a", "b"]}), json!({"tags": ["a", "z"]})];
        let query = query_with(vec![cond(
            "tags",
            "all",
            Some(Value::List(vec![
                Value::String("a".into()),
                Value::String("b".into()),
                Value::String("c".into()),
            ])),
        )]);
        let result = evaluate(&query, &records).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0]["tags"], json!(["a", "b"]));
    }

    #[test]
    fn test_between() {
        let records = vec![json!({"age": 25}), json!({"age": 70})];
        let query = query_with(vec![cond(
            "age",
            "between",
            Some(Value::Between(Box::new(Value::Int(18)), Box::new(Value::Int(65)))),
        )]);
        let result = evaluate(&query, &records).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0]["age"], 25);
    }

    #[test]
    fn test_sort_missing_last_for_asc() {
        let records = vec![json!({"name": "b"}), json!({}), json!({"name": "a"})];
        let query = Query {
            groups: vec![Group::new(GroupOp::And, vec![])],
            limit: None,
            offset: None,
            order_by: vec![OrderKey::asc(DottedPath::parse("name").unwrap())],
        };
        let result = evaluate(&query, &records).unwrap();
        assert_eq!(result[0]["name"], "a");
        assert_eq!(result[1]["name"], "b");
        assert!(result[2].get("name").is_none());
    }

    #[test]
    fn test_offset_and_limit() {
        let records: Vec<_> = (0..5).map(|i| json!({"n": i})).collect();
        let query = Query {
            groups: vec![Group::new(GroupOp::And, vec![])],
            limit: Some(2),
            offset: Some(1),
            order_by: vec![OrderKey::asc(DottedPath::parse("n").unwrap())],
        };
        let result = evaluate(&query, &records).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[0]["n"], 1);
        assert_eq!(result[1]["n"], 2);
    }

    #[tokio::test]
    async fn test_evaluate_stream_filters() {
        let records = vec![json!({"status": "active"}), json!({"status": "closed"})];
        let query = query_with(vec![cond("status", "=", Some(Value::String("active".into())))]);
        let source = tokio_stream::iter(records);
        let mut out = evaluate_stream(query, source, true);
        let mut collected = Vec::new();
        while let Some(item) = out.next().await {
            collected.push(item.unwrap());
        }
        assert_eq!(collected.len(), 1);
    }

    #[tokio::test]
    async fn test_evaluate_stream_with_order_by_buffers_and_sorts() {
        let records = vec![json!({"n": 3}), json!({"n": 1}), json!({"n": 2})];
        let query = Query {
            groups: vec![Group::new(GroupOp::And, vec![])],
            limit: None,
            offset: None,
            order_by: vec![OrderKey::asc(DottedPath::parse("n").unwrap())],
        };
        let source = tokio_stream::iter(records);
        let mut out = evaluate_stream(query, source, true);
        let mut collected = Vec::new();
        while let Some(item) = out.next().await {
            collected.push(item.unwrap());
        }
        assert_eq!(collected, vec![json!({"n": 1}), json!({"n": 2}), json!({"n": 3})]);
    }

    #[tokio::test]
    async fn test_evaluate_stream_without_buffer_ignores_order_but_pages_lazily() {
        let records: Vec<_> = (0..5).map(|i| json!({"n": i})).collect();
        let query = Query {
            groups: vec![Group::new(GroupOp::And, vec![])],
            limit: Some(2),
            offset: Some(1),
            order_by: vec![OrderKey::asc(DottedPath::parse("n").unwrap())],
        };
        let source = tokio_stream::iter(records);
        let mut out = evaluate_stream(query, source, false);
        let mut collected = Vec::new();
        while let Some(item) = out.next().await {
            collected.push(item.unwrap());
        }
        // encounter order, not sorted: records 1 and 2 after skipping the first.
        assert_eq!(collected, vec![json!({"n": 1}), json!({"n": 2})]);
    }
}
