//! The path resolver (§4.E): turns a dotted path into either a memory
//! accessor chain or a SQL join plan, depending on which evaluator asks.
//!
//! The memory backend needs nothing but the path itself — a JSON record
//! is walked segment by segment, treating arrays as an existential
//! quantifier (§4.F) — so only the SQL side needs a resolver proper.

pub mod hooks;

use std::collections::HashMap;

use qdsl_sql::SqlFragment;

use crate::ast::DottedPath;
use crate::config::QdslConfig;
use crate::error::ResolutionError;
use crate::schema::SchemaIntrospector;
use crate::util::closest_match;

use hooks::{HookRegistry, HookResult, ResolutionContext};

/// One join PostgreSQL must perform to reach a nested relation.
#[derive(Clone, Debug, PartialEq)]
pub struct JoinStep {
    pub relation: String,
    pub alias: String,
    pub kind: JoinKind,
    /// `(parent_column, this_column)` pairs forming the ON clause.
    pub on: Vec<(String, String)>,
    pub parent_alias: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
}

/// The ordered sequence of joins a query's paths have required so far.
/// Shared and grown across every path resolved within one query.
#[derive(Clone, Debug, Default)]
pub struct JoinPlan {
    pub steps: Vec<JoinStep>,
}

impl JoinPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: JoinStep) {
        self.steps.push(step);
    }

    pub fn has_alias(&self, alias: &str) -> bool {
        self.steps.iter().any(|s| s.alias == alias)
    }
}

/// The terminal location a resolved SQL path points at.
#[derive(Clone, Debug, PartialEq)]
pub enum SqlTarget {
    /// An ordinary column reference, on an alias the resolver allocated.
    Column { alias: String, column: String },
    /// A hook replaced this path's resolution with an opaque predicate
    /// fragment to be spliced into the `WHERE` clause verbatim.
    Predicate(SqlFragment),
}

/// Resolves dotted paths against a schema, building up a shared
/// [`JoinPlan`] and memoizing table aliases by `(relation, path_prefix)`
/// so two conditions that traverse the same relationship reuse one
/// join.
pub struct Resolver<'a, S: SchemaIntrospector> {
    schema: &'a S,
    hooks: &'a HookRegistry,
    edit_distance_threshold: usize,
    alias_separator: char,
    root_relation: String,
    root_alias: String,
    plan: JoinPlan,
    alias_cache: HashMap<(String, Vec<String>), String>,
    alias_counters: HashMap<String, u32>,
}

impl<'a, S: SchemaIntrospector> Resolver<'a, S> {
    pub fn new(
        schema: &'a S,
        hooks: &'a HookRegistry,
        config: &QdslConfig,
        root_relation: impl Into<String>,
    ) -> Self {
        let root_relation = root_relation.into();
        Self {
            schema,
            hooks,
            edit_distance_threshold: config.edit_distance_threshold as usize,
            alias_separator: config.alias_prefix_separator,
            root_alias: root_relation.clone(),
            root_relation,
            plan: JoinPlan::new(),
            alias_cache: HashMap::new(),
            alias_counters: HashMap::new(),
        }
    }

    pub fn root_alias(&self) -> &str {
        &self.root_alias
    }

    /// Consume the resolver, returning every join step accumulated
    /// while resolving the query's paths.
    pub fn into_plan(self) -> JoinPlan {
        self.plan
    }

    fn next_alias(&mut self, relation: &str, depth: usize) -> String {
        let sep = self.alias_separator;
        let base = format!("{relation}{sep}{depth}");
        let counter = self.alias_counters.entry(base.clone()).or_insert(0);
        *counter += 1;
        if *counter == 1 {
            base
        } else {
            format!("{base}{sep}{}", *counter)
        }
    }

    /// Resolve one dotted path to its SQL column target, growing the
    /// shared join plan as needed.
    pub async fn resolve_sql(&mut self, path: &DottedPath) -> Result<SqlTarget, ResolutionError> {
        let segments = path.segments();
        let mut current_relation = self.root_relation.clone();
        let mut current_alias = self.root_alias.clone();
        let mut prefix: Vec<String> = Vec::new();

        for (i, seg) in segments.iter().enumerate() {
            let is_last = i == segments.len() - 1;

            if is_last {
                if let Some(columns) = self.schema.columns_of(&current_relation) {
                    if columns.iter().any(|c| c == seg) {
                        return Ok(SqlTarget::Column {
                            alias: current_alias,
                            column: seg.clone(),
                        });
                    }
                }

                if self.schema.relation_for(&current_relation, seg).is_some() {
                    return Err(ResolutionError::InvalidLeaf {
                        path: path.as_str(),
                        reason: format!("'{seg}' names a relation, not a column"),
                    });
                }

                let mut ctx = ResolutionContext {
                    parent_alias: &current_alias,
                    attribute_name: seg,
                    remaining_segments: &[],
                    join_plan: &mut self.plan,
                    root_model: &self.root_relation,
                };
                match self.hooks.resolve(&mut ctx).await {
                    Some(HookResult::EmittedColumn { alias, column }) => {
                        return Ok(SqlTarget::Column { alias, column });
                    }
                    Some(HookResult::AddedJoins { continue_alias }) => {
                        return Ok(SqlTarget::Column {
                            alias: continue_alias,
                            column: seg.clone(),
                        });
                    }
                    Some(HookResult::CustomPredicate { fragment }) => {
                        return Ok(SqlTarget::Predicate(fragment));
                    }
                    None => {}
                }

                let candidates = self
                    .schema
                    .columns_of(&current_relation)
                    .unwrap_or_default();
                let suggestion = closest_match(
                    seg,
                    candidates.iter().map(String::as_str),
                    self.edit_distance_threshold,
                )
                .map(str::to_string);
                return Err(ResolutionError::UnknownField {
                    path: path.as_str(),
                    suggestion,
                });
            }

            prefix.push(seg.clone());
            match self.schema.relation_for(&current_relation, seg) {
                Some(rel) => {
                    let depth = prefix.len();
                    let cache_key = (current_relation.clone(), prefix.clone());

                    let alias = if rel.is_self {
                        self.next_alias(&rel.foreign_relation, depth)
                    } else if let Some(existing) = self.alias_cache.get(&cache_key) {
                        existing.clone()
                    } else {
                        let alias = self.next_alias(&rel.foreign_relation, depth);
                        self.alias_cache.insert(cache_key, alias.clone());
                        alias
                    };

                    if !self.plan.has_alias(&alias) {
                        tracing::trace!(relation = %rel.foreign_relation, %alias, "allocating join alias");
                        self.plan.push(JoinStep {
                            relation: rel.foreign_relation.clone(),
                            alias: alias.clone(),
                            kind: if rel.to_one { JoinKind::Inner } else { JoinKind::Left },
                            on: rel.join_columns.clone(),
                            parent_alias: current_alias.clone(),
                        });
                    } else {
                        tracing::trace!(%alias, "reusing memoized join alias");
                    }

                    current_relation = rel.foreign_relation;
                    current_alias = alias;
                }
                None => {
                    let candidates = self
                        .schema
                        .relation_names_of(&current_relation)
                        .unwrap_or_default();
                    let suggestion = closest_match(
                        seg,
                        candidates.iter().map(String::as_str),
                        self.edit_distance_threshold,
                    )
                    .map(str::to_string);
                    return Err(ResolutionError::UnknownField {
                        path: path.as_str(),
                        suggestion,
                    });
                }
            }
        }

        unreachable!("DottedPath is never empty")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{RelationDescriptor, StaticSchema};

    fn as_column(target: SqlTarget) -> (String, String) {
        match target {
            SqlTarget::Column { alias, column } => (alias, column),
            SqlTarget::Predicate(_) => panic!("expected a column target, got a predicate"),
        }
    }

    fn schema() -> StaticSchema {
        StaticSchema::new()
            .with_columns("orders", vec!["id".into(), "user_id".into(), "total".into()])
            .with_columns("users", vec!["id".into(), "name".into(), "manager_id".into()])
            .with_relation(
                "orders",
                "user",
                RelationDescriptor {
                    foreign_relation: "users".into(),
                    is_self: false,
                    join_columns: vec![("user_id".into(), "id".into())],
                    to_one: true,
                },
            )
            .with_relation(
                "users",
                "manager",
                RelationDescriptor {
                    foreign_relation: "users".into(),
                    is_self: true,
                    join_columns: vec![("manager_id".into(), "id".into())],
                    to_one: true,
                },
            )
    }

    #[tokio::test]
    async fn test_resolve_direct_column() {
        let schema = schema();
        let hooks = HookRegistry::new();
        let config = QdslConfig::default();
        let mut resolver = Resolver::new(&schema, &hooks, &config, "orders");
        let target = resolver
            .resolve_sql(&DottedPath::parse("total").unwrap())
            .await
            .unwrap();
        let (alias, column) = as_column(target);
        assert_eq!(alias, "orders");
        assert_eq!(column, "total");
        assert!(resolver.into_plan().steps.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_one_hop_relation() {
        let schema = schema();
        let hooks = HookRegistry::new();
        let config = QdslConfig::default();
        let mut resolver = Resolver::new(&schema, &hooks, &config, "orders");
        let target = resolver
            .resolve_sql(&DottedPath::parse("user.name").unwrap())
            .await
            .unwrap();
        let (alias, column) = as_column(target);
        assert_eq!(alias, "users_1");
        assert_eq!(column, "name");
        assert_eq!(resolver.into_plan().steps.len(), 1);
    }

    #[tokio::test]
    async fn test_alias_memoized_across_two_conditions() {
        let schema = schema();
        let hooks = HookRegistry::new();
        let config = QdslConfig::default();
        let mut resolver = Resolver::new(&schema, &hooks, &config, "orders");
        resolver
            .resolve_sql(&DottedPath::parse("user.name").unwrap())
            .await
            .unwrap();
        let target = resolver
            .resolve_sql(&DottedPath::parse("user.id").unwrap())
            .await
            .unwrap();
        assert_eq!(as_column(target).0, "users_1");
        assert_eq!(resolver.into_plan().steps.len(), 1);
    }

    #[tokio::test]
    async fn test_self_reference_gets_distinct_alias() {
        let schema = schema();
        let hooks = HookRegistry::new();
        let config = QdslConfig::default();
        let mut resolver = Resolver::new(&schema, &hooks, &config, "users");
        let a = as_column(
            resolver
                .resolve_sql(&DottedPath::parse("manager.name").unwrap())
                .await
                .unwrap(),
        );
        let b = as_column(
            resolver
                .resolve_sql(&DottedPath::parse("manager.manager_id").unwrap())
                .await
                .unwrap(),
        );
        // A self-referential relationship never caches its alias, so two
        // conditions both under `manager.*` still land on distinct joins.
        assert_ne!(a.0, "users");
        assert_ne!(b.0, "users");
        assert_ne!(a.0, b.0);
    }

    #[tokio::test]
    async fn test_relation_valued_leaf_is_invalid() {
        let schema = schema();
        let hooks = HookRegistry::new();
        let config = QdslConfig::default();
        let mut resolver = Resolver::new(&schema, &hooks, &config, "orders");
        let err = resolver
            .resolve_sql(&DottedPath::parse("user").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, ResolutionError::InvalidLeaf { .. }));
    }

    #[tokio::test]
    async fn test_unknown_field_suggests_closest_column() {
        let schema = schema();
        let hooks = HookRegistry::new();
        let config = QdslConfig::default();
        let mut resolver = Resolver::new(&schema, &hooks, &config, "orders");
        let err = resolver
            .resolve_sql(&DottedPath::parse("tota").unwrap())
            .await
            .unwrap_err();
        match err {
            ResolutionError::UnknownField { suggestion, .. } => {
                assert_eq!(suggestion.as_deref(), Some("total"));
            }
            other => panic!("expected UnknownField, got {other:?}"),
        }
    }
}
