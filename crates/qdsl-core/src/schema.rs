//! The schema collaborator contract (§6): everything the path resolver
//! needs to know about relations, without owning a database connection.
//!
//! Callers implement [`SchemaIntrospector`] over whatever schema cache
//! they already maintain; this crate never introspects a database
//! itself.

use std::collections::HashMap;

/// A named relationship from one relation to another, the attribute
/// side of a dotted path step.
#[derive(Clone, Debug, PartialEq)]
pub struct RelationDescriptor {
    /// The relation this step joins into.
    pub foreign_relation: String,
    /// True when `foreign_relation == relation` of the step it's reached
    /// from — forces the resolver to mint a fresh alias rather than
    /// reuse a memoized one (§4.E).
    pub is_self: bool,
    /// `(local_column, foreign_column)` pairs forming the join condition.
    pub join_columns: Vec<(String, String)>,
    /// Whether this relationship yields at most one row (many-to-one,
    /// one-to-one) versus a collection.
    pub to_one: bool,
}

/// What the path resolver needs to know about a relation's shape.
pub trait SchemaIntrospector {
    /// The column names a relation exposes, for leaf validation and
    /// fuzzy `UnknownField` suggestion. `None` if `relation` is unknown.
    fn columns_of(&self, relation: &str) -> Option<Vec<String>>;

    /// The relationships a relation exposes by attribute name, for
    /// fuzzy suggestion when an attribute name doesn't match.
    fn relation_names_of(&self, relation: &str) -> Option<Vec<String>>;

    /// Resolve one path step: does `relation.attribute` name a
    /// relationship, and if so what does traversing it look like.
    fn relation_for(&self, relation: &str, attribute: &str) -> Option<RelationDescriptor>;
}

/// An in-memory [`SchemaIntrospector`], convenient for tests and for
/// embedding callers that don't maintain their own schema cache.
#[derive(Clone, Debug, Default)]
pub struct StaticSchema {
    columns: HashMap<String, Vec<String>>,
    relations: HashMap<String, HashMap<String, RelationDescriptor>>,
}

impl StaticSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_columns(mut self, relation: impl Into<String>, columns: Vec<String>) -> Self {
        self.columns.insert(relation.into(), columns);
        self
    }

    pub fn with_relation(
        mut self,
        relation: impl Into<String>,
        attribute: impl Into<String>,
        descriptor: RelationDescriptor,
    ) -> Self {
        self.relations
            .entry(relation.into())
            .or_default()
            .insert(attribute.into(), descriptor);
        self
    }
}

impl SchemaIntrospector for StaticSchema {
    fn columns_of(&self, relation: &str) -> Option<Vec<String>> {
        self.columns.get(relation).cloned()
    }

    fn relation_names_of(&self, relation: &str) -> Option<Vec<String>> {
        self.relations
            .get(relation)
            .map(|m| m.keys().cloned().collect())
    }

    fn relation_for(&self, relation: &str, attribute: &str) -> Option<RelationDescriptor> {
        self.relations.get(relation)?.get(attribute).cloned()
    }
}
