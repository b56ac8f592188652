//! Fluent constructor for [`super::Query`].
//!
//! Maintains a single implicit top-level AND group; `.and_group()`/
//! `.or_group()`/`.not_group()` add nested groups via a closure over a
//! fresh child builder. `build()` consumes `self` and emits an immutable
//! AST; the builder retains no reference to the result.

use super::{Condition, DottedPath, Group, GroupOp, Node, OrderKey, Query, Value};
use crate::operator::OperatorTag;

/// Builds one [`Group`]'s children.
#[derive(Debug, Default)]
pub struct GroupBuilder {
    op: Option<GroupOp>,
    children: Vec<Node>,
}

impl GroupBuilder {
    fn new(op: GroupOp) -> Self {
        Self {
            op: Some(op),
            children: Vec::new(),
        }
    }

    /// Add a leaf condition.
    pub fn condition(
        mut self,
        field: &str,
        operator: OperatorTag,
        value: Option<Value>,
    ) -> Result<Self, String> {
        let path = DottedPath::parse(field)?;
        self.children.push(Node::Condition(Condition::new(
            path,
            operator.as_str(),
            value,
        )));
        Ok(self)
    }

    /// Add a nested AND group, built by `f`.
    pub fn all_of(mut self, f: impl FnOnce(GroupBuilder) -> GroupBuilder) -> Self {
        let nested = f(GroupBuilder::new(GroupOp::And)).build();
        self.children.push(Node::Group(nested));
        self
    }

    /// Add a nested OR group, built by `f`.
    pub fn any_of(mut self, f: impl FnOnce(GroupBuilder) -> GroupBuilder) -> Self {
        let nested = f(GroupBuilder::new(GroupOp::Or)).build();
        self.children.push(Node::Group(nested));
        self
    }

    /// Add a nested NOT group wrapping a single node built by `f`. Only
    /// the first node `f` produces is kept — NOT groups have exactly one
    /// child, enforced here at construction time as well as by the
    /// validator.
    pub fn not(mut self, f: impl FnOnce(GroupBuilder) -> GroupBuilder) -> Self {
        let inner = f(GroupBuilder::new(GroupOp::And));
        let child = match inner.children.into_iter().next() {
            Some(node) => node,
            None => Node::Group(Group::new(GroupOp::And, Vec::new())),
        };
        self.children
            .push(Node::Group(Group::new(GroupOp::Not, vec![child])));
        self
    }

    fn build(self) -> Group {
        Group::new(self.op.unwrap_or(GroupOp::And), self.children)
    }
}

/// Builds a [`Query`].
#[derive(Debug, Default)]
pub struct QueryBuilder {
    root: GroupBuilder,
    order_by: Vec<OrderKey>,
    limit: Option<u32>,
    offset: Option<u32>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self {
            root: GroupBuilder::new(GroupOp::And),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Add a top-level condition (implicitly AND-ed with the rest).
    pub fn condition(
        mut self,
        field: &str,
        operator: OperatorTag,
        value: Option<Value>,
    ) -> Result<Self, String> {
        self.root = self.root.condition(field, operator, value)?;
        Ok(self)
    }

    /// Add a top-level nested AND group.
    pub fn all_of(mut self, f: impl FnOnce(GroupBuilder) -> GroupBuilder) -> Self {
        self.root = self.root.all_of(f);
        self
    }

    /// Add a top-level nested OR group.
    pub fn any_of(mut self, f: impl FnOnce(GroupBuilder) -> GroupBuilder) -> Self {
        self.root = self.root.any_of(f);
        self
    }

    /// Add a top-level NOT group.
    pub fn not(mut self, f: impl FnOnce(GroupBuilder) -> GroupBuilder) -> Self {
        self.root = self.root.not(f);
        self
    }

    pub fn order_by(mut self, path: &str) -> Result<Self, String> {
        self.order_by.push(OrderKey::parse(path)?);
        Ok(self)
    }

    pub fn limit(mut self, n: u32) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn offset(mut self, n: u32) -> Self {
        self.offset = Some(n);
        self
    }

    /// Consume the builder and emit the immutable AST.
    pub fn build(self) -> Query {
        Query {
            groups: vec![self.root.build()],
            limit: self.limit,
            offset: self.offset,
            order_by: self.order_by,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_simple_condition() {
        let query = QueryBuilder::new()
            .condition("status", OperatorTag::Eq, Some(Value::String("active".into())))
            .unwrap()
            .limit(10)
            .build();

        assert_eq!(query.groups.len(), 1);
        assert_eq!(query.groups[0].children.len(), 1);
        assert_eq!(query.limit, Some(10));
    }

    #[test]
    fn test_builder_nested_or() {
        let query = QueryBuilder::new()
            .condition("status", OperatorTag::Eq, Some(Value::String("active".into())))
            .unwrap()
            .any_of(|g| {
                g.condition("priority", OperatorTag::Gt, Some(Value::Int(5)))
                    .unwrap()
                    .condition("urgent", OperatorTag::Eq, Some(Value::Bool(true)))
                    .unwrap()
            })
            .build();

        assert_eq!(query.groups[0].children.len(), 2);
    }

    #[test]
    fn test_builder_not_wraps_single_child() {
        let query = QueryBuilder::new()
            .not(|g| {
                g.condition("archived", OperatorTag::Eq, Some(Value::Bool(true)))
                    .unwrap()
            })
            .build();

        match &query.groups[0].children[0] {
            Node::Group(g) => {
                assert_eq!(g.op, GroupOp::Not);
                assert_eq!(g.children.len(), 1);
            }
            _ => panic!("expected a group"),
        }
    }

    #[test]
    fn test_builder_retains_no_reference_after_build() {
        let builder = QueryBuilder::new();
        let query = builder.build();
        assert!(query.groups[0].children.is_empty());
    }
}
