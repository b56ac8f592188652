//! qdsl-core: a backend-agnostic structured query language.
//!
//! A query is a tree of boolean groups over field/operator/value
//! conditions (`ast`), checked against a closed operator registry
//! (`operator`) and validated structurally (`validate`) before it ever
//! reaches an evaluator. From there it runs one of two ways:
//!
//! - `memory`: filters, sorts, and pages plain JSON-shaped records
//!   in-process.
//! - `resolve` + `sql`: resolves dotted paths to a join plan against a
//!   caller-supplied schema, then translates the query into one
//!   parameterized `SELECT`.
//!
//! `dispatch` wires validation, resolution, and the chosen evaluator
//! together behind one call. This crate never opens a database
//! connection, never parses an HTTP request, and never owns a schema
//! cache — those are the caller's concerns (`schema`, `sql::SqlExecutor`).

pub mod ast;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod memory;
pub mod operator;
pub mod resolve;
pub mod schema;
pub mod sql;
pub mod util;
pub mod validate;

pub use ast::builder::{GroupBuilder, QueryBuilder};
pub use ast::{Condition, DottedPath, Group, GroupOp, Node, OrderDirection, OrderKey, Query, Value};
pub use config::QdslConfig;
pub use dispatch::Dispatcher;
pub use error::{Error, Result};
pub use operator::{Backend, OperatorSet, OperatorTag};
pub use resolve::hooks::{HookRegistry, HookResult, ResolutionContext, ResolutionHook};
pub use resolve::{JoinKind, JoinPlan, JoinStep, Resolver, SqlTarget};
pub use schema::{RelationDescriptor, SchemaIntrospector, StaticSchema};
pub use sql::SqlExecutor;

/// Prelude for common imports.
pub mod prelude {
    pub use super::ast::{Condition, DottedPath, Group, GroupOp, Node, OrderKey, Query, Value};
    pub use super::config::QdslConfig;
    pub use super::dispatch::Dispatcher;
    pub use super::error::{Error, Result};
    pub use super::operator::{Backend, OperatorSet, OperatorTag};
    pub use super::schema::{SchemaIntrospector, StaticSchema};
    pub use super::sql::SqlExecutor;
}
