//! Parameterized SQL fragment builder for the qdsl query engine.
//!
//! Provides a safe way to construct read-only SQL queries without string
//! concatenation: every scalar value flows through a `$N` placeholder and
//! a side `Vec<SqlParam>`, never through the SQL text itself.

mod builder;
mod expr;
pub mod identifier;
mod param;
mod select;

pub use builder::{SqlBuilder, SqlFragment};
pub use expr::{Expr, NullsOrder, OrderDirection, OrderExpr};
pub use identifier::{escape_ident, from_qi, quote_literal, QualifiedIdentifier};
pub use param::SqlParam;
pub use select::SelectBuilder;

/// Prelude for common imports.
pub mod prelude {
    pub use super::{
        escape_ident, from_qi, quote_literal, Expr, OrderExpr, SelectBuilder, SqlBuilder,
        SqlFragment, SqlParam,
    };
}
