//! SQL expression building for the query engine's operator matrix.
//!
//! `Expr` itself is just a thin wrapper around a [`SqlFragment`]: the
//! operator matrix (comparison, set, string, JSONB, spatial, full-text)
//! is owned by `qdsl-core::sql`, which resolves each condition's column
//! to a qualified `alias.column` identifier before building the
//! fragment — something a bare single-identifier constructor here
//! couldn't express. What's left here is the composition layer every
//! caller needs regardless of how its leaf expressions were built:
//! wrapping a fragment, negating it, and AND/OR-ing a set of them.

use crate::{builder::SqlFragment, identifier::escape_ident};

/// A SQL expression (for WHERE, HAVING, etc.).
#[derive(Clone, Debug)]
pub struct Expr {
    fragment: SqlFragment,
}

impl Expr {
    /// Create an expression from a SQL fragment.
    pub fn from_fragment(fragment: SqlFragment) -> Self {
        Self { fragment }
    }

    /// Negate this expression: NOT (expr)
    pub fn not(self) -> Self {
        let mut frag = SqlFragment::raw("NOT ");
        frag.append(self.fragment.parens());
        Self { fragment: frag }
    }

    /// Combine with AND: self AND other
    pub fn and(self, other: Expr) -> Self {
        let mut frag = self.fragment.parens();
        frag.push(" AND ");
        frag.append(other.fragment.parens());
        Self { fragment: frag }
    }

    /// Combine with OR: self OR other
    pub fn or(self, other: Expr) -> Self {
        let mut frag = self.fragment.parens();
        frag.push(" OR ");
        frag.append(other.fragment.parens());
        Self { fragment: frag }
    }

    /// Combine multiple expressions with AND.
    pub fn and_all(exprs: impl IntoIterator<Item = Expr>) -> Self {
        let frags: Vec<_> = exprs.into_iter().map(|e| e.fragment.parens()).collect();
        if frags.is_empty() {
            return Self {
                fragment: SqlFragment::raw("TRUE"),
            };
        }
        Self {
            fragment: SqlFragment::join(" AND ", frags),
        }
    }

    /// Combine multiple expressions with OR.
    pub fn or_all(exprs: impl IntoIterator<Item = Expr>) -> Self {
        let frags: Vec<_> = exprs.into_iter().map(|e| e.fragment.parens()).collect();
        if frags.is_empty() {
            return Self {
                fragment: SqlFragment::raw("FALSE"),
            };
        }
        Self {
            fragment: SqlFragment::join(" OR ", frags),
        }
    }

    /// Convert to a SQL fragment.
    pub fn into_fragment(self) -> SqlFragment {
        self.fragment
    }

    /// Get the SQL string.
    pub fn sql(&self) -> &str {
        self.fragment.sql()
    }

    /// Get the parameters.
    pub fn params(&self) -> &[SqlParam] {
        self.fragment.params()
    }
}

/// ORDER BY expression.
#[derive(Clone, Debug)]
pub struct OrderExpr {
    column: String,
    direction: Option<OrderDirection>,
    nulls: Option<NullsOrder>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum OrderDirection {
    Asc,
    Desc,
}

#[derive(Clone, Debug, PartialEq)]
pub enum NullsOrder {
    First,
    Last,
}

impl OrderExpr {
    /// Create a new ORDER BY expression.
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: None,
            nulls: None,
        }
    }

    /// Set ascending order.
    pub fn asc(mut self) -> Self {
        self.direction = Some(OrderDirection::Asc);
        self
    }

    /// Set descending order.
    pub fn desc(mut self) -> Self {
        self.direction = Some(OrderDirection::Desc);
        self
    }

    /// Set NULLS FIRST.
    pub fn nulls_first(mut self) -> Self {
        self.nulls = Some(NullsOrder::First);
        self
    }

    /// Set NULLS LAST.
    pub fn nulls_last(mut self) -> Self {
        self.nulls = Some(NullsOrder::Last);
        self
    }

    /// Convert to SQL fragment.
    pub fn into_fragment(self) -> SqlFragment {
        let mut frag = SqlFragment::raw(escape_ident(&self.column));

        if let Some(dir) = self.direction {
            match dir {
                OrderDirection::Asc => frag.push(" ASC"),
                OrderDirection::Desc => frag.push(" DESC"),
            };
        }

        if let Some(nulls) = self.nulls {
            match nulls {
                NullsOrder::First => frag.push(" NULLS FIRST"),
                NullsOrder::Last => frag.push(" NULLS LAST"),
            };
        }

        frag
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::SqlParam;

    fn raw(sql: &str) -> Expr {
        Expr::from_fragment(SqlFragment::raw(sql))
    }

    #[test]
    fn test_expr_not() {
        let expr = raw("\"active\" = $1").not();
        assert!(expr.sql().starts_with("NOT ("));
    }

    #[test]
    fn test_expr_and() {
        let combined = raw("\"a\" = $1").and(raw("\"b\" = $2"));
        assert_eq!(combined.sql(), "(\"a\" = $1) AND (\"b\" = $2)");
    }

    #[test]
    fn test_expr_or() {
        let combined = raw("\"a\" = $1").or(raw("\"b\" = $2"));
        assert_eq!(combined.sql(), "(\"a\" = $1) OR (\"b\" = $2)");
    }

    #[test]
    fn test_and_all_empty_is_true() {
        let expr = Expr::and_all(vec![]);
        assert_eq!(expr.sql(), "TRUE");
    }

    #[test]
    fn test_or_all_empty_is_false() {
        let expr = Expr::or_all(vec![]);
        assert_eq!(expr.sql(), "FALSE");
    }

    #[test]
    fn test_and_all_joins_with_and() {
        let expr = Expr::and_all(vec![raw("\"a\" = $1"), raw("\"b\" = $2")]);
        assert_eq!(expr.sql(), "(\"a\" = $1) AND (\"b\" = $2)");
    }

    #[test]
    fn test_from_fragment_roundtrip() {
        let mut frag = SqlFragment::new();
        frag.push("\"id\" = ");
        frag.push_param(SqlParam::Int(1));
        let expr = Expr::from_fragment(frag);
        assert_eq!(expr.sql(), "\"id\" = $1");
        assert_eq!(expr.params(), &[SqlParam::Int(1)]);
    }

    #[test]
    fn test_order_expr() {
        let order = OrderExpr::new("created_at").desc().nulls_last();
        let frag = order.into_fragment();
        assert_eq!(frag.sql(), "\"created_at\" DESC NULLS LAST");
    }
}
