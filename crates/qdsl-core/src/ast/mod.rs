//! The query abstract syntax tree: a pure, structurally-equal value tree.
//!
//! Queries are built once (via [`builder::QueryBuilder`]), validated once,
//! and consumed read-only by every evaluator from there on — nothing in
//! this module ever mutates a tree in place.

pub mod builder;

use serde::{Deserialize, Serialize};

/// A parsed, not-yet-validated (or already-validated) query.
///
/// Top-level `groups` are conjoined: `Query { groups: [g1, g2] }` means
/// `g1 AND g2`. This mirrors a single implicit AND group whose children
/// are the listed groups.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub groups: Vec<Group>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<OrderKey>,
}

impl Query {
    /// Maximum nesting depth across all top-level groups.
    pub fn depth(&self) -> u32 {
        self.groups.iter().map(Group::depth).max().unwrap_or(0)
    }
}

/// The boolean operator combining a [`Group`]'s children.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupOp {
    And,
    Or,
    Not,
}

/// An internal AST node: a boolean combination of child nodes.
///
/// `Not` groups must have exactly one child — this is an AST-shape
/// invariant enforced by the validator, not the type system, because the
/// wire format (§6) represents a `Not` group the same way as `And`/`Or`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Group {
    #[serde(rename = "group_operator", default = "default_group_op")]
    pub op: GroupOp,
    #[serde(rename = "conditions")]
    pub children: Vec<Node>,
}

fn default_group_op() -> GroupOp {
    GroupOp::And
}

impl Group {
    pub fn new(op: GroupOp, children: Vec<Node>) -> Self {
        Self { op, children }
    }

    pub fn depth(&self) -> u32 {
        1 + self
            .children
            .iter()
            .map(|c| match c {
                Node::Group(g) => g.depth(),
                Node::Condition(_) => 0,
            })
            .max()
            .unwrap_or(0)
    }
}

/// A tagged sum of the two kinds of AST node: an internal `Group` or a
/// leaf `Condition`. Traversal always uses exhaustive case analysis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Group(Group),
    Condition(Condition),
}

/// A leaf predicate: `field op value`.
///
/// `operator` is the raw wire token (e.g. `"eq"`, `"not_in"`), not yet
/// resolved against the operator registry — that resolution, and the
/// `UnknownOperator` error it can produce, belongs to the validator
/// (§4.C), which is parameterized by the effective backend's permitted
/// operator set and so cannot be baked into parsing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: DottedPath,
    pub operator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl Condition {
    pub fn new(field: DottedPath, operator: impl Into<String>, value: Option<Value>) -> Self {
        Self {
            field,
            operator: operator.into(),
            value,
        }
    }
}

/// A non-empty, dot-separated sequence of identifiers, e.g. `profile.address.city`.
///
/// Each identifier matches `[A-Za-z_][A-Za-z0-9_]*`. Depth is bounded by
/// the validator's configured maximum, not by this type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct DottedPath(Vec<String>);

impl DottedPath {
    /// Parse a dotted path from its textual form, without validating
    /// identifier shape (see [`crate::validate::is_valid_identifier`]).
    pub fn parse(s: &str) -> Result<Self, String> {
        if s.is_empty() {
            return Err("path must not be empty".to_string());
        }
        let segments: Vec<String> = s.split('.').map(str::to_string).collect();
        if segments.iter().any(|seg| seg.is_empty()) {
            return Err(format!("path '{s}' has an empty segment"));
        }
        Ok(Self(segments))
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn last(&self) -> &str {
        self.0.last().expect("DottedPath is never empty")
    }

    pub fn as_str(&self) -> String {
        self.0.join(".")
    }
}

impl std::fmt::Display for DottedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for DottedPath {
    type Error = String;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<DottedPath> for String {
    fn from(p: DottedPath) -> Self {
        p.as_str()
    }
}

/// Sort direction for an [`OrderKey`]. Textual form prefixes the path
/// with `-` for `Desc`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderDirection {
    Asc,
    Desc,
}

/// One key in a query's `order_by` list.
#[derive(Clone, Debug, PartialEq)]
pub struct OrderKey {
    pub path: DottedPath,
    pub direction: OrderDirection,
}

impl OrderKey {
    pub fn asc(path: DottedPath) -> Self {
        Self {
            path,
            direction: OrderDirection::Asc,
        }
    }

    pub fn desc(path: DottedPath) -> Self {
        Self {
            path,
            direction: OrderDirection::Desc,
        }
    }

    /// Parse the wire form: `"-field"` for DESC, `"field"` for ASC.
    pub fn parse(s: &str) -> Result<Self, String> {
        if let Some(rest) = s.strip_prefix('-') {
            Ok(Self::desc(DottedPath::parse(rest)?))
        } else {
            Ok(Self::asc(DottedPath::parse(s)?))
        }
    }

    pub fn as_str(&self) -> String {
        match self.direction {
            OrderDirection::Asc => self.path.as_str(),
            OrderDirection::Desc => format!("-{}", self.path.as_str()),
        }
    }
}

impl Serialize for OrderKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_str())
    }
}

impl<'de> Deserialize<'de> for OrderKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        OrderKey::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// A condition's operand. A tagged union covering every value shape the
/// operator matrix requires, plus an additive `Json` member (not present
/// in the closed enumeration of scalar/list/geometry/bbox/pair shapes)
/// used only by the JSONB operator family, which needs an arbitrary JSON
/// operand for `jsonb_contains`/`jsonb_contained_by`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Real(f64),
    String(String),
    Timestamp(chrono::DateTime<chrono::Utc>),
    List(Vec<Value>),
    Geometry(geo_types::Geometry<f64>),
    /// `[xmin, ymin, xmax, ymax]`
    Bbox([f64; 4]),
    /// `(geometry, distance-meters)`, the shared operand shape of
    /// `distance_lt` and `dwithin`.
    DWithin {
        geometry: Box<Value>,
        distance_m: f64,
    },
    /// `(v, v)`, the shared operand shape of `between`/`not_between`.
    Between(Box<Value>, Box<Value>),
    /// Arbitrary JSON, used by the JSONB operator family.
    Json(serde_json::Value),
}

impl Value {
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) | Value::Real(_) => "number",
            Value::String(_) => "string",
            Value::Timestamp(_) => "timestamp",
            Value::List(_) => "list",
            Value::Geometry(_) => "geometry",
            Value::Bbox(_) => "bbox",
            Value::DWithin { .. } => "dwithin-pair",
            Value::Between(_, _) => "between-pair",
            Value::Json(_) => "json",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}
