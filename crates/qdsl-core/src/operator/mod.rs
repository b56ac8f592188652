//! The operator registry: the closed set of operators, their arities,
//! value shapes, and per-backend support.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

/// The closed set of operator tags. Wire form is the string in `as_str()`,
/// not the Rust variant name — several operators (`=`, `!=`, `>`, ...)
/// aren't valid identifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperatorTag {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    NotIn,
    All,
    Between,
    NotBetween,
    Like,
    NotLike,
    ILike,
    NotILike,
    Contains,
    IContains,
    StartsWith,
    IStartsWith,
    EndsWith,
    IEndsWith,
    Regex,
    IRegex,
    IsNull,
    IsNotNull,
    IsEmpty,
    IsNotEmpty,
    JsonbContains,
    JsonbContainedBy,
    JsonbHasKey,
    JsonbHasAnyKeys,
    JsonbHasAllKeys,
    JsonbPathExists,
    Intersects,
    Within,
    ContainsGeom,
    Touches,
    Crosses,
    Overlaps,
    Disjoint,
    GeomEquals,
    DistanceLt,
    Dwithin,
    BboxIntersects,
    Fts,
    FtsPhrase,
}

impl OperatorTag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Neq => "!=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::In => "in",
            Self::NotIn => "not_in",
            Self::All => "all",
            Self::Between => "between",
            Self::NotBetween => "not_between",
            Self::Like => "like",
            Self::NotLike => "not_like",
            Self::ILike => "ilike",
            Self::NotILike => "not_ilike",
            Self::Contains => "contains",
            Self::IContains => "icontains",
            Self::StartsWith => "startswith",
            Self::IStartsWith => "istartswith",
            Self::EndsWith => "endswith",
            Self::IEndsWith => "iendswith",
            Self::Regex => "regex",
            Self::IRegex => "iregex",
            Self::IsNull => "is_null",
            Self::IsNotNull => "is_not_null",
            Self::IsEmpty => "is_empty",
            Self::IsNotEmpty => "is_not_empty",
            Self::JsonbContains => "jsonb_contains",
            Self::JsonbContainedBy => "jsonb_contained_by",
            Self::JsonbHasKey => "jsonb_has_key",
            Self::JsonbHasAnyKeys => "jsonb_has_any_keys",
            Self::JsonbHasAllKeys => "jsonb_has_all_keys",
            Self::JsonbPathExists => "jsonb_path_exists",
            Self::Intersects => "intersects",
            Self::Within => "within",
            Self::ContainsGeom => "contains_geom",
            Self::Touches => "touches",
            Self::Crosses => "crosses",
            Self::Overlaps => "overlaps",
            Self::Disjoint => "disjoint",
            Self::GeomEquals => "geom_equals",
            Self::DistanceLt => "distance_lt",
            Self::Dwithin => "dwithin",
            Self::BboxIntersects => "bbox_intersects",
            Self::Fts => "fts",
            Self::FtsPhrase => "fts_phrase",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        registry().by_name(s)
    }

    /// Every member of the closed set, for iteration (fuzzy suggestion,
    /// building an `OperatorSet`).
    pub fn all() -> &'static [OperatorTag] {
        &ALL_TAGS
    }

    pub fn info(self) -> &'static OperatorInfo {
        registry()
            .by_tag
            .get(&self)
            .expect("every OperatorTag has a registry entry")
    }
}

impl std::str::FromStr for OperatorTag {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_opt(s).ok_or_else(|| format!("unknown operator '{s}'"))
    }
}

impl std::fmt::Display for OperatorTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for OperatorTag {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OperatorTag {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// How many operands a condition's `value` carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arity {
    /// Forbids `value` entirely (`is_null`, `is_empty`, ...).
    Unary,
    /// Exactly one `value`.
    Binary,
    /// `value` is a list.
    NAry,
}

/// The shape a condition's `value` must take.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    /// No value (paired with [`Arity::Unary`]).
    None,
    /// Any scalar (bool/number/string/timestamp).
    Scalar,
    /// A string, specifically (pattern-matching operators).
    Pattern,
    /// A string, specifically (full-text query/JSONB key).
    TokenString,
    /// A homogeneous list of scalars.
    List,
    /// `(v, v)`, `lo ≤ hi`.
    RangePair,
    /// A GeoJSON geometry.
    Geometry,
    /// `[xmin, ymin, xmax, ymax]`.
    Bbox,
    /// `(geometry, distance-meters)`.
    DwithinPair,
    /// Arbitrary JSON (JSONB containment operators).
    Json,
}

/// Which backend(s) support an operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Backends {
    pub memory: bool,
    pub sql: bool,
}

impl Backends {
    pub const BOTH: Backends = Backends {
        memory: true,
        sql: true,
    };
    pub const SQL_ONLY: Backends = Backends {
        memory: false,
        sql: true,
    };

    pub fn supports(&self, backend: Backend) -> bool {
        match backend {
            Backend::Memory => self.memory,
            Backend::Sql => self.sql,
        }
    }
}

/// The evaluator backend a query is dispatched to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    Memory,
    Sql,
}

impl Backend {
    pub fn as_str(self) -> &'static str {
        match self {
            Backend::Memory => "memory",
            Backend::Sql => "sql",
        }
    }
}

/// The semantic grouping an operator belongs to, purely descriptive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperatorFamily {
    Comparison,
    Set,
    String,
    NullEmpty,
    Jsonb,
    Geometry,
    FullText,
}

/// One entry in the operator registry.
#[derive(Clone, Copy, Debug)]
pub struct OperatorInfo {
    pub tag: OperatorTag,
    pub arity: Arity,
    pub value_kind: ValueKind,
    pub backends: Backends,
    pub family: OperatorFamily,
}

/// A set of permitted operators, used to parameterize validation by the
/// effective backend (§4.C: "validation is parameterized by the
/// effective backend's operator set").
#[derive(Clone, Debug)]
pub struct OperatorSet(std::collections::HashSet<OperatorTag>);

impl OperatorSet {
    pub fn for_backend(backend: Backend) -> Self {
        Self(
            OperatorTag::all()
                .iter()
                .copied()
                .filter(|t| t.info().backends.supports(backend))
                .collect(),
        )
    }

    pub fn contains(&self, tag: OperatorTag) -> bool {
        self.0.contains(&tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = OperatorTag> + '_ {
        self.0.iter().copied()
    }
}

const ALL_TAGS: [OperatorTag; 45] = [
    OperatorTag::Eq,
    OperatorTag::Neq,
    OperatorTag::Gt,
    OperatorTag::Gte,
    OperatorTag::Lt,
    OperatorTag::Lte,
    OperatorTag::In,
    OperatorTag::NotIn,
    OperatorTag::All,
    OperatorTag::Between,
    OperatorTag::NotBetween,
    OperatorTag::Like,
    OperatorTag::NotLike,
    OperatorTag::ILike,
    OperatorTag::NotILike,
    OperatorTag::Contains,
    OperatorTag::IContains,
    OperatorTag::StartsWith,
    OperatorTag::IStartsWith,
    OperatorTag::EndsWith,
    OperatorTag::IEndsWith,
    OperatorTag::Regex,
    OperatorTag::IRegex,
    OperatorTag::IsNull,
    OperatorTag::IsNotNull,
    OperatorTag::IsEmpty,
    OperatorTag::IsNotEmpty,
    OperatorTag::JsonbContains,
    OperatorTag::JsonbContainedBy,
    OperatorTag::JsonbHasKey,
    OperatorTag::JsonbHasAnyKeys,
    OperatorTag::JsonbHasAllKeys,
    OperatorTag::JsonbPathExists,
    OperatorTag::Intersects,
    OperatorTag::Within,
    OperatorTag::ContainsGeom,
    OperatorTag::Touches,
    OperatorTag::Crosses,
    OperatorTag::Overlaps,
    OperatorTag::Disjoint,
    OperatorTag::GeomEquals,
    OperatorTag::DistanceLt,
    OperatorTag::Dwithin,
    OperatorTag::BboxIntersects,
    OperatorTag::Fts,
    OperatorTag::FtsPhrase,
];

struct Registry {
    by_tag: HashMap<OperatorTag, OperatorInfo>,
    by_name: HashMap<&'static str, OperatorTag>,
}

impl Registry {
    fn by_name(&self, s: &str) -> Option<OperatorTag> {
        self.by_name.get(s).copied()
    }
}

static REGISTRY: OnceLock<Registry> = OnceLock::new();

fn registry() -> &'static Registry {
    REGISTRY.get_or_init(build_registry)
}

fn entry(
    tag: OperatorTag,
    arity: Arity,
    value_kind: ValueKind,
    backends: Backends,
    family: OperatorFamily,
) -> OperatorInfo {
    OperatorInfo {
        tag,
        arity,
        value_kind,
        backends,
        family,
    }
}

fn build_registry() -> Registry {
    use Arity::*;
    use OperatorFamily as Fam;
    use OperatorTag::*;
    use ValueKind::*;

    let entries = [
        entry(Eq, Binary, Scalar, Backends::BOTH, Fam::Comparison),
        entry(Neq, Binary, Scalar, Backends::BOTH, Fam::Comparison),
        entry(Gt, Binary, Scalar, Backends::BOTH, Fam::Comparison),
        entry(Gte, Binary, Scalar, Backends::BOTH, Fam::Comparison),
        entry(Lt, Binary, Scalar, Backends::BOTH, Fam::Comparison),
        entry(Lte, Binary, Scalar, Backends::BOTH, Fam::Comparison),
        entry(In, NAry, List, Backends::BOTH, Fam::Set),
        entry(NotIn, NAry, List, Backends::BOTH, Fam::Set),
        entry(All, NAry, List, Backends::BOTH, Fam::Set),
        entry(Between, Binary, RangePair, Backends::BOTH, Fam::Set),
        entry(NotBetween, Binary, RangePair, Backends::BOTH, Fam::Set),
        entry(Like, Binary, Pattern, Backends::BOTH, Fam::String),
        entry(NotLike, Binary, Pattern, Backends::BOTH, Fam::String),
        entry(ILike, Binary, Pattern, Backends::BOTH, Fam::String),
        entry(NotILike, Binary, Pattern, Backends::BOTH, Fam::String),
        entry(Contains, Binary, Pattern, Backends::BOTH, Fam::String),
        entry(IContains, Binary, Pattern, Backends::BOTH, Fam::String),
        entry(StartsWith, Binary, Pattern, Backends::BOTH, Fam::String),
        entry(IStartsWith, Binary, Pattern, Backends::BOTH, Fam::String),
        entry(EndsWith, Binary, Pattern, Backends::BOTH, Fam::String),
        entry(IEndsWith, Binary, Pattern, Backends::BOTH, Fam::String),
        entry(Regex, Binary, Pattern, Backends::BOTH, Fam::String),
        entry(IRegex, Binary, Pattern, Backends::BOTH, Fam::String),
        entry(IsNull, Unary, None, Backends::BOTH, Fam::NullEmpty),
        entry(IsNotNull, Unary, None, Backends::BOTH, Fam::NullEmpty),
        entry(IsEmpty, Unary, None, Backends::BOTH, Fam::NullEmpty),
        entry(IsNotEmpty, Unary, None, Backends::BOTH, Fam::NullEmpty),
        entry(JsonbContains, Binary, Json, Backends::SQL_ONLY, Fam::Jsonb),
        entry(JsonbContainedBy, Binary, Json, Backends::SQL_ONLY, Fam::Jsonb),
        entry(JsonbHasKey, Binary, TokenString, Backends::SQL_ONLY, Fam::Jsonb),
        entry(JsonbHasAnyKeys, NAry, List, Backends::SQL_ONLY, Fam::Jsonb),
        entry(JsonbHasAllKeys, NAry, List, Backends::SQL_ONLY, Fam::Jsonb),
        entry(
            JsonbPathExists,
            Binary,
            TokenString,
            Backends::SQL_ONLY,
            Fam::Jsonb,
        ),
        entry(Intersects, Binary, Geometry, Backends::SQL_ONLY, Fam::Geometry),
        entry(Within, Binary, Geometry, Backends::SQL_ONLY, Fam::Geometry),
        entry(ContainsGeom, Binary, Geometry, Backends::SQL_ONLY, Fam::Geometry),
        entry(Touches, Binary, Geometry, Backends::SQL_ONLY, Fam::Geometry),
        entry(Crosses, Binary, Geometry, Backends::SQL_ONLY, Fam::Geometry),
        entry(Overlaps, Binary, Geometry, Backends::SQL_ONLY, Fam::Geometry),
        entry(Disjoint, Binary, Geometry, Backends::SQL_ONLY, Fam::Geometry),
        entry(GeomEquals, Binary, Geometry, Backends::SQL_ONLY, Fam::Geometry),
        entry(DistanceLt, Binary, DwithinPair, Backends::SQL_ONLY, Fam::Geometry),
        entry(Dwithin, Binary, DwithinPair, Backends::SQL_ONLY, Fam::Geometry),
        entry(BboxIntersects, Binary, Bbox, Backends::SQL_ONLY, Fam::Geometry),
        entry(Fts, Binary, TokenString, Backends::SQL_ONLY, Fam::FullText),
        entry(FtsPhrase, Binary, TokenString, Backends::SQL_ONLY, Fam::FullText),
    ];

    let mut by_tag = HashMap::new();
    let mut by_name = HashMap::new();
    for e in entries {
        by_name.insert(e.tag.as_str(), e.tag);
        by_tag.insert(e.tag, e);
    }

    Registry { by_tag, by_name }
}

impl OperatorTag {
    /// Force registry initialization; useful for callers that want the
    /// one-time init cost paid eagerly rather than on first lookup.
    pub fn init_registry() {
        registry();
    }
}
