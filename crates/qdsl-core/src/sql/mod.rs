//! The SQL translator (§4.G): turns a validated query into a single
//! parameterized `SELECT`, built from the path resolver's join plan.
//!
//! `qdsl_sql::Expr`'s operator constructors each escape a bare column
//! name internally, so they can't take an already-qualified
//! `alias.column` reference without double-quoting it wrong. Every
//! condition here is instead built directly against `SqlFragment` and
//! `escape_ident`, then wrapped with `Expr::from_fragment`. The same
//! problem shows up one level up: `SelectBuilder::inner_join`/
//! `left_join` escape their `table` argument too, so they can't express
//! `JOIN relation AS alias`. The full `FROM ... JOIN ...` clause is
//! built as one raw fragment instead.

use std::future::Future;
use std::pin::Pin;

use futures::Stream;
use geo_types::{Coord, Geometry as GeoGeometry, LineString};
use serde_json::json;

use qdsl_sql::{escape_ident, from_qi, Expr, QualifiedIdentifier, SelectBuilder, SqlFragment, SqlParam};

use crate::ast::{Condition, Group, GroupOp, Node, OrderDirection, Query, Value};
use crate::error::BackendError;
use crate::operator::OperatorTag;
use crate::resolve::{JoinKind, Resolver, SqlTarget};
use crate::schema::SchemaIntrospector;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Convert a scalar-shaped AST value into a single bound parameter.
///
/// Compound shapes (`list`, `between-pair`, `dwithin-pair`, `bbox`) spread
/// across more than one placeholder, so each operator that takes one of
/// those destructures its own operand rather than calling this.
pub fn value_to_param(value: &Value) -> Result<SqlParam, BackendError> {
    match value {
        Value::Null => Ok(SqlParam::Null),
        Value::Bool(b) => Ok(SqlParam::Bool(*b)),
        Value::Int(i) => Ok(SqlParam::Int(*i)),
        Value::Real(f) => Ok(SqlParam::Float(*f)),
        Value::String(s) => Ok(SqlParam::Text(s.clone())),
        Value::Timestamp(t) => Ok(SqlParam::Timestamp(*t)),
        Value::Json(j) => Ok(SqlParam::Json(j.clone())),
        Value::Geometry(g) => Ok(SqlParam::Json(geometry_to_geojson(g)?)),
        other => Err(BackendError::TranslationFailed {
            op: "value".to_string(),
            detail: format!("a {} value has no single-parameter SQL form", other.kind()),
        }),
    }
}

/// Render a `geo_types` geometry as the GeoJSON object `ST_GeomFromGeoJSON`
/// expects. `geo_types`' own `Serialize` impl is not GeoJSON-shaped, so
/// this walks the enum by hand.
fn geometry_to_geojson(geom: &GeoGeometry<f64>) -> Result<serde_json::Value, BackendError> {
    fn coord(c: &Coord<f64>) -> serde_json::Value {
        json!([c.x, c.y])
    }
    fn ring(ls: &LineString<f64>) -> serde_json::Value {
        serde_json::Value::Array(ls.0.iter().map(coord).collect())
    }
    fn polygon_rings(poly: &geo_types::Polygon<f64>) -> serde_json::Value {
        let mut rings = vec![ring(poly.exterior())];
        rings.extend(poly.interiors().iter().map(ring));
        serde_json::Value::Array(rings)
    }

    Ok(match geom {
        GeoGeometry::Point(p) => json!({"type": "Point", "coordinates": coord(&p.0)}),
        GeoGeometry::LineString(ls) => json!({"type": "LineString", "coordinates": ring(ls)}),
        GeoGeometry::Polygon(poly) => json!({"type": "Polygon", "coordinates": polygon_rings(poly)}),
        GeoGeometry::MultiPoint(mp) => json!({
            "type": "MultiPoint",
            "coordinates": mp.0.iter().map(|p| coord(&p.0)).collect::<Vec<_>>(),
        }),
        GeoGeometry::MultiLineString(mls) => json!({
            "type": "MultiLineString",
            "coordinates": mls.0.iter().map(ring).collect::<Vec<_>>(),
        }),
        GeoGeometry::MultiPolygon(mpoly) => json!({
            "type": "MultiPolygon",
            "coordinates": mpoly.0.iter().map(polygon_rings).collect::<Vec<_>>(),
        }),
        GeoGeometry::GeometryCollection(gc) => {
            let geometries = gc
                .0
                .iter()
                .map(geometry_to_geojson)
                .collect::<Result<Vec<_>, _>>()?;
            json!({"type": "GeometryCollection", "geometries": geometries})
        }
        other => {
            return Err(BackendError::TranslationFailed {
                op: "geometry".to_string(),
                detail: format!("{other:?} has no GeoJSON equivalent"),
            })
        }
    })
}

fn qualify(alias: &str, column: &str) -> String {
    format!("{}.{}", escape_ident(alias), escape_ident(column))
}

fn qcol(alias: &str, column: &str) -> SqlFragment {
    SqlFragment::raw(qualify(alias, column))
}

fn qbinary(alias: &str, column: &str, op: &str, value: SqlParam) -> Expr {
    let mut frag = qcol(alias, column);
    frag.push(op);
    frag.push_param(value);
    Expr::from_fragment(frag)
}

fn qbetween(alias: &str, column: &str, lo: SqlParam, hi: SqlParam, negate: bool) -> Expr {
    let mut frag = qcol(alias, column);
    frag.push(if negate { " NOT BETWEEN " } else { " BETWEEN " });
    frag.push_param(lo);
    frag.push(" AND ");
    frag.push_param(hi);
    Expr::from_fragment(frag)
}

fn qin_list(alias: &str, column: &str, values: Vec<SqlParam>, negate: bool) -> Expr {
    if values.is_empty() {
        return Expr::from_fragment(SqlFragment::raw(if negate { "TRUE" } else { "FALSE" }));
    }
    let mut frag = qcol(alias, column);
    frag.push(if negate { " NOT IN (" } else { " IN (" });
    for (i, value) in values.into_iter().enumerate() {
        if i > 0 {
            frag.push(", ");
        }
        frag.push_param(value);
    }
    frag.push(")");
    Expr::from_fragment(frag)
}

fn qnull(alias: &str, column: &str, suffix: &str) -> Expr {
    Expr::from_fragment(SqlFragment::raw(format!("{} {}", qualify(alias, column), suffix)))
}

fn qempty(alias: &str, column: &str, negate: bool) -> Expr {
    let op = if negate { "<>" } else { "=" };
    Expr::from_fragment(SqlFragment::raw(format!("{} {} ''", qualify(alias, column), op)))
}

fn qkeys(alias: &str, column: &str, keys: Vec<SqlParam>, op: &str) -> Expr {
    let mut frag = qcol(alias, column);
    frag.push(op);
    frag.push_param(SqlParam::Array(keys));
    Expr::from_fragment(frag)
}

fn qjsonb_path_exists(alias: &str, column: &str, path: SqlParam) -> Expr {
    let mut frag = SqlFragment::raw(format!("jsonb_path_exists({}, ", qualify(alias, column)));
    frag.push_param(path);
    frag.push(")");
    Expr::from_fragment(frag)
}

fn qspatial(alias: &str, column: &str, func: &str, geom: SqlParam) -> Expr {
    let mut frag = SqlFragment::new();
    frag.push(func);
    frag.push("(");
    frag.push(&qualify(alias, column));
    frag.push(", ST_GeomFromGeoJSON(");
    frag.push_param(geom);
    frag.push("))");
    Expr::from_fragment(frag)
}

fn qdistance_lt(alias: &str, column: &str, geom: SqlParam, distance: SqlParam) -> Expr {
    let mut frag = SqlFragment::raw(format!("ST_Distance({}, ST_GeomFromGeoJSON(", qualify(alias, column)));
    frag.push_param(geom);
    frag.push(")) < ");
    frag.push_param(distance);
    Expr::from_fragment(frag)
}

fn qdwithin(alias: &str, column: &str, geom: SqlParam, distance: SqlParam) -> Expr {
    let mut frag = SqlFragment::raw(format!("ST_DWithin({}, ST_GeomFromGeoJSON(", qualify(alias, column)));
    frag.push_param(geom);
    frag.push("), ");
    frag.push_param(distance);
    frag.push(")");
    Expr::from_fragment(frag)
}

fn qbbox_intersects(alias: &str, column: &str, bbox: [f64; 4]) -> Expr {
    let mut frag = qcol(alias, column);
    frag.push(" && ST_MakeEnvelope(");
    frag.push_param(bbox[0]);
    frag.push(", ");
    frag.push_param(bbox[1]);
    frag.push(", ");
    frag.push_param(bbox[2]);
    frag.push(", ");
    frag.push_param(bbox[3]);
    frag.push(", 4326)");
    Expr::from_fragment(frag)
}

fn qfts(alias: &str, column: &str, tsquery_fn: &str, query: SqlParam, language: Option<&str>) -> Expr {
    let mut frag = qcol(alias, column);
    frag.push(" @@ ");
    frag.push(tsquery_fn);
    frag.push("(");
    if let Some(lang) = language {
        frag.push_param(SqlParam::Text(lang.to_string()));
        frag.push(", ");
        frag.push_param(query);
    } else {
        frag.push_param(query);
    }
    frag.push(")");
    Expr::from_fragment(frag)
}

/// Escape the characters a `LIKE` pattern treats specially, so a literal
/// substring needle can be wrapped in caller-controlled `%` wildcards
/// without the needle itself acting as one.
fn escape_like_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c == '%' || c == '_' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn operand(condition: &Condition) -> Result<&Value, BackendError> {
    condition.value.as_ref().ok_or_else(|| BackendError::TranslationFailed {
        op: condition.operator.clone(),
        detail: "operator requires a value".to_string(),
    })
}

fn string_operand(condition: &Condition) -> Result<&str, BackendError> {
    match operand(condition)? {
        Value::String(s) => Ok(s.as_str()),
        other => Err(shape_err(&condition.operator, other)),
    }
}

fn shape_err(op: &str, got: &Value) -> BackendError {
    BackendError::TranslationFailed {
        op: op.to_string(),
        detail: format!("operand shape did not match: got a {} value", got.kind()),
    }
}

async fn translate_condition<S: SchemaIntrospector + Sync>(
    condition: &Condition,
    resolver: &mut Resolver<'_, S>,
    default_fts_language: Option<&str>,
) -> Result<Expr, BackendError> {
    let target = resolver
        .resolve_sql(&condition.field)
        .await
        .map_err(|e| BackendError::TranslationFailed {
            op: condition.operator.clone(),
            detail: e.to_string(),
        })?;
    let (alias, column) = match target {
        SqlTarget::Column { alias, column } => (alias, column),
        // A hook fully owns this condition's predicate; splice its
        // fragment in verbatim rather than running it through the
        // operator matrix below.
        SqlTarget::Predicate(fragment) => return Ok(Expr::from_fragment(fragment)),
    };
    let alias = alias.as_str();
    let column = column.as_str();

    // The validator has already rejected unknown/unsupported operators;
    // this lookup can't fail for a query that reached the translator.
    let tag = OperatorTag::from_str_opt(&condition.operator).ok_or_else(|| BackendError::TranslationFailed {
        op: condition.operator.clone(),
        detail: "unknown operator reached the translator unvalidated".to_string(),
    })?;
    use OperatorTag::*;

    Ok(match tag {
        IsNull => qnull(alias, column, "IS NULL"),
        IsNotNull => qnull(alias, column, "IS NOT NULL"),
        IsEmpty => qempty(alias, column, false),
        IsNotEmpty => qempty(alias, column, true),

        Eq | Neq | Gt | Gte | Lt | Lte => {
            let op = match tag {
                Eq => " = ",
                Neq => " <> ",
                Gt => " > ",
                Gte => " >= ",
                Lt => " < ",
                Lte => " <= ",
                _ => unreachable!(),
            };
            qbinary(alias, column, op, value_to_param(operand(condition)?)?)
        }

        In | NotIn => {
            let items = match operand(condition)? {
                Value::List(items) => items,
                other => return Err(shape_err(&condition.operator, other)),
            };
            let params = items.iter().map(value_to_param).collect::<Result<Vec<_>, _>>()?;
            qin_list(alias, column, params, tag == NotIn)
        }

        All => {
            let items = match operand(condition)? {
                Value::List(items) => items,
                other => return Err(shape_err(&condition.operator, other)),
            };
            let params = items.iter().map(value_to_param).collect::<Result<Vec<_>, _>>()?;
            qbinary(alias, column, " <@ ", SqlParam::Array(params))
        }

        Between | NotBetween => {
            let (lo, hi) = match operand(condition)? {
                Value::Between(lo, hi) => (lo.as_ref(), hi.as_ref()),
                other => return Err(shape_err(&condition.operator, other)),
            };
            qbetween(alias, column, value_to_param(lo)?, value_to_param(hi)?, tag == NotBetween)
        }

        Like => qbinary(alias, column, " LIKE ", value_to_param(operand(condition)?)?),
        NotLike => qbinary(alias, column, " NOT LIKE ", value_to_param(operand(condition)?)?),
        ILike => qbinary(alias, column, " ILIKE ", value_to_param(operand(condition)?)?),
        NotILike => qbinary(alias, column, " NOT ILIKE ", value_to_param(operand(condition)?)?),

        Contains | IContains | StartsWith | IStartsWith | EndsWith | IEndsWith => {
            let needle = escape_like_literal(string_operand(condition)?);
            let pattern = match tag {
                Contains | IContains => format!("%{needle}%"),
                StartsWith | IStartsWith => format!("{needle}%"),
                EndsWith | IEndsWith => format!("%{needle}"),
                _ => unreachable!(),
            };
            let op = if matches!(tag, IContains | IStartsWith | IEndsWith) {
                " ILIKE "
            } else {
                " LIKE "
            };
            qbinary(alias, column, op, SqlParam::Text(pattern))
        }

        Regex => qbinary(alias, column, " ~ ", value_to_param(operand(condition)?)?),
        IRegex => qbinary(alias, column, " ~* ", value_to_param(operand(condition)?)?),

        JsonbContains => qbinary(alias, column, " @> ", value_to_param(operand(condition)?)?),
        JsonbContainedBy => qbinary(alias, column, " <@ ", value_to_param(operand(condition)?)?),
        JsonbHasKey => qbinary(alias, column, " ? ", value_to_param(operand(condition)?)?),
        JsonbHasAnyKeys => {
            let items = match operand(condition)? {
                Value::List(items) => items,
                other => return Err(shape_err(&condition.operator, other)),
            };
            let params = items.iter().map(value_to_param).collect::<Result<Vec<_>, _>>()?;
            qkeys(alias, column, params, " ?| ")
        }
        JsonbHasAllKeys => {
            let items = match operand(condition)? {
                Value::List(items) => items,
                other => return Err(shape_err(&condition.operator, other)),
            };
            let params = items.iter().map(value_to_param).collect::<Result<Vec<_>, _>>()?;
            qkeys(alias, column, params, " ?& ")
        }
        JsonbPathExists => qjsonb_path_exists(alias, column, value_to_param(operand(condition)?)?),

        Intersects => qspatial(alias, column, "ST_Intersects", value_to_param(operand(condition)?)?),
        Within => qspatial(alias, column, "ST_Within", value_to_param(operand(condition)?)?),
        ContainsGeom => qspatial(alias, column, "ST_Contains", value_to_param(operand(condition)?)?),
        Touches => qspatial(alias, column, "ST_Touches", value_to_param(operand(condition)?)?),
        Crosses => qspatial(alias, column, "ST_Crosses", value_to_param(operand(condition)?)?),
        Overlaps => qspatial(alias, column, "ST_Overlaps", value_to_param(operand(condition)?)?),
        Disjoint => qspatial(alias, column, "ST_Disjoint", value_to_param(operand(condition)?)?),
        GeomEquals => qspatial(alias, column, "ST_Equals", value_to_param(operand(condition)?)?),

        DistanceLt | Dwithin => {
            let (geometry, distance_m) = match operand(condition)? {
                Value::DWithin { geometry, distance_m } => (geometry.as_ref(), *distance_m),
                other => return Err(shape_err(&condition.operator, other)),
            };
            let geom_param = value_to_param(geometry)?;
            if tag == DistanceLt {
                qdistance_lt(alias, column, geom_param, SqlParam::Float(distance_m))
            } else {
                qdwithin(alias, column, geom_param, SqlParam::Float(distance_m))
            }
        }

        BboxIntersects => {
            let bbox = match operand(condition)? {
                Value::Bbox(b) => *b,
                other => return Err(shape_err(&condition.operator, other)),
            };
            qbbox_intersects(alias, column, bbox)
        }

        Fts => qfts(alias, column, "plainto_tsquery", value_to_param(operand(condition)?)?, default_fts_language),
        FtsPhrase => qfts(alias, column, "phraseto_tsquery", value_to_param(operand(condition)?)?, default_fts_language),
    })
}

fn translate_node<'a, S: SchemaIntrospector + Sync>(
    node: &'a Node,
    resolver: &'a mut Resolver<'_, S>,
    default_fts_language: Option<&'a str>,
) -> BoxFuture<'a, Result<Expr, BackendError>> {
    Box::pin(async move {
        match node {
            Node::Group(g) => translate_group(g, resolver, default_fts_language).await,
            Node::Condition(c) => translate_condition(c, resolver, default_fts_language).await,
        }
    })
}

fn translate_group<'a, S: SchemaIntrospector + Sync>(
    group: &'a Group,
    resolver: &'a mut Resolver<'_, S>,
    default_fts_language: Option<&'a str>,
) -> BoxFuture<'a, Result<Expr, BackendError>> {
    Box::pin(async move {
        let mut children = Vec::with_capacity(group.children.len());
        for child in &group.children {
            children.push(translate_node(child, resolver, default_fts_language).await?);
        }
        Ok(match group.op {
            GroupOp::And => Expr::and_all(children),
            GroupOp::Or => Expr::or_all(children),
            GroupOp::Not => children
                .into_iter()
                .next()
                .expect("validated NOT group has exactly one child")
                .not(),
        })
    })
}

fn qorder(alias: &str, column: &str, direction: OrderDirection) -> SqlFragment {
    let mut frag = qcol(alias, column);
    frag.push(match direction {
        OrderDirection::Asc => " ASC",
        OrderDirection::Desc => " DESC",
    });
    frag
}

/// Translate a validated query into one parameterized `SELECT`, resolving
/// every condition's and `order_by` key's path against `resolver` and
/// folding the resulting join plan into the `FROM` clause.
pub async fn translate<S: SchemaIntrospector + Sync>(
    query: &Query,
    mut resolver: Resolver<'_, S>,
    table: &QualifiedIdentifier,
    default_fts_language: Option<&str>,
) -> Result<SqlFragment, BackendError> {
    let mut group_exprs = Vec::with_capacity(query.groups.len());
    for group in &query.groups {
        group_exprs.push(translate_group(group, &mut resolver, default_fts_language).await?);
    }

    let mut order_fragments = Vec::with_capacity(query.order_by.len());
    for key in &query.order_by {
        let target = resolver
            .resolve_sql(&key.path)
            .await
            .map_err(|e| BackendError::TranslationFailed {
                op: "order_by".to_string(),
                detail: e.to_string(),
            })?;
        let (alias, column) = match target {
            SqlTarget::Column { alias, column } => (alias, column),
            SqlTarget::Predicate(_) => {
                return Err(BackendError::TranslationFailed {
                    op: "order_by".to_string(),
                    detail: format!("'{}' resolves to a predicate, not a sortable column", key.path.as_str()),
                })
            }
        };
        order_fragments.push(qorder(&alias, &column, key.direction));
    }

    let root_alias = resolver.root_alias().to_string();
    let plan = resolver.into_plan();

    let mut from_frag = SqlFragment::raw(format!("{} AS {}", from_qi(table), escape_ident(&root_alias)));
    for step in &plan.steps {
        let on = step
            .on
            .iter()
            .map(|(parent_col, child_col)| {
                format!(
                    "{} = {}",
                    qualify(&step.parent_alias, parent_col),
                    qualify(&step.alias, child_col)
                )
            })
            .collect::<Vec<_>>()
            .join(" AND ");
        let join_kw = match step.kind {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
        };
        from_frag.push(&format!(
            " {} {} AS {} ON {}",
            join_kw,
            escape_ident(&step.relation),
            escape_ident(&step.alias),
            on
        ));
    }

    let mut builder = SelectBuilder::new().all_columns_from(&root_alias).from_raw(from_frag);

    if !group_exprs.is_empty() {
        builder = builder.where_expr(Expr::and_all(group_exprs));
    }
    for frag in order_fragments {
        builder = builder.order_by_raw(frag);
    }
    if let Some(limit) = query.limit {
        builder = builder.limit(limit as i64);
    }
    if let Some(offset) = query.offset {
        builder = builder.offset(offset as i64);
    }

    Ok(builder.build())
}

/// Executes a translated statement against whatever database connection
/// the caller already manages. This crate never opens one itself (§1).
#[async_trait::async_trait]
pub trait SqlExecutor: Send + Sync {
    async fn execute_all(&self, fragment: SqlFragment) -> Result<Vec<serde_json::Value>, BackendError>;

    async fn execute_stream(
        &self,
        fragment: SqlFragment,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<serde_json::Value, BackendError>> + Send>>, BackendError>;
}

/// Translate and run `query`, buffering every row.
pub async fn search<S: SchemaIntrospector + Sync>(
    query: &Query,
    resolver: Resolver<'_, S>,
    table: &QualifiedIdentifier,
    default_fts_language: Option<&str>,
    executor: &dyn SqlExecutor,
) -> Result<Vec<serde_json::Value>, BackendError> {
    let fragment = translate(query, resolver, table, default_fts_language).await?;
    executor.execute_all(fragment).await
}

/// Translate and run `query`, streaming rows as they arrive.
pub async fn search_stream<S: SchemaIntrospector + Sync>(
    query: &Query,
    resolver: Resolver<'_, S>,
    table: &QualifiedIdentifier,
    default_fts_language: Option<&str>,
    executor: &dyn SqlExecutor,
) -> Result<Pin<Box<dyn Stream<Item = Result<serde_json::Value, BackendError>> + Send>>, BackendError> {
    let fragment = translate(query, resolver, table, default_fts_language).await?;
    executor.execute_stream(fragment).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Condition, DottedPath, GroupOp};
    use crate::config::QdslConfig;
    use crate::resolve::hooks::HookRegistry;
    use crate::schema::{RelationDescriptor, StaticSchema};

    fn cond(field: &str, op: &str, value: Option<Value>) -> Node {
        Node::Condition(Condition::new(DottedPath::parse(field).unwrap(), op, value))
    }

    fn schema() -> StaticSchema {
        StaticSchema::new()
            .with_columns("orders", vec!["id".into(), "user_id".into(), "total".into()])
            .with_columns("users", vec!["id".into(), "name".into()])
            .with_columns("line_items", vec!["id".into(), "order_id".into(), "quantity".into()])
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
                "orders",
                "line_items",
                RelationDescriptor {
                    foreign_relation: "line_items".into(),
                    is_self: false,
                    join_columns: vec![("id".into(), "order_id".into())],
                    to_one: false,
                },
            )
    }

    #[test]
    fn test_value_to_param_scalars() {
        assert_eq!(value_to_param(&Value::Int(5)).unwrap(), SqlParam::Int(5));
        assert_eq!(
            value_to_param(&Value::String("x".into())).unwrap(),
            SqlParam::Text("x".into())
        );
        assert!(value_to_param(&Value::List(vec![])).is_err());
    }

    #[test]
    fn test_geometry_to_geojson_point() {
        let point = GeoGeometry::Point(geo_types::Point::new(1.0, 2.0));
        let json = geometry_to_geojson(&point).unwrap();
        assert_eq!(json["type"], "Point");
        assert_eq!(json["coordinates"], serde_json::json!([1.0, 2.0]));
    }

    #[tokio::test]
    async fn test_translate_simple_eq() {
        let schema = schema();
        let hooks = HookRegistry::new();
        let config = QdslConfig::default();
        let resolver = Resolver::new(&schema, &hooks, &config, "orders");
        let query = Query {
            groups: vec![Group::new(
                GroupOp::And,
                vec![cond("total", ">", Some(Value::Int(100)))],
            )],
            limit: Some(10),
            offset: Some(0),
            order_by: vec![],
        };
        let table = QualifiedIdentifier::new("public", "orders");
        let sql = translate(&query, resolver, &table, None).await.unwrap();
        assert!(sql.sql().contains("\"orders\".\"total\" > $1"));
        assert!(sql.sql().contains("LIMIT 10"));
        assert!(sql.sql().contains("OFFSET 0"));
    }

    #[tokio::test]
    async fn test_translate_joins_to_one_relation_as_inner() {
        let schema = schema();
        let hooks = HookRegistry::new();
        let config = QdslConfig::default();
        let resolver = Resolver::new(&schema, &hooks, &config, "orders");
        let query = Query {
            groups: vec![Group::new(
                GroupOp::And,
                vec![cond("user.name", "=", Some(Value::String("Ada".into())))],
            )],
            limit: None,
            offset: None,
            order_by: vec![],
        };
        let table = QualifiedIdentifier::unqualified("orders");
        let sql = translate(&query, resolver, &table, None).await.unwrap();
        assert!(sql.sql().contains("INNER JOIN \"users\" AS \"users_1\""));
        assert!(sql.sql().contains("\"users_1\".\"name\" = $1"));
    }

    #[tokio::test]
    async fn test_translate_joins_to_many_relation_as_left() {
        let schema = schema();
        let hooks = HookRegistry::new();
        let config = QdslConfig::default();
        let resolver = Resolver::new(&schema, &hooks, &config, "orders");
        let query = Query {
            groups: vec![Group::new(
                GroupOp::And,
                vec![cond("line_items.quantity", ">", Some(Value::Int(1)))],
            )],
            limit: None,
            offset: None,
            order_by: vec![],
        };
        let table = QualifiedIdentifier::unqualified("orders");
        let sql = translate(&query, resolver, &table, None).await.unwrap();
        assert!(sql.sql().contains("LEFT JOIN \"line_items\" AS \"line_items_1\""));
        assert!(sql.sql().contains("\"line_items_1\".\"quantity\" > $1"));
    }

    #[tokio::test]
    async fn test_translate_contains_builds_wrapped_like_pattern() {
        let schema = schema();
        let hooks = HookRegistry::new();
        let config = QdslConfig::default();
        let resolver = Resolver::new(&schema, &hooks, &config, "orders");
        let query = Query {
            groups: vec![Group::new(
                GroupOp::And,
                vec![cond("id", "icontains", Some(Value::String("50%".into())))],
            )],
            limit: None,
            offset: None,
            order_by: vec![],
        };
        let table = QualifiedIdentifier::unqualified("orders");
        let sql = translate(&query, resolver, &table, None).await.unwrap();
        assert!(sql.sql().contains("ILIKE"));
        assert_eq!(sql.params()[0], SqlParam::Text("%50\\%%".to_string()));
    }

    #[tokio::test]
    async fn test_translate_all_uses_contained_by() {
        let schema = schema();
        let hooks = HookRegistry::new();
        let config = QdslConfig::default();
        let resolver = Resolver::new(&schema, &hooks, &config, "orders");
        let query = Query {
            groups: vec![Group::new(
                GroupOp::And,
                vec![cond(
                    "total",
                    "all",
                    Some(Value::List(vec![Value::Int(1), Value::Int(2)])),
                )],
            )],
            limit: None,
            offset: None,
            order_by: vec![],
        };
        let table = QualifiedIdentifier::unqualified("orders");
        let sql = translate(&query, resolver, &table, None).await.unwrap();
        // field-set <= value-set reads as "column is contained by the value array".
        assert!(sql.sql().contains("\"orders\".\"total\" <@ $1"));
    }

    #[tokio::test]
    async fn test_translate_not_group_negates() {
        let schema = schema();
        let hooks = HookRegistry::new();
        let config = QdslConfig::default();
        let resolver = Resolver::new(&schema, &hooks, &config, "orders");
        let query = Query {
            groups: vec![Group::new(
                GroupOp::Not,
                vec![cond("total", "=", Some(Value::Int(0)))],
            )],
            limit: None,
            offset: None,
            order_by: vec![],
        };
        let table = QualifiedIdentifier::unqualified("orders");
        let sql = translate(&query, resolver, &table, None).await.unwrap();
        assert!(sql.sql().contains("NOT ("));
    }

    #[tokio::test]
    async fn test_translate_order_by_desc() {
        let schema = schema();
        let hooks = HookRegistry::new();
        let config = QdslConfig::default();
        let resolver = Resolver::new(&schema, &hooks, &config, "orders");
        let query = Query {
            groups: vec![],
            limit: None,
            offset: None,
            order_by: vec![crate::ast::OrderKey::desc(DottedPath::parse("total").unwrap())],
        };
        let table = QualifiedIdentifier::unqualified("orders");
        let sql = translate(&query, resolver, &table, None).await.unwrap();
        assert!(sql.sql().contains("ORDER BY \"orders\".\"total\" DESC"));
    }

    struct RecentOrdersHook;

    #[async_trait::async_trait]
    impl crate::resolve::hooks::ResolutionHook for RecentOrdersHook {
        async fn resolve(
            &self,
            ctx: &mut crate::resolve::hooks::ResolutionContext<'_>,
        ) -> Option<crate::resolve::hooks::HookResult> {
            if ctx.attribute_name != "is_recent" {
                return None;
            }
            let mut fragment = SqlFragment::raw(format!("{}.created_at > now() - ", ctx.parent_alias));
            fragment.push_param("7 days".to_string());
            fragment.push("::interval");
            Some(crate::resolve::hooks::HookResult::CustomPredicate { fragment })
        }
    }

    #[tokio::test]
    async fn test_translate_splices_custom_predicate_from_hook() {
        let schema = schema();
        let mut hooks = HookRegistry::new();
        hooks.register(Box::new(RecentOrdersHook));
        let config = QdslConfig::default();
        let resolver = Resolver::new(&schema, &hooks, &config, "orders");
        let query = Query {
            groups: vec![Group::new(
                GroupOp::And,
                vec![cond("is_recent", "=", Some(Value::Bool(true)))],
            )],
            limit: None,
            offset: None,
            order_by: vec![],
        };
        let table = QualifiedIdentifier::unqualified("orders");
        let sql = translate(&query, resolver, &table, None).await.unwrap();
        assert!(sql.sql().contains("orders.created_at > now() - $1::interval"));
        assert_eq!(sql.params()[0], SqlParam::Text("7 days".to_string()));
    }
}
