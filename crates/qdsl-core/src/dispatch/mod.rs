//! The dispatcher (§4.I): the crate's single entry point, wiring
//! validation, path resolution, and the matching evaluator together
//! behind one call.
//!
//! There is no runtime sniffing of "what kind of source is this" — the
//! caller already knows whether it holds an in-memory collection or a
//! database connection, so it picks `search_memory`/`search_sql`
//! accordingly. What the dispatcher does own is restricting the
//! validator's permitted operator set to the chosen backend before a
//! single condition is evaluated, so a `fts` condition against the
//! memory backend fails validation rather than reaching the evaluator.

use futures::{Stream, StreamExt};

use qdsl_sql::QualifiedIdentifier;

use crate::ast::Query;
use crate::config::QdslConfig;
use crate::error::Error;
use crate::memory::{self, Record};
use crate::operator::{Backend, OperatorSet};
use crate::resolve::hooks::HookRegistry;
use crate::resolve::Resolver;
use crate::schema::SchemaIntrospector;
use crate::sql::{self, SqlExecutor};
use crate::validate::validate;

/// Wires the engine's stages together under one configuration.
pub struct Dispatcher {
    config: QdslConfig,
}

impl Dispatcher {
    pub fn new(config: QdslConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &QdslConfig {
        &self.config
    }

    fn validate_for(&self, query: &Query, backend: Backend) -> Result<(), Error> {
        let permitted = OperatorSet::for_backend(backend);
        validate(
            query,
            &permitted,
            backend,
            self.config.max_depth,
            self.config.edit_distance_threshold as usize,
        )?;
        Ok(())
    }

    /// Validate and evaluate `query` against an in-memory collection.
    pub fn search_memory<'r, R: Record>(
        &self,
        query: &Query,
        records: &'r [R],
    ) -> Result<Vec<&'r R>, Error> {
        self.validate_for(query, Backend::Memory)?;
        Ok(memory::evaluate(query, records)?)
    }

    /// Validate and stream-evaluate `query` against a record stream.
    pub fn search_memory_stream<R>(
        &self,
        query: Query,
        records: impl Stream<Item = R> + Send + 'static,
    ) -> Result<impl Stream<Item = Result<R, Error>> + Send, Error>
    where
        R: Record + Clone + Send + Sync + 'static,
    {
        self.validate_for(&query, Backend::Memory)?;
        let stream_order_buffer = self.config.stream_order_buffer;
        Ok(memory::evaluate_stream(query, records, stream_order_buffer).map(|r| r.map_err(Error::from)))
    }

    /// Validate, translate, and run `query` against a SQL backend.
    /// `root_relation` is the query's starting model; `table` is where
    /// that model lives in the database.
    pub async fn search_sql<S: SchemaIntrospector + Sync>(
        &self,
        query: &Query,
        schema: &S,
        hooks: &HookRegistry,
        root_relation: impl Into<String>,
        table: &QualifiedIdentifier,
        executor: &dyn SqlExecutor,
    ) -> Result<Vec<serde_json::Value>, Error> {
        self.validate_for(query, Backend::Sql)?;
        let resolver = Resolver::new(schema, hooks, &self.config, root_relation);
        Ok(sql::search(
            query,
            resolver,
            table,
            self.config.default_fts_language.as_deref(),
            executor,
        )
        .await?)
    }

    /// The streaming counterpart of [`Dispatcher::search_sql`].
    pub async fn search_sql_stream<S: SchemaIntrospector + Sync>(
        &self,
        query: &Query,
        schema: &S,
        hooks: &HookRegistry,
        root_relation: impl Into<String>,
        table: &QualifiedIdentifier,
        executor: &dyn SqlExecutor,
    ) -> Result<
        std::pin::Pin<Box<dyn Stream<Item = Result<serde_json::Value, Error>> + Send>>,
        Error,
    > {
        self.validate_for(query, Backend::Sql)?;
        let resolver = Resolver::new(schema, hooks, &self.config, root_relation);
        let stream = sql::search_stream(
            query,
            resolver,
            table,
            self.config.default_fts_language.as_deref(),
            executor,
        )
        .await?;
        Ok(Box::pin(stream.map(|r| r.map_err(Error::from))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Condition, DottedPath, Group, GroupOp, Node, Value};
    use crate::error::ValidationError;
    use serde_json::json;

    fn cond(field: &str, op: &str, value: Option<Value>) -> Node {
        Node::Condition(Condition::new(DottedPath::parse(field).unwrap(), op, value))
    }

    #[test]
    fn test_search_memory_filters() {
        let dispatcher = Dispatcher::new(QdslConfig::default());
        let records = vec![json!({"status": "active"}), json!({"status": "closed"})];
        let query = Query {
            groups: vec![Group::new(
                GroupOp::And,
                vec![cond("status", "=", Some(Value::String("active".into())))],
            )],
            limit: None,
            offset: None,
            order_by: vec![],
        };
        let result = dispatcher.search_memory(&query, &records).unwrap();
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_search_memory_rejects_sql_only_operator() {
        let dispatcher = Dispatcher::new(QdslConfig::default());
        let records = vec![json!({"body": "hello world"})];
        let query = Query {
            groups: vec![Group::new(
                GroupOp::And,
                vec![cond("body", "fts", Some(Value::String("hello".into())))],
            )],
            limit: None,
            offset: None,
            order_by: vec![],
        };
        let err = dispatcher.search_memory(&query, &records).unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::OperatorNotSupportedByBackend { .. })
        ));
    }

    #[tokio::test]
    async fn test_search_memory_stream_filters() {
        let dispatcher = Dispatcher::new(QdslConfig::default());
        let records = vec![json!({"status": "active"}), json!({"status": "closed"})];
        let query = Query {
            groups: vec![Group::new(
                GroupOp::And,
                vec![cond("status", "=", Some(Value::String("active".into())))],
            )],
            limit: None,
            offset: None,
            order_by: vec![],
        };
        let source = tokio_stream::iter(records);
        let mut out = Box::pin(dispatcher.search_memory_stream(query, source).unwrap());
        let mut collected = Vec::new();
        while let Some(item) = out.next().await {
            collected.push(item.unwrap());
        }
        assert_eq!(collected.len(), 1);
    }

    #[tokio::test]
    async fn test_search_sql_translates_and_executes() {
        use crate::schema::StaticSchema;
        use async_trait::async_trait;
        use qdsl_sql::SqlFragment;

        struct RecordingExecutor;

        #[async_trait]
        impl SqlExecutor for RecordingExecutor {
            async fn execute_all(
                &self,
                fragment: SqlFragment,
            ) -> Result<Vec<serde_json::Value>, crate::error::BackendError> {
                Ok(vec![json!({"sql": fragment.sql()})])
            }

            async fn execute_stream(
                &self,
                _fragment: SqlFragment,
            ) -> Result<
                std::pin::Pin<
                    Box<
                        dyn Stream<Item = Result<serde_json::Value, crate::error::BackendError>>
                            + Send,
                    >,
                >,
                crate::error::BackendError,
            > {
                unimplemented!()
            }
        }

        let dispatcher = Dispatcher::new(QdslConfig::default());
        let schema = StaticSchema::new().with_columns("orders", vec!["id".into(), "total".into()]);
        let hooks = HookRegistry::new();
        let table = QualifiedIdentifier::unqualified("orders");
        let query = Query {
            groups: vec![Group::new(
                GroupOp::And,
                vec![cond("total", ">", Some(Value::Int(10)))],
            )],
            limit: None,
            offset: None,
            order_by: vec![],
        };

        let rows = dispatcher
            .search_sql(&query, &schema, &hooks, "orders", &table, &RecordingExecutor)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0]["sql"].as_str().unwrap().contains("\"orders\".\"total\" > $1"));
    }
}
