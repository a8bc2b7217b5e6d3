// datacheck-core/src/application/accessor/live.rs

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::domain::dataset::{ConnectionRecord, Row, TableSchema};
use crate::domain::error::DomainError;
use crate::domain::quality::ColumnPredicate;
use crate::domain::sql::{GROUP_COUNT_ALIAS, GROUP_VALUE_ALIAS, QueryBuilder};
use crate::error::DataCheckError;
use crate::ports::accessor::{DatasetAccessor, ValueCount};
use crate::ports::gateway::{RelationalGateway, RelationalSession};

/// Accessor over a live table. Owns its session: dropping the accessor closes
/// the underlying connection, whatever way the run ended.
pub struct LiveTableAccessor {
    dataset_id: String,
    session: Box<dyn RelationalSession>,
    schema: TableSchema,
}

impl std::fmt::Debug for LiveTableAccessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveTableAccessor")
            .field("dataset_id", &self.dataset_id)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

impl LiveTableAccessor {
    /// Connects and introspects `table`. The schema becomes the identifier
    /// allow-list for every query this accessor builds.
    #[instrument(skip(gateway, connection), fields(connection.id = %connection.id))]
    pub async fn open(
        gateway: &dyn RelationalGateway,
        connection: &ConnectionRecord,
        table: &str,
    ) -> Result<Self, DataCheckError> {
        let dataset_id = connection.id.clone();

        let session = gateway
            .open(connection)
            .await
            .map_err(|e| data_access("connect", &dataset_id, e))?;

        let schema = session
            .describe_table(table)
            .await
            .map_err(|e| data_access("describe_table", &dataset_id, e))?
            .ok_or_else(|| DomainError::UnknownIdentifier {
                kind: "table",
                name: table.to_string(),
            })?;

        debug!(
            table = %schema.qualified_name(),
            columns = schema.columns.len(),
            "Live table resolved"
        );

        Ok(Self {
            dataset_id,
            session,
            schema,
        })
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    fn builder(&self) -> Result<QueryBuilder<'_>, DataCheckError> {
        Ok(QueryBuilder::for_table(&self.schema)?)
    }
}

#[async_trait]
impl DatasetAccessor for LiveTableAccessor {
    fn dataset_id(&self) -> &str {
        &self.dataset_id
    }

    async fn total_row_count(&self) -> Result<u64, DataCheckError> {
        let query = self.builder()?.count_all()?;
        self.session
            .query_scalar(&query)
            .await
            .map_err(|e| data_access("total_row_count", &self.dataset_id, e))
    }

    async fn count_matching(&self, predicate: &ColumnPredicate) -> Result<u64, DataCheckError> {
        let query = self.builder()?.count_matching(predicate)?;
        self.session
            .query_scalar(&query)
            .await
            .map_err(|e| data_access("count_matching", &self.dataset_id, e))
    }

    async fn sample_matching(
        &self,
        predicate: &ColumnPredicate,
        limit: usize,
    ) -> Result<Vec<Row>, DataCheckError> {
        let query = self.builder()?.sample_matching(predicate, limit)?;
        self.session
            .query_rows(&query)
            .await
            .map_err(|e| data_access("sample_matching", &self.dataset_id, e))
    }

    async fn group_counts_above(
        &self,
        column: &str,
        min_count: u64,
    ) -> Result<Vec<ValueCount>, DataCheckError> {
        let query = self.builder()?.group_counts(column, min_count)?;
        let rows = self
            .session
            .query_rows(&query)
            .await
            .map_err(|e| data_access("group_counts_above", &self.dataset_id, e))?;

        rows.into_iter()
            .map(|mut row| {
                let count = row.get(GROUP_COUNT_ALIAS).and_then(Value::as_u64).ok_or_else(|| {
                    DomainError::DataAccess {
                        operation: "group_counts_above",
                        dataset_id: self.dataset_id.clone(),
                        message: format!("group row without a numeric '{GROUP_COUNT_ALIAS}'"),
                    }
                })?;
                let value = row.remove(GROUP_VALUE_ALIAS).unwrap_or(Value::Null);
                Ok(ValueCount { value, count })
            })
            .collect()
    }
}

/// Wraps a gateway failure with the operation and dataset it happened on,
/// keeping the original message verbatim.
fn data_access(operation: &'static str, dataset_id: &str, err: DataCheckError) -> DataCheckError {
    match err {
        already @ DataCheckError::Domain(DomainError::DataAccess { .. }) => already,
        other => DomainError::DataAccess {
            operation,
            dataset_id: dataset_id.to_string(),
            message: other.to_string(),
        }
        .into(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::application::accessor::testing::{FakeGateway, FakeSession, users_connection};
    use serde_json::json;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn test_open_rejects_unknown_table() {
        let gateway = FakeGateway::new(FakeSession::default());
        let err = LiveTableAccessor::open(&gateway, &users_connection(), "orders")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DataCheckError::Domain(DomainError::UnknownIdentifier { kind: "table", .. })
        ));
    }

    #[tokio::test]
    async fn test_connect_failure_is_data_access() {
        let gateway = FakeGateway::failing("connection refused");
        let err = LiveTableAccessor::open(&gateway, &users_connection(), "users")
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("connect"));
        assert!(message.contains("conn_1"));
        assert!(message.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_queries_are_composed_from_schema() {
        let session = FakeSession::default().with_scalar(100);
        let queries = session.queries.clone();
        let gateway = FakeGateway::new(session);

        let accessor = LiveTableAccessor::open(&gateway, &users_connection(), "users")
            .await
            .unwrap();
        assert_eq!(accessor.total_row_count().await.unwrap(), 100);
        accessor
            .count_matching(&ColumnPredicate::is_null_or_empty("email"))
            .await
            .unwrap();

        let issued = queries.lock().unwrap();
        assert_eq!(issued[0], "SELECT COUNT(*) FROM \"main\".\"users\"");
        assert!(issued[1].contains("WHERE \"email\" IS NULL"));
    }

    #[tokio::test]
    async fn test_unknown_column_issues_no_query() {
        let session = FakeSession::default();
        let queries = session.queries.clone();
        let gateway = FakeGateway::new(session);

        let accessor = LiveTableAccessor::open(&gateway, &users_connection(), "users")
            .await
            .unwrap();
        let err = accessor.group_counts_above("nope", 2).await.unwrap_err();
        assert!(matches!(
            err,
            DataCheckError::Domain(DomainError::UnknownIdentifier { kind: "column", .. })
        ));
        assert!(queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_group_rows_are_decoded() {
        let session = FakeSession::default().with_rows(vec![
            json!({"value": 7, "occurrences": 3}),
            json!({"value": 9, "occurrences": 2}),
        ]);
        let gateway = FakeGateway::new(session);
        let accessor = LiveTableAccessor::open(&gateway, &users_connection(), "users")
            .await
            .unwrap();

        let groups = accessor.group_counts_above("id", 2).await.unwrap();
        assert_eq!(
            groups,
            vec![
                ValueCount { value: json!(7), count: 3 },
                ValueCount { value: json!(9), count: 2 },
            ]
        );
    }

    #[tokio::test]
    async fn test_session_dropped_with_accessor() {
        let session = FakeSession::default();
        let closed = session.closed.clone();
        let gateway = FakeGateway::new(session);

        let accessor = LiveTableAccessor::open(&gateway, &users_connection(), "users")
            .await
            .unwrap();
        assert_eq!(closed.load(Ordering::SeqCst), 0);
        drop(accessor);
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }
}
