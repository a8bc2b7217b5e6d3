// datacheck-core/src/ports/gateway.rs

// What the engine needs from a live relational source, without knowing which
// database sits behind it. Adapters live in infrastructure/adapters.

use crate::domain::dataset::{ConnectionRecord, Row, TableSchema};
use crate::domain::sql::SelectQuery;
use crate::error::DataCheckError;
use async_trait::async_trait;

#[async_trait]
pub trait RelationalGateway: Send + Sync {
    /// Opens a session for one run. The session is closed when dropped.
    async fn open(
        &self,
        connection: &ConnectionRecord,
    ) -> Result<Box<dyn RelationalSession>, DataCheckError>;
}

#[async_trait]
pub trait RelationalSession: Send + Sync {
    /// `None` when the table does not exist. `table` may be `schema.table`.
    async fn describe_table(&self, table: &str) -> Result<Option<TableSchema>, DataCheckError>;

    /// Base tables outside the system catalogs, with their ordered columns.
    async fn discover_tables(&self) -> Result<Vec<TableSchema>, DataCheckError>;

    /// First column of the first row, as a count.
    async fn query_scalar(&self, query: &SelectQuery) -> Result<u64, DataCheckError>;

    async fn query_rows(&self, query: &SelectQuery) -> Result<Vec<Row>, DataCheckError>;
}
