// datacheck-core/src/ports/accessor.rs

// The capability every check evaluator is written against. Whether rows come
// from a live table or a cached upload sample is the accessor's business.

use crate::domain::dataset::Row;
use crate::domain::quality::ColumnPredicate;
use crate::error::DataCheckError;
use async_trait::async_trait;
use serde_json::Value;

/// One group returned by [`DatasetAccessor::group_counts_above`].
#[derive(Debug, Clone, PartialEq)]
pub struct ValueCount {
    pub value: Value,
    pub count: u64,
}

#[async_trait]
pub trait DatasetAccessor: Send + Sync {
    fn dataset_id(&self) -> &str;

    async fn total_row_count(&self) -> Result<u64, DataCheckError>;

    async fn count_matching(&self, predicate: &ColumnPredicate) -> Result<u64, DataCheckError>;

    /// At most `limit` matching rows, never extrapolated.
    async fn sample_matching(
        &self,
        predicate: &ColumnPredicate,
        limit: usize,
    ) -> Result<Vec<Row>, DataCheckError>;

    /// Values of `column` with at least `min_count` occurrences, in the
    /// accessor's natural order.
    async fn group_counts_above(
        &self,
        column: &str,
        min_count: u64,
    ) -> Result<Vec<ValueCount>, DataCheckError>;
}
