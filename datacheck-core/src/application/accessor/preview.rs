// datacheck-core/src/application/accessor/preview.rs

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::dataset::{DatasetPreview, Row};
use crate::domain::quality::ColumnPredicate;
use crate::error::DataCheckError;
use crate::ports::accessor::{DatasetAccessor, ValueCount};

/// Accessor over the preview sample stored with an uploaded file.
///
/// Counts are measured on the sample and scaled up to the recorded row count;
/// sampled rows are always real rows from the preview.
#[derive(Debug, Clone)]
pub struct PreviewSampleAccessor {
    dataset_id: String,
    preview: DatasetPreview,
}

impl PreviewSampleAccessor {
    pub fn new(dataset_id: impl Into<String>, preview: DatasetPreview) -> Self {
        Self {
            dataset_id: dataset_id.into(),
            preview,
        }
    }

    pub fn preview(&self) -> &DatasetPreview {
        &self.preview
    }

    /// `round(total * matches / sample_size)`, half away from zero; 0 for an
    /// empty sample.
    fn extrapolate(&self, sample_matches: usize) -> u64 {
        let sample_size = self.preview.rows.len() as u128;
        if sample_size == 0 {
            return 0;
        }
        let total = u128::from(self.preview.row_count);
        let scaled = (2 * total * sample_matches as u128 + sample_size) / (2 * sample_size);
        u64::try_from(scaled).unwrap_or(u64::MAX)
    }
}

#[async_trait]
impl DatasetAccessor for PreviewSampleAccessor {
    fn dataset_id(&self) -> &str {
        &self.dataset_id
    }

    async fn total_row_count(&self) -> Result<u64, DataCheckError> {
        Ok(self.preview.row_count)
    }

    async fn count_matching(&self, predicate: &ColumnPredicate) -> Result<u64, DataCheckError> {
        let matches = self
            .preview
            .rows
            .iter()
            .filter(|row| predicate.matches(row))
            .count();
        Ok(self.extrapolate(matches))
    }

    async fn sample_matching(
        &self,
        predicate: &ColumnPredicate,
        limit: usize,
    ) -> Result<Vec<Row>, DataCheckError> {
        Ok(self
            .preview
            .rows
            .iter()
            .filter(|row| predicate.matches(row))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn group_counts_above(
        &self,
        column: &str,
        min_count: u64,
    ) -> Result<Vec<ValueCount>, DataCheckError> {
        // The sample is small; a linear scan keeps first-seen order and avoids
        // hashing JSON values.
        let mut groups: Vec<ValueCount> = Vec::new();
        for row in &self.preview.rows {
            let value = row.get(column).cloned().unwrap_or(Value::Null);
            match groups.iter_mut().find(|g| g.value == value) {
                Some(group) => group.count += 1,
                None => groups.push(ValueCount { value, count: 1 }),
            }
        }

        groups.retain(|g| g.count >= min_count);
        // Same order as the live accessor: NULL last, then most frequent first,
        // ties by first appearance.
        groups.sort_by(|a, b| {
            a.value
                .is_null()
                .cmp(&b.value.is_null())
                .then(b.count.cmp(&a.count))
        });
        Ok(groups)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::application::accessor::testing::to_rows;
    use serde_json::json;

    fn preview(row_count: u64, rows: Vec<Value>) -> DatasetPreview {
        DatasetPreview {
            columns: vec!["id".into(), "name".into()],
            row_count,
            rows: to_rows(rows),
        }
    }

    fn ten_rows_one_missing() -> DatasetPreview {
        let mut rows: Vec<Value> = (1..=9).map(|i| json!({"id": i, "name": format!("user{i}")})).collect();
        rows.push(json!({"id": 10, "name": null}));
        preview(1000, rows)
    }

    #[tokio::test]
    async fn test_count_is_extrapolated() {
        let accessor = PreviewSampleAccessor::new("csv_1", ten_rows_one_missing());
        let missing = accessor
            .count_matching(&ColumnPredicate::is_null_or_empty("name"))
            .await
            .unwrap();
        assert_eq!(missing, 100);
        assert_eq!(accessor.total_row_count().await.unwrap(), 1000);
    }

    #[tokio::test]
    async fn test_extrapolation_rounds() {
        // 1000 * 1 / 3 = 333.33 -> 333 ; 1000 * 2 / 3 = 666.67 -> 667
        let p = preview(1000, vec![json!({"name": ""}), json!({"name": "a"}), json!({"name": "b"})]);
        let accessor = PreviewSampleAccessor::new("csv_1", p);
        assert_eq!(accessor.extrapolate(1), 333);
        assert_eq!(accessor.extrapolate(2), 667);

        // 5 * 1 / 2 = 2.5 -> 3
        let p = preview(5, vec![json!({"name": ""}), json!({"name": "a"})]);
        assert_eq!(PreviewSampleAccessor::new("csv_1", p).extrapolate(1), 3);
    }

    #[tokio::test]
    async fn test_empty_sample_counts_zero() {
        let accessor = PreviewSampleAccessor::new("csv_1", preview(500, vec![]));
        let n = accessor
            .count_matching(&ColumnPredicate::is_null_or_empty("name"))
            .await
            .unwrap();
        assert_eq!(n, 0);
    }

    #[tokio::test]
    async fn test_sample_is_never_extrapolated() {
        let accessor = PreviewSampleAccessor::new("csv_1", ten_rows_one_missing());
        let rows = accessor
            .sample_matching(&ColumnPredicate::is_null_or_empty("name"), 10)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], 10);
    }

    #[tokio::test]
    async fn test_sample_respects_limit() {
        let rows = (0..20).map(|i| json!({"id": i, "name": null})).collect();
        let accessor = PreviewSampleAccessor::new("csv_1", preview(20, rows));
        let sampled = accessor
            .sample_matching(&ColumnPredicate::is_null_or_empty("name"), 10)
            .await
            .unwrap();
        assert_eq!(sampled.len(), 10);
    }

    #[tokio::test]
    async fn test_group_counts_order_and_threshold() {
        let rows = vec![
            json!({"id": 9}),
            json!({"id": 7}),
            json!({"id": 7}),
            json!({"id": 9}),
            json!({"id": 7}),
            json!({"id": 1}),
        ];
        let accessor = PreviewSampleAccessor::new("csv_1", preview(6, rows));
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
    async fn test_missing_column_groups_as_null() {
        let rows = vec![json!({"id": 1}), json!({"id": 2})];
        let accessor = PreviewSampleAccessor::new("csv_1", preview(2, rows));
        let groups = accessor.group_counts_above("name", 2).await.unwrap();
        assert_eq!(groups, vec![ValueCount { value: Value::Null, count: 2 }]);
    }

    #[tokio::test]
    async fn test_null_group_sorts_last() {
        let rows = vec![
            json!({"id": 1, "name": null}),
            json!({"id": 2, "name": null}),
            json!({"id": 3, "name": null}),
            json!({"id": 4, "name": "ann"}),
            json!({"id": 5, "name": "ann"}),
        ];
        let accessor = PreviewSampleAccessor::new("csv_1", preview(5, rows));
        let groups = accessor.group_counts_above("name", 2).await.unwrap();
        assert_eq!(
            groups,
            vec![
                ValueCount { value: json!("ann"), count: 2 },
                ValueCount { value: Value::Null, count: 3 },
            ]
        );
    }
}
