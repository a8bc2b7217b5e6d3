// datacheck-core/src/application/evaluators/duplicate.rs

use async_trait::async_trait;
use tracing::debug;

use crate::application::evaluators::{CheckEvaluator, CheckTarget};
use crate::domain::check::{CheckKind, Evaluation};
use crate::domain::quality::{
    ColumnPredicate, RowSampler, Severity, Thresholds, display_value, violation_rate,
};
use crate::error::DataCheckError;
use crate::ports::accessor::DatasetAccessor;

pub const DUPLICATE_DEFAULTS: Thresholds = Thresholds::new(1.0, 5.0);
const SAMPLED_VALUES: usize = 5;
const ROWS_PER_VALUE: usize = 10;

/// Share of rows whose column value already appeared on another row.
#[derive(Debug, Clone, Copy, Default)]
pub struct DuplicateValueCheck;

#[async_trait]
impl CheckEvaluator for DuplicateValueCheck {
    fn kind(&self) -> CheckKind {
        CheckKind::UniqueValues
    }

    async fn evaluate(
        &self,
        accessor: &dyn DatasetAccessor,
        target: &CheckTarget<'_>,
    ) -> Result<Evaluation, DataCheckError> {
        let column = target.require_column()?;
        let thresholds = Thresholds::from_parameters(target.parameters, DUPLICATE_DEFAULTS);

        let total = accessor.total_row_count().await?;
        let groups = accessor.group_counts_above(column, 2).await?;
        // The first occurrence of each value is legitimate; every extra one is a duplicate.
        let duplicates: u64 = groups.iter().map(|g| g.count.saturating_sub(1)).sum();
        let rate = violation_rate(duplicates, total);
        let severity = thresholds.classify(rate);

        debug!(
            column,
            total,
            duplicates,
            groups = groups.len(),
            rate,
            ?severity,
            "Duplicate values measured"
        );

        let mut sampler = RowSampler::with_capacity(SAMPLED_VALUES * ROWS_PER_VALUE);
        if severity != Severity::Passed {
            for group in groups.into_iter().take(SAMPLED_VALUES) {
                let reason = format!(
                    "Duplicate value in column \"{column}\": {}",
                    display_value(&group.value)
                );
                let predicate = ColumnPredicate::equals(column, group.value);
                let rows = accessor.sample_matching(&predicate, ROWS_PER_VALUE).await?;
                sampler.extend_with_reason(rows, &reason);
            }
        }

        Ok(Evaluation::new(severity, total, duplicates, sampler.into_rows()))
    }
}
