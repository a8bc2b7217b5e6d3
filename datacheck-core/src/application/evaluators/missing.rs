// datacheck-core/src/application/evaluators/missing.rs

use async_trait::async_trait;
use tracing::debug;

use crate::application::evaluators::{CheckEvaluator, CheckTarget};
use crate::domain::check::{CheckKind, Evaluation};
use crate::domain::quality::{ColumnPredicate, RowSampler, Severity, Thresholds, violation_rate};
use crate::error::DataCheckError;
use crate::ports::accessor::DatasetAccessor;

pub const MISSING_DEFAULTS: Thresholds = Thresholds::new(5.0, 10.0);
const SAMPLE_LIMIT: usize = 10;

/// Share of null or blank values in a column.
#[derive(Debug, Clone, Copy, Default)]
pub struct MissingValueCheck;

#[async_trait]
impl CheckEvaluator for MissingValueCheck {
    fn kind(&self) -> CheckKind {
        CheckKind::MissingValues
    }

    async fn evaluate(
        &self,
        accessor: &dyn DatasetAccessor,
        target: &CheckTarget<'_>,
    ) -> Result<Evaluation, DataCheckError> {
        let column = target.require_column()?;
        let thresholds = Thresholds::from_parameters(target.parameters, MISSING_DEFAULTS);
        let predicate = ColumnPredicate::is_null_or_empty(column);

        let total = accessor.total_row_count().await?;
        let missing = accessor.count_matching(&predicate).await?;
        let rate = violation_rate(missing, total);
        let severity = thresholds.classify(rate);

        debug!(column, total, missing, rate, ?severity, "Missing values measured");

        let mut sampler = RowSampler::with_capacity(SAMPLE_LIMIT);
        if severity != Severity::Passed {
            let rows = accessor.sample_matching(&predicate, SAMPLE_LIMIT).await?;
            sampler.extend_with_reason(rows, &format!("Missing value in column \"{column}\""));
        }

        Ok(Evaluation::new(severity, total, missing, sampler.into_rows()))
    }
}
