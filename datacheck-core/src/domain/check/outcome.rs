// datacheck-core/src/domain/check/outcome.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::check::definition::{CheckDefinition, DatasetReference};
use crate::domain::dataset::Row;
use crate::domain::quality::threshold::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Passed,
    Warning,
    Failed,
    Error,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Passed => "passed",
            CheckStatus::Warning => "warning",
            CheckStatus::Failed => "failed",
            CheckStatus::Error => "error",
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Severity> for CheckStatus {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Passed => CheckStatus::Passed,
            Severity::Warning => CheckStatus::Warning,
            Severity::Failed => CheckStatus::Failed,
        }
    }
}

/// Empty (`{}` on the wire) for error outcomes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passed_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_count: Option<u64>,
}

impl Metrics {
    pub fn is_empty(&self) -> bool {
        *self == Metrics::default()
    }
}

/// An offending record plus the reason it was sampled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedRow {
    #[serde(rename = "_reason")]
    pub reason: String,
    #[serde(flatten)]
    pub row: Row,
}

/// What an evaluator hands back: an outcome before the engine stamps ids,
/// timestamps and timing on it.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub severity: Severity,
    pub row_count: u64,
    pub failed_count: u64,
    pub failed_rows: Vec<FailedRow>,
}

impl Evaluation {
    /// `failed_count` is clamped to `row_count` so that passed + failed always
    /// adds up, even when an extrapolated count overshoots.
    pub fn new(severity: Severity, row_count: u64, failed_count: u64, failed_rows: Vec<FailedRow>) -> Self {
        Self {
            severity,
            row_count,
            failed_count: failed_count.min(row_count),
            failed_rows,
        }
    }

    pub fn passed_count(&self) -> u64 {
        self.row_count - self.failed_count
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOutcome {
    pub id: String,
    pub check_id: String,
    pub check_name: String,
    pub dataset: DatasetReference,
    pub table: Option<String>,
    pub column: Option<String>,
    pub status: CheckStatus,
    pub metrics: Metrics,
    pub failed_rows: Option<Vec<FailedRow>>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl CheckOutcome {
    pub fn completed(check: &CheckDefinition, evaluation: Evaluation, execution_time_ms: u64) -> Self {
        let metrics = Metrics {
            row_count: Some(evaluation.row_count),
            execution_time_ms: Some(execution_time_ms),
            passed_count: Some(evaluation.passed_count()),
            failed_count: Some(evaluation.failed_count),
        };
        let failed_rows = (!evaluation.failed_rows.is_empty()).then_some(evaluation.failed_rows);

        Self::stamp(check, evaluation.severity.into(), metrics, failed_rows, None)
    }

    pub fn errored(check: &CheckDefinition, message: impl Into<String>) -> Self {
        Self::stamp(
            check,
            CheckStatus::Error,
            Metrics::default(),
            None,
            Some(message.into()),
        )
    }

    fn stamp(
        check: &CheckDefinition,
        status: CheckStatus,
        metrics: Metrics,
        failed_rows: Option<Vec<FailedRow>>,
        error_message: Option<String>,
    ) -> Self {
        Self {
            id: format!("result_{}", uuid::Uuid::new_v4()),
            check_id: check.id.clone(),
            check_name: check.name.clone(),
            dataset: check.dataset.clone(),
            table: check.table.clone(),
            column: check.column.clone(),
            status,
            metrics,
            failed_rows,
            error_message,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::check::definition::{CheckKind, Parameters};
    use serde_json::json;

    fn check() -> CheckDefinition {
        CheckDefinition {
            id: "check_1".into(),
            name: "emails".into(),
            kind: CheckKind::MissingValues,
            dataset: DatasetReference::relational("conn_1"),
            table: Some("users".into()),
            column: Some("email".into()),
            parameters: Parameters::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_completed_outcome_metrics_add_up() {
        let evaluation = Evaluation::new(Severity::Failed, 100, 12, vec![]);
        let outcome = CheckOutcome::completed(&check(), evaluation, 42);

        assert_eq!(outcome.status, CheckStatus::Failed);
        assert_eq!(outcome.metrics.row_count, Some(100));
        assert_eq!(outcome.metrics.passed_count, Some(88));
        assert_eq!(outcome.metrics.failed_count, Some(12));
        assert_eq!(outcome.metrics.execution_time_ms, Some(42));
        assert!(outcome.failed_rows.is_none());
        assert!(outcome.id.starts_with("result_"));
    }

    #[test]
    fn test_failed_count_clamped_to_row_count() {
        let evaluation = Evaluation::new(Severity::Failed, 3, 5, vec![]);
        assert_eq!(evaluation.failed_count, 3);
        assert_eq!(evaluation.passed_count(), 0);
    }

    #[test]
    fn test_error_outcome_has_empty_metrics() {
        let outcome = CheckOutcome::errored(&check(), "Connection 'conn_1' not found");
        let value = serde_json::to_value(&outcome).unwrap();

        assert_eq!(value["status"], "error");
        assert_eq!(value["metrics"], json!({}));
        assert_eq!(value["errorMessage"], "Connection 'conn_1' not found");
        assert!(value["failedRows"].is_null());
    }

    #[test]
    fn test_wire_names_round_trip() {
        let mut row = Row::new();
        row.insert("id".into(), json!(4));
        row.insert("email".into(), json!(null));
        let failed = FailedRow {
            reason: "Missing value in column \"email\"".into(),
            row,
        };
        let outcome = CheckOutcome::completed(
            &check(),
            Evaluation::new(Severity::Warning, 10, 1, vec![failed]),
            3,
        );

        let value = serde_json::to_value(&outcome).unwrap();
        for key in [
            "id", "checkId", "checkName", "dataset", "table", "column", "status", "metrics",
            "failedRows", "errorMessage", "createdAt",
        ] {
            assert!(value.get(key).is_some(), "missing key {key}");
        }
        assert_eq!(value["metrics"]["executionTimeMs"], 3);
        assert_eq!(value["failedRows"][0]["_reason"], "Missing value in column \"email\"");
        assert_eq!(value["failedRows"][0]["id"], 4);

        let back: CheckOutcome = serde_json::from_value(value).unwrap();
        assert_eq!(back, outcome);
    }
}
