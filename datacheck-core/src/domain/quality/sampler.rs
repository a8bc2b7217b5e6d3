// datacheck-core/src/domain/quality/sampler.rs

use serde_json::Value;

use crate::domain::check::FailedRow;
use crate::domain::dataset::Row;

/// Bounded collection of offending rows, each tagged with why it was kept.
#[derive(Debug)]
pub struct RowSampler {
    capacity: usize,
    rows: Vec<FailedRow>,
}

impl RowSampler {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            rows: Vec::with_capacity(capacity.min(64)),
        }
    }

    /// Adds rows until the sampler is full. Returns how many were kept.
    pub fn extend_with_reason(&mut self, rows: Vec<Row>, reason: &str) -> usize {
        let room = self.capacity.saturating_sub(self.rows.len());
        let before = self.rows.len();
        self.rows.extend(rows.into_iter().take(room).map(|row| FailedRow {
            reason: reason.to_string(),
            row,
        }));
        self.rows.len() - before
    }

    pub fn is_full(&self) -> bool {
        self.rows.len() >= self.capacity
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_rows(self) -> Vec<FailedRow> {
        self.rows
    }
}

/// Human-readable rendering of a value inside a reason string: strings bare,
/// everything else in JSON notation.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
