// datacheck-core/src/domain/quality/predicate.rs

use serde_json::Value;

use crate::domain::dataset::Row;

/// Row filters the check evaluators need. Live accessors translate them to a
/// WHERE clause, preview accessors evaluate them in memory with [`ColumnPredicate::matches`].
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnPredicate {
    /// Null, absent, or [blank](is_blank).
    IsNullOrEmpty(String),
    /// SQL equality: a null operand never matches.
    Equals(String, Value),
}

impl ColumnPredicate {
    pub fn is_null_or_empty(column: impl Into<String>) -> Self {
        ColumnPredicate::IsNullOrEmpty(column.into())
    }

    pub fn equals(column: impl Into<String>, value: Value) -> Self {
        ColumnPredicate::Equals(column.into(), value)
    }

    pub fn column(&self) -> &str {
        match self {
            ColumnPredicate::IsNullOrEmpty(column) | ColumnPredicate::Equals(column, _) => column,
        }
    }

    pub fn matches(&self, row: &Row) -> bool {
        match self {
            ColumnPredicate::IsNullOrEmpty(column) => match row.get(column) {
                None | Some(Value::Null) => true,
                Some(Value::String(s)) => is_blank(s),
                Some(_) => false,
            },
            ColumnPredicate::Equals(column, expected) => {
                if expected.is_null() {
                    return false;
                }
                row.get(column).is_some_and(|actual| actual == expected)
            }
        }
    }
}

/// Empty or spaces only. SQL `TRIM` strips nothing else, so tabs and
/// newlines are content here too.
pub fn is_blank(s: &str) -> bool {
    s.trim_matches(' ').is_empty()
}
