// datacheck-core/src/domain/check/definition.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use crate::domain::error::DomainError;

/// Kind-specific check parameters (`threshold`, `warningThreshold`, ...).
pub type Parameters = Map<String, Value>;

/// Every check kind a definition may carry. Only some have an evaluator;
/// the rest are accepted at creation and rejected at run time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    MissingValues,
    UniqueValues,
    ValidValues,
    ValueRange,
    RegexMatch,
    Schema,
    CustomSql,
}

impl CheckKind {
    pub const ALL: [CheckKind; 7] = [
        CheckKind::MissingValues,
        CheckKind::UniqueValues,
        CheckKind::ValidValues,
        CheckKind::ValueRange,
        CheckKind::RegexMatch,
        CheckKind::Schema,
        CheckKind::CustomSql,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckKind::MissingValues => "missing_values",
            CheckKind::UniqueValues => "unique_values",
            CheckKind::ValidValues => "valid_values",
            CheckKind::ValueRange => "value_range",
            CheckKind::RegexMatch => "regex_match",
            CheckKind::Schema => "schema",
            CheckKind::CustomSql => "custom_sql",
        }
    }

    /// Column-level kinds cannot be defined without a target column.
    pub fn requires_column(&self) -> bool {
        !matches!(self, CheckKind::Schema | CheckKind::CustomSql)
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CheckKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| DomainError::InvalidDefinition(format!("unknown check type '{s}'")))
    }
}

/// Where a check's data lives. Resolved on every run, never cached.
///
/// Older records spell the kinds `postgres` / `csv` and carry a bare
/// `datasetId`; both are still read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DatasetReference {
    #[serde(rename_all = "camelCase", alias = "postgres")]
    Relational {
        #[serde(alias = "datasetId")]
        connection_id: String,
    },
    #[serde(rename_all = "camelCase", alias = "csv")]
    Tabular {
        #[serde(alias = "datasetId")]
        file_dataset_id: String,
    },
}

impl DatasetReference {
    pub fn relational(connection_id: impl Into<String>) -> Self {
        DatasetReference::Relational {
            connection_id: connection_id.into(),
        }
    }

    pub fn tabular(file_dataset_id: impl Into<String>) -> Self {
        DatasetReference::Tabular {
            file_dataset_id: file_dataset_id.into(),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            DatasetReference::Relational { connection_id } => connection_id,
            DatasetReference::Tabular { file_dataset_id } => file_dataset_id,
        }
    }

    pub fn kind_label(&self) -> &'static str {
        match self {
            DatasetReference::Relational { .. } => "relational",
            DatasetReference::Tabular { .. } => "tabular",
        }
    }
}

/// User input for a new check, before ids and timestamps are assigned.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewCheck {
    #[validate(length(min = 1, message = "Check name cannot be empty"))]
    pub name: String,
    pub kind: CheckKind,
    pub dataset: DatasetReference,
    pub table: Option<String>,
    pub column: Option<String>,
    #[serde(default)]
    pub parameters: Parameters,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckDefinition {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CheckKind,
    pub dataset: DatasetReference,
    pub table: Option<String>,
    pub column: Option<String>,
    pub parameters: Parameters,
    pub created_at: DateTime<Utc>,
}

impl CheckDefinition {
    pub fn create(new: NewCheck) -> Result<Self, DomainError> {
        new.validate()
            .map_err(|e| DomainError::InvalidDefinition(e.to_string()))?;

        let table = new.table.filter(|t| !t.trim().is_empty());
        let column = new.column.filter(|c| !c.trim().is_empty());

        if matches!(new.dataset, DatasetReference::Relational { .. }) && table.is_none() {
            return Err(DomainError::InvalidDefinition(
                "a table is required for relational datasets".into(),
            ));
        }
        if new.kind.requires_column() && column.is_none() {
            return Err(DomainError::InvalidDefinition(format!(
                "check type '{}' requires a column",
                new.kind
            )));
        }

        Ok(Self {
            id: format!("check_{}", uuid::Uuid::new_v4()),
            name: new.name,
            kind: new.kind,
            dataset: new.dataset,
            table,
            column,
            parameters: new.parameters,
            created_at: Utc::now(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn new_check(kind: CheckKind, dataset: DatasetReference) -> NewCheck {
        NewCheck {
            name: "email completeness".into(),
            kind,
            dataset,
            table: Some("users".into()),
            column: Some("email".into()),
            parameters: Parameters::new(),
        }
    }

    #[test]
    fn test_create_assigns_prefixed_id() {
        let check = CheckDefinition::create(new_check(
            CheckKind::MissingValues,
            DatasetReference::relational("conn_1"),
        ))
        .unwrap();
        assert!(check.id.starts_with("check_"));
        assert_eq!(check.table.as_deref(), Some("users"));
    }

    #[test]
    fn test_relational_requires_table() {
        let mut input = new_check(CheckKind::MissingValues, DatasetReference::relational("c"));
        input.table = Some("  ".into());
        let err = CheckDefinition::create(input).unwrap_err();
        assert!(matches!(err, DomainError::InvalidDefinition(_)));
    }

    #[test]
    fn test_tabular_does_not_require_table() {
        let mut input = new_check(CheckKind::UniqueValues, DatasetReference::tabular("csv_1"));
        input.table = None;
        assert!(CheckDefinition::create(input).is_ok());
    }

    #[test]
    fn test_column_kinds_require_column() {
        let mut input = new_check(CheckKind::MissingValues, DatasetReference::tabular("csv_1"));
        input.column = None;
        assert!(CheckDefinition::create(input).is_err());

        let mut input = new_check(CheckKind::Schema, DatasetReference::tabular("csv_1"));
        input.column = None;
        assert!(CheckDefinition::create(input).is_ok());
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut input = new_check(CheckKind::MissingValues, DatasetReference::tabular("csv_1"));
        input.name = String::new();
        assert!(CheckDefinition::create(input).is_err());
    }

    #[test]
    fn test_wire_format() {
        let check = CheckDefinition::create(new_check(
            CheckKind::UniqueValues,
            DatasetReference::tabular("csv_9"),
        ))
        .unwrap();
        let value = serde_json::to_value(&check).unwrap();
        assert_eq!(value["type"], "unique_values");
        assert_eq!(value["dataset"], json!({"kind": "tabular", "fileDatasetId": "csv_9"}));
        assert!(value.get("createdAt").is_some());

        let back: CheckDefinition = serde_json::from_value(value).unwrap();
        assert_eq!(back, check);
    }

    #[test]
    fn test_relational_reference_wire_format() {
        let reference: DatasetReference =
            serde_json::from_value(json!({"kind": "relational", "connectionId": "conn_7"}))
                .unwrap();
        assert_eq!(reference.id(), "conn_7");
        assert_eq!(reference.kind_label(), "relational");
    }

    #[test]
    fn test_legacy_reference_spellings() {
        let pg: DatasetReference =
            serde_json::from_value(json!({"kind": "postgres", "datasetId": "conn_1"})).unwrap();
        assert_eq!(pg, DatasetReference::relational("conn_1"));

        let csv: DatasetReference =
            serde_json::from_value(json!({"kind": "csv", "datasetId": "csv_1"})).unwrap();
        assert_eq!(csv, DatasetReference::tabular("csv_1"));
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("schema".parse::<CheckKind>().unwrap(), CheckKind::Schema);
        assert!("row_count".parse::<CheckKind>().is_err());
    }
}
