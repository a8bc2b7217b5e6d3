// datacheck-core/src/domain/dataset.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use validator::Validate;

use crate::domain::error::DomainError;

/// A single record: column name -> value.
pub type Row = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSchema {
    pub name: String,
    pub data_type: String,
}

/// Shape of a live relational table, as introspected from the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    pub schema: String,
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }
}

/// Materialized sample of an uploaded file. `row_count` is authoritative and
/// usually larger than `rows.len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetPreview {
    pub columns: Vec<String>,
    pub row_count: u64,
    #[serde(rename = "previewData")]
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetRecord {
    pub id: String,
    pub name: String,
    pub file_name: String,
    pub uploaded_at: DateTime<Utc>,
    #[serde(flatten)]
    pub preview: DatasetPreview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionDriver {
    #[default]
    Postgres,
    /// `database` is the path of a DuckDB file.
    DuckDb,
}

impl ConnectionDriver {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionDriver::Postgres => "postgres",
            ConnectionDriver::DuckDb => "duckdb",
        }
    }
}

impl fmt::Display for ConnectionDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ConnectionDriver {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(ConnectionDriver::Postgres),
            "duckdb" => Ok(ConnectionDriver::DuckDb),
            other => Err(format!("unknown connection driver '{other}'")),
        }
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub driver: ConnectionDriver,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub tables: Vec<TableSchema>,
}

/// User input for a new connection.
#[derive(Debug, Clone, Validate)]
pub struct NewConnection {
    #[validate(length(min = 1, message = "Connection name cannot be empty"))]
    pub name: String,
    pub driver: ConnectionDriver,
    pub host: String,
    pub port: u16,
    #[validate(length(min = 1, message = "Database cannot be empty"))]
    pub database: String,
    pub username: String,
    pub password: String,
}

impl ConnectionRecord {
    /// Assigns a `conn_` id. Tables are filled in once the source has been
    /// introspected.
    pub fn create(new: NewConnection) -> Result<Self, DomainError> {
        new.validate()
            .map_err(|e| DomainError::InvalidDefinition(e.to_string()))?;
        Ok(Self {
            id: format!("conn_{}", uuid::Uuid::new_v4()),
            name: new.name,
            driver: new.driver,
            host: new.host,
            port: new.port,
            database: new.database,
            username: new.username,
            password: new.password,
            created_at: Utc::now(),
            tables: Vec::new(),
        })
    }
}

// Credentials never end up in logs.
impl fmt::Debug for ConnectionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionRecord")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("driver", &self.driver)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"***")
            .field("tables", &self.tables.len())
            .finish()
    }
}
