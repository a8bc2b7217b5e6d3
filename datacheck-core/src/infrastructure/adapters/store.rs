// datacheck-core/src/infrastructure/adapters/store.rs

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use duckdb::{Connection, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::domain::check::{CheckDefinition, CheckKind, CheckOutcome, CheckStatus};
use crate::domain::dataset::{ConnectionDriver, ConnectionRecord, DatasetPreview, DatasetRecord};
use crate::domain::error::DomainError;
use crate::error::DataCheckError;
use crate::infrastructure::adapters::duckdb::lock_connection;
use crate::infrastructure::error::{DatabaseError, InfrastructureError};
use crate::ports::store::{ConnectionRegistry, DatasetRegistry, DefinitionStore};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS connections (
    id VARCHAR PRIMARY KEY,
    name VARCHAR NOT NULL,
    driver VARCHAR NOT NULL,
    host VARCHAR NOT NULL,
    port INTEGER NOT NULL,
    database VARCHAR NOT NULL,
    username VARCHAR NOT NULL,
    password VARCHAR NOT NULL,
    tables VARCHAR NOT NULL,
    created_at VARCHAR NOT NULL
);
CREATE TABLE IF NOT EXISTS datasets (
    id VARCHAR PRIMARY KEY,
    name VARCHAR NOT NULL,
    file_name VARCHAR NOT NULL,
    columns VARCHAR NOT NULL,
    row_count BIGINT NOT NULL,
    preview_data VARCHAR NOT NULL,
    uploaded_at VARCHAR NOT NULL
);
CREATE TABLE IF NOT EXISTS checks (
    id VARCHAR PRIMARY KEY,
    name VARCHAR NOT NULL,
    kind VARCHAR NOT NULL,
    dataset VARCHAR NOT NULL,
    table_name VARCHAR,
    column_name VARCHAR,
    parameters VARCHAR NOT NULL,
    created_at VARCHAR NOT NULL
);
CREATE TABLE IF NOT EXISTS outcomes (
    id VARCHAR PRIMARY KEY,
    check_id VARCHAR NOT NULL,
    check_name VARCHAR NOT NULL,
    dataset VARCHAR NOT NULL,
    table_name VARCHAR,
    column_name VARCHAR,
    status VARCHAR NOT NULL,
    metrics VARCHAR NOT NULL,
    failed_rows VARCHAR,
    error_message VARCHAR,
    created_at VARCHAR NOT NULL
);
";

const CONNECTION_COLUMNS: &str =
    "id, name, driver, host, port, database, username, password, tables, created_at";
const DATASET_COLUMNS: &str = "id, name, file_name, columns, row_count, preview_data, uploaded_at";
const CHECK_COLUMNS: &str =
    "id, name, kind, dataset, table_name, column_name, parameters, created_at";
const OUTCOME_COLUMNS: &str = "id, check_id, check_name, dataset, table_name, column_name, \
     status, metrics, failed_rows, error_message, created_at";

/// Metadata persisted in a single DuckDB file.
///
/// Nested fields (dataset references, parameters, metrics, sampled rows,
/// previews) are stored as JSON text; encoding and decoding happen only here.
/// Timestamps are fixed-width RFC 3339 strings, so they sort as text.
pub struct DuckDbMetadataStore {
    conn: Mutex<Connection>,
}

impl DuckDbMetadataStore {
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, InfrastructureError> {
        let conn = Connection::open(path.as_ref())?;
        info!("Metadata store opened");
        Self::init(conn)
    }

    pub fn in_memory() -> Result<Self, InfrastructureError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, InfrastructureError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    // --- CONNECTIONS ---

    pub fn insert_connection(&self, record: &ConnectionRecord) -> Result<(), DataCheckError> {
        let conn = lock_connection(&self.conn)?;
        conn.execute(
            &format!("INSERT INTO connections ({CONNECTION_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"),
            params![
                record.id,
                record.name,
                record.driver.as_str(),
                record.host,
                record.port,
                record.database,
                record.username,
                record.password,
                encode(&record.tables)?,
                timestamp(&record.created_at),
            ],
        )?;
        debug!(connection.id = %record.id, "Connection stored");
        Ok(())
    }

    pub fn list_connections(&self) -> Result<Vec<ConnectionRecord>, DataCheckError> {
        self.select_connections("ORDER BY created_at DESC", params![])
    }

    pub fn find_connection(&self, id: &str) -> Result<Option<ConnectionRecord>, DataCheckError> {
        Ok(self.select_connections("WHERE id = ?", params![id])?.into_iter().next())
    }

    pub fn delete_connection(&self, id: &str) -> Result<(), DataCheckError> {
        if !self.delete("connections", id)? {
            return Err(DomainError::ConnectionNotFound(id.to_string()).into());
        }
        Ok(())
    }

    fn select_connections(
        &self,
        clause: &str,
        args: &[&dyn duckdb::ToSql],
    ) -> Result<Vec<ConnectionRecord>, DataCheckError> {
        let conn = lock_connection(&self.conn)?;
        let mut stmt = conn.prepare(&format!("SELECT {CONNECTION_COLUMNS} FROM connections {clause}"))?;
        let raw = stmt
            .query_map(args, |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, u16>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                    row.get::<_, String>(7)?,
                    row.get::<_, String>(8)?,
                    row.get::<_, String>(9)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        raw.into_iter()
            .map(|(id, name, driver, host, port, database, username, password, tables, created_at)| {
                let driver = driver.parse::<ConnectionDriver>().map_err(|e| decode_error("driver", e))?;
                Ok(ConnectionRecord {
                    id,
                    name,
                    driver,
                    host,
                    port,
                    database,
                    username,
                    password,
                    created_at: parse_timestamp("created_at", &created_at)?,
                    tables: decode(&tables)?,
                })
            })
            .collect()
    }

    // --- DATASETS ---

    pub fn insert_dataset(&self, record: &DatasetRecord) -> Result<(), DataCheckError> {
        let conn = lock_connection(&self.conn)?;
        conn.execute(
            &format!("INSERT INTO datasets ({DATASET_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?)"),
            params![
                record.id,
                record.name,
                record.file_name,
                encode(&record.preview.columns)?,
                record.preview.row_count,
                encode(&record.preview.rows)?,
                timestamp(&record.uploaded_at),
            ],
        )?;
        debug!(dataset.id = %record.id, "Dataset stored");
        Ok(())
    }

    pub fn list_datasets(&self) -> Result<Vec<DatasetRecord>, DataCheckError> {
        self.select_datasets("ORDER BY uploaded_at DESC", params![])
    }

    pub fn find_dataset(&self, id: &str) -> Result<Option<DatasetRecord>, DataCheckError> {
        Ok(self.select_datasets("WHERE id = ?", params![id])?.into_iter().next())
    }

    pub fn delete_dataset(&self, id: &str) -> Result<(), DataCheckError> {
        if !self.delete("datasets", id)? {
            return Err(DomainError::DatasetNotFound(id.to_string()).into());
        }
        Ok(())
    }

    fn select_datasets(
        &self,
        clause: &str,
        args: &[&dyn duckdb::ToSql],
    ) -> Result<Vec<DatasetRecord>, DataCheckError> {
        let conn = lock_connection(&self.conn)?;
        let mut stmt = conn.prepare(&format!("SELECT {DATASET_COLUMNS} FROM datasets {clause}"))?;
        let raw = stmt
            .query_map(args, |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, u64>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        raw.into_iter()
            .map(|(id, name, file_name, columns, row_count, rows, uploaded_at)| {
                Ok(DatasetRecord {
                    id,
                    name,
                    file_name,
                    uploaded_at: parse_timestamp("uploaded_at", &uploaded_at)?,
                    preview: DatasetPreview {
                        columns: decode(&columns)?,
                        row_count,
                        rows: decode(&rows)?,
                    },
                })
            })
            .collect()
    }

    // --- CHECKS ---

    pub fn insert_check(&self, check: &CheckDefinition) -> Result<(), DataCheckError> {
        let conn = lock_connection(&self.conn)?;
        conn.execute(
            &format!("INSERT INTO checks ({CHECK_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"),
            params![
                check.id,
                check.name,
                check.kind.as_str(),
                encode(&check.dataset)?,
                check.table,
                check.column,
                encode(&check.parameters)?,
                timestamp(&check.created_at),
            ],
        )?;
        debug!(check.id = %check.id, kind = %check.kind, "Check stored");
        Ok(())
    }

    pub fn list_checks(&self) -> Result<Vec<CheckDefinition>, DataCheckError> {
        self.select_checks("ORDER BY created_at DESC", params![])
    }

    pub fn find_check(&self, id: &str) -> Result<Option<CheckDefinition>, DataCheckError> {
        Ok(self.select_checks("WHERE id = ?", params![id])?.into_iter().next())
    }

    /// Outcomes of the check are kept.
    pub fn delete_check(&self, id: &str) -> Result<(), DataCheckError> {
        if !self.delete("checks", id)? {
            return Err(DomainError::CheckNotFound(id.to_string()).into());
        }
        Ok(())
    }

    fn select_checks(
        &self,
        clause: &str,
        args: &[&dyn duckdb::ToSql],
    ) -> Result<Vec<CheckDefinition>, DataCheckError> {
        let conn = lock_connection(&self.conn)?;
        let mut stmt = conn.prepare(&format!("SELECT {CHECK_COLUMNS} FROM checks {clause}"))?;
        let raw = stmt
            .query_map(args, |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, Option<String>>(5)?,
                    row.get::<_, String>(6)?,
                    row.get::<_, String>(7)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        raw.into_iter()
            .map(|(id, name, kind, dataset, table, column, parameters, created_at)| {
                Ok(CheckDefinition {
                    id,
                    name,
                    kind: kind.parse::<CheckKind>().map_err(|e| decode_error("kind", e))?,
                    dataset: decode(&dataset)?,
                    table,
                    column,
                    parameters: decode(&parameters)?,
                    created_at: parse_timestamp("created_at", &created_at)?,
                })
            })
            .collect()
    }

    // --- OUTCOMES ---

    /// Newest first, optionally restricted to one check.
    pub fn list_outcomes(&self, check_id: Option<&str>) -> Result<Vec<CheckOutcome>, DataCheckError> {
        match check_id {
            Some(id) => self.select_outcomes("WHERE check_id = ? ORDER BY created_at DESC", params![id]),
            None => self.select_outcomes("ORDER BY created_at DESC", params![]),
        }
    }

    pub fn find_outcome(&self, id: &str) -> Result<Option<CheckOutcome>, DataCheckError> {
        Ok(self.select_outcomes("WHERE id = ?", params![id])?.into_iter().next())
    }

    fn insert_outcome(&self, outcome: &CheckOutcome) -> Result<(), DataCheckError> {
        let failed_rows = outcome.failed_rows.as_ref().map(encode).transpose()?;
        let conn = lock_connection(&self.conn)?;
        conn.execute(
            &format!("INSERT INTO outcomes ({OUTCOME_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"),
            params![
                outcome.id,
                outcome.check_id,
                outcome.check_name,
                encode(&outcome.dataset)?,
                outcome.table,
                outcome.column,
                outcome.status.as_str(),
                encode(&outcome.metrics)?,
                failed_rows,
                outcome.error_message,
                timestamp(&outcome.created_at),
            ],
        )?;
        Ok(())
    }

    fn select_outcomes(
        &self,
        clause: &str,
        args: &[&dyn duckdb::ToSql],
    ) -> Result<Vec<CheckOutcome>, DataCheckError> {
        let conn = lock_connection(&self.conn)?;
        let mut stmt = conn.prepare(&format!("SELECT {OUTCOME_COLUMNS} FROM outcomes {clause}"))?;
        let raw = stmt
            .query_map(args, |row| {
                Ok((
                    (
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ),
                    (
                        row.get::<_, Option<String>>(4)?,
                        row.get::<_, Option<String>>(5)?,
                        row.get::<_, String>(6)?,
                        row.get::<_, String>(7)?,
                    ),
                    (
                        row.get::<_, Option<String>>(8)?,
                        row.get::<_, Option<String>>(9)?,
                        row.get::<_, String>(10)?,
                    ),
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        raw.into_iter()
            .map(
                |(
                    (id, check_id, check_name, dataset),
                    (table, column, status, metrics),
                    (failed_rows, error_message, created_at),
                )| {
                    Ok(CheckOutcome {
                        id,
                        check_id,
                        check_name,
                        dataset: decode(&dataset)?,
                        table,
                        column,
                        status: parse_status(&status)?,
                        metrics: decode(&metrics)?,
                        failed_rows: failed_rows.as_deref().map(decode).transpose()?,
                        error_message,
                        created_at: parse_timestamp("created_at", &created_at)?,
                    })
                },
            )
            .collect()
    }

    // --- HELPERS ---

    fn delete(&self, table: &'static str, id: &str) -> Result<bool, DataCheckError> {
        let conn = lock_connection(&self.conn)?;
        let removed = conn.execute(&format!("DELETE FROM {table} WHERE id = ?"), params![id])?;
        debug!(table, id, removed, "Record deleted");
        Ok(removed > 0)
    }
}

#[async_trait]
impl DefinitionStore for DuckDbMetadataStore {
    async fn get_check(&self, id: &str) -> Result<Option<CheckDefinition>, DataCheckError> {
        self.find_check(id)
    }

    async fn put_outcome(&self, outcome: &CheckOutcome) -> Result<(), DataCheckError> {
        self.insert_outcome(outcome)
    }
}

#[async_trait]
impl ConnectionRegistry for DuckDbMetadataStore {
    async fn get_connection(&self, id: &str) -> Result<Option<ConnectionRecord>, DataCheckError> {
        self.find_connection(id)
    }
}

#[async_trait]
impl DatasetRegistry for DuckDbMetadataStore {
    async fn get_dataset(&self, id: &str) -> Result<Option<DatasetRecord>, DataCheckError> {
        self.find_dataset(id)
    }
}

fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String, DataCheckError> {
    Ok(serde_json::to_string(value)?)
}

fn decode<T: DeserializeOwned>(raw: &str) -> Result<T, DataCheckError> {
    Ok(serde_json::from_str(raw)?)
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(column: &str, raw: &str) -> Result<DateTime<Utc>, DataCheckError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| decode_error(column, e))
}

fn parse_status(raw: &str) -> Result<CheckStatus, DataCheckError> {
    serde_json::from_value(serde_json::Value::String(raw.to_string()))
        .map_err(|e| decode_error("status", e))
}

fn decode_error(column: &str, err: impl std::fmt::Display) -> DataCheckError {
    InfrastructureError::from(DatabaseError::Decode {
        column: column.to_string(),
        message: err.to_string(),
    })
    .into()
}
