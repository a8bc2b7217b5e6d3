// datacheck-core/src/infrastructure/adapters/duckdb.rs

use async_trait::async_trait;
use chrono::DateTime;
use duckdb::types::{TimeUnit, Value as DuckValue};
use duckdb::{AccessMode, Config, Connection, Statement};
use serde_json::{Number, Value};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, instrument};

use crate::domain::dataset::{ColumnSchema, ConnectionDriver, ConnectionRecord, Row, TableSchema};
use crate::domain::sql::{IdentifierQuoter, SelectQuery};
use crate::error::DataCheckError;
use crate::infrastructure::error::{DatabaseError, InfrastructureError};
use crate::ports::gateway::{RelationalGateway, RelationalSession};

const POSTGRES_ALIAS: &str = "source_pg";

/// Opens live sources through DuckDB: DuckDB files directly (read-only),
/// PostgreSQL through the `postgres` extension attached read-only.
#[derive(Debug, Clone, Copy, Default)]
pub struct DuckDbGateway;

impl DuckDbGateway {
    pub fn new() -> Self {
        Self
    }

    fn connect(connection: &ConnectionRecord) -> Result<Connection, InfrastructureError> {
        match connection.driver {
            ConnectionDriver::DuckDb => {
                let config = Config::default().access_mode(AccessMode::ReadOnly)?;
                Ok(Connection::open_with_flags(&connection.database, config)?)
            }
            ConnectionDriver::Postgres => {
                let conn = Connection::open_in_memory()?;
                let attach = format!(
                    "INSTALL postgres; LOAD postgres; \
                     ATTACH {} AS {POSTGRES_ALIAS} (TYPE POSTGRES, READ_ONLY); \
                     USE {POSTGRES_ALIAS};",
                    sql_literal(&postgres_dsn(connection))
                );
                conn.execute_batch(&attach)?;
                Ok(conn)
            }
        }
    }
}

#[async_trait]
impl RelationalGateway for DuckDbGateway {
    #[instrument(skip(self, connection), fields(connection.id = %connection.id, driver = %connection.driver))]
    async fn open(
        &self,
        connection: &ConnectionRecord,
    ) -> Result<Box<dyn RelationalSession>, DataCheckError> {
        let conn = Self::connect(connection)?;
        debug!("Session opened");
        Ok(Box::new(DuckDbSession {
            connection_id: connection.id.clone(),
            conn: Mutex::new(conn),
        }))
    }
}

/// One connection, used by one run. Closed on drop.
pub struct DuckDbSession {
    connection_id: String,
    conn: Mutex<Connection>,
}

impl DuckDbSession {
    fn lock(&self) -> Result<MutexGuard<'_, Connection>, DataCheckError> {
        lock_connection(&self.conn)
    }

    fn columns(
        &self,
        filter: &str,
        params: &[Value],
    ) -> Result<Vec<TableSchema>, DataCheckError> {
        let sql = format!(
            "SELECT table_schema, table_name, column_name, data_type \
             FROM information_schema.columns \
             WHERE table_catalog = current_database() \
               AND table_schema NOT IN ('information_schema', 'pg_catalog') {filter} \
             ORDER BY table_schema = current_schema() DESC, table_schema, table_name, ordinal_position"
        );
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = collect_rows(&mut stmt, params)?;
        Ok(group_columns(rows))
    }
}

impl Drop for DuckDbSession {
    fn drop(&mut self) {
        debug!(connection.id = %self.connection_id, "Session closed");
    }
}

#[async_trait]
impl RelationalSession for DuckDbSession {
    async fn describe_table(&self, table: &str) -> Result<Option<TableSchema>, DataCheckError> {
        let (schema, name) = IdentifierQuoter::split_table_name(table);
        let tables = match schema {
            Some(schema) => self.columns(
                "AND table_schema = ? AND table_name = ?",
                &[Value::from(schema), Value::from(name)],
            )?,
            None => self.columns("AND table_name = ?", &[Value::from(name)])?,
        };
        // Several schemas may hold the name; the current schema sorts first.
        Ok(tables.into_iter().next())
    }

    async fn discover_tables(&self) -> Result<Vec<TableSchema>, DataCheckError> {
        self.columns("", &[])
    }

    async fn query_scalar(&self, query: &SelectQuery) -> Result<u64, DataCheckError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(query.sql())?;
        let mut rows = stmt.query(duckdb::params_from_iter(query.params().iter().map(to_sql_value)))?;
        let row = rows
            .next()?
            .ok_or_else(|| DataCheckError::InternalError("No scalar value returned".into()))?;
        let value: i64 = row.get(0)?;
        u64::try_from(value).map_err(|_| {
            InfrastructureError::from(DatabaseError::Decode {
                column: "0".into(),
                message: format!("negative count {value}"),
            })
            .into()
        })
    }

    async fn query_rows(&self, query: &SelectQuery) -> Result<Vec<Row>, DataCheckError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(query.sql())?;
        Ok(collect_rows(&mut stmt, query.params())?)
    }
}

pub(crate) fn lock_connection(
    conn: &Mutex<Connection>,
) -> Result<MutexGuard<'_, Connection>, DataCheckError> {
    conn.lock().map_err(|_| {
        DataCheckError::Infrastructure(InfrastructureError::Io(std::io::Error::other(
            "DuckDB Mutex Poisoned",
        )))
    })
}

/// Runs a prepared statement and decodes every row into a JSON object keyed
/// by column name.
pub(crate) fn collect_rows(
    stmt: &mut Statement<'_>,
    params: &[Value],
) -> Result<Vec<Row>, duckdb::Error> {
    let mut rows = stmt.query(duckdb::params_from_iter(params.iter().map(to_sql_value)))?;
    // Column names are only known once the statement has run.
    let names: Vec<String> = rows.as_ref().map(|s| s.column_names()).unwrap_or_default();

    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut decoded = Row::new();
        for (i, name) in names.iter().enumerate() {
            let value: DuckValue = row.get(i)?;
            decoded.insert(name.clone(), to_json(value));
        }
        out.push(decoded);
    }
    Ok(out)
}

pub(crate) fn to_sql_value(value: &Value) -> DuckValue {
    match value {
        Value::Null => DuckValue::Null,
        Value::Bool(b) => DuckValue::Boolean(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                DuckValue::BigInt(i)
            } else if let Some(u) = n.as_u64() {
                DuckValue::UBigInt(u)
            } else {
                DuckValue::Double(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Value::String(s) => DuckValue::Text(s.clone()),
        other => DuckValue::Text(other.to_string()),
    }
}

fn to_json(value: DuckValue) -> Value {
    match value {
        DuckValue::Null => Value::Null,
        DuckValue::Boolean(b) => Value::Bool(b),
        DuckValue::TinyInt(n) => n.into(),
        DuckValue::SmallInt(n) => n.into(),
        DuckValue::Int(n) => n.into(),
        DuckValue::BigInt(n) => n.into(),
        DuckValue::UTinyInt(n) => n.into(),
        DuckValue::USmallInt(n) => n.into(),
        DuckValue::UInt(n) => n.into(),
        DuckValue::UBigInt(n) => n.into(),
        DuckValue::HugeInt(n) => i64::try_from(n)
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(n.to_string())),
        DuckValue::Float(f) => float(f64::from(f)),
        DuckValue::Double(f) => float(f),
        DuckValue::Decimal(d) => {
            let text = d.to_string();
            text.parse::<f64>().map(float).unwrap_or(Value::String(text))
        }
        DuckValue::Text(s) | DuckValue::Enum(s) => Value::String(s),
        DuckValue::Date32(days) => DateTime::from_timestamp(i64::from(days) * 86_400, 0)
            .map(|dt| Value::String(dt.date_naive().to_string()))
            .unwrap_or(Value::Null),
        DuckValue::Timestamp(unit, raw) => DateTime::from_timestamp_micros(micros(unit, raw))
            .map(|dt| Value::String(dt.naive_utc().format("%Y-%m-%dT%H:%M:%S%.f").to_string()))
            .unwrap_or(Value::Null),
        DuckValue::List(items) | DuckValue::Array(items) => {
            Value::Array(items.into_iter().map(to_json).collect())
        }
        other => Value::String(format!("{other:?}")),
    }
}

fn float(f: f64) -> Value {
    Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
}

fn micros(unit: TimeUnit, raw: i64) -> i64 {
    match unit {
        TimeUnit::Second => raw.saturating_mul(1_000_000),
        TimeUnit::Millisecond => raw.saturating_mul(1_000),
        TimeUnit::Microsecond => raw,
        TimeUnit::Nanosecond => raw / 1_000,
    }
}

/// Folds `(schema, table, column, type)` rows, already ordered by table,
/// into one schema per table.
fn group_columns(rows: Vec<Row>) -> Vec<TableSchema> {
    let text = |row: &Row, key: &str| {
        row.get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    let mut tables: Vec<TableSchema> = Vec::new();
    for row in &rows {
        let schema = text(row, "table_schema");
        let name = text(row, "table_name");
        let column = ColumnSchema {
            name: text(row, "column_name"),
            data_type: text(row, "data_type"),
        };
        match tables.last_mut() {
            Some(last) if last.schema == schema && last.name == name => last.columns.push(column),
            _ => tables.push(TableSchema {
                name,
                schema,
                columns: vec![column],
            }),
        }
    }
    tables
}

/// libpq keyword/value connection string.
fn postgres_dsn(connection: &ConnectionRecord) -> String {
    let quote = |v: &str| format!("'{}'", v.replace('\\', "\\\\").replace('\'', "\\'"));
    format!(
        "host={} port={} dbname={} user={} password={}",
        quote(&connection.host),
        connection.port,
        quote(&connection.database),
        quote(&connection.username),
        quote(&connection.password),
    )
}

/// SQL string literal with embedded quotes doubled.
pub(crate) fn sql_literal(raw: &str) -> String {
    format!("'{}'", raw.replace('\'', "''"))
}
