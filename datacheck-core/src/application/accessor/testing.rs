// datacheck-core/src/application/accessor/testing.rs
//
// In-memory gateway doubles shared by the accessor, evaluator and engine tests.

#![allow(clippy::unwrap_used)]

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::domain::dataset::{
    ColumnSchema, ConnectionDriver, ConnectionRecord, Row, TableSchema,
};
use crate::domain::quality::ColumnPredicate;
use crate::domain::sql::{IdentifierQuoter, SelectQuery};
use crate::error::DataCheckError;
use crate::ports::accessor::{DatasetAccessor, ValueCount};
use crate::ports::gateway::{RelationalGateway, RelationalSession};

type Script = Arc<dyn Fn(&SelectQuery) -> Result<Vec<Row>, String> + Send + Sync>;

pub fn users_connection() -> ConnectionRecord {
    ConnectionRecord {
        id: "conn_1".into(),
        name: "warehouse".into(),
        driver: ConnectionDriver::DuckDb,
        host: String::new(),
        port: 0,
        database: "warehouse.duckdb".into(),
        username: String::new(),
        password: String::new(),
        created_at: Utc::now(),
        tables: vec![],
    }
}

pub fn users_table() -> TableSchema {
    let column = |name: &str, data_type: &str| ColumnSchema {
        name: name.into(),
        data_type: data_type.into(),
    };
    TableSchema {
        name: "users".into(),
        schema: "main".into(),
        columns: vec![
            column("id", "INTEGER"),
            column("email", "VARCHAR"),
            column("name", "VARCHAR"),
        ],
    }
}

pub fn to_rows(values: Vec<Value>) -> Vec<Row> {
    values
        .into_iter()
        .filter_map(|v| match v {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect()
}

/// Session double. Clones share the query log and the close counter; only
/// sessions handed out by [`FakeGateway::open`] count as closed on drop.
#[derive(Clone)]
pub struct FakeSession {
    pub table: TableSchema,
    pub queries: Arc<Mutex<Vec<String>>>,
    pub closed: Arc<AtomicUsize>,
    script: Script,
    live: bool,
}

impl Default for FakeSession {
    fn default() -> Self {
        Self {
            table: users_table(),
            queries: Arc::new(Mutex::new(Vec::new())),
            closed: Arc::new(AtomicUsize::new(0)),
            script: Arc::new(|_| Ok(vec![])),
            live: false,
        }
    }
}

impl FakeSession {
    pub fn with_scalar(self, value: u64) -> Self {
        self.with_script(move |_| {
            let mut row = Row::new();
            row.insert("count".into(), Value::from(value));
            Ok(vec![row])
        })
    }

    pub fn with_rows(self, rows: Vec<Value>) -> Self {
        let rows = to_rows(rows);
        self.with_script(move |_| Ok(rows.clone()))
    }

    pub fn with_script(
        mut self,
        script: impl Fn(&SelectQuery) -> Result<Vec<Row>, String> + Send + Sync + 'static,
    ) -> Self {
        self.script = Arc::new(script);
        self
    }

    fn run(&self, query: &SelectQuery) -> Result<Vec<Row>, DataCheckError> {
        self.queries.lock().unwrap().push(query.sql().to_string());
        (self.script)(query).map_err(DataCheckError::InternalError)
    }
}

impl Drop for FakeSession {
    fn drop(&mut self) {
        if self.live {
            self.closed.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[async_trait]
impl RelationalSession for FakeSession {
    async fn describe_table(&self, table: &str) -> Result<Option<TableSchema>, DataCheckError> {
        let (_, name) = IdentifierQuoter::split_table_name(table);
        Ok((name == self.table.name).then(|| self.table.clone()))
    }

    async fn discover_tables(&self) -> Result<Vec<TableSchema>, DataCheckError> {
        Ok(vec![self.table.clone()])
    }

    async fn query_scalar(&self, query: &SelectQuery) -> Result<u64, DataCheckError> {
        let rows = self.run(query)?;
        Ok(rows
            .first()
            .and_then(|row| row.values().next())
            .and_then(Value::as_u64)
            .unwrap_or(0))
    }

    async fn query_rows(&self, query: &SelectQuery) -> Result<Vec<Row>, DataCheckError> {
        self.run(query)
    }
}

pub struct FakeGateway {
    template: FakeSession,
    failure: Option<String>,
    pub opened: Arc<AtomicUsize>,
}

impl FakeGateway {
    pub fn new(template: FakeSession) -> Self {
        Self {
            template,
            failure: None,
            opened: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::new(FakeSession::default())
        }
    }
}

#[async_trait]
impl RelationalGateway for FakeGateway {
    async fn open(
        &self,
        _connection: &ConnectionRecord,
    ) -> Result<Box<dyn RelationalSession>, DataCheckError> {
        if let Some(message) = &self.failure {
            return Err(DataCheckError::InternalError(message.clone()));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        let mut session = self.template.clone();
        session.live = true;
        Ok(Box::new(session))
    }
}

/// Accessor double with canned answers. Records every call so tests can
/// assert which operations an evaluator issued.
#[derive(Default)]
pub struct StubAccessor {
    pub total: u64,
    pub matching: u64,
    pub rows: Vec<Row>,
    pub groups: Vec<ValueCount>,
    pub fail_with: Option<String>,
    pub calls: Mutex<Vec<String>>,
}

impl StubAccessor {
    fn record(&self, call: String) -> Result<(), DataCheckError> {
        self.calls.lock().unwrap().push(call);
        match &self.fail_with {
            Some(message) => Err(DataCheckError::InternalError(message.clone())),
            None => Ok(()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DatasetAccessor for StubAccessor {
    fn dataset_id(&self) -> &str {
        "stub"
    }

    async fn total_row_count(&self) -> Result<u64, DataCheckError> {
        self.record("total".into())?;
        Ok(self.total)
    }

    async fn count_matching(&self, predicate: &ColumnPredicate) -> Result<u64, DataCheckError> {
        self.record(format!("count {predicate:?}"))?;
        Ok(self.matching)
    }

    async fn sample_matching(
        &self,
        predicate: &ColumnPredicate,
        limit: usize,
    ) -> Result<Vec<Row>, DataCheckError> {
        self.record(format!("sample {predicate:?} {limit}"))?;
        Ok(self
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
        self.record(format!("groups {column} {min_count}"))?;
        Ok(self.groups.clone())
    }
}
