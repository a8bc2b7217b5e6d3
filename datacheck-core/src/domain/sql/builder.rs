// datacheck-core/src/domain/sql/builder.rs

use serde_json::Value;
use sqlparser::ast::Statement;
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

use crate::domain::dataset::TableSchema;
use crate::domain::error::DomainError;
use crate::domain::quality::ColumnPredicate;
use crate::domain::sql::quoter::{IdentifierQuoter, QuotedIdent};

/// Column aliases used by [`QueryBuilder::group_counts`].
pub const GROUP_VALUE_ALIAS: &str = "value";
pub const GROUP_COUNT_ALIAS: &str = "occurrences";

/// A parameterized read-only statement. Only the builder can make one, and
/// every one has been parsed back to make sure it is a single query.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    sql: String,
    params: Vec<Value>,
}

impl SelectQuery {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    fn checked(sql: String, params: Vec<Value>) -> Result<Self, DomainError> {
        let statements = Parser::parse_sql(&GenericDialect {}, &sql)
            .map_err(|e| DomainError::UnsafeQuery(format!("{e} in `{sql}`")))?;

        match statements.as_slice() {
            [Statement::Query(_)] => {
                tracing::debug!("Built SQL: {}", sql);
                Ok(Self { sql, params })
            }
            _ => Err(DomainError::UnsafeQuery(format!(
                "expected exactly one SELECT, got `{sql}`"
            ))),
        }
    }
}

/// Composes the handful of query shapes the evaluators need against one
/// introspected table. Every identifier goes through the schema allow-list.
pub struct QueryBuilder<'a> {
    schema: &'a TableSchema,
    table: QuotedIdent,
}

impl<'a> QueryBuilder<'a> {
    pub fn for_table(schema: &'a TableSchema) -> Result<Self, DomainError> {
        Ok(Self {
            schema,
            table: IdentifierQuoter::table(schema)?,
        })
    }

    pub fn count_all(&self) -> Result<SelectQuery, DomainError> {
        SelectQuery::checked(format!("SELECT COUNT(*) FROM {}", self.table), vec![])
    }

    pub fn count_matching(&self, predicate: &ColumnPredicate) -> Result<SelectQuery, DomainError> {
        let (condition, params) = self.condition(predicate)?;
        SelectQuery::checked(
            format!("SELECT COUNT(*) FROM {} WHERE {}", self.table, condition),
            params,
        )
    }

    pub fn sample_matching(
        &self,
        predicate: &ColumnPredicate,
        limit: usize,
    ) -> Result<SelectQuery, DomainError> {
        let (condition, params) = self.condition(predicate)?;
        SelectQuery::checked(
            format!(
                "SELECT * FROM {} WHERE {} LIMIT {}",
                self.table, condition, limit
            ),
            params,
        )
    }

    /// Values of `column` occurring at least `min_count` times, most frequent
    /// first. The NULL group, which no equality sample can match, comes last.
    pub fn group_counts(&self, column: &str, min_count: u64) -> Result<SelectQuery, DomainError> {
        let col = IdentifierQuoter::column(self.schema, column)?;
        let value_alias = IdentifierQuoter::quote(GROUP_VALUE_ALIAS)?;
        let count_alias = IdentifierQuoter::quote(GROUP_COUNT_ALIAS)?;
        SelectQuery::checked(
            format!(
                "SELECT {col} AS {value_alias}, COUNT(*) AS {count_alias} FROM {table} \
                 GROUP BY {col} HAVING COUNT(*) >= {min_count} \
                 ORDER BY {col} IS NULL, {count_alias} DESC, {col}",
                table = self.table
            ),
            vec![],
        )
    }

    fn condition(&self, predicate: &ColumnPredicate) -> Result<(String, Vec<Value>), DomainError> {
        let col = IdentifierQuoter::column(self.schema, predicate.column())?;
        Ok(match predicate {
            ColumnPredicate::IsNullOrEmpty(_) => (
                format!("{col} IS NULL OR TRIM(CAST({col} AS VARCHAR)) = ''"),
                vec![],
            ),
            ColumnPredicate::Equals(_, value) => (format!("{col} = ?"), vec![value.clone()]),
        })
    }
}
