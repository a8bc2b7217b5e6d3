// datacheck-core/src/domain/sql/quoter.rs
use sqlparser::ast::Ident;
use std::fmt;

use crate::domain::dataset::TableSchema;
use crate::domain::error::DomainError;

const MAX_IDENTIFIER_LEN: usize = 128;

/// An identifier that passed the allow-list and is double-quoted for SQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotedIdent(String);

impl QuotedIdent {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuotedIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub struct IdentifierQuoter;

impl IdentifierQuoter {
    /// Quotes a raw identifier ("my""col" style escaping). Does not check that
    /// it exists; see [`IdentifierQuoter::column`] for that.
    pub fn quote(name: &str) -> Result<QuotedIdent, DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::InvalidDefinition(
                "SQL identifier cannot be empty".into(),
            ));
        }
        if name.len() > MAX_IDENTIFIER_LEN {
            return Err(DomainError::InvalidDefinition(format!(
                "SQL identifier too long (max {MAX_IDENTIFIER_LEN} characters)"
            )));
        }
        if name.contains('\0') {
            return Err(DomainError::InvalidDefinition(
                "SQL identifier cannot contain NUL bytes".into(),
            ));
        }
        Ok(QuotedIdent(Ident::with_quote('"', name).to_string()))
    }

    /// `"schema"."table"` for an introspected table.
    pub fn table(schema: &TableSchema) -> Result<QuotedIdent, DomainError> {
        let namespace = Self::quote(&schema.schema)?;
        let table = Self::quote(&schema.name)?;
        Ok(QuotedIdent(format!("{namespace}.{table}")))
    }

    /// Quotes `column` only if the live schema actually has it.
    pub fn column(schema: &TableSchema, column: &str) -> Result<QuotedIdent, DomainError> {
        if !schema.has_column(column) {
            return Err(DomainError::UnknownIdentifier {
                kind: "column",
                name: format!("{}.{}", schema.qualified_name(), column),
            });
        }
        Self::quote(column)
    }

    /// Splits a stored table reference into (namespace, table).
    pub fn split_table_name(raw: &str) -> (Option<&str>, &str) {
        match raw.split_once('.') {
            Some((schema, table)) if !schema.is_empty() && !table.is_empty() => {
                (Some(schema), table)
            }
            _ => (None, raw),
        }
    }
}
