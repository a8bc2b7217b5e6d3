// datacheck-core/src/error.rs

use crate::domain::error::DomainError;
use crate::infrastructure::error::{DatabaseError, InfrastructureError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataCheckError {
    // --- DOMAIN ERRORS (not found, unsupported kinds, data access) ---
    #[error(transparent)]
    Domain(#[from] DomainError),

    // --- INFRASTRUCTURE ERRORS (DuckDB, IO, parsing) ---
    #[error(transparent)]
    Infrastructure(#[from] InfrastructureError),

    #[error("Validation queue is full ({0} runs pending); retry later")]
    QueueFull(usize),

    #[error("Internal Error: {0}")]
    InternalError(String),
}

impl DataCheckError {
    /// True when the error means a referenced record does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DataCheckError::Domain(
                DomainError::CheckNotFound(_)
                    | DomainError::DatasetNotFound(_)
                    | DomainError::ConnectionNotFound(_)
                    | DomainError::OutcomeNotFound(_)
            )
        )
    }
}

impl From<std::io::Error> for DataCheckError {
    fn from(err: std::io::Error) -> Self {
        DataCheckError::Infrastructure(InfrastructureError::Io(err))
    }
}

impl From<duckdb::Error> for DataCheckError {
    fn from(err: duckdb::Error) -> Self {
        DataCheckError::Infrastructure(InfrastructureError::Database(DatabaseError::DuckDB(err)))
    }
}

impl From<serde_json::Error> for DataCheckError {
    fn from(err: serde_json::Error) -> Self {
        DataCheckError::Infrastructure(InfrastructureError::Json(err))
    }
}
