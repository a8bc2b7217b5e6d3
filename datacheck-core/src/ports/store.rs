// datacheck-core/src/ports/store.rs

// Persistence collaborators of the validation engine. The engine only reads
// definitions and records, and appends outcomes.

use crate::domain::check::{CheckDefinition, CheckOutcome};
use crate::domain::dataset::{ConnectionRecord, DatasetRecord};
use crate::error::DataCheckError;
use async_trait::async_trait;

#[async_trait]
pub trait DefinitionStore: Send + Sync {
    async fn get_check(&self, id: &str) -> Result<Option<CheckDefinition>, DataCheckError>;

    /// Append-only: an outcome is inserted once and never updated.
    async fn put_outcome(&self, outcome: &CheckOutcome) -> Result<(), DataCheckError>;
}

#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    async fn get_connection(&self, id: &str) -> Result<Option<ConnectionRecord>, DataCheckError>;
}

#[async_trait]
pub trait DatasetRegistry: Send + Sync {
    async fn get_dataset(&self, id: &str) -> Result<Option<DatasetRecord>, DataCheckError>;
}
