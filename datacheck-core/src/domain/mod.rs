pub mod check;
pub mod dataset;
pub mod error;
pub mod quality;
pub mod sql;

// Handy re-exports to keep imports short elsewhere
pub use check::{CheckDefinition, CheckKind, CheckOutcome, CheckStatus, DatasetReference, NewCheck};
pub use dataset::{ConnectionDriver, ConnectionRecord, DatasetPreview, DatasetRecord, NewConnection, Row, TableSchema};
pub use error::DomainError;
