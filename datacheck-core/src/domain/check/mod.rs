// datacheck-core/src/domain/check/mod.rs

pub mod definition;
pub mod outcome;

pub use definition::{CheckDefinition, CheckKind, DatasetReference, NewCheck, Parameters};
pub use outcome::{CheckOutcome, CheckStatus, Evaluation, FailedRow, Metrics};
