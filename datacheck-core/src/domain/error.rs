// datacheck-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    #[error("Validation check '{0}' not found")]
    #[diagnostic(code(datacheck::domain::check_not_found))]
    CheckNotFound(String),

    #[error("Dataset '{0}' not found")]
    #[diagnostic(
        code(datacheck::domain::dataset_not_found),
        help("The uploaded dataset may have been deleted after the check was created.")
    )]
    DatasetNotFound(String),

    #[error("Connection '{0}' not found")]
    #[diagnostic(
        code(datacheck::domain::connection_not_found),
        help("The connection may have been deleted after the check was created.")
    )]
    ConnectionNotFound(String),

    #[error("Validation result '{0}' not found")]
    #[diagnostic(code(datacheck::domain::outcome_not_found))]
    OutcomeNotFound(String),

    #[error("Unsupported validation type: {0}")]
    #[diagnostic(
        code(datacheck::domain::unsupported_kind),
        help("Only check kinds with a registered evaluator can be executed.")
    )]
    UnsupportedCheckKind(String),

    #[error("Invalid check definition: {0}")]
    #[diagnostic(code(datacheck::domain::invalid_definition))]
    InvalidDefinition(String),

    #[error("Unknown {kind} '{name}'")]
    #[diagnostic(
        code(datacheck::domain::unknown_identifier),
        help("Identifiers are checked against the live table schema before any query is built.")
    )]
    UnknownIdentifier { kind: &'static str, name: String },

    #[error("Refusing to run generated SQL: {0}")]
    #[diagnostic(
        code(datacheck::domain::unsafe_query),
        help("Only single COUNT, GROUP BY and LIMIT-bounded SELECT statements are issued.")
    )]
    UnsafeQuery(String),

    #[error("Data access failed during {operation} on dataset '{dataset_id}': {message}")]
    #[diagnostic(code(datacheck::domain::data_access))]
    DataAccess {
        operation: &'static str,
        dataset_id: String,
        message: String,
    },
}
