// datacheck-core/src/infrastructure/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DatabaseError {
    #[error("DuckDB Engine Error: {0}")]
    #[diagnostic(
        code(datacheck::infra::database::duckdb),
        help("An error occurred inside the SQL engine.")
    )]
    DuckDB(#[from] duckdb::Error),

    #[error("Unexpected value in column '{column}': {message}")]
    #[diagnostic(code(datacheck::infra::database::decode))]
    Decode { column: String, message: String },
}

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    // --- DATABASE (Abstracted) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Database(#[from] DatabaseError),

    // --- FILESYSTEM (IO) ---
    #[error("File System Error: {0}")]
    #[diagnostic(
        code(datacheck::infra::io),
        help("Check file permissions or path validity.")
    )]
    Io(#[from] std::io::Error),

    // --- STORED JSON ---
    #[error("JSON Encoding Error: {0}")]
    #[diagnostic(
        code(datacheck::infra::json),
        help("A stored record holds a nested field that no longer decodes.")
    )]
    Json(#[from] serde_json::Error),

    // --- CONFIG / YAML ---
    #[error("YAML Parsing Error: {0}")]
    #[diagnostic(
        code(datacheck::infra::yaml),
        help("Check your YAML syntax (indentation, types).")
    )]
    YamlError(#[from] serde_yaml::Error),

    #[error("Configuration Error: {0}")]
    #[diagnostic(code(datacheck::infra::config))]
    ConfigError(String),

    #[error("Configuration not found at '{0}'")]
    #[diagnostic(code(datacheck::infra::config_missing))]
    ConfigNotFound(String),

    // --- INGESTION ---
    #[error("CSV Ingestion Error: {0}")]
    #[diagnostic(
        code(datacheck::infra::csv),
        help("Only comma-separated files with a .csv extension can be uploaded.")
    )]
    Csv(String),
}

// Shortcut for `?` on duckdb calls inside adapters
impl From<duckdb::Error> for InfrastructureError {
    fn from(err: duckdb::Error) -> Self {
        InfrastructureError::Database(DatabaseError::DuckDB(err))
    }
}
