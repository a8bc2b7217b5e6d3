// datacheck-core/src/infrastructure/adapters/mod.rs

pub mod csv;
pub mod duckdb;
pub mod store;

pub use csv::CsvIngestor;
pub use duckdb::DuckDbGateway;
pub use store::DuckDbMetadataStore;
