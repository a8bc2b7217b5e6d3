// datacheck-core/src/infrastructure/mod.rs

pub mod adapters;
pub mod config;
pub mod error;
pub mod fs;

pub use adapters::{CsvIngestor, DuckDbGateway, DuckDbMetadataStore};
pub use config::{Settings, load_settings};
