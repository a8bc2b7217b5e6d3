// datacheck/src/commands/mod.rs

pub mod check;
pub mod connection;
pub mod dataset;
pub mod output;
pub mod results;
pub mod run;

use std::sync::Arc;

use anyhow::Context;
use datacheck_core::infrastructure::adapters::{DuckDbGateway, DuckDbMetadataStore};
use datacheck_core::infrastructure::config::Settings;
use datacheck_core::{EngineDeps, EvaluatorRegistry, ValidationEngine};

/// What every command needs: the resolved settings and the metadata store.
pub struct AppContext {
    pub settings: Settings,
    pub store: Arc<DuckDbMetadataStore>,
}

impl AppContext {
    pub fn open(settings: Settings) -> anyhow::Result<Self> {
        let store = DuckDbMetadataStore::open(&settings.metadata_path).with_context(|| {
            format!(
                "Failed to open metadata store at {}",
                settings.metadata_path.display()
            )
        })?;
        Ok(Self {
            settings,
            store: Arc::new(store),
        })
    }

    /// Engine wired to this context's store and the DuckDB gateway.
    pub fn engine(&self) -> ValidationEngine {
        let deps = EngineDeps {
            definitions: self.store.clone(),
            connections: self.store.clone(),
            datasets: self.store.clone(),
            gateway: Arc::new(DuckDbGateway::new()),
        };
        ValidationEngine::start(
            deps,
            EvaluatorRegistry::with_builtin(),
            self.settings.queue_capacity,
        )
    }
}
