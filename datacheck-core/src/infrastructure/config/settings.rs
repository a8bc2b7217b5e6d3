// datacheck-core/src/infrastructure/config/settings.rs

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::infrastructure::error::InfrastructureError;

pub const CONFIG_CANDIDATES: [&str; 2] = ["datacheck.yaml", "datacheck.yml"];

/// Process-wide settings, read once at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Settings {
    /// DuckDB file holding connections, datasets, checks and outcomes.
    pub metadata_path: PathBuf,

    #[validate(range(min = 1, message = "queue_capacity must be at least 1"))]
    pub queue_capacity: usize,

    #[validate(range(min = 1, message = "preview_rows must be at least 1"))]
    pub preview_rows: usize,

    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    #[validate(length(min = 1, message = "log_level cannot be empty"))]
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            metadata_path: PathBuf::from("datacheck.duckdb"),
            queue_capacity: 64,
            preview_rows: 3,
            log_level: "info".to_string(),
        }
    }
}

/// Reads `datacheck.yaml` (or `.yml`) from `dir`, then applies `DATACHECK_*`
/// environment overrides. No file means defaults.
#[instrument]
pub fn load_settings(dir: &Path) -> Result<Settings, InfrastructureError> {
    let settings = match find_config(dir) {
        Some(path) => {
            info!(path = ?path, "Loading settings");
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                Settings::default()
            } else {
                serde_yaml::from_str(&content)?
            }
        }
        None => Settings::default(),
    };

    let settings = apply_env_overrides(settings, |key| std::env::var(key).ok());
    settings
        .validate()
        .map_err(|e| InfrastructureError::ConfigError(e.to_string()))?;
    Ok(settings)
}

fn find_config(dir: &Path) -> Option<PathBuf> {
    CONFIG_CANDIDATES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.is_file())
}

/// Layers `DATACHECK_METADATA_PATH`, `DATACHECK_QUEUE_CAPACITY` and
/// `DATACHECK_LOG_LEVEL` over the file settings. `lookup` resolves a variable.
pub fn apply_env_overrides(
    mut settings: Settings,
    lookup: impl Fn(&str) -> Option<String>,
) -> Settings {
    if let Some(val) = lookup("DATACHECK_METADATA_PATH") {
        info!(old = ?settings.metadata_path, new = %val, "Overriding metadata path via ENV");
        settings.metadata_path = PathBuf::from(val);
    }
    if let Some(val) = lookup("DATACHECK_QUEUE_CAPACITY") {
        match val.trim().parse::<usize>() {
            Ok(capacity) => settings.queue_capacity = capacity,
            Err(_) => warn!(value = %val, "Ignoring non-numeric DATACHECK_QUEUE_CAPACITY"),
        }
    }
    if let Some(val) = lookup("DATACHECK_LOG_LEVEL") {
        settings.log_level = val;
    }
    settings
}
