// datacheck-core/src/infrastructure/config/mod.rs

pub mod settings;

pub use settings::{Settings, apply_env_overrides, load_settings};
