// datacheck/src/main.rs

mod cli;
mod commands;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use commands::AppContext;
use datacheck_core::infrastructure::config::load_settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 1. Settings (datacheck.yaml + DATACHECK_* env), then CLI overrides.
    // The configured level is not known yet, so loading logs at warn.
    let mut settings = tracing::subscriber::with_default(stderr_logger("warn"), || {
        load_settings(&cli.config_dir)
    })?;
    if let Some(path) = cli.metadata_db {
        settings.metadata_path = path;
    }

    // 2. Logging. RUST_LOG wins over the configured level; logs go to stderr
    // so `--json` output stays parseable.
    tracing::subscriber::set_global_default(stderr_logger(&settings.log_level))?;

    let ctx = AppContext::open(settings)?;

    match cli.command {
        Commands::Connection { action } => commands::connection::execute(&ctx, action).await?,
        Commands::Dataset { action } => commands::dataset::execute(&ctx, action)?,
        Commands::Check { action } => commands::check::execute(&ctx, action)?,

        // --- USE CASE: RUN CHECK ---
        Commands::Run { check_id, json } => {
            let status = commands::run::execute(&ctx, &check_id, json).await?;
            if commands::run::is_failure(status) {
                // Exit with error code for CI/CD. The outcome is already stored.
                std::process::exit(1);
            }
        }

        Commands::Results { check, export } => {
            commands::results::list(&ctx, check.as_deref(), export.as_deref())?
        }
        Commands::Result { id } => commands::results::show(&ctx, &id)?,
    }

    Ok(())
}

/// `RUST_LOG` wins over `default_level`.
fn stderr_logger(default_level: &str) -> impl tracing::Subscriber + Send + Sync {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .finish()
}
