// datacheck/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{ArgGroup, Parser, Subcommand};
use datacheck_core::domain::{CheckKind, dataset::ConnectionDriver};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "datacheck")]
#[command(about = "Declarative data-quality checks over CSV uploads and live tables", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Directory searched for datacheck.yaml
    #[arg(long, global = true, default_value = ".")]
    pub config_dir: PathBuf,

    /// Metadata database file (overrides the configured metadata_path)
    #[arg(long, global = true)]
    pub metadata_db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 🔌 Manages live database connections
    Connection {
        #[command(subcommand)]
        action: ConnectionAction,
    },

    /// 📄 Manages uploaded CSV datasets
    Dataset {
        #[command(subcommand)]
        action: DatasetAction,
    },

    /// 📐 Manages check definitions
    Check {
        #[command(subcommand)]
        action: CheckAction,
    },

    /// 🚀 Runs a check and prints its outcome
    Run {
        check_id: String,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// 📊 Lists recorded outcomes, newest first
    Results {
        /// Only outcomes of this check
        #[arg(long)]
        check: Option<String>,

        /// Also write the listed outcomes to this JSON file
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// 🔍 Shows one recorded outcome with its sampled rows
    Result { id: String },
}

#[derive(Subcommand)]
pub enum ConnectionAction {
    /// Registers a connection after introspecting its tables
    Add {
        #[arg(long)]
        name: String,

        /// postgres | duckdb
        #[arg(long, default_value = "postgres")]
        driver: ConnectionDriver,

        #[arg(long, default_value = "localhost")]
        host: String,

        #[arg(long, default_value = "5432")]
        port: u16,

        /// Database name, or the file path for duckdb
        #[arg(long)]
        database: String,

        #[arg(long, default_value = "")]
        username: String,

        #[arg(long, env = "DATACHECK_DB_PASSWORD", default_value = "", hide_env_values = true)]
        password: String,

        /// Store the connection without contacting the database
        #[arg(long)]
        skip_discovery: bool,
    },
    List,
    Show { id: String },
    Delete { id: String },
    /// Connects and lists the tables currently visible
    Test { id: String },
}

#[derive(Subcommand)]
pub enum DatasetAction {
    /// Reads a CSV file and stores its row count and preview rows
    Import {
        file: PathBuf,

        /// Dataset name (defaults to the file stem)
        #[arg(long)]
        name: Option<String>,
    },
    List,
    Show { id: String },
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum CheckAction {
    /// Defines a check against a connection table or a dataset
    #[command(group(ArgGroup::new("target").required(true).args(["connection", "dataset"])))]
    Add {
        #[arg(long)]
        name: String,

        /// missing_values | unique_values | valid_values | value_range | regex_match | schema | custom_sql
        #[arg(long)]
        kind: CheckKind,

        /// Connection id (live table)
        #[arg(long, requires = "table")]
        connection: Option<String>,

        /// Dataset id (uploaded CSV)
        #[arg(long)]
        dataset: Option<String>,

        #[arg(long)]
        table: Option<String>,

        #[arg(long)]
        column: Option<String>,

        /// Failure threshold, percent of rows
        #[arg(long)]
        threshold: Option<f64>,

        /// Warning threshold, percent of rows
        #[arg(long)]
        warning_threshold: Option<f64>,
    },
    List,
    Show { id: String },
    /// Deletes the definition; its recorded outcomes are kept
    Delete { id: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, bail};
    use clap::Parser;

    #[test]
    fn test_cli_parse_run() -> Result<()> {
        let args = Cli::parse_from(["datacheck", "run", "check_1"]);
        assert_eq!(args.config_dir.to_string_lossy(), ".");
        assert!(args.metadata_db.is_none());
        match args.command {
            Commands::Run { check_id, json } => {
                assert_eq!(check_id, "check_1");
                assert!(!json);
                Ok(())
            }
            _ => bail!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_parse_global_metadata_db() -> Result<()> {
        let args = Cli::parse_from(["datacheck", "results", "--metadata-db", "/tmp/m.duckdb"]);
        assert_eq!(args.metadata_db, Some(PathBuf::from("/tmp/m.duckdb")));
        match args.command {
            Commands::Results { check, export } => {
                assert!(check.is_none());
                assert!(export.is_none());
                Ok(())
            }
            _ => bail!("Expected Results command"),
        }
    }

    #[test]
    fn test_cli_parse_check_add() -> Result<()> {
        let args = Cli::parse_from([
            "datacheck",
            "check",
            "add",
            "--name",
            "email completeness",
            "--kind",
            "missing_values",
            "--connection",
            "conn_1",
            "--table",
            "users",
            "--column",
            "email",
            "--threshold",
            "10",
        ]);
        match args.command {
            Commands::Check {
                action:
                    CheckAction::Add {
                        kind,
                        connection,
                        dataset,
                        threshold,
                        warning_threshold,
                        ..
                    },
            } => {
                assert_eq!(kind, CheckKind::MissingValues);
                assert_eq!(connection.as_deref(), Some("conn_1"));
                assert!(dataset.is_none());
                assert_eq!(threshold, Some(10.0));
                assert!(warning_threshold.is_none());
                Ok(())
            }
            _ => bail!("Expected Check Add command"),
        }
    }

    #[test]
    fn test_cli_check_add_needs_one_target() {
        let neither = Cli::try_parse_from(["datacheck", "check", "add", "--name", "n", "--kind", "schema"]);
        assert!(neither.is_err());

        let both = Cli::try_parse_from([
            "datacheck", "check", "add", "--name", "n", "--kind", "schema", "--connection", "c",
            "--table", "t", "--dataset", "d",
        ]);
        assert!(both.is_err());
    }

    #[test]
    fn test_cli_rejects_unknown_kind_and_driver() {
        assert!(
            Cli::try_parse_from([
                "datacheck", "check", "add", "--name", "n", "--kind", "nope", "--dataset", "d",
            ])
            .is_err()
        );
        assert!(
            Cli::try_parse_from([
                "datacheck", "connection", "add", "--name", "n", "--driver", "oracle", "--database", "x",
            ])
            .is_err()
        );
    }

    #[test]
    fn test_cli_parse_connection_defaults() -> Result<()> {
        let args = Cli::parse_from(["datacheck", "connection", "add", "--name", "wh", "--database", "app"]);
        match args.command {
            Commands::Connection {
                action:
                    ConnectionAction::Add {
                        driver,
                        host,
                        port,
                        skip_discovery,
                        ..
                    },
            } => {
                assert_eq!(driver, ConnectionDriver::Postgres);
                assert_eq!(host, "localhost");
                assert_eq!(port, 5432);
                assert!(!skip_discovery);
                Ok(())
            }
            _ => bail!("Expected Connection Add command"),
        }
    }
}
