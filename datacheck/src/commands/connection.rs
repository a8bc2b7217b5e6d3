// datacheck/src/commands/connection.rs
//
// USE CASE: Register and inspect live database connections.

use anyhow::Context;
use datacheck_core::domain::{
    ConnectionDriver, ConnectionRecord, DomainError, NewConnection, TableSchema,
};
use datacheck_core::infrastructure::adapters::DuckDbGateway;
use datacheck_core::ports::gateway::{RelationalGateway, RelationalSession};

use crate::cli::ConnectionAction;
use crate::commands::AppContext;
use crate::commands::output::{print_json, table, when};

pub async fn execute(ctx: &AppContext, action: ConnectionAction) -> anyhow::Result<()> {
    match action {
        ConnectionAction::Add {
            name,
            driver,
            host,
            port,
            database,
            username,
            password,
            skip_discovery,
        } => {
            let mut record = ConnectionRecord::create(NewConnection {
                name,
                driver,
                host,
                port,
                database,
                username,
                password,
            })?;

            if !skip_discovery {
                record.tables = discover(&record)
                    .await
                    .context("Connection test failed; nothing was stored")?;
            }

            ctx.store.insert_connection(&record)?;
            println!(
                "🔌 {} table(s) discovered. Connection created: {}",
                record.tables.len(),
                record.id
            );
        }

        ConnectionAction::List => {
            let connections = ctx.store.list_connections()?;
            let rows = connections.iter().map(|c| {
                vec![
                    c.id.clone(),
                    c.name.clone(),
                    c.driver.to_string(),
                    location(c),
                    c.tables.len().to_string(),
                    when(&c.created_at),
                ]
            });
            println!(
                "{}",
                table(&["ID", "Name", "Driver", "Location", "Tables", "Created"], rows)
            );
        }

        ConnectionAction::Show { id } => {
            let mut record = find(ctx, &id)?;
            if !record.password.is_empty() {
                record.password = "***".to_string();
            }
            print_json(&record)?;
        }

        ConnectionAction::Delete { id } => {
            ctx.store.delete_connection(&id)?;
            println!("🗑️  Connection {id} deleted");
        }

        ConnectionAction::Test { id } => {
            let record = find(ctx, &id)?;
            let tables = discover(&record).await?;
            let rows = tables.iter().map(|t| {
                vec![
                    t.qualified_name(),
                    t.columns
                        .iter()
                        .map(|c| format!("{} {}", c.name, c.data_type))
                        .collect::<Vec<_>>()
                        .join(", "),
                ]
            });
            println!("{}", table(&["Table", "Columns"], rows));
            println!("✅ Connection {id} is reachable ({} tables)", tables.len());
        }
    }
    Ok(())
}

async fn discover(record: &ConnectionRecord) -> anyhow::Result<Vec<TableSchema>> {
    let session = DuckDbGateway::new().open(record).await?;
    Ok(session.discover_tables().await?)
}

fn find(ctx: &AppContext, id: &str) -> anyhow::Result<ConnectionRecord> {
    ctx.store
        .find_connection(id)?
        .ok_or_else(|| DomainError::ConnectionNotFound(id.to_string()).into())
}

fn location(c: &ConnectionRecord) -> String {
    match c.driver {
        ConnectionDriver::DuckDb => c.database.clone(),
        ConnectionDriver::Postgres => {
            format!("{}:{}/{}", c.host, c.port, c.database)
        }
    }
}
