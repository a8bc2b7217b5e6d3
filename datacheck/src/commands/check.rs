// datacheck/src/commands/check.rs
//
// USE CASE: Define, list and delete validation checks.

use anyhow::bail;
use datacheck_core::domain::check::Parameters;
use datacheck_core::domain::{CheckDefinition, DatasetReference, DomainError, NewCheck};
use serde_json::Value;

use crate::cli::CheckAction;
use crate::commands::AppContext;
use crate::commands::output::{optional, print_json, table, when};

pub fn execute(ctx: &AppContext, action: CheckAction) -> anyhow::Result<()> {
    match action {
        CheckAction::Add {
            name,
            kind,
            connection,
            dataset,
            table,
            column,
            threshold,
            warning_threshold,
        } => {
            let dataset = match (connection, dataset) {
                (Some(connection_id), _) => {
                    if ctx.store.find_connection(&connection_id)?.is_none() {
                        return Err(DomainError::ConnectionNotFound(connection_id).into());
                    }
                    DatasetReference::relational(connection_id)
                }
                (None, Some(dataset_id)) => {
                    if ctx.store.find_dataset(&dataset_id)?.is_none() {
                        return Err(DomainError::DatasetNotFound(dataset_id).into());
                    }
                    DatasetReference::tabular(dataset_id)
                }
                (None, None) => bail!("Either --connection or --dataset is required"),
            };

            let mut parameters = Parameters::new();
            if let Some(t) = threshold {
                parameters.insert("threshold".into(), Value::from(t));
            }
            if let Some(w) = warning_threshold {
                parameters.insert("warningThreshold".into(), Value::from(w));
            }

            let check = CheckDefinition::create(NewCheck {
                name,
                kind,
                dataset,
                table,
                column,
                parameters,
            })?;
            ctx.store.insert_check(&check)?;
            println!("📐 Check created: {}", check.id);
        }

        CheckAction::List => {
            let checks = ctx.store.list_checks()?;
            let rows = checks.iter().map(|c| {
                vec![
                    c.id.clone(),
                    c.name.clone(),
                    c.kind.to_string(),
                    format!("{}:{}", c.dataset.kind_label(), c.dataset.id()),
                    optional(c.table.as_deref()),
                    optional(c.column.as_deref()),
                    when(&c.created_at),
                ]
            });
            println!(
                "{}",
                table(
                    &["ID", "Name", "Type", "Dataset", "Table", "Column", "Created"],
                    rows
                )
            );
        }

        CheckAction::Show { id } => match ctx.store.find_check(&id)? {
            Some(check) => print_json(&check)?,
            None => return Err(DomainError::CheckNotFound(id).into()),
        },

        CheckAction::Delete { id } => {
            ctx.store.delete_check(&id)?;
            println!("🗑️  Check {id} deleted (recorded outcomes are kept)");
        }
    }
    Ok(())
}
