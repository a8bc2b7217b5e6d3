// datacheck/src/commands/dataset.rs
//
// USE CASE: Import CSV files as datasets (row count + preview rows).

use anyhow::Context;
use datacheck_core::domain::DomainError;
use datacheck_core::infrastructure::adapters::CsvIngestor;

use crate::cli::DatasetAction;
use crate::commands::AppContext;
use crate::commands::output::{print_json, table, when};

pub fn execute(ctx: &AppContext, action: DatasetAction) -> anyhow::Result<()> {
    match action {
        DatasetAction::Import { file, name } => {
            let record = CsvIngestor::new(ctx.settings.preview_rows)
                .ingest(&file, name.as_deref())
                .with_context(|| format!("Failed to import {}", file.display()))?;
            ctx.store.insert_dataset(&record)?;
            println!(
                "📄 {} rows, {} columns. Dataset created: {}",
                record.preview.row_count,
                record.preview.columns.len(),
                record.id
            );
        }

        DatasetAction::List => {
            let datasets = ctx.store.list_datasets()?;
            let rows = datasets.iter().map(|d| {
                vec![
                    d.id.clone(),
                    d.name.clone(),
                    d.file_name.clone(),
                    d.preview.row_count.to_string(),
                    d.preview.columns.join(", "),
                    when(&d.uploaded_at),
                ]
            });
            println!(
                "{}",
                table(&["ID", "Name", "File", "Rows", "Columns", "Uploaded"], rows)
            );
        }

        DatasetAction::Show { id } => match ctx.store.find_dataset(&id)? {
            Some(record) => print_json(&record)?,
            None => return Err(DomainError::DatasetNotFound(id).into()),
        },

        DatasetAction::Delete { id } => {
            ctx.store.delete_dataset(&id)?;
            println!("🗑️  Dataset {id} deleted");
        }
    }
    Ok(())
}
