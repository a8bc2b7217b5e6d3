// datacheck/src/commands/results.rs
//
// USE CASE: Browse and export recorded outcomes.

use std::path::Path;

use anyhow::Context;
use datacheck_core::domain::DomainError;
use datacheck_core::infrastructure::fs::export_json;

use crate::commands::AppContext;
use crate::commands::output::{optional, print_json, status_badge, table, when};

pub fn list(ctx: &AppContext, check: Option<&str>, export: Option<&Path>) -> anyhow::Result<()> {
    let outcomes = ctx.store.list_outcomes(check)?;

    let rows = outcomes.iter().map(|o| {
        vec![
            o.id.clone(),
            o.check_name.clone(),
            status_badge(o.status),
            optional(o.metrics.row_count),
            optional(o.metrics.failed_count),
            optional(o.metrics.execution_time_ms),
            when(&o.created_at),
        ]
    });
    println!(
        "{}",
        table(
            &["ID", "Check", "Status", "Rows", "Failed", "ms", "Recorded"],
            rows
        )
    );

    if let Some(path) = export {
        export_json(path, &outcomes)
            .with_context(|| format!("Failed to export outcomes to {}", path.display()))?;
        println!("💾 {} outcome(s) exported to {}", outcomes.len(), path.display());
    }
    Ok(())
}

pub fn show(ctx: &AppContext, id: &str) -> anyhow::Result<()> {
    match ctx.store.find_outcome(id)? {
        Some(outcome) => print_json(&outcome),
        None => Err(DomainError::OutcomeNotFound(id.to_string()).into()),
    }
}
