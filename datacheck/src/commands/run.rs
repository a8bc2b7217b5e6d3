// datacheck/src/commands/run.rs
//
// USE CASE: Run one check through the validation engine and report its outcome.

use std::time::Instant;

use datacheck_core::domain::{CheckOutcome, CheckStatus};

use crate::commands::AppContext;
use crate::commands::output::{optional, print_json, status_badge};

/// Returns the outcome status so the caller can pick the exit code.
pub async fn execute(ctx: &AppContext, check_id: &str, json: bool) -> anyhow::Result<CheckStatus> {
    let start = Instant::now();
    let engine = ctx.engine();

    let ticket = engine.submit(check_id).await?;
    if !json {
        println!("🚀 Running check {}...", ticket.check_id());
    }
    let outcome = ticket.wait().await?;

    if json {
        print_json(&outcome)?;
    } else {
        summary(&outcome);
        println!("   Outcome {} recorded in {:.2?}", outcome.id, start.elapsed());
    }
    Ok(outcome.status)
}

fn summary(outcome: &CheckOutcome) {
    println!("\n{}  {}", status_badge(outcome.status), outcome.check_name);
    println!(
        "   Dataset: {} {}",
        outcome.dataset.kind_label(),
        outcome.dataset.id()
    );
    if let Some(table) = &outcome.table {
        println!("   Table:   {table}");
    }
    if let Some(column) = &outcome.column {
        println!("   Column:  {column}");
    }

    if let Some(message) = &outcome.error_message {
        eprintln!("   💥 {message}");
        return;
    }

    let m = &outcome.metrics;
    println!(
        "   Rows: {}  passed: {}  failed: {}  ({} ms)",
        optional(m.row_count),
        optional(m.passed_count),
        optional(m.failed_count),
        optional(m.execution_time_ms)
    );

    if let Some(rows) = &outcome.failed_rows {
        println!("   Sampled failing rows ({}):", rows.len());
        for failed in rows.iter().take(10) {
            println!(
                "     - {}  {}",
                failed.reason,
                serde_json::Value::Object(failed.row.clone())
            );
        }
        if rows.len() > 10 {
            println!("     ... {} more (see `datacheck result {}`)", rows.len() - 10, outcome.id);
        }
    }
}

pub fn is_failure(status: CheckStatus) -> bool {
    matches!(status, CheckStatus::Failed | CheckStatus::Error)
}
