//! Show command implementation.

use super::open_store;
use crate::cli::ShowArgs;
use crate::config::OutputFormat;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::path::Path;
use voucher_domain::ResultStore;

/// Execute the show command.
pub fn execute_show(args: ShowArgs, database: &Path, formatter: &Formatter) -> Result<()> {
    let store = open_store(database)?;
    let results = store.extractions_for(&args.ledger_id)?;
    let report = store.report_for(&args.ledger_id)?;
    if results.is_empty() && report.is_none() {
        return Err(CliError::NotFound(args.ledger_id));
    }

    if formatter.format() == OutputFormat::Json {
        let json = serde_json::json!({
            "ledger_id": args.ledger_id,
            "extractions": results,
            "report": report,
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    println!("{}", formatter.format_results(&results)?);
    for result in &results {
        for note in &result.notes {
            println!("{}", formatter.info(&format!("{}: {}", result.document_type, note)));
        }
    }
    match report {
        Some(report) => println!("{}", formatter.format_report(&report)?),
        None => println!("{}", formatter.warning("Not verified yet; run `voucher verify`.")),
    }
    Ok(())
}
