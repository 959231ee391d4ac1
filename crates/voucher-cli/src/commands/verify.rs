//! Verify command implementation.

use super::{load_records, open_store, select_by_id};
use crate::cli::VerifyArgs;
use crate::config::{Config, OutputFormat};
use crate::error::Result;
use crate::output::Formatter;
use std::path::Path;
use tracing::{debug, info};
use voucher_domain::{LedgerEntry, ResultStore, VerificationReport};
use voucher_verifier::Verifier;

/// Execute the verify command.
pub fn execute_verify(args: VerifyArgs, config: &Config, database: &Path, formatter: &Formatter) -> Result<()> {
    let ledgers: Vec<LedgerEntry> = load_records(&args.ledger)?;
    let ledgers = select_by_id(ledgers, args.ids.as_deref(), |l| l.id.as_str())?;

    let verifier = Verifier::new(config.verifier.clone())?;
    let mut store = open_store(database)?;
    let reports = verify_all(&verifier, &mut store, &ledgers)?;

    println!("{}", formatter.format_reports(&reports)?);
    if formatter.format() == OutputFormat::Table {
        let counts = store.status_counts()?;
        let needs_review = store.ledger_ids_needing_review()?;
        println!("{}", formatter.store_summary(&counts, &needs_review));
    }
    Ok(())
}

/// Verify every ledger entry against its stored results and store the reports.
pub(crate) fn verify_all<S>(
    verifier: &Verifier,
    store: &mut S,
    ledgers: &[LedgerEntry],
) -> Result<Vec<VerificationReport>>
where
    S: ResultStore,
    crate::error::CliError: From<S::Error>,
{
    let mut reports = Vec::with_capacity(ledgers.len());
    for ledger in ledgers {
        let results = store.extractions_for(&ledger.id)?;
        let report = verifier.verify_results(ledger, &results);
        debug!(
            ledger_id = %ledger.id,
            evidence = report.evidence_count,
            status = %report.overall_status,
            "Verified"
        );
        store.upsert_report(&report)?;
        reports.push(report);
    }
    info!(reports = reports.len(), "Verification finished");
    Ok(reports)
}
