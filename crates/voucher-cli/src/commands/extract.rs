//! Extract command implementation.

use super::{load_records, open_store, select_by_id};
use crate::cli::ExtractArgs;
use crate::config::{Config, OutputFormat};
use crate::error::Result;
use crate::output::Formatter;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};
use voucher_domain::{EvidenceDocument, LedgerEntry};
use voucher_extractor::{ExtractionJob, Extractor};
use voucher_oracle::HttpOracle;

/// Execute the extract command.
pub async fn execute_extract(
    args: ExtractArgs,
    config: &Config,
    database: &Path,
    formatter: &Formatter,
) -> Result<()> {
    let ledgers: Vec<LedgerEntry> = load_records(&args.ledger)?;
    let ledgers = select_by_id(ledgers, args.ids.as_deref(), |l| l.id.as_str())?;
    let documents: Vec<EvidenceDocument> = load_records(&args.documents)?;

    let jobs = build_jobs(&ledgers, documents);
    if jobs.is_empty() {
        println!("{}", formatter.warning("No documents to extract."));
        return Ok(());
    }

    let oracle = HttpOracle::new(config.oracle.clone())?;
    let store = open_store(database)?;
    let extractor = Extractor::new(oracle, store, config.extractor.clone())?;
    info!(documents = jobs.len(), database = %database.display(), "Extracting");

    let outcome = extractor
        .batch_extract_with_progress(&jobs, |progress| eprintln!("{}", formatter.progress(progress)))
        .await?;

    println!("{}", formatter.format_results(&outcome.iter().cloned().collect::<Vec<_>>())?);
    if formatter.format() == OutputFormat::Table {
        println!("{}", formatter.batch_summary(&outcome));
    }
    Ok(())
}

/// Pair each document with its ledger entry, skipping documents whose
/// ledger entry is not selected.
fn build_jobs(ledgers: &[LedgerEntry], documents: Vec<EvidenceDocument>) -> Vec<ExtractionJob> {
    let by_id: BTreeMap<&str, &LedgerEntry> = ledgers.iter().map(|l| (l.id.as_str(), l)).collect();

    documents
        .into_iter()
        .filter_map(|document| match by_id.get(document.ledger_id.as_str()) {
            Some(ledger) => Some(ExtractionJob::new((*ledger).clone(), document)),
            None => {
                warn!(
                    ledger_id = %document.ledger_id,
                    file_ref = %document.file_ref,
                    "Skipping document without a selected ledger entry"
                );
                None
            }
        })
        .collect()
}
