//! Job and batch types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use voucher_domain::{DocumentType, EvidenceDocument, ExtractionResult, ExtractionTier, LedgerEntry};

/// One document to extract, paired with the ledger entry it is evidence for
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionJob {
    /// Ledger entry providing the expected totals
    pub ledger: LedgerEntry,

    /// Document to extract
    pub document: EvidenceDocument,
}

impl ExtractionJob {
    /// Pair a ledger entry with a document
    pub fn new(ledger: LedgerEntry, document: EvidenceDocument) -> Self {
        Self { ledger, document }
    }
}

/// Progress reported after each batch chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    /// 1-based index of the chunk just finished
    pub chunk_index: usize,

    /// Number of chunks in the batch
    pub chunk_count: usize,

    /// Documents finished so far
    pub completed: usize,

    /// Documents in the batch
    pub total: usize,

    /// Finished documents that degraded to a failed result
    pub failed: usize,
}

/// Batch results merged per ledger id and document type
///
/// When the same key is produced twice, the result that completed last wins.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    results: BTreeMap<String, BTreeMap<DocumentType, ExtractionResult>>,
}

impl BatchOutcome {
    /// Record a result, replacing any earlier one for the same key
    pub fn insert(&mut self, result: ExtractionResult) {
        self.results
            .entry(result.ledger_id.clone())
            .or_default()
            .insert(result.document_type, result);
    }

    /// Results for one ledger id
    pub fn for_ledger(&self, ledger_id: &str) -> Option<&BTreeMap<DocumentType, ExtractionResult>> {
        self.results.get(ledger_id)
    }

    /// Ledger ids with at least one result
    pub fn ledger_ids(&self) -> impl Iterator<Item = &str> {
        self.results.keys().map(String::as_str)
    }

    /// Number of stored results
    pub fn len(&self) -> usize {
        self.results.values().map(BTreeMap::len).sum()
    }

    /// Whether no results were recorded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Results that degraded to a failure
    pub fn failed(&self) -> usize {
        self.iter().filter(|r| r.tier == ExtractionTier::Failed).count()
    }

    /// Results flagged for review
    pub fn needs_review(&self) -> usize {
        self.iter().filter(|r| r.needs_review).count()
    }

    /// Iterate over all results, ordered by ledger id then document type
    pub fn iter(&self) -> impl Iterator<Item = &ExtractionResult> {
        self.results.values().flat_map(BTreeMap::values)
    }

    /// Flatten into a list, ordered by ledger id then document type
    pub fn into_results(self) -> Vec<ExtractionResult> {
        self.results.into_values().flat_map(BTreeMap::into_values).collect()
    }
}
