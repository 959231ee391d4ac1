//! Error types for the Extractor

use thiserror::Error;

/// Errors that can occur during extraction
///
/// Oracle failures other than quota exhaustion never surface here; they
/// degrade into a flagged, zero-confidence result instead.
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Provider quota is exhausted; the batch was aborted
    #[error("Oracle quota exhausted while extracting {ledger_id}: {message}")]
    QuotaExhausted {
        /// Ledger entry whose document hit the quota
        ledger_id: String,
        /// Provider message
        message: String,
    },

    /// Result store error
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Background matcher task failed
    #[error("Matcher task failed: {0}")]
    Matcher(String),
}

impl ExtractorError {
    /// Whether this error aborted a batch because of the provider quota
    pub fn is_quota(&self) -> bool {
        matches!(self, ExtractorError::QuotaExhausted { .. })
    }
}
