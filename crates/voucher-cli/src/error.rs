//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Oracle setup error
    #[error("Oracle error: {0}")]
    Oracle(#[from] voucher_oracle::OracleError),

    /// Extraction error
    #[error("Extraction error: {0}")]
    Extractor(#[from] voucher_extractor::ExtractorError),

    /// Verifier setup error
    #[error("Verifier error: {0}")]
    Verifier(#[from] voucher_verifier::VerifierError),

    /// Result store error
    #[error("Store error: {0}")]
    Store(#[from] voucher_store::StoreError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Nothing stored for the requested ledger id
    #[error("No stored results for ledger entry '{0}'")]
    NotFound(String),
}
