//! Verifier error types

use thiserror::Error;

/// Errors that can occur while setting up the verifier
///
/// Verification itself never fails; disagreements are reported as checks.
#[derive(Error, Debug)]
pub enum VerifierError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
