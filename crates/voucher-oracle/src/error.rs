//! Oracle error taxonomy

use crate::parser::parse_retry_delay;
use std::time::Duration;
use thiserror::Error;
use voucher_domain::{FailureKind, OracleFailure};

/// Errors that can occur while calling the extraction oracle
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OracleError {
    /// Network failure, timeout or 5xx answer
    #[error("Transient oracle failure: {0}")]
    Transient(String),

    /// Provider asked us to slow down
    #[error("Rate limited: {message}")]
    RateLimited {
        /// Provider message
        message: String,
        /// Wait taken from the `Retry-After` header, if present
        retry_after: Option<Duration>,
    },

    /// Account quota or billing limit reached
    #[error("Quota exhausted: {0}")]
    QuotaExhausted(String),

    /// Response body could not be decoded
    #[error("Invalid oracle response: {0}")]
    Parse(String),

    /// Request refused for a reason retrying will not fix
    #[error("Request rejected (HTTP {status}): {message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Provider message
        message: String,
    },

    /// None of the configured models could serve the request
    #[error("No model available (tried: {0})")]
    ModelUnavailable(String),

    /// Invalid oracle configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl OracleFailure for OracleError {
    fn kind(&self) -> FailureKind {
        match self {
            OracleError::Transient(_) | OracleError::ModelUnavailable(_) => FailureKind::Network,
            OracleError::RateLimited { .. } => FailureKind::RateLimited,
            OracleError::QuotaExhausted(_) => FailureKind::Quota,
            OracleError::Parse(_) | OracleError::Rejected { .. } | OracleError::Config(_) => {
                FailureKind::Parse
            }
        }
    }

    fn suggested_wait(&self) -> Option<Duration> {
        match self {
            OracleError::RateLimited { message, retry_after } => {
                retry_after.or_else(|| parse_retry_delay(message))
            }
            _ => None,
        }
    }
}

impl From<serde_json::Error> for OracleError {
    fn from(e: serde_json::Error) -> Self {
        OracleError::Parse(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_kinds() {
        assert_eq!(OracleError::Transient("timeout".into()).kind(), FailureKind::Network);
        assert_eq!(OracleError::QuotaExhausted("billing".into()).kind(), FailureKind::Quota);
        assert_eq!(
            OracleError::Rejected { status: 401, message: "bad key".into() }.kind(),
            FailureKind::Parse
        );
    }

    #[test]
    fn test_rate_limit_wait_prefers_header() {
        let err = OracleError::RateLimited {
            message: "Please retry in 12s".into(),
            retry_after: Some(Duration::from_secs(3)),
        };
        assert_eq!(err.suggested_wait(), Some(Duration::from_secs(3)));

        let err = OracleError::RateLimited { message: "Please retry in 12s".into(), retry_after: None };
        assert_eq!(err.suggested_wait(), Some(Duration::from_secs(12)));

        let err = OracleError::RateLimited { message: "slow down".into(), retry_after: None };
        assert_eq!(err.suggested_wait(), None);
    }
}
