//! Retry policy around a single oracle call

use crate::config::ExtractorConfig;
use crate::limiter::ConcurrencyLimiter;
use std::fmt;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};
use voucher_domain::{ExtractionOracle, FailureKind, OracleFailure, OracleRequest, OracleResponse};

/// An oracle call that gave up
#[derive(Debug, Clone, PartialEq)]
pub struct CallFailure {
    /// Category of the last failure
    pub kind: FailureKind,

    /// Message of the last failure
    pub message: String,

    /// Wait the provider suggested, if any
    pub suggested_wait: Option<Duration>,
}

impl CallFailure {
    fn from_oracle<E: OracleFailure>(err: &E) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
            suggested_wait: err.suggested_wait(),
        }
    }

    fn timed_out(after: Duration) -> Self {
        Self {
            kind: FailureKind::Network,
            message: format!("oracle call timed out after {}s", after.as_secs()),
            suggested_wait: None,
        }
    }
}

impl fmt::Display for CallFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Backoff before transient retry number `retry` (1-based)
pub fn transient_backoff(base: Duration, retry: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(retry.saturating_sub(1)))
}

/// Call the oracle, retrying according to the configured policy
///
/// - transient (network/timeout): `transient_retries` retries with doubling backoff
/// - rate limited: wait the suggested time (or the default), up to
///   `max_rate_limit_retries` times
/// - quota and parse failures return at once
///
/// A limiter slot is held only while a call is in flight, never during a wait.
pub async fn call_with_retry<O: ExtractionOracle>(
    oracle: &O,
    limiter: &ConcurrencyLimiter,
    config: &ExtractorConfig,
    request: &OracleRequest,
) -> Result<OracleResponse, CallFailure> {
    let mut attempt: u32 = 0;
    let mut transient_retries: u32 = 0;
    let mut rate_limit_retries: u32 = 0;

    loop {
        attempt += 1;
        let outcome = {
            let _slot = limiter.acquire().await.map_err(|e| CallFailure {
                kind: FailureKind::Network,
                message: e.to_string(),
                suggested_wait: None,
            })?;
            debug!(ledger_id = %request.ledger_id, mode = %request.mode, attempt, "Calling oracle");
            timeout(config.call_timeout(), oracle.extract(request)).await
        };

        let failure = match outcome {
            Ok(Ok(response)) => return Ok(response),
            Ok(Err(err)) => CallFailure::from_oracle(&err),
            Err(_) => CallFailure::timed_out(config.call_timeout()),
        };

        let wait = match failure.kind {
            FailureKind::Quota | FailureKind::Parse => return Err(failure),
            FailureKind::Network => {
                if transient_retries >= config.transient_retries {
                    return Err(failure);
                }
                transient_retries += 1;
                transient_backoff(config.backoff_base(), transient_retries)
            }
            FailureKind::RateLimited => {
                if rate_limit_retries >= config.max_rate_limit_retries {
                    return Err(failure);
                }
                rate_limit_retries += 1;
                failure.suggested_wait.unwrap_or_else(|| config.rate_limit_wait())
            }
        };

        warn!(
            ledger_id = %request.ledger_id,
            mode = %request.mode,
            attempt,
            kind = %failure.kind,
            wait_ms = wait.as_millis() as u64,
            "Oracle call failed, retrying: {}",
            failure.message
        );
        sleep(wait).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voucher_domain::{DocumentType, FieldKind, OracleMode};
    use voucher_oracle::{MockOracle, OracleError};

    fn request() -> OracleRequest {
        OracleRequest {
            ledger_id: "L-1".into(),
            document_type: DocumentType::Primary,
            mode: OracleMode::Text,
            text: "INVOICE".into(),
            file_ref: "inv.pdf".into(),
            fields: vec![FieldKind::Amount],
            hints: vec![],
            instructions: None,
        }
    }

    fn fast_config() -> ExtractorConfig {
        ExtractorConfig {
            backoff_base_ms: 1,
            rate_limit_wait_ms: 1,
            ..ExtractorConfig::default()
        }
    }

    fn ok() -> OracleResponse {
        OracleResponse { overall_confidence: 0.9, ..Default::default() }
    }

    #[test]
    fn test_backoff_doubles() {
        let base = Duration::from_secs(2);
        assert_eq!(transient_backoff(base, 1), Duration::from_secs(2));
        assert_eq!(transient_backoff(base, 2), Duration::from_secs(4));
        assert_eq!(transient_backoff(base, 3), Duration::from_secs(8));
    }

    #[tokio::test]
    async fn test_transient_failure_retried_once() {
        let oracle = MockOracle::new();
        oracle.push_error("inv.pdf", OracleMode::Text, OracleError::Transient("503".into()));
        oracle.push_response("inv.pdf", OracleMode::Text, ok());

        let limiter = ConcurrencyLimiter::new(1);
        let response = call_with_retry(&oracle, &limiter, &fast_config(), &request()).await;
        assert!(response.is_ok());
        assert_eq!(oracle.call_count(), 2);
    }

    #[tokio::test]
    async fn test_transient_retries_exhausted() {
        let oracle = MockOracle::new();
        oracle.push_error("inv.pdf", OracleMode::Text, OracleError::Transient("503".into()));

        let limiter = ConcurrencyLimiter::new(1);
        let failure = call_with_retry(&oracle, &limiter, &fast_config(), &request())
            .await
            .unwrap_err();
        assert_eq!(failure.kind, FailureKind::Network);
        assert_eq!(oracle.call_count(), 2);
        assert_eq!(limiter.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_rate_limit_bounded() {
        let oracle = MockOracle::new();
        oracle.push_error(
            "inv.pdf",
            OracleMode::Text,
            OracleError::RateLimited { message: "slow down".into(), retry_after: Some(Duration::from_millis(1)) },
        );

        let limiter = ConcurrencyLimiter::new(1);
        let failure = call_with_retry(&oracle, &limiter, &fast_config(), &request())
            .await
            .unwrap_err();
        assert_eq!(failure.kind, FailureKind::RateLimited);
        // First call plus three retries
        assert_eq!(oracle.call_count(), 4);
    }

    #[tokio::test]
    async fn test_quota_and_parse_not_retried() {
        for error in [OracleError::QuotaExhausted("billing".into()), OracleError::Parse("junk".into())] {
            let oracle = MockOracle::new();
            oracle.push_error("inv.pdf", OracleMode::Text, error);
            let limiter = ConcurrencyLimiter::new(1);
            assert!(call_with_retry(&oracle, &limiter, &fast_config(), &request()).await.is_err());
            assert_eq!(oracle.call_count(), 1);
        }
    }

    #[tokio::test]
    async fn test_timeout_counts_as_transient() {
        let oracle = MockOracle::new()
            .with_fallback(ok())
            .with_delay(Duration::from_millis(1500));
        let config = ExtractorConfig {
            call_timeout_secs: 1,
            transient_retries: 0,
            ..fast_config()
        };

        let limiter = ConcurrencyLimiter::new(1);
        let failure = call_with_retry(&oracle, &limiter, &config, &request()).await.unwrap_err();
        assert_eq!(failure.kind, FailureKind::Network);
        assert!(failure.message.contains("timed out"));
    }
}
