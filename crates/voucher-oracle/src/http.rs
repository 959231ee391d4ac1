//! HTTP Oracle Implementation
//!
//! Talks to a remote extraction service over JSON.
//!
//! # Features
//!
//! - Async HTTP communication with a per-request timeout
//! - Optional bearer API key
//! - Ordered model fallback: an unavailable model moves on to the next one
//! - Status classification into transient, rate-limited, quota and parse
//!   failures; retry policy is left to the caller
//!
//! # Examples
//!
//! ```no_run
//! use voucher_oracle::{HttpOracle, OracleConfig};
//!
//! let oracle = HttpOracle::new(OracleConfig::new("http://localhost:8080", "document-extractor"))?;
//! # Ok::<(), voucher_oracle::OracleError>(())
//! ```

use crate::parser::{is_quota_message, parse_response};
use crate::{OracleConfig, OracleError};
use reqwest::StatusCode;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};
use voucher_domain::{ExtractionOracle, OracleRequest, OracleResponse};

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("voucher/", env!("CARGO_PKG_VERSION"));

/// Longest provider message kept in an error
const MAX_MESSAGE_CHARS: usize = 300;

/// Extraction oracle backed by a remote HTTP service
#[derive(Debug, Clone)]
pub struct HttpOracle {
    config: OracleConfig,
    client: reqwest::Client,
}

/// Request body for the extract endpoint
#[derive(Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    #[serde(flatten)]
    request: &'a OracleRequest,
}

impl HttpOracle {
    /// Create an oracle from a validated configuration
    pub fn new(config: OracleConfig) -> Result<Self, OracleError> {
        config.validate().map_err(OracleError::Config)?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| OracleError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Service endpoint
    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// Models in fallback order
    pub fn models(&self) -> &[String] {
        &self.config.models
    }

    async fn call_model(&self, model: &str, request: &OracleRequest) -> Result<OracleResponse, OracleError> {
        let url = format!("{}/v1/extract", self.config.endpoint.trim_end_matches('/'));
        let body = WireRequest { model, request };

        let mut builder = self.client.post(&url).json(&body);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| OracleError::Transient(format!("Request failed: {}", e)))?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs);

        let text = response
            .text()
            .await
            .map_err(|e| OracleError::Transient(format!("Failed to read response body: {}", e)))?;

        if status.is_success() {
            return parse_response(text.trim_start_matches('\u{feff}'));
        }
        Err(classify_status(status, retry_after, &text, model))
    }
}

/// Map a non-success HTTP answer onto the oracle error taxonomy
pub fn classify_status(status: StatusCode, retry_after: Option<Duration>, body: &str, model: &str) -> OracleError {
    let message: String = body.trim().chars().take(MAX_MESSAGE_CHARS).collect();

    if status == StatusCode::PAYMENT_REQUIRED || (status.is_client_error() && is_quota_message(&message)) {
        return OracleError::QuotaExhausted(message);
    }
    match status {
        StatusCode::TOO_MANY_REQUESTS => OracleError::RateLimited { message, retry_after },
        StatusCode::NOT_FOUND => OracleError::ModelUnavailable(model.to_string()),
        s if s.is_server_error() => OracleError::Transient(format!("HTTP {}: {}", s.as_u16(), message)),
        s => OracleError::Rejected { status: s.as_u16(), message },
    }
}

impl ExtractionOracle for HttpOracle {
    type Error = OracleError;

    async fn extract(&self, request: &OracleRequest) -> Result<OracleResponse, Self::Error> {
        for model in &self.config.models {
            debug!(
                ledger_id = %request.ledger_id,
                model = %model,
                mode = %request.mode,
                "Calling extraction service"
            );
            match self.call_model(model, request).await {
                Err(OracleError::ModelUnavailable(_)) => {
                    warn!(model = %model, "Model unavailable, trying next");
                }
                other => return other,
            }
        }
        Err(OracleError::ModelUnavailable(self.config.models.join(", ")))
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voucher_domain::{DocumentType, FieldKind, OracleMode};

    #[test]
    fn test_oracle_creation() {
        let oracle = HttpOracle::new(OracleConfig::new("http://localhost:8080", "large")).unwrap();
        assert_eq!(oracle.endpoint(), "http://localhost:8080");
        assert_eq!(oracle.models(), ["large".to_string()]);
        assert_eq!(oracle.name(), "http");
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = OracleConfig::default();
        config.models.clear();
        assert!(matches!(HttpOracle::new(config), Err(OracleError::Config(_))));
    }

    #[test]
    fn test_classify_status() {
        let wait = Some(Duration::from_secs(5));
        assert!(matches!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, wait, "slow down", "m"),
            OracleError::RateLimited { retry_after: Some(_), .. }
        ));
        assert!(matches!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, None, "insufficient_quota", "m"),
            OracleError::QuotaExhausted(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::PAYMENT_REQUIRED, None, "", "m"),
            OracleError::QuotaExhausted(_)
        ));
        assert_eq!(
            classify_status(StatusCode::NOT_FOUND, None, "no such model", "large"),
            OracleError::ModelUnavailable("large".into())
        );
        assert!(matches!(
            classify_status(StatusCode::BAD_GATEWAY, None, "upstream", "m"),
            OracleError::Transient(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED, None, "bad key", "m"),
            OracleError::Rejected { status: 401, .. }
        ));
    }

    #[test]
    fn test_wire_request_shape() {
        let request = OracleRequest {
            ledger_id: "L-1".into(),
            document_type: DocumentType::Secondary,
            mode: OracleMode::Vision,
            text: String::new(),
            file_ref: "bl.pdf".into(),
            fields: vec![FieldKind::Date, FieldKind::GrossWeight],
            hints: vec![],
            instructions: None,
        };
        let json = serde_json::to_value(WireRequest { model: "large", request: &request }).unwrap();
        assert_eq!(json["model"], "large");
        assert_eq!(json["mode"], "vision");
        assert_eq!(json["document_type"], "secondary");
        assert_eq!(json["fields"][1], "gross_weight");
    }

    #[tokio::test]
    async fn test_unreachable_service_is_transient() {
        let oracle = HttpOracle::new(OracleConfig::new("http://127.0.0.1:1", "large")).unwrap();
        let request = OracleRequest {
            ledger_id: "L-1".into(),
            document_type: DocumentType::Primary,
            mode: OracleMode::Text,
            text: "INVOICE".into(),
            file_ref: "inv.pdf".into(),
            fields: vec![FieldKind::Amount],
            hints: vec![],
            instructions: None,
        };

        match oracle.extract(&request).await {
            Err(OracleError::Transient(_)) => {}
            other => panic!("Expected transient error, got {:?}", other),
        }
    }

    // Requires a running extraction service
    #[tokio::test]
    #[ignore]
    async fn test_extract_integration() {
        let oracle = HttpOracle::new(OracleConfig::default()).unwrap();
        let request = OracleRequest {
            ledger_id: "L-1".into(),
            document_type: DocumentType::Primary,
            mode: OracleMode::Text,
            text: "COMMERCIAL INVOICE\nTOTAL USD 1,000.00".into(),
            file_ref: "inv.pdf".into(),
            fields: vec![FieldKind::Amount],
            hints: vec![],
            instructions: None,
        };
        if let Ok(response) = oracle.extract(&request).await {
            assert!(response.overall_confidence >= 0.0);
        }
    }
}
