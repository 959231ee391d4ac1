//! Configuration for the HTTP oracle

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default extraction service endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080";

/// Default timeout for one oracle request (60 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Configuration for [`HttpOracle`](crate::HttpOracle)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Base URL of the extraction service
    pub endpoint: String,

    /// Bearer token sent with every request
    pub api_key: Option<String>,

    /// Models to try, in order. An unavailable model moves on to the next.
    pub models: Vec<String>,

    /// Per-request timeout (seconds)
    pub timeout_secs: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            models: vec!["document-extractor".to_string()],
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl OracleConfig {
    /// Config for an endpoint with a single model
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            models: vec![model.into()],
            ..Self::default()
        }
    }

    /// Request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.endpoint.trim().is_empty() {
            return Err("endpoint must not be empty".to_string());
        }
        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(format!("endpoint must be an http(s) URL, got '{}'", self.endpoint));
        }
        if self.models.is_empty() || self.models.iter().any(|m| m.trim().is_empty()) {
            return Err("models must list at least one non-empty model name".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(OracleConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_configs() {
        let mut config = OracleConfig::default();
        config.models.clear();
        assert!(config.validate().is_err());

        let mut config = OracleConfig::default();
        config.endpoint = "localhost:8080".into();
        assert!(config.validate().is_err());

        let mut config = OracleConfig::default();
        config.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = OracleConfig::from_toml(
            r#"
            endpoint = "https://extract.example.com"
            models = ["large", "small"]
            "#,
        )
        .unwrap();
        assert_eq!(config.models, vec!["large", "small"]);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(config.api_key.is_none());
    }
}
