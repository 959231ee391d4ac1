//! Configuration for the Extractor

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the Extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Text-mode confidence below which the vision tier is tried
    pub escalation_threshold: f64,

    /// Absolute tolerance when matching amounts against the ledger total
    pub match_tolerance: f64,

    /// Largest line-item combination the matcher tries
    pub max_combination_size: usize,

    /// Most numeric candidates the matcher keeps from one document
    pub candidate_pool_cap: usize,

    /// Oracle calls allowed in flight at once
    pub max_concurrency: usize,

    /// Documents launched together per batch chunk
    pub chunk_size: usize,

    /// First transient-retry backoff (milliseconds); doubles per attempt
    pub backoff_base_ms: u64,

    /// Retries after a transient failure
    pub transient_retries: u32,

    /// Wait after a rate limit when the provider suggests none (milliseconds)
    pub rate_limit_wait_ms: u64,

    /// Retries after rate-limit failures
    pub max_rate_limit_retries: u32,

    /// Maximum time for a single oracle call (seconds)
    pub call_timeout_secs: u64,
}

impl ExtractorConfig {
    /// First transient-retry backoff as a Duration
    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    /// Default rate-limit wait as a Duration
    pub fn rate_limit_wait(&self) -> Duration {
        Duration::from_millis(self.rate_limit_wait_ms)
    }

    /// Oracle call timeout as a Duration
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.escalation_threshold) {
            return Err("escalation_threshold must be between 0.0 and 1.0".to_string());
        }
        if !self.match_tolerance.is_finite() || self.match_tolerance < 0.0 {
            return Err("match_tolerance must be a non-negative number".to_string());
        }
        if self.max_combination_size == 0 {
            return Err("max_combination_size must be greater than 0".to_string());
        }
        if self.candidate_pool_cap < self.max_combination_size {
            return Err("candidate_pool_cap cannot be smaller than max_combination_size".to_string());
        }
        if self.max_concurrency == 0 {
            return Err("max_concurrency must be greater than 0".to_string());
        }
        if self.chunk_size == 0 {
            return Err("chunk_size must be greater than 0".to_string());
        }
        if self.call_timeout_secs == 0 {
            return Err("call_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            escalation_threshold: 0.8,
            match_tolerance: 0.05,
            max_combination_size: 5,
            candidate_pool_cap: 50,
            max_concurrency: 5,
            chunk_size: 10,
            backoff_base_ms: 2_000,
            transient_retries: 1,
            rate_limit_wait_ms: 60_000,
            max_rate_limit_retries: 3,
            call_timeout_secs: 120,
        }
    }
}

impl ExtractorConfig {
    /// Aggressive preset: fewer retries, shorter waits, more parallelism
    pub fn aggressive() -> Self {
        Self {
            escalation_threshold: 0.7,
            max_combination_size: 3,
            candidate_pool_cap: 30,
            max_concurrency: 10,
            chunk_size: 20,
            backoff_base_ms: 1_000,
            rate_limit_wait_ms: 30_000,
            max_rate_limit_retries: 1,
            call_timeout_secs: 60,
            ..Self::default()
        }
    }

    /// Lenient preset: escalate more often, search deeper, retry longer
    pub fn lenient() -> Self {
        Self {
            escalation_threshold: 0.9,
            max_combination_size: 6,
            candidate_pool_cap: 60,
            max_concurrency: 3,
            chunk_size: 5,
            transient_retries: 2,
            max_rate_limit_retries: 5,
            call_timeout_secs: 300,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
