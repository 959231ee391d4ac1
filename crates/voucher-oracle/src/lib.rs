//! Voucher Oracle Layer
//!
//! Implementations of the `ExtractionOracle` trait from `voucher-domain`.
//!
//! # Oracles
//!
//! - `MockOracle`: scripted replies for tests, with an in-flight gauge
//! - `HttpOracle`: remote extraction service with model fallback
//!
//! Oracles only classify failures (`OracleError`). Retrying, escalating and
//! re-prompting are the extractor's job.

#![warn(missing_docs)]

mod config;
mod error;
pub mod http;
mod mock;
pub mod parser;

pub use config::{OracleConfig, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS};
pub use error::OracleError;
pub use http::HttpOracle;
pub use mock::MockOracle;
pub use parser::{extract_json, parse_retry_delay};
