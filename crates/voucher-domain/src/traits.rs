//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::{BoundingHint, DocumentType, ExtractionResult, FailureKind, FieldKind, VerificationReport};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::time::Duration;

/// Trait for storing extraction results and verification reports
///
/// Implemented by the infrastructure layer (voucher-store). Writes are
/// keyed upserts: storing results for one ledger id never touches another.
pub trait ResultStore {
    /// Error type for store operations
    type Error;

    /// Insert or replace results, keyed by (ledger id, document type)
    fn upsert_extractions(&mut self, results: &[ExtractionResult]) -> Result<(), Self::Error>;

    /// All stored results for a ledger entry
    fn extractions_for(&self, ledger_id: &str) -> Result<Vec<ExtractionResult>, Self::Error>;

    /// Insert or replace the report for its ledger id
    fn upsert_report(&mut self, report: &VerificationReport) -> Result<(), Self::Error>;

    /// Stored report for a ledger entry
    fn report_for(&self, ledger_id: &str) -> Result<Option<VerificationReport>, Self::Error>;

    /// Ledger ids that have at least one stored extraction result
    fn ledger_ids(&self) -> Result<Vec<String>, Self::Error>;
}

/// How the oracle should look at the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OracleMode {
    /// Read the acquired text
    Text,

    /// Re-render the document as page images and read those
    Vision,
}

impl OracleMode {
    /// Get the mode name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            OracleMode::Text => "text",
            OracleMode::Vision => "vision",
        }
    }
}

impl fmt::Display for OracleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request sent to the extraction oracle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleRequest {
    /// Ledger entry the document belongs to
    pub ledger_id: String,

    /// Role of the document
    pub document_type: DocumentType,

    /// Text or vision mode
    pub mode: OracleMode,

    /// Preprocessed document text (text mode)
    pub text: String,

    /// Source file, re-rendered by the provider in vision mode
    pub file_ref: String,

    /// Field schema to fill
    pub fields: Vec<FieldKind>,

    /// Contextual hints (expected totals, N:1 combinations)
    #[serde(default)]
    pub hints: Vec<String>,

    /// Extra instructions for re-prompts
    #[serde(default)]
    pub instructions: Option<String>,
}

/// One field in an oracle response
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OracleField {
    /// Extracted value, `None` when not found
    #[serde(default)]
    pub value: Option<String>,

    /// Field confidence
    #[serde(default)]
    pub confidence: f64,

    /// Optional location hint
    #[serde(default)]
    pub bounding: Option<BoundingHint>,
}

/// Whether the oracle recognized the document at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OracleStatus {
    /// Document recognized
    #[default]
    Identified,

    /// Oracle could not tell what the document is
    Unidentified,
}

/// Response returned by the extraction oracle
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OracleResponse {
    /// Field name → value. Unknown names are ignored by consumers.
    #[serde(default)]
    pub fields: BTreeMap<String, OracleField>,

    /// Confidence for the whole document
    #[serde(default)]
    pub overall_confidence: f64,

    /// Recognition status
    #[serde(default)]
    pub status: OracleStatus,

    /// Free-form notes from the oracle
    #[serde(default)]
    pub notes: Vec<String>,
}

impl OracleResponse {
    /// Field by kind
    pub fn field(&self, kind: FieldKind) -> Option<&OracleField> {
        self.fields
            .iter()
            .find(|(name, _)| FieldKind::parse(name) == Some(kind))
            .map(|(_, field)| field)
    }

    /// Non-empty value of a field
    pub fn value(&self, kind: FieldKind) -> Option<&str> {
        self.field(kind)
            .and_then(|f| f.value.as_deref())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

/// Classification of an oracle error, used to choose retry behaviour
pub trait OracleFailure: fmt::Display {
    /// Failure category
    fn kind(&self) -> FailureKind;

    /// Wait suggested by the provider before retrying, if it gave one
    fn suggested_wait(&self) -> Option<Duration> {
        None
    }
}

/// Trait for extraction oracle operations
///
/// Implemented by the infrastructure layer (voucher-oracle). The oracle is a
/// black box; all retry and escalation policy lives with the caller.
pub trait ExtractionOracle {
    /// Error type for oracle operations
    type Error: OracleFailure;

    /// Extract the requested fields from one document
    fn extract(
        &self,
        request: &OracleRequest,
    ) -> impl Future<Output = Result<OracleResponse, Self::Error>> + Send;

    /// Provider name for logs and result metadata
    fn name(&self) -> &str {
        "oracle"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_lookup_by_kind() {
        let json = r#"{
            "fields": {
                "Trade Term": {"value": " CIF Hamburg ", "confidence": 0.9},
                "amount": {"value": "", "confidence": 0.4}
            },
            "overall_confidence": 0.85
        }"#;
        let response: OracleResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.value(FieldKind::TradeTerm), Some("CIF Hamburg"));
        assert_eq!(response.value(FieldKind::Amount), None);
        assert!(response.field(FieldKind::Amount).is_some());
        assert_eq!(response.status, OracleStatus::Identified);
    }

    #[test]
    fn test_unidentified_status() {
        let response: OracleResponse =
            serde_json::from_str(r#"{"status": "unidentified", "overall_confidence": 0.2}"#).unwrap();
        assert_eq!(response.status, OracleStatus::Unidentified);
        assert!(response.fields.is_empty());
    }
}
