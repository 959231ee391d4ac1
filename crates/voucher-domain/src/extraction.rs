//! Extraction results - the evidence side of a reconciliation

use crate::{CanonicalValue, CombinationHint, Confidence, DocumentType, ExtractedField, FieldKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Which oracle tier produced the accepted result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionTier {
    /// Text-mode oracle call
    Text,

    /// Vision-mode oracle call (document re-rendered as images)
    Vision,

    /// No usable oracle answer
    Failed,
}

impl ExtractionTier {
    /// Get the tier name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionTier::Text => "text",
            ExtractionTier::Vision => "vision",
            ExtractionTier::Failed => "failed",
        }
    }
}

/// Why an oracle call did not produce a usable answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Transport or transient server error
    Network,

    /// Malformed or incomplete response
    Parse,

    /// Rate limited by the provider
    RateLimited,

    /// Hard quota exhaustion; fatal for a batch
    Quota,
}

impl FailureKind {
    /// Get the failure kind as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Network => "network",
            FailureKind::Parse => "parse",
            FailureKind::RateLimited => "rate_limited",
            FailureKind::Quota => "quota",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static NULL_VALUE: CanonicalValue = CanonicalValue::Null;

/// Structured fields extracted from one evidence document
///
/// Stored keyed by (ledger id, document type). Re-extraction replaces that
/// key only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Ledger entry the document is evidence for
    pub ledger_id: String,

    /// Role of the document
    pub document_type: DocumentType,

    /// Source file reference
    pub file_ref: String,

    /// Extracted fields
    #[serde(default)]
    pub fields: BTreeMap<FieldKind, ExtractedField>,

    /// Oracle-reported confidence for the whole document
    pub overall_confidence: Confidence,

    /// Tier that produced the accepted answer
    pub tier: ExtractionTier,

    /// Failure kind when the extraction degraded
    #[serde(default)]
    pub failure: Option<FailureKind>,

    /// Whether a human should look at this result
    #[serde(default)]
    pub needs_review: bool,

    /// N:1 hint computed before the oracle call
    #[serde(default)]
    pub combination_hint: Option<CombinationHint>,

    /// Free-form audit notes
    #[serde(default)]
    pub notes: Vec<String>,

    /// RFC 3339 timestamp of the extraction
    #[serde(default)]
    pub extracted_at: String,
}

impl ExtractionResult {
    /// A zero-confidence result for a document that could not be extracted
    pub fn failed(
        ledger_id: impl Into<String>,
        document_type: DocumentType,
        file_ref: impl Into<String>,
        kind: FailureKind,
    ) -> Self {
        Self {
            ledger_id: ledger_id.into(),
            document_type,
            file_ref: file_ref.into(),
            fields: BTreeMap::new(),
            overall_confidence: Confidence::ZERO,
            tier: ExtractionTier::Failed,
            failure: Some(kind),
            needs_review: true,
            combination_hint: None,
            notes: vec![format!("extraction failed: {}", kind)],
            extracted_at: String::new(),
        }
    }

    /// Look up a field
    pub fn field(&self, kind: FieldKind) -> Option<&ExtractedField> {
        self.fields.get(&kind)
    }

    /// Canonical value of a field, `Null` when absent
    pub fn canonical(&self, kind: FieldKind) -> &CanonicalValue {
        self.fields.get(&kind).map(|f| &f.canonical).unwrap_or(&NULL_VALUE)
    }

    /// Critical fields of this document type that carry no value
    pub fn missing_critical_fields(&self) -> Vec<FieldKind> {
        self.document_type
            .critical_fields()
            .iter()
            .copied()
            .filter(|kind| !self.field(*kind).map(ExtractedField::has_value).unwrap_or(false))
            .collect()
    }

    /// Append an audit note
    pub fn note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }
}
