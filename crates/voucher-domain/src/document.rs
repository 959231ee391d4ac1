//! Evidence documents produced by the acquisition/OCR collaborators

use crate::field::FieldKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of an evidence document relative to its ledger entry
///
/// - Primary: invoice-like, authoritative for amount/quantity/trade term
/// - Secondary: transport document (bill of lading, waybill), cross-check only
/// - Other: anything else offered as evidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    /// Invoice-like document
    Primary,

    /// Transport document
    Secondary,

    /// Unclassified supporting document
    Other,
}

impl DocumentType {
    /// Get the document type name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Primary => "primary",
            DocumentType::Secondary => "secondary",
            DocumentType::Other => "other",
        }
    }

    /// Parse a document type from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "primary" | "invoice" => Some(DocumentType::Primary),
            "secondary" | "transport" | "bl" | "bill_of_lading" => Some(DocumentType::Secondary),
            "other" => Some(DocumentType::Other),
            _ => None,
        }
    }

    /// Fields requested from the oracle for this document type
    pub fn requested_fields(&self) -> &'static [FieldKind] {
        match self {
            DocumentType::Primary => &[
                FieldKind::Amount,
                FieldKind::Quantity,
                FieldKind::Date,
                FieldKind::TradeTerm,
                FieldKind::DocumentNumber,
            ],
            DocumentType::Secondary => &[
                FieldKind::Date,
                FieldKind::GrossWeight,
                FieldKind::FreightPayment,
                FieldKind::Quantity,
                FieldKind::DocumentNumber,
            ],
            DocumentType::Other => &[FieldKind::Amount, FieldKind::Date],
        }
    }

    /// Fields that must be present for a result to pass the validation gate
    pub fn critical_fields(&self) -> &'static [FieldKind] {
        match self {
            DocumentType::Primary | DocumentType::Other => &[FieldKind::Amount],
            DocumentType::Secondary => &[FieldKind::Date],
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid document type: {}", s))
    }
}

/// A per-type document handed over by the acquisition pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceDocument {
    /// Ledger entry this document is evidence for
    pub ledger_id: String,

    /// Reference to the source file (path or object key)
    pub file_ref: String,

    /// Role of the document
    pub document_type: DocumentType,

    /// Acquired text (already OCR'd if the source was scanned)
    #[serde(default)]
    pub raw_text: String,

    /// Whether the text came from OCR rather than an embedded text layer
    #[serde(default)]
    pub ocr_used: bool,
}
