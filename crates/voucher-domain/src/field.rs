//! Extracted fields and their canonical representations

use crate::Confidence;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fields the oracle can be asked to extract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Total amount with currency
    Amount,

    /// Shipped quantity with unit
    Quantity,

    /// Document/transaction date
    Date,

    /// Incoterm (FOB, CIF, ...)
    TradeTerm,

    /// Gross weight on a transport document
    GrossWeight,

    /// Freight payment clause ("FREIGHT PREPAID" / "FREIGHT COLLECT")
    FreightPayment,

    /// Invoice or bill-of-lading number
    DocumentNumber,
}

impl FieldKind {
    /// All field kinds, in a stable order
    pub const ALL: [FieldKind; 7] = [
        FieldKind::Amount,
        FieldKind::Quantity,
        FieldKind::Date,
        FieldKind::TradeTerm,
        FieldKind::GrossWeight,
        FieldKind::FreightPayment,
        FieldKind::DocumentNumber,
    ];

    /// Wire name of the field
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Amount => "amount",
            FieldKind::Quantity => "quantity",
            FieldKind::Date => "date",
            FieldKind::TradeTerm => "trade_term",
            FieldKind::GrossWeight => "gross_weight",
            FieldKind::FreightPayment => "freight_payment",
            FieldKind::DocumentNumber => "document_number",
        }
    }

    /// Parse a field kind from its wire name
    pub fn parse(s: &str) -> Option<Self> {
        let wanted = s.trim().to_lowercase().replace(['-', ' '], "_");
        Self::ALL.into_iter().find(|k| k.as_str() == wanted)
    }

    /// Short description used when describing the schema to the oracle
    pub fn description(&self) -> &'static str {
        match self {
            FieldKind::Amount => "grand total payable, including currency symbol or code",
            FieldKind::Quantity => "total shipped quantity including its unit",
            FieldKind::Date => "issue date of the document",
            FieldKind::TradeTerm => "incoterm with named place, e.g. 'FOB Busan'",
            FieldKind::GrossWeight => "total gross weight including its unit",
            FieldKind::FreightPayment => "freight payment clause, e.g. 'FREIGHT PREPAID'",
            FieldKind::DocumentNumber => "invoice or bill of lading number",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized representation of a field value enabling exact comparison
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CanonicalValue {
    /// Missing or unparseable
    #[default]
    Null,

    /// Monetary amount with ISO-like currency code
    Amount {
        /// Numeric value
        value: f64,
        /// Currency code, when one was present
        currency: Option<String>,
    },

    /// Quantity with unit code
    Quantity {
        /// Numeric value
        value: f64,
        /// Unit code, when one was present
        unit: Option<String>,
    },

    /// Date; `parsed` is false when the raw text was passed through unchanged
    Date {
        /// YYYY-MM-DD, or the raw text when unparseable
        value: String,
        /// Whether `value` is a real ISO date
        parsed: bool,
    },

    /// Short code (trade term, freight clause)
    Code {
        /// The code
        value: String,
    },

    /// Free text kept as-is (document numbers)
    Text {
        /// The text
        value: String,
    },
}

impl CanonicalValue {
    /// Whether the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, CanonicalValue::Null)
    }

    /// Amount value and currency
    pub fn as_amount(&self) -> Option<(f64, Option<&str>)> {
        match self {
            CanonicalValue::Amount { value, currency } => Some((*value, currency.as_deref())),
            _ => None,
        }
    }

    /// Quantity value and unit
    pub fn as_quantity(&self) -> Option<(f64, Option<&str>)> {
        match self {
            CanonicalValue::Quantity { value, unit } => Some((*value, unit.as_deref())),
            _ => None,
        }
    }

    /// ISO date, only when it was actually parsed
    pub fn as_iso_date(&self) -> Option<&str> {
        match self {
            CanonicalValue::Date { value, parsed: true } => Some(value),
            _ => None,
        }
    }

    /// Code value
    pub fn as_code(&self) -> Option<&str> {
        match self {
            CanonicalValue::Code { value } => Some(value),
            _ => None,
        }
    }

    /// Render the canonical form as text.
    ///
    /// Feeding the rendering back through the matching normalizer yields the
    /// same canonical value.
    pub fn render(&self) -> Option<String> {
        match self {
            CanonicalValue::Null => None,
            CanonicalValue::Amount { value, currency } => Some(match currency {
                Some(code) => format!("{} {}", value, code),
                None => value.to_string(),
            }),
            CanonicalValue::Quantity { value, unit } => Some(match unit {
                Some(code) => format!("{} {}", value, code),
                None => value.to_string(),
            }),
            CanonicalValue::Date { value, .. } => Some(value.clone()),
            CanonicalValue::Code { value } => Some(value.clone()),
            CanonicalValue::Text { value } => Some(value.clone()),
        }
    }
}

/// Where on the page the oracle found a value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingHint {
    /// 1-based page number
    #[serde(default)]
    pub page: Option<u32>,

    /// [left, top, width, height], normalized to page size
    #[serde(default)]
    pub bounds: Option<[f64; 4]>,
}

/// One extracted field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedField {
    /// Value exactly as the oracle returned it, kept for audit
    pub raw_value: Option<String>,

    /// Normalized value
    #[serde(default)]
    pub canonical: CanonicalValue,

    /// Oracle confidence for this field
    pub confidence: Confidence,

    /// Optional location hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding: Option<BoundingHint>,
}

impl ExtractedField {
    /// Create a field with a raw value and no canonical form yet
    pub fn raw(raw_value: Option<String>, confidence: Confidence) -> Self {
        Self {
            raw_value,
            canonical: CanonicalValue::Null,
            confidence,
            bounding: None,
        }
    }

    /// Whether the oracle supplied a non-empty value
    pub fn has_value(&self) -> bool {
        self.raw_value
            .as_deref()
            .map(|v| !v.trim().is_empty())
            .unwrap_or(false)
    }
}
