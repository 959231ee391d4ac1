//! Ledger entries - the authoritative side of a reconciliation

use serde::{Deserialize, Serialize};

/// A read-only ledger record supplied by the ledger source
///
/// Values are kept as the ledger recorded them. Dates, units and trade terms
/// are canonicalized by the verifier before comparison, never rewritten here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// External identifier from the ledger source
    pub id: String,

    /// Transaction date as recorded (any supported date format)
    #[serde(default)]
    pub date: Option<String>,

    /// Total amount
    #[serde(default)]
    pub amount: Option<f64>,

    /// Currency code or symbol
    #[serde(default)]
    pub currency: Option<String>,

    /// Shipped quantity
    #[serde(default)]
    pub quantity: Option<f64>,

    /// Unit of the quantity as recorded (e.g. "tons", "KGS")
    #[serde(default)]
    pub unit: Option<String>,

    /// Trade term as recorded (e.g. "FOB Busan")
    #[serde(default)]
    pub trade_term: Option<String>,

    /// Customer name
    #[serde(default)]
    pub customer: Option<String>,
}

impl LedgerEntry {
    /// Create an entry with only an id; all fields empty
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            date: None,
            amount: None,
            currency: None,
            quantity: None,
            unit: None,
            trade_term: None,
            customer: None,
        }
    }

    /// The expected amount when it is usable as a matcher target
    pub fn positive_amount(&self) -> Option<f64> {
        self.amount.filter(|a| *a > 0.0)
    }

    /// The expected quantity when it is usable as a matcher target
    pub fn positive_quantity(&self) -> Option<f64> {
        self.quantity.filter(|q| *q > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_sparse_entry() {
        let entry: LedgerEntry =
            serde_json::from_str(r#"{"id": "L-001", "amount": 1000.0, "currency": "USD"}"#).unwrap();
        assert_eq!(entry.id, "L-001");
        assert_eq!(entry.amount, Some(1000.0));
        assert!(entry.date.is_none());
        assert!(entry.trade_term.is_none());
    }

    #[test]
    fn test_positive_targets() {
        let mut entry = LedgerEntry::new("L-002");
        entry.amount = Some(0.0);
        entry.quantity = Some(12.5);
        assert_eq!(entry.positive_amount(), None);
        assert_eq!(entry.positive_quantity(), Some(12.5));
    }
}
