//! N:1 combination hints

use serde::{Deserialize, Serialize};

/// Result of searching a document for line items that sum to a ledger total
///
/// `matched` is `None` when no combination was found. That is a valid outcome,
/// not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinationHint {
    /// Expected total
    pub target: f64,

    /// Accepted absolute deviation from the target
    pub tolerance: f64,

    /// Matched values in search order, or `None`
    pub matched: Option<Vec<f64>>,
}

impl CombinationHint {
    /// A "no hint" outcome
    pub fn none(target: f64, tolerance: f64) -> Self {
        Self { target, tolerance, matched: None }
    }

    /// A found combination. Returns `None` if the values do not actually sum
    /// to the target within tolerance.
    pub fn found(target: f64, tolerance: f64, values: Vec<f64>) -> Option<Self> {
        let sum: f64 = values.iter().sum();
        if values.is_empty() || (sum - target).abs() > tolerance {
            return None;
        }
        Some(Self { target, tolerance, matched: Some(values) })
    }

    /// Whether a combination was found
    pub fn is_match(&self) -> bool {
        self.matched.is_some()
    }

    /// Number of items in the combination (0 for no match)
    pub fn len(&self) -> usize {
        self.matched.as_ref().map(Vec::len).unwrap_or(0)
    }

    /// Whether the hint carries no items
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of the matched items
    pub fn sum(&self) -> Option<f64> {
        self.matched.as_ref().map(|v| v.iter().sum())
    }

    /// Human-readable form, e.g. "300.00 + 700.00 = 1000.00"
    pub fn describe(&self) -> Option<String> {
        let values = self.matched.as_ref()?;
        let terms: Vec<String> = values.iter().map(|v| format!("{:.2}", v)).collect();
        Some(format!("{} = {:.2}", terms.join(" + "), self.sum().unwrap_or_default()))
    }
}
