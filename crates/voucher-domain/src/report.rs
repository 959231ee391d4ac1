//! Verification reports

use crate::Status;
use serde::{Deserialize, Serialize};

/// Outcome of one verification rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldCheck {
    /// Rule name (amount, date, quantity, trade_term, secondary_weight, ...)
    pub rule: String,

    /// Pass, Warn or Fail
    pub outcome: Status,

    /// Canonical ledger value, if any
    pub ledger_value: Option<String>,

    /// Canonical evidence value(s), if any
    pub evidence_value: Option<String>,

    /// Explanation
    #[serde(default)]
    pub note: Option<String>,
}

impl FieldCheck {
    /// Create a check
    pub fn new(rule: impl Into<String>, outcome: Status) -> Self {
        Self {
            rule: rule.into(),
            outcome,
            ledger_value: None,
            evidence_value: None,
            note: None,
        }
    }

    /// Set the compared values
    pub fn values(mut self, ledger: Option<String>, evidence: Option<String>) -> Self {
        self.ledger_value = ledger;
        self.evidence_value = evidence;
        self
    }

    /// Set the note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Whether the rule passed
    pub fn is_match(&self) -> bool {
        self.outcome == Status::Pass
    }
}

/// Per-ledger-entry verification report
///
/// Always rebuilt from its inputs; never patched in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// Ledger entry id
    pub ledger_id: String,

    /// Number of evidence results that were supplied
    pub evidence_count: usize,

    /// Rule outcomes, in rule order
    pub checks: Vec<FieldCheck>,

    /// Overall status derived from the checks
    pub overall_status: Status,
}

impl VerificationReport {
    /// Build a report, deriving the overall status from the checks
    pub fn from_checks(ledger_id: impl Into<String>, evidence_count: usize, checks: Vec<FieldCheck>) -> Self {
        let overall_status = Status::overall(evidence_count, checks.iter().map(|c| c.outcome));
        Self {
            ledger_id: ledger_id.into(),
            evidence_count,
            checks,
            overall_status,
        }
    }

    /// Look up the check for a rule
    pub fn check(&self, rule: &str) -> Option<&FieldCheck> {
        self.checks.iter().find(|c| c.rule == rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overall_status_from_checks() {
        let report = VerificationReport::from_checks(
            "L-1",
            2,
            vec![
                FieldCheck::new("amount", Status::Pass),
                FieldCheck::new("date", Status::Warn),
            ],
        );
        assert_eq!(report.overall_status, Status::Warn);
        assert!(report.check("amount").unwrap().is_match());
        assert!(report.check("quantity").is_none());
    }

    #[test]
    fn test_needs_evidence_without_documents() {
        let report = VerificationReport::from_checks("L-1", 0, vec![FieldCheck::new("date", Status::Warn)]);
        assert_eq!(report.overall_status, Status::NeedsEvidence);
    }
}
