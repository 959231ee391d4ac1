//! Status module - escalating severity of verification outcomes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Verification severity tier
///
/// Rule outcomes combine by fixed precedence:
/// - Fail: terminal, never downgraded by later warnings or passes
/// - Warn: non-blocking disagreement or insufficient data
/// - Pass: everything checked agrees
/// - NeedsEvidence: no evidence documents at all; decided before any rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// All checks agree
    Pass,

    /// Non-blocking issue
    Warn,

    /// Blocking mismatch
    Fail,

    /// No evidence to check against
    NeedsEvidence,
}

impl Status {
    /// Get the status name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pass => "PASS",
            Status::Warn => "WARN",
            Status::Fail => "FAIL",
            Status::NeedsEvidence => "NEEDS_EVIDENCE",
        }
    }

    /// Parse a status from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "PASS" => Some(Status::Pass),
            "WARN" => Some(Status::Warn),
            "FAIL" => Some(Status::Fail),
            "NEEDS_EVIDENCE" => Some(Status::NeedsEvidence),
            _ => None,
        }
    }

    /// Rank used by [`Status::escalate`]; higher wins
    fn severity(&self) -> u8 {
        match self {
            Status::NeedsEvidence => 0,
            Status::Pass => 1,
            Status::Warn => 2,
            Status::Fail => 3,
        }
    }

    /// Combine a running status with one more rule outcome
    pub fn escalate(self, outcome: Status) -> Status {
        if outcome.severity() > self.severity() {
            outcome
        } else {
            self
        }
    }

    /// Derive the overall status from rule outcomes
    ///
    /// Zero evidence documents short-circuits to `NeedsEvidence` regardless of
    /// the outcomes. Otherwise start at `Pass` and escalate.
    pub fn overall<I>(evidence_count: usize, outcomes: I) -> Status
    where
        I: IntoIterator<Item = Status>,
    {
        if evidence_count == 0 {
            return Status::NeedsEvidence;
        }
        outcomes
            .into_iter()
            .filter(|s| *s != Status::NeedsEvidence)
            .fold(Status::Pass, Status::escalate)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid status: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fail_is_terminal() {
        assert_eq!(Status::Fail.escalate(Status::Warn), Status::Fail);
        assert_eq!(Status::Fail.escalate(Status::Pass), Status::Fail);
        assert_eq!(Status::Warn.escalate(Status::Pass), Status::Warn);
        assert_eq!(Status::Pass.escalate(Status::Warn), Status::Warn);
    }

    #[test]
    fn test_no_evidence_short_circuits() {
        assert_eq!(Status::overall(0, [Status::Fail]), Status::NeedsEvidence);
        assert_eq!(Status::overall(1, []), Status::Pass);
    }

    #[test]
    fn test_parse_round_trip() {
        for s in [Status::Pass, Status::Warn, Status::Fail, Status::NeedsEvidence] {
            assert_eq!(Status::parse(s.as_str()), Some(s));
        }
        assert!("maybe".parse::<Status>().is_err());
    }

    fn rule_outcome() -> impl Strategy<Value = Status> {
        prop_oneof![Just(Status::Pass), Just(Status::Warn), Just(Status::Fail)]
    }

    proptest! {
        #[test]
        fn prop_precedence_holds(outcomes in proptest::collection::vec(rule_outcome(), 0..8), evidence in 0usize..3) {
            let overall = Status::overall(evidence, outcomes.clone());
            if evidence == 0 {
                prop_assert_eq!(overall, Status::NeedsEvidence);
            } else if outcomes.contains(&Status::Fail) {
                prop_assert_eq!(overall, Status::Fail);
            } else if outcomes.contains(&Status::Warn) {
                prop_assert_eq!(overall, Status::Warn);
            } else {
                prop_assert_eq!(overall, Status::Pass);
            }
        }
    }
}
