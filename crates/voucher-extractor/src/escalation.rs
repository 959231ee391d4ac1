//! Two-tier escalation: text first, vision when text is not good enough

use voucher_domain::{ExtractionTier, FailureKind, FieldKind, OracleResponse, OracleStatus};

/// Which tier's answer a document ends up with
#[derive(Debug, Clone, PartialEq)]
pub enum TierOutcome {
    /// Text-mode answer accepted
    Text(OracleResponse),

    /// Vision-mode answer replaced the text one
    Vision(OracleResponse),

    /// No usable answer from either tier
    Failed(FailureKind),
}

impl TierOutcome {
    /// Tier recorded on the extraction result
    pub fn tier(&self) -> ExtractionTier {
        match self {
            TierOutcome::Text(_) => ExtractionTier::Text,
            TierOutcome::Vision(_) => ExtractionTier::Vision,
            TierOutcome::Failed(_) => ExtractionTier::Failed,
        }
    }
}

/// Whether a text-mode answer should be retried in vision mode
pub fn needs_escalation(response: &OracleResponse, threshold: f64) -> bool {
    response.status == OracleStatus::Unidentified || response.overall_confidence < threshold
}

/// Pick between the text answer and an optional vision answer
///
/// Vision wins only when it carries a value for at least one critical field
/// and its confidence is not below the text confidence. A failed text call
/// counts as zero confidence.
pub fn decide(
    text: Result<OracleResponse, FailureKind>,
    vision: Option<Result<OracleResponse, FailureKind>>,
    critical: &[FieldKind],
) -> TierOutcome {
    let text_confidence = text.as_ref().map(|r| r.overall_confidence).unwrap_or(0.0);

    if let Some(Ok(vision)) = vision {
        let has_value = critical.iter().any(|kind| vision.value(*kind).is_some());
        if has_value && vision.overall_confidence >= text_confidence {
            return TierOutcome::Vision(vision);
        }
    }

    match text {
        Ok(response) => TierOutcome::Text(response),
        Err(kind) => TierOutcome::Failed(kind),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voucher_domain::traits::OracleField;

    fn response(confidence: f64, amount: Option<&str>) -> OracleResponse {
        let mut r = OracleResponse { overall_confidence: confidence, ..Default::default() };
        r.fields.insert(
            "amount".into(),
            OracleField { value: amount.map(str::to_string), confidence, bounding: None },
        );
        r
    }

    const CRITICAL: &[FieldKind] = &[FieldKind::Amount];

    #[test]
    fn test_escalation_trigger() {
        assert!(needs_escalation(&response(0.79, Some("1")), 0.8));
        assert!(!needs_escalation(&response(0.8, Some("1")), 0.8));

        let mut unidentified = response(0.95, Some("1"));
        unidentified.status = OracleStatus::Unidentified;
        assert!(needs_escalation(&unidentified, 0.8));
    }

    #[test]
    fn test_vision_adopted_when_confident_with_value() {
        let outcome = decide(Ok(response(0.5, None)), Some(Ok(response(0.9, Some("1000 USD")))), CRITICAL);
        assert_eq!(outcome.tier(), ExtractionTier::Vision);
    }

    #[test]
    fn test_vision_rejected_when_less_confident() {
        let outcome = decide(
            Ok(response(0.7, Some("900 USD"))),
            Some(Ok(response(0.6, Some("1000 USD")))),
            CRITICAL,
        );
        assert_eq!(outcome, TierOutcome::Text(response(0.7, Some("900 USD"))));
    }

    #[test]
    fn test_vision_rejected_without_value() {
        let outcome = decide(Ok(response(0.5, None)), Some(Ok(response(0.99, None))), CRITICAL);
        assert_eq!(outcome.tier(), ExtractionTier::Text);
    }

    #[test]
    fn test_equal_confidence_prefers_vision() {
        let outcome = decide(Ok(response(0.6, None)), Some(Ok(response(0.6, Some("5 USD")))), CRITICAL);
        assert_eq!(outcome.tier(), ExtractionTier::Vision);
    }

    #[test]
    fn test_failed_text_rescued_by_vision() {
        let outcome = decide(Err(FailureKind::Network), Some(Ok(response(0.1, Some("5 USD")))), CRITICAL);
        assert_eq!(outcome.tier(), ExtractionTier::Vision);
    }

    #[test]
    fn test_both_tiers_failed() {
        let outcome = decide(Err(FailureKind::Parse), Some(Err(FailureKind::Network)), CRITICAL);
        assert_eq!(outcome, TierOutcome::Failed(FailureKind::Parse));
    }
}
