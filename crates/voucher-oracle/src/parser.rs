//! Decoding oracle output and provider error text

use crate::OracleError;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use std::time::Duration;
use voucher_domain::OracleResponse;

static RETRY_IN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:retry|try again)[^0-9]{0,20}?(\d+(?:\.\d+)?)\s*(ms|milliseconds?|minutes?|mins?|m|seconds?|secs?|s)?\b",
    )
    .expect("valid retry pattern")
});

static RETRY_DELAY_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)"retry_?delay"\s*:\s*"?(\d+(?:\.\d+)?)s?"?"#).expect("valid retry delay pattern")
});

/// Longest wait we accept from a provider message
const MAX_SUGGESTED_WAIT_SECS: f64 = 3600.0;

/// Strip markdown code fences around a JSON payload
pub fn extract_json(output: &str) -> &str {
    let trimmed = output.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end().trim_end_matches("```").trim()
}

/// Decode a response body.
///
/// The service may answer with the response object itself, or wrap the
/// model's raw text in `{"output": "..."}`; the text can carry code fences.
pub fn parse_response(body: &str) -> Result<OracleResponse, OracleError> {
    let value: Value = serde_json::from_str(extract_json(body))?;
    match value.get("output").and_then(Value::as_str) {
        Some(output) => Ok(serde_json::from_str(extract_json(output))?),
        None => Ok(serde_json::from_value(value)?),
    }
}

/// Wait suggested in a provider error message, e.g. `Please retry in 12.5s`
/// or `"retryDelay": "30s"`
pub fn parse_retry_delay(message: &str) -> Option<Duration> {
    let (amount, unit) = if let Some(c) = RETRY_DELAY_FIELD.captures(message) {
        (c.get(1)?.as_str(), None)
    } else {
        let c = RETRY_IN.captures(message)?;
        (c.get(1)?.as_str(), c.get(2).map(|m| m.as_str().to_lowercase()))
    };

    let amount: f64 = amount.parse().ok()?;
    let secs = match unit.as_deref() {
        Some("ms" | "millisecond" | "milliseconds") => amount / 1000.0,
        Some("m" | "min" | "mins" | "minute" | "minutes") => amount * 60.0,
        _ => amount,
    };
    Duration::try_from_secs_f64(secs.min(MAX_SUGGESTED_WAIT_SECS)).ok()
}

/// Whether a provider message reports an exhausted account quota
pub fn is_quota_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    [
        "insufficient_quota",
        "quota exceeded",
        "quota exhausted",
        "exceeded your current quota",
        "billing",
        "credit balance",
        "payment required",
    ]
    .iter()
    .any(|needle| lower.contains(needle))
}
