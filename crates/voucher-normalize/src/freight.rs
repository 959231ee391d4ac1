//! Freight payment clause normalization

use voucher_domain::CanonicalValue;

const PREPAID: &[&str] = &["PREPAID", "PRE-PAID", "PRE PAID", "FREIGHT PAID", "PP"];
const COLLECT: &[&str] = &["COLLECT", "COLLECTED", "TO COLLECT", "PAYABLE AT DESTINATION", "CC"];

/// Normalize a freight clause (`FREIGHT PREPAID`, `Freight Collect`) to
/// `PREPAID` or `COLLECT`
pub fn normalize_freight_payment(raw: &str) -> CanonicalValue {
    let upper = raw.to_uppercase();
    let words: Vec<&str> = upper
        .split(|c: char| !c.is_ascii_alphanumeric() && c != '-')
        .filter(|w| !w.is_empty())
        .collect();
    let joined = words.join(" ");

    let has = |needles: &[&str]| {
        needles.iter().any(|needle| {
            if needle.len() <= 2 {
                words.contains(needle)
            } else {
                joined.contains(needle)
            }
        })
    };

    let value = match (has(PREPAID), has(COLLECT)) {
        (true, false) => "PREPAID",
        (false, true) => "COLLECT",
        (true, true) => {
            tracing::debug!(raw, "Freight clause mentions both prepaid and collect");
            return CanonicalValue::Null;
        }
        (false, false) => return CanonicalValue::Null,
    };
    CanonicalValue::Code { value: value.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(raw: &str) -> Option<String> {
        normalize_freight_payment(raw).as_code().map(str::to_string)
    }

    #[test]
    fn test_prepaid_variants() {
        assert_eq!(code("FREIGHT PREPAID"), Some("PREPAID".into()));
        assert_eq!(code("Freight pre-paid as arranged"), Some("PREPAID".into()));
        assert_eq!(code("PP"), Some("PREPAID".into()));
    }

    #[test]
    fn test_collect_variants() {
        assert_eq!(code("Freight Collect"), Some("COLLECT".into()));
        assert_eq!(code("freight payable at destination"), Some("COLLECT".into()));
        assert_eq!(code("CC"), Some("COLLECT".into()));
    }

    #[test]
    fn test_unknown_or_conflicting() {
        assert!(normalize_freight_payment("as per charter party").is_null());
        assert!(normalize_freight_payment("prepaid or collect").is_null());
        assert!(normalize_freight_payment("").is_null());
    }

    #[test]
    fn test_canonical_is_stable() {
        for raw in ["PREPAID", "COLLECT"] {
            assert_eq!(code(raw), Some(raw.into()));
        }
    }
}
