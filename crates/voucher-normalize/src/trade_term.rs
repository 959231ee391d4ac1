//! Trade term (incoterm) normalization
//!
//! Reduces `C.I.F Hamburg`, `Cost, Insurance & Freight` or
//! `INCOTERMS 2020 FOB BUSAN` to the 3-letter code.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use voucher_domain::CanonicalValue;

static NON_ALPHA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Z0-9 ]+").expect("valid punctuation pattern"));

static INCOTERMS_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^INCOTERMS?\s*(\d{4})?\s*").expect("valid prefix pattern"));

/// Incoterms 2020 codes
pub const CODES: [&str; 11] = [
    "EXW", "FCA", "FAS", "FOB", "CFR", "CIF", "CPT", "CIP", "DAP", "DPU", "DDP",
];

/// Long forms, checked in order. `DELIVERED AT PLACE UNLOADED` must come
/// before `DELIVERED AT PLACE`.
const LONG_FORMS: &[(&str, &str)] = &[
    ("COST INSURANCE AND FREIGHT", "CIF"),
    ("COST AND FREIGHT", "CFR"),
    ("CARRIAGE AND INSURANCE PAID", "CIP"),
    ("CARRIAGE PAID TO", "CPT"),
    ("DELIVERED AT PLACE UNLOADED", "DPU"),
    ("DELIVERED AT PLACE", "DAP"),
    ("DELIVERED AT TERMINAL", "DPU"),
    ("DELIVERED DUTY PAID", "DDP"),
    ("FREE ON BOARD", "FOB"),
    ("FREE ALONGSIDE SHIP", "FAS"),
    ("FREE CARRIER", "FCA"),
    ("EX WORKS", "EXW"),
];

/// Legacy or informal codes
const ALIASES: &[(&str, &str)] = &[("CNF", "CFR"), ("CANDF", "CFR"), ("CFR", "CFR"), ("DAT", "DPU")];

/// Normalize a trade term to its 3-letter code
pub fn normalize_trade_term(raw: &str) -> CanonicalValue {
    match trade_term_code(raw) {
        Some(value) => CanonicalValue::Code { value },
        None => CanonicalValue::Null,
    }
}

/// Extract the incoterm code from free text
pub fn trade_term_code(raw: &str) -> Option<String> {
    let upper = raw.to_uppercase().replace('&', " AND ");
    let cleaned = NON_ALPHA.replace_all(&upper, "");
    let spaced = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    let spaced = INCOTERMS_PREFIX.replace(&spaced, "").into_owned();
    if spaced.is_empty() {
        return None;
    }

    if let Some((_, code)) = LONG_FORMS.iter().find(|(long, _)| spaced.starts_with(*long)) {
        return Some(code.to_string());
    }

    // "C AND F" and "C & F" survive as separate letters
    if spaced.starts_with("C AND F") {
        return Some("CFR".to_string());
    }

    let compact: String = spaced.chars().filter(|c| !c.is_whitespace()).collect();
    if let Some((_, code)) = ALIASES.iter().find(|(alias, _)| compact.starts_with(*alias)) {
        return Some(code.to_string());
    }
    if let Some(code) = CODES.iter().find(|code| compact.starts_with(**code)) {
        return Some(code.to_string());
    }

    let fallback: String = compact.chars().filter(char::is_ascii_alphabetic).take(3).collect();
    if fallback.len() == 3 {
        tracing::debug!(raw, code = %fallback, "Unknown trade term, keeping first letters");
        Some(fallback)
    } else {
        None
    }
}

/// Which party pays the main carriage under a trade term
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeTermGroup {
    /// C and D terms: seller pays carriage, freight is prepaid
    DestinationPaid,

    /// E and F terms: buyer pays carriage, freight is collect
    OriginPickup,
}

impl TradeTermGroup {
    /// Group of a 3-letter code, `None` for unknown codes
    pub fn of(code: &str) -> Option<Self> {
        match code {
            "CFR" | "CIF" | "CPT" | "CIP" | "DAP" | "DPU" | "DDP" => Some(TradeTermGroup::DestinationPaid),
            "EXW" | "FCA" | "FAS" | "FOB" => Some(TradeTermGroup::OriginPickup),
            _ => None,
        }
    }

    /// Freight payment clause consistent with this group
    pub fn expected_freight_payment(&self) -> &'static str {
        match self {
            TradeTermGroup::DestinationPaid => "PREPAID",
            TradeTermGroup::OriginPickup => "COLLECT",
        }
    }
}

impl fmt::Display for TradeTermGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeTermGroup::DestinationPaid => write!(f, "C/D group"),
            TradeTermGroup::OriginPickup => write!(f, "E/F group"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn code(raw: &str) -> Option<String> {
        normalize_trade_term(raw).as_code().map(str::to_string)
    }

    #[test]
    fn test_dotted_code_with_place() {
        assert_eq!(code("C.I.F Hamburg"), Some("CIF".into()));
        assert_eq!(code("FOB BUSAN"), Some("FOB".into()));
        assert_eq!(code("fob"), Some("FOB".into()));
    }

    #[test]
    fn test_long_forms() {
        assert_eq!(code("Cost, Insurance & Freight"), Some("CIF".into()));
        assert_eq!(code("Free On Board Shanghai"), Some("FOB".into()));
        assert_eq!(code("Delivered at Place Unloaded"), Some("DPU".into()));
        assert_eq!(code("Delivered at Place Rotterdam"), Some("DAP".into()));
        assert_eq!(code("Ex Works"), Some("EXW".into()));
    }

    #[test]
    fn test_aliases_and_prefix() {
        assert_eq!(code("C&F Jakarta"), Some("CFR".into()));
        assert_eq!(code("CNF"), Some("CFR".into()));
        assert_eq!(code("DAT"), Some("DPU".into()));
        assert_eq!(code("INCOTERMS 2020: CIP Lyon"), Some("CIP".into()));
    }

    #[test]
    fn test_unknown_and_empty() {
        assert_eq!(code("XYZ Port"), Some("XYZ".into()));
        assert!(normalize_trade_term("  ").is_null());
        assert!(normalize_trade_term("..").is_null());
    }

    #[test]
    fn test_groups() {
        assert_eq!(TradeTermGroup::of("CIF"), Some(TradeTermGroup::DestinationPaid));
        assert_eq!(TradeTermGroup::of("FOB"), Some(TradeTermGroup::OriginPickup));
        assert_eq!(TradeTermGroup::of("XYZ"), None);
        assert_eq!(TradeTermGroup::DestinationPaid.expected_freight_payment(), "PREPAID");
    }

    proptest! {
        #[test]
        fn prop_renormalizing_is_noop(
            term in prop::sample::select(CODES.to_vec()),
            place in "[A-Za-z]{0,10}",
            dotted in any::<bool>(),
        ) {
            let written = if dotted {
                term.chars().map(|c| format!("{}.", c)).collect::<String>()
            } else {
                term.to_lowercase()
            };
            let first = normalize_trade_term(&format!("{} {}", written, place));
            prop_assert_eq!(first.as_code(), Some(term));
            prop_assert_eq!(normalize_trade_term(&first.render().unwrap()), first);
        }
    }
}
