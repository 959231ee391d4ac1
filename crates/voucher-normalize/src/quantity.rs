//! Quantity and weight normalization: number + unit code

use crate::number::parse_number;
use regex::Regex;
use std::sync::LazyLock;
use voucher_domain::CanonicalValue;

static QUANTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([-+]?\d(?:[\d,.'\u{a0}]|\s\d{3})*)\s*([A-Z][A-Z0-9 .()/]*)?").expect("valid quantity pattern")
});

/// Unit phrase → canonical unit code
const UNITS: &[(&str, &str)] = &[
    ("MT", "MT"),
    ("MTS", "MT"),
    ("M/T", "MT"),
    ("TON", "MT"),
    ("TONS", "MT"),
    ("TONNE", "MT"),
    ("TONNES", "MT"),
    ("METRIC TON", "MT"),
    ("METRIC TONS", "MT"),
    ("METRIC TONNES", "MT"),
    ("KG", "KG"),
    ("KGS", "KG"),
    ("KILO", "KG"),
    ("KILOS", "KG"),
    ("KILOGRAM", "KG"),
    ("KILOGRAMS", "KG"),
    ("LB", "LB"),
    ("LBS", "LB"),
    ("POUND", "LB"),
    ("POUNDS", "LB"),
    ("G", "G"),
    ("GR", "G"),
    ("GRAM", "G"),
    ("GRAMS", "G"),
    ("PC", "PCS"),
    ("PCS", "PCS"),
    ("PIECE", "PCS"),
    ("PIECES", "PCS"),
    ("EA", "PCS"),
    ("EACH", "PCS"),
    ("UNIT", "PCS"),
    ("UNITS", "PCS"),
    ("SET", "SET"),
    ("SETS", "SET"),
    ("CTN", "CTN"),
    ("CTNS", "CTN"),
    ("CARTON", "CTN"),
    ("CARTONS", "CTN"),
    ("BAG", "BAG"),
    ("BAGS", "BAG"),
    ("PKG", "PKG"),
    ("PKGS", "PKG"),
    ("PACKAGE", "PKG"),
    ("PACKAGES", "PKG"),
    ("CBM", "CBM"),
    ("M3", "CBM"),
    ("CUBIC METER", "CBM"),
    ("CUBIC METERS", "CBM"),
    ("L", "L"),
    ("LTR", "L"),
    ("LITER", "L"),
    ("LITERS", "L"),
    ("LITRE", "L"),
    ("LITRES", "L"),
];

/// Normalize a quantity such as `25,000 KGS` or `10 METRIC TONS` into
/// `{value, unit}`. Unknown units are kept uppercased.
pub fn normalize_quantity(raw: &str) -> CanonicalValue {
    let Some(caps) = QUANTITY.captures(raw) else {
        tracing::debug!(raw, "No number in quantity");
        return CanonicalValue::Null;
    };
    let Some(value) = caps.get(1).and_then(|m| parse_number(m.as_str())) else {
        tracing::debug!(raw, "Unparseable quantity");
        return CanonicalValue::Null;
    };

    let unit = caps
        .get(2)
        .map(|m| m.as_str().trim().to_uppercase())
        .filter(|phrase| !phrase.is_empty())
        .map(|phrase| unit_code(&phrase));

    CanonicalValue::Quantity { value, unit }
}

/// Canonical code for a unit phrase: whole phrase first, then its first word.
/// Dotted abbreviations (`M.T.`) match their undotted synonyms.
fn unit_code(phrase: &str) -> String {
    let collapsed = phrase.split_whitespace().collect::<Vec<_>>().join(" ");
    let compact = collapsed.trim_end_matches(['.', ')']);
    if let Some(code) = lookup(compact) {
        return code.to_string();
    }

    let first = compact
        .split(|c: char| c.is_whitespace() || c == '(')
        .next()
        .unwrap_or(compact)
        .trim_end_matches('.');
    lookup(first).unwrap_or(first).to_string()
}

fn lookup(phrase: &str) -> Option<&'static str> {
    let undotted = phrase.replace('.', "");
    UNITS
        .iter()
        .find(|(synonym, _)| *synonym == phrase || *synonym == undotted)
        .map(|(_, code)| *code)
}

/// Convert a mass to kilograms. Returns `None` for non-mass units.
pub fn mass_in_kg(value: f64, unit: &str) -> Option<f64> {
    let factor = match unit {
        "MT" => 1000.0,
        "KG" => 1.0,
        "LB" => 0.453_592_37,
        "G" => 0.001,
        _ => return None,
    };
    Some(value * factor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn quantity(raw: &str) -> Option<(f64, Option<String>)> {
        normalize_quantity(raw)
            .as_quantity()
            .map(|(v, u)| (v, u.map(str::to_string)))
    }

    #[test]
    fn test_unit_synonyms() {
        assert_eq!(quantity("25MT"), Some((25.0, Some("MT".into()))));
        assert_eq!(quantity("10 METRIC TONS"), Some((10.0, Some("MT".into()))));
        assert_eq!(quantity("25,400 KGS"), Some((25400.0, Some("KG".into()))));
        assert_eq!(quantity("1,200 pcs"), Some((1200.0, Some("PCS".into()))));
        assert_eq!(quantity("40 CTNS."), Some((40.0, Some("CTN".into()))));
        assert_eq!(quantity("68 M3"), Some((68.0, Some("CBM".into()))));
    }

    #[test]
    fn test_dotted_abbreviations() {
        assert_eq!(quantity("25 M.T."), Some((25.0, Some("MT".into()))));
        assert_eq!(quantity("25 M.T"), Some((25.0, Some("MT".into()))));
        assert_eq!(quantity("12 M.T.S."), Some((12.0, Some("MT".into()))));
        assert_eq!(quantity("300 K.G.S."), Some((300.0, Some("KG".into()))));
    }

    #[test]
    fn test_space_grouped_thousands() {
        assert_eq!(quantity("25 400 KGS"), Some((25400.0, Some("KG".into()))));
        assert_eq!(quantity("1 250,5 KG"), Some((1250.5, Some("KG".into()))));
    }

    #[test]
    fn test_trailing_words_fall_back_to_first_word() {
        assert_eq!(quantity("500 BAGS OF RICE"), Some((500.0, Some("BAG".into()))));
        assert_eq!(quantity("20 MT (NET)"), Some((20.0, Some("MT".into()))));
    }

    #[test]
    fn test_unknown_unit_is_kept() {
        assert_eq!(quantity("3 DRUMS"), Some((3.0, Some("DRUMS".into()))));
    }

    #[test]
    fn test_missing_unit() {
        assert_eq!(quantity("1,000"), Some((1000.0, None)));
        assert!(normalize_quantity("TBD").is_null());
    }

    #[test]
    fn test_mass_in_kg() {
        assert_eq!(mass_in_kg(25.0, "MT"), Some(25000.0));
        assert!((mass_in_kg(500.0, "G").unwrap() - 0.5).abs() < 1e-12);
        assert!((mass_in_kg(1.0, "LB").unwrap() - 0.45359237).abs() < 1e-12);
        assert_eq!(mass_in_kg(3.0, "PCS"), None);
    }

    proptest! {
        #[test]
        fn prop_renormalizing_is_noop(
            n in 0u32..10_000_000,
            unit in prop_oneof![Just("MT"), Just("KGS"), Just("pieces"), Just("cartons"), Just("")],
        ) {
            let raw = format!("{} {}", n, unit);
            let first = normalize_quantity(&raw);
            let rendered = first.render().unwrap();
            prop_assert_eq!(normalize_quantity(&rendered), first);
        }
    }
}
