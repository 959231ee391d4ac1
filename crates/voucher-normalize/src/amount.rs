//! Amount normalization: number + ISO-like currency code

use crate::number::parse_number;
use regex::Regex;
use std::sync::LazyLock;
use voucher_domain::CanonicalValue;

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-+]?\d(?:[\d,.'\u{a0}]|\s\d{3})*").expect("valid number pattern"));

static ALPHA_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z]+").expect("valid token pattern"));

/// Currency symbols, longest first so `US$` wins over `$`
const SYMBOLS: &[(&str, &str)] = &[
    ("US$", "USD"),
    ("HK$", "HKD"),
    ("NT$", "TWD"),
    ("S$", "SGD"),
    ("A$", "AUD"),
    ("C$", "CAD"),
    ("$", "USD"),
    ("¥", "JPY"),
    ("￥", "JPY"),
    ("₩", "KRW"),
    ("€", "EUR"),
    ("£", "GBP"),
    ("₹", "INR"),
    ("元", "CNY"),
];

/// Currency words and aliases that are not ISO codes themselves
const ALIASES: &[(&str, &str)] = &[
    ("RMB", "CNY"),
    ("YEN", "JPY"),
    ("WON", "KRW"),
    ("EURO", "EUR"),
    ("EUROS", "EUR"),
    ("DOLLAR", "USD"),
    ("DOLLARS", "USD"),
];

/// ISO 4217 codes accepted as-is
const ISO_CODES: &[&str] = &[
    "USD", "EUR", "JPY", "KRW", "GBP", "CNY", "HKD", "SGD", "AUD", "CAD", "CHF", "INR", "VND",
    "THB", "MYR", "IDR", "PHP", "TWD", "NZD", "SEK", "NOK", "DKK", "AED", "SAR", "RUB", "BRL",
    "MXN", "ZAR", "TRY", "PLN", "CZK",
];

/// Normalize an amount such as `1,234.56USD`, `US$ 1,000`, `€1.234,56` or
/// `¥120,000` into `{value, currency}`.
pub fn normalize_amount(raw: &str) -> CanonicalValue {
    let Some(m) = NUMBER.find(raw) else {
        tracing::debug!(raw, "No number in amount");
        return CanonicalValue::Null;
    };
    let Some(value) = parse_number(m.as_str()) else {
        tracing::debug!(raw, "Unparseable amount");
        return CanonicalValue::Null;
    };

    let rest = format!("{} {}", &raw[..m.start()], &raw[m.end()..]);
    CanonicalValue::Amount {
        value,
        currency: currency_code(&rest),
    }
}

/// Resolve a currency code from the text surrounding an amount
pub fn currency_code(text: &str) -> Option<String> {
    let upper = text.to_uppercase();
    let compact: String = upper.chars().filter(|c| !c.is_whitespace()).collect();

    // Codes take precedence so that "USD$" or "USD 100 $" resolve to the code.
    for token in ALPHA_TOKEN.find_iter(&upper) {
        let token = token.as_str();
        if ISO_CODES.contains(&token) {
            return Some(token.to_string());
        }
        if let Some((_, code)) = ALIASES.iter().find(|(alias, _)| *alias == token) {
            return Some(code.to_string());
        }
    }

    SYMBOLS
        .iter()
        .find(|(symbol, _)| compact.contains(symbol))
        .map(|(_, code)| code.to_string())
}
