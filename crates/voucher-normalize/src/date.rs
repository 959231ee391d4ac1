//! Date normalization to ISO `YYYY-MM-DD`
//!
//! Numeric dates with an ambiguous day/month order (`03/04/2025`) are read
//! day-first unless one component is greater than 12. Two-digit years are
//! taken as 20xx. Text that does not parse is kept as-is with `parsed: false`
//! so it still shows up in reports.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;
use voucher_domain::CanonicalValue;

static ORDINAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{1,2})(st|nd|rd|th)\b").expect("valid ordinal pattern"));

static ISO_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})-(\d{2})-(\d{2})(?:[T ]\d{2}:\d{2}.*)?$").expect("valid iso pattern")
});

static YEAR_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})\s*[-/.]\s*(\d{1,2})\s*[-/.]\s*(\d{1,2})\.?$").expect("valid y-m-d pattern")
});

static COMPACT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})(\d{2})(\d{2})$").expect("valid compact pattern"));

static YEAR_LAST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})\s*[-/.]\s*(\d{1,2})\s*[-/.]\s*(\d{2}|\d{4})$").expect("valid d-m-y pattern")
});

static CJK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})\s*[年년]\s*(\d{1,2})\s*[月월]\s*(\d{1,2})\s*[日일]?$").expect("valid cjk pattern")
});

static DAY_MONTH_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})[\s\-/.]*([A-Za-z]{3,9})\.?[\s\-/.]*(\d{2}|\d{4})$").expect("valid d-b-y pattern")
});

static MONTH_DAY_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z]{3,9})\.?[\s\-/.]*(\d{1,2})[\s\-/.]+(\d{4})$").expect("valid b-d-y pattern")
});

const MONTHS: [&str; 12] = [
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december",
];

/// Normalize a date to `YYYY-MM-DD`
pub fn normalize_date(raw: &str) -> CanonicalValue {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return CanonicalValue::Null;
    }

    match parse_date(trimmed) {
        Some(date) => CanonicalValue::Date {
            value: date.format("%Y-%m-%d").to_string(),
            parsed: true,
        },
        None => {
            tracing::debug!(raw = trimmed, "Unrecognized date format");
            CanonicalValue::Date {
                value: trimmed.to_string(),
                parsed: false,
            }
        }
    }
}

/// Parse a date in any of the supported layouts
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let without_ordinals = ORDINAL.replace_all(raw.trim(), "$1");
    let cleaned = without_ordinals
        .replace(',', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if let Some(c) = ISO_PREFIX
        .captures(&cleaned)
        .or_else(|| YEAR_FIRST.captures(&cleaned))
        .or_else(|| COMPACT.captures(&cleaned))
        .or_else(|| CJK.captures(&cleaned))
    {
        return ymd(num(&c[1])?, num(&c[2])?, num(&c[3])?);
    }

    if let Some(c) = YEAR_LAST.captures(&cleaned) {
        let (first, second) = (num(&c[1])?, num(&c[2])?);
        let year = expand_year(&c[3])?;
        // Day-first unless that is impossible
        return if second > 12 && first <= 12 {
            ymd(year, first, second)
        } else {
            ymd(year, second, first)
        };
    }

    if let Some(c) = DAY_MONTH_YEAR.captures(&cleaned) {
        return ymd(expand_year(&c[3])?, month_number(&c[2])?, num(&c[1])?);
    }

    if let Some(c) = MONTH_DAY_YEAR.captures(&cleaned) {
        return ymd(expand_year(&c[3])?, month_number(&c[1])?, num(&c[2])?);
    }

    None
}

fn ymd(year: u32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)
}

fn num(s: &str) -> Option<u32> {
    s.parse().ok()
}

fn expand_year(s: &str) -> Option<u32> {
    let year = num(s)?;
    Some(if s.len() == 2 { 2000 + year } else { year })
}

/// Month number from an English month name or abbreviation
fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    let lower = if lower == "sept" { "sep".to_string() } else { lower };
    if lower.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|month| month.starts_with(&lower))
        .and_then(|i| u32::try_from(i + 1).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn iso(raw: &str) -> Option<String> {
        normalize_date(raw).as_iso_date().map(str::to_string)
    }

    #[test]
    fn test_iso_and_year_first() {
        assert_eq!(iso("2025-06-30"), Some("2025-06-30".into()));
        assert_eq!(iso("2025/6/3"), Some("2025-06-03".into()));
        assert_eq!(iso("2025.06.30"), Some("2025-06-30".into()));
        assert_eq!(iso("20250630"), Some("2025-06-30".into()));
        assert_eq!(iso("2025-06-30T14:05:00Z"), Some("2025-06-30".into()));
    }

    #[test]
    fn test_day_first_default() {
        assert_eq!(iso("03/04/2025"), Some("2025-04-03".into()));
        assert_eq!(iso("30.06.2025"), Some("2025-06-30".into()));
        assert_eq!(iso("30-06-25"), Some("2025-06-30".into()));
    }

    #[test]
    fn test_month_first_when_unambiguous() {
        assert_eq!(iso("06/30/2025"), Some("2025-06-30".into()));
    }

    #[test]
    fn test_month_names() {
        assert_eq!(iso("30 June 2025"), Some("2025-06-30".into()));
        assert_eq!(iso("30-JUN-2025"), Some("2025-06-30".into()));
        assert_eq!(iso("30-Jun-25"), Some("2025-06-30".into()));
        assert_eq!(iso("June 30, 2025"), Some("2025-06-30".into()));
        assert_eq!(iso("Sept. 1st, 2025"), Some("2025-09-01".into()));
        assert_eq!(iso("21st Mar 2024"), Some("2024-03-21".into()));
    }

    #[test]
    fn test_cjk_dates() {
        assert_eq!(iso("2025年6月30日"), Some("2025-06-30".into()));
        assert_eq!(iso("2025년 6월 30일"), Some("2025-06-30".into()));
    }

    #[test]
    fn test_unparsed_date_is_kept() {
        assert_eq!(
            normalize_date("  end of June "),
            CanonicalValue::Date { value: "end of June".into(), parsed: false }
        );
        assert_eq!(
            normalize_date("31/02/2025"),
            CanonicalValue::Date { value: "31/02/2025".into(), parsed: false }
        );
        assert!(normalize_date("  ").is_null());
    }

    proptest! {
        #[test]
        fn prop_renormalizing_is_noop(
            days in 0i64..20_000,
            layout in 0usize..4,
        ) {
            let date = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap() + chrono::Duration::days(days);
            let raw = match layout {
                0 => date.format("%Y-%m-%d").to_string(),
                1 => date.format("%d.%m.%Y").to_string(),
                2 => date.format("%d %B %Y").to_string(),
                _ => date.format("%b %d, %Y").to_string(),
            };
            let want = date.format("%Y-%m-%d").to_string();
            let first = normalize_date(&raw);
            prop_assert_eq!(first.as_iso_date(), Some(want.as_str()));
            let rendered = first.render().unwrap();
            prop_assert_eq!(normalize_date(&rendered), first);
        }
    }
}
