//! Locale-tolerant number parsing
//!
//! Accepts `1,234.56`, `1.234,56`, `1234`, `12,5` and `-3.5`. When both
//! separators appear, the last one is the decimal mark. A lone separator is a
//! thousands separator only if it splits the digits into groups of three.

/// Parse a numeric token. Returns `None` for anything that is not a number.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '\u{a0}' | '\u{202f}' | '\'' | '_'))
        .collect();

    let (negative, body) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.strip_prefix('+').unwrap_or(&cleaned)),
    };
    let body = body.trim_end_matches(['.', ',']);

    if body.is_empty()
        || !body.starts_with(|c: char| c.is_ascii_digit())
        || !body.chars().all(|c| c.is_ascii_digit() || c == ',' || c == '.')
    {
        return None;
    }

    let normalized = match (body.rfind(','), body.rfind('.')) {
        (Some(comma), Some(dot)) => {
            if comma > dot {
                body.replace('.', "").replace(',', ".")
            } else {
                body.replace(',', "")
            }
        }
        (Some(_), None) => {
            if is_grouped(body, ',') {
                body.replace(',', "")
            } else if body.matches(',').count() == 1 {
                body.replace(',', ".")
            } else {
                return None;
            }
        }
        (None, Some(_)) => {
            if body.matches('.').count() == 1 {
                body.to_string()
            } else if is_grouped(body, '.') {
                body.replace('.', "")
            } else {
                return None;
            }
        }
        (None, None) => body.to_string(),
    };

    let value: f64 = normalized.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(if negative { -value } else { value })
}

/// Whether `sep` splits `body` into a 1-3 digit head followed by 3-digit groups
fn is_grouped(body: &str, sep: char) -> bool {
    let mut groups = body.split(sep);
    let head_ok = groups
        .next()
        .map(|head| (1..=3).contains(&head.len()))
        .unwrap_or(false);
    head_ok && groups.all(|g| g.len() == 3 && g.chars().all(|c| c.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_and_grouped() {
        assert_eq!(parse_number("1234"), Some(1234.0));
        assert_eq!(parse_number("1,234"), Some(1234.0));
        assert_eq!(parse_number("1,234,567.89"), Some(1234567.89));
        assert_eq!(parse_number("0.5"), Some(0.5));
    }

    #[test]
    fn test_european_convention() {
        assert_eq!(parse_number("1.234,56"), Some(1234.56));
        assert_eq!(parse_number("12,5"), Some(12.5));
        assert_eq!(parse_number("1.234.567"), Some(1234567.0));
        assert_eq!(parse_number("1 234,56"), Some(1234.56));
    }

    #[test]
    fn test_signs_and_trailing_separator() {
        assert_eq!(parse_number("-3.5"), Some(-3.5));
        assert_eq!(parse_number("+42"), Some(42.0));
        assert_eq!(parse_number("1,000."), Some(1000.0));
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number(".5"), None);
        assert_eq!(parse_number("1,23,4"), None);
        assert_eq!(parse_number("12a"), None);
    }
}
