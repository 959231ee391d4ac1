//! Low-signal line trimming for acquired document text

/// Lines containing any of these (case-insensitive) are always kept
pub const KEYWORDS: &[&str] = &[
    "total",
    "amount",
    "sum",
    "invoice",
    "date",
    "quantity",
    "qty",
    "weight",
    "gross",
    "net",
    "unit",
    "price",
    "currency",
    "incoterm",
    "term",
    "fob",
    "cif",
    "cfr",
    "freight",
    "prepaid",
    "collect",
    "bill of lading",
    "b/l",
    "shipper",
    "consignee",
    "port",
    "vessel",
];

/// Lines shorter than this (in characters) are always kept
pub const SHORT_LINE_CHARS: usize = 50;

/// Filtered text shorter than this falls back to the original
pub const MIN_FILTERED_CHARS: usize = 100;

/// Filtered text below this share of the original falls back to the original
pub const MIN_FILTERED_RATIO: f64 = 0.2;

/// Drop long lines that carry no digits and no keyword
///
/// Falls back to the original text when filtering would leave too little of
/// it to extract from.
pub fn preprocess(text: &str) -> String {
    let kept: Vec<&str> = text.lines().filter(|line| keep_line(line)).collect();
    let filtered = kept.join("\n");

    let original_chars = text.chars().count();
    let filtered_chars = filtered.chars().count();
    if filtered_chars < MIN_FILTERED_CHARS || (filtered_chars as f64) < original_chars as f64 * MIN_FILTERED_RATIO {
        tracing::debug!(original_chars, filtered_chars, "Preprocessing kept too little, using original text");
        return text.to_string();
    }

    filtered
}

fn keep_line(line: &str) -> bool {
    if line.chars().count() < SHORT_LINE_CHARS || line.chars().any(|c| c.is_ascii_digit()) {
        return true;
    }
    let lower = line.to_lowercase();
    KEYWORDS.iter().any(|k| lower.contains(k))
}
