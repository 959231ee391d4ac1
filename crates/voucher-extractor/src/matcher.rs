//! Subset-sum search for N:1 ledger totals
//!
//! A ledger total is sometimes split across several line items on the
//! document. The matcher looks for a small set of numbers in the text that
//! sums to the expected total, so the oracle can be told which figures to add.
//!
//! The search is deterministic: candidates are sorted descending, and
//! combinations are tried smallest size first, each size in lexicographic
//! order over the sorted pool.

use regex::Regex;
use std::sync::LazyLock;
use voucher_domain::CombinationHint;
use voucher_normalize::parse_number;

static NUMERIC_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{1,3}(?:[,.']\d{3})+(?:[.,]\d+)?|\d+(?:[.,]\d+)?").expect("valid numeric token pattern")
});

/// Search bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchParams {
    /// Accepted absolute deviation from the target
    pub tolerance: f64,

    /// Largest combination size tried
    pub max_size: usize,

    /// Most candidates kept after filtering
    pub pool_cap: usize,
}

impl Default for MatchParams {
    fn default() -> Self {
        Self {
            tolerance: 0.05,
            max_size: 5,
            pool_cap: 50,
        }
    }
}

/// Positive numbers appearing in the text, in order of appearance
pub fn numeric_tokens(text: &str) -> Vec<f64> {
    NUMERIC_TOKEN
        .find_iter(text)
        .filter_map(|m| parse_number(m.as_str()))
        .filter(|v| *v > 0.0)
        .collect()
}

/// Candidate pool: values not above `target + tolerance`, sorted descending,
/// capped at `pool_cap`
pub fn candidate_pool(values: &[f64], target: f64, params: &MatchParams) -> Vec<f64> {
    let ceiling = target + params.tolerance;
    let mut pool: Vec<f64> = values.iter().copied().filter(|v| *v > 0.0 && *v <= ceiling).collect();
    pool.sort_by(|a, b| b.total_cmp(a));
    pool.truncate(params.pool_cap);
    pool
}

/// Find numbers in `text` that sum to `target`
///
/// A non-positive target, or no combination within bounds, yields a hint
/// with no match.
pub fn find_combination(text: &str, target: f64, params: &MatchParams) -> CombinationHint {
    if target <= 0.0 || !target.is_finite() {
        return CombinationHint::none(target, params.tolerance);
    }

    let pool = candidate_pool(&numeric_tokens(text), target, params);
    match search(&pool, target, params.tolerance, params.max_size) {
        Some(values) => CombinationHint::found(target, params.tolerance, values)
            .unwrap_or_else(|| CombinationHint::none(target, params.tolerance)),
        None => CombinationHint::none(target, params.tolerance),
    }
}

/// First combination of `pool` (size 1 up to `max_size`) summing to `target`
/// within `tolerance`. `pool` must be sorted descending and all positive.
pub fn search(pool: &[f64], target: f64, tolerance: f64, max_size: usize) -> Option<Vec<f64>> {
    let mut chosen = Vec::with_capacity(max_size);
    for size in 1..=max_size.min(pool.len()) {
        if descend(pool, target, tolerance, size, 0, 0.0, &mut chosen) {
            return Some(chosen.iter().map(|&i| pool[i]).collect());
        }
    }
    None
}

/// Depth-first walk over index combinations in lexicographic order
fn descend(
    pool: &[f64],
    target: f64,
    tolerance: f64,
    size: usize,
    start: usize,
    sum: f64,
    chosen: &mut Vec<usize>,
) -> bool {
    if chosen.len() == size {
        return (sum - target).abs() <= tolerance;
    }
    let remaining = size - chosen.len();
    for i in start..=pool.len().saturating_sub(remaining) {
        let next = sum + pool[i];
        // Values are positive, so a partial sum over the ceiling can never recover
        if next > target + tolerance {
            continue;
        }
        chosen.push(i);
        if descend(pool, target, tolerance, size, i + 1, next, chosen) {
            return true;
        }
        chosen.pop();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_split_total_is_found() {
        let text = "Line 1: steel coils ..... 300.00\nLine 2: steel plates ..... 700.00\nPlease remit promptly";
        let hint = find_combination(text, 1000.0, &MatchParams::default());
        assert!(hint.is_match());
        assert_eq!(hint.len(), 2);
        assert!((hint.sum().unwrap() - 1000.0).abs() <= 0.05);
        assert_eq!(hint.matched, Some(vec![700.0, 300.0]));
    }

    #[test]
    fn test_single_value_wins_over_pairs() {
        let text = "600 400 1,000.00";
        let hint = find_combination(text, 1000.0, &MatchParams::default());
        assert_eq!(hint.matched, Some(vec![1000.0]));
    }

    #[test]
    fn test_lexicographic_order_within_size() {
        // Pool sorted: 800, 700, 300, 200 -> (800, 200) precedes (700, 300)
        let hint = find_combination("300 800 200 700", 1000.0, &MatchParams::default());
        assert_eq!(hint.matched, Some(vec![800.0, 200.0]));
    }

    #[test]
    fn test_thousands_separators_and_tolerance() {
        let hint = find_combination("Subtotal 1,234.50 / Freight 765.53", 2000.0, &MatchParams::default());
        assert_eq!(hint.matched, Some(vec![1234.5, 765.53]));
    }

    #[test]
    fn test_no_match_is_not_an_error() {
        let hint = find_combination("10 20 30", 1000.0, &MatchParams::default());
        assert!(!hint.is_match());
        assert_eq!(hint.target, 1000.0);
    }

    #[test]
    fn test_non_positive_target() {
        assert!(!find_combination("0 5 -5", 0.0, &MatchParams::default()).is_match());
        assert!(!find_combination("5", -5.0, &MatchParams::default()).is_match());
    }

    #[test]
    fn test_pool_filters_and_caps() {
        let params = MatchParams { tolerance: 0.05, max_size: 2, pool_cap: 3 };
        let pool = candidate_pool(&[5.0, 2000.0, 1.0, 999.0, 3.0, 4.0], 1000.0, &params);
        assert_eq!(pool, vec![999.0, 5.0, 4.0]);
    }

    #[test]
    fn test_max_size_bounds_search() {
        let params = MatchParams { tolerance: 0.05, max_size: 2, pool_cap: 50 };
        assert!(!find_combination("100 200 300 400", 1000.0, &params).is_match());
        let params = MatchParams { max_size: 4, ..params };
        assert!(find_combination("100 200 300 400", 1000.0, &params).is_match());
    }

    proptest! {
        #[test]
        fn prop_planted_subset_is_found(
            values in prop::collection::vec(1u32..100_000, 1..30),
            picks in prop::collection::vec(any::<prop::sample::Index>(), 1..=5),
        ) {
            let mut indices: Vec<usize> = picks.iter().map(|p| p.index(values.len())).collect();
            indices.sort_unstable();
            indices.dedup();
            let cents: Vec<f64> = values.iter().map(|v| *v as f64 / 100.0).collect();
            let target: f64 = indices.iter().map(|&i| cents[i]).sum();

            let pool = candidate_pool(&cents, target, &MatchParams::default());
            let found = search(&pool, target, 0.05, 5);
            prop_assert!(found.is_some());
            let sum: f64 = found.unwrap().iter().sum();
            prop_assert!((sum - target).abs() <= 0.05);
        }

        #[test]
        fn prop_no_subset_below_target(
            values in prop::collection::vec(1u32..1000, 0..20),
        ) {
            let cents: Vec<f64> = values.iter().map(|v| *v as f64).collect();
            let total: f64 = cents.iter().sum();
            let target = total + 10.0;
            let pool = candidate_pool(&cents, target, &MatchParams::default());
            prop_assert!(search(&pool, target, 0.05, 5).is_none());
        }
    }
}
