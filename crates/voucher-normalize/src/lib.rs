//! Voucher Field Normalizer
//!
//! Canonicalizes raw field values so ledger and evidence can be compared
//! exactly.
//!
//! | Field kind | Canonical form |
//! |---|---|
//! | Amount | number + currency code (`1,234.56USD` → `1234.56 USD`) |
//! | Quantity / gross weight | number + unit code (`10 METRIC TONS` → `10 MT`) |
//! | Date | `YYYY-MM-DD`; unparseable text is passed through unchanged |
//! | Trade term | 3-letter incoterm (`C.I.F Hamburg` → `CIF`) |
//! | Freight payment | `PREPAID` or `COLLECT` |
//!
//! Normalizers never fail: anything unparseable becomes
//! [`CanonicalValue::Null`] (or an unparsed date), and the caller keeps the
//! raw value for audit. Rendering a canonical value and normalizing it again
//! is a no-op.
//!
//! # Examples
//!
//! ```
//! use voucher_domain::{CanonicalValue, FieldKind};
//! use voucher_normalize::normalize;
//!
//! let amount = normalize(FieldKind::Amount, "1,234.56USD");
//! assert_eq!(amount.as_amount(), Some((1234.56, Some("USD"))));
//!
//! let term = normalize(FieldKind::TradeTerm, "C.I.F Hamburg");
//! assert_eq!(term.as_code(), Some("CIF"));
//! ```

#![warn(missing_docs)]

pub mod amount;
pub mod date;
pub mod freight;
pub mod number;
pub mod quantity;
pub mod trade_term;

pub use amount::normalize_amount;
pub use date::normalize_date;
pub use freight::normalize_freight_payment;
pub use number::parse_number;
pub use quantity::{mass_in_kg, normalize_quantity};
pub use trade_term::{normalize_trade_term, TradeTermGroup};

use voucher_domain::{CanonicalValue, ExtractedField, FieldKind};

/// Normalize a raw value for the given field kind
pub fn normalize(kind: FieldKind, raw: &str) -> CanonicalValue {
    match kind {
        FieldKind::Amount => normalize_amount(raw),
        FieldKind::Quantity | FieldKind::GrossWeight => normalize_quantity(raw),
        FieldKind::Date => normalize_date(raw),
        FieldKind::TradeTerm => normalize_trade_term(raw),
        FieldKind::FreightPayment => normalize_freight_payment(raw),
        FieldKind::DocumentNumber => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                CanonicalValue::Null
            } else {
                CanonicalValue::Text { value: trimmed.to_string() }
            }
        }
    }
}

/// Fill in the canonical value of an extracted field from its raw value
pub fn normalize_field(kind: FieldKind, field: &mut ExtractedField) {
    field.canonical = match field.raw_value.as_deref() {
        Some(raw) => normalize(kind, raw),
        None => CanonicalValue::Null,
    };
}
