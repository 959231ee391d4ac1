//! Voucher Verifier
//!
//! Compares a ledger entry with the evidence extracted for it and produces a
//! per-field verification report.
//!
//! Rules run in a fixed order (amount, date, quantity, trade term) and each
//! yields PASS, WARN or FAIL. Transport-document cross-checks (gross weight,
//! freight clause) and flagged extractions can only warn. The overall status
//! is FAIL if any rule failed, else WARN if any warned, else PASS; an entry
//! with no evidence at all is NEEDS_EVIDENCE.
//!
//! # Examples
//!
//! ```
//! use voucher_domain::{LedgerEntry, Status};
//! use voucher_verifier::Verifier;
//!
//! let verifier = Verifier::default();
//! let report = verifier.verify(&LedgerEntry::new("L-001"), None, None);
//! assert_eq!(report.overall_status, Status::NeedsEvidence);
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod verifier;

pub use config::VerifierConfig;
pub use error::VerifierError;
pub use verifier::Verifier;
