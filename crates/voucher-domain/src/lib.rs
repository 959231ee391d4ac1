//! Voucher Domain Layer
//!
//! Core model for reconciling ledger entries against evidence documents.
//! The only external dependency is `serde`, because every record here is
//! persisted or exchanged as JSON by the outer layers.
//!
//! ## Key Concepts
//!
//! - **Ledger entry**: the authoritative business record being reconciled
//! - **Evidence document**: scanned/digital proof offered for a ledger entry
//! - **Extraction result**: per-field guesses from the extraction oracle, each
//!   with a raw value, a canonical value and a confidence in [0, 1]
//! - **Combination hint**: an N:1 subset of line items summing to a ledger total
//! - **Verification report**: per-field checks folded into one overall status
//!
//! ## Architecture
//!
//! - Pure data and business rules only
//! - Trait definitions for every collaborator (oracle, result store)
//! - Infrastructure implementations live in other crates

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod confidence;
pub mod document;
pub mod extraction;
pub mod field;
pub mod hint;
pub mod ledger;
pub mod report;
pub mod status;
pub mod traits;

// Re-exports for convenience
pub use confidence::Confidence;
pub use document::{DocumentType, EvidenceDocument};
pub use extraction::{ExtractionResult, ExtractionTier, FailureKind};
pub use field::{BoundingHint, CanonicalValue, ExtractedField, FieldKind};
pub use hint::CombinationHint;
pub use ledger::LedgerEntry;
pub use report::{FieldCheck, VerificationReport};
pub use status::Status;
pub use traits::{
    ExtractionOracle, OracleFailure, OracleField, OracleMode, OracleRequest, OracleResponse, OracleStatus,
    ResultStore,
};
