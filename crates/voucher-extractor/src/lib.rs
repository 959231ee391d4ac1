//! Voucher Extractor
//!
//! Turns evidence documents into normalized, per-field extraction results
//! using an extraction oracle.
//!
//! # Overview
//!
//! For each document the extractor trims low-signal lines, searches the
//! text for line items that add up to the ledger total, asks the oracle in
//! text mode and escalates to vision mode when the answer is weak. Empty
//! critical fields get one stricter re-prompt; a total that disagrees with
//! the ledger gets a re-prompt for the summed line items.
//!
//! # Architecture
//!
//! ```text
//! Document → Preprocess ┬→ PromptBuilder → Oracle (text → vision) → Normalize → ResultStore
//!                       └→ Matcher (blocking worker) ┘
//! ```
//!
//! # Key Features
//!
//! - **Two-tier escalation**: vision replaces text only when it is at least as
//!   confident and supplies a critical value
//! - **Retry policy**: transient backoff, rate-limit waits, quota abort
//! - **Bounded concurrency**: an instrumented limiter caps in-flight oracle calls
//! - **Chunked batches**: results are persisted after every chunk
//!
//! # Example Usage
//!
//! ```no_run
//! use voucher_domain::{DocumentType, EvidenceDocument, LedgerEntry};
//! use voucher_extractor::{ExtractionJob, Extractor, ExtractorConfig};
//! use voucher_oracle::MockOracle;
//! use voucher_store::SqliteStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteStore::new(":memory:")?;
//! let extractor = Extractor::new(MockOracle::new(), store, ExtractorConfig::default())?;
//!
//! let mut ledger = LedgerEntry::new("L-001");
//! ledger.amount = Some(1000.0);
//! let document = EvidenceDocument {
//!     ledger_id: "L-001".to_string(),
//!     file_ref: "invoice.pdf".to_string(),
//!     document_type: DocumentType::Primary,
//!     raw_text: "INVOICE ... TOTAL USD 1,000.00".to_string(),
//!     ocr_used: false,
//! };
//!
//! let outcome = extractor
//!     .batch_extract_with_progress(&[ExtractionJob::new(ledger, document)], |p| {
//!         println!("chunk {}/{}: {} done", p.chunk_index, p.chunk_count, p.completed);
//!     })
//!     .await?;
//! println!("{} results, {} need review", outcome.len(), outcome.needs_review());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
pub mod escalation;
mod extractor;
mod limiter;
pub mod matcher;
pub mod preprocess;
mod prompt;
pub mod retry;
mod types;


pub use config::ExtractorConfig;
pub use error::ExtractorError;
pub use escalation::TierOutcome;
pub use extractor::Extractor;
pub use limiter::{ConcurrencyLimiter, LimiterPermit};
pub use matcher::{find_combination, MatchParams};
pub use preprocess::preprocess;
pub use prompt::PromptBuilder;
pub use types::{BatchOutcome, BatchProgress, ExtractionJob};
