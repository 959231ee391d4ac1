//! Voucher Storage Layer
//!
//! Implements the `ResultStore` trait on SQLite.
//!
//! # Architecture
//!
//! - One row per (ledger id, document type) extraction result
//! - One row per ledger id verification report
//! - Records are stored as JSON payloads next to a few indexed columns
//! - Every write is an `INSERT ... ON CONFLICT DO UPDATE` inside a
//!   transaction, so a batch lands completely or not at all and never
//!   touches keys it does not name
//!
//! # Examples
//!
//! ```no_run
//! use voucher_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is now ready for result operations
//! ```

#![warn(missing_docs)]

use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use thiserror::Error;
use voucher_domain::traits::ResultStore;
use voucher_domain::{ExtractionResult, Status, VerificationReport};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Stored payload could not be encoded or decoded
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::InvalidData(e.to_string())
    }
}

/// SQLite-based implementation of ResultStore
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Share a store between tasks
/// behind a mutex, or give each thread its own SqliteStore instance.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) a store at the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use voucher_store::SqliteStore;
    ///
    /// let store = SqliteStore::new("voucher.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    /// Ledger ids whose stored results are flagged for review
    pub fn ledger_ids_needing_review(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT ledger_id FROM extraction_results
             WHERE needs_review = 1 ORDER BY ledger_id",
        )?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(ids)
    }

    /// Number of reports per overall status
    pub fn status_counts(&self) -> Result<Vec<(Status, usize)>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT overall_status, COUNT(*) FROM verification_reports
             GROUP BY overall_status ORDER BY overall_status",
        )?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(status, count)| {
                let status = Status::parse(&status)
                    .ok_or_else(|| StoreError::InvalidData(format!("Unknown status: {}", status)))?;
                Ok((status, usize::try_from(count).unwrap_or(0)))
            })
            .collect()
    }
}

impl ResultStore for SqliteStore {
    type Error = StoreError;

    fn upsert_extractions(&mut self, results: &[ExtractionResult]) -> Result<(), Self::Error> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO extraction_results
                     (ledger_id, document_type, file_ref, tier, overall_confidence, needs_review, payload)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(ledger_id, document_type) DO UPDATE SET
                     file_ref = excluded.file_ref,
                     tier = excluded.tier,
                     overall_confidence = excluded.overall_confidence,
                     needs_review = excluded.needs_review,
                     payload = excluded.payload,
                     updated_at = excluded.updated_at",
            )?;
            for result in results {
                let payload = serde_json::to_string(result)?;
                stmt.execute(params![
                    &result.ledger_id,
                    result.document_type.as_str(),
                    &result.file_ref,
                    result.tier.as_str(),
                    result.overall_confidence.value(),
                    result.needs_review,
                    payload,
                ])?;
            }
        }
        tx.commit()?;

        tracing::debug!(count = results.len(), "Upserted extraction results");
        Ok(())
    }

    fn extractions_for(&self, ledger_id: &str) -> Result<Vec<ExtractionResult>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT payload FROM extraction_results
             WHERE ledger_id = ?1 ORDER BY document_type",
        )?;
        let payloads = stmt
            .query_map(params![ledger_id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        payloads
            .iter()
            .map(|p| serde_json::from_str(p).map_err(StoreError::from))
            .collect()
    }

    fn upsert_report(&mut self, report: &VerificationReport) -> Result<(), Self::Error> {
        let payload = serde_json::to_string(report)?;
        self.conn.execute(
            "INSERT INTO verification_reports (ledger_id, overall_status, payload)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(ledger_id) DO UPDATE SET
                 overall_status = excluded.overall_status,
                 payload = excluded.payload,
                 updated_at = excluded.updated_at",
            params![&report.ledger_id, report.overall_status.as_str(), payload],
        )?;
        Ok(())
    }

    fn report_for(&self, ledger_id: &str) -> Result<Option<VerificationReport>, Self::Error> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM verification_reports WHERE ledger_id = ?1",
                params![ledger_id],
                |row| row.get(0),
            )
            .optional()?;

        payload
            .map(|p| serde_json::from_str(&p).map_err(StoreError::from))
            .transpose()
    }

    fn ledger_ids(&self) -> Result<Vec<String>, Self::Error> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT ledger_id FROM extraction_results ORDER BY ledger_id")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(ids)
    }
}
