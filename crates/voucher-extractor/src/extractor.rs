//! Core Extractor implementation

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::escalation::{decide, needs_escalation, TierOutcome};
use crate::limiter::ConcurrencyLimiter;
use crate::matcher::{find_combination, MatchParams};
use crate::preprocess::preprocess;
use crate::prompt::PromptBuilder;
use crate::retry::{call_with_retry, CallFailure};
use crate::types::{BatchOutcome, BatchProgress, ExtractionJob};
use futures::stream::{FuturesUnordered, StreamExt};
use std::fmt::Display;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};
use voucher_domain::{
    CombinationHint, Confidence, EvidenceDocument, ExtractedField, ExtractionOracle, ExtractionResult,
    ExtractionTier, FailureKind, FieldKind, LedgerEntry, OracleMode, OracleRequest, OracleResponse, OracleStatus, ResultStore,
};
use voucher_normalize::{normalize_field, parse_number};

/// Matcher output for one document
#[derive(Debug, Clone, Default)]
struct Hints {
    amount: Option<CombinationHint>,
    quantity: Option<CombinationHint>,
}

/// The Extractor turns evidence documents into normalized extraction results
///
/// Owns the retry, escalation and re-prompt policy around the oracle, and
/// caps the number of oracle calls in flight.
pub struct Extractor<O, S>
where
    O: ExtractionOracle,
    S: ResultStore,
{
    oracle: O,
    store: Arc<Mutex<S>>,
    config: ExtractorConfig,
    limiter: ConcurrencyLimiter,
}

impl<O, S> Extractor<O, S>
where
    O: ExtractionOracle,
    S: ResultStore,
    S::Error: Display,
{
    /// Create a new Extractor
    pub fn new(oracle: O, store: S, config: ExtractorConfig) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;
        Ok(Self {
            oracle,
            store: Arc::new(Mutex::new(store)),
            limiter: ConcurrencyLimiter::new(config.max_concurrency),
            config,
        })
    }

    /// Shared handle to the result store
    pub fn store(&self) -> Arc<Mutex<S>> {
        Arc::clone(&self.store)
    }

    /// The oracle-call limiter
    pub fn limiter(&self) -> &ConcurrencyLimiter {
        &self.limiter
    }

    /// Active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract one document
    ///
    /// Oracle failures degrade into a flagged zero-confidence result; only
    /// quota exhaustion is returned as an error. The result is not persisted.
    pub async fn extract(&self, job: &ExtractionJob) -> Result<ExtractionResult, ExtractorError> {
        let ExtractionJob { ledger, document } = job;
        info!(
            ledger_id = %ledger.id,
            document_type = %document.document_type,
            file_ref = %document.file_ref,
            "Extracting document"
        );

        // Matcher scans the original text while the prompt text is prepared
        let matcher = self.spawn_matcher(ledger, document);
        let text = preprocess(&document.raw_text);
        let hints = matcher.await.map_err(|e| ExtractorError::Matcher(e.to_string()))?;

        let builder = PromptBuilder::new(ledger, document, text)
            .with_amount_hint(hints.amount.as_ref())
            .with_quantity_hint(hints.quantity.as_ref());
        debug!(ledger_id = %ledger.id, hints = ?builder.hints(), "Prompt assembled");

        let text_call = self.call(&builder.request(OracleMode::Text)).await?;
        let vision_call = match &text_call {
            Ok(response) if !needs_escalation(response, self.config.escalation_threshold) => None,
            _ => {
                warn!(
                    ledger_id = %ledger.id,
                    document_type = %document.document_type,
                    text_confidence = text_call.as_ref().map(|r| r.overall_confidence).unwrap_or(0.0),
                    "Escalating to vision"
                );
                Some(self.call(&builder.request(OracleMode::Vision)).await?)
            }
        };

        let critical = document.document_type.critical_fields();
        let outcome = decide(text_call, vision_call, critical);
        let tier = outcome.tier();
        let (mode, response) = match outcome {
            TierOutcome::Text(response) => (OracleMode::Text, response),
            TierOutcome::Vision(response) => (OracleMode::Vision, response),
            TierOutcome::Failed(kind) => {
                warn!(ledger_id = %ledger.id, document_type = %document.document_type, %kind, "Extraction degraded");
                let mut result = ExtractionResult::failed(&ledger.id, document.document_type, &document.file_ref, kind);
                result.combination_hint = hints.amount;
                result.extracted_at = now();
                return Ok(result);
            }
        };

        let mut result = build_result(document, tier, &response);
        result.combination_hint = hints.amount.clone();
        if response.status == OracleStatus::Unidentified {
            result.note("oracle could not identify the document");
            result.needs_review = true;
        }

        // Validation gate: one stricter attempt for empty critical fields
        let missing = result.missing_critical_fields();
        if !missing.is_empty() {
            warn!(ledger_id = %ledger.id, missing = ?missing, "Critical fields missing, re-prompting");
            match self.call(&builder.strict_request(mode, &missing)).await? {
                Ok(retry) => merge_fields(&mut result, &retry, &missing),
                Err(kind) => result.note(format!("strict re-prompt failed: {}", kind)),
            }
        }

        if let (Some(expected), Some(hint)) = (ledger.positive_amount(), hints.amount.as_ref()) {
            if hint.is_match() && self.amount_disagrees(&result, expected) {
                self.reprompt_for_sum(&builder, mode, ledger, expected, hint, &mut result).await?;
            }
        }

        let still_missing = result.missing_critical_fields();
        if !still_missing.is_empty() {
            let names: Vec<&str> = still_missing.iter().map(FieldKind::as_str).collect();
            result.note(format!("missing critical fields: {}", names.join(", ")));
            result.needs_review = true;
        }

        result.extracted_at = now();
        info!(
            ledger_id = %ledger.id,
            document_type = %document.document_type,
            tier = result.tier.as_str(),
            confidence = result.overall_confidence.value(),
            needs_review = result.needs_review,
            "Document extracted"
        );
        Ok(result)
    }

    /// Extract a batch of documents and persist the results
    pub async fn batch_extract(&self, jobs: &[ExtractionJob]) -> Result<BatchOutcome, ExtractorError> {
        self.batch_extract_with_progress(jobs, |_| {}).await
    }

    /// Extract a batch, reporting progress after each chunk
    ///
    /// Jobs run in chunks of `chunk_size`, all of a chunk's documents at once
    /// under the limiter. Each chunk's results are upserted into the store
    /// before the next chunk starts. On quota exhaustion the rest of the batch
    /// is dropped; results finished before that point are still persisted.
    pub async fn batch_extract_with_progress<F>(
        &self,
        jobs: &[ExtractionJob],
        mut progress: F,
    ) -> Result<BatchOutcome, ExtractorError>
    where
        F: FnMut(&BatchProgress),
    {
        let chunk_count = jobs.len().div_ceil(self.config.chunk_size);
        info!(documents = jobs.len(), chunks = chunk_count, "Starting batch extraction");

        let mut outcome = BatchOutcome::default();
        let mut completed = 0;
        let mut failed = 0;

        for (index, chunk) in jobs.chunks(self.config.chunk_size).enumerate() {
            let mut pending: FuturesUnordered<_> = chunk.iter().map(|job| self.extract(job)).collect();
            let mut finished = Vec::with_capacity(chunk.len());
            let mut abort = None;

            while let Some(result) = pending.next().await {
                match result {
                    Ok(result) => finished.push(result),
                    Err(e) => {
                        abort = Some(e);
                        break;
                    }
                }
            }
            // Cancels whatever is still running; their limiter slots are released
            drop(pending);

            self.persist(&finished)?;
            for result in finished {
                completed += 1;
                if result.failure.is_some() {
                    failed += 1;
                }
                outcome.insert(result);
            }

            if let Some(e) = abort {
                error!(completed, total = jobs.len(), "Batch aborted: {}", e);
                return Err(e);
            }

            let report = BatchProgress {
                chunk_index: index + 1,
                chunk_count,
                completed,
                total: jobs.len(),
                failed,
            };
            debug!(chunk = report.chunk_index, completed, failed, "Chunk finished");
            progress(&report);
        }

        info!(
            documents = outcome.len(),
            failed = outcome.failed(),
            needs_review = outcome.needs_review(),
            peak_in_flight = self.limiter.peak(),
            "Batch extraction complete"
        );
        Ok(outcome)
    }

    /// One oracle call with retries. Quota exhaustion becomes an error,
    /// anything else a failure kind for the caller to degrade on.
    async fn call(&self, request: &OracleRequest) -> Result<Result<OracleResponse, FailureKind>, ExtractorError> {
        match call_with_retry(&self.oracle, &self.limiter, &self.config, request).await {
            Ok(response) => Ok(Ok(response)),
            Err(CallFailure { kind: FailureKind::Quota, message, .. }) => {
                error!(ledger_id = %request.ledger_id, "Oracle quota exhausted: {}", message);
                Err(ExtractorError::QuotaExhausted {
                    ledger_id: request.ledger_id.clone(),
                    message,
                })
            }
            Err(failure) => {
                warn!(
                    ledger_id = %request.ledger_id,
                    mode = %request.mode,
                    kind = %failure.kind,
                    "Oracle call gave up: {}",
                    failure.message
                );
                Ok(Err(failure.kind))
            }
        }
    }

    /// Amount hints only for documents that carry a total
    fn spawn_matcher(
        &self,
        ledger: &LedgerEntry,
        document: &EvidenceDocument,
    ) -> tokio::task::JoinHandle<Hints> {
        let params = MatchParams {
            tolerance: self.config.match_tolerance,
            max_size: self.config.max_combination_size,
            pool_cap: self.config.candidate_pool_cap,
        };
        let carries_total = document.document_type.requested_fields().contains(&FieldKind::Amount);
        let amount = ledger.positive_amount().filter(|_| carries_total);
        let quantity = ledger.positive_quantity();
        let text = document.raw_text.clone();

        tokio::task::spawn_blocking(move || Hints {
            amount: amount.map(|target| find_combination(&text, target, &params)),
            quantity: quantity.map(|target| find_combination(&text, target, &params)),
        })
    }

    fn amount_disagrees(&self, result: &ExtractionResult, expected: f64) -> bool {
        match extracted_amount(result) {
            Some(value) => (value - expected).abs() > self.config.match_tolerance,
            None => true,
        }
    }

    async fn reprompt_for_sum(
        &self,
        builder: &PromptBuilder<'_>,
        mode: OracleMode,
        ledger: &LedgerEntry,
        expected: f64,
        hint: &CombinationHint,
        result: &mut ExtractionResult,
    ) -> Result<(), ExtractorError> {
        debug!(ledger_id = %ledger.id, combination = ?hint.describe(), "Amount disagrees with ledger, asking for the sum");

        let response = match self.call(&builder.sum_request(mode, hint)).await? {
            Ok(response) => response,
            Err(kind) => {
                result.note(format!("sum re-prompt failed: {}", kind));
                return Ok(());
            }
        };

        let Some(mut field) = oracle_field(&response, FieldKind::Amount) else {
            return Ok(());
        };
        normalize_field(FieldKind::Amount, &mut field);
        let summed = field.canonical.as_amount().map(|(value, _)| value);
        if summed.is_some_and(|value| (value - expected).abs() <= self.config.match_tolerance) {
            result.fields.insert(FieldKind::Amount, field);
            result.note(format!(
                "amount found via combination: {}",
                hint.describe().unwrap_or_default()
            ));
            info!(ledger_id = %ledger.id, "Amount found via combination");
        }
        Ok(())
    }

    fn persist(&self, results: &[ExtractionResult]) -> Result<(), ExtractorError> {
        if results.is_empty() {
            return Ok(());
        }
        let mut store = self
            .store
            .lock()
            .map_err(|e| ExtractorError::Store(format!("Store lock error: {}", e)))?;
        store
            .upsert_extractions(results)
            .map_err(|e| ExtractorError::Store(e.to_string()))
    }
}

/// Result built from an accepted oracle answer, fields normalized
fn build_result(
    document: &EvidenceDocument,
    tier: ExtractionTier,
    response: &OracleResponse,
) -> ExtractionResult {
    let mut result = ExtractionResult {
        ledger_id: document.ledger_id.clone(),
        document_type: document.document_type,
        file_ref: document.file_ref.clone(),
        fields: Default::default(),
        overall_confidence: Confidence::new(response.overall_confidence),
        tier,
        failure: None,
        needs_review: false,
        combination_hint: None,
        notes: response.notes.clone(),
        extracted_at: String::new(),
    };

    for kind in document.document_type.requested_fields() {
        if let Some(mut field) = oracle_field(response, *kind) {
            normalize_field(*kind, &mut field);
            result.fields.insert(*kind, field);
        }
    }
    if document.ocr_used {
        result.note("text acquired by OCR");
    }
    result
}

/// Fill the listed fields from a re-prompt answer when it has a value for them
fn merge_fields(result: &mut ExtractionResult, response: &OracleResponse, kinds: &[FieldKind]) {
    for kind in kinds {
        if let Some(mut field) = oracle_field(response, *kind).filter(ExtractedField::has_value) {
            normalize_field(*kind, &mut field);
            result.fields.insert(*kind, field);
        }
    }
}

fn oracle_field(response: &OracleResponse, kind: FieldKind) -> Option<ExtractedField> {
    response.field(kind).map(|f| ExtractedField {
        bounding: f.bounding.clone(),
        ..ExtractedField::raw(f.value.clone(), Confidence::new(f.confidence))
    })
}

/// Numeric amount of a result, falling back to the raw text when the
/// normalizer could not produce a canonical amount
fn extracted_amount(result: &ExtractionResult) -> Option<f64> {
    let field = result.field(FieldKind::Amount)?;
    field
        .canonical
        .as_amount()
        .map(|(value, _)| value)
        .or_else(|| field.raw_value.as_deref().and_then(parse_number))
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}
