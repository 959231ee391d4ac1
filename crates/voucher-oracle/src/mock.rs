//! Scripted oracle for deterministic tests

use crate::OracleError;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use voucher_domain::{ExtractionOracle, OracleMode, OracleRequest, OracleResponse};

type Reply = Result<OracleResponse, OracleError>;

#[derive(Debug, Default)]
struct MockState {
    scripts: HashMap<(String, OracleMode), VecDeque<Reply>>,
    fallback: Option<Reply>,
    requests: Vec<OracleRequest>,
    in_flight: usize,
    peak_in_flight: usize,
}

/// Mock oracle returning scripted replies without any network calls
///
/// Replies are queued per (file ref, mode). Each call pops the next reply;
/// the last one in a queue repeats. Unscripted calls use the fallback reply,
/// or fail with a parse error when there is none.
///
/// Clones share state, so a test can keep a handle while the extractor owns
/// another. The mock also tracks how many calls are in flight at once.
///
/// # Examples
///
/// ```
/// use voucher_domain::{ExtractionOracle, OracleMode, OracleRequest, OracleResponse, DocumentType, FieldKind};
/// use voucher_oracle::MockOracle;
///
/// let oracle = MockOracle::new();
/// oracle.push_response("inv.pdf", OracleMode::Text, OracleResponse { overall_confidence: 0.9, ..Default::default() });
///
/// let request = OracleRequest {
///     ledger_id: "L-1".into(),
///     document_type: DocumentType::Primary,
///     mode: OracleMode::Text,
///     text: "INVOICE".into(),
///     file_ref: "inv.pdf".into(),
///     fields: vec![FieldKind::Amount],
///     hints: vec![],
///     instructions: None,
/// };
/// let response = tokio_test::block_on(oracle.extract(&request)).unwrap();
/// assert_eq!(response.overall_confidence, 0.9);
/// assert_eq!(oracle.call_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockOracle {
    state: Arc<Mutex<MockState>>,
    delay: Duration,
}

impl MockOracle {
    /// Create a mock with no scripted replies
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply to every unscripted call with this response
    pub fn with_fallback(self, response: OracleResponse) -> Self {
        self.lock().fallback = Some(Ok(response));
        self
    }

    /// Hold each call for `delay` before replying
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Queue a response for a document and mode
    pub fn push_response(&self, file_ref: impl Into<String>, mode: OracleMode, response: OracleResponse) {
        self.push(file_ref.into(), mode, Ok(response));
    }

    /// Queue an error for a document and mode
    pub fn push_error(&self, file_ref: impl Into<String>, mode: OracleMode, error: OracleError) {
        self.push(file_ref.into(), mode, Err(error));
    }

    /// Number of calls made so far
    pub fn call_count(&self) -> usize {
        self.lock().requests.len()
    }

    /// Number of calls made for one document and mode
    pub fn calls_for(&self, file_ref: &str, mode: OracleMode) -> usize {
        self.lock()
            .requests
            .iter()
            .filter(|r| r.file_ref == file_ref && r.mode == mode)
            .count()
    }

    /// Copies of every request received, in arrival order
    pub fn requests(&self) -> Vec<OracleRequest> {
        self.lock().requests.clone()
    }

    /// Highest number of calls that were in flight at the same time
    pub fn peak_in_flight(&self) -> usize {
        self.lock().peak_in_flight
    }

    /// Forget recorded requests and the in-flight peak
    pub fn reset(&self) {
        let mut state = self.lock();
        state.requests.clear();
        state.peak_in_flight = state.in_flight;
    }

    fn push(&self, file_ref: String, mode: OracleMode, reply: Reply) {
        self.lock().scripts.entry((file_ref, mode)).or_default().push_back(reply);
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_reply(&self, request: &OracleRequest) -> Reply {
        let mut state = self.lock();
        state.requests.push(request.clone());

        let key = (request.file_ref.clone(), request.mode);
        if let Some(queue) = state.scripts.get_mut(&key) {
            let reply = if queue.len() > 1 { queue.pop_front() } else { queue.front().cloned() };
            if let Some(reply) = reply {
                return reply;
            }
        }
        state.fallback.clone().unwrap_or_else(|| {
            Err(OracleError::Parse(format!(
                "no scripted reply for {} ({})",
                request.file_ref, request.mode
            )))
        })
    }
}

/// Decrements the in-flight gauge when a call finishes or is dropped
struct InFlight<'a>(&'a MockOracle);

impl<'a> InFlight<'a> {
    fn enter(oracle: &'a MockOracle) -> Self {
        let mut state = oracle.lock();
        state.in_flight += 1;
        state.peak_in_flight = state.peak_in_flight.max(state.in_flight);
        InFlight(oracle)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut state = self.0.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
    }
}

impl ExtractionOracle for MockOracle {
    type Error = OracleError;

    async fn extract(&self, request: &OracleRequest) -> Result<OracleResponse, Self::Error> {
        let _gauge = InFlight::enter(self);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.next_reply(request)
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voucher_domain::{DocumentType, FieldKind};

    fn request(file_ref: &str, mode: OracleMode) -> OracleRequest {
        OracleRequest {
            ledger_id: "L-1".into(),
            document_type: DocumentType::Primary,
            mode,
            text: String::new(),
            file_ref: file_ref.into(),
            fields: vec![FieldKind::Amount],
            hints: vec![],
            instructions: None,
        }
    }

    fn confident(c: f64) -> OracleResponse {
        OracleResponse { overall_confidence: c, ..Default::default() }
    }

    #[tokio::test]
    async fn test_queue_pops_then_repeats_last() {
        let oracle = MockOracle::new();
        oracle.push_error("a.pdf", OracleMode::Text, OracleError::Transient("boom".into()));
        oracle.push_response("a.pdf", OracleMode::Text, confident(0.7));

        let req = request("a.pdf", OracleMode::Text);
        assert!(oracle.extract(&req).await.is_err());
        assert_eq!(oracle.extract(&req).await.unwrap().overall_confidence, 0.7);
        assert_eq!(oracle.extract(&req).await.unwrap().overall_confidence, 0.7);
        assert_eq!(oracle.call_count(), 3);
    }

    #[tokio::test]
    async fn test_modes_are_scripted_separately() {
        let oracle = MockOracle::new();
        oracle.push_response("a.pdf", OracleMode::Text, confident(0.5));
        oracle.push_response("a.pdf", OracleMode::Vision, confident(0.95));

        let vision = oracle.extract(&request("a.pdf", OracleMode::Vision)).await.unwrap();
        assert_eq!(vision.overall_confidence, 0.95);
        assert_eq!(oracle.calls_for("a.pdf", OracleMode::Vision), 1);
        assert_eq!(oracle.calls_for("a.pdf", OracleMode::Text), 0);
    }

    #[tokio::test]
    async fn test_unscripted_uses_fallback_or_fails() {
        let oracle = MockOracle::new();
        assert!(matches!(
            oracle.extract(&request("x.pdf", OracleMode::Text)).await,
            Err(OracleError::Parse(_))
        ));

        let oracle = MockOracle::new().with_fallback(confident(0.9));
        assert!(oracle.extract(&request("x.pdf", OracleMode::Text)).await.is_ok());
    }

    #[tokio::test]
    async fn test_clones_share_state_and_track_peak() {
        let oracle = MockOracle::new()
            .with_fallback(confident(0.9))
            .with_delay(Duration::from_millis(20));
        let handle = oracle.clone();

        let r1 = request("a.pdf", OracleMode::Text);
        let r2 = request("b.pdf", OracleMode::Text);
        let (a, b) = tokio::join!(oracle.extract(&r1), oracle.extract(&r2));
        assert!(a.is_ok() && b.is_ok());

        assert_eq!(handle.call_count(), 2);
        assert_eq!(handle.peak_in_flight(), 2);

        handle.reset();
        assert_eq!(oracle.call_count(), 0);
        assert_eq!(oracle.peak_in_flight(), 0);
    }
}
