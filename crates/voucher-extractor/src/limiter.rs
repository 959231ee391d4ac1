//! Bounded, instrumented concurrency limiter for oracle calls

use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{AcquireError, Semaphore, SemaphorePermit};

/// Caps how many oracle calls are in flight and records the peak
#[derive(Debug)]
pub struct ConcurrencyLimiter {
    semaphore: Semaphore,
    capacity: usize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

/// Slot held for the duration of one oracle call
///
/// Dropping the permit frees the slot, whether the call finished, failed or
/// was cancelled.
#[derive(Debug)]
pub struct LimiterPermit<'a> {
    _permit: SemaphorePermit<'a>,
    in_flight: &'a AtomicUsize,
}

impl ConcurrencyLimiter {
    /// Create a limiter with `capacity` slots
    pub fn new(capacity: usize) -> Self {
        Self {
            semaphore: Semaphore::new(capacity),
            capacity,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    /// Wait for a free slot
    pub async fn acquire(&self) -> Result<LimiterPermit<'_>, AcquireError> {
        let permit = self.semaphore.acquire().await?;
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        Ok(LimiterPermit {
            _permit: permit,
            in_flight: &self.in_flight,
        })
    }

    /// Number of slots
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Calls currently holding a slot
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of slots held at once
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

impl Drop for LimiterPermit<'_> {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}
