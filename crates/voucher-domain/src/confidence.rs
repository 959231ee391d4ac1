//! Confidence scores reported by the extraction oracle

use serde::{Deserialize, Serialize};
use std::fmt;

/// A confidence score in [0.0, 1.0]
///
/// Oracles occasionally report values outside the unit interval (or NaN).
/// Construction clamps instead of panicking so a misbehaving provider can
/// never break the invariant downstream.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Confidence(f64);

impl Confidence {
    /// Zero confidence, used for failed extractions
    pub const ZERO: Confidence = Confidence(0.0);

    /// Full confidence
    pub const CERTAIN: Confidence = Confidence(1.0);

    /// Create a confidence score, clamping into [0, 1]. NaN becomes 0.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        Self(value.clamp(0.0, 1.0))
    }

    /// Get the raw value
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Check whether this score reaches a threshold
    pub fn meets(&self, threshold: f64) -> bool {
        self.0 >= threshold
    }
}

impl From<f64> for Confidence {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
