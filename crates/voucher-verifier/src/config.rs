//! Verifier configuration

use serde::{Deserialize, Serialize};

/// Tolerances for cross-source comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// Largest absolute amount difference still counted as equal
    pub amount_epsilon: f64,

    /// Largest absolute quantity difference still counted as equal, in the
    /// ledger's unit
    pub quantity_epsilon: f64,

    /// Relative gross-weight deviation from the ledger quantity accepted by
    /// the transport-document cross-check
    pub gross_weight_tolerance: f64,

    /// Compare the transport document's freight clause with the trade term
    pub check_freight_payment: bool,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            amount_epsilon: 1e-6,
            quantity_epsilon: 0.01,
            gross_weight_tolerance: 0.05,
            check_freight_payment: true,
        }
    }
}

impl VerifierConfig {
    /// Strict preset: exact quantities, tight gross-weight band
    pub fn strict() -> Self {
        Self {
            quantity_epsilon: 1e-6,
            gross_weight_tolerance: 0.02,
            ..Self::default()
        }
    }

    /// Lenient preset: cent-level amounts, wider quantity and weight bands
    pub fn lenient() -> Self {
        Self {
            amount_epsilon: 0.01,
            quantity_epsilon: 0.5,
            gross_weight_tolerance: 0.15,
            ..Self::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("amount_epsilon", self.amount_epsilon),
            ("quantity_epsilon", self.quantity_epsilon),
            ("gross_weight_tolerance", self.gross_weight_tolerance),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{} must be a non-negative number", name));
            }
        }
        if self.gross_weight_tolerance > 1.0 {
            return Err("gross_weight_tolerance must be at most 1.0".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
