//! Cross-source verification rules

use crate::{VerifierConfig, VerifierError};
use tracing::debug;
use voucher_domain::{
    CanonicalValue, DocumentType, ExtractionResult, FieldCheck, FieldKind, LedgerEntry, Status, VerificationReport,
};
use voucher_normalize::amount::currency_code;
use voucher_normalize::trade_term::trade_term_code;
use voucher_normalize::{mass_in_kg, normalize_date, normalize_quantity, TradeTermGroup};

const PRIMARY_MISSING: &str = "primary document missing";
const MISSING_LEDGER: &str = "missing ledger value";
const MISSING_EVIDENCE: &str = "missing evidence value";

/// The Verifier compares a ledger entry with its extracted evidence
///
/// Output is a pure function of the inputs: the same ledger entry and
/// results always give the same report.
#[derive(Debug, Clone, Default)]
pub struct Verifier {
    config: VerifierConfig,
}

impl Verifier {
    /// Create a new Verifier with the given configuration
    pub fn new(config: VerifierConfig) -> Result<Self, VerifierError> {
        config.validate().map_err(VerifierError::Config)?;
        Ok(Self { config })
    }

    /// Active configuration
    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Verify a ledger entry against whatever results are stored for it
    ///
    /// Picks the primary and secondary results; other document types do not
    /// take part in the rules.
    pub fn verify_results(&self, ledger: &LedgerEntry, results: &[ExtractionResult]) -> VerificationReport {
        let pick = |t: DocumentType| results.iter().find(|r| r.document_type == t);
        self.verify(ledger, pick(DocumentType::Primary), pick(DocumentType::Secondary))
    }

    /// Run every rule in order and fold the outcomes into a report
    ///
    /// 1. amount (ledger vs primary)
    /// 2. date (ledger, primary, secondary)
    /// 3. quantity (ledger vs primary), then the secondary gross-weight cross-check
    /// 4. trade term (ledger vs primary), then the secondary freight clause
    /// 5. extraction quality of the evidence itself
    pub fn verify(
        &self,
        ledger: &LedgerEntry,
        primary: Option<&ExtractionResult>,
        secondary: Option<&ExtractionResult>,
    ) -> VerificationReport {
        let evidence_count = primary.iter().count() + secondary.iter().count();

        let mut checks = vec![self.check_amount(ledger, primary), self.check_date(ledger, primary, secondary)];
        checks.push(self.check_quantity(ledger, primary));
        checks.extend(self.check_gross_weight(ledger, secondary));
        checks.push(self.check_trade_term(ledger, primary));
        checks.extend(self.check_freight_payment(ledger, primary, secondary));
        checks.extend(check_extraction_quality(primary, secondary));

        let report = VerificationReport::from_checks(&ledger.id, evidence_count, checks);
        debug!(
            ledger_id = %ledger.id,
            evidence_count,
            status = %report.overall_status,
            "Ledger entry verified"
        );
        report
    }

    fn check_amount(&self, ledger: &LedgerEntry, primary: Option<&ExtractionResult>) -> FieldCheck {
        let ledger_currency = ledger.currency.as_deref().and_then(currency_code);
        let ledger_value = ledger.amount.map(|a| render_amount(a, ledger_currency.as_deref()));
        let Some(primary) = primary else {
            return warn("amount", ledger_value, None, PRIMARY_MISSING);
        };
        let evidence = primary.canonical(FieldKind::Amount);
        let evidence_value = evidence.render();

        let (Some(expected), Some((found, found_currency))) = (ledger.amount, evidence.as_amount()) else {
            let note = if ledger.amount.is_none() { MISSING_LEDGER } else { MISSING_EVIDENCE };
            return warn("amount", ledger_value, evidence_value, note);
        };

        if let (Some(a), Some(b)) = (ledger_currency.as_deref(), found_currency) {
            if a != b {
                return FieldCheck::new("amount", Status::Fail)
                    .values(ledger_value, evidence_value)
                    .with_note(format!("currency mismatch: {} vs {}", a, b));
            }
        }

        if (expected - found).abs() <= self.config.amount_epsilon {
            FieldCheck::new("amount", Status::Pass).values(ledger_value, evidence_value)
        } else {
            FieldCheck::new("amount", Status::Fail)
                .values(ledger_value, evidence_value)
                .with_note(format!("difference {:.2}", found - expected))
        }
    }

    fn check_date(
        &self,
        ledger: &LedgerEntry,
        primary: Option<&ExtractionResult>,
        secondary: Option<&ExtractionResult>,
    ) -> FieldCheck {
        let ledger_date = ledger.date.as_deref().map(normalize_date);
        let ledger_iso = ledger_date.as_ref().and_then(|d| d.as_iso_date().map(str::to_string));

        let mut evidence = Vec::new();
        for (label, result) in [("primary", primary), ("secondary", secondary)] {
            if let Some(iso) = result.and_then(|r| r.canonical(FieldKind::Date).as_iso_date()) {
                evidence.push((label, iso.to_string()));
            }
        }
        let evidence_value = (!evidence.is_empty()).then(|| {
            evidence
                .iter()
                .map(|(label, date)| format!("{}={}", label, date))
                .collect::<Vec<_>>()
                .join(", ")
        });

        let mut dates: Vec<&str> = evidence.iter().map(|(_, d)| d.as_str()).collect();
        if let Some(iso) = ledger_iso.as_deref() {
            dates.insert(0, iso);
        }
        let ledger_value = ledger_iso.clone().or_else(|| ledger_date.and_then(|d| d.render()));

        if dates.len() < 2 {
            return warn("date", ledger_value, evidence_value, "insufficient data");
        }
        if dates.iter().all(|d| *d == dates[0]) {
            FieldCheck::new("date", Status::Pass)
                .values(ledger_value, evidence_value)
                .with_note(format!("{}-way agreement", dates.len()))
        } else {
            FieldCheck::new("date", Status::Fail)
                .values(ledger_value, evidence_value)
                .with_note("dates disagree")
        }
    }

    fn check_quantity(&self, ledger: &LedgerEntry, primary: Option<&ExtractionResult>) -> FieldCheck {
        let ledger_quantity = ledger_quantity(ledger);
        let ledger_value = ledger_quantity.render();
        let Some(primary) = primary else {
            return warn("quantity", ledger_value, None, PRIMARY_MISSING);
        };
        let evidence = primary.canonical(FieldKind::Quantity);
        let evidence_value = evidence.render();

        let (Some((expected, ledger_unit)), Some((found, found_unit))) =
            (ledger_quantity.as_quantity(), evidence.as_quantity())
        else {
            let note = if ledger.quantity.is_none() { MISSING_LEDGER } else { MISSING_EVIDENCE };
            return warn("quantity", ledger_value, evidence_value, note);
        };

        let Some(found) = in_unit(found, found_unit, ledger_unit) else {
            return warn(
                "quantity",
                ledger_value,
                evidence_value,
                format!(
                    "units not comparable: {} vs {}",
                    ledger_unit.unwrap_or("-"),
                    found_unit.unwrap_or("-")
                ),
            );
        };

        if (expected - found).abs() <= self.config.quantity_epsilon {
            FieldCheck::new("quantity", Status::Pass).values(ledger_value, evidence_value)
        } else {
            FieldCheck::new("quantity", Status::Fail)
                .values(ledger_value, evidence_value)
                .with_note(format!("difference {:.3}", found - expected))
        }
    }

    /// Transport-document gross weight against the ledger quantity; WARN at most
    fn check_gross_weight(&self, ledger: &LedgerEntry, secondary: Option<&ExtractionResult>) -> Option<FieldCheck> {
        let gross = secondary?.canonical(FieldKind::GrossWeight);
        let (weight, weight_unit) = gross.as_quantity()?;
        let ledger_quantity = ledger_quantity(ledger);
        let ledger_value = ledger_quantity.render();
        let evidence_value = gross.render();

        let Some((expected, ledger_unit)) = ledger_quantity.as_quantity() else {
            return Some(warn("secondary_weight", ledger_value, evidence_value, MISSING_LEDGER));
        };
        let (Some(expected_kg), Some(weight_kg)) = (
            ledger_unit.and_then(|u| mass_in_kg(expected, u)),
            weight_unit.and_then(|u| mass_in_kg(weight, u)),
        ) else {
            return Some(warn(
                "secondary_weight",
                ledger_value,
                evidence_value,
                "ledger quantity is not a mass",
            ));
        };

        let deviation = if expected_kg > 0.0 {
            (weight_kg - expected_kg).abs() / expected_kg
        } else {
            f64::INFINITY
        };
        Some(if deviation <= self.config.gross_weight_tolerance {
            FieldCheck::new("secondary_weight", Status::Pass).values(ledger_value, evidence_value)
        } else {
            warn(
                "secondary_weight",
                ledger_value,
                evidence_value,
                format!("gross weight deviates {:.1}% from ledger quantity", deviation * 100.0),
            )
        })
    }

    fn check_trade_term(&self, ledger: &LedgerEntry, primary: Option<&ExtractionResult>) -> FieldCheck {
        let ledger_code = ledger.trade_term.as_deref().and_then(trade_term_code);
        let Some(primary) = primary else {
            return warn("trade_term", ledger_code, None, PRIMARY_MISSING);
        };
        let evidence_code = primary.canonical(FieldKind::TradeTerm).as_code().map(str::to_string);

        match (&ledger_code, &evidence_code) {
            (Some(a), Some(b)) if a == b => FieldCheck::new("trade_term", Status::Pass).values(ledger_code, evidence_code),
            (Some(_), Some(_)) => FieldCheck::new("trade_term", Status::Fail)
                .values(ledger_code, evidence_code)
                .with_note("trade terms differ"),
            (None, _) => warn("trade_term", ledger_code, evidence_code, MISSING_LEDGER),
            (_, None) => warn("trade_term", ledger_code, evidence_code, MISSING_EVIDENCE),
        }
    }

    /// Freight clause on the transport document against the trade term's group
    fn check_freight_payment(
        &self,
        ledger: &LedgerEntry,
        primary: Option<&ExtractionResult>,
        secondary: Option<&ExtractionResult>,
    ) -> Option<FieldCheck> {
        if !self.config.check_freight_payment {
            return None;
        }
        let clause = secondary?.canonical(FieldKind::FreightPayment).as_code()?.to_string();
        let term = ledger
            .trade_term
            .as_deref()
            .and_then(trade_term_code)
            .or_else(|| primary.and_then(|p| p.canonical(FieldKind::TradeTerm).as_code().map(str::to_string)))?;
        let group = TradeTermGroup::of(&term)?;

        let expected = group.expected_freight_payment();
        let check = if clause == expected {
            FieldCheck::new("freight_payment", Status::Pass)
        } else {
            FieldCheck::new("freight_payment", Status::Warn)
                .with_note(format!("{} ({}) expects FREIGHT {}", term, group, expected))
        };
        Some(check.values(Some(term), Some(clause)))
    }
}

/// One WARN check naming every evidence result flagged for review
fn check_extraction_quality(
    primary: Option<&ExtractionResult>,
    secondary: Option<&ExtractionResult>,
) -> Option<FieldCheck> {
    let flagged: Vec<String> = [primary, secondary]
        .into_iter()
        .flatten()
        .filter(|r| r.needs_review)
        .map(|r| format!("{} ({}, confidence {})", r.document_type, r.tier.as_str(), r.overall_confidence))
        .collect();
    if flagged.is_empty() {
        return None;
    }
    Some(FieldCheck::new("extraction_quality", Status::Warn).with_note(format!("needs review: {}", flagged.join("; "))))
}

fn warn(rule: &str, ledger: Option<String>, evidence: Option<String>, note: impl Into<String>) -> FieldCheck {
    FieldCheck::new(rule, Status::Warn).values(ledger, evidence).with_note(note)
}

fn render_amount(value: f64, currency: Option<&str>) -> String {
    CanonicalValue::Amount { value, currency: currency.map(str::to_string) }
        .render()
        .unwrap_or_default()
}

/// Ledger quantity with its unit canonicalized the same way evidence units are
fn ledger_quantity(ledger: &LedgerEntry) -> CanonicalValue {
    match (ledger.quantity, ledger.unit.as_deref()) {
        (Some(value), Some(unit)) => match normalize_quantity(&format!("{} {}", value, unit)) {
            CanonicalValue::Quantity { unit, .. } => CanonicalValue::Quantity { value, unit },
            _ => CanonicalValue::Quantity { value, unit: None },
        },
        (Some(value), None) => CanonicalValue::Quantity { value, unit: None },
        (None, _) => CanonicalValue::Null,
    }
}

/// Express `value` (in `from`) in unit `to`
///
/// Same or unknown units compare as-is; different mass units convert through
/// kilograms. Anything else is not comparable.
fn in_unit(value: f64, from: Option<&str>, to: Option<&str>) -> Option<f64> {
    match (from, to) {
        (Some(a), Some(b)) if a != b => {
            let kg = mass_in_kg(value, a)?;
            let per_unit = mass_in_kg(1.0, b)?;
            Some(kg / per_unit)
        }
        _ => Some(value),
    }
}
