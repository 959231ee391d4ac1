//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use voucher_domain::{
    CanonicalValue, CombinationHint, ExtractionResult, FieldKind, Status, VerificationReport,
};
use voucher_extractor::{BatchOutcome, BatchProgress};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format extraction results.
    pub fn format_results(&self, results: &[ExtractionResult]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(results)?),
            OutputFormat::Table => Ok(self.format_results_table(results)),
        }
    }

    fn format_results_table(&self, results: &[ExtractionResult]) -> String {
        if results.is_empty() {
            return self.colorize("No extraction results.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["Ledger", "Type", "File", "Tier", "Confidence", "Amount", "Date", "Review"]);

        for result in results {
            let confidence = format!("{:.2}", result.overall_confidence.value());
            let amount = result.canonical(FieldKind::Amount).render().unwrap_or_else(|| "-".into());
            let date = result.canonical(FieldKind::Date).render().unwrap_or_else(|| "-".into());
            let tier = match result.failure {
                Some(kind) => format!("{} ({})", result.tier.as_str(), kind),
                None => result.tier.as_str().to_string(),
            };
            builder.push_record([
                result.ledger_id.as_str(),
                result.document_type.as_str(),
                result.file_ref.as_str(),
                tier.as_str(),
                confidence.as_str(),
                amount.as_str(),
                date.as_str(),
                if result.needs_review { "yes" } else { "" },
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// Format a list of reports as a one-line-per-ledger summary.
    pub fn format_reports(&self, reports: &[VerificationReport]) -> Result<String> {
        if self.format == OutputFormat::Json {
            return Ok(serde_json::to_string_pretty(reports)?);
        }
        if reports.is_empty() {
            return Ok(self.colorize("No reports.", "yellow"));
        }

        let mut builder = Builder::default();
        builder.push_record(["Ledger", "Evidence", "Status", "Failed rules", "Warned rules"]);

        for report in reports {
            let evidence = report.evidence_count.to_string();
            let failed = rules_with(report, Status::Fail);
            let warned = rules_with(report, Status::Warn);
            builder.push_record([
                report.ledger_id.as_str(),
                evidence.as_str(),
                report.overall_status.as_str(),
                failed.as_str(),
                warned.as_str(),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        Ok(table.to_string())
    }

    /// Format one report with every rule outcome.
    pub fn format_report(&self, report: &VerificationReport) -> Result<String> {
        if self.format == OutputFormat::Json {
            return Ok(serde_json::to_string_pretty(report)?);
        }

        let mut builder = Builder::default();
        builder.push_record(["Rule", "Outcome", "Ledger", "Evidence", "Note"]);
        for check in &report.checks {
            builder.push_record([
                check.rule.as_str(),
                check.outcome.as_str(),
                check.ledger_value.as_deref().unwrap_or("-"),
                check.evidence_value.as_deref().unwrap_or("-"),
                check.note.as_deref().unwrap_or(""),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        Ok(format!(
            "{}: {}\n{}",
            report.ledger_id,
            self.status(report.overall_status),
            table
        ))
    }

    /// Format store-wide totals: reports per status and ledger ids flagged for review.
    pub fn store_summary(&self, counts: &[(Status, usize)], needs_review: &[String]) -> String {
        let totals: Vec<String> = counts
            .iter()
            .map(|(status, count)| format!("{} {}", self.status(*status), count))
            .collect();
        let mut lines = vec![self.info(&format!("Stored reports: {}", totals.join(", ")))];
        if !needs_review.is_empty() {
            lines.push(self.warning(&format!("Needs review: {}", needs_review.join(", "))));
        }
        lines.join("\n")
    }

    /// Format a subset-sum search result.
    pub fn format_hint(&self, hint: &CombinationHint) -> Result<String> {
        if self.format == OutputFormat::Json {
            return Ok(serde_json::to_string_pretty(hint)?);
        }
        Ok(match hint.describe() {
            Some(description) => self.success(&format!("Combination found: {}", description)),
            None => self.warning(&format!(
                "No combination of up to the allowed size adds up to {:.2} (tolerance {})",
                hint.target, hint.tolerance
            )),
        })
    }

    /// Format a normalized field value.
    pub fn format_canonical(&self, kind: FieldKind, raw: &str, value: &CanonicalValue) -> Result<String> {
        if self.format == OutputFormat::Json {
            let json = serde_json::json!({
                "kind": kind.as_str(),
                "raw": raw,
                "canonical": value,
            });
            return Ok(serde_json::to_string_pretty(&json)?);
        }
        Ok(match value.render() {
            Some(rendered) => format!("{} {} -> {}", kind, raw, self.colorize(&rendered, "cyan")),
            None => self.warning(&format!("{} '{}' did not normalize to a value", kind, raw)),
        })
    }

    /// Format the summary line of a finished batch.
    pub fn batch_summary(&self, outcome: &BatchOutcome) -> String {
        let message = format!(
            "Extracted {} document(s) for {} ledger entr{}: {} failed, {} need review",
            outcome.len(),
            outcome.ledger_ids().count(),
            if outcome.ledger_ids().count() == 1 { "y" } else { "ies" },
            outcome.failed(),
            outcome.needs_review()
        );
        if outcome.failed() > 0 || outcome.needs_review() > 0 {
            self.warning(&message)
        } else {
            self.success(&message)
        }
    }

    /// Format a progress line for a finished chunk.
    pub fn progress(&self, progress: &BatchProgress) -> String {
        self.info(&format!(
            "Chunk {}/{}: {}/{} documents done ({} failed)",
            progress.chunk_index, progress.chunk_count, progress.completed, progress.total, progress.failed
        ))
    }

    /// Format a status word in its color.
    pub fn status(&self, status: Status) -> String {
        let color = match status {
            Status::Pass => "green",
            Status::Warn => "yellow",
            Status::Fail => "red",
            Status::NeedsEvidence => "magenta",
        };
        self.colorize(status.as_str(), color)
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            "magenta" => text.magenta().to_string(),
            _ => text.to_string(),
        }
    }
}

fn rules_with(report: &VerificationReport, outcome: Status) -> String {
    report
        .checks
        .iter()
        .filter(|c| c.outcome == outcome)
        .map(|c| c.rule.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use voucher_domain::{DocumentType, FailureKind, FieldCheck};

    fn report() -> VerificationReport {
        VerificationReport::from_checks(
            "L-1",
            2,
            vec![
                FieldCheck::new("amount", Status::Pass).values(Some("1000 USD".into()), Some("1000 USD".into())),
                FieldCheck::new("date", Status::Fail)
                    .values(Some("2025-07-01".into()), Some("2025-07-02".into()))
                    .with_note("dates disagree"),
                FieldCheck::new("trade_term", Status::Warn).with_note("primary document missing"),
            ],
        )
    }

    #[test]
    fn test_results_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let results = vec![ExtractionResult::failed(
            "L-1",
            DocumentType::Primary,
            "inv.pdf",
            FailureKind::Network,
        )];
        let output = formatter.format_results(&results).unwrap();
        assert!(output.contains("Confidence"));
        assert!(output.contains("failed (network)"));
        assert!(output.contains("inv.pdf"));
    }

    #[test]
    fn test_empty_results() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_results(&[]).unwrap();
        assert!(output.contains("No extraction results"));
    }

    #[test]
    fn test_report_summary_lists_rules() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_reports(&[report()]).unwrap();
        assert!(output.contains("FAIL"));
        assert!(output.contains("trade_term"));
    }

    #[test]
    fn test_report_detail_and_json() {
        let table = Formatter::new(OutputFormat::Table, false).format_report(&report()).unwrap();
        assert!(table.starts_with("L-1: FAIL"));
        assert!(table.contains("dates disagree"));

        let json = Formatter::new(OutputFormat::Json, false).format_report(&report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["ledger_id"], "L-1");
    }

    #[test]
    fn test_store_summary() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let counts = [(Status::Pass, 3), (Status::Fail, 1)];
        let output = formatter.store_summary(&counts, &["L-2".to_string(), "L-7".to_string()]);
        assert_eq!(output, "ℹ Stored reports: PASS 3, FAIL 1\n⚠ Needs review: L-2, L-7");
        assert!(!formatter.store_summary(&counts, &[]).contains("Needs review"));
    }

    #[test]
    fn test_hint_messages() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let found = CombinationHint::found(1000.0, 0.05, vec![300.0, 700.0]).unwrap();
        assert_eq!(
            formatter.format_hint(&found).unwrap(),
            "✓ Combination found: 300.00 + 700.00 = 1000.00"
        );
        let none = formatter.format_hint(&CombinationHint::none(42.0, 0.05)).unwrap();
        assert!(none.starts_with("⚠"));
    }

    #[test]
    fn test_canonical_value() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let value = CanonicalValue::Code { value: "CIF".into() };
        let output = formatter.format_canonical(FieldKind::TradeTerm, "C.I.F", &value).unwrap();
        assert_eq!(output, "trade_term C.I.F -> CIF");
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("test"), "✓ test");
        assert_eq!(formatter.status(Status::NeedsEvidence), "NEEDS_EVIDENCE");
    }
}
