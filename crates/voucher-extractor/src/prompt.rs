//! Oracle request assembly

use voucher_domain::{CombinationHint, EvidenceDocument, FieldKind, LedgerEntry, OracleMode, OracleRequest};

/// Builds oracle requests for one evidence document
pub struct PromptBuilder<'a> {
    ledger: &'a LedgerEntry,
    document: &'a EvidenceDocument,
    text: String,
    hints: Vec<String>,
}

impl<'a> PromptBuilder<'a> {
    /// Create a builder over already preprocessed text
    pub fn new(ledger: &'a LedgerEntry, document: &'a EvidenceDocument, text: String) -> Self {
        Self {
            ledger,
            document,
            text,
            hints: Vec::new(),
        }
    }

    /// Add an N:1 hint for the amount, if a combination was found
    pub fn with_amount_hint(mut self, hint: Option<&CombinationHint>) -> Self {
        if let Some(line) = hint.and_then(|h| self.hint_line(FieldKind::Amount, h)) {
            self.hints.push(line);
        }
        self
    }

    /// Add an N:1 hint for the quantity, if a combination was found
    pub fn with_quantity_hint(mut self, hint: Option<&CombinationHint>) -> Self {
        if let Some(line) = hint.and_then(|h| self.hint_line(FieldKind::Quantity, h)) {
            self.hints.push(line);
        }
        self
    }

    /// Hint lines collected so far
    pub fn hints(&self) -> &[String] {
        &self.hints
    }

    /// The plain extraction request
    pub fn request(&self, mode: OracleMode) -> OracleRequest {
        self.build(mode, Some(EXTRACTION_INSTRUCTIONS.to_string()))
    }

    /// A stricter re-prompt naming the critical fields that came back empty
    pub fn strict_request(&self, mode: OracleMode, missing: &[FieldKind]) -> OracleRequest {
        let names: Vec<String> = missing
            .iter()
            .map(|kind| format!("{} ({})", kind.as_str(), kind.description()))
            .collect();
        let instructions = format!(
            "{}\n\n{}\n- {}",
            EXTRACTION_INSTRUCTIONS,
            STRICT_INSTRUCTIONS,
            names.join("\n- ")
        );
        self.build(mode, Some(instructions))
    }

    /// A re-prompt asking for the amount as the sum of the hinted line items
    pub fn sum_request(&self, mode: OracleMode, hint: &CombinationHint) -> OracleRequest {
        let combination = hint.describe().unwrap_or_default();
        let instructions = format!(
            "{}\n\n{}\nLine items that add up to the expected total: {}",
            EXTRACTION_INSTRUCTIONS, SUM_INSTRUCTIONS, combination
        );
        let mut request = self.build(mode, Some(instructions));
        request.fields = vec![FieldKind::Amount];
        request
    }

    fn build(&self, mode: OracleMode, instructions: Option<String>) -> OracleRequest {
        OracleRequest {
            ledger_id: self.ledger.id.clone(),
            document_type: self.document.document_type,
            mode,
            // Vision calls re-render the file; the text is not sent
            text: match mode {
                OracleMode::Text => self.text.clone(),
                OracleMode::Vision => String::new(),
            },
            file_ref: self.document.file_ref.clone(),
            fields: self.document.document_type.requested_fields().to_vec(),
            hints: self.hints.clone(),
            instructions,
        }
    }

    fn hint_line(&self, kind: FieldKind, hint: &CombinationHint) -> Option<String> {
        let combination = hint.describe()?;
        let suffix = match kind {
            FieldKind::Amount => self.ledger.currency.as_deref(),
            _ => self.ledger.unit.as_deref(),
        };
        let expected = match suffix {
            Some(s) => format!("{:.2} {}", hint.target, s),
            None => format!("{:.2}", hint.target),
        };
        Some(format!(
            "{}: expected {}; the document may split it across line items ({})",
            kind.as_str(),
            expected,
            combination
        ))
    }
}

const EXTRACTION_INSTRUCTIONS: &str = r#"Extract the requested fields from this trade document.

Rules:
- Copy each value as printed, including currency symbols, codes and units
- Use null when a field is not present; never guess
- Give every field a confidence between 0.0 and 1.0
- Report "unidentified" as the status if this is not a trade document
- Answer with a single JSON object:
  {"fields": {"<name>": {"value": "...", "confidence": 0.0}}, "overall_confidence": 0.0, "status": "identified", "notes": []}"#;

const STRICT_INSTRUCTIONS: &str = "The previous answer left required fields empty. \
Read the whole document again, including headers, footers and totals boxes, \
and return a value for each of these fields. Use null only if the value is certainly absent:";

const SUM_INSTRUCTIONS: &str = "The total reported for this document does not match the expected total. \
The total may be split across several line items. \
Return as the amount the sum of the relevant line items, with its currency.";
