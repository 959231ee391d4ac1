//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use voucher_domain::FieldKind;

/// Voucher CLI - Extract and verify trade-document evidence against a ledger.
#[derive(Debug, Parser)]
#[command(name = "voucher")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path (default: ~/.voucher/config.toml)
    #[arg(short, long, global = true, env = "VOUCHER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Result database path, overriding the configured one
    #[arg(long, global = true, env = "VOUCHER_DB")]
    pub database: Option<PathBuf>,

    /// Verbose logging (debug level unless RUST_LOG is set)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract evidence documents and store the results
    Extract(ExtractArgs),

    /// Verify stored results against the ledger
    Verify(VerifyArgs),

    /// Search a text for numbers that add up to a total
    Match(MatchArgs),

    /// Normalize one raw field value
    Normalize(NormalizeArgs),

    /// Show stored results and report for a ledger entry
    Show(ShowArgs),
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// JSON file with an array of ledger entries
    #[arg(short, long)]
    pub ledger: PathBuf,

    /// JSON file with an array of evidence documents
    #[arg(short, long)]
    pub documents: PathBuf,

    /// Only process these ledger ids (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub ids: Option<Vec<String>>,
}

/// Arguments for the verify command.
#[derive(Debug, Parser)]
pub struct VerifyArgs {
    /// JSON file with an array of ledger entries
    #[arg(short, long)]
    pub ledger: PathBuf,

    /// Only verify these ledger ids (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub ids: Option<Vec<String>>,
}

/// Arguments for the match command.
#[derive(Debug, Parser)]
pub struct MatchArgs {
    /// Text file to search
    #[arg(short, long)]
    pub text: PathBuf,

    /// Expected total
    #[arg(long)]
    pub target: f64,

    /// Accepted absolute deviation (default from config)
    #[arg(long)]
    pub tolerance: Option<f64>,

    /// Largest combination size (default from config)
    #[arg(long)]
    pub max_size: Option<usize>,
}

/// Arguments for the normalize command.
#[derive(Debug, Parser)]
pub struct NormalizeArgs {
    /// Field kind
    #[arg(value_enum)]
    pub kind: FieldKindArg,

    /// Raw value, e.g. "1,234.56USD"
    pub raw: String,
}

/// Arguments for the show command.
#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// Ledger entry id
    pub ledger_id: String,
}

/// Field kind argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum FieldKindArg {
    /// Amount with currency
    Amount,
    /// Quantity with unit
    Quantity,
    /// Date
    Date,
    /// Incoterm
    TradeTerm,
    /// Gross weight
    GrossWeight,
    /// Freight payment clause
    FreightPayment,
    /// Document number
    DocumentNumber,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}

impl From<FieldKindArg> for FieldKind {
    fn from(kind: FieldKindArg) -> Self {
        match kind {
            FieldKindArg::Amount => FieldKind::Amount,
            FieldKindArg::Quantity => FieldKind::Quantity,
            FieldKindArg::Date => FieldKind::Date,
            FieldKindArg::TradeTerm => FieldKind::TradeTerm,
            FieldKindArg::GrossWeight => FieldKind::GrossWeight,
            FieldKindArg::FreightPayment => FieldKind::FreightPayment,
            FieldKindArg::DocumentNumber => FieldKind::DocumentNumber,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_ids_split_on_commas() {
        let cli = Cli::try_parse_from([
            "voucher", "extract", "--ledger", "ledger.json", "--documents", "docs.json", "--ids", "L-1,L-2",
        ])
        .unwrap();
        match cli.command {
            Command::Extract(args) => {
                assert_eq!(args.ids, Some(vec!["L-1".to_string(), "L-2".to_string()]));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_normalize_kind_value_enum() {
        let cli = Cli::try_parse_from(["voucher", "normalize", "trade-term", "C.I.F Hamburg"]).unwrap();
        match cli.command {
            Command::Normalize(args) => {
                assert_eq!(FieldKind::from(args.kind), FieldKind::TradeTerm);
                assert_eq!(args.raw, "C.I.F Hamburg");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from(["voucher", "show", "L-1", "-v", "--format", "json"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.format, Some(CliFormat::Json)));
    }
}
