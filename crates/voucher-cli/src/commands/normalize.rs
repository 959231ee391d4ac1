//! Normalize command implementation.

use crate::cli::NormalizeArgs;
use crate::error::Result;
use crate::output::Formatter;
use voucher_domain::FieldKind;

/// Execute the normalize command.
pub fn execute_normalize(args: NormalizeArgs, formatter: &Formatter) -> Result<()> {
    let kind = FieldKind::from(args.kind);
    let value = voucher_normalize::normalize(kind, &args.raw);
    println!("{}", formatter.format_canonical(kind, &args.raw, &value)?);
    Ok(())
}
