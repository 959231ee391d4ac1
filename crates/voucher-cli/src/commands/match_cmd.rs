//! Match command implementation.

use crate::cli::MatchArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::fs;
use voucher_extractor::{find_combination, MatchParams};

/// Execute the match command.
pub fn execute_match(args: MatchArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    if !(args.target.is_finite() && args.target > 0.0) {
        return Err(CliError::InvalidInput(format!(
            "target must be a positive number, got {}",
            args.target
        )));
    }

    let params = MatchParams {
        tolerance: args.tolerance.unwrap_or(config.extractor.match_tolerance),
        max_size: args.max_size.unwrap_or(config.extractor.max_combination_size),
        pool_cap: config.extractor.candidate_pool_cap,
    };
    if params.tolerance < 0.0 || params.max_size == 0 {
        return Err(CliError::InvalidInput(
            "tolerance must be non-negative and max size at least 1".into(),
        ));
    }

    let text = fs::read_to_string(&args.text)?;
    let hint = find_combination(&text, args.target, &params);

    println!("{}", formatter.format_hint(&hint)?);
    Ok(())
}
