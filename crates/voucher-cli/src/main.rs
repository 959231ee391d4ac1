//! Voucher CLI - extract trade-document evidence and verify it against a ledger.

use clap::Parser;
use tracing_subscriber::EnvFilter;
use voucher_cli::commands;
use voucher_cli::{Cli, Command, Config, Formatter};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> voucher_cli::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load(cli.config.as_deref())?;

    let format = cli.format.map(Into::into).unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    let database = cli.database.clone().unwrap_or_else(|| config.store.path.clone());

    match cli.command {
        Command::Extract(args) => {
            commands::execute_extract(args, &config, &database, &formatter).await?;
        }
        Command::Verify(args) => {
            commands::execute_verify(args, &config, &database, &formatter)?;
        }
        Command::Match(args) => {
            commands::execute_match(args, &config, &formatter)?;
        }
        Command::Normalize(args) => {
            commands::execute_normalize(args, &formatter)?;
        }
        Command::Show(args) => {
            commands::execute_show(args, &database, &formatter)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
