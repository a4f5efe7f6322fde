//! `modelfetch` entry point.

use clap::Parser;

use modelfetch_cli::{Cli, CliError, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(err) = modelfetch_cli::run(cli).await {
        eprintln!("Error: {err:#}");
        let code = err.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
        std::process::exit(code);
    }
    Ok(())
}
