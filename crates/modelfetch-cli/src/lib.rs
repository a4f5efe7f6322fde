//! `modelfetch` command-line interface.
//!
//! Reads local model files, resolves the closure of their external imports
//! with the default GitHub + HTTP(S) loader, and reports or saves the
//! fetched models.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

pub mod commands;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod parser;

pub use commands::{Commands, ResolveArgs};
pub use error::CliError;
pub use parser::Cli;

/// Dispatch a parsed command line.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Resolve(args) => handlers::resolve::execute(args).await?,
    }
    Ok(())
}
