//! Root CLI parser and global options.

use clap::Parser;

use crate::commands::Commands;

/// Resolve external model imports.
#[derive(Debug, Parser)]
#[command(name = "modelfetch")]
#[command(about = "Download the external models imported by local model files")]
#[command(version)]
pub struct Cli {
    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_verbose_after_subcommand() {
        let cli = Cli::parse_from(["modelfetch", "resolve", "a.cto", "-v"]);
        assert!(cli.verbose);
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["modelfetch"]).is_err());
    }
}
