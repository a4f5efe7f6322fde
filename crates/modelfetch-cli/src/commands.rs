//! Subcommands and their arguments.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use modelfetch_download::DEFAULT_MAX_MODELS;

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Download the transitive closure of external imports of local model files
    Resolve(ResolveArgs),
}

/// Arguments of `modelfetch resolve`.
#[derive(Debug, Clone, Args)]
pub struct ResolveArgs {
    /// Local model files (.cto)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Wait before the first download starts, in milliseconds
    #[arg(long, default_value_t = 0)]
    pub start_delay_ms: u64,

    /// Wait between consecutive downloads, in milliseconds
    #[arg(long, default_value_t = 0)]
    pub job_delay_ms: u64,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Extra request header as NAME=VALUE (repeatable)
    #[arg(long = "header", value_name = "NAME=VALUE", value_parser = parse_key_value)]
    pub headers: Vec<(String, String)>,

    /// Bearer token sent with every request
    #[arg(long, env = "MODELFETCH_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Maximum number of distinct external models, 0 for no limit
    #[arg(long, default_value_t = DEFAULT_MAX_MODELS)]
    pub max_models: usize,

    /// Write every downloaded model into this directory
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Fail unless every import resolves within the local and downloaded models
    #[arg(long)]
    pub check_imports: bool,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got '{raw}'")),
    }
}
