//! Transitive external model resolution.
//!
//! - [`JobQueue`] - a strictly serial, delay-tunable job runner with
//!   lifecycle events and a pluggable [`JobRunner`]
//! - [`ModelDownloader`] - drives a job queue to fetch the closure of
//!   external imports of a set of model files, exactly once per URI
//!
//! # Example
//!
//! ```no_run
//! use modelfetch_core::{LoadOptions, ModelFile};
//! use modelfetch_download::ModelDownloader;
//! use modelfetch_loader::LoaderConfig;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let local = ModelFile::new(
//!     "namespace org.acme\nimport org.base.* from github://acme/models/base.cto",
//!     Some("acme.cto".to_string()),
//! )?;
//! let downloader = ModelDownloader::with_default_loader(&LoaderConfig::default())?;
//! let fetched = downloader
//!     .download_external_dependencies(&[local], LoadOptions::default())
//!     .await?;
//! for model in &fetched {
//!     println!("{} {}", model.namespace(), model.name().unwrap_or_default());
//! }
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

mod config;
mod downloader;
mod queue;

pub use config::{DEFAULT_MAX_MODELS, DownloaderConfig, QueueConfig};
pub use downloader::{FetchJob, FetchRunner, ModelDownloader};
pub use queue::{JobQueue, JobRunner};

// Re-export core types for convenience
pub use modelfetch_core::{
    DownloadError, LoadError, LoadOptions, ModelFile, ModelSet, QueueError, QueueEvent,
    QueueEventSink,
};

// Used by the integration tests only
#[cfg(test)]
use url as _;
