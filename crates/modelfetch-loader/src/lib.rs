//! Model file loaders for modelfetch.
//!
//! - [`HttpModelFileLoader`] fetches `http://` and `https://` URIs as text
//! - [`GitHubModelFileLoader`] rewrites `github://` URIs to raw content URLs
//! - [`CompositeLoader`] delegates to the first registered loader that
//!   accepts a URI
//!
//! [`default_model_file_loader`] wires the GitHub loader ahead of the HTTP
//! loader, which is the configuration the downloader uses by default.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

mod composite;
mod config;
mod error;
mod github;
mod http;
mod http_loader;

// ============================================================================
// Public API
// ============================================================================

pub use composite::{CompositeLoader, default_model_file_loader};
pub use config::LoaderConfig;
pub use error::HttpError;
pub use github::{GITHUB_SCHEME, GitHubModelFileLoader};
pub use http::{HttpBackend, ReqwestBackend};
pub use http_loader::{HttpModelFileLoader, external_name};
