//! GitHub shorthand loader.

use async_trait::async_trait;
use modelfetch_core::{LoadError, LoadOptions, ModelFile, ModelFileLoader};

use crate::config::{DEFAULT_GITHUB_RAW_BASE, LoaderConfig};
use crate::error::HttpError;
use crate::http::{HttpBackend, ReqwestBackend};
use crate::http_loader::HttpModelFileLoader;

/// URI scheme handled by [`GitHubModelFileLoader`].
pub const GITHUB_SCHEME: &str = "github://";

/// Loads `github://org/repo/path` by fetching the raw content URL.
///
/// Everything after the scheme is appended to the raw content base and the
/// request is delegated to the HTTP loader with the same options.
pub struct GitHubModelFileLoader<B: HttpBackend = ReqwestBackend> {
    http: HttpModelFileLoader<B>,
    raw_base: String,
}

impl GitHubModelFileLoader {
    /// Create a loader backed by reqwest.
    pub fn new(config: &LoaderConfig) -> Result<Self, HttpError> {
        Ok(Self::with_http(
            HttpModelFileLoader::new(config)?,
            config.github_raw_base.clone(),
        ))
    }
}

impl<B: HttpBackend> GitHubModelFileLoader<B> {
    /// Create a loader delegating to an existing HTTP loader.
    pub fn with_http(http: HttpModelFileLoader<B>, raw_base: impl Into<String>) -> Self {
        Self {
            http,
            raw_base: raw_base.into(),
        }
    }

    /// Create a loader using the public raw content host.
    pub fn with_default_base(http: HttpModelFileLoader<B>) -> Self {
        Self::with_http(http, DEFAULT_GITHUB_RAW_BASE)
    }

    /// The HTTP URL a `github://` URI is fetched from.
    pub fn rewrite(&self, uri: &str) -> Option<String> {
        uri.strip_prefix(GITHUB_SCHEME)
            .map(|rest| format!("{}{rest}", self.raw_base))
    }
}

#[async_trait]
impl<B: HttpBackend> ModelFileLoader for GitHubModelFileLoader<B> {
    fn accepts(&self, uri: &str) -> bool {
        uri.starts_with(GITHUB_SCHEME)
    }

    async fn load(&self, uri: &str, options: &LoadOptions) -> Result<ModelFile, LoadError> {
        let target = self
            .rewrite(uri)
            .ok_or_else(|| LoadError::unsupported(uri))?;
        tracing::debug!(target: "modelfetch.loader", uri, %target, "Rewrote GitHub URI");
        self.http.load(&target, options).await
    }
}
