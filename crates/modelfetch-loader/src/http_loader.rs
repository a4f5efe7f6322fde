//! HTTP(S) model file loader.

use std::sync::Arc;

use async_trait::async_trait;
use modelfetch_core::model::EXTERNAL_NAME_PREFIX;
use modelfetch_core::{LoadError, LoadOptions, ModelFile, ModelFileLoader};
use url::Url;

use crate::config::LoaderConfig;
use crate::error::HttpError;
use crate::http::{HttpBackend, ReqwestBackend};

/// Loads model files from `http://` and `https://` URIs.
///
/// The fetched file is named `@<host><path>` with `/` replaced by `.`, so
/// `https://models.example.com/org/base.cto` becomes
/// `@models.example.com.org.base.cto` and is flagged as external.
pub struct HttpModelFileLoader<B: HttpBackend = ReqwestBackend> {
    backend: Arc<B>,
}

impl<B: HttpBackend> Clone for HttpModelFileLoader<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
        }
    }
}

impl HttpModelFileLoader {
    /// Create a loader backed by reqwest.
    pub fn new(config: &LoaderConfig) -> Result<Self, HttpError> {
        Ok(Self::with_backend(ReqwestBackend::new(config)?))
    }
}

impl<B: HttpBackend> HttpModelFileLoader<B> {
    /// Create a loader with a custom backend.
    pub fn with_backend(backend: B) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }
}

/// Synthetic name for a model fetched from `url`.
pub fn external_name(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    let port = url.port().map(|p| format!(":{p}")).unwrap_or_default();
    format!(
        "{EXTERNAL_NAME_PREFIX}{host}{port}{}",
        url.path().replace('/', ".")
    )
}

#[async_trait]
impl<B: HttpBackend> ModelFileLoader for HttpModelFileLoader<B> {
    fn accepts(&self, uri: &str) -> bool {
        uri.starts_with("http://") || uri.starts_with("https://")
    }

    async fn load(&self, uri: &str, options: &LoadOptions) -> Result<ModelFile, LoadError> {
        let url = Url::parse(uri).map_err(|e| HttpError::from(e).into_load_error(uri))?;

        tracing::debug!(target: "modelfetch.loader", uri, "Fetching model file");
        let text = self
            .backend
            .get_text(&url, options)
            .await
            .map_err(|e| e.into_load_error(uri))?;

        let name = external_name(&url);
        tracing::debug!(
            target: "modelfetch.loader",
            uri,
            name = %name,
            bytes = text.len(),
            "Fetched model file"
        );

        ModelFile::new(text, Some(name)).map_err(|source| LoadError::InvalidModel {
            uri: uri.to_string(),
            source,
        })
    }
}
