//! Ordered loader registry.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use modelfetch_core::{LoadError, LoadOptions, ModelFile, ModelFileLoader};

use crate::config::LoaderConfig;
use crate::error::HttpError;
use crate::github::GitHubModelFileLoader;
use crate::http_loader::HttpModelFileLoader;

/// Delegates to the first registered loader that accepts a URI.
///
/// Loaders are checked in registration order. Duplicates are allowed; an
/// earlier entry shadows a later identical one. The list can be changed at
/// runtime through a shared reference.
#[derive(Default)]
pub struct CompositeLoader {
    loaders: RwLock<Vec<Arc<dyn ModelFileLoader>>>,
}

impl CompositeLoader {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a loader.
    pub fn add(&self, loader: Arc<dyn ModelFileLoader>) {
        self.loaders
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(loader);
    }

    /// Remove every loader.
    pub fn clear(&self) {
        self.loaders
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of registered loaders.
    pub fn len(&self) -> usize {
        self.loaders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True if no loader is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Select the loader for `uri`.
    ///
    /// Fails with [`LoadError::UnsupportedUri`] before any load starts when
    /// no registered loader accepts the URI.
    pub fn dispatch(&self, uri: &str) -> Result<Arc<dyn ModelFileLoader>, LoadError> {
        self.loaders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|loader| loader.accepts(uri))
            .cloned()
            .ok_or_else(|| LoadError::unsupported(uri))
    }
}

#[async_trait]
impl ModelFileLoader for CompositeLoader {
    fn accepts(&self, uri: &str) -> bool {
        self.loaders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|loader| loader.accepts(uri))
    }

    async fn load(&self, uri: &str, options: &LoadOptions) -> Result<ModelFile, LoadError> {
        let loader = self.dispatch(uri)?;
        loader.load(uri, options).await
    }
}

/// Registry with the GitHub loader ahead of the HTTP(S) loader.
///
/// Both share one reqwest client.
pub fn default_model_file_loader(config: &LoaderConfig) -> Result<CompositeLoader, HttpError> {
    let http = HttpModelFileLoader::new(config)?;
    let github = GitHubModelFileLoader::with_http(http.clone(), config.github_raw_base.clone());

    let registry = CompositeLoader::new();
    registry.add(Arc::new(github));
    registry.add(Arc::new(http));
    Ok(registry)
}
