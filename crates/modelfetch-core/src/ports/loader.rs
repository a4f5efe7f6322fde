//! Model file loader port.

use async_trait::async_trait;

use crate::error::LoadError;
use crate::model::ModelFile;
use crate::options::LoadOptions;

/// Fetches model files for URIs of a particular scheme or pattern.
///
/// Implementations are selected by [`accepts`](Self::accepts); callers must
/// only call [`load`](Self::load) for URIs the loader accepts.
#[async_trait]
pub trait ModelFileLoader: Send + Sync {
    /// Whether this loader can fetch `uri`.
    fn accepts(&self, uri: &str) -> bool;

    /// Fetch `uri` and build a model file from it.
    async fn load(&self, uri: &str, options: &LoadOptions) -> Result<ModelFile, LoadError>;
}
