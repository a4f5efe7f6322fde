//! External model downloader.
//!
//! Each call to [`ModelDownloader::download_external_dependencies`] gets its
//! own job queue and resolution context:
//!
//! 1. The external import URIs of the input models seed the queue
//! 2. Each job loads one URI and enqueues the imports of the fetched model
//!    that the call has not seen yet
//! 3. The call settles on the first queue error, or when a job finishes and
//!    leaves the queue empty

mod job;
mod signal;

use std::sync::Arc;

use indexmap::IndexSet;
use modelfetch_core::{
    DownloadError, LoadOptions, ModelFile, ModelFileLoader, ModelSet, ModelValidator,
    QueueEventSink,
};
use modelfetch_loader::{HttpError, LoaderConfig, default_model_file_loader};

use crate::config::DownloaderConfig;
use crate::queue::{JobQueue, WeakJobQueue};

pub use job::{FetchJob, FetchRunner};

use job::ResolutionContext;
use signal::CompletionSignal;

/// Stops an unfinished call's queue when the call ends, including when its
/// future is dropped.
struct AbortOnDrop {
    queue: WeakJobQueue<FetchRunner>,
    context: Arc<ResolutionContext>,
}

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.context.abort();
        if let Some(queue) = self.queue.upgrade() {
            queue.clear();
        }
    }
}

/// Fetches the transitive closure of external model imports.
///
/// Every URI is fetched at most once per call, one at a time. Calls are
/// independent: they share the loader but nothing else.
pub struct ModelDownloader {
    loader: Arc<dyn ModelFileLoader>,
    config: DownloaderConfig,
    observer: Option<Arc<dyn QueueEventSink<FetchJob>>>,
}

impl ModelDownloader {
    /// Create a downloader with the default configuration.
    pub fn new(loader: Arc<dyn ModelFileLoader>) -> Self {
        Self {
            loader,
            config: DownloaderConfig::default(),
            observer: None,
        }
    }

    /// Create a downloader using the default GitHub + HTTP(S) loader.
    pub fn with_default_loader(config: &LoaderConfig) -> Result<Self, HttpError> {
        Ok(Self::new(Arc::new(default_model_file_loader(config)?)))
    }

    /// Replace the configuration.
    #[must_use]
    pub fn with_config(mut self, config: DownloaderConfig) -> Self {
        self.config = config;
        self
    }

    /// Receive every queue event of every call.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn QueueEventSink<FetchJob>>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// The configuration.
    pub const fn config(&self) -> &DownloaderConfig {
        &self.config
    }

    /// Download every model reachable through the external imports of
    /// `models`.
    ///
    /// Returns the fetched models in completion order. Input models are not
    /// part of the result. `options` is forwarded to every load.
    ///
    /// # Errors
    ///
    /// [`DownloadError::Failed`] with the first error of the closure; no
    /// partial result is returned. A future polled outside a tokio runtime
    /// fails the same way with `QueueError::NoRuntime`.
    /// [`DownloadError::Interrupted`] if the queue stopped without settling
    /// the call.
    pub async fn download_external_dependencies(
        &self,
        models: &[ModelFile],
        options: LoadOptions,
    ) -> Result<Vec<ModelFile>, DownloadError> {
        let uris: IndexSet<String> = models
            .iter()
            .flat_map(|model| model.external_imports().values().cloned())
            .collect();

        if uris.is_empty() {
            tracing::debug!(target: "modelfetch.download", models = models.len(), "No external imports");
            return Ok(Vec::new());
        }

        tracing::info!(
            target: "modelfetch.download",
            models = models.len(),
            seeds = uris.len(),
            "Resolving external models"
        );

        let context = Arc::new(ResolutionContext::new(self.config.max_models()));
        let options = Arc::new(options);
        let seed_failure = |e| DownloadError::failed(e, uris.iter().cloned().collect());
        let jobs = uris
            .iter()
            .map(|uri| {
                context
                    .mark_seen(uri)
                    .map(|_| FetchJob::new(uri.as_str(), Arc::clone(&options), Arc::clone(&context)))
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(seed_failure)?;

        let (signal, rx) = CompletionSignal::new(Arc::clone(&context), self.observer.clone());
        let queue = JobQueue::with_sink(
            FetchRunner::new(Arc::clone(&self.loader)),
            self.config.queue().clone(),
            Arc::new(signal),
        )
        .map_err(seed_failure)?;
        let _guard = AbortOnDrop {
            queue: queue.downgrade(),
            context: Arc::clone(&context),
        };

        queue.add_jobs(jobs);
        // the worker owns the queue from here
        drop(queue);

        match rx.await {
            Ok(Ok(())) => {
                let results = context.take_results();
                tracing::info!(target: "modelfetch.download", fetched = results.len(), "External models resolved");
                Ok(results)
            }
            Ok(Err(error)) => {
                tracing::warn!(target: "modelfetch.download", %error, "External model resolution failed");
                Err(error)
            }
            Err(_) => {
                tracing::warn!(target: "modelfetch.download", "Job queue stopped before settling");
                Err(DownloadError::Interrupted)
            }
        }
    }

    /// Download the closure of `set` and merge it into `set`.
    ///
    /// Fetched models are added, or replace the model with the same
    /// namespace, then `validator` checks the whole set. On any failure
    /// `set` is left unchanged. Returns the number of namespaces applied.
    pub async fn update_external_models(
        &self,
        set: &mut ModelSet,
        options: LoadOptions,
        validator: &dyn ModelValidator,
    ) -> Result<usize, DownloadError> {
        let fetched = self
            .download_external_dependencies(&set.model_files(), options)
            .await?;
        Ok(set.apply_external(fetched, validator)?)
    }
}
