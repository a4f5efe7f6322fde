//! Fetch jobs and the per-call resolution context.

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use modelfetch_core::{LoadOptions, ModelFile, ModelFileLoader, QueueError};

use crate::queue::{JobQueue, JobRunner};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// State shared by every job spawned from one download call.
#[derive(Debug)]
pub(crate) struct ResolutionContext {
    seen: Mutex<HashSet<String>>,
    results: Mutex<Vec<ModelFile>>,
    aborted: AtomicBool,
    max_models: Option<usize>,
}

impl ResolutionContext {
    pub fn new(max_models: Option<usize>) -> Self {
        Self {
            seen: Mutex::new(HashSet::new()),
            results: Mutex::new(Vec::new()),
            aborted: AtomicBool::new(false),
            max_models,
        }
    }

    /// Record `uri` as discovered. Returns false if it was already seen.
    pub fn mark_seen(&self, uri: &str) -> Result<bool, QueueError> {
        let mut seen = lock(&self.seen);
        if seen.contains(uri) {
            return Ok(false);
        }
        if let Some(limit) = self.max_models {
            if seen.len() >= limit {
                return Err(QueueError::LimitExceeded { limit });
            }
        }
        seen.insert(uri.to_string());
        Ok(true)
    }

    pub fn push_result(&self, model: ModelFile) {
        lock(&self.results).push(model);
    }

    pub fn take_results(&self) -> Vec<ModelFile> {
        std::mem::take(&mut *lock(&self.results))
    }

    /// Stop fetching: queued jobs of this call become no-ops.
    pub fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }
}

/// Queue payload: one URI to fetch on behalf of one download call.
#[derive(Clone)]
pub struct FetchJob {
    uri: String,
    options: Arc<LoadOptions>,
    context: Arc<ResolutionContext>,
}

impl FetchJob {
    pub(crate) fn new(
        uri: impl Into<String>,
        options: Arc<LoadOptions>,
        context: Arc<ResolutionContext>,
    ) -> Self {
        Self {
            uri: uri.into(),
            options,
            context,
        }
    }

    /// A job for `uri` in the same call, with the same options.
    fn child(&self, uri: &str) -> Self {
        Self::new(uri, Arc::clone(&self.options), Arc::clone(&self.context))
    }

    /// URI this job fetches.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Load options forwarded to the loader.
    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    pub(crate) fn context(&self) -> &ResolutionContext {
        &self.context
    }
}

impl fmt::Debug for FetchJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchJob").field("uri", &self.uri).finish_non_exhaustive()
    }
}

/// Runs [`FetchJob`]s: load the URI, keep the result, enqueue unseen imports.
pub struct FetchRunner {
    loader: Arc<dyn ModelFileLoader>,
}

impl FetchRunner {
    /// Create a runner loading through `loader`.
    pub fn new(loader: Arc<dyn ModelFileLoader>) -> Self {
        Self { loader }
    }
}

#[async_trait]
impl JobRunner for FetchRunner {
    type Payload = FetchJob;

    async fn run_job(&self, job: FetchJob, queue: &JobQueue<Self>) -> Result<(), QueueError> {
        let context = job.context();
        if context.is_aborted() {
            tracing::debug!(target: "modelfetch.download", uri = job.uri(), "Skipping job of aborted download");
            return Ok(());
        }

        let model = self.loader.load(job.uri(), job.options()).await?;
        tracing::debug!(
            target: "modelfetch.download",
            uri = job.uri(),
            namespace = model.namespace(),
            imports = model.external_imports().len(),
            "Downloaded model file"
        );

        let imports: Vec<String> = model.external_imports().values().cloned().collect();
        context.push_result(model);

        for uri in imports {
            if context.is_aborted() {
                break;
            }
            if context.mark_seen(&uri)? {
                tracing::debug!(target: "modelfetch.download", uri = %uri, parent = job.uri(), "Discovered import");
                queue.add_job(job.child(&uri));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(text: &str) -> ModelFile {
        ModelFile::new(text, None).unwrap()
    }

    #[test]
    fn test_mark_seen_once() {
        let context = ResolutionContext::new(None);
        assert_eq!(context.mark_seen("https://a"), Ok(true));
        assert_eq!(context.mark_seen("https://a"), Ok(false));
        assert_eq!(context.mark_seen("https://b"), Ok(true));
    }

    #[test]
    fn test_mark_seen_limit() {
        let context = ResolutionContext::new(Some(2));
        assert_eq!(context.mark_seen("https://a"), Ok(true));
        assert_eq!(context.mark_seen("https://b"), Ok(true));
        // known URIs never count against the limit
        assert_eq!(context.mark_seen("https://a"), Ok(false));
        assert_eq!(
            context.mark_seen("https://c"),
            Err(QueueError::LimitExceeded { limit: 2 })
        );
    }

    #[test]
    fn test_results_kept_in_push_order() {
        let context = ResolutionContext::new(None);
        context.push_result(model("namespace org.b"));
        context.push_result(model("namespace org.a"));

        let namespaces: Vec<String> = context
            .take_results()
            .iter()
            .map(|m| m.namespace().to_string())
            .collect();
        assert_eq!(namespaces, vec!["org.b", "org.a"]);
        assert!(context.take_results().is_empty());
    }

    #[test]
    fn test_child_shares_context_and_options() {
        let context = Arc::new(ResolutionContext::new(None));
        let options = Arc::new(LoadOptions::new().with_header("x-api-key", "k"));
        let parent = FetchJob::new("https://a", Arc::clone(&options), Arc::clone(&context));

        let child = parent.child("https://b");
        assert_eq!(child.uri(), "https://b");
        assert!(Arc::ptr_eq(&child.context, &context));
        assert!(Arc::ptr_eq(&child.options, &options));
    }

    #[test]
    fn test_debug_shows_uri_only() {
        let job = FetchJob::new(
            "https://a",
            Arc::new(LoadOptions::new().with_bearer_token("secret")),
            Arc::new(ResolutionContext::new(None)),
        );
        let debug = format!("{job:?}");
        assert!(debug.contains("https://a"));
        assert!(!debug.contains("secret"));
    }
}
