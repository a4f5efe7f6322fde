//! Queue and downloader configuration.

use std::time::Duration;

/// Default cap on distinct external URIs fetched by one resolution.
pub const DEFAULT_MAX_MODELS: usize = 1024;

/// Delays applied by a [`JobQueue`](crate::JobQueue).
///
/// The two delays are independent: `start_delay` lets a burst of initial
/// enqueues coalesce before the first job runs, `job_delay` throttles the
/// rate of consecutive jobs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueConfig {
    /// Wait before the first job added to an empty queue may start.
    pub(crate) start_delay: Duration,
    /// Wait between one job settling and the next starting.
    pub(crate) job_delay: Duration,
}

impl QueueConfig {
    /// No delays.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the start delay.
    #[must_use]
    pub const fn with_start_delay(mut self, delay: Duration) -> Self {
        self.start_delay = delay;
        self
    }

    /// Set the delay between jobs. Zero means "next tick".
    #[must_use]
    pub const fn with_job_delay(mut self, delay: Duration) -> Self {
        self.job_delay = delay;
        self
    }

    /// The start delay.
    pub const fn start_delay(&self) -> Duration {
        self.start_delay
    }

    /// The delay between jobs.
    pub const fn job_delay(&self) -> Duration {
        self.job_delay
    }
}

/// Configuration for a [`ModelDownloader`](crate::ModelDownloader).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloaderConfig {
    /// Delays for the per-call job queue.
    pub(crate) queue: QueueConfig,
    /// Maximum distinct URIs per call, `None` for unbounded.
    pub(crate) max_models: Option<usize>,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            queue: QueueConfig::default(),
            max_models: Some(DEFAULT_MAX_MODELS),
        }
    }
}

impl DownloaderConfig {
    /// Default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the queue configuration.
    #[must_use]
    pub fn with_queue(mut self, queue: QueueConfig) -> Self {
        self.queue = queue;
        self
    }

    /// Set the queue start delay.
    #[must_use]
    pub const fn with_start_delay(mut self, delay: Duration) -> Self {
        self.queue.start_delay = delay;
        self
    }

    /// Set the delay between fetches.
    #[must_use]
    pub const fn with_job_delay(mut self, delay: Duration) -> Self {
        self.queue.job_delay = delay;
        self
    }

    /// Set the closure size limit. `None` disables it.
    #[must_use]
    pub const fn with_max_models(mut self, max_models: Option<usize>) -> Self {
        self.max_models = max_models;
        self
    }

    /// The queue configuration.
    pub const fn queue(&self) -> &QueueConfig {
        &self.queue
    }

    /// The closure size limit.
    pub const fn max_models(&self) -> Option<usize> {
        self.max_models
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_defaults_have_no_delay() {
        let config = QueueConfig::new();
        assert_eq!(config.start_delay(), Duration::ZERO);
        assert_eq!(config.job_delay(), Duration::ZERO);
    }

    #[test]
    fn test_downloader_builder() {
        let config = DownloaderConfig::new()
            .with_start_delay(Duration::from_millis(300))
            .with_job_delay(Duration::from_millis(50))
            .with_max_models(None);

        assert_eq!(config.queue().start_delay(), Duration::from_millis(300));
        assert_eq!(config.queue().job_delay(), Duration::from_millis(50));
        assert_eq!(config.max_models(), None);
    }

    #[test]
    fn test_downloader_default_limit() {
        assert_eq!(
            DownloaderConfig::default().max_models(),
            Some(DEFAULT_MAX_MODELS)
        );
    }
}
