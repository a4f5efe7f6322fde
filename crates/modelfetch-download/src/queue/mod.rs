//! Serial job queue.
//!
//! A [`JobQueue`] runs at most one job at a time, in FIFO order, with two
//! independent delays (see [`QueueConfig`]). What a job does is supplied by
//! a [`JobRunner`]; lifecycle events go to a [`QueueEventSink`].
//!
//! # Concurrency Model
//!
//! - One worker task per queue, spawned on demand and exiting when the
//!   queue is empty
//! - The state lock is never held across an await
//! - A job stays listed until its run settles, then is removed before the
//!   next one is considered

mod state;

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use async_trait::async_trait;
use modelfetch_core::{NoopQueueSink, QueueError, QueueEvent, QueueEventSink};
use tokio::runtime::Handle;
use tokio::time::Instant;

use crate::config::QueueConfig;

use state::{QueueState, Step};

/// Executes queued jobs.
///
/// The default `run_job` always fails with [`QueueError::NotSpecialized`];
/// implementors override it.
#[async_trait]
pub trait JobRunner: Send + Sync + Sized + 'static {
    /// The job payload.
    type Payload: Clone + fmt::Debug + Send + Sync + 'static;

    /// Run one job. `queue` is the queue running it, for enqueueing follow-up jobs.
    async fn run_job(&self, payload: Self::Payload, queue: &JobQueue<Self>) -> Result<(), QueueError> {
        let _ = (payload, queue);
        Err(QueueError::NotSpecialized)
    }
}

struct Inner<R: JobRunner> {
    runner: R,
    config: QueueConfig,
    sink: Arc<dyn QueueEventSink<R::Payload>>,
    runtime: Handle,
    state: Mutex<QueueState<R::Payload>>,
}

impl<R: JobRunner> Inner<R> {
    fn lock(&self) -> MutexGuard<'_, QueueState<R::Payload>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A strictly serial, delay-tunable job queue.
///
/// Cloning yields another handle to the same queue. Jobs run on the tokio
/// runtime the queue was created in.
pub struct JobQueue<R: JobRunner> {
    inner: Arc<Inner<R>>,
}

impl<R: JobRunner> Clone for JobQueue<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: JobRunner> fmt::Debug for JobQueue<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobQueue").finish_non_exhaustive()
    }
}

/// A handle that does not keep the queue (and its sink) alive.
pub(crate) struct WeakJobQueue<R: JobRunner> {
    inner: Weak<Inner<R>>,
}

impl<R: JobRunner> WeakJobQueue<R> {
    pub fn upgrade(&self) -> Option<JobQueue<R>> {
        self.inner.upgrade().map(|inner| JobQueue { inner })
    }
}

impl<R: JobRunner> JobQueue<R> {
    /// Create a queue that discards its events.
    ///
    /// # Errors
    ///
    /// [`QueueError::NoRuntime`] when called outside a tokio runtime.
    pub fn new(runner: R, config: QueueConfig) -> Result<Self, QueueError> {
        Self::with_sink(runner, config, Arc::new(NoopQueueSink::new()))
    }

    /// Create a queue reporting events to `sink`.
    ///
    /// The worker is spawned on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// [`QueueError::NoRuntime`] when called outside a tokio runtime.
    pub fn with_sink(
        runner: R,
        config: QueueConfig,
        sink: Arc<dyn QueueEventSink<R::Payload>>,
    ) -> Result<Self, QueueError> {
        let runtime = Handle::try_current().map_err(|e| QueueError::NoRuntime(e.to_string()))?;
        Ok(Self {
            inner: Arc::new(Inner {
                runner,
                config,
                sink,
                runtime,
                state: Mutex::new(QueueState::new()),
            }),
        })
    }

    /// The job runner.
    pub fn runner(&self) -> &R {
        &self.inner.runner
    }

    pub(crate) fn downgrade(&self) -> WeakJobQueue<R> {
        WeakJobQueue {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Append a job and make sure it will be processed.
    pub fn add_job(&self, payload: R::Payload) {
        self.add_jobs([payload]);
    }

    /// Append several jobs atomically, in order.
    ///
    /// No job in the batch starts before the whole batch is queued.
    pub fn add_jobs(&self, payloads: impl IntoIterator<Item = R::Payload>) {
        let now = Instant::now();
        let mut added = Vec::new();
        let mut spawn = false;
        {
            let mut state = self.inner.lock();
            for payload in payloads {
                spawn |= state.push(payload.clone(), self.inner.config.start_delay, now);
                added.push((payload, state.snapshot()));
            }
        }

        for (job, queue) in added {
            tracing::debug!(
                target: "modelfetch.queue",
                job = ?job,
                queued = queue.len(),
                "Job added"
            );
            self.inner.sink.emit(QueueEvent::JobAdd { job, queue });
        }

        if spawn {
            let queue = self.clone();
            self.inner.runtime.spawn(async move { queue.run_loop().await });
        }
    }

    /// Remove the job at `index`.
    ///
    /// A missing index is reported as a `QueueError` event, not returned.
    pub fn delete_job(&self, index: usize) {
        let (outcome, queue) = {
            let mut state = self.inner.lock();
            let outcome = state.remove(index);
            (outcome, state.snapshot())
        };

        match outcome {
            Ok(job) => {
                tracing::debug!(target: "modelfetch.queue", index, job = ?job, "Job removed");
                self.inner.sink.emit(QueueEvent::JobRemove { job, queue });
            }
            Err(error) => {
                tracing::warn!(target: "modelfetch.queue", index, %error, "Cannot remove job");
                self.inner.sink.emit(QueueEvent::QueueError { error, queue });
            }
        }
    }

    /// Remove every job that is not currently running.
    pub fn clear(&self) {
        let (removed, queue) = {
            let mut state = self.inner.lock();
            let removed = state.clear_pending();
            (removed, state.snapshot())
        };
        if !removed.is_empty() {
            tracing::debug!(target: "modelfetch.queue", removed = removed.len(), "Queue cleared");
        }
        for job in removed {
            self.inner.sink.emit(QueueEvent::JobRemove {
                job,
                queue: queue.clone(),
            });
        }
    }

    /// Snapshot of the queued jobs, running job first.
    pub fn get_queue(&self) -> Vec<R::Payload> {
        self.inner.lock().snapshot()
    }

    /// Number of queued jobs, including the running one.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// True if no job is queued or running.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True while a job is executing.
    pub fn is_running(&self) -> bool {
        self.inner.lock().is_running()
    }

    /// True while the start delay is pending.
    pub fn is_delaying(&self) -> bool {
        self.inner.lock().is_delaying()
    }

    /// Worker loop: drain the queue one job at a time, then exit.
    async fn run_loop(self) {
        loop {
            let step = self.inner.lock().next_step(Instant::now());
            match step {
                Step::Idle => {
                    tracing::trace!(target: "modelfetch.queue", "Queue drained, worker exiting");
                    return;
                }
                Step::Wait(deadline) => tokio::time::sleep_until(deadline).await,
                Step::Run { id, job, queue } => {
                    tracing::debug!(target: "modelfetch.queue", job = ?job, "Job started");
                    self.inner.sink.emit(QueueEvent::JobStart {
                        job: job.clone(),
                        queue,
                    });

                    let result = self.inner.runner.run_job(job.clone(), &self).await;

                    if let Err(error) = result {
                        tracing::warn!(target: "modelfetch.queue", job = ?job, %error, "Job failed");
                        let queue = self.get_queue();
                        self.inner.sink.emit(QueueEvent::QueueError { error, queue });
                    }

                    let queue = self.inner.lock().finish(id);
                    tracing::debug!(
                        target: "modelfetch.queue",
                        job = ?job,
                        remaining = queue.len(),
                        "Job finished"
                    );
                    self.inner.sink.emit(QueueEvent::JobFinish { job, queue });

                    let delay = self.inner.config.job_delay;
                    if delay.is_zero() {
                        tokio::task::yield_now().await;
                    } else {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }
    }
}
