//! Job queue state machine.
//!
//! Pure synchronous state: no async, no I/O, no tracing. The driver in
//! `queue::mod` owns the lock and performs side effects (timers, events,
//! running jobs) based on what these methods return.

use std::collections::VecDeque;
use std::time::Duration;

use modelfetch_core::QueueError;
use tokio::time::Instant;

/// Queue-assigned identity of a job, stable across removals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct JobId(u64);

#[derive(Debug, Clone)]
struct Slot<P> {
    id: JobId,
    job: P,
}

/// What the worker should do next.
#[derive(Debug)]
pub(crate) enum Step<P> {
    /// No jobs left; the worker exits.
    Idle,
    /// A start delay is pending until this instant.
    Wait(Instant),
    /// Run the front job.
    Run {
        id: JobId,
        job: P,
        queue: Vec<P>,
    },
}

#[derive(Debug)]
pub(crate) struct QueueState<P> {
    jobs: VecDeque<Slot<P>>,
    running: Option<JobId>,
    start_at: Option<Instant>,
    worker_active: bool,
    next_id: u64,
}

impl<P: Clone> QueueState<P> {
    pub const fn new() -> Self {
        Self {
            jobs: VecDeque::new(),
            running: None,
            start_at: None,
            worker_active: false,
            next_id: 0,
        }
    }

    /// Append a job.
    ///
    /// Arms the start delay when the queue was empty. Returns true when no
    /// worker is active and the caller must start one.
    pub fn push(&mut self, job: P, start_delay: Duration, now: Instant) -> bool {
        if self.jobs.is_empty() && !start_delay.is_zero() {
            self.start_at = Some(now + start_delay);
        }
        let id = JobId(self.next_id);
        self.next_id += 1;
        self.jobs.push_back(Slot { id, job });
        !std::mem::replace(&mut self.worker_active, true)
    }

    /// Decide the worker's next step. Marks the front job running.
    pub fn next_step(&mut self, now: Instant) -> Step<P> {
        if self.jobs.is_empty() {
            self.worker_active = false;
            self.start_at = None;
            return Step::Idle;
        }
        if let Some(at) = self.start_at {
            if at > now {
                return Step::Wait(at);
            }
            self.start_at = None;
        }

        let front = &self.jobs[0];
        let (id, job) = (front.id, front.job.clone());
        self.running = Some(id);
        Step::Run {
            id,
            job,
            queue: self.snapshot(),
        }
    }

    /// Settle the running job: clear the running flag and remove it.
    ///
    /// Returns the post-removal snapshot. The job may already be gone if it
    /// was deleted while running.
    pub fn finish(&mut self, id: JobId) -> Vec<P> {
        self.running = None;
        if let Some(pos) = self.jobs.iter().position(|slot| slot.id == id) {
            self.jobs.remove(pos);
        }
        self.snapshot()
    }

    /// Remove the job at `index`.
    pub fn remove(&mut self, index: usize) -> Result<P, QueueError> {
        let len = self.jobs.len();
        self.jobs
            .remove(index)
            .map(|slot| slot.job)
            .ok_or(QueueError::MissingJob { index, len })
    }

    /// Remove every job except the running one, in queue order.
    pub fn clear_pending(&mut self) -> Vec<P> {
        let running = self.running;
        let mut removed = Vec::new();
        self.jobs.retain(|slot| {
            if Some(slot.id) == running {
                true
            } else {
                removed.push(slot.job.clone());
                false
            }
        });
        removed
    }

    pub fn snapshot(&self) -> Vec<P> {
        self.jobs.iter().map(|slot| slot.job.clone()).collect()
    }

    pub const fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub const fn is_delaying(&self) -> bool {
        self.start_at.is_some()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }
}
