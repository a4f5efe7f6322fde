//! Job queue lifecycle events.

use crate::error::QueueError;

/// A job queue lifecycle event.
///
/// Every variant carries a snapshot of the queued jobs taken when the event
/// was emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueEvent<P> {
    /// A job was appended.
    JobAdd {
        /// The added job.
        job: P,
        /// Queue after the append.
        queue: Vec<P>,
    },
    /// A job started executing.
    JobStart {
        /// The running job.
        job: P,
        /// Queue including the running job.
        queue: Vec<P>,
    },
    /// A job settled and was removed.
    JobFinish {
        /// The finished job.
        job: P,
        /// Queue after removal.
        queue: Vec<P>,
    },
    /// A job was removed with `delete_job`.
    JobRemove {
        /// The removed job.
        job: P,
        /// Queue after removal.
        queue: Vec<P>,
    },
    /// A job failed, or a queue operation could not be applied.
    QueueError {
        /// What went wrong.
        error: QueueError,
        /// Queue when the error was reported.
        queue: Vec<P>,
    },
}

/// Discriminant of a [`QueueEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueEventKind {
    /// See [`QueueEvent::JobAdd`].
    JobAdd,
    /// See [`QueueEvent::JobStart`].
    JobStart,
    /// See [`QueueEvent::JobFinish`].
    JobFinish,
    /// See [`QueueEvent::JobRemove`].
    JobRemove,
    /// See [`QueueEvent::QueueError`].
    QueueError,
}

impl QueueEventKind {
    /// Event name as used in logs.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::JobAdd => "job_add",
            Self::JobStart => "job_start",
            Self::JobFinish => "job_finish",
            Self::JobRemove => "job_remove",
            Self::QueueError => "queue_error",
        }
    }
}

impl<P> QueueEvent<P> {
    /// The event discriminant.
    pub const fn kind(&self) -> QueueEventKind {
        match self {
            Self::JobAdd { .. } => QueueEventKind::JobAdd,
            Self::JobStart { .. } => QueueEventKind::JobStart,
            Self::JobFinish { .. } => QueueEventKind::JobFinish,
            Self::JobRemove { .. } => QueueEventKind::JobRemove,
            Self::QueueError { .. } => QueueEventKind::QueueError,
        }
    }

    /// The queue snapshot carried by this event.
    pub fn queue(&self) -> &[P] {
        match self {
            Self::JobAdd { queue, .. }
            | Self::JobStart { queue, .. }
            | Self::JobFinish { queue, .. }
            | Self::JobRemove { queue, .. }
            | Self::QueueError { queue, .. } => queue,
        }
    }

    /// The job this event is about, if any.
    pub const fn job(&self) -> Option<&P> {
        match self {
            Self::JobAdd { job, .. }
            | Self::JobStart { job, .. }
            | Self::JobFinish { job, .. }
            | Self::JobRemove { job, .. } => Some(job),
            Self::QueueError { .. } => None,
        }
    }
}
