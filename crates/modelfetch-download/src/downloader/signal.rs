//! Completion signal for one download call.

use std::sync::{Arc, Mutex, PoisonError};

use modelfetch_core::{DownloadError, QueueEvent, QueueEventSink};
use tokio::sync::oneshot;

use super::job::{FetchJob, ResolutionContext};

pub(crate) type Outcome = Result<(), DownloadError>;

/// Queue sink that settles a download call exactly once.
///
/// The first `QueueError` fails the call and aborts its context. A
/// `JobFinish` that leaves the queue empty completes it. Everything after
/// the first settlement is ignored. Every event is forwarded to the
/// observer, if any.
pub(crate) struct CompletionSignal {
    tx: Mutex<Option<oneshot::Sender<Outcome>>>,
    context: Arc<ResolutionContext>,
    observer: Option<Arc<dyn QueueEventSink<FetchJob>>>,
}

impl CompletionSignal {
    pub fn new(
        context: Arc<ResolutionContext>,
        observer: Option<Arc<dyn QueueEventSink<FetchJob>>>,
    ) -> (Self, oneshot::Receiver<Outcome>) {
        let (tx, rx) = oneshot::channel();
        let signal = Self {
            tx: Mutex::new(Some(tx)),
            context,
            observer,
        };
        (signal, rx)
    }

    fn settle(&self, outcome: Outcome) {
        let tx = self
            .tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(tx) = tx {
            // receiver gone means the call was dropped
            let _ = tx.send(outcome);
        }
    }
}

impl QueueEventSink<FetchJob> for CompletionSignal {
    fn emit(&self, event: QueueEvent<FetchJob>) {
        match &event {
            QueueEvent::QueueError { error, queue } => {
                self.context.abort();
                let remaining = queue.iter().map(|job| job.uri().to_string()).collect();
                self.settle(Err(DownloadError::failed(error.clone(), remaining)));
            }
            QueueEvent::JobFinish { queue, .. } if queue.is_empty() => self.settle(Ok(())),
            _ => {}
        }

        if let Some(observer) = &self.observer {
            observer.emit(event);
        }
    }
}
