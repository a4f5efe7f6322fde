//! Queue event sink port.
//!
//! The job queue reports lifecycle events through this port without knowing
//! who listens (a downloader's completion signal, a logger, a test).

use tokio::sync::mpsc;

use crate::events::QueueEvent;

/// Receives job queue events.
///
/// Implementations must not block: the queue calls `emit` inline.
pub trait QueueEventSink<P>: Send + Sync {
    /// Handle one event.
    fn emit(&self, event: QueueEvent<P>);
}

/// A sink that discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopQueueSink;

impl NoopQueueSink {
    /// Create a new no-op sink.
    pub const fn new() -> Self {
        Self
    }
}

impl<P> QueueEventSink<P> for NoopQueueSink {
    fn emit(&self, _event: QueueEvent<P>) {}
}

/// A sink that forwards events into an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelSink<P> {
    tx: mpsc::UnboundedSender<QueueEvent<P>>,
}

impl<P> ChannelSink<P> {
    /// Create a sink and the receiver its events arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<QueueEvent<P>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl<P: Send> QueueEventSink<P> for ChannelSink<P> {
    fn emit(&self, event: QueueEvent<P>) {
        // Receiver gone means nobody is listening any more.
        let _ = self.tx.send(event);
    }
}
