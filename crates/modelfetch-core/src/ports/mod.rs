//! Port definitions (trait abstractions).
//!
//! Loaders, event sinks and validators are injected through these traits so
//! the queue and downloader never depend on a concrete transport.

mod event_sink;
mod loader;
mod validator;

pub use event_sink::{ChannelSink, NoopQueueSink, QueueEventSink};
pub use loader::ModelFileLoader;
pub use validator::{AcceptAll, ImportsResolved, ModelValidator};
