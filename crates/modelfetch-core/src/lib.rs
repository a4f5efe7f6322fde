//! Core domain types and ports for resolving external model imports.
//!
//! This crate has no transport or runtime code. It defines:
//!
//! - [`ModelFile`] and [`ModelSet`], the artifacts being resolved
//! - [`LoadOptions`], the passthrough bag forwarded to every loader
//! - the [`ModelFileLoader`], [`QueueEventSink`] and [`ModelValidator`] ports
//! - the error taxonomy shared by the loader and download crates
//! - [`QueueEvent`], the lifecycle events emitted by the job queue

#![deny(unused_crate_dependencies)]

pub mod error;
pub mod events;
pub mod model;
pub mod options;
pub mod ports;

pub use error::{DownloadError, LoadError, ModelError, QueueError};
pub use events::{QueueEvent, QueueEventKind};
pub use model::{ModelFile, ModelSet, namespace_of};
pub use options::LoadOptions;
pub use ports::{
    AcceptAll, ChannelSink, ImportsResolved, ModelFileLoader, ModelValidator, NoopQueueSink,
    QueueEventSink,
};
