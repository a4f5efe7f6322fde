//! Error types shared across modelfetch crates.
//!
//! Errors carry strings rather than foreign error types so they can be
//! cloned into queue events and snapshots. Adapter crates map their own
//! transport errors onto [`LoadError`] at the boundary.

use thiserror::Error;

/// Errors produced while scanning a model file or editing a [`ModelSet`].
///
/// [`ModelSet`]: crate::ModelSet
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    /// The model text was empty or whitespace.
    #[error("Model file has no definitions")]
    EmptyDefinitions,

    /// No `namespace` declaration was found.
    #[error("Model file {} does not declare a namespace", .name.as_deref().unwrap_or("<unnamed>"))]
    MissingNamespace {
        /// File name, if one was supplied.
        name: Option<String>,
    },

    /// A `namespace` or `import` declaration is incomplete.
    #[error("Malformed declaration on line {line}: {text}")]
    MalformedDeclaration {
        /// 1-based line number.
        line: usize,
        /// The offending line, trimmed.
        text: String,
    },

    /// A model with this namespace is already in the set.
    #[error("Namespace {namespace} is already registered")]
    DuplicateNamespace {
        /// The clashing namespace.
        namespace: String,
    },

    /// No model with this namespace is in the set.
    #[error("Namespace {namespace} is not registered")]
    UnknownNamespace {
        /// The missing namespace.
        namespace: String,
    },

    /// A model imports a namespace that no model in the set declares.
    #[error("Model {namespace} imports {import} but no model declares that namespace")]
    UnresolvedImport {
        /// Namespace of the importing model.
        namespace: String,
        /// The unresolved import declaration.
        import: String,
    },
}

/// Errors produced by a [`ModelFileLoader`](crate::ModelFileLoader).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LoadError {
    /// No registered loader accepts the URI.
    #[error("No registered loader accepts URL {uri}")]
    UnsupportedUri {
        /// The unhandled URI.
        uri: String,
    },

    /// The underlying fetch failed (network error, non-success status, ...).
    #[error("Failed to fetch {uri}: {message}")]
    Transport {
        /// The URI that was requested.
        uri: String,
        /// Transport error description.
        message: String,
        /// HTTP status code if the server answered.
        status: Option<u16>,
    },

    /// The fetched text could not be turned into a model file.
    #[error("Content fetched from {uri} is not a model file: {source}")]
    InvalidModel {
        /// The URI that was requested.
        uri: String,
        /// Why the header scan failed.
        source: ModelError,
    },
}

impl LoadError {
    /// Create an unsupported URI error.
    pub fn unsupported(uri: impl Into<String>) -> Self {
        Self::UnsupportedUri { uri: uri.into() }
    }

    /// Create a transport error.
    pub fn transport(uri: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            uri: uri.into(),
            message: message.into(),
            status: None,
        }
    }

    /// Create a transport error for a non-success HTTP status.
    pub fn http_status(uri: impl Into<String>, status: u16) -> Self {
        Self::Transport {
            uri: uri.into(),
            message: format!("server responded with status {status}"),
            status: Some(status),
        }
    }

    /// The URI this error is about.
    pub fn uri(&self) -> &str {
        match self {
            Self::UnsupportedUri { uri }
            | Self::Transport { uri, .. }
            | Self::InvalidModel { uri, .. } => uri,
        }
    }
}

/// Errors reported by the job queue through `QueueEvent::QueueError`.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    /// `delete_job` was called with an index past the end of the queue.
    #[error("No job at index {index} (queue length {len})")]
    MissingJob {
        /// Requested index.
        index: usize,
        /// Queue length at the time of the call.
        len: usize,
    },

    /// The job runner did not override `run_job`.
    #[error("run_job is not implemented by this job runner")]
    NotSpecialized,

    /// A job failed to load its model file.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The closure grew past the configured model limit.
    #[error("Closure exceeds the limit of {limit} external model files")]
    LimitExceeded {
        /// The configured limit.
        limit: usize,
    },

    /// A job queue was created outside a tokio runtime.
    #[error("Job queue requires a tokio runtime: {0}")]
    NoRuntime(String),
}

/// Errors returned by `ModelDownloader`.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DownloadError {
    /// A job in the closure failed; nothing is returned.
    #[error("Failed to load model file. Job queue: [{}]. Details: {source}", .remaining.join(", "))]
    Failed {
        /// The first queue error.
        source: QueueError,
        /// URIs still queued when the error was reported.
        remaining: Vec<String>,
    },

    /// The queue stopped without reporting completion or failure.
    #[error("Download was interrupted before the job queue drained")]
    Interrupted,

    /// Downloaded models could not be applied to a model set.
    #[error("Downloaded models rejected: {0}")]
    Validation(#[from] ModelError),
}

impl DownloadError {
    /// Create a failure from the first queue error and the queued URIs.
    pub fn failed(source: QueueError, remaining: Vec<String>) -> Self {
        Self::Failed { source, remaining }
    }
}
