//! CLI error types and exit codes.

use modelfetch_core::{DownloadError, ModelError};
use modelfetch_loader::HttpError;
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// A local model file could not be read as a model.
    #[error("Invalid model file {path}: {message}")]
    Model {
        /// Path of the offending file.
        path: String,
        /// What is wrong with it.
        message: String,
    },

    /// Resolving the external closure failed.
    #[error("{0}")]
    Resolve(String),

    /// Argument error not caught by the parser.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// IO error (file not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(String),
}

impl CliError {
    /// Map error to process exit code.
    ///
    /// - 1: resolution or model error
    /// - 2: misuse (invalid arguments)
    /// - 74: I/O error (`EX_IOERR`)
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Model { .. } | Self::Resolve(_) => 1,
            Self::Arguments(_) => 2,
            Self::Io(_) => 74,
        }
    }
}

impl From<DownloadError> for CliError {
    fn from(err: DownloadError) -> Self {
        Self::Resolve(err.to_string())
    }
}

impl From<HttpError> for CliError {
    fn from(err: HttpError) -> Self {
        Self::Resolve(format!("Cannot create HTTP client: {err}"))
    }
}

impl From<ModelError> for CliError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::DuplicateNamespace { .. } => Self::Arguments(err.to_string()),
            other => Self::Resolve(other.to_string()),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::Io(format!("Cannot encode output: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use modelfetch_core::{LoadError, QueueError};

    use super::*;

    #[test]
    fn test_exit_codes() {
        let failed = DownloadError::failed(
            QueueError::Load(LoadError::http_status("https://m/a.cto", 404)),
            vec!["https://m/a.cto".to_string()],
        );
        assert_eq!(CliError::from(failed).exit_code(), 1);

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        assert_eq!(CliError::from(io).exit_code(), 74);

        let duplicate = ModelError::DuplicateNamespace {
            namespace: "org.a".to_string(),
        };
        assert_eq!(CliError::from(duplicate).exit_code(), 2);
    }

    #[test]
    fn test_resolve_error_keeps_download_message() {
        let err = CliError::from(DownloadError::Interrupted);
        assert_eq!(err.to_string(), DownloadError::Interrupted.to_string());
    }
}
