//! Public configuration for the model file loaders.

use std::time::Duration;

/// Default base URL that `github://` URIs are rewritten to.
pub const DEFAULT_GITHUB_RAW_BASE: &str = "https://raw.githubusercontent.com/";

/// Configuration for the HTTP transport and the GitHub rewrite.
///
/// # Example
///
/// ```
/// use modelfetch_loader::LoaderConfig;
/// use std::time::Duration;
///
/// let config = LoaderConfig::new()
///     .with_timeout(Duration::from_secs(10))
///     .with_user_agent("my-tool/1.0");
/// ```
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// User agent string for HTTP requests
    pub(crate) user_agent: String,
    /// Default request timeout
    pub(crate) timeout: Duration,
    /// Base URL replacing the `github://` prefix
    pub(crate) github_raw_base: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("modelfetch/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(30),
            github_raw_base: DEFAULT_GITHUB_RAW_BASE.to_string(),
        }
    }
}

impl LoaderConfig {
    /// Create a new configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the user agent string for HTTP requests.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the default request timeout.
    ///
    /// Defaults to 30 seconds. `LoadOptions::timeout_ms` overrides it per request.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the base URL `github://` URIs are rewritten to.
    ///
    /// Defaults to `https://raw.githubusercontent.com/`.
    #[must_use]
    pub fn with_github_raw_base(mut self, base: impl Into<String>) -> Self {
        self.github_raw_base = base.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LoaderConfig::new();
        assert!(config.user_agent.starts_with("modelfetch/"));
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.github_raw_base, DEFAULT_GITHUB_RAW_BASE);
    }

    #[test]
    fn test_builder_pattern() {
        let config = LoaderConfig::new()
            .with_user_agent("test-agent")
            .with_timeout(Duration::from_secs(60))
            .with_github_raw_base("http://localhost:8080/raw/");

        assert_eq!(config.user_agent, "test-agent");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.github_raw_base, "http://localhost:8080/raw/");
    }
}
