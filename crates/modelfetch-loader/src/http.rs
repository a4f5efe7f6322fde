//! HTTP backend abstraction.
//!
//! The loaders talk to the network through [`HttpBackend`] so tests can
//! substitute canned responses. The production implementation uses reqwest
//! and never retries: a failed fetch fails the load.

use async_trait::async_trait;
use modelfetch_core::LoadOptions;
use url::Url;

use crate::config::LoaderConfig;
use crate::error::{HttpError, HttpResult};

// ============================================================================
// HTTP Backend Trait
// ============================================================================

/// Fetches a URL as text.
#[async_trait]
pub trait HttpBackend: Send + Sync {
    /// GET `url` and return the response body as text.
    ///
    /// `options` supplies headers, query parameters, a bearer token and a
    /// timeout. The method and response type cannot be overridden.
    async fn get_text(&self, url: &Url, options: &LoadOptions) -> HttpResult<String>;
}

// ============================================================================
// Reqwest Backend
// ============================================================================

/// Production HTTP backend using reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    client: reqwest::Client,
}

impl ReqwestBackend {
    /// Create a backend with the given configuration.
    pub fn new(config: &LoaderConfig) -> HttpResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client })
    }

    /// Build a GET request with the caller's overrides applied.
    fn build_request(&self, url: &Url, options: &LoadOptions) -> reqwest::RequestBuilder {
        let mut request = self.client.get(url.as_str());
        if !options.query.is_empty() {
            request = request.query(&options.query);
        }
        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(ref token) = options.bearer_token {
            request = request.bearer_auth(token);
        }
        if let Some(timeout) = options.timeout() {
            request = request.timeout(timeout);
        }
        request
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn get_text(&self, url: &Url, options: &LoadOptions) -> HttpResult<String> {
        let response = self.build_request(url, options).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(HttpError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.text().await?)
    }
}

// ============================================================================
// Fake Backend for Testing
// ============================================================================

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// A fake HTTP backend that returns canned bodies and records requests.
    #[derive(Clone, Default)]
    pub struct FakeBackend {
        bodies: Arc<Mutex<HashMap<String, String>>>,
        requests: Arc<Mutex<Vec<String>>>,
    }

    impl FakeBackend {
        /// Create a new fake backend.
        pub fn new() -> Self {
            Self::default()
        }

        /// Serve `body` for exactly `url`.
        pub fn with_body(self, url: &str, body: &str) -> Self {
            self.bodies
                .lock()
                .unwrap()
                .insert(url.to_string(), body.to_string());
            self
        }

        /// URLs requested so far, in order.
        pub fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpBackend for FakeBackend {
        async fn get_text(&self, url: &Url, _options: &LoadOptions) -> HttpResult<String> {
            self.requests.lock().unwrap().push(url.to_string());
            self.bodies
                .lock()
                .unwrap()
                .get(url.as_str())
                .cloned()
                .ok_or_else(|| HttpError::Status {
                    status: 404,
                    url: url.to_string(),
                })
        }
    }
}
