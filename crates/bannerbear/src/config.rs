//! Client configuration, validated before the client is built.

use std::time::Duration;

use crate::ClientError;

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://api.bannerbear.com/v2";

/// Timeout applied to every individual HTTP request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A Bannerbear project API key. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct ApiKey(String);

impl ApiKey {
    /// Returns the key for use in the `Authorization` header.
    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Everything needed to construct a [`crate::BannerbearClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannerbearConfig {
    pub(crate) api_key: ApiKey,
    pub(crate) base_url: String,
    pub(crate) request_timeout: Duration,
}

impl BannerbearConfig {
    /// Creates a configuration for the production API.
    ///
    /// # Errors
    ///
    /// [`ClientError::MissingApiKey`] if `api_key` is empty or whitespace.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ClientError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ClientError::MissingApiKey);
        }
        Ok(Self {
            api_key: ApiKey(api_key.trim().to_string()),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    /// Points the client at a different API root (e.g. a staging proxy).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Overrides the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}
