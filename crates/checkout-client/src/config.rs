//! # Client Configuration
//!
//! Configuration for the backend HTTP client.
//! All values are loaded from environment variables.

use checkout_core::GatewayError;
use std::env;

/// Default base URL of the public backend API
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/v1";

/// Backend client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the public API (e.g. "http://localhost:8000/api/v1")
    pub api_base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Recognized env vars:
    /// - `CHECKOUT_API_URL` (default: `http://localhost:8000/api/v1`)
    /// - `CHECKOUT_HTTP_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, GatewayError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let api_base_url =
            env::var("CHECKOUT_API_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());

        let timeout_secs = env::var("CHECKOUT_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        let config = Self {
            api_base_url,
            timeout_secs,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), GatewayError> {
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://") {
            return Err(GatewayError::Configuration(format!(
                "CHECKOUT_API_URL must be an http(s) URL, got {}",
                self.api_base_url
            )));
        }
        if self.api_base_url.ends_with('/') {
            return Err(GatewayError::Configuration(
                "CHECKOUT_API_URL must not end with a trailing slash".to_string(),
            ));
        }
        Ok(())
    }

    /// Builder: set custom API base URL (for testing against a mock server)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Builder: set the request timeout
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}
