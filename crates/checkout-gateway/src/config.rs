//! # Gateway Configuration
//!
//! Configuration for the embedding side of the widget.
//! All values are loaded from environment variables.

use std::env;

/// Default origin of the hosted checkout page
pub const DEFAULT_CHECKOUT_ORIGIN: &str = "http://localhost:3001";

/// Gateway configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Origin the checkout frame reports on its messages. The gateway's
    /// listener ignores frame messages from any other origin.
    pub checkout_origin: String,
}

impl GatewayConfig {
    /// Load from environment variables.
    ///
    /// Recognized env vars:
    /// - `CHECKOUT_PAGE_ORIGIN` (default: `http://localhost:3001`)
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            checkout_origin: env::var("CHECKOUT_PAGE_ORIGIN")
                .unwrap_or_else(|_| DEFAULT_CHECKOUT_ORIGIN.to_string()),
        }
    }

    /// Builder: set the checkout origin
    pub fn with_checkout_origin(mut self, origin: impl Into<String>) -> Self {
        self.checkout_origin = origin.into();
        self
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
