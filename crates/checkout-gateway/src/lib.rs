//! # checkout-gateway
//!
//! The embeddable gateway object: the widget's public entry point,
//! instantiated by a host merchant page.
//!
//! `open()` spawns an embedded checkout session behind a frame boundary,
//! registers a single message listener for the three protocol events, and
//! publishes the instance as the single active one. Outcomes reach the
//! host through callback hooks:
//!
//! - `payment_success` → `on_success(payment_id, order_id)`, then close
//! - `payment_failed` → `on_failure(error)`, frame stays open for retry
//! - `close_modal` → close
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use checkout_client::BackendClient;
//! use checkout_gateway::{CheckoutGateway, GatewayEvents};
//! use std::sync::Arc;
//!
//! struct Host;
//! impl GatewayEvents for Host {
//!     fn on_success(&self, payment_id: &str, order_id: &str) {
//!         println!("paid: {} for {}", payment_id, order_id);
//!     }
//! }
//!
//! let api = Arc::new(BackendClient::from_env()?);
//! let handle = CheckoutGateway::new("order_abc", api, Arc::new(Host)).open();
//! handle.closed().await;
//! ```

pub mod config;
pub mod events;
pub mod gateway;

// Re-exports
pub use config::{GatewayConfig, DEFAULT_CHECKOUT_ORIGIN};
pub use events::{GatewayEvents, LoggingGatewayEvents};
pub use gateway::{ActiveGatewayRegistry, CheckoutGateway, GatewayHandle};
