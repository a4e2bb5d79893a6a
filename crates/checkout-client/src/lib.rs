//! # checkout-client
//!
//! HTTP client for the checkout-widget public backend API.
//!
//! The backend exposes three unauthenticated endpoints consumed by the
//! checkout surface:
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/orders/{id}/public` | Public order view |
//! | POST | `/payments/public` | Submit a payment attempt |
//! | GET | `/payments/{id}/public` | Poll attempt status |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use checkout_client::BackendClient;
//! use checkout_core::{MethodPayload, PaymentApi};
//!
//! let client = BackendClient::from_env()?;
//! let order = client.fetch_order("order_abc").await?;
//! let submission = client
//!     .submit_payment(&order.id, &MethodPayload::upi("alice@bank"))
//!     .await?;
//! // Poll submission.payment_id until the attempt is terminal.
//! ```

pub mod client;
pub mod config;

// Re-exports
pub use client::BackendClient;
pub use config::{ClientConfig, DEFAULT_API_BASE_URL};
