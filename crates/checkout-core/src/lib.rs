//! # checkout-core
//!
//! Core types and traits for the checkout-widget confirmation protocol.
//!
//! This crate provides:
//! - `PaymentApi` trait describing the backend contract
//! - `Order` and `PaymentAttempt` for the checkout data model
//! - `MethodPayload` and `CardNetwork` for the method forms
//! - `ProtocolEvent` for the cross-frame message vocabulary
//! - `GatewayError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use checkout_core::{CardNetwork, MethodPayload, PaymentApi};
//!
//! // Fetch the order shown on the checkout summary
//! let order = api.fetch_order("order_abc").await?;
//! println!("Amount: {}", order.display_amount());
//!
//! // Classify a card prefix for the form badge
//! assert_eq!(CardNetwork::detect("4111"), CardNetwork::Visa);
//!
//! // Submit a UPI attempt; poll the returned id until terminal
//! let submission = api.submit_payment(&order.id, &MethodPayload::upi("alice@bank")).await?;
//! ```

pub mod api;
pub mod error;
pub mod event;
pub mod order;
pub mod payment;

// Re-exports for convenience
pub use api::{BoxedPaymentApi, PaymentApi, PaymentStatus, PaymentSubmission};
pub use error::{GatewayError, GatewayResult, GENERIC_FAILURE_MESSAGE};
pub use event::{FrameMessage, ProtocolEvent};
pub use order::Order;
pub use payment::{
    AttemptStatus, CardDetails, CardNetwork, MethodPayload, PaymentAttempt, PaymentMethod,
};
