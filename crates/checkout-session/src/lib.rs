//! # checkout-session
//!
//! The client-side payment-confirmation protocol: checkout state machine,
//! status poller, and the messaging bridge that relays protocol events to
//! an embedding host.
//!
//! A session is spawned with launch parameters (order id + embedded flag),
//! a `PaymentApi` implementation, and a bridge. It fetches the order,
//! walks `selection → method form → processing → success | error`, and
//! discovers terminal outcomes by polling, since the backend processes
//! payments out-of-band and offers no push channel.
//!
//! ## Example
//!
//! ```rust,ignore
//! use checkout_session::{CheckoutSession, MessagingBridge, SessionParams, ViewState};
//! use checkout_core::{MethodPayload, PaymentMethod};
//!
//! let (mut driver, task) = CheckoutSession::spawn(
//!     api,
//!     SessionParams::new("order_abc"),
//!     MessagingBridge::standalone(),
//! );
//!
//! driver.wait_for(|s| matches!(s.view, ViewState::Selection)).await?;
//! driver.select_method(PaymentMethod::Upi).await?;
//! driver.submit(MethodPayload::upi("alice@bank")).await?;
//! let done = driver.wait_for(|s| s.view.is_terminal()).await?;
//! ```

pub mod bridge;
pub mod params;
pub mod poller;
pub mod session;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports
pub use bridge::{FrameChannel, MessagingBridge};
pub use params::SessionParams;
pub use poller::{PollHandle, PollResolution, StatusPoller, DEFAULT_POLL_INTERVAL};
pub use session::{
    CheckoutSession, SessionDriver, SessionSnapshot, UserAction, DEFAULT_DECLINE_MESSAGE,
};
pub use view::ViewState;
