//! # Gateway Callbacks
//!
//! Callback hooks the host page supplies when constructing a gateway.
//! Every hook defaults to a no-op, so embedders implement only what they
//! need.

use tracing::{info, warn};

/// Callback hooks invoked by the gateway's message listener
#[allow(unused_variables)]
pub trait GatewayEvents: Send + Sync {
    /// The embedded session reported a successful payment. The frame is
    /// closed right after this returns.
    fn on_success(&self, payment_id: &str, order_id: &str) {}

    /// The embedded session reported a failed attempt. The frame stays
    /// open so the user can retry inside it.
    fn on_failure(&self, error: &str) {}

    /// The frame was torn down
    fn on_close(&self) {}
}

/// Callback implementation that just logs events
pub struct LoggingGatewayEvents;

impl GatewayEvents for LoggingGatewayEvents {
    fn on_success(&self, payment_id: &str, order_id: &str) {
        info!("Payment {} for order {} succeeded", payment_id, order_id);
    }

    fn on_failure(&self, error: &str) {
        warn!("Payment failed: {}", error);
    }

    fn on_close(&self) {
        info!("Checkout closed");
    }
}
