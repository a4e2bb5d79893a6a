//! # Session Launch Parameters
//!
//! The launch context a checkout session receives from whoever starts it:
//! an order id, and whether the session runs inside an embedding frame.

use checkout_core::{GatewayError, GatewayResult};

/// Launch context for one checkout session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionParams {
    /// The order being paid
    pub order_id: String,

    /// True when the session runs inside a third-party host frame and must
    /// relay protocol events through the messaging bridge
    pub embedded: bool,
}

impl SessionParams {
    /// Standalone session for an order
    pub fn new(order_id: impl Into<String>) -> Self {
        Self {
            order_id: order_id.into(),
            embedded: false,
        }
    }

    /// Builder: mark the session as embedded
    pub fn embedded(mut self) -> Self {
        self.embedded = true;
        self
    }

    /// Parse from a query string, the launch context used when the checkout
    /// page is hosted in a frame: `order_id=order_abc&embedded=true`.
    pub fn from_query(query: &str) -> GatewayResult<Self> {
        let mut order_id = None;
        let mut embedded = false;

        for pair in query.trim_start_matches('?').split('&') {
            let mut kv = pair.splitn(2, '=');
            match (kv.next(), kv.next()) {
                (Some("order_id"), Some(v)) if !v.is_empty() => order_id = Some(v.to_string()),
                (Some("embedded"), Some(v)) => embedded = v == "true",
                _ => {}
            }
        }

        let order_id = order_id.ok_or_else(|| {
            GatewayError::Validation("order_id missing from launch context".to_string())
        })?;

        Ok(Self { order_id, embedded })
    }
}
