//! # Protocol Events
//!
//! The typed vocabulary relayed from an embedded checkout session to its
//! embedding context. Nothing else may cross the frame boundary.

use serde::{Deserialize, Serialize};

/// A protocol event, serialized as a `{type, data}` envelope so an
/// embedding host can dispatch on the `"type"` field:
///
/// ```json
/// {"type":"payment_success","data":{"paymentId":"pay_1","orderId":"order_1"}}
/// {"type":"payment_failed","data":{"error":"insufficient funds"}}
/// {"type":"close_modal"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ProtocolEvent {
    /// The active attempt reached `success`
    #[serde(rename_all = "camelCase")]
    PaymentSuccess {
        payment_id: String,
        order_id: String,
    },

    /// The active attempt failed, at submission or during polling
    PaymentFailed { error: String },

    /// The in-frame close affordance was used
    CloseModal,
}

/// A message crossing the frame boundary, tagged with the origin of the
/// frame that sent it.
///
/// The sender broadcasts without knowing who listens (it cannot know the
/// host origin in a multi-merchant deployment); receivers are expected to
/// drop messages whose origin they do not recognize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameMessage {
    pub origin: String,
    pub event: ProtocolEvent,
}
