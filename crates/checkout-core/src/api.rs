//! # Payment API Trait
//!
//! Contract the checkout core expects from the backend REST surface.
//! The backend processes payments out-of-band: submission only returns an
//! attempt id, and the terminal outcome is discovered by polling.

use crate::error::GatewayResult;
use crate::order::Order;
use crate::payment::{AttemptStatus, MethodPayload};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Response to a payment submission: the backend has accepted the attempt
/// and handed it to its async worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSubmission {
    /// Backend-assigned attempt identifier to poll against
    pub payment_id: String,
}

/// One status observation for an in-flight payment attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentStatus {
    /// Attempt identifier, when the backend echoes it
    #[serde(default)]
    pub id: Option<String>,

    /// Current attempt status
    pub status: AttemptStatus,

    /// Human-readable failure description for `failed` attempts
    #[serde(default)]
    pub error_description: Option<String>,
}

impl PaymentStatus {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Contract the checkout session expects from the backend.
///
/// The production implementation lives in `checkout-client`; tests
/// substitute scripted fakes. Implementations never retry internally:
/// retry-by-continuation is the status poller's responsibility.
#[async_trait]
pub trait PaymentApi: Send + Sync {
    /// Fetch the public view of an order
    async fn fetch_order(&self, order_id: &str) -> GatewayResult<Order>;

    /// Submit a payment attempt against an order.
    ///
    /// A `Validation` error means the backend rejected the submission; its
    /// description is surfaced verbatim.
    async fn submit_payment(
        &self,
        order_id: &str,
        payload: &MethodPayload,
    ) -> GatewayResult<PaymentSubmission>;

    /// Fetch the current status of an attempt.
    ///
    /// `NotFound` is not terminal here: the backend may still be enqueuing
    /// the record, so callers treat it as "no new information".
    async fn poll_payment_status(&self, payment_id: &str) -> GatewayResult<PaymentStatus>;
}

/// Type alias for a shared payment API (dynamic dispatch)
pub type BoxedPaymentApi = Arc<dyn PaymentApi>;
