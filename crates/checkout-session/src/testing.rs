//! Scripted `PaymentApi` fake shared by the poller and session tests.

use async_trait::async_trait;
use checkout_core::{
    AttemptStatus, GatewayError, GatewayResult, MethodPayload, Order, PaymentApi, PaymentStatus,
    PaymentSubmission,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// A backend whose responses are scripted up front.
///
/// Poll responses are consumed in order; once the script runs dry every
/// further poll reports `pending`, which keeps a live loop ticking.
pub(crate) struct ScriptedApi {
    order: GatewayResult<Order>,
    submit: GatewayResult<PaymentSubmission>,
    polls: Mutex<VecDeque<GatewayResult<PaymentStatus>>>,
    fetch_count: AtomicUsize,
    submit_count: AtomicUsize,
    poll_count: AtomicUsize,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self {
            order: Ok(Order {
                id: "order_1".to_string(),
                amount: 50_000,
                currency: "INR".to_string(),
                status: "created".to_string(),
            }),
            submit: Ok(PaymentSubmission {
                payment_id: "pay_1".to_string(),
            }),
            polls: Mutex::new(VecDeque::new()),
            fetch_count: AtomicUsize::new(0),
            submit_count: AtomicUsize::new(0),
            poll_count: AtomicUsize::new(0),
        }
    }

    pub fn with_order(mut self, order: GatewayResult<Order>) -> Self {
        self.order = order;
        self
    }

    pub fn with_submit(mut self, submit: GatewayResult<PaymentSubmission>) -> Self {
        self.submit = submit;
        self
    }

    pub fn with_polls(self, polls: Vec<GatewayResult<PaymentStatus>>) -> Self {
        *self.polls.lock().unwrap() = polls.into();
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }

    pub fn submit_count(&self) -> usize {
        self.submit_count.load(Ordering::SeqCst)
    }

    pub fn poll_count(&self) -> usize {
        self.poll_count.load(Ordering::SeqCst)
    }

    pub fn pending() -> GatewayResult<PaymentStatus> {
        Ok(PaymentStatus {
            id: None,
            status: AttemptStatus::Pending,
            error_description: None,
        })
    }

    pub fn success(id: &str) -> GatewayResult<PaymentStatus> {
        Ok(PaymentStatus {
            id: Some(id.to_string()),
            status: AttemptStatus::Success,
            error_description: None,
        })
    }

    pub fn failed(description: Option<&str>) -> GatewayResult<PaymentStatus> {
        Ok(PaymentStatus {
            id: None,
            status: AttemptStatus::Failed,
            error_description: description.map(String::from),
        })
    }

    pub fn not_found() -> GatewayResult<PaymentStatus> {
        Err(GatewayError::NotFound("payment".to_string()))
    }
}

#[async_trait]
impl PaymentApi for ScriptedApi {
    async fn fetch_order(&self, _order_id: &str) -> GatewayResult<Order> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        self.order.clone()
    }

    async fn submit_payment(
        &self,
        _order_id: &str,
        _payload: &MethodPayload,
    ) -> GatewayResult<PaymentSubmission> {
        self.submit_count.fetch_add(1, Ordering::SeqCst);
        self.submit.clone()
    }

    async fn poll_payment_status(&self, _payment_id: &str) -> GatewayResult<PaymentStatus> {
        self.poll_count.fetch_add(1, Ordering::SeqCst);
        self.polls
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(Self::pending)
    }
}
