//! # Backend Client
//!
//! Reqwest implementation of the `PaymentApi` contract over the three
//! public (unauthenticated) backend endpoints. The client maps transport
//! and HTTP failures into the typed taxonomy and never retries internally:
//! retry-by-continuation is the status poller's job.

use crate::config::ClientConfig;
use async_trait::async_trait;
use checkout_core::{
    GatewayError, GatewayResult, MethodPayload, Order, PaymentApi, PaymentStatus,
    PaymentSubmission,
};
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use tracing::{debug, info, instrument};

/// HTTP client for the public backend API
pub struct BackendClient {
    config: ClientConfig,
    client: Client,
}

impl BackendClient {
    /// Create a new backend client
    pub fn new(config: ClientConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Create from environment variables
    pub fn from_env() -> GatewayResult<Self> {
        let config = ClientConfig::from_env()?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url, path)
    }

    async fn error_from(response: Response, what: &str) -> GatewayError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        map_error_response(status, &body, what)
    }
}

/// Map a non-success backend response onto the error taxonomy:
/// 404 → `NotFound`, other 4xx → `Validation` with the backend's
/// description, 5xx → `Network`.
fn map_error_response(status: StatusCode, body: &str, what: &str) -> GatewayError {
    if status == StatusCode::NOT_FOUND {
        return GatewayError::NotFound(what.to_string());
    }
    if status.is_client_error() {
        let description =
            extract_error_description(body).unwrap_or_else(|| format!("HTTP {}", status));
        return GatewayError::Validation(description);
    }
    GatewayError::Network(format!("HTTP {}: {}", status, body))
}

/// Pull the human-readable description out of the backend's error envelope,
/// `{"detail":{"error":{"code":"...","description":"..."}}}`, falling back
/// to a plain-string `detail`.
fn extract_error_description(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let detail = value.get("detail")?;
    if let Some(description) = detail
        .get("error")
        .and_then(|e| e.get("description"))
        .and_then(|d| d.as_str())
    {
        return Some(description.to_string());
    }
    detail.as_str().map(String::from)
}

#[derive(Debug, Serialize)]
struct SubmitPaymentRequest<'a> {
    order_id: &'a str,
    #[serde(flatten)]
    payload: &'a MethodPayload,
}

#[async_trait]
impl PaymentApi for BackendClient {
    #[instrument(skip(self))]
    async fn fetch_order(&self, order_id: &str) -> GatewayResult<Order> {
        let url = self.url(&format!("/orders/{}/public", order_id));

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_from(response, &format!("order {}", order_id)).await);
        }

        let order: Order = response
            .json()
            .await
            .map_err(|e| GatewayError::Serialization(format!("Failed to parse order: {}", e)))?;

        debug!("Fetched order: id={}, amount={}", order.id, order.amount);
        Ok(order)
    }

    #[instrument(skip(self, payload), fields(method = %payload.method()))]
    async fn submit_payment(
        &self,
        order_id: &str,
        payload: &MethodPayload,
    ) -> GatewayResult<PaymentSubmission> {
        let url = self.url("/payments/public");
        let request = SubmitPaymentRequest { order_id, payload };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_from(response, &format!("order {}", order_id)).await);
        }

        let submission: PaymentSubmission = response.json().await.map_err(|e| {
            GatewayError::Serialization(format!("Failed to parse submission: {}", e))
        })?;

        info!(
            "Payment submitted: payment_id={}, order_id={}",
            submission.payment_id, order_id
        );
        Ok(submission)
    }

    #[instrument(skip(self))]
    async fn poll_payment_status(&self, payment_id: &str) -> GatewayResult<PaymentStatus> {
        let url = self.url(&format!("/payments/{}/public", payment_id));

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_from(response, &format!("payment {}", payment_id)).await);
        }

        response
            .json()
            .await
            .map_err(|e| GatewayError::Serialization(format!("Failed to parse status: {}", e)))
    }
}
