//! # Checkout Error Types
//!
//! Typed error handling for the checkout confirmation protocol.
//! All fallible operations return `Result<T, GatewayError>`.

use thiserror::Error;

/// Fallback message shown when a failure carries no usable description
pub const GENERIC_FAILURE_MESSAGE: &str = "Payment failed";

/// Core error type for all checkout operations
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// Configuration errors (missing vars, invalid base URL)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Resource not found on the backend.
    ///
    /// During status polling this is transient: the async worker may still
    /// be enqueuing the payment record. Distinct from a `failed` status,
    /// which is terminal.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Network/HTTP error communicating with the backend
    #[error("Network error: {0}")]
    Network(String),

    /// Submission rejected by the backend; the description is surfaced
    /// verbatim on the failure screen
    #[error("Validation error: {0}")]
    Validation(String),

    /// Response body could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Fallback for anything the taxonomy does not cover
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl GatewayError {
    /// Returns true if this error is transient during polling.
    ///
    /// The poller keeps ticking through transient errors instead of
    /// surfacing them; only a terminal attempt status stops the loop.
    pub fn is_transient(&self) -> bool {
        matches!(self, GatewayError::NotFound(_) | GatewayError::Network(_))
    }

    /// The message shown to the user when this error ends an attempt.
    ///
    /// Validation descriptions come from the backend and are shown verbatim;
    /// everything else collapses to the generic fallback.
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::Validation(description) => description.clone(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

/// Result type alias for checkout operations
pub type GatewayResult<T> = Result<T, GatewayError>;
