//! # Payment Types
//!
//! Payment attempts, method payloads, and card network classification.
//! An attempt is created when the user submits a method form; its status
//! transitions only via poll responses and is immutable once terminal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Payment methods offered on the method-selection screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Upi,
    Card,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Upi => "upi",
            PaymentMethod::Card => "card",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Card fields collected by the card form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDetails {
    pub number: String,
    pub expiry_month: String,
    pub expiry_year: String,
    pub cvv: String,
    pub holder_name: String,
}

/// Method-specific payload submitted to the public payment endpoint.
///
/// Serializes to the backend's wire shape:
///
/// ```json
/// {"method":"upi","vpa":"username@bank"}
/// {"method":"card","card":{"number":"...","expiry_month":"...","expiry_year":"...","cvv":"...","holder_name":"..."}}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum MethodPayload {
    Upi { vpa: String },
    Card { card: CardDetails },
}

impl MethodPayload {
    /// Build a UPI payload from a virtual payment address
    pub fn upi(vpa: impl Into<String>) -> Self {
        MethodPayload::Upi { vpa: vpa.into() }
    }

    /// Build a card payload
    pub fn card(card: CardDetails) -> Self {
        MethodPayload::Card { card }
    }

    /// The payment method this payload belongs to
    pub fn method(&self) -> PaymentMethod {
        match self {
            MethodPayload::Upi { .. } => PaymentMethod::Upi,
            MethodPayload::Card { .. } => PaymentMethod::Card,
        }
    }
}

/// Status of a payment attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptStatus {
    /// Accepted by the backend, awaiting the async worker
    Pending,
    /// Processed successfully
    Success,
    /// Declined or errored; carries an error description when available
    Failed,
}

impl AttemptStatus {
    /// Terminal statuses never change again
    pub fn is_terminal(&self) -> bool {
        matches!(self, AttemptStatus::Success | AttemptStatus::Failed)
    }
}

impl Default for AttemptStatus {
    fn default() -> Self {
        AttemptStatus::Pending
    }
}

/// One user-initiated submission of payment details against an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentAttempt {
    /// Backend-assigned attempt identifier (e.g. "pay_H8skLm")
    pub id: String,

    /// The order this attempt pays for
    pub order_id: String,

    /// Method the user chose
    pub method: PaymentMethod,

    /// Current status; transitions only via poll responses
    pub status: AttemptStatus,

    /// Failure description for failed attempts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,

    /// When the submission was accepted
    pub created_at: DateTime<Utc>,
}

impl PaymentAttempt {
    /// Create a pending attempt from a backend submission response
    pub fn pending(
        id: impl Into<String>,
        order_id: impl Into<String>,
        method: PaymentMethod,
    ) -> Self {
        Self {
            id: id.into(),
            order_id: order_id.into(),
            method,
            status: AttemptStatus::Pending,
            error_description: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Card network, classified from the entered digit prefix.
///
/// Display-only: drives the badge on the card form and never affects
/// whether a submission is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardNetwork {
    Visa,
    Mastercard,
    Amex,
    Rupay,
    Unknown,
}

impl CardNetwork {
    /// Classify a (possibly partial) card number.
    ///
    /// Non-digits are ignored, so formatted input ("4111 1111 …")
    /// classifies the same as raw digits. A pure function of the prefix:
    /// recomputing on every keystroke is safe.
    pub fn detect(number: &str) -> Self {
        let digits: String = number.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.starts_with('4') {
            return CardNetwork::Visa;
        }
        let two: u32 = digits.get(..2).and_then(|p| p.parse().ok()).unwrap_or(0);
        let four: u32 = digits.get(..4).and_then(|p| p.parse().ok()).unwrap_or(0);
        if (51..=55).contains(&two) || (2221..=2720).contains(&four) {
            CardNetwork::Mastercard
        } else if two == 34 || two == 37 {
            CardNetwork::Amex
        } else if matches!(two, 60 | 65 | 81..=89) {
            CardNetwork::Rupay
        } else {
            CardNetwork::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CardNetwork::Visa => "visa",
            CardNetwork::Mastercard => "mastercard",
            CardNetwork::Amex => "amex",
            CardNetwork::Rupay => "rupay",
            CardNetwork::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for CardNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
