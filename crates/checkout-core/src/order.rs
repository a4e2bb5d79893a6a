//! # Order Types
//!
//! Read-only view of a backend order, as served by the public order
//! endpoint. Orders are fetched once per checkout session and never
//! mutated client-side.

use serde::{Deserialize, Serialize};

/// A backend-issued payable unit with fixed amount and currency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Backend-assigned order identifier (e.g. "order_Nxa93k")
    pub id: String,

    /// Amount in integer minor currency units (paise, cents)
    pub amount: i64,

    /// ISO 4217 currency code as reported by the backend
    pub currency: String,

    /// Order lifecycle status (informational to this core)
    pub status: String,
}

impl Order {
    /// Format the amount in major units with exactly two decimals.
    ///
    /// Computed from the stored integer on every call; repeated renders
    /// cannot accumulate floating-point drift.
    pub fn display_amount(&self) -> String {
        let sign = if self.amount < 0 { "-" } else { "" };
        let minor = self.amount.unsigned_abs();
        format!("{}{}.{:02}", sign, minor / 100, minor % 100)
    }
}
