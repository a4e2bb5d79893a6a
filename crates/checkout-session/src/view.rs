//! # Session View State
//!
//! The UI-visible state of a checkout session. Exactly one view is active
//! at a time, owned exclusively by the state machine; it drives what is
//! rendered and is never persisted.

use checkout_core::{PaymentAttempt, PaymentMethod};

/// What the checkout surface shows right now
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    /// Order fetch in flight; nothing to render yet
    Loading,

    /// Method selection screen
    Selection,

    /// A method form: UPI VPA entry or card entry
    MethodForm(PaymentMethod),

    /// Submission accepted; awaiting the async worker via polling.
    /// Transient poll failures stay invisible here: the user keeps
    /// seeing this screen until a terminal outcome arrives.
    Processing,

    /// Terminal: the attempt succeeded. Carries the final payment payload
    /// for display on the success screen.
    Success { payment: PaymentAttempt },

    /// Terminal failure screen with "try again" and "cancel" affordances
    Error { message: String },
}

impl ViewState {
    /// Terminal views end the attempt; only `Error` offers a way back
    pub fn is_terminal(&self) -> bool {
        matches!(self, ViewState::Success { .. } | ViewState::Error { .. })
    }

    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            ViewState::Loading => "loading",
            ViewState::Selection => "selection",
            ViewState::MethodForm(PaymentMethod::Upi) => "upi-form",
            ViewState::MethodForm(PaymentMethod::Card) => "card-form",
            ViewState::Processing => "processing",
            ViewState::Success { .. } => "success",
            ViewState::Error { .. } => "error",
        }
    }
}
