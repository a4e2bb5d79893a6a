//! # Checkout Session
//!
//! The checkout state machine. A session runs as its own task (the
//! "frame"): a select loop over user actions and the live poller's
//! resolution, so every transition happens on a discrete event and no
//! transition can observe another's half-updated state.
//!
//! Flow: `selection → {upi-form | card-form} → processing → {success |
//! error}`, with `error → selection` as the only backward transition.
//! Entering `processing` submits the form payload and starts exactly one
//! status poller; the poll handle is invalidated before any new attempt
//! starts and before teardown.

use crate::bridge::MessagingBridge;
use crate::params::SessionParams;
use crate::poller::{PollHandle, PollResolution, StatusPoller, DEFAULT_POLL_INTERVAL};
use crate::view::ViewState;
use checkout_core::{
    AttemptStatus, BoxedPaymentApi, CardNetwork, GatewayError, GatewayResult, MethodPayload,
    Order, PaymentAttempt, PaymentMethod, ProtocolEvent, GENERIC_FAILURE_MESSAGE,
};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Failure message shown when a declined attempt carries no description
pub const DEFAULT_DECLINE_MESSAGE: &str = "Transaction declined by bank";

const ACTION_CHANNEL_CAPACITY: usize = 16;

/// Discrete entry points into the state machine
#[derive(Debug, Clone, PartialEq)]
pub enum UserAction {
    /// Choose a method on the selection screen
    SelectMethod(PaymentMethod),

    /// Leave a method form back to selection
    Back,

    /// A keystroke in the card number field; recomputes the network badge
    CardNumberInput(String),

    /// Submit the active method form
    Submit(MethodPayload),

    /// "Try Again" on the failure screen
    Retry,

    /// "Finish" on the success screen: closes the originating context
    Finish,

    /// "Cancel" on the failure screen: closes the originating context
    Cancel,
}

/// What the checkout surface renders at any instant
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    /// The active view
    pub view: ViewState,

    /// The order once fetched; the amount line is recomputed from its
    /// stored integer on every render
    pub order: Option<Order>,

    /// Card network badge for the card form
    pub card_network: CardNetwork,
}

impl SessionSnapshot {
    fn initial() -> Self {
        Self {
            view: ViewState::Loading,
            order: None,
            card_network: CardNetwork::Unknown,
        }
    }
}

/// Handle to a running session: the frame's UI surface.
///
/// Clonable; dropping every clone is "navigating away", after which the
/// session invalidates its poll handle and ends.
#[derive(Debug, Clone)]
pub struct SessionDriver {
    actions: mpsc::Sender<UserAction>,
    snapshot: watch::Receiver<SessionSnapshot>,
}

impl SessionDriver {
    /// Dispatch a user action into the session
    pub async fn dispatch(&self, action: UserAction) -> GatewayResult<()> {
        self.actions
            .send(action)
            .await
            .map_err(|_| GatewayError::Unknown("checkout session has ended".to_string()))
    }

    pub async fn select_method(&self, method: PaymentMethod) -> GatewayResult<()> {
        self.dispatch(UserAction::SelectMethod(method)).await
    }

    pub async fn card_number_input(&self, number: impl Into<String>) -> GatewayResult<()> {
        self.dispatch(UserAction::CardNumberInput(number.into())).await
    }

    pub async fn submit(&self, payload: MethodPayload) -> GatewayResult<()> {
        self.dispatch(UserAction::Submit(payload)).await
    }

    pub async fn retry(&self) -> GatewayResult<()> {
        self.dispatch(UserAction::Retry).await
    }

    pub async fn finish(&self) -> GatewayResult<()> {
        self.dispatch(UserAction::Finish).await
    }

    pub async fn cancel(&self) -> GatewayResult<()> {
        self.dispatch(UserAction::Cancel).await
    }

    /// The current render snapshot
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.borrow().clone()
    }

    /// The current view
    pub fn view(&self) -> ViewState {
        self.snapshot.borrow().view.clone()
    }

    /// Wait until the snapshot satisfies a predicate
    pub async fn wait_for(
        &mut self,
        predicate: impl FnMut(&SessionSnapshot) -> bool,
    ) -> GatewayResult<SessionSnapshot> {
        self.snapshot
            .wait_for(predicate)
            .await
            .map(|snapshot| snapshot.clone())
            .map_err(|_| GatewayError::Unknown("checkout session has ended".to_string()))
    }
}

enum Flow {
    Continue,
    Stop,
}

enum SessionEvent {
    Action(UserAction),
    Resolved(Option<PollResolution>),
    DriverGone,
}

/// One checkout session's state machine
pub struct CheckoutSession {
    params: SessionParams,
    api: BoxedPaymentApi,
    bridge: MessagingBridge,
    poll_interval: Duration,
    actions: mpsc::Receiver<UserAction>,
    snapshot: watch::Sender<SessionSnapshot>,
    attempt: Option<PaymentAttempt>,
    poller: Option<PollHandle>,
}

impl CheckoutSession {
    /// Spawn a session task. Returns the driver plus the task handle so a
    /// standalone caller can await session end.
    pub fn spawn(
        api: BoxedPaymentApi,
        params: SessionParams,
        bridge: MessagingBridge,
    ) -> (SessionDriver, JoinHandle<()>) {
        Self::spawn_with_poll_interval(api, params, bridge, DEFAULT_POLL_INTERVAL)
    }

    /// Spawn with an explicit poll cadence
    pub fn spawn_with_poll_interval(
        api: BoxedPaymentApi,
        params: SessionParams,
        bridge: MessagingBridge,
        poll_interval: Duration,
    ) -> (SessionDriver, JoinHandle<()>) {
        let (action_tx, action_rx) = mpsc::channel(ACTION_CHANNEL_CAPACITY);
        let (snapshot_tx, snapshot_rx) = watch::channel(SessionSnapshot::initial());

        let session = Self {
            params,
            api,
            bridge,
            poll_interval,
            actions: action_rx,
            snapshot: snapshot_tx,
            attempt: None,
            poller: None,
        };

        let task = tokio::spawn(session.run());

        (
            SessionDriver {
                actions: action_tx,
                snapshot: snapshot_rx,
            },
            task,
        )
    }

    #[instrument(skip(self), fields(order_id = %self.params.order_id, embedded = self.params.embedded))]
    async fn run(mut self) {
        self.load().await;

        loop {
            match self.next_event().await {
                SessionEvent::Action(action) => {
                    if let Flow::Stop = self.handle_action(action).await {
                        break;
                    }
                }
                SessionEvent::Resolved(resolution) => self.apply_resolution(resolution),
                SessionEvent::DriverGone => {
                    debug!("Driver dropped; tearing down session");
                    break;
                }
            }
        }

        self.teardown();
    }

    /// Fetch the order once; until it resolves the session stays in the
    /// implicit loading state.
    async fn load(&mut self) {
        match self.api.fetch_order(&self.params.order_id).await {
            Ok(order) => {
                info!(
                    "Loaded order {}: {} {}",
                    order.id,
                    order.display_amount(),
                    order.currency
                );
                self.snapshot.send_modify(|s| s.order = Some(order));
                self.set_view(ViewState::Selection);
            }
            Err(err) => {
                warn!("Order fetch failed: {}", err);
                self.set_view(ViewState::Error {
                    message: err.user_message(),
                });
            }
        }
    }

    /// Wait for the next discrete event: a user action, or the live
    /// poller's terminal resolution.
    async fn next_event(&mut self) -> SessionEvent {
        let Self {
            actions, poller, ..
        } = self;

        let poll_resolution = async {
            match poller.as_mut() {
                Some(handle) => handle.resolved().await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            action = actions.recv() => match action {
                Some(action) => SessionEvent::Action(action),
                None => SessionEvent::DriverGone,
            },
            resolution = poll_resolution => SessionEvent::Resolved(resolution),
        }
    }

    async fn handle_action(&mut self, action: UserAction) -> Flow {
        match action {
            UserAction::SelectMethod(method) => {
                if matches!(self.view(), ViewState::Selection) {
                    self.snapshot
                        .send_modify(|s| s.card_network = CardNetwork::Unknown);
                    self.set_view(ViewState::MethodForm(method));
                }
                Flow::Continue
            }
            UserAction::Back => {
                if matches!(self.view(), ViewState::MethodForm(_)) {
                    self.set_view(ViewState::Selection);
                }
                Flow::Continue
            }
            UserAction::CardNumberInput(number) => {
                if matches!(self.view(), ViewState::MethodForm(PaymentMethod::Card)) {
                    let network = CardNetwork::detect(&number);
                    self.snapshot.send_modify(|s| s.card_network = network);
                }
                Flow::Continue
            }
            UserAction::Submit(payload) => {
                self.submit(payload).await;
                Flow::Continue
            }
            UserAction::Retry => {
                if matches!(self.view(), ViewState::Error { .. }) {
                    // discard the failed attempt and its message; the order
                    // is not re-fetched
                    self.attempt = None;
                    self.set_view(ViewState::Selection);
                }
                Flow::Continue
            }
            UserAction::Finish => {
                if matches!(self.view(), ViewState::Success { .. }) {
                    self.bridge.post(ProtocolEvent::CloseModal);
                    return Flow::Stop;
                }
                Flow::Continue
            }
            UserAction::Cancel => {
                self.bridge.post(ProtocolEvent::CloseModal);
                Flow::Stop
            }
        }
    }

    /// Submit the active form's payload and start polling the attempt.
    ///
    /// Refused outside a method form, which also forbids a second
    /// submission while `processing` is active.
    async fn submit(&mut self, payload: MethodPayload) {
        if !matches!(self.view(), ViewState::MethodForm(_)) {
            warn!("Submission ignored outside a method form");
            return;
        }

        // the poll handle must be invalidated before any new attempt starts
        self.invalidate_poller();
        self.set_view(ViewState::Processing);

        match self
            .api
            .submit_payment(&self.params.order_id, &payload)
            .await
        {
            Ok(submission) => {
                let attempt = PaymentAttempt::pending(
                    submission.payment_id.clone(),
                    self.params.order_id.clone(),
                    payload.method(),
                );
                info!("Attempt {} pending; starting status poller", attempt.id);
                self.attempt = Some(attempt);
                self.poller = Some(StatusPoller::spawn_with_interval(
                    self.api.clone(),
                    submission.payment_id,
                    self.poll_interval,
                ));
            }
            Err(err) => {
                warn!("Submission failed: {}", err);
                self.fail(err.user_message());
            }
        }
    }

    fn apply_resolution(&mut self, resolution: Option<PollResolution>) {
        // whatever happened, this handle is spent
        self.poller = None;

        let Some(resolution) = resolution else {
            warn!("Poller ended without a resolution");
            self.fail(GENERIC_FAILURE_MESSAGE.to_string());
            return;
        };

        match resolution {
            PollResolution::Success(_) => {
                let Some(attempt) = self.attempt.as_mut() else {
                    return;
                };
                attempt.status = AttemptStatus::Success;
                let payment = attempt.clone();
                info!("Attempt {} succeeded", payment.id);
                self.bridge.post(ProtocolEvent::PaymentSuccess {
                    payment_id: payment.id.clone(),
                    order_id: self.params.order_id.clone(),
                });
                self.set_view(ViewState::Success { payment });
            }
            PollResolution::Failed { description } => {
                let message =
                    description.unwrap_or_else(|| DEFAULT_DECLINE_MESSAGE.to_string());
                info!("Attempt failed: {}", message);
                self.fail(message);
            }
        }
    }

    /// Land on the failure screen and notify the embedding context.
    ///
    /// Submission failures notify it too, not just poll failures.
    fn fail(&mut self, message: String) {
        if let Some(attempt) = self.attempt.as_mut() {
            if !attempt.is_terminal() {
                attempt.status = AttemptStatus::Failed;
                attempt.error_description = Some(message.clone());
            }
        }
        self.bridge.post(ProtocolEvent::PaymentFailed {
            error: message.clone(),
        });
        self.set_view(ViewState::Error { message });
    }

    fn invalidate_poller(&mut self) {
        if let Some(handle) = self.poller.take() {
            debug!("Invalidating poll handle for {}", handle.payment_id());
            handle.cancel();
            // dropping the handle discards any response already in flight
        }
    }

    fn teardown(&mut self) {
        self.invalidate_poller();
        debug!("Checkout session for {} ended", self.params.order_id);
    }

    fn view(&self) -> ViewState {
        self.snapshot.borrow().view.clone()
    }

    fn set_view(&mut self, view: ViewState) {
        let from = self.snapshot.borrow().view.name();
        debug!("View transition: {} -> {}", from, view.name());
        self.snapshot.send_modify(|s| s.view = view);
    }
}
