//! # Embeddable Gateway Object
//!
//! The widget's public entry point, instantiated by the host page. The
//! gateway owns the embedded frame's lifecycle: `open()` creates exactly
//! one frame (an embedded checkout session behind a frame channel),
//! registers exactly one message listener, and publishes itself as the
//! single active instance. Protocol events arriving from the frame drive
//! the host callbacks; `close()` tears everything down idempotently.

use crate::config::{GatewayConfig, DEFAULT_CHECKOUT_ORIGIN};
use crate::events::GatewayEvents;
use checkout_core::{BoxedPaymentApi, FrameMessage, ProtocolEvent};
use checkout_session::{
    CheckoutSession, FrameChannel, MessagingBridge, SessionDriver, SessionParams,
    DEFAULT_POLL_INTERVAL,
};
use std::sync::{Arc, Mutex, OnceLock, Weak};
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Registry slot holding the single active gateway instance.
///
/// Single-writer discipline: only `open()` and `close()` touch the slot,
/// and `close()` restores it to empty before tearing anything down. The
/// default is the process-wide slot; embedders (and tests) can supply
/// their own for isolation.
#[derive(Clone, Default)]
pub struct ActiveGatewayRegistry {
    slot: Arc<Mutex<Option<GatewayHandle>>>,
}

impl ActiveGatewayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide default registry
    pub fn global() -> Self {
        static GLOBAL: OnceLock<ActiveGatewayRegistry> = OnceLock::new();
        GLOBAL.get_or_init(ActiveGatewayRegistry::new).clone()
    }

    /// The currently active gateway, if any
    pub fn active(&self) -> Option<GatewayHandle> {
        self.slot.lock().unwrap().clone()
    }
}

/// Embeddable gateway object, constructed by the host page
pub struct CheckoutGateway {
    order_id: String,
    api: BoxedPaymentApi,
    events: Arc<dyn GatewayEvents>,
    checkout_origin: String,
    poll_interval: Duration,
    registry: ActiveGatewayRegistry,
}

impl CheckoutGateway {
    /// Construct a gateway for one order. Callbacks default to no-ops via
    /// the `GatewayEvents` trait defaults.
    pub fn new(
        order_id: impl Into<String>,
        api: BoxedPaymentApi,
        events: Arc<dyn GatewayEvents>,
    ) -> Self {
        Self {
            order_id: order_id.into(),
            api,
            events,
            checkout_origin: DEFAULT_CHECKOUT_ORIGIN.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            registry: ActiveGatewayRegistry::global(),
        }
    }

    /// Builder: apply a loaded configuration
    pub fn with_config(mut self, config: &GatewayConfig) -> Self {
        self.checkout_origin = config.checkout_origin.clone();
        self
    }

    /// Builder: set the expected checkout frame origin. Frame messages
    /// from any other origin are ignored by the listener.
    pub fn with_checkout_origin(mut self, origin: impl Into<String>) -> Self {
        self.checkout_origin = origin.into();
        self
    }

    /// Builder: set the status poll cadence for the embedded session
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Builder: use a private active-instance registry instead of the
    /// process-wide slot
    pub fn with_registry(mut self, registry: ActiveGatewayRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Open the widget: spawn the embedded checkout session, register one
    /// message listener, and publish this instance as the active one.
    ///
    /// If another instance is active its resources are released first, so
    /// two live listeners never coexist.
    pub fn open(self) -> GatewayHandle {
        let (closed_tx, _) = watch::channel(false);
        let inner = Arc::new(GatewayInner {
            order_id: self.order_id.clone(),
            events: self.events,
            registry: self.registry.clone(),
            frame: Mutex::new(None),
            closed: closed_tx,
        });
        let handle = GatewayHandle {
            inner: inner.clone(),
        };

        // the frame boundary and the embedded session living behind it
        let channel = FrameChannel::new();
        let bridge = MessagingBridge::embedded(&channel, self.checkout_origin.clone());
        let (driver, session_task) = CheckoutSession::spawn_with_poll_interval(
            self.api,
            SessionParams::new(self.order_id.clone()).embedded(),
            bridge,
            self.poll_interval,
        );

        let listener_task = tokio::spawn(listen(
            channel.subscribe(),
            Arc::downgrade(&inner),
            self.checkout_origin,
        ));

        *inner.frame.lock().unwrap() = Some(Frame {
            driver,
            session_task,
            listener_task,
        });

        {
            let mut slot = self.registry.slot.lock().unwrap();
            if let Some(previous) = slot.take() {
                info!(
                    "Releasing previously active gateway for order {}",
                    previous.inner.order_id
                );
                previous.inner.close(false);
            }
            *slot = Some(handle.clone());
        }

        info!("Gateway opened for order {}", self.order_id);
        handle
    }
}

/// Handle to an opened gateway, retained by the host page
#[derive(Clone)]
pub struct GatewayHandle {
    inner: Arc<GatewayInner>,
}

impl GatewayHandle {
    pub fn order_id(&self) -> &str {
        &self.inner.order_id
    }

    /// Whether the frame is still up
    pub fn is_open(&self) -> bool {
        self.inner.frame.lock().unwrap().is_some()
    }

    /// Driver for the checkout surface inside the frame, while it is open
    pub fn driver(&self) -> Option<SessionDriver> {
        self.inner
            .frame
            .lock()
            .unwrap()
            .as_ref()
            .map(|frame| frame.driver.clone())
    }

    /// Close the widget: empty the registry slot, tear down the frame and
    /// listener, invoke `on_close`. Idempotent: closing an already-closed
    /// gateway does nothing further.
    pub fn close(&self) {
        self.inner.close(true);
    }

    /// Resolves once the gateway has closed (by callback, in-frame close,
    /// or an explicit `close()` call)
    pub async fn closed(&self) {
        let mut rx = self.inner.closed.subscribe();
        let _ = rx.wait_for(|closed| *closed).await;
    }
}

struct Frame {
    driver: SessionDriver,
    session_task: JoinHandle<()>,
    listener_task: JoinHandle<()>,
}

struct GatewayInner {
    order_id: String,
    events: Arc<dyn GatewayEvents>,
    registry: ActiveGatewayRegistry,
    frame: Mutex<Option<Frame>>,
    closed: watch::Sender<bool>,
}

impl GatewayInner {
    fn close(&self, unregister: bool) {
        if unregister {
            // restore the slot to empty before tearing anything down, and
            // only if it still points at this instance
            let mut slot = self.registry.slot.lock().unwrap();
            if slot
                .as_ref()
                .is_some_and(|handle| std::ptr::eq(Arc::as_ptr(&handle.inner), self))
            {
                *slot = None;
            }
        }

        let frame = self.frame.lock().unwrap().take();
        let Some(frame) = frame else {
            debug!("close() with no open frame; nothing to do");
            return;
        };

        // stopping the session drops its poll handle, which cancels any
        // live polling loop
        frame.listener_task.abort();
        frame.session_task.abort();
        drop(frame.driver);

        let _ = self.closed.send(true);
        self.events.on_close();
        info!("Gateway closed for order {}", self.order_id);
    }
}

/// The single message listener registered by `open()`
async fn listen(
    mut rx: broadcast::Receiver<FrameMessage>,
    gateway: Weak<GatewayInner>,
    allowed_origin: String,
) {
    loop {
        let message = match rx.recv().await {
            Ok(message) => message,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("Frame listener lagged, skipped {} messages", skipped);
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => return,
        };

        if message.origin != allowed_origin {
            warn!(
                "Ignoring frame message from unexpected origin {}",
                message.origin
            );
            continue;
        }

        let Some(gateway) = gateway.upgrade() else {
            return;
        };

        match message.event {
            ProtocolEvent::PaymentSuccess {
                payment_id,
                order_id,
            } => {
                gateway.events.on_success(&payment_id, &order_id);
                gateway.close(true);
                return;
            }
            ProtocolEvent::PaymentFailed { error } => {
                // no close: the user can retry inside the still-open frame
                gateway.events.on_failure(&error);
            }
            ProtocolEvent::CloseModal => {
                gateway.close(true);
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use checkout_core::{
        AttemptStatus, GatewayResult, MethodPayload, Order, PaymentApi, PaymentMethod,
        PaymentStatus, PaymentSubmission,
    };
    use checkout_session::ViewState;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const ORIGIN: &str = "http://localhost:3001";

    /// Backend fake whose poll responses are scripted up front; once the
    /// script runs dry every further poll reports `pending`.
    struct ScriptedApi {
        polls: Mutex<VecDeque<GatewayResult<PaymentStatus>>>,
    }

    impl ScriptedApi {
        fn with_polls(polls: Vec<GatewayResult<PaymentStatus>>) -> Arc<Self> {
            Arc::new(Self {
                polls: Mutex::new(polls.into()),
            })
        }

        fn pending() -> GatewayResult<PaymentStatus> {
            Ok(PaymentStatus {
                id: None,
                status: AttemptStatus::Pending,
                error_description: None,
            })
        }
    }

    #[async_trait]
    impl PaymentApi for ScriptedApi {
        async fn fetch_order(&self, order_id: &str) -> GatewayResult<Order> {
            Ok(Order {
                id: order_id.to_string(),
                amount: 50_000,
                currency: "INR".to_string(),
                status: "created".to_string(),
            })
        }

        async fn submit_payment(
            &self,
            _order_id: &str,
            _payload: &MethodPayload,
        ) -> GatewayResult<PaymentSubmission> {
            Ok(PaymentSubmission {
                payment_id: "pay_1".to_string(),
            })
        }

        async fn poll_payment_status(&self, _payment_id: &str) -> GatewayResult<PaymentStatus> {
            self.polls
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(Self::pending)
        }
    }

    #[derive(Default)]
    struct RecordingEvents {
        successes: Mutex<Vec<(String, String)>>,
        failures: Mutex<Vec<String>>,
        closes: AtomicUsize,
    }

    impl GatewayEvents for RecordingEvents {
        fn on_success(&self, payment_id: &str, order_id: &str) {
            self.successes
                .lock()
                .unwrap()
                .push((payment_id.to_string(), order_id.to_string()));
        }

        fn on_failure(&self, error: &str) {
            self.failures.lock().unwrap().push(error.to_string());
        }

        fn on_close(&self) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn success_status(id: &str) -> GatewayResult<PaymentStatus> {
        Ok(PaymentStatus {
            id: Some(id.to_string()),
            status: AttemptStatus::Success,
            error_description: None,
        })
    }

    fn failed_status(description: &str) -> GatewayResult<PaymentStatus> {
        Ok(PaymentStatus {
            id: None,
            status: AttemptStatus::Failed,
            error_description: Some(description.to_string()),
        })
    }

    fn open_gateway(
        api: Arc<ScriptedApi>,
        events: Arc<RecordingEvents>,
    ) -> (GatewayHandle, ActiveGatewayRegistry) {
        let registry = ActiveGatewayRegistry::new();
        let handle = CheckoutGateway::new("order_1", api, events)
            .with_registry(registry.clone())
            .with_poll_interval(Duration::from_millis(50))
            .open();
        (handle, registry)
    }

    async fn drive_upi_attempt(handle: &GatewayHandle) {
        let mut driver = handle.driver().expect("frame should be open");
        driver
            .wait_for(|s| matches!(s.view, ViewState::Selection))
            .await
            .unwrap();
        driver.select_method(PaymentMethod::Upi).await.unwrap();
        driver
            .submit(MethodPayload::upi("alice@bank"))
            .await
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_invokes_callback_then_closes_once() {
        let api = ScriptedApi::with_polls(vec![success_status("pay_1")]);
        let events = Arc::new(RecordingEvents::default());
        let (handle, registry) = open_gateway(api, events.clone());

        drive_upi_attempt(&handle).await;
        handle.closed().await;

        assert_eq!(
            events.successes.lock().unwrap().as_slice(),
            &[("pay_1".to_string(), "order_1".to_string())]
        );
        assert_eq!(events.closes.load(Ordering::SeqCst), 1);
        assert!(!handle.is_open());
        assert!(registry.active().is_none());

        // a later explicit close is a no-op
        handle.close();
        assert_eq!(events.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_does_not_close_the_frame() {
        let api = ScriptedApi::with_polls(vec![failed_status("insufficient funds")]);
        let events = Arc::new(RecordingEvents::default());
        let (handle, registry) = open_gateway(api, events.clone());

        drive_upi_attempt(&handle).await;

        let mut driver = handle.driver().expect("frame should stay open");
        driver
            .wait_for(|s| matches!(s.view, ViewState::Error { .. }))
            .await
            .unwrap();
        // let the listener drain the payment_failed message
        tokio::task::yield_now().await;

        assert_eq!(
            events.failures.lock().unwrap().as_slice(),
            &["insufficient funds".to_string()]
        );
        assert_eq!(events.closes.load(Ordering::SeqCst), 0);
        assert!(handle.is_open());
        assert!(registry.active().is_some());

        // the user can retry inside the still-open frame
        driver.retry().await.unwrap();
        driver
            .wait_for(|s| matches!(s.view, ViewState::Selection))
            .await
            .unwrap();

        handle.close();
        assert_eq!(events.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_is_idempotent() {
        let api = ScriptedApi::with_polls(vec![]);
        let events = Arc::new(RecordingEvents::default());
        let (handle, registry) = open_gateway(api, events.clone());

        handle.close();
        handle.close();
        handle.close();

        assert_eq!(events.closes.load(Ordering::SeqCst), 1);
        assert!(!handle.is_open());
        assert!(handle.driver().is_none());
        assert!(registry.active().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_open_releases_the_first_instance() {
        let registry = ActiveGatewayRegistry::new();
        let first_events = Arc::new(RecordingEvents::default());
        let second_events = Arc::new(RecordingEvents::default());

        let first_api: BoxedPaymentApi = ScriptedApi::with_polls(vec![]);
        let first = CheckoutGateway::new("order_1", first_api, first_events.clone())
            .with_registry(registry.clone())
            .open();

        let second_api: BoxedPaymentApi = ScriptedApi::with_polls(vec![]);
        let second = CheckoutGateway::new("order_2", second_api, second_events.clone())
            .with_registry(registry.clone())
            .open();

        // the first instance's resources were released before the second
        // was published; only one listener is ever live
        assert!(!first.is_open());
        assert_eq!(first_events.closes.load(Ordering::SeqCst), 1);
        assert!(second.is_open());
        assert_eq!(second_events.closes.load(Ordering::SeqCst), 0);
        assert_eq!(registry.active().unwrap().order_id(), "order_2");

        second.close();
        assert!(registry.active().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_frame_cancel_closes_via_close_modal() {
        let api = ScriptedApi::with_polls(vec![]);
        let events = Arc::new(RecordingEvents::default());
        let (handle, registry) = open_gateway(api, events.clone());

        let mut driver = handle.driver().unwrap();
        driver
            .wait_for(|s| matches!(s.view, ViewState::Selection))
            .await
            .unwrap();
        driver.cancel().await.unwrap();

        handle.closed().await;
        assert_eq!(events.closes.load(Ordering::SeqCst), 1);
        assert!(registry.active().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_listener_ignores_unexpected_origins() {
        let events = Arc::new(RecordingEvents::default());
        let (closed_tx, _) = watch::channel(false);
        let inner = Arc::new(GatewayInner {
            order_id: "order_1".to_string(),
            events: events.clone(),
            registry: ActiveGatewayRegistry::new(),
            frame: Mutex::new(None),
            closed: closed_tx,
        });

        let (tx, rx) = broadcast::channel(16);
        let listener = tokio::spawn(listen(rx, Arc::downgrade(&inner), ORIGIN.to_string()));

        tx.send(FrameMessage {
            origin: "http://evil.example".to_string(),
            event: ProtocolEvent::PaymentSuccess {
                payment_id: "pay_1".into(),
                order_id: "order_1".into(),
            },
        })
        .unwrap();
        tokio::task::yield_now().await;
        assert!(events.successes.lock().unwrap().is_empty());

        tx.send(FrameMessage {
            origin: ORIGIN.to_string(),
            event: ProtocolEvent::PaymentSuccess {
                payment_id: "pay_1".into(),
                order_id: "order_1".into(),
            },
        })
        .unwrap();
        listener.await.unwrap();
        assert_eq!(events.successes.lock().unwrap().len(), 1);
    }
}
