//! # Status Poller
//!
//! Discovers the terminal outcome of a payment attempt by polling the
//! public status endpoint on a fixed cadence. The backend processes
//! payments out-of-band and offers no push channel, so polling is the
//! only way the checkout surface learns the result.
//!
//! The loop is a cancellable task, not a timer callback: the caller holds
//! a [`PollHandle`] and either awaits the terminal [`PollResolution`] or
//! cancels. Transient errors (the record may still be enqueuing, the
//! network may hiccup) never stop the loop: availability over fast-fail.

use checkout_core::{AttemptStatus, BoxedPaymentApi, PaymentStatus};
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// Default poll cadence. Payment confirmations are expected to complete
/// within seconds to low minutes, so a fixed interval with no backoff is
/// the policy.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Terminal outcome of one polling loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollResolution {
    /// The attempt reached `success`; carries the final status observation
    Success(PaymentStatus),

    /// The attempt reached `failed`, with the backend's description when
    /// one was supplied
    Failed { description: Option<String> },
}

/// Cancellation token bound to one in-flight polling loop.
///
/// At most one live handle exists per checkout session. Dropping the
/// handle cancels the loop; a response in flight at cancellation is
/// discarded, never delivered.
#[derive(Debug)]
pub struct PollHandle {
    payment_id: String,
    cancel: watch::Sender<bool>,
    resolution: oneshot::Receiver<PollResolution>,
}

impl PollHandle {
    /// The attempt this loop polls
    pub fn payment_id(&self) -> &str {
        &self.payment_id
    }

    /// Stop the loop deterministically: no further ticks fire after this
    /// returns and any in-flight response is discarded. Cancelling twice,
    /// or cancelling a finished loop, is a no-op.
    pub fn cancel(&self) {
        let _ = self.cancel.send(true);
    }

    /// Wait for the terminal resolution. Returns `None` if the loop ended
    /// without one (cancellation or task failure).
    pub async fn resolved(&mut self) -> Option<PollResolution> {
        (&mut self.resolution).await.ok()
    }
}

/// Spawns fixed-cadence polling loops
pub struct StatusPoller;

impl StatusPoller {
    /// Spawn a polling loop for `payment_id` at the default cadence
    pub fn spawn(api: BoxedPaymentApi, payment_id: impl Into<String>) -> PollHandle {
        Self::spawn_with_interval(api, payment_id, DEFAULT_POLL_INTERVAL)
    }

    /// Spawn with an explicit cadence
    pub fn spawn_with_interval(
        api: BoxedPaymentApi,
        payment_id: impl Into<String>,
        interval: Duration,
    ) -> PollHandle {
        let payment_id = payment_id.into();
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let (resolution_tx, resolution_rx) = oneshot::channel();

        tokio::spawn(poll_loop(
            api,
            payment_id.clone(),
            interval,
            cancel_rx,
            resolution_tx,
        ));

        PollHandle {
            payment_id,
            cancel: cancel_tx,
            resolution: resolution_rx,
        }
    }
}

async fn poll_loop(
    api: BoxedPaymentApi,
    payment_id: String,
    interval: Duration,
    mut cancelled: watch::Receiver<bool>,
    resolution: oneshot::Sender<PollResolution>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // an interval fires immediately; consume that so the first poll waits
    // one full period after submission
    ticker.tick().await;

    loop {
        tokio::select! {
            biased;
            _ = cancelled.changed() => {
                debug!("Polling cancelled for {}", payment_id);
                return;
            }
            _ = ticker.tick() => {}
        }

        // ticks are strictly sequential: the next tick is not armed until
        // this request has resolved or errored
        let outcome = tokio::select! {
            biased;
            _ = cancelled.changed() => {
                debug!("Polling cancelled mid-request for {}", payment_id);
                return;
            }
            outcome = api.poll_payment_status(&payment_id) => outcome,
        };

        match outcome {
            Ok(status) if status.status == AttemptStatus::Success => {
                debug!("Attempt {} resolved: success", payment_id);
                let _ = resolution.send(PollResolution::Success(status));
                return;
            }
            Ok(status) if status.status == AttemptStatus::Failed => {
                debug!("Attempt {} resolved: failed", payment_id);
                let _ = resolution.send(PollResolution::Failed {
                    description: status.error_description,
                });
                return;
            }
            Ok(_) => {}
            Err(err) if err.is_transient() => {
                // the record might still be enqueuing; keep ticking
                debug!("Waiting for status update on {}: {}", payment_id, err);
            }
            Err(err) => {
                warn!("Unexpected poll error on {}: {}", payment_id, err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedApi;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_resolves_success_after_transient_misses() {
        let api = Arc::new(ScriptedApi::new().with_polls(vec![
            ScriptedApi::not_found(),
            ScriptedApi::not_found(),
            ScriptedApi::success("pay_1"),
        ]));

        let mut handle =
            StatusPoller::spawn_with_interval(api.clone(), "pay_1", DEFAULT_POLL_INTERVAL);

        let resolution = handle.resolved().await.expect("terminal resolution");
        match resolution {
            PollResolution::Success(status) => assert_eq!(status.id.as_deref(), Some("pay_1")),
            other => panic!("expected success, got {:?}", other),
        }
        assert_eq!(api.poll_count(), 3);

        // the loop stopped: no further ticks fire
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(api.poll_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolves_failure_with_description() {
        let api = Arc::new(
            ScriptedApi::new().with_polls(vec![ScriptedApi::failed(Some("insufficient funds"))]),
        );

        let mut handle =
            StatusPoller::spawn_with_interval(api.clone(), "pay_1", DEFAULT_POLL_INTERVAL);

        assert_eq!(
            handle.resolved().await,
            Some(PollResolution::Failed {
                description: Some("insufficient funds".to_string())
            })
        );
        assert_eq!(api.poll_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unexpected_errors_do_not_stop_the_loop() {
        let api = Arc::new(ScriptedApi::new().with_polls(vec![
            Err(checkout_core::GatewayError::Unknown("boom".into())),
            ScriptedApi::pending(),
            ScriptedApi::success("pay_1"),
        ]));

        let mut handle =
            StatusPoller::spawn_with_interval(api.clone(), "pay_1", DEFAULT_POLL_INTERVAL);

        assert!(matches!(
            handle.resolved().await,
            Some(PollResolution::Success(_))
        ));
        assert_eq!(api.poll_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_ticking() {
        let api = Arc::new(ScriptedApi::new()); // pending forever

        let mut handle =
            StatusPoller::spawn_with_interval(api.clone(), "pay_1", DEFAULT_POLL_INTERVAL);

        // let a couple of ticks land
        tokio::time::sleep(Duration::from_secs(5)).await;
        let before = api.poll_count();
        assert!(before >= 2);

        handle.cancel();
        handle.cancel(); // idempotent

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(api.poll_count(), before);
        assert_eq!(handle.resolved().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_the_loop() {
        let api = Arc::new(ScriptedApi::new());

        let handle = StatusPoller::spawn_with_interval(api.clone(), "pay_1", DEFAULT_POLL_INTERVAL);
        tokio::time::sleep(Duration::from_secs(3)).await;
        drop(handle);

        let before = api.poll_count();
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(api.poll_count(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_wait_a_full_period_before_first_poll() {
        let api = Arc::new(ScriptedApi::new());

        let _handle =
            StatusPoller::spawn_with_interval(api.clone(), "pay_1", DEFAULT_POLL_INTERVAL);

        tokio::time::sleep(Duration::from_millis(1_900)).await;
        assert_eq!(api.poll_count(), 0);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(api.poll_count(), 1);
    }
}
