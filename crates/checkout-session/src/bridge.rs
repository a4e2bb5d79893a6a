//! # Messaging Bridge
//!
//! One-directional, typed message channel from an embedded checkout
//! session to its embedding context. Only the three protocol events may
//! cross the boundary. In standalone mode the bridge is inert: nothing is
//! sent and no listener is required.

use checkout_core::{FrameMessage, ProtocolEvent};
use tokio::sync::broadcast;
use tracing::debug;

/// Capacity of the frame boundary channel. Protocol traffic is a handful
/// of events per session.
const FRAME_CHANNEL_CAPACITY: usize = 16;

/// The embedding boundary: a broadcast channel standing in for the host
/// window. Every listener subscribed at post time observes the message.
#[derive(Debug, Clone)]
pub struct FrameChannel {
    tx: broadcast::Sender<FrameMessage>,
}

impl FrameChannel {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(FRAME_CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Subscribe a listener to messages posted after this call
    pub fn subscribe(&self) -> broadcast::Receiver<FrameMessage> {
        self.tx.subscribe()
    }

    fn sender(&self) -> broadcast::Sender<FrameMessage> {
        self.tx.clone()
    }
}

impl Default for FrameChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// Relays protocol events across the frame boundary
#[derive(Debug, Clone)]
pub struct MessagingBridge {
    target: Option<Target>,
}

#[derive(Debug, Clone)]
struct Target {
    tx: broadcast::Sender<FrameMessage>,
    origin: String,
}

impl MessagingBridge {
    /// Bridge for a standalone session: posts nothing
    pub fn standalone() -> Self {
        Self { target: None }
    }

    /// Bridge for an embedded session. Posted events are tagged with the
    /// frame's `origin` so receivers can filter on it.
    pub fn embedded(channel: &FrameChannel, origin: impl Into<String>) -> Self {
        Self {
            target: Some(Target {
                tx: channel.sender(),
                origin: origin.into(),
            }),
        }
    }

    pub fn is_embedded(&self) -> bool {
        self.target.is_some()
    }

    /// Post a protocol event to the embedding context.
    ///
    /// A send with no live listener is not an error: the frame broadcasts
    /// without knowing who, if anyone, is listening on the host side.
    pub fn post(&self, event: ProtocolEvent) {
        if let Some(target) = &self.target {
            debug!("Posting {:?} from {}", event, target.origin);
            let _ = target.tx.send(FrameMessage {
                origin: target.origin.clone(),
                event,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_embedded_bridge_delivers_tagged_events() {
        let channel = FrameChannel::new();
        let mut listener = channel.subscribe();

        let bridge = MessagingBridge::embedded(&channel, "http://localhost:3001");
        assert!(bridge.is_embedded());

        bridge.post(ProtocolEvent::PaymentFailed {
            error: "declined".into(),
        });

        let message = listener.recv().await.unwrap();
        assert_eq!(message.origin, "http://localhost:3001");
        assert_eq!(
            message.event,
            ProtocolEvent::PaymentFailed {
                error: "declined".into()
            }
        );
    }

    #[tokio::test]
    async fn test_every_subscriber_observes_the_broadcast() {
        let channel = FrameChannel::new();
        let mut first = channel.subscribe();
        let mut second = channel.subscribe();

        MessagingBridge::embedded(&channel, "http://localhost:3001")
            .post(ProtocolEvent::CloseModal);

        assert_eq!(first.recv().await.unwrap().event, ProtocolEvent::CloseModal);
        assert_eq!(second.recv().await.unwrap().event, ProtocolEvent::CloseModal);
    }

    #[test]
    fn test_posting_without_listeners_is_fine() {
        let channel = FrameChannel::new();
        let bridge = MessagingBridge::embedded(&channel, "http://localhost:3001");
        bridge.post(ProtocolEvent::CloseModal);
    }

    #[test]
    fn test_standalone_bridge_is_inert() {
        let bridge = MessagingBridge::standalone();
        assert!(!bridge.is_embedded());
        bridge.post(ProtocolEvent::PaymentSuccess {
            payment_id: "pay_1".into(),
            order_id: "order_1".into(),
        });
    }
}
