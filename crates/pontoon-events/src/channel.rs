//! Topic-keyed publish/subscribe channel.

use std::collections::HashMap;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::trace;

use pontoon_core::ids::SubscriptionId;

/// One event delivered over the channel.
#[derive(Clone, Debug, PartialEq)]
pub struct BusEvent {
    /// Topic the event was emitted on.
    pub topic: String,
    /// RFC 3339 emission timestamp.
    pub timestamp: String,
    /// Opaque payload (typed payloads live in [`crate::topics`]).
    pub data: Value,
}

impl BusEvent {
    fn new(topic: &str, data: Value) -> Self {
        Self {
            topic: topic.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            data,
        }
    }
}

/// A live subscription: identity plus the receiving end.
///
/// Dropping the receiver alone does not remove the registry entry;
/// call [`EventChannel::unsubscribe`] (dead senders are also pruned
/// lazily on the next `emit`).
pub struct Subscription {
    /// Identity used for [`EventChannel::unsubscribe`].
    pub id: SubscriptionId,
    /// Receiving end; yields `None` once the entry is unsubscribed.
    pub rx: mpsc::UnboundedReceiver<BusEvent>,
}

struct Entry {
    id: SubscriptionId,
    tx: mpsc::UnboundedSender<BusEvent>,
}

#[derive(Default)]
struct Registry {
    topics: HashMap<String, Vec<Entry>>,
    /// Reverse index so `unsubscribe` needs only the id.
    index: HashMap<SubscriptionId, String>,
}

/// In-process publish/subscribe bus with named topics.
///
/// Non-blocking: `emit` never awaits. Unbounded per-subscription queues;
/// receivers that fell behind simply see older events first.
#[derive(Default)]
pub struct EventChannel {
    registry: Mutex<Registry>,
}

impl EventChannel {
    /// Create an empty channel.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler on `topic`.
    pub fn subscribe(&self, topic: &str) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = SubscriptionId::new();
        let mut registry = self.registry.lock();
        registry
            .topics
            .entry(topic.to_string())
            .or_default()
            .push(Entry { id, tx });
        let _ = registry.index.insert(id, topic.to_string());
        trace!(%id, topic, "subscribed");
        Subscription { id, rx }
    }

    /// Remove a subscription. Returns `true` if it was still registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut registry = self.registry.lock();
        let Some(topic) = registry.index.remove(&id) else {
            return false;
        };
        if let Some(entries) = registry.topics.get_mut(&topic) {
            entries.retain(|e| e.id != id);
            if entries.is_empty() {
                let _ = registry.topics.remove(&topic);
            }
        }
        trace!(%id, topic, "unsubscribed");
        true
    }

    /// Emit an event on `topic`. Non-blocking.
    ///
    /// Returns the number of subscriptions that received the event.
    /// Entries whose receiver was dropped are pruned.
    pub fn emit(&self, topic: &str, data: Value) -> usize {
        let event = BusEvent::new(topic, data);
        let mut registry = self.registry.lock();
        let Some(entries) = registry.topics.get_mut(topic) else {
            return 0;
        };
        let mut delivered = 0;
        let mut dead = Vec::new();
        entries.retain(|entry| {
            if entry.tx.send(event.clone()).is_ok() {
                delivered += 1;
                true
            } else {
                dead.push(entry.id);
                false
            }
        });
        if entries.is_empty() {
            let _ = registry.topics.remove(topic);
        }
        for id in dead {
            let _ = registry.index.remove(&id);
        }
        delivered
    }

    /// Number of live subscriptions on `topic`.
    #[must_use]
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.registry
            .lock()
            .topics
            .get(topic)
            .map_or(0, Vec::len)
    }

    /// Total live subscriptions across all topics.
    #[must_use]
    pub fn total_subscriptions(&self) -> usize {
        self.registry.lock().index.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;
    use tokio::sync::mpsc::error::TryRecvError;

    #[test]
    fn emit_with_no_subscribers() {
        let channel = EventChannel::new();
        assert_eq!(channel.emit("selection.show", json!({})), 0);
    }

    #[tokio::test]
    async fn emit_and_receive() {
        let channel = EventChannel::new();
        let mut sub = channel.subscribe("selection.dismiss");

        let delivered = channel.emit("selection.dismiss", json!({"reason": "close"}));
        assert_eq!(delivered, 1);

        let event = sub.rx.recv().await.unwrap();
        assert_eq!(event.topic, "selection.dismiss");
        assert_eq!(event.data["reason"], "close");
    }

    #[tokio::test]
    async fn topics_are_isolated() {
        let channel = EventChannel::new();
        let mut a = channel.subscribe("pairing.uri");
        let _b = channel.subscribe("pairing.dismiss");

        assert_eq!(channel.emit("pairing.uri", json!({"uri": "wc:abc"})), 1);
        let event = a.rx.recv().await.unwrap();
        assert_eq!(event.data["uri"], "wc:abc");
    }

    #[tokio::test]
    async fn fan_out_to_all_subscribers() {
        let channel = EventChannel::new();
        let mut a = channel.subscribe("selection.pick.extension");
        let mut b = channel.subscribe("selection.pick.extension");

        assert_eq!(channel.emit("selection.pick.extension", json!({})), 2);
        assert!(a.rx.recv().await.is_some());
        assert!(b.rx.recv().await.is_some());
    }

    #[tokio::test]
    async fn unsubscribe_stops_delivery_and_closes_receiver() {
        let channel = EventChannel::new();
        let mut sub = channel.subscribe("selection.dismiss");

        assert!(channel.unsubscribe(sub.id));
        assert_eq!(channel.emit("selection.dismiss", json!({})), 0);
        // Sender side was dropped with the entry, not merely drained.
        assert_matches!(sub.rx.try_recv(), Err(TryRecvError::Disconnected));
        assert!(sub.rx.recv().await.is_none());
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let channel = EventChannel::new();
        let sub = channel.subscribe("pairing.dismiss");
        assert!(channel.unsubscribe(sub.id));
        assert!(!channel.unsubscribe(sub.id));
    }

    #[test]
    fn dropped_receivers_are_pruned_on_emit() {
        let channel = EventChannel::new();
        let sub = channel.subscribe("selection.show");
        drop(sub.rx);

        assert_eq!(channel.subscriber_count("selection.show"), 1);
        assert_eq!(channel.emit("selection.show", json!({})), 0);
        assert_eq!(channel.subscriber_count("selection.show"), 0);
        assert_eq!(channel.total_subscriptions(), 0);
    }

    #[test]
    fn counts_track_subscriptions() {
        let channel = EventChannel::new();
        let a = channel.subscribe("selection.show");
        let _b = channel.subscribe("selection.dismiss");
        assert_eq!(channel.subscriber_count("selection.show"), 1);
        assert_eq!(channel.total_subscriptions(), 2);

        let _ = channel.unsubscribe(a.id);
        assert_eq!(channel.total_subscriptions(), 1);
    }
}
