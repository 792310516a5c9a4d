//! Per-request subscription ledger.
//!
//! Every `request()` call registers bus subscriptions (pick topics,
//! dismiss topics) under its own [`RequestId`]. [`RequestGuard`] ties
//! that set to the request's lifetime: when the guard drops, every
//! subscription it tracked is removed from the channel, whether the
//! request resolved, errored, or was cancelled.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use pontoon_core::ids::{RequestId, SubscriptionId};
use pontoon_events::channel::EventChannel;

/// Map from in-flight request to the subscriptions it registered.
#[derive(Default)]
pub struct PendingRequests {
    inner: Mutex<HashMap<RequestId, Vec<SubscriptionId>>>,
}

impl PendingRequests {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an entry for `request`.
    pub fn open(&self, request: RequestId) {
        let _ = self.inner.lock().insert(request, Vec::new());
    }

    /// Record a subscription under `request`. Ignored if the entry was
    /// already released.
    pub fn track(&self, request: RequestId, subscription: SubscriptionId) {
        if let Some(subs) = self.inner.lock().get_mut(&request) {
            subs.push(subscription);
        }
    }

    /// Close the entry and unsubscribe everything it tracked.
    ///
    /// Idempotent: a second release of the same request is a no-op.
    /// Returns how many subscriptions were actually removed.
    pub fn release(&self, request: RequestId, channel: &EventChannel) -> usize {
        let Some(subs) = self.inner.lock().remove(&request) else {
            return 0;
        };
        let mut removed = 0;
        for id in subs {
            if channel.unsubscribe(id) {
                removed += 1;
            }
        }
        removed
    }

    /// Number of requests currently in flight.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.lock().len()
    }

    /// Whether `request` still has an open entry.
    #[must_use]
    pub fn is_pending(&self, request: RequestId) -> bool {
        self.inner.lock().contains_key(&request)
    }
}

/// Drop guard releasing one request's subscriptions.
///
/// Held across the whole resolution path so that early returns and
/// errors cannot leak listeners.
pub struct RequestGuard {
    pending: Arc<PendingRequests>,
    channel: Arc<EventChannel>,
    request: RequestId,
}

impl RequestGuard {
    /// Open a ledger entry for `request` and guard it.
    pub fn new(
        pending: Arc<PendingRequests>,
        channel: Arc<EventChannel>,
        request: RequestId,
    ) -> Self {
        pending.open(request);
        Self {
            pending,
            channel,
            request,
        }
    }

    /// The guarded request's identity.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request
    }

    /// Track a subscription for cleanup on drop.
    pub fn track(&self, subscription: SubscriptionId) {
        self.pending.track(self.request, subscription);
    }
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        let removed = self.pending.release(self.request, &self.channel);
        trace!(request = %self.request, removed, "request subscriptions released");
    }
}
