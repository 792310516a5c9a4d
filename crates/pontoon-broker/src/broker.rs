//! The connection broker state machine.
//!
//! One `request()` call resolves to a [`WalletHandle`] by the cheapest
//! route available:
//!
//! 1. a cached session from an earlier resolution, returned with no
//!    side effects;
//! 2. a stored connection preference naming a known method, resolved
//!    without the selection prompt;
//! 3. otherwise the selection prompt, raced against the user's pick or
//!    dismissal on the event channel.
//!
//! Remote-family picks then run the pairing handshake: the live URI is
//! re-published on the bus, dismissal cancels the connector, and a
//! cancelled or failed connector is discarded so the next attempt gets
//! a fresh one from the [`ConnectorFactory`]. Every path, success or
//! not, releases the bus subscriptions it registered.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use futures::future::select_all;
use parking_lot::Mutex;
use serde_json::json;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use pontoon_core::errors::ConnectError;
use pontoon_core::ids::{MethodId, RequestId};
use pontoon_core::method::{PairingSession, WalletMethodDescriptor};
use pontoon_core::wallet::WalletHandle;
use pontoon_events::channel::{BusEvent, EventChannel};
use pontoon_events::topics::{self, PairingUriPayload, SelectionShowPayload};
use pontoon_relay::client::{ConnectorFactory, RemoteSessionClient};

use crate::config::BrokerConfig;
use crate::pending::{PendingRequests, RequestGuard};

/// Outcome of the selection prompt.
enum Selection {
    Picked(MethodId),
    Dismissed,
}

type SelectionFuture = Pin<Box<dyn Future<Output = Result<Selection, ConnectError>> + Send>>;

/// The one remembered session.
struct CachedSession {
    handle: WalletHandle,
    method: MethodId,
}

/// Brokers wallet-connection requests for one application.
///
/// Shared behind an `Arc`; all state is interior-mutable so concurrent
/// `request()` calls are safe (each prompt emission fans out to every
/// waiting request).
pub struct ConnectionBroker {
    descriptors: Vec<WalletMethodDescriptor>,
    channel: Arc<EventChannel>,
    connectors: Arc<dyn ConnectorFactory>,
    config: BrokerConfig,
    cached: Mutex<Option<CachedSession>>,
    preference: Mutex<Option<MethodId>>,
    pending: Arc<PendingRequests>,
    connector_slot: Mutex<Option<Arc<RemoteSessionClient>>>,
}

impl ConnectionBroker {
    /// Build a broker over the given methods, bus, and connector source.
    #[must_use]
    pub fn new(
        descriptors: Vec<WalletMethodDescriptor>,
        channel: Arc<EventChannel>,
        connectors: Arc<dyn ConnectorFactory>,
        config: BrokerConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            descriptors,
            channel,
            connectors,
            config,
            cached: Mutex::new(None),
            preference: Mutex::new(None),
            pending: Arc::new(PendingRequests::new()),
            connector_slot: Mutex::new(None),
        })
    }

    /// The event channel prompters attach to.
    #[must_use]
    pub fn channel(&self) -> &Arc<EventChannel> {
        &self.channel
    }

    /// Method id of the cached session, if one exists.
    #[must_use]
    pub fn connection_type(&self) -> Option<MethodId> {
        self.cached.lock().as_ref().map(|c| c.method.clone())
    }

    /// Stored connection preference, if any.
    #[must_use]
    pub fn connection_preference(&self) -> Option<MethodId> {
        self.preference.lock().clone()
    }

    /// Store (or clear) the preferred method for future requests.
    ///
    /// Takes effect only on cache misses; a cached session still wins.
    pub fn set_connection_preference(&self, method: Option<MethodId>) {
        *self.preference.lock() = method;
    }

    /// Forget the cached session. The next request goes through the
    /// full decision path again. Idempotent.
    pub fn clear_last_used_wallet(&self) {
        if self.cached.lock().take().is_some() {
            debug!("cached session cleared");
        }
    }

    /// Number of requests currently awaiting resolution.
    #[must_use]
    pub fn pending_requests(&self) -> usize {
        self.pending.pending_count()
    }

    /// Resolve a wallet handle for the caller.
    ///
    /// Cache hits return immediately with no prompts or bus traffic.
    /// Resolution errors never populate the cache.
    #[instrument(skip(self))]
    pub async fn request(&self) -> Result<WalletHandle, ConnectError> {
        {
            let cached = self.cached.lock();
            if let Some(session) = cached.as_ref() {
                debug!(method = %session.method, "resolved from cached session");
                return Ok(session.handle.clone());
            }
        }

        let preference = self.preference.lock().clone();
        if let Some(preferred) = preference {
            if let Some(descriptor) = self.descriptor(&preferred).cloned() {
                debug!(method = %preferred, "resolving via stored preference");
                return self.resolve_method(&descriptor).await;
            }
            warn!(method = %preferred, "preference matches no known method, prompting");
        }

        self.prompt_and_resolve().await
    }

    fn descriptor(&self, id: &MethodId) -> Option<&WalletMethodDescriptor> {
        self.descriptors.iter().find(|d| &d.id == id)
    }

    /// Preference path: skip the selection prompt entirely.
    async fn resolve_method(
        &self,
        descriptor: &WalletMethodDescriptor,
    ) -> Result<WalletHandle, ConnectError> {
        if descriptor.id.is_remote() {
            let guard = RequestGuard::new(
                Arc::clone(&self.pending),
                Arc::clone(&self.channel),
                RequestId::new(),
            );
            self.resolve_remote(descriptor, &guard).await
        } else {
            self.resolve_extension(descriptor).await
        }
    }

    /// Full path: show the selection prompt and race the user's answer.
    async fn prompt_and_resolve(&self) -> Result<WalletHandle, ConnectError> {
        let request_id = RequestId::new();
        let guard = RequestGuard::new(
            Arc::clone(&self.pending),
            Arc::clone(&self.channel),
            request_id,
        );

        let mut races: Vec<SelectionFuture> = Vec::with_capacity(self.descriptors.len() + 1);
        for descriptor in &self.descriptors {
            let sub = self.channel.subscribe(&topics::selection_pick(&descriptor.id));
            guard.track(sub.id);
            races.push(pick_future(descriptor.id.clone(), sub.rx));
        }
        let dismiss = self.channel.subscribe(topics::SELECTION_DISMISS);
        guard.track(dismiss.id);
        races.push(dismiss_future(dismiss.rx));

        let payload = SelectionShowPayload {
            methods: self.descriptors.iter().map(Into::into).collect(),
        };
        let _ = self.channel.emit(
            topics::SELECTION_SHOW,
            serde_json::to_value(&payload).unwrap_or_default(),
        );
        debug!(%request_id, methods = self.descriptors.len(), "selection prompt shown");

        let selection = self.await_selection(races).await;
        let _ = self.channel.emit(topics::SELECTION_HIDE, json!({}));

        match selection? {
            Selection::Dismissed => {
                debug!(%request_id, "selection prompt dismissed");
                Err(ConnectError::UserCancelled)
            }
            Selection::Picked(method) => {
                info!(%request_id, %method, "wallet method selected");
                let Some(descriptor) = self.descriptor(&method).cloned() else {
                    return Err(ConnectError::UnknownMethod(method));
                };
                if descriptor.id.is_remote() {
                    self.resolve_remote(&descriptor, &guard).await
                } else {
                    self.resolve_extension(&descriptor).await
                }
            }
        }
    }

    async fn await_selection(
        &self,
        races: Vec<SelectionFuture>,
    ) -> Result<Selection, ConnectError> {
        let race = select_all(races);
        match self.config.selection_timeout {
            Some(limit) => match tokio::time::timeout(limit, race).await {
                Ok((outcome, _, _)) => outcome,
                Err(_) => Err(ConnectError::Timeout("wallet selection")),
            },
            None => race.await.0,
        }
    }

    #[instrument(skip(self, descriptor), fields(method = %descriptor.id))]
    async fn resolve_extension(
        &self,
        descriptor: &WalletMethodDescriptor,
    ) -> Result<WalletHandle, ConnectError> {
        let handle = descriptor.resolver.resolve(None).await?;
        self.finish(&descriptor.id, handle)
    }

    /// Remote path: reuse the connected session or run a handshake while
    /// mirroring the pairing URI and dismissal onto the bus.
    #[instrument(skip(self, descriptor, guard), fields(method = %descriptor.id))]
    async fn resolve_remote(
        &self,
        descriptor: &WalletMethodDescriptor,
        guard: &RequestGuard,
    ) -> Result<WalletHandle, ConnectError> {
        let client = self.checkout_connector();

        if client.connected() {
            debug!("reusing established pairing session");
            let handle = descriptor
                .resolver
                .resolve(Some(Arc::clone(&client) as Arc<dyn PairingSession>))
                .await?;
            return self.finish(&descriptor.id, handle);
        }

        let dismiss = self.channel.subscribe(topics::PAIRING_DISMISS);
        guard.track(dismiss.id);
        let mut dismiss_rx = dismiss.rx;
        let mut uri_rx = client.uri();
        let mut uri_live = true;

        let create = client.create_session();
        tokio::pin!(create);
        let deadline = async {
            match self.config.pairing_timeout {
                Some(limit) => tokio::time::sleep(limit).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(deadline);

        let outcome = loop {
            tokio::select! {
                result = &mut create => break result,
                changed = uri_rx.changed(), if uri_live => {
                    if changed.is_ok() {
                        let uri = uri_rx.borrow_and_update().clone();
                        if !uri.is_empty() {
                            debug!("pairing uri issued");
                            self.emit_pairing_uri(&uri);
                        }
                    } else {
                        uri_live = false;
                    }
                }
                event = dismiss_rx.recv() => {
                    client.cancel_pairing();
                    self.discard_connector();
                    self.emit_pairing_uri("");
                    return match event {
                        Some(_) => {
                            debug!("pairing dismissed before acceptance");
                            Err(ConnectError::UserCancelled)
                        }
                        None => Err(ConnectError::ChannelClosed),
                    };
                }
                () = &mut deadline => {
                    client.cancel_pairing();
                    self.discard_connector();
                    self.emit_pairing_uri("");
                    warn!("pairing acceptance timed out");
                    return Err(ConnectError::Timeout("pairing acceptance"));
                }
            }
        };

        // Terminal either way: the prompter has nothing left to show.
        self.emit_pairing_uri("");

        match outcome {
            Ok(()) => {
                let handle = descriptor
                    .resolver
                    .resolve(Some(Arc::clone(&client) as Arc<dyn PairingSession>))
                    .await?;
                self.finish(&descriptor.id, handle)
            }
            Err(err) => {
                self.discard_connector();
                Err(err.into())
            }
        }
    }

    /// Hand out the held connector if its session is live, otherwise
    /// replace it with a fresh one from the factory.
    fn checkout_connector(&self) -> Arc<RemoteSessionClient> {
        let mut slot = self.connector_slot.lock();
        if let Some(existing) = slot.as_ref() {
            if existing.connected() {
                return Arc::clone(existing);
            }
            debug!("discarding unconnected pairing connector");
        }
        let fresh = self.connectors.connector();
        *slot = Some(Arc::clone(&fresh));
        fresh
    }

    fn discard_connector(&self) {
        *self.connector_slot.lock() = None;
    }

    fn emit_pairing_uri(&self, uri: &str) {
        let payload = PairingUriPayload { uri: uri.into() };
        let _ = self.channel.emit(
            topics::PAIRING_URI,
            serde_json::to_value(&payload).unwrap_or_default(),
        );
    }

    /// Cache the resolved session and return the handle.
    fn finish(
        &self,
        method: &MethodId,
        handle: WalletHandle,
    ) -> Result<WalletHandle, ConnectError> {
        {
            let mut cached = self.cached.lock();
            *cached = Some(CachedSession {
                handle: handle.clone(),
                method: method.clone(),
            });
        }
        info!(%method, "wallet connected and cached");
        Ok(handle)
    }
}

fn pick_future(method: MethodId, mut rx: mpsc::UnboundedReceiver<BusEvent>) -> SelectionFuture {
    Box::pin(async move {
        match rx.recv().await {
            Some(_) => Ok(Selection::Picked(method)),
            None => Err(ConnectError::ChannelClosed),
        }
    })
}

fn dismiss_future(mut rx: mpsc::UnboundedReceiver<BusEvent>) -> SelectionFuture {
    Box::pin(async move {
        match rx.recv().await {
            Some(_) => Ok(Selection::Dismissed),
            None => Err(ConnectError::ChannelClosed),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    use pontoon_relay::testutil::MockConnectorFactory;

    use crate::testutil::{FakeLocator, extension_descriptor, ui_pick};

    fn broker_with(
        descriptors: Vec<WalletMethodDescriptor>,
    ) -> Arc<ConnectionBroker> {
        ConnectionBroker::new(
            descriptors,
            Arc::new(EventChannel::new()),
            MockConnectorFactory::new("wc:test") as _,
            BrokerConfig::default(),
        )
    }

    #[tokio::test]
    async fn starts_with_no_cached_session() {
        let broker = broker_with(Vec::new());
        assert!(broker.connection_type().is_none());
        assert!(broker.connection_preference().is_none());
        assert_eq!(broker.pending_requests(), 0);
    }

    #[tokio::test]
    async fn clear_without_cache_is_a_noop() {
        let broker = broker_with(Vec::new());
        broker.clear_last_used_wallet();
        broker.clear_last_used_wallet();
        assert!(broker.connection_type().is_none());
    }

    #[tokio::test]
    async fn preference_is_stored_and_cleared() {
        let broker = broker_with(Vec::new());
        broker.set_connection_preference(Some(MethodId::from("extension")));
        assert_eq!(
            broker.connection_preference(),
            Some(MethodId::from("extension"))
        );
        broker.set_connection_preference(None);
        assert!(broker.connection_preference().is_none());
    }

    #[tokio::test]
    async fn preference_resolves_without_prompting() {
        let locator = FakeLocator::with_wallet("cosmos1pref");
        let broker = broker_with(vec![extension_descriptor(locator)]);
        broker.set_connection_preference(Some(MethodId::from("extension")));

        let mut show = broker.channel().subscribe(topics::SELECTION_SHOW);
        let handle = broker.request().await.unwrap();
        assert_matches!(handle, WalletHandle::Extension(_));
        assert_matches!(show.rx.try_recv(), Err(_));
        assert_eq!(broker.connection_type(), Some(MethodId::from("extension")));
    }

    #[tokio::test]
    async fn unknown_preference_falls_back_to_the_prompt() {
        let locator = FakeLocator::with_wallet("cosmos1fall");
        let broker = broker_with(vec![extension_descriptor(locator)]);
        broker.set_connection_preference(Some(MethodId::from("ledger")));

        let ui = ui_pick(broker.channel(), "extension");
        let handle = broker.request().await.unwrap();
        ui.await.unwrap();
        assert_matches!(handle, WalletHandle::Extension(_));
    }

    #[tokio::test]
    async fn failed_resolution_does_not_cache() {
        let locator = FakeLocator::absent();
        let broker = broker_with(vec![extension_descriptor(locator)]);
        broker.set_connection_preference(Some(MethodId::from("extension")));

        let err = broker.request().await.unwrap_err();
        assert_matches!(err, ConnectError::ExtensionNotFound);
        assert!(broker.connection_type().is_none());
        assert_eq!(broker.pending_requests(), 0);
    }
}
