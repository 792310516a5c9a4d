//! The `RemoteSessionClient` pairing adapter.
//!
//! Wraps a [`PairingTransport`] with the narrow contract the broker
//! needs: `connected()`, an at-most-once terminal outcome per
//! `create_session()`, a cancel hook, and a watchable pairing-URI feed.
//!
//! A client whose handshake was cancelled or failed is *poisoned*: it
//! never pairs again. The broker discards it and asks its
//! [`ConnectorFactory`] for a fresh connector on the next attempt.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, warn};

use pontoon_core::errors::ConnectError;
use pontoon_core::method::PairingSession;

use crate::errors::RelayError;
use crate::transport::PairingTransport;

/// Observable lifecycle of one pairing attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PairingSessionState {
    /// No handshake started.
    Idle,
    /// A pairing URI is issued and awaiting peer acceptance.
    UriIssued(String),
    /// The peer accepted; the session is live.
    Connected,
    /// The user abandoned the URI before acceptance.
    Cancelled,
    /// The handshake failed.
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    Opening,
    Connected,
    Cancelled,
    Failed,
}

/// Builds fresh, unconnected pairing connectors.
///
/// The broker owns at most one connector at a time; cancelled or failed
/// connectors are dropped and replaced through this factory.
pub trait ConnectorFactory: Send + Sync {
    /// Build a fresh connector.
    fn connector(&self) -> Arc<RemoteSessionClient>;
}

/// Adapter over one pairing-protocol connector.
pub struct RemoteSessionClient {
    transport: Arc<dyn PairingTransport>,
    uri_tx: watch::Sender<String>,
    phase: Mutex<Phase>,
}

impl RemoteSessionClient {
    /// Wrap a transport. The client starts idle with no URI issued.
    pub fn new(transport: Arc<dyn PairingTransport>) -> Arc<Self> {
        let (uri_tx, _) = watch::channel(String::new());
        Arc::new(Self {
            transport,
            uri_tx,
            phase: Mutex::new(Phase::Idle),
        })
    }

    /// Whether the underlying transport has an established session.
    #[must_use]
    pub fn connected(&self) -> bool {
        self.transport.connected()
    }

    /// Whether this connector was consumed by a cancelled or failed
    /// handshake and must be replaced.
    #[must_use]
    pub fn poisoned(&self) -> bool {
        matches!(*self.phase.lock(), Phase::Cancelled | Phase::Failed)
    }

    /// Watch the live pairing URI. Empty string means none is active.
    #[must_use]
    pub fn uri(&self) -> watch::Receiver<String> {
        self.uri_tx.subscribe()
    }

    /// Current pairing lifecycle state.
    #[must_use]
    pub fn state(&self) -> PairingSessionState {
        match *self.phase.lock() {
            Phase::Idle => PairingSessionState::Idle,
            Phase::Opening => {
                let uri = self.uri_tx.borrow().clone();
                if uri.is_empty() {
                    PairingSessionState::Idle
                } else {
                    PairingSessionState::UriIssued(uri)
                }
            }
            Phase::Connected => PairingSessionState::Connected,
            Phase::Cancelled => PairingSessionState::Cancelled,
            Phase::Failed => PairingSessionState::Failed,
        }
    }

    /// Run one pairing handshake to its terminal outcome.
    ///
    /// Resolves at most once per call. On an already-connected client this
    /// is a no-op that resolves immediately without re-issuing a URI
    /// (session reuse). A poisoned client always errors.
    pub async fn create_session(&self) -> Result<(), RelayError> {
        if self.connected() {
            debug!("create_session on connected client is a no-op");
            return Ok(());
        }
        {
            let mut phase = self.phase.lock();
            match *phase {
                Phase::Cancelled | Phase::Failed => return Err(RelayError::Poisoned),
                Phase::Opening => {
                    return Err(RelayError::Transport("pairing already in flight".into()));
                }
                Phase::Idle | Phase::Connected => *phase = Phase::Opening,
            }
        }

        let result = self.transport.open(self.uri_tx.clone()).await;
        let _ = self.uri_tx.send(String::new());
        match result {
            Ok(()) => {
                *self.phase.lock() = Phase::Connected;
                debug!("pairing handshake accepted");
                Ok(())
            }
            Err(err) => {
                *self.phase.lock() = Phase::Failed;
                warn!(error = %err, "pairing handshake failed");
                Err(err)
            }
        }
    }

    /// Abandon an issued-but-unaccepted pairing URI.
    ///
    /// Invokes the transport's cancel hook and poisons the client.
    pub fn cancel_pairing(&self) {
        self.transport.cancel();
        *self.phase.lock() = Phase::Cancelled;
        let _ = self.uri_tx.send(String::new());
        debug!("pairing cancelled before acceptance");
    }
}

#[async_trait]
impl PairingSession for RemoteSessionClient {
    fn connected(&self) -> bool {
        self.connected()
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, ConnectError> {
        if !self.connected() {
            return Err(RelayError::NotConnected.into());
        }
        self.transport
            .request(method, params)
            .await
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    use crate::testutil::MockTransport;

    #[tokio::test]
    async fn handshake_issues_uri_then_connects() {
        let transport = MockTransport::new("wc:abc123");
        let client = RemoteSessionClient::new(Arc::clone(&transport) as _);
        let mut uri_rx = client.uri();

        transport.accept();
        client.create_session().await.unwrap();

        assert!(client.connected());
        assert_eq!(client.state(), PairingSessionState::Connected);
        assert_eq!(transport.uris_issued(), 1);
        // The URI was published, then cleared on the terminal transition.
        assert!(uri_rx.borrow_and_update().is_empty());
    }

    #[tokio::test]
    async fn second_create_session_is_a_noop() {
        let transport = MockTransport::new("wc:abc123");
        let client = RemoteSessionClient::new(Arc::clone(&transport) as _);

        transport.accept();
        client.create_session().await.unwrap();
        client.create_session().await.unwrap();

        // Session reuse never re-issues a URI.
        assert_eq!(transport.uris_issued(), 1);
    }

    #[tokio::test]
    async fn failed_handshake_poisons_the_client() {
        let transport = MockTransport::new("wc:abc123");
        let client = RemoteSessionClient::new(Arc::clone(&transport) as _);

        transport.reject(RelayError::Rejected("declined".into()));
        let err = client.create_session().await.unwrap_err();
        assert_matches!(err, RelayError::Rejected(_));
        assert!(client.poisoned());
        assert_eq!(client.state(), PairingSessionState::Failed);

        // A poisoned client refuses further handshakes.
        assert_matches!(client.create_session().await, Err(RelayError::Poisoned));
    }

    #[tokio::test]
    async fn cancel_invokes_hook_and_poisons() {
        let transport = MockTransport::new("wc:abc123");
        let client = RemoteSessionClient::new(Arc::clone(&transport) as _);

        client.cancel_pairing();
        assert!(transport.cancelled());
        assert!(client.poisoned());
        assert_eq!(client.state(), PairingSessionState::Cancelled);
    }

    #[tokio::test]
    async fn requests_require_a_session() {
        let transport = MockTransport::new("wc:abc123");
        let client = RemoteSessionClient::new(Arc::clone(&transport) as _);

        let err = client
            .request("cosmos_getAccounts", serde_json::json!({}))
            .await
            .unwrap_err();
        assert_matches!(err, ConnectError::ConnectionFailed { .. });
    }
}
