//! Shared test doubles for the pairing layer.
//!
//! `MockTransport` scripts one handshake (accept/reject under test
//! control) and records cancel/request traffic; `MockConnectorFactory`
//! hands out fresh mock-backed connectors and keeps them reachable for
//! assertions. Used by this crate's tests and by the broker's scenario
//! suite.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::watch;

use crate::client::{ConnectorFactory, RemoteSessionClient};
use crate::errors::RelayError;
use crate::transport::{PairingTransport, UriSink};

/// Scriptable in-memory pairing transport.
pub struct MockTransport {
    pairing_uri: String,
    connected: AtomicBool,
    cancelled: AtomicBool,
    uris_issued: AtomicUsize,
    outcome_tx: watch::Sender<Option<Result<(), RelayError>>>,
    responses: Mutex<HashMap<String, Value>>,
    requests: Mutex<Vec<String>>,
}

impl MockTransport {
    /// Build a transport that will issue `pairing_uri` on `open`.
    pub fn new(pairing_uri: impl Into<String>) -> Arc<Self> {
        let (outcome_tx, _) = watch::channel(None);
        Arc::new(Self {
            pairing_uri: pairing_uri.into(),
            connected: AtomicBool::new(false),
            cancelled: AtomicBool::new(false),
            uris_issued: AtomicUsize::new(0),
            outcome_tx,
            responses: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Script peer acceptance (may be called before or after `open`).
    pub fn accept(&self) {
        let _ = self.outcome_tx.send_replace(Some(Ok(())));
    }

    /// Script a handshake failure.
    pub fn reject(&self, err: RelayError) {
        let _ = self.outcome_tx.send_replace(Some(Err(err)));
    }

    /// Mark the transport as already connected (session-reuse setups).
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Canned response for a protocol request.
    pub fn respond_with(&self, method: impl Into<String>, response: Value) {
        let _ = self.responses.lock().insert(method.into(), response);
    }

    /// How many pairing URIs this transport issued.
    pub fn uris_issued(&self) -> usize {
        self.uris_issued.load(Ordering::SeqCst)
    }

    /// Whether the cancel hook fired.
    pub fn cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Methods requested over the session, in order.
    pub fn requested_methods(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl PairingTransport for MockTransport {
    fn connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn open(&self, uri: UriSink) -> Result<(), RelayError> {
        let _ = uri.send(self.pairing_uri.clone());
        let _ = self.uris_issued.fetch_add(1, Ordering::SeqCst);

        let mut rx = self.outcome_tx.subscribe();
        loop {
            let scripted = rx.borrow_and_update().clone();
            if let Some(outcome) = scripted {
                if outcome.is_ok() {
                    self.connected.store(true, Ordering::SeqCst);
                }
                return outcome;
            }
            if rx.changed().await.is_err() {
                return Err(RelayError::Transport("mock outcome channel closed".into()));
            }
        }
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    async fn request(&self, method: &str, _params: Value) -> Result<Value, RelayError> {
        if !self.connected() {
            return Err(RelayError::NotConnected);
        }
        self.requests.lock().push(method.to_string());
        Ok(self.responses.lock().get(method).cloned().unwrap_or(Value::Null))
    }
}

/// Factory producing mock-backed connectors, one fresh transport each.
pub struct MockConnectorFactory {
    pairing_uri: String,
    auto_accept: bool,
    made: Mutex<Vec<Arc<MockTransport>>>,
}

impl MockConnectorFactory {
    /// Factory whose transports wait for explicit `accept`/`reject`.
    pub fn new(pairing_uri: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            pairing_uri: pairing_uri.into(),
            auto_accept: false,
            made: Mutex::new(Vec::new()),
        })
    }

    /// Factory whose transports accept the handshake immediately after
    /// issuing a URI.
    pub fn auto_accept(pairing_uri: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            pairing_uri: pairing_uri.into(),
            auto_accept: true,
            made: Mutex::new(Vec::new()),
        })
    }

    /// The most recently built transport, if any.
    pub fn last_transport(&self) -> Option<Arc<MockTransport>> {
        self.made.lock().last().map(Arc::clone)
    }

    /// How many connectors were built.
    pub fn connectors_built(&self) -> usize {
        self.made.lock().len()
    }
}

impl ConnectorFactory for MockConnectorFactory {
    fn connector(&self) -> Arc<RemoteSessionClient> {
        let transport = MockTransport::new(self.pairing_uri.clone());
        if self.auto_accept {
            transport.accept();
        }
        self.made.lock().push(Arc::clone(&transport));
        RemoteSessionClient::new(transport as _)
    }
}
