//! The pairing-transport seam.
//!
//! Everything protocol-specific (relay websocket, key agreement, envelope
//! encryption) lives behind [`PairingTransport`]. This crate only drives
//! the handshake lifecycle and routes requests.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::watch;

use crate::errors::RelayError;

/// Sink through which a transport publishes the pairing URI once issued.
pub type UriSink = watch::Sender<String>;

/// One pairing-protocol connector.
///
/// Implementations are single-shot with respect to `open`: a connector
/// whose handshake failed or was cancelled is discarded, never reopened.
#[async_trait]
pub trait PairingTransport: Send + Sync {
    /// Whether a session is established.
    fn connected(&self) -> bool;

    /// Run one pairing handshake.
    ///
    /// The transport publishes the pairing URI through `uri` as soon as it
    /// is issued, then resolves exactly once: `Ok` when the peer accepted,
    /// `Err` when the handshake failed. Dropping the returned future
    /// abandons the handshake.
    async fn open(&self, uri: UriSink) -> Result<(), RelayError>;

    /// Abandon an issued-but-unaccepted pairing URI.
    fn cancel(&self);

    /// Issue a protocol request over the established session.
    async fn request(&self, method: &str, params: Value) -> Result<Value, RelayError>;
}
