//! Relay-layer errors.

use thiserror::Error;

use pontoon_core::errors::ConnectError;

/// Failures of the pairing transport and session layer.
#[derive(Clone, Debug, Error)]
pub enum RelayError {
    /// The peer rejected the pairing proposal.
    #[error("pairing proposal rejected by peer: {0}")]
    Rejected(String),

    /// The relay transport failed mid-handshake.
    #[error("relay transport failed: {0}")]
    Transport(String),

    /// No established session to serve the request.
    #[error("pairing session is not connected")]
    NotConnected,

    /// The connector was consumed by a cancelled or failed pairing and
    /// must be replaced with a fresh one.
    #[error("pairing connector already consumed by a cancelled or failed handshake")]
    Poisoned,

    /// A signing method outside the configured allow-list was requested.
    #[error("signing method `{0}` is not allow-listed")]
    MethodNotAllowed(String),
}

impl From<RelayError> for ConnectError {
    fn from(err: RelayError) -> Self {
        ConnectError::ConnectionFailed {
            source: Box::new(err),
        }
    }
}
