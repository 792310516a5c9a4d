//! Error hierarchy for connection brokering and transaction broadcast.
//!
//! Every failure of a connection request surfaces as exactly one
//! [`ConnectError`] so callers can match on the kind and show an
//! appropriate message ("connection cancelled" vs "extension not
//! installed"). The broker performs no retries; retry policy belongs to
//! the caller.

use thiserror::Error;

use crate::ids::MethodId;

/// Rejection kinds for a wallet-connection request.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// The user dismissed the selection or pairing prompt.
    #[error("connection request cancelled by the user")]
    UserCancelled,

    /// No compatible injected wallet extension was detected.
    #[error("no compatible wallet extension detected")]
    ExtensionNotFound,

    /// The pairing handshake failed, wrapping the underlying cause.
    #[error("pairing handshake failed: {source}")]
    ConnectionFailed {
        /// Underlying relay/transport failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Transaction broadcast was rejected or could not complete.
    #[error(transparent)]
    Broadcast(#[from] BroadcastError),

    /// A selection or preference named a method with no descriptor.
    #[error("no descriptor registered for method `{0}`")]
    UnknownMethod(MethodId),

    /// A configured timeout elapsed while waiting on the user or the peer.
    ///
    /// Timeouts are an opt-in extension (`BrokerConfig`); the observed
    /// source behavior waits forever.
    #[error("timed out waiting for {0}")]
    Timeout(&'static str),

    /// The event channel dropped a subscription while a request was live.
    #[error("event channel closed while a request was pending")]
    ChannelClosed,
}

impl ConnectError {
    /// Wrap an arbitrary cause as a pairing-handshake failure.
    pub fn connection_failed(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::ConnectionFailed {
            source: Box::new(source),
        }
    }
}

/// Failures of the REST transaction-broadcast helper.
#[derive(Debug, Error)]
pub enum BroadcastError {
    /// The chain returned a nonzero response code.
    #[error("broadcast rejected by chain (code {code}): {raw_log}")]
    Chain {
        /// Nonzero response code from the chain.
        code: u64,
        /// Raw log text accompanying the rejection.
        raw_log: String,
    },

    /// The HTTP request itself failed.
    #[error("broadcast transport failed: {0}")]
    Transport(String),

    /// The response body could not be parsed.
    #[error("malformed broadcast response: {0}")]
    Decode(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn kinds_are_matchable() {
        let err: ConnectError = BroadcastError::Chain {
            code: 5,
            raw_log: "insufficient funds".into(),
        }
        .into();
        assert_matches!(err, ConnectError::Broadcast(BroadcastError::Chain { code: 5, .. }));
    }

    #[test]
    fn connection_failed_preserves_cause() {
        let cause = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "relay dropped");
        let err = ConnectError::connection_failed(cause);
        assert!(err.to_string().contains("relay dropped"));
    }

    #[test]
    fn chain_error_carries_raw_log() {
        let err = BroadcastError::Chain {
            code: 13,
            raw_log: "out of gas".into(),
        };
        assert_eq!(
            err.to_string(),
            "broadcast rejected by chain (code 13): out of gas"
        );
    }
}
