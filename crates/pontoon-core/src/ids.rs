//! Branded identifier newtypes.
//!
//! Connection requests and bus subscriptions carry UUID v7 identities so
//! per-request bookkeeping can never confuse two in-flight requests.
//! Wallet methods are identified by application-chosen string IDs; the
//! remote-pairing family is recognized by prefix.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix marking the remote-pairing method family.
///
/// A method whose id starts with this prefix is resolved through the
/// pairing handshake rather than an injected extension.
pub const REMOTE_METHOD_PREFIX: &str = "walletconnect";

/// Identity of one in-flight `request()` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Mint a fresh request identity.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identity of one live subscription on the event channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    /// Mint a fresh subscription identity.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Application-chosen identifier of a wallet connection method.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MethodId(String);

impl MethodId {
    /// Wrap a method id string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw id string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this method belongs to the remote-pairing family.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        self.0.starts_with(REMOTE_METHOD_PREFIX)
    }
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MethodId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for MethodId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_ids_are_unique() {
        assert_ne!(RequestId::new(), RequestId::new());
    }

    #[test]
    fn subscription_ids_are_unique() {
        assert_ne!(SubscriptionId::new(), SubscriptionId::new());
    }

    #[test]
    fn remote_family_by_prefix() {
        assert!(MethodId::from("walletconnect").is_remote());
        assert!(MethodId::from("walletconnect-v2").is_remote());
        assert!(!MethodId::from("extension").is_remote());
        assert!(!MethodId::from("ledger").is_remote());
    }

    #[test]
    fn method_id_round_trips_serde() {
        let id = MethodId::from("extension");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"extension\"");
        let back: MethodId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
