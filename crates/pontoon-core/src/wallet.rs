//! Wallet capabilities.
//!
//! A [`WalletHandle`] is the opaque capability a resolved connection
//! request hands back. The broker never inspects which variant it holds;
//! the union exists so applications can reach the signing surface of the
//! wallet they actually connected.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ConnectError;

/// Account details exposed by a connected wallet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletAccount {
    /// Bech32/hex address of the active account.
    pub address: String,
    /// Raw public key bytes.
    pub public_key: Vec<u8>,
    /// Signing algorithm label, when the wallet reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algo: Option<String>,
}

/// Signing surface of an injected browser-extension wallet.
#[async_trait]
pub trait ExtensionWallet: Send + Sync {
    /// The active account.
    async fn account(&self) -> Result<WalletAccount, ConnectError>;

    /// Sign a document with the extension's key.
    async fn sign(&self, sign_doc: Value) -> Result<Value, ConnectError>;
}

/// Signing surface of a wallet paired over the relay protocol.
#[async_trait]
pub trait RemoteWallet: Send + Sync {
    /// The active account on the paired device.
    async fn account(&self) -> Result<WalletAccount, ConnectError>;

    /// Issue a signing request over the pairing session.
    ///
    /// `method` must be allow-listed in the relay configuration.
    async fn sign(&self, method: &str, params: Value) -> Result<Value, ConnectError>;
}

/// Async probe for an injected wallet extension.
///
/// How a page detects the injected object is external to this crate;
/// implementations only report presence or absence.
#[async_trait]
pub trait ExtensionLocator: Send + Sync {
    /// Probe for a compatible extension.
    async fn probe(&self) -> Result<Option<WalletHandle>, ConnectError>;
}

/// Opaque capability representing an established wallet connection.
///
/// Cloning is cheap (shared `Arc`); two clones refer to the same
/// underlying connection.
#[derive(Clone)]
pub enum WalletHandle {
    /// An injected browser-extension wallet.
    Extension(Arc<dyn ExtensionWallet>),
    /// A wallet paired over the relay protocol.
    Remote(Arc<dyn RemoteWallet>),
}

impl WalletHandle {
    /// Short label for logs; never used for dispatch.
    #[must_use]
    pub fn method_hint(&self) -> &'static str {
        match self {
            Self::Extension(_) => "extension",
            Self::Remote(_) => "remote",
        }
    }

    /// Whether two handles refer to the same underlying connection.
    #[must_use]
    pub fn same_handle(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Extension(a), Self::Extension(b)) => Arc::ptr_eq(a, b),
            (Self::Remote(a), Self::Remote(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for WalletHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WalletHandle::{}", self.method_hint())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct FakeExtension;

    #[async_trait]
    impl ExtensionWallet for FakeExtension {
        async fn account(&self) -> Result<WalletAccount, ConnectError> {
            Ok(WalletAccount {
                address: "cosmos1abc".into(),
                public_key: vec![1, 2, 3],
                algo: Some("secp256k1".into()),
            })
        }

        async fn sign(&self, sign_doc: Value) -> Result<Value, ConnectError> {
            Ok(json!({ "signed": sign_doc }))
        }
    }

    #[test]
    fn clones_are_the_same_handle() {
        let handle = WalletHandle::Extension(Arc::new(FakeExtension));
        let clone = handle.clone();
        assert!(handle.same_handle(&clone));
    }

    #[test]
    fn distinct_connections_differ() {
        let a = WalletHandle::Extension(Arc::new(FakeExtension));
        let b = WalletHandle::Extension(Arc::new(FakeExtension));
        assert!(!a.same_handle(&b));
    }

    #[tokio::test]
    async fn extension_surface_is_reachable() {
        let handle = WalletHandle::Extension(Arc::new(FakeExtension));
        let WalletHandle::Extension(wallet) = &handle else {
            panic!("expected extension variant");
        };
        let account = wallet.account().await.unwrap();
        assert_eq!(account.address, "cosmos1abc");
    }
}
