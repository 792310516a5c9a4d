//! Wallet method descriptors and the resolver seam.
//!
//! Applications describe each connection method (its id, display fields,
//! and a [`WalletResolver`]) at broker construction; the broker picks a
//! descriptor per request and invokes its resolver. The resolver is the
//! only code that knows how to turn a chosen method into a live
//! [`WalletHandle`].

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::ConnectError;
use crate::ids::MethodId;
use crate::wallet::{ExtensionLocator, WalletHandle};

/// Capability handed to resolvers on the remote-pairing path.
///
/// Backed by a connected pairing connector; the relay crate provides the
/// implementation, this trait keeps the foundation crate free of relay
/// internals.
#[async_trait]
pub trait PairingSession: Send + Sync {
    /// Whether the pairing handshake has completed.
    fn connected(&self) -> bool;

    /// Issue a protocol request over the paired session.
    async fn request(&self, method: &str, params: Value) -> Result<Value, ConnectError>;
}

/// Produces a [`WalletHandle`] for one connection method.
///
/// `pairing` is `Some` only on the remote path, carrying the connector
/// that just completed (or reused) its handshake.
#[async_trait]
pub trait WalletResolver: Send + Sync {
    /// Resolve the method into a live wallet handle.
    async fn resolve(
        &self,
        pairing: Option<Arc<dyn PairingSession>>,
    ) -> Result<WalletHandle, ConnectError>;
}

/// One connection method offered to the user.
///
/// Immutable after construction; display fields feed the selection
/// prompter verbatim.
#[derive(Clone)]
pub struct WalletMethodDescriptor {
    /// Unique method id. Remote-family ids start with `walletconnect`.
    pub id: MethodId,
    /// Human-readable name shown in the selection prompt.
    pub display_name: String,
    /// One-line description shown in the selection prompt.
    pub description: String,
    /// Icon reference (URL or asset key) for the selection prompt.
    pub icon_ref: String,
    /// Capability producing the wallet handle for this method.
    pub resolver: Arc<dyn WalletResolver>,
}

impl WalletMethodDescriptor {
    /// Build a descriptor.
    pub fn new(
        id: impl Into<MethodId>,
        display_name: impl Into<String>,
        description: impl Into<String>,
        icon_ref: impl Into<String>,
        resolver: Arc<dyn WalletResolver>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            description: description.into(),
            icon_ref: icon_ref.into(),
            resolver,
        }
    }
}

impl fmt::Debug for WalletMethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletMethodDescriptor")
            .field("id", &self.id)
            .field("display_name", &self.display_name)
            .finish_non_exhaustive()
    }
}

/// Resolver for injected-extension methods.
///
/// Awaits the locator probe; an absent extension surfaces as
/// [`ConnectError::ExtensionNotFound`].
pub struct ExtensionResolver {
    locator: Arc<dyn ExtensionLocator>,
}

impl ExtensionResolver {
    /// Wrap an extension locator.
    pub fn new(locator: Arc<dyn ExtensionLocator>) -> Self {
        Self { locator }
    }
}

#[async_trait]
impl WalletResolver for ExtensionResolver {
    async fn resolve(
        &self,
        _pairing: Option<Arc<dyn PairingSession>>,
    ) -> Result<WalletHandle, ConnectError> {
        match self.locator.probe().await? {
            Some(handle) => Ok(handle),
            None => Err(ConnectError::ExtensionNotFound),
        }
    }
}
