//! Remote wallet capability backed by a paired session.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::instrument;

use pontoon_core::errors::{BroadcastError, ConnectError};
use pontoon_core::method::{PairingSession, WalletResolver};
use pontoon_core::wallet::{RemoteWallet, WalletAccount, WalletHandle};

use crate::broadcast::{BroadcastClient, BroadcastMode};
use crate::config::RelayConfig;
use crate::errors::RelayError;

/// Protocol method used to enumerate accounts on the paired device.
const GET_ACCOUNTS_METHOD: &str = "cosmos_getAccounts";

/// A wallet reached over an established pairing session.
///
/// Signing requests are gated by the relay config's allow-list;
/// broadcast goes through the REST helper, not the pairing session.
pub struct RemoteWalletSession {
    session: Arc<dyn PairingSession>,
    config: RelayConfig,
    broadcast: BroadcastClient,
}

impl RemoteWalletSession {
    /// Wrap a connected pairing session.
    pub fn new(
        session: Arc<dyn PairingSession>,
        config: RelayConfig,
        broadcast: BroadcastClient,
    ) -> Self {
        Self {
            session,
            config,
            broadcast,
        }
    }

    /// Broadcast a signed transaction via the REST helper.
    ///
    /// Returns the decoded transaction hash on success.
    #[instrument(skip(self, signed_tx))]
    pub async fn broadcast_tx(
        &self,
        signed_tx: &Value,
        mode: BroadcastMode,
    ) -> Result<Vec<u8>, BroadcastError> {
        self.broadcast.broadcast_tx(signed_tx, mode).await
    }
}

#[async_trait]
impl RemoteWallet for RemoteWalletSession {
    async fn account(&self) -> Result<WalletAccount, ConnectError> {
        let response = self.session.request(GET_ACCOUNTS_METHOD, json!({})).await?;
        let mut accounts: Vec<WalletAccount> = serde_json::from_value(response)
            .map_err(|e| RelayError::Transport(format!("malformed accounts response: {e}")))?;
        if accounts.is_empty() {
            return Err(RelayError::Transport("peer reported no accounts".into()).into());
        }
        Ok(accounts.remove(0))
    }

    async fn sign(&self, method: &str, params: Value) -> Result<Value, ConnectError> {
        if !self.config.allows(method) {
            return Err(RelayError::MethodNotAllowed(method.to_string()).into());
        }
        self.session.request(method, params).await
    }
}

/// Resolver for remote-pairing methods.
///
/// Expects the broker to hand over a connected pairing session; wraps it
/// as a [`WalletHandle::Remote`].
pub struct RemoteResolver {
    config: RelayConfig,
    broadcast: BroadcastClient,
}

impl RemoteResolver {
    /// Build a resolver from relay config and a broadcast client.
    pub fn new(config: RelayConfig, broadcast: BroadcastClient) -> Self {
        Self { config, broadcast }
    }
}

#[async_trait]
impl WalletResolver for RemoteResolver {
    async fn resolve(
        &self,
        pairing: Option<Arc<dyn PairingSession>>,
    ) -> Result<WalletHandle, ConnectError> {
        let session = pairing.ok_or(RelayError::NotConnected)?;
        if !session.connected() {
            return Err(RelayError::NotConnected.into());
        }
        Ok(WalletHandle::Remote(Arc::new(RemoteWalletSession::new(
            session,
            self.config.clone(),
            self.broadcast.clone(),
        ))))
    }
}
