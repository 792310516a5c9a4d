//! Shared fixtures for broker tests.
//!
//! `FakeLocator` scripts the extension probe; the `ui_*` helpers play
//! the part of a prompter: each subscribes to the broker's outbound
//! topic *before* returning, then answers from a spawned task, so tests
//! never race the prompt emission.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use url::Url;

use pontoon_core::errors::ConnectError;
use pontoon_core::ids::MethodId;
use pontoon_core::method::{ExtensionResolver, WalletMethodDescriptor};
use pontoon_core::wallet::{ExtensionLocator, ExtensionWallet, WalletAccount, WalletHandle};
use pontoon_events::channel::EventChannel;
use pontoon_events::topics;
use pontoon_relay::broadcast::BroadcastClient;
use pontoon_relay::config::RelayConfig;
use pontoon_relay::session::RemoteResolver;

/// Minimal injected-extension wallet.
pub struct FakeExtensionWallet {
    address: String,
}

#[async_trait]
impl ExtensionWallet for FakeExtensionWallet {
    async fn account(&self) -> Result<WalletAccount, ConnectError> {
        Ok(WalletAccount {
            address: self.address.clone(),
            public_key: vec![1, 2, 3],
            algo: Some("secp256k1".into()),
        })
    }

    async fn sign(&self, sign_doc: Value) -> Result<Value, ConnectError> {
        Ok(json!({ "signed": sign_doc }))
    }
}

/// Scriptable extension probe that counts how often it ran.
pub struct FakeLocator {
    handle: Mutex<Option<WalletHandle>>,
    probes: AtomicUsize,
}

impl FakeLocator {
    /// Locator that finds an extension wallet at `address`.
    pub fn with_wallet(address: impl Into<String>) -> Arc<Self> {
        let wallet = FakeExtensionWallet {
            address: address.into(),
        };
        Arc::new(Self {
            handle: Mutex::new(Some(WalletHandle::Extension(Arc::new(wallet)))),
            probes: AtomicUsize::new(0),
        })
    }

    /// Locator that finds nothing.
    #[must_use]
    pub fn absent() -> Arc<Self> {
        Arc::new(Self {
            handle: Mutex::new(None),
            probes: AtomicUsize::new(0),
        })
    }

    /// How many times the probe ran.
    #[must_use]
    pub fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExtensionLocator for FakeLocator {
    async fn probe(&self) -> Result<Option<WalletHandle>, ConnectError> {
        let _ = self.probes.fetch_add(1, Ordering::SeqCst);
        Ok(self.handle.lock().clone())
    }
}

fn fixture_url(raw: &str) -> Url {
    raw.parse().expect("fixture url is valid")
}

/// Descriptor for the injected-extension method, id `extension`.
#[must_use]
pub fn extension_descriptor(locator: Arc<FakeLocator>) -> WalletMethodDescriptor {
    WalletMethodDescriptor::new(
        "extension",
        "Browser Extension",
        "Use the injected wallet",
        "icons/extension.svg",
        Arc::new(ExtensionResolver::new(locator as _)),
    )
}

/// Descriptor for the remote-pairing method, id `walletconnect`.
#[must_use]
pub fn remote_descriptor() -> WalletMethodDescriptor {
    let config = RelayConfig::new(fixture_url("wss://relay.example.org"));
    let broadcast = BroadcastClient::new(fixture_url("http://localhost:1317/txs"));
    WalletMethodDescriptor::new(
        "walletconnect",
        "WalletConnect",
        "Pair a wallet on another device",
        "icons/walletconnect.svg",
        Arc::new(RemoteResolver::new(config, broadcast)),
    )
}

/// Answer the next selection prompt by picking `method`.
pub fn ui_pick(channel: &Arc<EventChannel>, method: &str) -> JoinHandle<()> {
    let mut show = channel.subscribe(topics::SELECTION_SHOW);
    let channel = Arc::clone(channel);
    let topic = topics::selection_pick(&MethodId::from(method));
    tokio::spawn(async move {
        if show.rx.recv().await.is_some() {
            let _ = channel.emit(&topic, json!({}));
        }
        let _ = channel.unsubscribe(show.id);
    })
}

/// Answer the next selection prompt by dismissing it.
pub fn ui_dismiss_selection(channel: &Arc<EventChannel>) -> JoinHandle<()> {
    let mut show = channel.subscribe(topics::SELECTION_SHOW);
    let channel = Arc::clone(channel);
    tokio::spawn(async move {
        if show.rx.recv().await.is_some() {
            let _ = channel.emit(topics::SELECTION_DISMISS, json!({}));
        }
        let _ = channel.unsubscribe(show.id);
    })
}

/// Dismiss the pairing prompt once a live URI is shown.
pub fn ui_dismiss_pairing(channel: &Arc<EventChannel>) -> JoinHandle<()> {
    let mut uri = channel.subscribe(topics::PAIRING_URI);
    let channel = Arc::clone(channel);
    tokio::spawn(async move {
        while let Some(event) = uri.rx.recv().await {
            let live = event.data["uri"].as_str().is_some_and(|u| !u.is_empty());
            if live {
                let _ = channel.emit(topics::PAIRING_DISMISS, json!({}));
                break;
            }
        }
        let _ = channel.unsubscribe(uri.id);
    })
}
