//! # pontoon-relay
//!
//! Remote-pairing session plumbing for Pontoon.
//!
//! - **[`RemoteSessionClient`]**: narrow adapter over a pairing-protocol
//!   transport: `connected()`, an at-most-once `create_session()`
//!   outcome, a cancel hook, and a live pairing-URI feed.
//! - **[`PairingTransport`]**: the trait seam behind which the actual
//!   relay client (transport, encryption) lives. External to this crate.
//! - **[`RemoteWalletSession`]** / **[`RemoteResolver`]**: the
//!   `RemoteWallet` capability backed by a paired session, with a
//!   sign-method allow-list.
//! - **[`broadcast`]**: the REST transaction-broadcast helper used by a
//!   resolved remote handle.
//!
//! ## Crate Position
//!
//! Transport layer. Depends on: pontoon-core. Depended on by:
//! pontoon-broker.

#![deny(unsafe_code)]

pub mod broadcast;
pub mod client;
pub mod config;
pub mod errors;
pub mod session;
pub mod testutil;
pub mod transport;

pub use broadcast::{BroadcastClient, BroadcastMode};
pub use client::{ConnectorFactory, PairingSessionState, RemoteSessionClient};
pub use config::RelayConfig;
pub use errors::RelayError;
pub use session::{RemoteResolver, RemoteWalletSession};
pub use transport::PairingTransport;
