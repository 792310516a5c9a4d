//! # pontoon-core
//!
//! Foundation types, errors, branded IDs, and wallet capabilities for Pontoon.
//!
//! This crate provides the shared vocabulary that all other Pontoon crates
//! depend on:
//!
//! - **Branded IDs**: [`ids::RequestId`], [`ids::SubscriptionId`],
//!   [`ids::MethodId`] as newtypes
//! - **Errors**: [`errors::ConnectError`] hierarchy via `thiserror`, with
//!   matchable rejection kinds
//! - **Wallet capabilities**: [`wallet::WalletHandle`] union over
//!   [`wallet::ExtensionWallet`] and [`wallet::RemoteWallet`]
//! - **Method descriptors**: [`method::WalletMethodDescriptor`] and the
//!   [`method::WalletResolver`] seam
//! - **Logging**: [`logging::init`] tracing-subscriber setup
//!
//! ## Crate Position
//!
//! Foundation crate. Depended on by all other pontoon crates.

#![deny(unsafe_code)]

pub mod errors;
pub mod ids;
pub mod logging;
pub mod method;
pub mod wallet;

pub use errors::{BroadcastError, ConnectError};
pub use ids::{MethodId, RequestId, SubscriptionId};
pub use method::{ExtensionResolver, PairingSession, WalletMethodDescriptor, WalletResolver};
pub use wallet::{ExtensionLocator, ExtensionWallet, RemoteWallet, WalletAccount, WalletHandle};
