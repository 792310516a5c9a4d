//! # pontoon-broker
//!
//! The wallet-connection decision layer.
//!
//! - **[`ConnectionBroker`]**: one `request()` call per needed wallet;
//!   resolves via the cached session, the stored preference, or the
//!   user's pick on the event channel, then runs the extension probe or
//!   the remote pairing handshake.
//! - **[`PendingRequests`]** / **[`RequestGuard`]**: per-request ledger
//!   of bus subscriptions, released unconditionally when the request
//!   settles.
//! - **[`BrokerConfig`]**: optional deadlines on the interactive phases.
//! - **[`testutil`]**: scripted prompters and extension probes for the
//!   scenario suite.
//!
//! ## Crate Position
//!
//! Top of the stack. Depends on: pontoon-core, pontoon-events,
//! pontoon-relay.

#![deny(unsafe_code)]

pub mod broker;
pub mod config;
pub mod pending;
pub mod testutil;

pub use broker::ConnectionBroker;
pub use config::BrokerConfig;
pub use pending::{PendingRequests, RequestGuard};
