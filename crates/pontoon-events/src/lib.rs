//! # pontoon-events
//!
//! In-process publish/subscribe bus decoupling the connection broker's
//! async logic from UI callbacks.
//!
//! - **[`EventChannel`]**: topic-keyed bus with explicit `subscribe` /
//!   `unsubscribe` / `emit`. Delivery is per-subscription unbounded mpsc;
//!   `emit` never awaits.
//! - **[`topics`]**: the topic vocabulary and typed payloads exchanged
//!   with the selection and pairing prompters.
//!
//! The bus itself makes no cleanup promises beyond `unsubscribe`: the
//! broker owns the bookkeeping that removes every subscription a settled
//! request registered.
//!
//! ## Crate Position
//!
//! Plumbing layer. Depends on: pontoon-core. Depended on by:
//! pontoon-broker and any UI host embedding the prompters.

#![deny(unsafe_code)]

pub mod channel;
pub mod topics;

pub use channel::{BusEvent, EventChannel, Subscription};
pub use topics::{MethodSummary, PairingUriPayload, SelectionShowPayload};
