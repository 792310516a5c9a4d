//! Topic vocabulary and typed payloads for prompter traffic.
//!
//! The broker and the UI prompters never call each other directly; they
//! exchange events on these topics. Payloads are serialized as camelCase
//! JSON so a web-embedding host can consume them verbatim.
//!
//! Prompter contract:
//!
//! - [`SELECTION_SHOW`] / [`SELECTION_HIDE`] drive the selection
//!   prompter; the user's answer comes back as exactly one emission on a
//!   `selection.pick.<method-id>` topic or on [`SELECTION_DISMISS`].
//! - [`PAIRING_URI`] carries the live pairing URI; an empty string means
//!   the pairing prompter hides. Dismissal comes back on
//!   [`PAIRING_DISMISS`].

use serde::{Deserialize, Serialize};

use pontoon_core::ids::MethodId;
use pontoon_core::method::WalletMethodDescriptor;

/// Show the selection prompter; payload is [`SelectionShowPayload`].
pub const SELECTION_SHOW: &str = "selection.show";

/// Hide the selection prompter.
pub const SELECTION_HIDE: &str = "selection.hide";

/// The user dismissed the selection prompter.
pub const SELECTION_DISMISS: &str = "selection.dismiss";

/// Live pairing URI changed; payload is [`PairingUriPayload`].
pub const PAIRING_URI: &str = "pairing.uri";

/// The user dismissed the pairing prompter.
pub const PAIRING_DISMISS: &str = "pairing.dismiss";

/// Topic on which the user's pick of `method` is reported.
#[must_use]
pub fn selection_pick(method: &MethodId) -> String {
    format!("selection.pick.{method}")
}

/// Display fields of one method entry in the selection prompter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodSummary {
    /// Method id reported back on pick.
    pub id: MethodId,
    /// Human-readable name.
    pub display_name: String,
    /// One-line description.
    pub description: String,
    /// Icon reference.
    pub icon_ref: String,
}

impl From<&WalletMethodDescriptor> for MethodSummary {
    fn from(descriptor: &WalletMethodDescriptor) -> Self {
        Self {
            id: descriptor.id.clone(),
            display_name: descriptor.display_name.clone(),
            description: descriptor.description.clone(),
            icon_ref: descriptor.icon_ref.clone(),
        }
    }
}

/// Payload of [`SELECTION_SHOW`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionShowPayload {
    /// Candidate methods, in descriptor order.
    pub methods: Vec<MethodSummary>,
}

/// Payload of [`PAIRING_URI`]. An empty `uri` hides the prompter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairingUriPayload {
    /// Current pairing URI, or empty when none is active.
    pub uri: String,
}
