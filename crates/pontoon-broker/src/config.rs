//! Broker tuning knobs.

use std::time::Duration;

/// Optional deadlines on the interactive phases of a request.
///
/// Both default to `None`: the broker waits indefinitely for the user,
/// matching hosts that keep prompts up until answered. Embedders that
/// need bounded waits opt in per phase.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrokerConfig {
    /// Deadline for the user to answer the selection prompt.
    pub selection_timeout: Option<Duration>,
    /// Deadline for the peer to accept an issued pairing URI.
    pub pairing_timeout: Option<Duration>,
}

impl BrokerConfig {
    /// Config with no deadlines.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound the selection prompt.
    #[must_use]
    pub fn with_selection_timeout(mut self, limit: Duration) -> Self {
        self.selection_timeout = Some(limit);
        self
    }

    /// Bound pairing acceptance.
    #[must_use]
    pub fn with_pairing_timeout(mut self, limit: Duration) -> Self {
        self.pairing_timeout = Some(limit);
        self
    }
}
