//! Relay configuration.

use url::Url;

/// Default signing-method allow-list for paired sessions.
pub const DEFAULT_SIGN_METHODS: &[&str] = &[
    "cosmos_getAccounts",
    "cosmos_signAmino",
    "cosmos_signDirect",
];

/// Configuration for the pairing-protocol client.
#[derive(Clone, Debug)]
pub struct RelayConfig {
    /// Relay endpoint the pairing transport connects to.
    pub endpoint: Url,
    /// Signing-method names a paired session may be asked to perform.
    pub sign_methods: Vec<String>,
    /// Optional application metadata shown to the peer during pairing.
    pub metadata: Option<String>,
}

impl RelayConfig {
    /// Build a config with the default sign-method allow-list.
    #[must_use]
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            sign_methods: DEFAULT_SIGN_METHODS.iter().map(ToString::to_string).collect(),
            metadata: None,
        }
    }

    /// Replace the sign-method allow-list.
    #[must_use]
    pub fn with_sign_methods(mut self, methods: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.sign_methods = methods.into_iter().map(Into::into).collect();
        self
    }

    /// Attach application metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: impl Into<String>) -> Self {
        self.metadata = Some(metadata.into());
        self
    }

    /// Whether `method` is allow-listed for signing requests.
    #[must_use]
    pub fn allows(&self, method: &str) -> bool {
        self.sign_methods.iter().any(|m| m == method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint() -> Url {
        "wss://relay.example.org".parse().unwrap()
    }

    #[test]
    fn default_allow_list_covers_cosmos_methods() {
        let config = RelayConfig::new(endpoint());
        assert!(config.allows("cosmos_signAmino"));
        assert!(!config.allows("eth_sendTransaction"));
    }

    #[test]
    fn allow_list_is_replaceable() {
        let config = RelayConfig::new(endpoint()).with_sign_methods(["eth_sign"]);
        assert!(config.allows("eth_sign"));
        assert!(!config.allows("cosmos_signAmino"));
    }
}
