//! REST transaction-broadcast helper.
//!
//! A resolved remote handle posts signed transactions to a chain-specific
//! REST endpoint. The response contract is the chain's: a `code` field of
//! `0` (or absent) means accepted and `txhash` carries the hex hash;
//! a nonzero `code` is a rejection whose `raw_log` text is surfaced
//! verbatim. No retries; retry policy belongs to the caller.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, instrument};
use url::Url;

use pontoon_core::errors::BroadcastError;

/// Commitment level requested from the chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BroadcastMode {
    /// Return immediately after the mempool check.
    Async,
    /// Wait for the CheckTx result.
    Sync,
    /// Wait for the transaction to be included in a block.
    Block,
}

#[derive(Debug, Deserialize)]
struct BroadcastResponse {
    code: Option<u64>,
    txhash: Option<String>,
    raw_log: Option<String>,
}

/// HTTP client for the broadcast endpoint.
#[derive(Clone)]
pub struct BroadcastClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl BroadcastClient {
    /// Build a client for a chain REST endpoint.
    #[must_use]
    pub fn new(endpoint: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
        }
    }

    /// Build a client sharing an existing HTTP connection pool.
    #[must_use]
    pub fn with_client(endpoint: Url, http: reqwest::Client) -> Self {
        Self { http, endpoint }
    }

    /// Broadcast a signed transaction; returns the decoded tx hash.
    #[instrument(skip(self, signed_tx), fields(endpoint = %self.endpoint))]
    pub async fn broadcast_tx(
        &self,
        signed_tx: &Value,
        mode: BroadcastMode,
    ) -> Result<Vec<u8>, BroadcastError> {
        let body = json!({ "tx": signed_tx, "mode": mode });
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| BroadcastError::Transport(e.to_string()))?;

        let status = response.status();
        let parsed: BroadcastResponse = response
            .json()
            .await
            .map_err(|e| BroadcastError::Decode(format!("HTTP {status}: {e}")))?;

        match parsed.code.unwrap_or(0) {
            0 => {
                let txhash = parsed
                    .txhash
                    .ok_or_else(|| BroadcastError::Decode("missing txhash".into()))?;
                debug!(%txhash, "transaction accepted");
                hex::decode(&txhash)
                    .map_err(|e| BroadcastError::Decode(format!("txhash is not hex: {e}")))
            }
            code => Err(BroadcastError::Chain {
                code,
                raw_log: parsed.raw_log.unwrap_or_default(),
            }),
        }
    }
}
