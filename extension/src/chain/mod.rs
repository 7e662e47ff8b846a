// Chain client seam
// The chain-client library lives on the JS side; Rust sees it through ChainClient.

mod format;
mod js_api;

pub use format::format_balance;
pub use js_api::JsChainClient;

use crate::error::ChainError;
use crate::governance::{Referendum, ReferendumVote};
use async_trait::async_trait;
use futures::stream::LocalBoxStream;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Connection state reported by the chain client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiStatus {
    /// Still connecting or loading metadata. Worth waiting for.
    Connecting,
    Ready,
    /// The readiness check itself failed. Not retried.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainProperties {
    pub token_decimals: u32,
    pub token_symbol: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub address: String,
    pub referendum_id: u32,
    pub aye: bool,
    #[serde(serialize_with = "serialize_balance")]
    pub tip: u128,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TxEvent {
    pub section: String,
    pub method: String,
    #[serde(default)]
    pub data: String,
}

impl TxEvent {
    pub fn is_success(&self) -> bool {
        self.method == "ExtrinsicSuccess"
    }

    pub fn is_failure(&self) -> bool {
        self.method == "ExtrinsicFailed"
    }
}

/// Status updates of a submitted extrinsic.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum TxStatus {
    Pending,
    Ready,
    Finalized {
        #[serde(rename = "blockHash")]
        block_hash: String,
        #[serde(default)]
        events: Vec<TxEvent>,
    },
    Invalid,
    Dropped,
    Usurped,
}

impl TxStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TxStatus::Pending | TxStatus::Ready)
    }
}

pub type TxStatusStream = LocalBoxStream<'static, TxStatus>;

#[async_trait(?Send)]
pub trait ChainClient {
    fn status(&self) -> ApiStatus;

    async fn properties(&self) -> Result<ChainProperties, ChainError>;

    async fn free_balance(&self, address: &str) -> Result<u128, ChainError>;

    async fn referendum(&self, id: u32) -> Result<Option<Referendum>, ChainError>;

    async fn referendum_votes(&self, id: u32) -> Result<Vec<ReferendumVote>, ChainError>;

    /// Sign and submit a vote. The stream ends after a terminal status.
    async fn submit_vote(&self, request: VoteRequest) -> Result<TxStatusStream, ChainError>;
}

// Balances cross the JS boundary as decimal strings; JSON numbers lose precision.
pub(crate) fn deserialize_balance<'de, D>(deserializer: D) -> Result<u128, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    text.trim().parse().map_err(serde::de::Error::custom)
}

pub(crate) fn serialize_balance<S>(value: &u128, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finalized_status_carries_events() {
        let status: TxStatus = serde_json::from_str(
            r#"{"type":"Finalized","blockHash":"0xabc","events":[
                {"section":"system","method":"ExtrinsicSuccess"}]}"#,
        )
        .unwrap();
        match &status {
            TxStatus::Finalized { block_hash, events } => {
                assert_eq!(block_hash, "0xabc");
                assert!(events[0].is_success());
            }
            other => panic!("unexpected status {:?}", other),
        }
        assert!(status.is_terminal());
    }

    #[test]
    fn test_only_pending_states_are_not_terminal() {
        assert!(!TxStatus::Pending.is_terminal());
        assert!(!TxStatus::Ready.is_terminal());
        assert!(TxStatus::Invalid.is_terminal());
        assert!(TxStatus::Dropped.is_terminal());
        assert!(TxStatus::Usurped.is_terminal());
    }

    #[test]
    fn test_vote_request_sends_tip_as_string() {
        let request = VoteRequest {
            address: "5Grw".to_string(),
            referendum_id: 7,
            aye: true,
            tip: 340_282_366_920_938_463_463_374_607_431_768_211_455,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["referendumId"], 7);
        assert_eq!(json["tip"], "340282366920938463463374607431768211455");
    }
}
