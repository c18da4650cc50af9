use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::types::{AddressHistoryItem, AddressHistoryRequest, SortOrder};

/// Full block range, as the explorer expects it spelled out
const START_BLOCK: u64 = 0;
const END_BLOCK: u64 = 99_999_999;

/// Parameters of one `account/txlist` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxListQuery {
    pub address: String,
    pub chain_id: u64,
    pub start_block: u64,
    pub end_block: u64,
    pub page: u64,
    pub offset: u64,
    pub sort: SortOrder,
    pub api_key: String,
}

impl TxListQuery {
    pub fn new(request: &AddressHistoryRequest, api_key: &str) -> Self {
        Self {
            address: request.address.clone(),
            chain_id: request.chain_id,
            start_block: START_BLOCK,
            end_block: END_BLOCK,
            page: request.page,
            offset: request.page_size,
            sort: request.sort,
            api_key: api_key.to_string(),
        }
    }

    /// Query string pairs in the order the explorer documents them
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("module", "account".to_string()),
            ("action", "txlist".to_string()),
            ("address", self.address.clone()),
            ("startblock", self.start_block.to_string()),
            ("endblock", self.end_block.to_string()),
            ("page", self.page.to_string()),
            ("offset", self.offset.to_string()),
            ("sort", self.sort.as_str().to_string()),
            ("apikey", self.api_key.clone()),
            ("chainid", self.chain_id.to_string()),
        ]
    }
}

/// The explorer's `{status, message, result}` envelope
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub result: UpstreamResult,
}

/// `result` is a list on success and a sentence otherwise
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UpstreamResult {
    /// Any list; entries are kept as received
    Items(Vec<AddressHistoryItem>),
    Message(String),
    /// `null`, an object, a number or a bool
    Other(serde_json::Value),
}

impl Default for UpstreamResult {
    fn default() -> Self {
        Self::Other(serde_json::Value::Null)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExplorerError {
    /// The explorer answered with a non-2xx HTTP status
    #[error("HTTP {0}")]
    Status(u16),
    /// Never carries the request URL, which holds the API key
    #[error("request failed: {0}")]
    Transport(reqwest::Error),
    #[error("malformed response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ExplorerError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.without_url())
    }
}

/// Source of address transaction lists
#[async_trait]
pub trait Explorer: Send + Sync {
    async fn txlist(&self, query: &TxListQuery) -> Result<Envelope, ExplorerError>;
}

/// Etherscan-compatible HTTP explorer
#[derive(Debug, Clone)]
pub struct EtherscanClient {
    client: Client,
    base_url: String,
}

impl EtherscanClient {
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> anyhow::Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl Explorer for EtherscanClient {
    async fn txlist(&self, query: &TxListQuery) -> Result<Envelope, ExplorerError> {
        debug!(
            target: "explorer",
            url = %self.base_url,
            address = %query.address,
            chain_id = query.chain_id,
            page = query.page,
            offset = query.offset,
            sort = query.sort.as_str(),
            "fetching txlist"
        );

        let response = self
            .client
            .get(&self.base_url)
            .query(&query.to_pairs())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExplorerError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ExplorerError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(json: serde_json::Value) -> Envelope {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_result_list_is_items() {
        let env = envelope(serde_json::json!({
            "status": "1",
            "message": "OK",
            "result": [{ "hash": "0xabc", "value": "1" }]
        }));
        match env.result {
            UpstreamResult::Items(items) => {
                assert_eq!(items.len(), 1);
                assert_eq!(items[0].hash(), "0xabc");
            }
            other => panic!("expected items, got {other:?}"),
        }
    }

    #[test]
    fn test_result_string_is_message() {
        let env = envelope(serde_json::json!({
            "status": "0",
            "message": "No transactions found",
            "result": "No transactions found"
        }));
        assert!(matches!(env.result, UpstreamResult::Message(ref m) if m == "No transactions found"));
    }

    #[test]
    fn test_result_other_shapes() {
        let env = envelope(serde_json::json!({ "status": "1", "result": { "foo": 1 } }));
        assert!(matches!(env.result, UpstreamResult::Other(_)));

        let env = envelope(serde_json::json!({ "status": "1", "result": 42 }));
        assert!(matches!(env.result, UpstreamResult::Other(_)));

        let env = envelope(serde_json::json!({ "status": "1" }));
        assert!(matches!(env.result, UpstreamResult::Other(serde_json::Value::Null)));
    }

    #[test]
    fn test_list_with_odd_entries_stays_items() {
        let env = envelope(serde_json::json!({
            "status": "1",
            "result": [
                { "hash": "0x1", "to": "0x2" },
                { "hash": "0x3", "to": null, "blockNumber": 9 }
            ]
        }));
        match env.result {
            UpstreamResult::Items(items) => {
                assert_eq!(items.len(), 2);
                assert_eq!(items[1].to_address(), "");
                assert_eq!(items[1].block(), Some(9));
            }
            other => panic!("expected items, got {other:?}"),
        }
    }

    #[test]
    fn test_query_pairs() {
        let request = AddressHistoryRequest {
            address: "0x742d35Cc6634C0532925a3b844Bc9e7595f8fE31".to_string(),
            chain_id: 11_155_111,
            page: 2,
            page_size: 25,
            sort: SortOrder::Ascending,
        };
        let pairs = TxListQuery::new(&request, "key").to_pairs();
        let get = |k: &str| {
            pairs
                .iter()
                .find(|(name, _)| *name == k)
                .map(|(_, v)| v.as_str())
                .unwrap()
        };

        assert_eq!(get("module"), "account");
        assert_eq!(get("action"), "txlist");
        assert_eq!(get("startblock"), "0");
        assert_eq!(get("endblock"), "99999999");
        assert_eq!(get("page"), "2");
        assert_eq!(get("offset"), "25");
        assert_eq!(get("sort"), "asc");
        assert_eq!(get("apikey"), "key");
        assert_eq!(get("chainid"), "11155111");
    }
}
