use alloy::primitives::U256;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::HistoryError;

// ============================================================================
// Request
// ============================================================================

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Query string of `GET /api/explorer/txlist`, exactly as received
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryParams {
    pub address: Option<String>,
    #[serde(rename = "chainId")]
    pub chain_id: Option<String>,
    pub page: Option<String>,
    pub offset: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[serde(rename = "asc")]
    Ascending,
    #[default]
    #[serde(rename = "desc")]
    Descending,
}

impl SortOrder {
    /// Anything other than exactly `asc` sorts newest first
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw {
            Some("asc") => Self::Ascending,
            _ => Self::Descending,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

/// A validated, normalized history request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressHistoryRequest {
    /// Always `0x` + 40 hex digits, casing preserved
    pub address: String,
    pub chain_id: u64,
    pub page: u64,
    pub page_size: u64,
    pub sort: SortOrder,
}

impl AddressHistoryRequest {
    /// Validate the address and normalize paging.
    ///
    /// The chain is parsed but not checked against the supported set here;
    /// that needs configuration and happens in the proxy.
    pub fn from_params(params: &HistoryParams) -> Result<Self, HistoryError> {
        let address = params.address.as_deref().unwrap_or_default();
        if !crate::query::is_hex_address(address) {
            return Err(HistoryError::InvalidAddress);
        }

        let raw_chain = params.chain_id.as_deref().unwrap_or("0");
        let chain_id = raw_chain
            .trim()
            .parse::<u64>()
            .map_err(|_| HistoryError::UnsupportedChain(raw_chain.to_string()))?;

        Ok(Self {
            address: address.to_string(),
            chain_id,
            page: positive_or(params.page.as_deref(), DEFAULT_PAGE),
            page_size: positive_or(params.offset.as_deref(), DEFAULT_PAGE_SIZE),
            sort: SortOrder::parse_lenient(params.sort.as_deref()),
        })
    }
}

/// Parse a positive integer, falling back on anything else
fn positive_or(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|n| *n >= 1)
        .unwrap_or(default)
}

// ============================================================================
// Response
// ============================================================================

/// One transaction in an address's history, exactly as the explorer sent it.
///
/// The record is kept whole so fields this crate never reads still reach the
/// caller; the accessors below tolerate `null`, missing and numeric fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddressHistoryItem(Value);

impl AddressHistoryItem {
    pub fn new(raw: Value) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> &Value {
        &self.0
    }

    /// A string field; `null`, missing and non-string values read as `None`
    pub fn field(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    pub fn hash(&self) -> &str {
        self.field("hash").unwrap_or_default()
    }

    pub fn from_address(&self) -> &str {
        self.field("from").unwrap_or_default()
    }

    /// Empty for contract creations
    pub fn to_address(&self) -> &str {
        self.field("to").unwrap_or_default()
    }

    /// Decimal wei string, empty when absent
    pub fn value(&self) -> &str {
        self.field("value").unwrap_or_default()
    }

    pub fn value_wei(&self) -> Option<U256> {
        match self.value() {
            "" => Some(U256::ZERO),
            v => v.parse::<U256>().ok(),
        }
    }

    pub fn timestamp_secs(&self) -> Option<u64> {
        self.number("timeStamp")
    }

    pub fn block(&self) -> Option<u64> {
        self.number("blockNumber")
    }

    /// Reverted, by either of the two flags the explorer reports
    pub fn is_failed(&self) -> bool {
        self.field("isError") == Some("1") || self.field("txreceipt_status") == Some("0")
    }

    fn number(&self, name: &str) -> Option<u64> {
        match self.0.get(name)? {
            Value::String(s) => s.parse().ok(),
            Value::Number(n) => n.as_u64(),
            _ => None,
        }
    }
}

/// Body of every txlist response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressHistoryResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<AddressHistoryItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<Vec<AddressHistoryItem>, HistoryError>> for AddressHistoryResponse {
    fn from(result: Result<Vec<AddressHistoryItem>, HistoryError>) -> Self {
        match result {
            Ok(items) => Self {
                ok: true,
                items: Some(items),
                error: None,
            },
            Err(e) => Self {
                ok: false,
                items: None,
                error: Some(e.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: &str = "0x742d35Cc6634C0532925a3b844Bc9e7595f8fE31";

    fn params(address: &str) -> HistoryParams {
        HistoryParams {
            address: Some(address.to_string()),
            chain_id: Some("1".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_applied() {
        let req = AddressHistoryRequest::from_params(&params(ADDR)).unwrap();
        assert_eq!(req.address, ADDR);
        assert_eq!(req.chain_id, 1);
        assert_eq!(req.page, 1);
        assert_eq!(req.page_size, 10);
        assert_eq!(req.sort, SortOrder::Descending);
    }

    #[test]
    fn test_bad_paging_falls_back() {
        let mut p = params(ADDR);
        p.page = Some("abc".to_string());
        p.offset = Some("0".to_string());
        p.sort = Some("ASC".to_string());
        let req = AddressHistoryRequest::from_params(&p).unwrap();
        assert_eq!(req.page, 1);
        assert_eq!(req.page_size, 10);
        assert_eq!(req.sort, SortOrder::Descending);

        p.page = Some("3".to_string());
        p.offset = Some("25".to_string());
        p.sort = Some("asc".to_string());
        let req = AddressHistoryRequest::from_params(&p).unwrap();
        assert_eq!(req.page, 3);
        assert_eq!(req.page_size, 25);
        assert_eq!(req.sort, SortOrder::Ascending);
    }

    #[test]
    fn test_invalid_address_rejected() {
        for bad in ["", "0x1234", " 0x742d35Cc6634C0532925a3b844Bc9e7595f8fE31", "vitalik.eth"] {
            assert!(matches!(
                AddressHistoryRequest::from_params(&params(bad)),
                Err(HistoryError::InvalidAddress)
            ));
        }
        assert!(matches!(
            AddressHistoryRequest::from_params(&HistoryParams::default()),
            Err(HistoryError::InvalidAddress)
        ));
    }

    #[test]
    fn test_non_numeric_chain_rejected() {
        let mut p = params(ADDR);
        p.chain_id = Some("mainnet".to_string());
        match AddressHistoryRequest::from_params(&p) {
            Err(HistoryError::UnsupportedChain(raw)) => assert_eq!(raw, "mainnet"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_missing_chain_is_zero() {
        let mut p = params(ADDR);
        p.chain_id = None;
        let req = AddressHistoryRequest::from_params(&p).unwrap();
        assert_eq!(req.chain_id, 0);
    }

    #[test]
    fn test_item_helpers() {
        let item: AddressHistoryItem = serde_json::from_value(serde_json::json!({
            "blockNumber": "19000000",
            "timeStamp": "1700000000",
            "hash": "0xabc",
            "from": "0x1",
            "to": "0x2",
            "value": "123456789012345678901234567890",
            "isError": "0",
            "txreceipt_status": "1",
            "gas": "21000"
        }))
        .unwrap();

        assert_eq!(item.block(), Some(19_000_000));
        assert_eq!(item.timestamp_secs(), Some(1_700_000_000));
        assert_eq!(item.hash(), "0xabc");
        assert!(item.value_wei().is_some());
        assert!(!item.is_failed());

        let failed = AddressHistoryItem::new(serde_json::json!({ "txreceipt_status": "0" }));
        assert!(failed.is_failed());
    }

    #[test]
    fn test_item_keeps_unread_fields() {
        let raw = serde_json::json!({
            "hash": "0xabc",
            "gasUsed": "21000",
            "confirmations": "12",
            "contractAddress": ""
        });
        let item: AddressHistoryItem = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&item).unwrap(), raw);
    }

    #[test]
    fn test_item_tolerates_null_and_numbers() {
        let item: AddressHistoryItem = serde_json::from_value(serde_json::json!({
            "blockNumber": 7,
            "hash": "0xabc",
            "to": null,
            "value": null
        }))
        .unwrap();

        assert_eq!(item.block(), Some(7));
        assert_eq!(item.to_address(), "");
        assert_eq!(item.value_wei(), Some(U256::ZERO));
        assert_eq!(item.timestamp_secs(), None);
        assert!(!item.is_failed());
    }

    #[test]
    fn test_response_shape() {
        let ok = AddressHistoryResponse::from(Ok(vec![]));
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            serde_json::json!({ "ok": true, "items": [] })
        );

        let err = AddressHistoryResponse::from(Err(HistoryError::InvalidAddress));
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            serde_json::json!({ "ok": false, "error": "Invalid address" })
        );
    }
}
