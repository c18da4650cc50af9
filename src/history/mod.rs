//! Address transaction history, proxied from a block explorer API.
//!
//! The explorer reports "no transactions" with the same status as a real
//! failure, keys requests with a secret the browser must never see, and
//! needs a chain selector. [`HistoryProxy`] hides all of that behind
//! [`AddressHistoryResponse`].

mod explorer;
mod types;

pub use explorer::*;
pub use types::*;

use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::ExplorerConfig;

/// Why a history request produced no items
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HistoryError {
    #[error("Invalid address")]
    InvalidAddress,
    #[error("Unsupported chainId: {0}")]
    UnsupportedChain(String),
    #[error("Missing ETHERSCAN_API_KEY. Please set it in the server environment.")]
    MissingApiKey,
    #[error("Explorer HTTP {0}")]
    UpstreamStatus(u16),
    #[error("Explorer unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error("{0}")]
    Upstream(String),
}

impl HistoryError {
    /// HTTP status the proxy answers with
    pub fn status(&self) -> u16 {
        match self {
            Self::InvalidAddress | Self::UnsupportedChain(_) => 400,
            Self::MissingApiKey => 500,
            Self::UpstreamStatus(_) | Self::UpstreamUnavailable(_) | Self::Upstream(_) => 502,
        }
    }

    /// Caused by the caller's input, fixable by correcting it
    pub fn is_client_error(&self) -> bool {
        self.status() == 400
    }

    /// Mask every occurrence of `secret` in upstream-provided text
    fn redact(self, secret: &str) -> Self {
        if secret.is_empty() {
            return self;
        }
        match self {
            Self::UpstreamUnavailable(m) => Self::UpstreamUnavailable(m.replace(secret, "[redacted]")),
            Self::Upstream(m) => Self::Upstream(m.replace(secret, "[redacted]")),
            other => other,
        }
    }
}

impl From<ExplorerError> for HistoryError {
    fn from(e: ExplorerError) -> Self {
        match e {
            ExplorerError::Status(code) => Self::UpstreamStatus(code),
            other => Self::UpstreamUnavailable(other.to_string()),
        }
    }
}

/// Stateless proxy between callers and an [`Explorer`]
#[derive(Clone)]
pub struct HistoryProxy {
    config: ExplorerConfig,
    explorer: Arc<dyn Explorer>,
}

impl HistoryProxy {
    pub fn new(config: ExplorerConfig, explorer: Arc<dyn Explorer>) -> Self {
        Self { config, explorer }
    }

    /// Proxy backed by the configured Etherscan endpoint
    pub fn etherscan(config: ExplorerConfig) -> anyhow::Result<Self> {
        let client = EtherscanClient::new(config.base_url.clone(), config.timeout())?;
        Ok(Self::new(config, Arc::new(client)))
    }

    /// Validate, forward one `txlist` call, and translate the answer.
    ///
    /// Every check that can fail without the network runs first, so a
    /// rejected request never reaches the explorer.
    pub async fn fetch_address_history(
        &self,
        params: &HistoryParams,
    ) -> Result<Vec<AddressHistoryItem>, HistoryError> {
        let request = self.validate(params)?;
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(HistoryError::MissingApiKey)?;

        let query = TxListQuery::new(&request, api_key);
        let envelope = self.explorer.txlist(&query).await.map_err(|e| {
            let e = HistoryError::from(e).redact(api_key);
            warn!(target: "history", address = %request.address, error = %e, "explorer call failed");
            e
        })?;

        let items = translate(envelope).map_err(|e| e.redact(api_key))?;
        debug!(target: "history", address = %request.address, page = request.page, count = items.len(), "history fetched");
        Ok(items)
    }

    /// Input checks that need configuration but no I/O
    pub fn validate(&self, params: &HistoryParams) -> Result<AddressHistoryRequest, HistoryError> {
        let request = AddressHistoryRequest::from_params(params)?;
        if !self.config.supports_chain(request.chain_id) {
            return Err(HistoryError::UnsupportedChain(request.chain_id.to_string()));
        }
        Ok(request)
    }
}

/// Map the explorer envelope onto items or an error
pub fn translate(envelope: Envelope) -> Result<Vec<AddressHistoryItem>, HistoryError> {
    if envelope.status == "0" {
        // The result sentence wins; the short `message` only fills in for it
        let text = match envelope.result {
            UpstreamResult::Message(m) if !m.is_empty() => m,
            _ => envelope.message,
        };
        if is_no_transactions(&text) {
            return Ok(Vec::new());
        }
        if text.is_empty() {
            return Err(HistoryError::Upstream("Explorer error".to_string()));
        }
        return Err(HistoryError::Upstream(text));
    }

    match envelope.result {
        UpstreamResult::Items(items) => Ok(items),
        UpstreamResult::Message(_) | UpstreamResult::Other(_) => Ok(Vec::new()),
    }
}

fn is_no_transactions(message: &str) -> bool {
    message.to_lowercase().contains("no transactions found")
}
