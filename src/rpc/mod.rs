pub mod format;
mod types;

pub use types::*;

use alloy::{
    eips::BlockNumberOrTag,
    network::Ethereum,
    primitives::{Address, TxHash},
    providers::{Provider, ProviderBuilder, RootProvider},
};
use anyhow::{anyhow, bail, Context, Result};
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

use crate::query::{classify, QueryKind};

type HttpProvider = RootProvider<Ethereum>;

/// RPC client with retry logic for rate-limited endpoints
pub struct RpcClient {
    provider: HttpProvider,
    max_retries: u32,
    base_delay: Duration,
}

impl RpcClient {
    pub fn new(rpc_url: &str) -> Result<Self> {
        let url = rpc_url.parse().context("Invalid RPC URL")?;
        let provider = ProviderBuilder::new()
            .disable_recommended_fillers()
            .network::<Ethereum>()
            .connect_http(url);

        Ok(Self {
            provider,
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        })
    }

    async fn with_retry<T, F, Fut>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if attempt < self.max_retries && is_retryable(&e) => {
                    let delay = self.base_delay * 2_u32.pow(attempt);
                    debug!(target: "rpc", attempt = attempt + 1, "retrying in {delay:?}: {e:#}");
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Classify a raw query and run the matching lookup
    pub async fn lookup(&self, raw: &str) -> Result<Lookup> {
        let query = raw.trim();
        match classify(query) {
            QueryKind::Transaction => {
                let hash: TxHash = query.parse().context("Invalid transaction hash")?;
                Ok(Lookup::Transaction(self.get_transaction(hash).await?))
            }
            QueryKind::Address => {
                let address: Address = query.parse().context("Invalid address")?;
                Ok(Lookup::Address(self.get_address(address).await?))
            }
            QueryKind::Block => {
                let number = parse_block_number(query)?;
                Ok(Lookup::Block(self.get_block(number).await?))
            }
            QueryKind::Unknown => bail!("Unrecognized query: {query}"),
        }
    }

    pub async fn get_block(&self, number: u64) -> Result<BlockSummary> {
        self.with_retry(|| async {
            let block = self
                .provider
                .get_block_by_number(BlockNumberOrTag::Number(number))
                .await
                .with_context(|| format!("RPC call get_block_by_number({number}) failed"))?
                .ok_or_else(|| anyhow!("Block {number} not found (RPC returned null)"))?;

            Ok(BlockSummary::from_block(&block))
        })
        .await
        .with_context(|| format!("Failed to fetch block #{number}"))
    }

    pub async fn get_transaction(&self, hash: TxHash) -> Result<TxDetails> {
        self.with_retry(|| async {
            let tx = self
                .provider
                .get_transaction_by_hash(hash)
                .await
                .with_context(|| format!("RPC call get_transaction_by_hash({hash:?}) failed"))?
                .ok_or_else(|| anyhow!("Transaction {hash:?} not found (RPC returned null)"))?;

            let receipt = self
                .provider
                .get_transaction_receipt(hash)
                .await
                .with_context(|| format!("RPC call get_transaction_receipt({hash:?}) failed"))?;

            Ok(TxDetails::from_tx_and_receipt(&tx, receipt.as_ref()))
        })
        .await
        .with_context(|| format!("Failed to fetch transaction {hash:?}"))
    }

    pub async fn get_address(&self, address: Address) -> Result<AddressSummary> {
        self.with_retry(|| async {
            let balance = self
                .provider
                .get_balance(address)
                .await
                .with_context(|| format!("RPC call get_balance({address:?}) failed"))?;

            let nonce = self
                .provider
                .get_transaction_count(address)
                .await
                .with_context(|| format!("RPC call get_transaction_count({address:?}) failed"))?;

            let code = self
                .provider
                .get_code_at(address)
                .await
                .with_context(|| format!("RPC call get_code_at({address:?}) failed"))?;

            let is_contract = !code.is_empty();

            Ok(AddressSummary {
                address,
                balance,
                nonce,
                is_contract,
                code_size: is_contract.then_some(code.len()),
            })
        })
        .await
        .with_context(|| format!("Failed to fetch address {address:?}"))
    }
}

/// Decimal block number; digits beyond `u64` are a lookup error
pub fn parse_block_number(query: &str) -> Result<u64> {
    query
        .parse::<u64>()
        .map_err(|_| anyhow!("Block number out of range: {query}"))
}

/// Rate limits and transient network errors
fn is_retryable(e: &anyhow::Error) -> bool {
    let error_lower = format!("{e:#}").to_lowercase();
    [
        "rate", "limit", "429", "too many", "timeout", "timed out", "connection",
        "temporarily", "unavailable", "502", "503", "504",
    ]
    .iter()
    .any(|needle| error_lower.contains(needle))
}
