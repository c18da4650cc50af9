use alloy::{
    consensus::Transaction as TxTrait,
    network::TransactionResponse,
    primitives::{Address, U256},
};

// ============================================================================
// Data Types
// ============================================================================

#[derive(Debug, Clone)]
pub struct BlockSummary {
    pub number: u64,
    pub hash: String,
    pub timestamp: u64,
    pub tx_count: usize,
    pub gas_used: u64,
    pub gas_limit: u64,
    pub base_fee: Option<u64>,
    pub miner: String,
}

impl BlockSummary {
    pub fn from_block(block: &alloy::rpc::types::Block) -> Self {
        Self {
            number: block.header.number,
            hash: format!("{:?}", block.header.hash),
            timestamp: block.header.timestamp,
            tx_count: block.transactions.len(),
            gas_used: block.header.gas_used,
            gas_limit: block.header.gas_limit,
            base_fee: block.header.base_fee_per_gas,
            miner: format!("{:?}", block.header.beneficiary),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStatus {
    Success,
    Reverted,
    /// No receipt yet
    Pending,
}

impl TxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxStatus::Success => "Success",
            TxStatus::Reverted => "Reverted",
            TxStatus::Pending => "Pending",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TxDetails {
    pub hash: String,
    pub from: String,
    pub to: Option<String>,
    pub value: U256,
    pub nonce: u64,
    pub gas_limit: u64,
    pub block_number: Option<u64>,
    pub status: TxStatus,
    pub gas_used: Option<u64>,
    pub effective_gas_price: Option<u128>,
}

impl TxDetails {
    pub fn from_tx_and_receipt(
        tx: &alloy::rpc::types::Transaction,
        receipt: Option<&alloy::rpc::types::TransactionReceipt>,
    ) -> Self {
        let status = match receipt {
            Some(r) if r.status() => TxStatus::Success,
            Some(_) => TxStatus::Reverted,
            None => TxStatus::Pending,
        };

        Self {
            hash: format!("{:?}", tx.tx_hash()),
            from: format!("{:?}", tx.from()),
            to: tx.to().map(|a| format!("{a:?}")),
            value: tx.value(),
            nonce: tx.nonce(),
            gas_limit: tx.gas_limit(),
            // The receipt knows the block even when the tx object lags behind
            block_number: receipt
                .and_then(|r| r.block_number)
                .or_else(|| tx.block_number()),
            status,
            gas_used: receipt.map(|r| r.gas_used),
            effective_gas_price: receipt.map(|r| r.effective_gas_price),
        }
    }

    /// gas used × effective gas price, once mined
    pub fn fee(&self) -> Option<U256> {
        match (self.gas_used, self.effective_gas_price) {
            (Some(used), Some(price)) => Some(U256::from(used) * U256::from(price)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AddressSummary {
    pub address: Address,
    pub balance: U256,
    pub nonce: u64,
    pub is_contract: bool,
    pub code_size: Option<usize>,
}

impl AddressSummary {
    pub fn kind(&self) -> &'static str {
        if self.is_contract {
            "Contract"
        } else {
            "EOA"
        }
    }
}

/// Result of looking up a classified query over RPC
#[derive(Debug, Clone)]
pub enum Lookup {
    Transaction(TxDetails),
    Address(AddressSummary),
    Block(BlockSummary),
}
