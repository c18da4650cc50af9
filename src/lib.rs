//! chainlens - block explorer backend for EVM chains
//!
//! Classifies search input, proxies address history from an Etherscan-style
//! API, and runs direct RPC lookups for transactions, addresses and blocks.

pub mod config;
pub mod history;
pub mod query;
pub mod rpc;
pub mod server;

// Re-export commonly used types
pub use config::Config;
pub use history::{AddressHistoryResponse, HistoryError, HistoryProxy};
pub use query::{classify, ExplorerView, QueryKind, ViewState};
