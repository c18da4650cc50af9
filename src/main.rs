use chainlens::config::Config;
use chainlens::history::{AddressHistoryItem, HistoryParams, HistoryProxy};
use chainlens::query;
use chainlens::rpc::format::{format_age, format_eth, format_eth_str, format_gwei, short_hex};
use chainlens::rpc::{Lookup, RpcClient};
use chainlens::server;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "chainlens", version, about = "Block explorer backend for EVM chains")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP API
    Serve {
        /// Address to listen on, overrides the config file
        #[arg(long)]
        listen: Option<SocketAddr>,
    },
    /// Show what kind of lookup a query is
    Classify { query: String },
    /// Classify a query and fetch it over RPC
    Lookup {
        query: String,
        #[arg(long, env = "CHAINLENS_RPC_URL")]
        rpc_url: Option<String>,
    },
    /// Fetch one page of an address's transaction history
    History {
        address: String,
        #[arg(long, default_value_t = 1)]
        chain_id: u64,
        #[arg(long)]
        page: Option<u64>,
        #[arg(long)]
        offset: Option<u64>,
        #[arg(long)]
        sort: Option<String>,
    },
    /// Save the RPC URL used by `lookup`
    SetRpc { url: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("chainlens=info,tower_http=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::load()?;

    match cli.command {
        Command::Serve { listen } => {
            if let Some(listen) = listen {
                config.listen = listen;
            }
            server::serve(config).await
        }
        Command::Classify { query } => {
            let kind = query::classify(&query);
            println!("{}", kind.as_str());
            println!("{}", query::hint_for(&query));
            Ok(())
        }
        Command::Lookup { query, rpc_url } => {
            let url = rpc_url
                .or(config.rpc_url)
                .context("No RPC configured. Use 'chainlens set-rpc <url>' first.")?;
            let client = RpcClient::new(&url)?;
            let result = client
                .lookup(&query)
                .await
                .map_err(|e| anyhow::anyhow!("{e:#}\n\nRPC: {url}"))?;
            print_lookup(&result);
            Ok(())
        }
        Command::History {
            address,
            chain_id,
            page,
            offset,
            sort,
        } => {
            let proxy = HistoryProxy::etherscan(config.explorer)?;
            let params = HistoryParams {
                address: Some(address),
                chain_id: Some(chain_id.to_string()),
                page: page.map(|p| p.to_string()),
                offset: offset.map(|o| o.to_string()),
                sort,
            };
            let items = proxy.fetch_address_history(&params).await?;
            print_history(&items);
            Ok(())
        }
        Command::SetRpc { url } => {
            RpcClient::new(&url)?;
            config.set_rpc(url.clone())?;
            println!("RPC set to {url}");
            Ok(())
        }
    }
}

fn print_lookup(result: &Lookup) {
    match result {
        Lookup::Transaction(tx) => {
            println!("Tx Hash      {}", tx.hash);
            println!("Status       {}", tx.status.as_str());
            println!(
                "From -> To   {} -> {}",
                short_hex(&tx.from),
                tx.to.as_deref().map(short_hex).unwrap_or_else(|| "-".into())
            );
            println!("Value        {} ETH", format_eth(tx.value, 6));
            if let Some(block) = tx.block_number {
                println!("Block        {block}");
            }
            if let Some(gas_used) = tx.gas_used {
                println!("Gas Used     {gas_used}");
            }
            if let Some(price) = tx.effective_gas_price {
                println!("Gas Price    {}", format_gwei(price));
            }
            if let Some(fee) = tx.fee() {
                println!("Fee          {} ETH", format_eth(fee, 6));
            }
        }
        Lookup::Address(addr) => {
            println!("Address      {:?}", addr.address);
            println!("Type         {}", addr.kind());
            println!("Balance      {} ETH", format_eth(addr.balance, 6));
            println!("Nonce        {}", addr.nonce);
            if let Some(size) = addr.code_size {
                println!("Code Size    {size} bytes");
            }
        }
        Lookup::Block(block) => {
            println!("Block        {}", block.number);
            println!("Hash         {}", block.hash);
            println!("Time         {}", format_age(block.timestamp));
            println!("Tx Count     {}", block.tx_count);
            println!("Gas          {} / {}", block.gas_used, block.gas_limit);
            if let Some(base_fee) = block.base_fee {
                println!("Base Fee     {}", format_gwei(base_fee as u128));
            }
            println!("Miner        {}", block.miner);
        }
    }
}

fn print_history(items: &[AddressHistoryItem]) {
    if items.is_empty() {
        println!("No transactions on this page.");
        return;
    }

    println!("{:<16} {:<32} {:>14}  TIME", "TX", "FROM -> TO", "VALUE (ETH)");
    for item in items {
        let time = item
            .timestamp_secs()
            .map(format_age)
            .unwrap_or_else(|| "-".to_string());
        let failed = if item.is_failed() { " [failed]" } else { "" };
        println!(
            "{:<16} {:<32} {:>14}  {time}{failed}",
            short_hex(item.hash()),
            format!("{} -> {}", short_hex(item.from_address()), short_hex(item.to_address())),
            format_eth_str(item.value(), 6),
        );
    }
}
