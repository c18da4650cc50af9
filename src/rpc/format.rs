use alloy::primitives::U256;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

// ============================================================================
// Display Helpers
// ============================================================================

const ETH_DECIMALS: usize = 18;

/// Shorten long hex strings to `0x1234...abcd`
pub fn short_hex(hex: &str) -> String {
    if hex.is_empty() {
        return "-".to_string();
    }
    let len = hex.chars().count();
    if len <= 14 {
        return hex.to_string();
    }
    let head: String = hex.chars().take(6).collect();
    let tail: String = hex.chars().skip(len - 4).collect();
    format!("{head}...{tail}")
}

/// Wei as ether with a fixed number of fraction digits (truncated)
pub fn format_eth(wei: U256, digits: usize) -> String {
    let wei_str = format!("{:0>width$}", wei.to_string(), width = ETH_DECIMALS + 1);
    let (whole, frac) = wei_str.split_at(wei_str.len() - ETH_DECIMALS);
    if digits == 0 {
        return whole.to_string();
    }
    format!("{whole}.{}", &frac[..digits.min(ETH_DECIMALS)])
}

/// Decimal wei string as ether; non-numeric input is shown as-is
pub fn format_eth_str(wei: &str, digits: usize) -> String {
    match wei.parse::<U256>() {
        Ok(v) => format_eth(v, digits),
        Err(_) if wei.is_empty() => format_eth(U256::ZERO, digits),
        Err(_) => wei.to_string(),
    }
}

pub fn format_gwei(wei: u128) -> String {
    let gwei = wei as f64 / 1_000_000_000.0;
    if gwei >= 1.0 {
        format!("{gwei:.2} gwei")
    } else {
        format!("{gwei:.4} gwei")
    }
}

/// Relative age of a unix timestamp
pub fn format_age(ts: u64) -> String {
    format_age_at(ts, SystemTime::now())
}

/// `-` when `ts` is past what the system clock can represent
pub fn format_age_at(ts: u64, now: SystemTime) -> String {
    let Some(datetime) = UNIX_EPOCH.checked_add(Duration::from_secs(ts)) else {
        return "-".to_string();
    };
    let secs_ago = now
        .duration_since(datetime)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    if secs_ago < 60 {
        format!("{secs_ago} secs ago")
    } else if secs_ago < 3600 {
        format!("{} mins ago", secs_ago / 60)
    } else if secs_ago < 86400 {
        format!("{} hours ago", secs_ago / 3600)
    } else {
        format!("{} days ago", secs_ago / 86400)
    }
}
