use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable holding the explorer API key
pub const API_KEY_ENV: &str = "ETHERSCAN_API_KEY";

/// Etherscan v2 multichain endpoint
pub const DEFAULT_EXPLORER_URL: &str = "https://api.etherscan.io/v2/api";

/// Ethereum mainnet and Sepolia
pub const DEFAULT_CHAINS: &[u64] = &[1, 11_155_111];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub rpc_url: Option<String>,
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,
    #[serde(default)]
    pub explorer: ExplorerConfig,
}

/// Upstream block explorer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorerConfig {
    #[serde(default = "default_explorer_url")]
    pub base_url: String,
    /// Chain ids the proxy will forward requests for
    #[serde(default = "default_chains")]
    pub chains: Vec<u64>,
    /// Outbound request timeout; the HTTP client default applies when unset
    pub timeout_secs: Option<u64>,
    /// Server-side secret, only ever read from the process environment
    #[serde(skip)]
    pub api_key: Option<String>,
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3000))
}

fn default_explorer_url() -> String {
    DEFAULT_EXPLORER_URL.to_string()
}

fn default_chains() -> Vec<u64> {
    DEFAULT_CHAINS.to_vec()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: None,
            listen: default_listen(),
            explorer: ExplorerConfig::default(),
        }
    }
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            base_url: default_explorer_url(),
            chains: default_chains(),
            timeout_secs: None,
            api_key: None,
        }
    }
}

impl ExplorerConfig {
    pub fn supports_chain(&self, chain_id: u64) -> bool {
        self.chains.contains(&chain_id)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Config {
    /// Returns the config directory path (~/.config/chainlens on Linux)
    fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join("chainlens"))
            .context("Could not determine config directory")
    }

    /// Returns the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load config from the default location and overlay the environment
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = Self::load_from(&path)?;
        config.apply_env(std::env::var(API_KEY_ENV).ok());
        Ok(config)
    }

    /// Load config from a file, or return default if not found
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {path:?}"))?;

        toml::from_str(&contents).context("Failed to parse config file")
    }

    /// Take the API key from the environment; blank values count as unset
    pub fn apply_env(&mut self, api_key: Option<String>) {
        self.explorer.api_key = api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
    }

    /// Save config to disk
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory {dir:?}"))?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config to {path:?}"))?;

        Ok(())
    }

    /// Set the RPC URL and persist
    pub fn set_rpc(&mut self, url: String) -> Result<()> {
        self.rpc_url = Some(url);
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("missing.toml")).unwrap();

        assert!(config.rpc_url.is_none());
        assert_eq!(config.listen, default_listen());
        assert_eq!(config.explorer.base_url, DEFAULT_EXPLORER_URL);
        assert!(config.explorer.supports_chain(1));
        assert!(config.explorer.supports_chain(11_155_111));
        assert!(!config.explorer.supports_chain(0));
        assert!(config.explorer.timeout().is_none());
        assert!(config.explorer.api_key.is_none());
    }

    #[test]
    fn test_parse_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
rpc_url = "http://localhost:8545"

[explorer]
chains = [10]
timeout_secs = 5
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.rpc_url.as_deref(), Some("http://localhost:8545"));
        assert_eq!(config.explorer.chains, vec![10]);
        assert_eq!(config.explorer.base_url, DEFAULT_EXPLORER_URL);
        assert_eq!(config.explorer.timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_api_key_is_never_read_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[explorer]\napi_key = \"from-file\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert!(config.explorer.api_key.is_none());
    }

    #[test]
    fn test_apply_env_ignores_blank_key() {
        let mut config = Config::default();
        config.apply_env(Some("   ".to_string()));
        assert!(config.explorer.api_key.is_none());

        config.apply_env(Some(" secret ".to_string()));
        assert_eq!(config.explorer.api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn test_save_does_not_persist_api_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.rpc_url = Some("http://localhost:8545".to_string());
        config.apply_env(Some("secret".to_string()));
        config.save_to(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(!written.contains("secret"));

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.rpc_url, config.rpc_url);
    }
}
