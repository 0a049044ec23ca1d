use std::collections::HashMap;

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

/// HTTP API listener configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// HTML file served at `/` and `/index.html`.
    #[serde(default = "default_dashboard_path")]
    pub dashboard_path: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_dashboard_path() -> String {
    "index.html".to_string()
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            dashboard_path: default_dashboard_path(),
        }
    }
}

/// Token metadata and pool address cache policy.
///
/// Entries are non-authoritative: a chain reorg or a redeployed contract is
/// only picked up after `ttl_secs`.
#[derive(Debug, Deserialize, Clone)]
pub struct CacheSettings {
    #[serde(default = "default_cache_capacity")]
    pub max_capacity: u64,
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_cache_capacity() -> u64 {
    10_000
}

fn default_cache_ttl_secs() -> u64 {
    3600
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_capacity: default_cache_capacity(),
            ttl_secs: default_cache_ttl_secs(),
        }
    }
}

/// Chain RPC behaviour.
#[derive(Debug, Deserialize, Clone)]
pub struct RpcSettings {
    #[serde(default = "default_rpc_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_rpc_timeout_secs() -> u64 {
    30
}

impl Default for RpcSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_rpc_timeout_secs(),
        }
    }
}

/// Contract addresses of one V3 deployment (Uniswap, PancakeSwap, ...).
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ProtocolSettings {
    pub position_manager: String,
    pub factory: String,
}

/// One supported chain: its RPC endpoint, stablecoins and V3 deployments.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ChainSettings {
    pub rpc_url: String,
    #[serde(default)]
    pub stablecoins: Vec<String>,
    #[serde(default)]
    pub protocols: HashMap<String, ProtocolSettings>,
}

/// Root application configuration.
///
/// Loaded from an optional `config.{yaml,toml,json}` file, overridden by
/// `LPSCOPE__SECTION__KEY` environment variables.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub rpc: RpcSettings,
    #[serde(default)]
    pub chains: HashMap<String, ChainSettings>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(
                Environment::with_prefix("LPSCOPE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = s.try_deserialize()?;

        Ok(settings.with_builtin_chains())
    }

    /// Parse settings from an in-memory document.
    pub fn from_document(document: &str, format: FileFormat) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::from_str(document, format))
            .build()?;

        let settings: Settings = s.try_deserialize()?;

        Ok(settings.with_builtin_chains())
    }

    /// Fall back to the built-in chain table when none is configured.
    fn with_builtin_chains(mut self) -> Self {
        if self.chains.is_empty() {
            self.chains = builtin_chains();
        }
        self
    }
}

/// BNB Smart Chain with PancakeSwap V3 and Uniswap V3.
pub fn builtin_chains() -> HashMap<String, ChainSettings> {
    let protocols = HashMap::from([
        (
            "pancake".to_string(),
            ProtocolSettings {
                position_manager: "0x46A15B0b27311cedF172AB29E4f4766fbE7F4364".to_string(),
                factory: "0x0BFbCF9fa4f9C56B0F40a671Ad40E0805A091865".to_string(),
            },
        ),
        (
            "uniswap".to_string(),
            ProtocolSettings {
                position_manager: "0x7b8A01B39D58278b5DE7e48c8449c9f4F5170613".to_string(),
                factory: "0xdB1d10011AD0Ff90774D0C6Bb92e5C5c8b4461F7".to_string(),
            },
        ),
    ]);

    HashMap::from([(
        "bsc".to_string(),
        ChainSettings {
            rpc_url: "https://bsc-dataseed.binance.org".to_string(),
            stablecoins: vec![
                // USDT
                "0x55d398326f99059ff775485246999027b3197955".to_string(),
                // USDC
                "0x8ac76a51cc950d9822d68b83fe1ad97b32cd580d".to_string(),
            ],
            protocols,
        },
    )])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let settings = Settings::from_document("{}", FileFormat::Json).unwrap();
        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.cache.ttl_secs, 3600);
        assert_eq!(settings.rpc.timeout_secs, 30);
        assert_eq!(settings.chains, builtin_chains());
    }

    #[test]
    fn test_yaml_chain_table_replaces_builtin() {
        let yaml = r#"
server:
  port: 8080
cache:
  max_capacity: 50
  ttl_secs: 60
chains:
  ethereum:
    rpc_url: "https://eth.example.org"
    stablecoins:
      - "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"
    protocols:
      uniswap:
        position_manager: "0xC36442b4a4522E871399CD717aBDD847Ab11FE88"
        factory: "0x1F98431c8aD98523631AE4a59f267346ea31F984"
"#;
        let settings = Settings::from_document(yaml, FileFormat::Yaml).unwrap();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.cache.max_capacity, 50);
        assert_eq!(settings.chains.len(), 1);

        let ethereum = &settings.chains["ethereum"];
        assert_eq!(ethereum.stablecoins.len(), 1);
        assert_eq!(
            ethereum.protocols["uniswap"].factory,
            "0x1F98431c8aD98523631AE4a59f267346ea31F984"
        );
    }
}
