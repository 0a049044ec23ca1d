use alloy::{
    primitives::{aliases::U24, Address, U256},
    providers::{DynProvider, ProviderBuilder},
};
use anyhow::{bail, Context, Result};
use bigdecimal::BigDecimal;
use log::{debug, info};
use rustc_hash::FxHashMap;
use std::future::IntoFuture;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use super::{
    cache::{MetadataCache, PoolKey},
    error::AnalyzeError,
};
use crate::abis::{
    INonfungiblePositionManager::{self, CollectParams},
    IUniswapV3Factory, IUniswapV3Pool, IERC20,
};
use crate::config::{ChainSettings, Settings};
use crate::utils::ensure_bit_width;
use crate::valuation::{
    FeeSnapshot, PoolSnapshot, PositionSnapshot, StableSet, TokenMeta, ValuationResult, Valuator,
};

/// A validated `/analyze` request.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzeRequest {
    pub chain: String,
    pub protocol: String,
    pub token_id: U256,
    pub cost_usd: Option<BigDecimal>,
}

impl AnalyzeRequest {
    /// Build a request from raw query parameters. Blank values count as absent.
    pub fn from_params(
        chain: Option<&str>,
        protocol: Option<&str>,
        token_id: Option<&str>,
        cost_usd: Option<&str>,
    ) -> Result<Self, AnalyzeError> {
        fn present(value: Option<&str>) -> Option<&str> {
            value.map(str::trim).filter(|v| !v.is_empty())
        }

        let (Some(chain), Some(protocol), Some(token_id)) =
            (present(chain), present(protocol), present(token_id))
        else {
            return Err(AnalyzeError::MissingParameters);
        };

        let token_id = U256::from_str_radix(token_id, 10).map_err(|_| {
            AnalyzeError::InvalidRequest("tokenId must be a non-negative integer".to_string())
        })?;

        let cost_usd = present(cost_usd)
            .map(|cost| {
                BigDecimal::from_str(cost).map_err(|_| {
                    AnalyzeError::InvalidRequest("costUsd must be a decimal number".to_string())
                })
            })
            .transpose()?;

        Ok(Self {
            chain: chain.to_lowercase(),
            protocol: protocol.to_lowercase(),
            token_id,
            cost_usd,
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct ProtocolContracts {
    position_manager: Address,
    factory: Address,
}

/// RPC provider and contract table for one chain.
struct ChainClient {
    provider: DynProvider,
    valuator: Valuator,
    protocols: FxHashMap<String, ProtocolContracts>,
}

impl ChainClient {
    fn new(name: &str, settings: &ChainSettings) -> Result<Self> {
        let url = Url::parse(&settings.rpc_url)
            .with_context(|| format!("Invalid RPC URL for chain {name}"))?;

        let provider = DynProvider::new(ProviderBuilder::new().connect_http(url));

        let stables = StableSet::from_hex(&settings.stablecoins)
            .with_context(|| format!("Invalid stablecoin list for chain {name}"))?;

        let mut protocols = FxHashMap::default();
        for (protocol, contracts) in &settings.protocols {
            let parsed = ProtocolContracts {
                position_manager: parse_address(&contracts.position_manager)
                    .with_context(|| format!("{name}/{protocol} position manager"))?,
                factory: parse_address(&contracts.factory)
                    .with_context(|| format!("{name}/{protocol} factory"))?,
            };
            protocols.insert(protocol.to_lowercase(), parsed);
        }

        Ok(Self {
            provider,
            valuator: Valuator::new(stables),
            protocols,
        })
    }
}

fn parse_address(value: &str) -> Result<Address> {
    value
        .to_lowercase()
        .parse::<Address>()
        .with_context(|| format!("{value} is not a valid address"))
}

/// Reads a consistent position snapshot from chain and values it.
pub struct SnapshotFetcher {
    chains: FxHashMap<String, ChainClient>,
    cache: Arc<MetadataCache>,
    rpc_timeout: Duration,
}

impl SnapshotFetcher {
    /// Build one HTTP provider per configured chain.
    pub fn new(settings: &Settings, cache: Arc<MetadataCache>) -> Result<Self> {
        let mut chains = FxHashMap::default();
        for (name, chain) in &settings.chains {
            let client = ChainClient::new(name, chain)?;
            info!(
                "Configured chain {} with {} protocol(s) and {} stablecoin(s)",
                name,
                client.protocols.len(),
                client.valuator.stables().len()
            );
            chains.insert(name.to_lowercase(), client);
        }

        Ok(Self {
            chains,
            cache,
            rpc_timeout: Duration::from_secs(settings.rpc.timeout_secs),
        })
    }

    /// Whether `chain`/`protocol` is configured.
    pub fn supports(&self, chain: &str, protocol: &str) -> bool {
        self.resolve(chain, protocol).is_ok()
    }

    fn resolve(
        &self,
        chain: &str,
        protocol: &str,
    ) -> Result<(&ChainClient, ProtocolContracts), AnalyzeError> {
        self.chains
            .get(chain)
            .and_then(|client| client.protocols.get(protocol).map(|c| (client, *c)))
            .ok_or_else(|| AnalyzeError::UnsupportedProtocol {
                chain: chain.to_string(),
                protocol: protocol.to_string(),
            })
    }

    /// Fetch everything the valuation needs for `request.token_id` and value it.
    pub async fn analyze(&self, request: &AnalyzeRequest) -> Result<ValuationResult, AnalyzeError> {
        let (client, contracts) = self.resolve(&request.chain, &request.protocol)?;
        let token_id = request.token_id;

        info!(
            "Analyzing {}/{} position #{}",
            request.chain, request.protocol, token_id
        );

        // Position state and owner
        let manager =
            INonfungiblePositionManager::new(contracts.position_manager, &client.provider);
        let positions_call = manager.positions(token_id);
        let owner_call = manager.ownerOf(token_id);
        let (position, owner) = futures::try_join!(
            self.rpc(positions_call.call(), "positions"),
            self.rpc(owner_call.call(), "ownerOf"),
        )?;

        let (token0, token1) = (position.token0, position.token1);
        let fee = position.fee;
        debug!(
            "Position #{}: {}/{} fee {} owner {}",
            token_id, token0, token1, fee, owner
        );

        // Pool and token metadata
        let pool_address = self
            .pool_address(&request.chain, client, contracts.factory, token0, token1, fee)
            .await?;
        let (meta0, meta1) = futures::try_join!(
            self.token_meta(&request.chain, client, token0),
            self.token_meta(&request.chain, client, token1),
        )?;

        // Pool price and owed fees at the latest block
        let pool = IUniswapV3Pool::new(pool_address, &client.provider);
        let slot0_call = pool.slot0();
        let collect_call = manager
            .collect(CollectParams {
                tokenId: token_id,
                recipient: owner,
                amount0Max: u128::MAX,
                amount1Max: u128::MAX,
            })
            .from(owner);
        let (slot0, collected) = futures::try_join!(
            self.rpc(slot0_call.call(), "slot0"),
            self.rpc(collect_call.call(), "collect"),
        )?;

        let position = PositionSnapshot {
            token_id,
            token0,
            token1,
            fee_tier: fee.to::<u32>(),
            tick_lower: position.tickLower.as_i32(),
            tick_upper: position.tickUpper.as_i32(),
            liquidity: position.liquidity,
        };
        let pool = PoolSnapshot {
            address: pool_address,
            sqrt_price_x96: U256::from(slot0.sqrtPriceX96),
            current_tick: slot0.tick.as_i32(),
        };
        let fees = FeeSnapshot {
            amount0: ensure_bit_width(collected.amount0, 128, "collect amount0")?.to::<u128>(),
            amount1: ensure_bit_width(collected.amount1, 128, "collect amount1")?.to::<u128>(),
        };

        let result = client.valuator.value_position(
            &position,
            &pool,
            &fees,
            &meta0,
            &meta1,
            request.cost_usd.clone(),
        )?;

        info!(
            "Position #{} valued: {}/{} in range: {}",
            token_id, result.volatile_symbol, result.stable_symbol, result.in_range
        );

        Ok(result)
    }

    async fn pool_address(
        &self,
        chain: &str,
        client: &ChainClient,
        factory: Address,
        token0: Address,
        token1: Address,
        fee: U24,
    ) -> Result<Address> {
        let key = PoolKey {
            chain: chain.to_string(),
            factory,
            token0,
            token1,
            fee: fee.to::<u32>(),
        };

        self.cache
            .pool_or_fetch(key, async move {
                let factory = IUniswapV3Factory::new(factory, &client.provider);
                let get_pool = factory.getPool(token0, token1, fee);
                let pool = self.rpc(get_pool.call(), "getPool").await?;
                if pool.is_zero() {
                    bail!("Factory has no pool for {token0}/{token1} at fee {fee}");
                }
                debug!("Resolved pool {} for {}/{} fee {}", pool, token0, token1, fee);
                Ok(pool)
            })
            .await
    }

    async fn token_meta(
        &self,
        chain: &str,
        client: &ChainClient,
        token: Address,
    ) -> Result<TokenMeta> {
        self.cache
            .token_meta_or_fetch(chain, token, async move {
                let erc20 = IERC20::new(token, &client.provider);
                let decimals_call = erc20.decimals();
                let symbol_call = erc20.symbol();
                let (decimals, symbol) = futures::try_join!(
                    self.rpc(decimals_call.call(), "decimals"),
                    self.rpc(symbol_call.call(), "symbol"),
                )?;
                debug!("Fetched token {} ({}, {} decimals)", token, symbol, decimals);
                Ok(TokenMeta::new(decimals, symbol))
            })
            .await
            .with_context(|| format!("Failed to load metadata for token {token}"))
    }

    /// Await a contract call under the configured RPC timeout.
    async fn rpc<F, T, E>(&self, call: F, method: &str) -> Result<T>
    where
        F: IntoFuture<Output = std::result::Result<T, E>>,
        E: std::error::Error + Send + Sync + 'static,
    {
        tokio::time::timeout(self.rpc_timeout, call)
            .await
            .with_context(|| format!("{method} timed out"))?
            .with_context(|| format!("{method} call failed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheSettings;

    fn fetcher() -> SnapshotFetcher {
        let settings = Settings::from_document("{}", ::config::FileFormat::Json).unwrap();
        let cache = Arc::new(MetadataCache::new(&CacheSettings::default()));
        SnapshotFetcher::new(&settings, cache).unwrap()
    }

    #[test]
    fn test_request_requires_all_identifiers() {
        let err = AnalyzeRequest::from_params(Some("bsc"), None, Some("1"), None).unwrap_err();
        assert!(matches!(err, AnalyzeError::MissingParameters));

        let err = AnalyzeRequest::from_params(Some("bsc"), Some("pancake"), Some("  "), None)
            .unwrap_err();
        assert!(matches!(err, AnalyzeError::MissingParameters));
    }

    #[test]
    fn test_request_parses_token_id_and_cost() {
        let request =
            AnalyzeRequest::from_params(Some("BSC"), Some("Pancake"), Some("123456"), Some("1000.5"))
                .unwrap();
        assert_eq!(request.chain, "bsc");
        assert_eq!(request.protocol, "pancake");
        assert_eq!(request.token_id, U256::from(123456u64));
        assert_eq!(request.cost_usd, Some(BigDecimal::from_str("1000.5").unwrap()));

        let request =
            AnalyzeRequest::from_params(Some("bsc"), Some("pancake"), Some("7"), Some("")).unwrap();
        assert_eq!(request.cost_usd, None);
    }

    #[test]
    fn test_request_rejects_malformed_numbers() {
        for token_id in ["-1", "abc", "1.5"] {
            let err = AnalyzeRequest::from_params(Some("bsc"), Some("pancake"), Some(token_id), None)
                .unwrap_err();
            assert!(matches!(err, AnalyzeError::InvalidRequest(_)), "{token_id}");
        }

        let err = AnalyzeRequest::from_params(Some("bsc"), Some("pancake"), Some("1"), Some("lots"))
            .unwrap_err();
        assert!(matches!(err, AnalyzeError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_builtin_chain_table() {
        let fetcher = fetcher();
        assert!(fetcher.supports("bsc", "pancake"));
        assert!(fetcher.supports("bsc", "uniswap"));
        assert!(!fetcher.supports("bsc", "sushi"));
        assert!(!fetcher.supports("ethereum", "uniswap"));
    }

    #[tokio::test]
    async fn test_unsupported_protocol_fails_before_any_rpc() {
        let fetcher = fetcher();
        let request =
            AnalyzeRequest::from_params(Some("polygon"), Some("quickswap"), Some("1"), None).unwrap();
        let err = fetcher.analyze(&request).await.unwrap_err();
        assert_eq!(err.to_string(), "Unsupported chain/protocol: polygon/quickswap");
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_rejects_invalid_stablecoin_config() {
        let yaml = r#"
chains:
  bsc:
    rpc_url: "https://bsc-dataseed.binance.org"
    stablecoins: ["not-an-address"]
"#;
        let settings = Settings::from_document(yaml, ::config::FileFormat::Yaml).unwrap();
        let cache = Arc::new(MetadataCache::new(&CacheSettings::default()));
        assert!(SnapshotFetcher::new(&settings, cache).is_err());
    }
}
