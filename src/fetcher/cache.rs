use alloy::primitives::Address;
use anyhow::{anyhow, Result};
use moka::future::Cache;
use std::future::Future;
use std::time::Duration;

use crate::config::CacheSettings;
use crate::valuation::TokenMeta;

/// Identifies a V3 pool by its factory and creation parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PoolKey {
    pub chain: String,
    pub factory: Address,
    pub token0: Address,
    pub token1: Address,
    pub fee: u32,
}

/// Process-wide cache of data that never changes for a deployed contract:
/// ERC-20 decimals/symbol and factory pool addresses.
///
/// Only successful lookups are stored. A failed fetch is returned to the
/// caller and retried on the next request.
pub struct MetadataCache {
    tokens: Cache<(String, Address), TokenMeta>,
    pools: Cache<PoolKey, Address>,
}

impl MetadataCache {
    pub fn new(settings: &CacheSettings) -> Self {
        let ttl = Duration::from_secs(settings.ttl_secs);

        let tokens = Cache::builder()
            .max_capacity(settings.max_capacity)
            .time_to_live(ttl)
            .build();

        let pools = Cache::builder()
            .max_capacity(settings.max_capacity)
            .time_to_live(ttl)
            .build();

        Self { tokens, pools }
    }

    /// Cached token metadata, running `fetch` on a miss.
    ///
    /// Concurrent misses for the same key share a single `fetch`.
    pub async fn token_meta_or_fetch<F>(
        &self,
        chain: &str,
        token: Address,
        fetch: F,
    ) -> Result<TokenMeta>
    where
        F: Future<Output = Result<TokenMeta>>,
    {
        self.tokens
            .try_get_with((chain.to_string(), token), fetch)
            .await
            .map_err(|e| anyhow!("{e:#}"))
    }

    /// Cached pool address, running `fetch` on a miss.
    pub async fn pool_or_fetch<F>(&self, key: PoolKey, fetch: F) -> Result<Address>
    where
        F: Future<Output = Result<Address>>,
    {
        self.pools
            .try_get_with(key, fetch)
            .await
            .map_err(|e| anyhow!("{e:#}"))
    }

    pub fn invalidate_all(&self) {
        self.tokens.invalidate_all();
        self.pools.invalidate_all();
    }

    /// Approximate number of cached entries (tokens, pools).
    pub fn entry_count(&self) -> (u64, u64) {
        (self.tokens.entry_count(), self.pools.entry_count())
    }
}
