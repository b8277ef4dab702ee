//! Price oracle cache: resolves the wagering token's price in base currency.
//!
//! Sources are tried in fixed priority order (Jupiter, DexScreener,
//! CoinGecko). Successes are cached with a TTL; when every source fails the
//! last cached value is served stale; with no cache at all a configured
//! static rate is the final fallback. Lookups never fail hard — callers get
//! `None` and substitute their own default conversion rate.

use crate::config::OracleConfig;
use crate::sources::{CoinGeckoClient, DexScreenerClient, JupiterClient};
use chrono::Utc;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// A resolved price, as served to callers and the price endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub price: f64,
    /// Unix millis when the underlying value was fetched.
    pub cached_at: i64,
    /// True when served past TTL or from the static fallback.
    pub stale: bool,
}

#[derive(Debug, Clone)]
struct CachedPrice {
    price: f64,
    cached_at: i64,
    fetched: Instant,
}

pub struct PriceOracle {
    jupiter: JupiterClient,
    dexscreener: DexScreenerClient,
    coingecko: CoinGeckoClient,
    cache: DashMap<String, CachedPrice>,
    ttl: Duration,
    static_price: Option<f64>,
    token_mint: String,
}

impl PriceOracle {
    pub fn new(config: &OracleConfig) -> Arc<Self> {
        let client = reqwest::Client::builder()
            .user_agent("Rumble/1.0 (PvP Wager Game Backend)")
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Arc::new(Self {
            jupiter: JupiterClient::new(client.clone()),
            dexscreener: DexScreenerClient::new(client.clone()),
            coingecko: CoinGeckoClient::new(client),
            cache: DashMap::new(),
            ttl: Duration::from_secs(config.price_ttl_secs),
            static_price: config.static_price,
            token_mint: config.token_mint.clone(),
        })
    }

    /// An oracle pinned to a fixed price. For tests and offline development:
    /// the seeded cache never expires, so no source is ever queried.
    pub fn fixed(price: f64) -> Arc<Self> {
        let config = OracleConfig {
            price_ttl_secs: u64::MAX / 4,
            static_price: Some(price),
            ..OracleConfig::default()
        };
        let oracle = Self::new(&config);
        oracle.cache.insert(
            oracle.token_mint.clone(),
            CachedPrice {
                price,
                cached_at: Utc::now().timestamp_millis(),
                fetched: Instant::now(),
            },
        );
        oracle
    }

    /// Price of the configured wagering token in base currency.
    pub async fn get_price(&self) -> Option<PriceQuote> {
        self.price_for(&self.token_mint.clone()).await
    }

    /// Price of an arbitrary token in base currency.
    pub async fn price_for(&self, mint: &str) -> Option<PriceQuote> {
        if let Some(cached) = self.cache.get(mint) {
            if cached.fetched.elapsed() < self.ttl {
                return Some(PriceQuote {
                    price: cached.price,
                    cached_at: cached.cached_at,
                    stale: false,
                });
            }
        }

        if let Some(price) = self.fetch_from_sources(mint).await {
            let cached_at = Utc::now().timestamp_millis();
            self.cache.insert(
                mint.to_string(),
                CachedPrice {
                    price,
                    cached_at,
                    fetched: Instant::now(),
                },
            );
            return Some(PriceQuote {
                price,
                cached_at,
                stale: false,
            });
        }

        // Every source failed: serve the last cached value regardless of age.
        if let Some(cached) = self.cache.get(mint) {
            warn!("All price sources failed for {}, serving stale cache", mint);
            return Some(PriceQuote {
                price: cached.price,
                cached_at: cached.cached_at,
                stale: true,
            });
        }

        if let Some(price) = self.static_price {
            warn!("All price sources failed for {}, serving static rate", mint);
            return Some(PriceQuote {
                price,
                cached_at: Utc::now().timestamp_millis(),
                stale: true,
            });
        }

        warn!("No price available for {}", mint);
        None
    }

    async fn fetch_from_sources(&self, mint: &str) -> Option<f64> {
        match self.jupiter.fetch_price(mint).await {
            Ok(price) => return Some(price),
            Err(e) => debug!("Jupiter price fetch failed for {}: {}", mint, e),
        }
        match self.dexscreener.fetch_price(mint).await {
            Ok(price) => return Some(price),
            Err(e) => debug!("DexScreener price fetch failed for {}: {}", mint, e),
        }
        match self.coingecko.fetch_price(mint).await {
            Ok(price) => return Some(price),
            Err(e) => debug!("CoinGecko price fetch failed for {}: {}", mint, e),
        }
        None
    }

    /// Token-to-base conversion rate, falling back to `default_rate` when the
    /// oracle has nothing at all.
    pub async fn conversion_rate(&self, default_rate: f64) -> f64 {
        match self.get_price().await {
            Some(quote) => quote.price,
            None => default_rate,
        }
    }
}
