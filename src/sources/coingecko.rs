use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

const COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";

#[derive(Debug, Deserialize)]
struct CoinGeckoTokenPrice {
    usd: Option<f64>,
}

/// CoinGecko token-price client. Tertiary source, rate-limit friendly.
#[derive(Clone)]
pub struct CoinGeckoClient {
    client: Client,
}

impl CoinGeckoClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn fetch_price(&self, mint: &str) -> anyhow::Result<f64> {
        let url = format!(
            "{}/simple/token_price/solana?contract_addresses={}&vs_currencies=usd",
            COINGECKO_API_URL, mint
        );
        let response: HashMap<String, CoinGeckoTokenPrice> = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        // CoinGecko lowercases contract addresses in its response keys.
        let price = response
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(mint))
            .and_then(|(_, v)| v.usd)
            .ok_or_else(|| anyhow::anyhow!("CoinGecko returned no price for {}", mint))?;

        debug!("CoinGecko price for {}: {}", mint, price);
        Ok(price)
    }
}
