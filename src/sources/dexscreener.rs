use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

const DEXSCREENER_API_URL: &str = "https://api.dexscreener.com/latest/dex/tokens";

#[derive(Debug, Deserialize)]
struct DexScreenerResponse {
    pairs: Option<Vec<DexScreenerPair>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DexScreenerPair {
    price_usd: Option<String>,
    liquidity: Option<DexScreenerLiquidity>,
}

#[derive(Debug, Deserialize)]
struct DexScreenerLiquidity {
    usd: Option<f64>,
}

/// DexScreener price client. Secondary source; picks the deepest pool.
#[derive(Clone)]
pub struct DexScreenerClient {
    client: Client,
}

impl DexScreenerClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn fetch_price(&self, mint: &str) -> anyhow::Result<f64> {
        let url = format!("{}/{}", DEXSCREENER_API_URL, mint);
        let response: DexScreenerResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let pairs = response
            .pairs
            .ok_or_else(|| anyhow::anyhow!("DexScreener returned no pairs for {}", mint))?;

        // Deepest pool first; its price is the least manipulable.
        let best = pairs
            .into_iter()
            .filter(|p| p.price_usd.is_some())
            .max_by(|a, b| {
                let la = a.liquidity.as_ref().and_then(|l| l.usd).unwrap_or(0.0);
                let lb = b.liquidity.as_ref().and_then(|l| l.usd).unwrap_or(0.0);
                la.total_cmp(&lb)
            })
            .ok_or_else(|| anyhow::anyhow!("DexScreener has no priced pair for {}", mint))?;

        let price = best
            .price_usd
            .as_deref()
            .unwrap_or_default()
            .parse::<f64>()?;

        debug!("DexScreener price for {}: {}", mint, price);
        Ok(price)
    }
}
