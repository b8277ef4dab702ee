use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

const JUPITER_API_URL: &str = "https://lite-api.jup.ag/price/v2";

#[derive(Debug, Deserialize)]
struct JupiterPriceResponse {
    data: HashMap<String, Option<JupiterPrice>>,
}

#[derive(Debug, Deserialize)]
struct JupiterPrice {
    /// Jupiter serves prices as decimal strings.
    price: String,
}

/// Jupiter price client. Primary source for token prices in USD.
#[derive(Clone)]
pub struct JupiterClient {
    client: Client,
}

impl JupiterClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn fetch_price(&self, mint: &str) -> anyhow::Result<f64> {
        let url = format!("{}?ids={}", JUPITER_API_URL, mint);
        let response: JupiterPriceResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let price = response
            .data
            .get(mint)
            .and_then(|p| p.as_ref())
            .ok_or_else(|| anyhow::anyhow!("Jupiter returned no price for {}", mint))?
            .price
            .parse::<f64>()?;

        debug!("Jupiter price for {}: {}", mint, price);
        Ok(price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_response_parsing() {
        let json = r#"{"data": {"MINT1": {"id": "MINT1", "type": "derivedPrice", "price": "0.0123"}}}"#;
        let response: JupiterPriceResponse = serde_json::from_str(json).unwrap();
        let price = response.data["MINT1"].as_ref().unwrap().price.parse::<f64>().unwrap();
        assert!((price - 0.0123).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_mint_is_null() {
        let json = r#"{"data": {"MINT1": null}}"#;
        let response: JupiterPriceResponse = serde_json::from_str(json).unwrap();
        assert!(response.data["MINT1"].is_none());
    }
}
