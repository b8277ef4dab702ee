//! Transfer service client: sends base-currency payouts to wallets.
//!
//! Single-attempt by design. A failure yields `None` and is recorded by the
//! caller; there is no retry and no batch abort.

use crate::config::RewardConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Serialize)]
struct TransferRequest<'a> {
    wallet: &'a str,
    amount: f64,
}

#[derive(Debug, Deserialize)]
struct TransferResponse {
    signature: Option<String>,
}

#[derive(Clone)]
pub struct TransferClient {
    client: Client,
    base_url: Option<String>,
    dry_run: bool,
}

impl TransferClient {
    pub fn new(config: &RewardConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: config.transfer_url.clone(),
            dry_run: config.transfer_dry_run,
        }
    }

    /// A client whose transfers all succeed locally. For tests and development.
    pub fn dry_run() -> Self {
        Self {
            client: Client::new(),
            base_url: None,
            dry_run: true,
        }
    }

    /// A client whose transfers all fail. For exercising partial-failure paths.
    pub fn disabled() -> Self {
        Self {
            client: Client::new(),
            base_url: None,
            dry_run: false,
        }
    }

    /// Send `amount` to `wallet`. Returns the transfer signature, or `None`
    /// on any failure.
    pub async fn transfer(&self, wallet: &str, amount: f64) -> Option<String> {
        if self.dry_run {
            let signature = format!("dry-{}", uuid::Uuid::new_v4().simple());
            info!("Dry-run transfer of {} to {} ({})", amount, wallet, signature);
            return Some(signature);
        }

        let base_url = match &self.base_url {
            Some(url) => url,
            None => {
                warn!("Transfer service not configured, cannot pay {} to {}", amount, wallet);
                return None;
            }
        };

        let request = TransferRequest { wallet, amount };
        let result = self
            .client
            .post(base_url)
            .json(&request)
            .send()
            .await
            .and_then(|r| r.error_for_status());

        match result {
            Ok(response) => match response.json::<TransferResponse>().await {
                Ok(TransferResponse {
                    signature: Some(signature),
                }) => {
                    info!("Transferred {} to {} ({})", amount, wallet, signature);
                    Some(signature)
                }
                Ok(TransferResponse { signature: None }) => {
                    warn!("Transfer service returned no signature for {}", wallet);
                    None
                }
                Err(e) => {
                    warn!("Transfer response parse failed for {}: {}", wallet, e);
                    None
                }
            },
            Err(e) => {
                warn!("Transfer of {} to {} failed: {}", amount, wallet, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dry_run_always_succeeds() {
        let client = TransferClient::dry_run();
        let signature = client.transfer("alice", 10.0).await;
        assert!(signature.unwrap().starts_with("dry-"));
    }

    #[tokio::test]
    async fn test_unconfigured_client_fails_softly() {
        let client = TransferClient::disabled();
        assert!(client.transfer("alice", 10.0).await.is_none());
    }

    #[test]
    fn test_request_serialization() {
        let request = TransferRequest {
            wallet: "alice",
            amount: 2.5,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"wallet\":\"alice\""));
        assert!(json.contains("\"amount\":2.5"));
    }
}
