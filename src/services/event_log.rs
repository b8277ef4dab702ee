//! Append-only event log client. Fire-and-forget: a lost record is never
//! allowed to fail or delay the operation that produced it.

use chrono::Utc;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub struct EventLog {
    client: Client,
    endpoint: Option<String>,
}

impl EventLog {
    pub fn new(endpoint: Option<String>) -> Arc<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_else(|_| Client::new());

        Arc::new(Self { client, endpoint })
    }

    /// Append one record. Ships to the configured endpoint in the background;
    /// without one the record only hits the tracing log.
    pub fn append(&self, kind: &str, payload: Value) {
        let record = json!({
            "kind": kind,
            "at": Utc::now().timestamp_millis(),
            "payload": payload,
        });

        debug!("event {}: {}", kind, record["payload"]);

        if let Some(endpoint) = self.endpoint.clone() {
            let client = self.client.clone();
            let kind = kind.to_string();
            tokio::spawn(async move {
                let result = client.post(&endpoint).json(&record).send().await;
                if let Err(e) = result {
                    warn!("Event log append failed for {}: {}", kind, e);
                }
            });
        }
    }
}
