//! Fee ledger: append-only record of platform fees collected per wallet.

use crate::types::{FeeTransaction, WalletFees};
use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

pub struct FeeLedger {
    entries: DashMap<String, WalletFees>,
}

impl FeeLedger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            entries: DashMap::new(),
        })
    }

    /// Record a fee charge against a wallet. Fees are in base currency.
    pub fn record(&self, wallet: &str, room_id: &str, bet_amount: f64, fee: f64) {
        let mut entry = self.entries.entry(wallet.to_string()).or_default();
        entry.total_fees += fee;
        entry.transactions.push(FeeTransaction {
            room_id: room_id.to_string(),
            bet_amount,
            fee,
            at: Utc::now().timestamp_millis(),
        });
        debug!("Fee {} recorded for {} in room {}", fee, wallet, room_id);
    }

    /// Everything charged to a single wallet.
    pub fn wallet_fees(&self, wallet: &str) -> Option<WalletFees> {
        self.entries.get(wallet).map(|e| e.clone())
    }

    /// Total fees collected across all wallets.
    pub fn total_collected(&self) -> f64 {
        self.entries.iter().map(|e| e.total_fees).sum()
    }

    /// Per-wallet totals, for the aggregate fees endpoint.
    pub fn all_totals(&self) -> Vec<(String, f64)> {
        self.entries
            .iter()
            .map(|e| (e.key().clone(), e.total_fees))
            .collect()
    }
}
