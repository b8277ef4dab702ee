//! Leaderboard and competition manager.
//!
//! Accumulates win/loss/earnings per wallet from resolved betting matches and
//! resets at each competition-epoch boundary. Ties never touch it.

use crate::config::CompetitionConfig;
use crate::types::{CompetitionEpoch, LeaderboardStats, RankedEntry};
use chrono::Utc;
use dashmap::DashMap;
use std::sync::{Arc, RwLock};
use tracing::info;

pub struct LeaderboardService {
    entries: DashMap<String, LeaderboardStats>,
    epoch: RwLock<CompetitionEpoch>,
    epoch_secs: u64,
}

impl LeaderboardService {
    pub fn new(config: &CompetitionConfig) -> Arc<Self> {
        let now = Utc::now().timestamp_millis();
        Arc::new(Self {
            entries: DashMap::new(),
            epoch: RwLock::new(CompetitionEpoch::starting_at(now, config.epoch_secs)),
            epoch_secs: config.epoch_secs,
        })
    }

    /// Record a resolved, non-tie betting match. The winner takes the whole
    /// pot: twice the wager in token units, `pot_base` in base currency.
    pub fn record_result(&self, winner: &str, loser: &str, bet_amount: f64, pot_base: f64) {
        {
            let mut entry = self.entries.entry(winner.to_string()).or_default();
            entry.wins += 1;
            entry.total_won += 2.0 * bet_amount;
            entry.total_base_won += pot_base;
        }
        {
            let mut entry = self.entries.entry(loser.to_string()).or_default();
            entry.losses += 1;
        }
    }

    /// Current standings, ranked by base-currency winnings descending.
    pub fn ranked(&self) -> Vec<RankedEntry> {
        let mut rows: Vec<(String, LeaderboardStats)> = self
            .entries
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();

        rows.sort_by(|a, b| b.1.total_base_won.total_cmp(&a.1.total_base_won));

        rows.into_iter()
            .enumerate()
            .map(|(i, (wallet, stats))| RankedEntry {
                wallet,
                wins: stats.wins,
                losses: stats.losses,
                total_won: stats.total_won,
                total_base_won: stats.total_base_won,
                rank: (i + 1) as u32,
            })
            .collect()
    }

    /// Stats for one wallet, if it has played this epoch.
    pub fn stats(&self, wallet: &str) -> Option<LeaderboardStats> {
        self.entries.get(wallet).map(|e| e.clone())
    }

    pub fn epoch(&self) -> CompetitionEpoch {
        match self.epoch.read() {
            Ok(epoch) => *epoch,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Advance the epoch if its end has passed, wiping the standings.
    /// Returns true when a rollover happened.
    pub fn roll_epoch_if_elapsed(&self) -> bool {
        let now = Utc::now().timestamp_millis();
        if !self.epoch().is_elapsed(now) {
            return false;
        }

        if let Ok(mut epoch) = self.epoch.write() {
            // Re-check under the lock; another caller may have rolled already.
            if !epoch.is_elapsed(now) {
                return false;
            }
            *epoch = CompetitionEpoch::starting_at(now, self.epoch_secs);
            info!(
                "Competition epoch rolled over, next ends at {}",
                epoch.ends_at
            );
        }
        self.entries.clear();
        true
    }

    /// Number of wallets with standings this epoch.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
