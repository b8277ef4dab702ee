//! Reward distribution engine.
//!
//! Owns the epoch reward pool (fed by platform fees) and drains it into
//! tiered payouts through the external transfer service. Transfers are
//! single-attempt; a failed one is recorded and the batch keeps going.

use crate::config::RewardConfig;
use crate::services::{LeaderboardService, TransferClient};
use crate::types::{Distribution, DistributionReport, PlanShare};
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum RewardError {
    #[error("Invalid pool amount: {0}")]
    InvalidAmount(f64),
}

pub struct RewardService {
    transfer: TransferClient,
    leaderboard: Arc<LeaderboardService>,
    /// Base-currency pool accumulated from fees this epoch.
    pool: RwLock<f64>,
    tier_percentages: Vec<f64>,
    distribution_wallet: String,
}

impl RewardService {
    pub fn new(
        config: &RewardConfig,
        leaderboard: Arc<LeaderboardService>,
        transfer: TransferClient,
    ) -> Arc<Self> {
        Arc::new(Self {
            transfer,
            leaderboard,
            pool: RwLock::new(0.0),
            tier_percentages: config.tier_percentages.clone(),
            distribution_wallet: config.distribution_wallet.clone(),
        })
    }

    /// Add collected fees to the epoch pool.
    pub fn credit_pool(&self, amount: f64) {
        if let Ok(mut pool) = self.pool.write() {
            *pool += amount;
        }
    }

    pub fn pool(&self) -> f64 {
        self.pool.read().map(|p| *p).unwrap_or(0.0)
    }

    fn debit_pool(&self, amount: f64) {
        if let Ok(mut pool) = self.pool.write() {
            *pool = (*pool - amount).max(0.0);
        }
    }

    /// Drop the pool at an epoch boundary. Returns the discarded value so the
    /// caller can log undistributed funds.
    pub fn reset_pool(&self) -> f64 {
        match self.pool.write() {
            Ok(mut pool) => std::mem::replace(&mut *pool, 0.0),
            Err(_) => 0.0,
        }
    }

    /// The published payout plan: one share per rank plus the remainder.
    pub fn plan(&self) -> Vec<PlanShare> {
        let mut plan: Vec<PlanShare> = self
            .tier_percentages
            .iter()
            .enumerate()
            .map(|(i, pct)| PlanShare {
                recipient: format!("rank{}", i + 1),
                percentage: *pct,
            })
            .collect();

        let remainder = 100.0 - self.tier_percentages.iter().sum::<f64>();
        plan.push(PlanShare {
            recipient: "distributionWallet".to_string(),
            percentage: remainder,
        });
        plan
    }

    /// Pay out `pool_amount` across the current standings.
    ///
    /// Ranks beyond the leaderboard's size leave their tier unpaid; the
    /// remainder share always goes to the distribution wallet. Each transfer
    /// is attempted exactly once and failures do not abort the batch.
    pub async fn distribute(&self, pool_amount: f64) -> Result<DistributionReport, RewardError> {
        if pool_amount <= 0.0 {
            return Err(RewardError::InvalidAmount(pool_amount));
        }

        let ranked = self.leaderboard.ranked();
        let mut distributions = Vec::new();
        let mut total_distributed = 0.0;

        for (i, entry) in ranked.iter().take(self.tier_percentages.len()).enumerate() {
            let amount = pool_amount * self.tier_percentages[i] / 100.0;
            let signature = self.transfer.transfer(&entry.wallet, amount).await;
            let success = signature.is_some();
            if success {
                total_distributed += amount;
            } else {
                warn!("Reward transfer to rank {} ({}) failed", i + 1, entry.wallet);
            }
            distributions.push(Distribution {
                rank: (i + 1) as u32,
                wallet: entry.wallet.clone(),
                amount,
                success,
                signature,
            });
        }

        let remainder = 100.0 - self.tier_percentages.iter().sum::<f64>();
        if remainder > 0.0 {
            let amount = pool_amount * remainder / 100.0;
            let signature = self.transfer.transfer(&self.distribution_wallet, amount).await;
            let success = signature.is_some();
            if success {
                total_distributed += amount;
            } else {
                warn!("Remainder transfer to distribution wallet failed");
            }
            distributions.push(Distribution {
                rank: 0,
                wallet: self.distribution_wallet.clone(),
                amount,
                success,
                signature,
            });
        }

        self.debit_pool(total_distributed);
        info!(
            "Distributed {} of {} across {} recipients",
            total_distributed,
            pool_amount,
            distributions.len()
        );

        Ok(DistributionReport {
            total_pool: pool_amount,
            total_distributed,
            distributions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompetitionConfig;

    fn setup(transfer: TransferClient) -> (Arc<LeaderboardService>, Arc<RewardService>) {
        let leaderboard = LeaderboardService::new(&CompetitionConfig {
            epoch_secs: 3600,
            epoch_check_secs: 3600,
        });
        let config = RewardConfig {
            distribution_wallet: "treasury".to_string(),
            ..RewardConfig::default()
        };
        let rewards = RewardService::new(&config, leaderboard.clone(), transfer);
        (leaderboard, rewards)
    }

    #[tokio::test]
    async fn test_invalid_amount_rejected() {
        let (_, rewards) = setup(TransferClient::dry_run());
        assert!(rewards.distribute(0.0).await.is_err());
        assert!(rewards.distribute(-5.0).await.is_err());
    }

    #[tokio::test]
    async fn test_three_entry_distribution() {
        let (leaderboard, rewards) = setup(TransferClient::dry_run());
        leaderboard.record_result("alice", "dave", 10.0, 3.0);
        leaderboard.record_result("bob", "dave", 10.0, 2.0);
        leaderboard.record_result("carol", "dave", 10.0, 1.0);
        // dave has losses only, so four entries ranked, three with winnings.

        let report = rewards.distribute(100.0).await.unwrap();

        // Ranks 1-4 paid 20/10/5/3, rank 5 unpaid (absent), 60 to treasury.
        let rank1 = &report.distributions[0];
        assert_eq!(rank1.wallet, "alice");
        assert_eq!(rank1.amount, 20.0);
        assert_eq!(report.distributions[1].amount, 10.0);
        assert_eq!(report.distributions[2].amount, 5.0);

        let treasury = report.distributions.last().unwrap();
        assert_eq!(treasury.rank, 0);
        assert_eq!(treasury.wallet, "treasury");
        assert_eq!(treasury.amount, 60.0);
    }

    #[tokio::test]
    async fn test_unused_tiers_stay_unpaid() {
        let (leaderboard, rewards) = setup(TransferClient::dry_run());
        leaderboard.record_result("alice", "bob", 10.0, 1.0);
        // Exactly two ranked entries (alice won, bob lost).

        let report = rewards.distribute(100.0).await.unwrap();

        // Two ranks plus the treasury share; ranks 3-5 percentages unpaid.
        assert_eq!(report.distributions.len(), 3);
        assert_eq!(report.total_distributed, 20.0 + 10.0 + 60.0);
    }

    #[tokio::test]
    async fn test_failed_transfers_do_not_abort_batch() {
        let (leaderboard, rewards) = setup(TransferClient::disabled());
        leaderboard.record_result("alice", "bob", 10.0, 1.0);

        let report = rewards.distribute(100.0).await.unwrap();

        // Every transfer failed, every recipient still has a record.
        assert_eq!(report.distributions.len(), 3);
        assert!(report.distributions.iter().all(|d| !d.success));
        assert_eq!(report.total_distributed, 0.0);
    }

    #[tokio::test]
    async fn test_pool_accounting() {
        let (_, rewards) = setup(TransferClient::dry_run());
        rewards.credit_pool(50.0);
        rewards.credit_pool(25.0);
        assert_eq!(rewards.pool(), 75.0);

        let drained = rewards.reset_pool();
        assert_eq!(drained, 75.0);
        assert_eq!(rewards.pool(), 0.0);
    }

    #[tokio::test]
    async fn test_distribution_debits_pool() {
        let (leaderboard, rewards) = setup(TransferClient::dry_run());
        leaderboard.record_result("alice", "bob", 10.0, 1.0);
        rewards.credit_pool(100.0);

        let report = rewards.distribute(100.0).await.unwrap();
        assert!((rewards.pool() - (100.0 - report.total_distributed)).abs() < 1e-9);
    }

    #[test]
    fn test_plan_shape() {
        let (_, rewards) = setup(TransferClient::dry_run());
        let plan = rewards.plan();
        assert_eq!(plan.len(), 6);
        assert_eq!(plan[0].recipient, "rank1");
        assert_eq!(plan[0].percentage, 20.0);
        assert_eq!(plan[5].recipient, "distributionWallet");
        assert_eq!(plan[5].percentage, 60.0);
    }
}
