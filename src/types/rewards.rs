use serde::{Deserialize, Serialize};

/// Per-wallet competition record. Reset at each epoch boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardStats {
    pub wins: u64,
    pub losses: u64,
    /// Token units won across resolved betting matches.
    pub total_won: f64,
    /// Base-currency value of pots won.
    pub total_base_won: f64,
}

/// Leaderboard entry with its rank, as served to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedEntry {
    pub wallet: String,
    pub wins: u64,
    pub losses: u64,
    pub total_won: f64,
    pub total_base_won: f64,
    pub rank: u32,
}

/// A fixed-duration competition period.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitionEpoch {
    /// Unix millis.
    pub started_at: i64,
    /// Unix millis.
    pub ends_at: i64,
}

impl CompetitionEpoch {
    pub fn starting_at(started_at: i64, duration_secs: u64) -> Self {
        Self {
            started_at,
            ends_at: started_at + (duration_secs as i64) * 1000,
        }
    }

    pub fn is_elapsed(&self, now_ms: i64) -> bool {
        now_ms >= self.ends_at
    }

    pub fn remaining_ms(&self, now_ms: i64) -> i64 {
        (self.ends_at - now_ms).max(0)
    }
}

/// One platform-fee charge against a wallet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeTransaction {
    pub room_id: String,
    pub bet_amount: f64,
    /// Fee in base currency.
    pub fee: f64,
    /// Unix millis.
    pub at: i64,
}

/// Everything charged to a single wallet. Monotonic, never reset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletFees {
    pub total_fees: f64,
    pub transactions: Vec<FeeTransaction>,
}

/// Outcome of a single reward transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Distribution {
    /// Leaderboard rank, or 0 for the distribution wallet's remainder share.
    pub rank: u32,
    pub wallet: String,
    pub amount: f64,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

/// Full result of a distribution run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionReport {
    pub total_pool: f64,
    /// Sum of amounts actually transferred.
    pub total_distributed: f64,
    pub distributions: Vec<Distribution>,
}

/// One line of the published payout plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanShare {
    pub recipient: String,
    pub percentage: f64,
}
