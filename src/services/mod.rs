pub mod event_log;
pub mod fees;
pub mod leaderboard;
pub mod matchmaking;
pub mod outcome;
pub mod price_oracle;
pub mod rewards;
pub mod rooms;
pub mod scheduler;
pub mod transfer;

pub use event_log::EventLog;
pub use fees::FeeLedger;
pub use leaderboard::LeaderboardService;
pub use matchmaking::{JoinOutcome, MatchError, MatchmakingService, QueueStatus};
pub use price_oracle::{PriceOracle, PriceQuote};
pub use rewards::{RewardError, RewardService};
pub use rooms::{RoomError, RoomService};
pub use scheduler::Scheduler;
pub use transfer::TransferClient;
