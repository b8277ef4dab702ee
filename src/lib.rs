//! Rumble - real-time PvP wager game backend
//!
//! Matchmaking with bot fallback, wager rooms, outcome resolution, a
//! competition leaderboard, and tiered reward payouts, all served over
//! HTTP + WebSocket from in-process stores.

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod sources;
pub mod types;
pub mod websocket;

use config::Config;
use services::{
    FeeLedger, LeaderboardService, MatchmakingService, PriceOracle, RewardService, RoomService,
};
use std::sync::Arc;
use websocket::Hub;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub hub: Arc<Hub>,
    pub oracle: Arc<PriceOracle>,
    pub fees: Arc<FeeLedger>,
    pub matchmaking: Arc<MatchmakingService>,
    pub rooms: Arc<RoomService>,
    pub leaderboard: Arc<LeaderboardService>,
    pub rewards: Arc<RewardService>,
}
