//! Betting room manager: create/join/cancel/expire wager rooms and resolve
//! their outcomes.
//!
//! Fee collection consults the price oracle, which suspends; every mutation
//! that follows an await re-fetches the room and re-checks its status before
//! writing, so concurrent requests cannot interleave across that boundary
//! into a half-resolved room.

use crate::config::{GameConfig, OracleConfig};
use crate::services::{
    outcome, EventLog, FeeLedger, LeaderboardService, PriceOracle, RewardService, Scheduler,
};
use crate::types::{
    BettingResult, BettingRoom, Choice, RoomRemovedData, RoomStatus, RoomSummary, ServerMessage,
};
use crate::websocket::Hub;
use chrono::Utc;
use dashmap::DashMap;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum RoomError {
    #[error("Room not found: {0}")]
    NotFound(String),

    #[error("Bet amount {amount} is below the minimum {min}")]
    BetTooSmall { amount: f64, min: f64 },

    #[error("Creator cannot join their own room")]
    SelfJoin,

    #[error("Room is already full: {0}")]
    RoomFull(String),

    #[error("Room has no challenger yet: {0}")]
    NotFull(String),

    #[error("Wallet {0} is not a participant in this room")]
    NotParticipant(String),

    #[error("Game already in progress")]
    GameInProgress,

    #[error("Invalid choice: {0}")]
    InvalidChoice(String),
}

/// Result of one choice submission against a room.
#[derive(Debug, Clone)]
pub struct RoomSubmission {
    pub both_submitted: bool,
    pub result: Option<BettingResult>,
}

pub struct RoomService {
    rooms: DashMap<String, BettingRoom>,
    oracle: Arc<PriceOracle>,
    fees: Arc<FeeLedger>,
    leaderboard: Arc<LeaderboardService>,
    rewards: Arc<RewardService>,
    scheduler: Arc<Scheduler>,
    event_log: Arc<EventLog>,
    hub: Option<Arc<Hub>>,
    game: GameConfig,
    default_rate: f64,
}

impl RoomService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        game: &GameConfig,
        oracle_config: &OracleConfig,
        oracle: Arc<PriceOracle>,
        fees: Arc<FeeLedger>,
        leaderboard: Arc<LeaderboardService>,
        rewards: Arc<RewardService>,
        scheduler: Arc<Scheduler>,
        event_log: Arc<EventLog>,
        hub: Option<Arc<Hub>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            rooms: DashMap::new(),
            oracle,
            fees,
            leaderboard,
            rewards,
            scheduler,
            event_log,
            hub,
            game: game.clone(),
            default_rate: oracle_config.default_conversion_rate,
        })
    }

    fn emit(&self, channels: &[&str], msg: &ServerMessage) {
        if let Some(hub) = &self.hub {
            hub.broadcast_event(channels, msg);
        }
    }

    fn timer_key(room_id: &str) -> String {
        format!("room:{}", room_id)
    }

    fn open_room_by(&self, creator: &str) -> Option<RoomSummary> {
        self.rooms.iter().find_map(|r| {
            if r.creator == creator && r.status == RoomStatus::Open {
                Some(RoomSummary::from(r.value()))
            } else {
                None
            }
        })
    }

    /// Create a wager room. A creator with an unfilled open room gets that
    /// room back instead of a duplicate, and is not charged again.
    pub async fn create_room(
        self: &Arc<Self>,
        wallet: &str,
        bet_amount: f64,
    ) -> Result<RoomSummary, RoomError> {
        if bet_amount < self.game.min_bet {
            return Err(RoomError::BetTooSmall {
                amount: bet_amount,
                min: self.game.min_bet,
            });
        }

        if let Some(existing) = self.open_room_by(wallet) {
            debug!("{} already owns open room {}", wallet, existing.room_id);
            return Ok(existing);
        }

        let rate = self.oracle.conversion_rate(self.default_rate).await;

        // The oracle call suspended; another request from this wallet may have
        // created a room in the meantime.
        if let Some(existing) = self.open_room_by(wallet) {
            debug!("{} raced itself creating a room, reusing {}", wallet, existing.room_id);
            return Ok(existing);
        }

        let now = Utc::now().timestamp_millis();
        let suffix: String = uuid::Uuid::new_v4().simple().to_string().chars().take(12).collect();
        let room_id = format!("room-{}", suffix);
        let room = BettingRoom::new(room_id.clone(), wallet.to_string(), bet_amount, now);
        let summary = RoomSummary::from(&room);
        self.rooms.insert(room_id.clone(), room);

        let fee = bet_amount * rate * self.game.fee_rate;
        self.fees.record(wallet, &room_id, bet_amount, fee);
        self.rewards.credit_pool(fee);

        let service = Arc::clone(self);
        let expiring_id = room_id.clone();
        self.scheduler.schedule(
            Self::timer_key(&room_id),
            Duration::from_secs(self.game.room_ttl_secs),
            async move {
                service.expire_room(&expiring_id);
            },
        );

        info!("Room {} created by {} for {}", room_id, wallet, bet_amount);
        self.emit(&[], &ServerMessage::RoomCreated { data: summary.clone() });
        self.event_log.append(
            "room_created",
            json!({
                "roomId": room_id,
                "creator": wallet,
                "betAmount": bet_amount,
                "fee": fee,
            }),
        );

        Ok(summary)
    }

    /// Timer callback: drop an unfilled room past its TTL. The room is
    /// re-checked because the timer may outlive it.
    fn expire_room(&self, room_id: &str) {
        let removed = self
            .rooms
            .remove_if(room_id, |_, room| room.status == RoomStatus::Open);

        if removed.is_some() {
            info!("Room {} expired unfilled", room_id);
            let data = RoomRemovedData {
                room_id: room_id.to_string(),
                reason: "expired".to_string(),
            };
            self.emit(&[], &ServerMessage::RoomRemoved { data });
            self.event_log.append("room_expired", json!({ "roomId": room_id }));
        }
    }

    /// Join an open room as the challenger.
    pub async fn join_room(
        self: &Arc<Self>,
        wallet: &str,
        room_id: &str,
    ) -> Result<RoomSummary, RoomError> {
        {
            let room = self
                .rooms
                .get(room_id)
                .ok_or_else(|| RoomError::NotFound(room_id.to_string()))?;
            if room.creator == wallet {
                return Err(RoomError::SelfJoin);
            }
            if room.status != RoomStatus::Open {
                return Err(RoomError::RoomFull(room_id.to_string()));
            }
        }

        let rate = self.oracle.conversion_rate(self.default_rate).await;

        // Re-validate after the suspension: the room may have filled,
        // expired, or been cancelled while the oracle call was in flight.
        let (summary, bet_amount) = {
            let mut room = self
                .rooms
                .get_mut(room_id)
                .ok_or_else(|| RoomError::NotFound(room_id.to_string()))?;
            if room.creator == wallet {
                return Err(RoomError::SelfJoin);
            }
            if room.status != RoomStatus::Open {
                return Err(RoomError::RoomFull(room_id.to_string()));
            }
            room.challenger = Some(wallet.to_string());
            room.status = RoomStatus::Full;
            (RoomSummary::from(room.value()), room.bet_amount)
        };

        // The room can no longer expire.
        self.scheduler.cancel(&Self::timer_key(room_id));

        let fee = bet_amount * rate * self.game.fee_rate;
        self.fees.record(wallet, room_id, bet_amount, fee);
        self.rewards.credit_pool(fee);

        info!("Room {} joined by {}", room_id, wallet);
        self.emit(
            &[&summary.creator, room_id],
            &ServerMessage::RoomJoined {
                data: crate::types::RoomJoinedData {
                    room_id: room_id.to_string(),
                    creator: summary.creator.clone(),
                    player2: wallet.to_string(),
                    bet_amount,
                },
            },
        );
        self.event_log.append(
            "room_joined",
            json!({
                "roomId": room_id,
                "player2": wallet,
                "fee": fee,
            }),
        );

        Ok(summary)
    }

    /// Cancel a room before play starts. Only participants may cancel, and
    /// only while no choice has been submitted.
    pub fn cancel_room(&self, wallet: &str, room_id: &str) -> Result<(), RoomError> {
        {
            let room = self
                .rooms
                .get(room_id)
                .ok_or_else(|| RoomError::NotFound(room_id.to_string()))?;
            if !room.is_participant(wallet) {
                return Err(RoomError::NotParticipant(wallet.to_string()));
            }
            if room.choices.any_submitted() || room.status == RoomStatus::Resolved {
                return Err(RoomError::GameInProgress);
            }
        }

        // Removal re-checks the guard so a choice landing in between keeps
        // the room alive.
        let removed = self.rooms.remove_if(room_id, |_, room| {
            room.is_participant(wallet)
                && !room.choices.any_submitted()
                && room.status != RoomStatus::Resolved
        });

        if removed.is_none() {
            return Err(RoomError::GameInProgress);
        }

        self.scheduler.cancel(&Self::timer_key(room_id));
        info!("Room {} cancelled by {}", room_id, wallet);
        let data = RoomRemovedData {
            room_id: room_id.to_string(),
            reason: "cancelled".to_string(),
        };
        self.emit(&[], &ServerMessage::RoomCancelled { data });
        self.event_log.append(
            "room_cancelled",
            json!({ "roomId": room_id, "by": wallet }),
        );
        Ok(())
    }

    /// Submit a choice for a full room. Completing the pair resolves the room
    /// exactly once, feeds the leaderboard on a non-tie, and defers deletion
    /// so observers can render the outcome.
    pub async fn submit_choice(
        self: &Arc<Self>,
        wallet: &str,
        room_id: &str,
        choice: &str,
    ) -> Result<RoomSubmission, RoomError> {
        let choice: Choice = choice.parse().map_err(RoomError::InvalidChoice)?;

        enum Step {
            Resolve(BettingRoom),
            Pending { both: bool },
        }

        let step = {
            let mut room = self
                .rooms
                .get_mut(room_id)
                .ok_or_else(|| RoomError::NotFound(room_id.to_string()))?;

            match room.status {
                // A resolved room is already over; it only lingers for display.
                RoomStatus::Resolved => {
                    return Err(RoomError::NotFound(room_id.to_string()))
                }
                RoomStatus::Open => return Err(RoomError::NotFull(room_id.to_string())),
                RoomStatus::Full => {}
            }

            if !room.is_participant(wallet) {
                return Err(RoomError::NotParticipant(wallet.to_string()));
            }

            if room.creator == wallet {
                room.choices.creator = Some(choice);
            } else {
                room.choices.challenger = Some(choice);
            }

            if room.choices.is_complete() && !room.resolving {
                room.resolving = true;
                Step::Resolve(room.clone())
            } else {
                Step::Pending {
                    both: room.choices.is_complete(),
                }
            }
        };

        match step {
            Step::Pending { both } => Ok(RoomSubmission {
                both_submitted: both,
                result: None,
            }),
            Step::Resolve(room) => {
                let result = self.resolve_room(room).await;
                Ok(RoomSubmission {
                    both_submitted: true,
                    result: Some(result),
                })
            }
        }
    }

    /// Resolution proper. The room is flagged `resolving`, so nothing else
    /// mutates it while the pot valuation suspends.
    async fn resolve_room(self: &Arc<Self>, room: BettingRoom) -> BettingResult {
        let creator_choice = room.choices.creator.unwrap_or(Choice::Rock);
        let challenger_choice = room.choices.challenger.unwrap_or(Choice::Rock);
        let challenger = room.challenger.clone().unwrap_or_default();

        let outcome = outcome::resolve(creator_choice, challenger_choice);
        let winner = outcome::winner(outcome, &room.creator, &challenger).map(str::to_string);

        let rate = self.oracle.conversion_rate(self.default_rate).await;
        let pot = 2.0 * room.bet_amount;
        let pot_base = pot * rate;

        if let Some(ref winner_wallet) = winner {
            let loser = if winner_wallet == &room.creator {
                &challenger
            } else {
                &room.creator
            };
            self.leaderboard
                .record_result(winner_wallet, loser, room.bet_amount, pot_base);
        }

        // Mark resolved (the room may only vanish through our own cleanup
        // timer, but re-check existence after the await anyway).
        if let Some(mut entry) = self.rooms.get_mut(&room.room_id) {
            entry.status = RoomStatus::Resolved;
        }

        let result = BettingResult {
            room_id: room.room_id.clone(),
            creator: room.creator.clone(),
            challenger: challenger.clone(),
            creator_choice,
            challenger_choice,
            outcome,
            winner,
            bet_amount: room.bet_amount,
            pot,
            pot_base,
        };

        info!("Room {} resolved: {:?}", room.room_id, outcome);
        self.emit(
            &[&result.creator, &result.challenger, &result.room_id],
            &ServerMessage::BettingMatchResult { data: result.clone() },
        );
        self.event_log.append(
            "betting_match_result",
            json!({
                "roomId": result.room_id,
                "outcome": result.outcome,
                "winner": result.winner,
                "pot": result.pot,
                "potBase": result.pot_base,
            }),
        );

        // Leave the resolved room visible briefly, then drop it.
        let service = Arc::clone(self);
        let cleanup_id = room.room_id.clone();
        self.scheduler.schedule(
            Self::timer_key(&room.room_id),
            Duration::from_secs(self.game.resolve_grace_secs),
            async move {
                if service.rooms.remove(&cleanup_id).is_some() {
                    let data = RoomRemovedData {
                        room_id: cleanup_id.clone(),
                        reason: "resolved".to_string(),
                    };
                    service.emit(&[], &ServerMessage::RoomRemoved { data });
                    service
                        .event_log
                        .append("room_removed", json!({ "roomId": cleanup_id }));
                }
            },
        );

        result
    }

    /// Joinable and in-play rooms, oldest first. Expired rooms are swept
    /// here as well, in case their timer never fired.
    pub fn list_rooms(&self) -> Vec<RoomSummary> {
        let now = Utc::now().timestamp_millis();

        let expired: Vec<String> = self
            .rooms
            .iter()
            .filter(|r| r.is_expired(now, self.game.room_ttl_secs))
            .map(|r| r.room_id.clone())
            .collect();
        for room_id in expired {
            self.scheduler.cancel(&Self::timer_key(&room_id));
            self.expire_room(&room_id);
        }

        let mut summaries: Vec<RoomSummary> = self
            .rooms
            .iter()
            .filter(|r| r.status != RoomStatus::Resolved)
            .map(|r| RoomSummary::from(r.value()))
            .collect();
        summaries.sort_by_key(|s| s.created_at);
        summaries
    }

    /// Number of live rooms, resolved ones included.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CompetitionConfig, RewardConfig};
    use crate::services::TransferClient;

    struct Fixture {
        rooms: Arc<RoomService>,
        leaderboard: Arc<LeaderboardService>,
        fees: Arc<FeeLedger>,
        rewards: Arc<RewardService>,
    }

    fn fixture(game: GameConfig) -> Fixture {
        let oracle_config = OracleConfig::default();
        let oracle = PriceOracle::fixed(0.5);
        let fees = FeeLedger::new();
        let leaderboard = LeaderboardService::new(&CompetitionConfig::default());
        let rewards = RewardService::new(
            &RewardConfig::default(),
            leaderboard.clone(),
            TransferClient::dry_run(),
        );
        let rooms = RoomService::new(
            &game,
            &oracle_config,
            oracle,
            fees.clone(),
            leaderboard.clone(),
            rewards.clone(),
            Scheduler::new(),
            EventLog::new(None),
            None,
        );
        Fixture {
            rooms,
            leaderboard,
            fees,
            rewards,
        }
    }

    fn default_fixture() -> Fixture {
        fixture(GameConfig::default())
    }

    #[tokio::test]
    async fn test_create_room_charges_creator_fee() {
        let f = default_fixture();
        let summary = f.rooms.create_room("alice", 10.0).await.unwrap();

        // fee = bet x price x rate = 10 x 0.5 x 0.05
        let fees = f.fees.wallet_fees("alice").unwrap();
        assert_eq!(fees.transactions.len(), 1);
        assert!((fees.total_fees - 0.25).abs() < 1e-9);
        assert_eq!(fees.transactions[0].room_id, summary.room_id);
        assert!((f.rewards.pool() - 0.25).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_create_room_below_minimum_rejected() {
        let f = default_fixture();
        let err = f.rooms.create_room("alice", 0.001).await;
        assert!(matches!(err, Err(RoomError::BetTooSmall { .. })));
        assert_eq!(f.rooms.room_count(), 0);
        assert!(f.fees.wallet_fees("alice").is_none());
    }

    #[tokio::test]
    async fn test_duplicate_open_room_returns_existing() {
        let f = default_fixture();
        let first = f.rooms.create_room("alice", 10.0).await.unwrap();
        let second = f.rooms.create_room("alice", 20.0).await.unwrap();

        assert_eq!(first.room_id, second.room_id);
        assert_eq!(f.rooms.room_count(), 1);
        // No second fee charged.
        assert_eq!(f.fees.wallet_fees("alice").unwrap().transactions.len(), 1);
    }

    #[tokio::test]
    async fn test_join_room_charges_challenger_once() {
        let f = default_fixture();
        let room = f.rooms.create_room("alice", 10.0).await.unwrap();
        let joined = f.rooms.join_room("bob", &room.room_id).await.unwrap();

        assert_eq!(joined.player2.as_deref(), Some("bob"));
        let fees = f.fees.wallet_fees("bob").unwrap();
        assert_eq!(fees.transactions.len(), 1);
        assert!((fees.total_fees - 0.25).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_join_validation() {
        let f = default_fixture();
        let room = f.rooms.create_room("alice", 10.0).await.unwrap();

        assert!(matches!(
            f.rooms.join_room("bob", "missing").await,
            Err(RoomError::NotFound(_))
        ));
        assert!(matches!(
            f.rooms.join_room("alice", &room.room_id).await,
            Err(RoomError::SelfJoin)
        ));

        f.rooms.join_room("bob", &room.room_id).await.unwrap();
        assert!(matches!(
            f.rooms.join_room("carol", &room.room_id).await,
            Err(RoomError::RoomFull(_))
        ));
    }

    #[tokio::test]
    async fn test_cancel_before_play() {
        let f = default_fixture();
        let room = f.rooms.create_room("alice", 10.0).await.unwrap();

        assert!(matches!(
            f.rooms.cancel_room("mallory", &room.room_id),
            Err(RoomError::NotParticipant(_))
        ));

        f.rooms.cancel_room("alice", &room.room_id).unwrap();
        assert_eq!(f.rooms.room_count(), 0);
    }

    #[tokio::test]
    async fn test_cancel_blocked_once_choices_exist() {
        let f = default_fixture();
        let room = f.rooms.create_room("alice", 10.0).await.unwrap();
        f.rooms.join_room("bob", &room.room_id).await.unwrap();
        f.rooms.submit_choice("alice", &room.room_id, "rock").await.unwrap();

        assert!(matches!(
            f.rooms.cancel_room("bob", &room.room_id),
            Err(RoomError::GameInProgress)
        ));
    }

    #[tokio::test]
    async fn test_choice_requires_full_room() {
        let f = default_fixture();
        let room = f.rooms.create_room("alice", 10.0).await.unwrap();

        assert!(matches!(
            f.rooms.submit_choice("alice", &room.room_id, "rock").await,
            Err(RoomError::NotFull(_))
        ));
    }

    #[tokio::test]
    async fn test_resolution_updates_leaderboard() {
        let f = default_fixture();
        let room = f.rooms.create_room("alice", 10.0).await.unwrap();
        f.rooms.join_room("bob", &room.room_id).await.unwrap();

        let first = f.rooms.submit_choice("alice", &room.room_id, "rock").await.unwrap();
        assert!(!first.both_submitted);

        let second = f
            .rooms
            .submit_choice("bob", &room.room_id, "scissors")
            .await
            .unwrap();
        let result = second.result.unwrap();
        assert_eq!(result.winner.as_deref(), Some("alice"));
        assert_eq!(result.pot, 20.0);
        assert!((result.pot_base - 10.0).abs() < 1e-9);

        let stats = f.leaderboard.stats("alice").unwrap();
        assert_eq!(stats.wins, 1);
        assert_eq!(stats.total_won, 20.0);
        assert!((stats.total_base_won - 10.0).abs() < 1e-9);
        assert_eq!(f.leaderboard.stats("bob").unwrap().losses, 1);
    }

    #[tokio::test]
    async fn test_tie_leaves_leaderboard_untouched() {
        let f = default_fixture();
        let room = f.rooms.create_room("alice", 10.0).await.unwrap();
        f.rooms.join_room("bob", &room.room_id).await.unwrap();

        f.rooms.submit_choice("alice", &room.room_id, "rock").await.unwrap();
        let second = f.rooms.submit_choice("bob", &room.room_id, "rock").await.unwrap();

        let result = second.result.unwrap();
        assert!(result.winner.is_none());
        assert!(f.leaderboard.stats("alice").is_none());
        assert!(f.leaderboard.stats("bob").is_none());
    }

    #[tokio::test]
    async fn test_resolved_room_rejects_further_choices() {
        let f = default_fixture();
        let room = f.rooms.create_room("alice", 10.0).await.unwrap();
        f.rooms.join_room("bob", &room.room_id).await.unwrap();
        f.rooms.submit_choice("alice", &room.room_id, "rock").await.unwrap();
        f.rooms.submit_choice("bob", &room.room_id, "paper").await.unwrap();

        assert!(matches!(
            f.rooms.submit_choice("alice", &room.room_id, "rock").await,
            Err(RoomError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_resolved_room_cleaned_up_after_grace() {
        let game = GameConfig {
            resolve_grace_secs: 0,
            ..GameConfig::default()
        };
        let f = fixture(game);
        let room = f.rooms.create_room("alice", 10.0).await.unwrap();
        f.rooms.join_room("bob", &room.room_id).await.unwrap();
        f.rooms.submit_choice("alice", &room.room_id, "rock").await.unwrap();
        f.rooms.submit_choice("bob", &room.room_id, "paper").await.unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(f.rooms.room_count(), 0);
    }

    #[tokio::test]
    async fn test_expired_room_leaves_listing() {
        let game = GameConfig {
            room_ttl_secs: 0,
            ..GameConfig::default()
        };
        let f = fixture(game);
        f.rooms.create_room("alice", 10.0).await.unwrap();

        // TTL of zero: the lazy sweep on listing must drop it even before
        // the expiry timer runs.
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(f.rooms.list_rooms().is_empty());
    }

    #[tokio::test]
    async fn test_listing_excludes_resolved_rooms() {
        let f = default_fixture();
        let room = f.rooms.create_room("alice", 10.0).await.unwrap();
        f.rooms.join_room("bob", &room.room_id).await.unwrap();
        assert_eq!(f.rooms.list_rooms().len(), 1);

        f.rooms.submit_choice("alice", &room.room_id, "rock").await.unwrap();
        f.rooms.submit_choice("bob", &room.room_id, "paper").await.unwrap();
        assert!(f.rooms.list_rooms().is_empty());
    }
}
