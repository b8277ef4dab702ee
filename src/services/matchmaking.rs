//! Matchmaking queue and active-match store.
//!
//! Wallets queue up and are paired first-come-first-served; a wallet left
//! waiting past the wait window gets a synthetic opponent instead. Resolved
//! matches disappear immediately, so a stale match id reads as not-found.

use crate::config::GameConfig;
use crate::services::{outcome, EventLog, Scheduler};
use crate::types::{
    ActiveMatch, Choice, MatchFoundData, MatchResult, QueueEntry, QueueState, ServerMessage,
};
use crate::websocket::Hub;
use chrono::Utc;
use dashmap::DashMap;
use rand::Rng;
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Match not found: {0}")]
    NotFound(String),

    #[error("Wallet {0} is not a participant in this match")]
    NotParticipant(String),

    #[error("Invalid choice: {0}")]
    InvalidChoice(String),
}

/// What a queue join produced.
#[derive(Debug, Clone)]
pub enum JoinOutcome {
    Matched(MatchFoundData),
    Queued { waited_ms: i64 },
}

/// Where a wallet currently stands.
#[derive(Debug, Clone)]
pub enum QueueStatus {
    Matched(MatchFoundData),
    InQueue { waited_ms: i64 },
    NotFound,
}

/// Result of one choice submission.
#[derive(Debug, Clone)]
pub struct MatchSubmission {
    pub both_submitted: bool,
    pub result: Option<MatchResult>,
}

pub struct MatchmakingService {
    /// Waiting wallets in insertion order.
    queue: Mutex<Vec<QueueEntry>>,
    matches: DashMap<String, ActiveMatch>,
    scheduler: Arc<Scheduler>,
    event_log: Arc<EventLog>,
    hub: Option<Arc<Hub>>,
    queue_wait: Duration,
}

impl MatchmakingService {
    pub fn new(
        config: &GameConfig,
        scheduler: Arc<Scheduler>,
        event_log: Arc<EventLog>,
    ) -> Arc<Self> {
        Arc::new(Self {
            queue: Mutex::new(Vec::new()),
            matches: DashMap::new(),
            scheduler,
            event_log,
            hub: None,
            queue_wait: Duration::from_millis(config.queue_wait_ms),
        })
    }

    pub fn with_hub(
        config: &GameConfig,
        scheduler: Arc<Scheduler>,
        event_log: Arc<EventLog>,
        hub: Arc<Hub>,
    ) -> Arc<Self> {
        Arc::new(Self {
            queue: Mutex::new(Vec::new()),
            matches: DashMap::new(),
            scheduler,
            event_log,
            hub: Some(hub),
            queue_wait: Duration::from_millis(config.queue_wait_ms),
        })
    }

    fn emit(&self, channels: &[&str], msg: &ServerMessage) {
        if let Some(hub) = &self.hub {
            hub.broadcast_event(channels, msg);
        }
    }

    /// Join the queue, pairing immediately when another wallet is waiting.
    /// Re-joining while already queued or matched changes nothing.
    pub fn join_queue(self: &Arc<Self>, wallet: &str) -> JoinOutcome {
        let now = Utc::now().timestamp_millis();

        if let Some(found) = self.match_for(wallet) {
            return JoinOutcome::Matched(found);
        }

        let opponent = {
            let mut queue = match self.queue.lock() {
                Ok(q) => q,
                Err(poisoned) => poisoned.into_inner(),
            };

            if let Some(entry) = queue.iter().find(|e| e.wallet == wallet) {
                return JoinOutcome::Queued {
                    waited_ms: now - entry.joined_at,
                };
            }

            queue.push(QueueEntry {
                wallet: wallet.to_string(),
                joined_at: now,
                state: QueueState::Waiting,
            });

            // First waiting wallet that is not ourselves, in insertion order.
            let opponent = queue
                .iter()
                .find(|e| e.wallet != wallet)
                .map(|e| e.wallet.clone());

            if let Some(ref opp) = opponent {
                queue.retain(|e| e.wallet != wallet && e.wallet != *opp);
            }
            opponent
        };

        match opponent {
            Some(opponent) => {
                // The waiting wallet's bot fallback must not fire anymore.
                self.scheduler.cancel(&format!("queue:{}", opponent));
                let found = self.create_match(opponent, wallet.to_string(), false, now);
                JoinOutcome::Matched(found)
            }
            None => {
                let service = Arc::clone(self);
                let queued_wallet = wallet.to_string();
                self.scheduler.schedule(
                    format!("queue:{}", wallet),
                    self.queue_wait,
                    async move {
                        service.bot_fallback(queued_wallet);
                    },
                );
                JoinOutcome::Queued { waited_ms: 0 }
            }
        }
    }

    /// Pair a still-waiting wallet with a synthetic opponent. No-op when the
    /// wallet was matched (or left) in the interim.
    fn bot_fallback(self: &Arc<Self>, wallet: String) {
        let still_waiting = {
            let mut queue = match self.queue.lock() {
                Ok(q) => q,
                Err(poisoned) => poisoned.into_inner(),
            };
            let before = queue.len();
            queue.retain(|e| e.wallet != wallet);
            queue.len() != before
        };

        if !still_waiting {
            debug!("Bot fallback for {} skipped, already matched", wallet);
            return;
        }

        let suffix: String = uuid::Uuid::new_v4().simple().to_string().chars().take(8).collect();
        let bot = format!("bot-{}", suffix);
        let now = Utc::now().timestamp_millis();
        info!("No opponent for {} within wait window, matching bot {}", wallet, bot);
        self.create_match(wallet, bot, true, now);
    }

    fn create_match(&self, player1: String, player2: String, is_bot: bool, now: i64) -> MatchFoundData {
        let m = ActiveMatch::new(player1, player2, is_bot, now);
        let found = MatchFoundData {
            match_id: m.match_id.clone(),
            player1: m.player1.clone(),
            player2: m.player2.clone(),
            is_bot,
        };
        self.matches.insert(m.match_id.clone(), m);

        info!(
            "Match {} created: {} vs {}{}",
            found.match_id,
            found.player1,
            found.player2,
            if is_bot { " (bot)" } else { "" }
        );
        self.emit(
            &[&found.player1, &found.player2],
            &ServerMessage::MatchFound { data: found.clone() },
        );
        self.event_log.append(
            "match_found",
            json!({
                "matchId": found.match_id,
                "player1": found.player1,
                "player2": found.player2,
                "isBot": found.is_bot,
            }),
        );
        found
    }

    fn match_for(&self, wallet: &str) -> Option<MatchFoundData> {
        self.matches.iter().find_map(|m| {
            if m.is_participant(wallet) {
                Some(MatchFoundData {
                    match_id: m.match_id.clone(),
                    player1: m.player1.clone(),
                    player2: m.player2.clone(),
                    is_bot: m.is_bot,
                })
            } else {
                None
            }
        })
    }

    /// Where `wallet` stands: matched, still queued, or unknown.
    pub fn get_status(&self, wallet: &str) -> QueueStatus {
        if let Some(found) = self.match_for(wallet) {
            return QueueStatus::Matched(found);
        }

        let queue = match self.queue.lock() {
            Ok(q) => q,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(entry) = queue.iter().find(|e| e.wallet == wallet) {
            let now = Utc::now().timestamp_millis();
            return QueueStatus::InQueue {
                waited_ms: now - entry.joined_at,
            };
        }
        QueueStatus::NotFound
    }

    /// Submit a choice for an active match. Completing the pair resolves the
    /// match exactly once and removes it.
    pub fn submit_choice(
        &self,
        match_id: &str,
        wallet: &str,
        choice: &str,
    ) -> Result<MatchSubmission, MatchError> {
        let choice: Choice = choice
            .parse()
            .map_err(MatchError::InvalidChoice)?;

        enum Step {
            Resolve(ActiveMatch),
            Pending { both: bool },
        }

        let step = {
            let mut m = self
                .matches
                .get_mut(match_id)
                .ok_or_else(|| MatchError::NotFound(match_id.to_string()))?;

            if !m.is_participant(wallet) {
                return Err(MatchError::NotParticipant(wallet.to_string()));
            }

            if m.player1 == wallet {
                m.choices.player1 = Some(choice);
            } else {
                m.choices.player2 = Some(choice);
            }

            // The bot answers immediately; it never keeps a human waiting.
            if m.is_bot && m.choices.player2.is_none() {
                let idx = rand::thread_rng().gen_range(0..Choice::ALL.len());
                m.choices.player2 = Some(Choice::ALL[idx]);
            }

            if m.choices.is_complete() && !m.resolving {
                m.resolving = true;
                Step::Resolve(m.clone())
            } else {
                Step::Pending {
                    both: m.choices.is_complete(),
                }
            }
        };

        match step {
            Step::Pending { both } => Ok(MatchSubmission {
                both_submitted: both,
                result: None,
            }),
            Step::Resolve(m) => {
                let player1_choice = m.choices.player1.unwrap_or(choice);
                let player2_choice = m.choices.player2.unwrap_or(choice);
                let outcome = outcome::resolve(player1_choice, player2_choice);
                let winner =
                    outcome::winner(outcome, &m.player1, &m.player2).map(str::to_string);

                let result = MatchResult {
                    match_id: m.match_id.clone(),
                    player1: m.player1.clone(),
                    player2: m.player2.clone(),
                    player1_choice,
                    player2_choice,
                    outcome,
                    winner,
                    is_bot: m.is_bot,
                };

                self.matches.remove(&m.match_id);
                info!("Match {} resolved: {:?}", m.match_id, outcome);
                self.emit(
                    &[&m.player1, &m.player2],
                    &ServerMessage::MatchResult { data: result.clone() },
                );
                self.event_log.append(
                    "match_result",
                    json!({
                        "matchId": result.match_id,
                        "outcome": result.outcome,
                        "winner": result.winner,
                    }),
                );

                Ok(MatchSubmission {
                    both_submitted: true,
                    result: Some(result),
                })
            }
        }
    }

    /// Number of wallets currently waiting.
    pub fn queue_len(&self) -> usize {
        match self.queue.lock() {
            Ok(q) => q.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    /// Number of unresolved matches.
    pub fn active_matches(&self) -> usize {
        self.matches.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(queue_wait_ms: u64) -> Arc<MatchmakingService> {
        let config = GameConfig {
            queue_wait_ms,
            ..GameConfig::default()
        };
        MatchmakingService::new(&config, Scheduler::new(), EventLog::new(None))
    }

    #[tokio::test]
    async fn test_two_wallets_pair_immediately() {
        let svc = service(60_000);

        let first = svc.join_queue("alice");
        assert!(matches!(first, JoinOutcome::Queued { .. }));

        let second = svc.join_queue("bob");
        match second {
            JoinOutcome::Matched(found) => {
                assert_eq!(found.player1, "alice");
                assert_eq!(found.player2, "bob");
                assert!(!found.is_bot);
            }
            _ => panic!("expected a match"),
        }

        assert_eq!(svc.queue_len(), 0);
        assert_eq!(svc.active_matches(), 1);
    }

    #[tokio::test]
    async fn test_rejoin_is_idempotent() {
        let svc = service(60_000);

        svc.join_queue("alice");
        let again = svc.join_queue("alice");
        assert!(matches!(again, JoinOutcome::Queued { .. }));
        assert_eq!(svc.queue_len(), 1);
    }

    #[tokio::test]
    async fn test_bot_fallback_after_wait_window() {
        let svc = service(20);

        svc.join_queue("alice");
        tokio::time::sleep(Duration::from_millis(80)).await;

        assert_eq!(svc.queue_len(), 0);
        match svc.get_status("alice") {
            QueueStatus::Matched(found) => {
                assert!(found.is_bot);
                assert!(found.player2.starts_with("bot-"));
            }
            _ => panic!("expected a bot match"),
        }
    }

    #[tokio::test]
    async fn test_pairing_cancels_bot_fallback() {
        let svc = service(20);

        svc.join_queue("alice");
        svc.join_queue("bob");
        tokio::time::sleep(Duration::from_millis(80)).await;

        // One human match only; no bot match appeared later.
        assert_eq!(svc.active_matches(), 1);
        match svc.get_status("alice") {
            QueueStatus::Matched(found) => assert!(!found.is_bot),
            _ => panic!("expected the human match"),
        }
    }

    #[tokio::test]
    async fn test_submit_choice_resolves_match() {
        let svc = service(60_000);
        svc.join_queue("alice");
        let found = match svc.join_queue("bob") {
            JoinOutcome::Matched(found) => found,
            _ => panic!("expected a match"),
        };

        let first = svc.submit_choice(&found.match_id, "alice", "rock").unwrap();
        assert!(!first.both_submitted);

        let second = svc.submit_choice(&found.match_id, "bob", "scissors").unwrap();
        assert!(second.both_submitted);
        let result = second.result.unwrap();
        assert_eq!(result.winner.as_deref(), Some("alice"));

        // The match is gone; a third submission reads as not-found.
        assert!(matches!(
            svc.submit_choice(&found.match_id, "alice", "rock"),
            Err(MatchError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_bot_answers_immediately() {
        let svc = service(10);
        svc.join_queue("alice");
        tokio::time::sleep(Duration::from_millis(60)).await;

        let found = match svc.get_status("alice") {
            QueueStatus::Matched(found) => found,
            _ => panic!("expected a bot match"),
        };

        let submission = svc.submit_choice(&found.match_id, "alice", "paper").unwrap();
        assert!(submission.both_submitted);
        assert!(submission.result.is_some());
    }

    #[tokio::test]
    async fn test_submit_choice_validation() {
        let svc = service(60_000);
        svc.join_queue("alice");
        let found = match svc.join_queue("bob") {
            JoinOutcome::Matched(found) => found,
            _ => panic!("expected a match"),
        };

        assert!(matches!(
            svc.submit_choice("missing", "alice", "rock"),
            Err(MatchError::NotFound(_))
        ));
        assert!(matches!(
            svc.submit_choice(&found.match_id, "carol", "rock"),
            Err(MatchError::NotParticipant(_))
        ));
        assert!(matches!(
            svc.submit_choice(&found.match_id, "alice", "lizard"),
            Err(MatchError::InvalidChoice(_))
        ));
    }

    #[tokio::test]
    async fn test_status_for_unknown_wallet() {
        let svc = service(60_000);
        assert!(matches!(svc.get_status("ghost"), QueueStatus::NotFound));
    }
}
