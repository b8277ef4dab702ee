use super::{Choice, Outcome};
use serde::{Deserialize, Serialize};

/// Lifecycle of a betting room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Open,
    Full,
    Resolved,
}

/// Choice slots for a betting room.
#[derive(Debug, Clone, Default)]
pub struct RoomChoices {
    pub creator: Option<Choice>,
    pub challenger: Option<Choice>,
}

impl RoomChoices {
    pub fn is_complete(&self) -> bool {
        self.creator.is_some() && self.challenger.is_some()
    }

    pub fn any_submitted(&self) -> bool {
        self.creator.is_some() || self.challenger.is_some()
    }
}

/// A wager room created by one wallet and joined by another.
#[derive(Debug, Clone)]
pub struct BettingRoom {
    pub room_id: String,
    pub creator: String,
    /// Wager size in wagering-token units.
    pub bet_amount: f64,
    pub challenger: Option<String>,
    pub choices: RoomChoices,
    /// Unix millis at creation.
    pub created_at: i64,
    pub status: RoomStatus,
    /// Set by the submission that completes the pair, so resolution runs once.
    pub resolving: bool,
}

impl BettingRoom {
    pub fn new(room_id: String, creator: String, bet_amount: f64, created_at: i64) -> Self {
        Self {
            room_id,
            creator,
            bet_amount,
            challenger: None,
            choices: RoomChoices::default(),
            created_at,
            status: RoomStatus::Open,
            resolving: false,
        }
    }

    pub fn is_participant(&self, wallet: &str) -> bool {
        self.creator == wallet || self.challenger.as_deref() == Some(wallet)
    }

    /// Whether an unfilled room has outlived its TTL.
    pub fn is_expired(&self, now_ms: i64, ttl_secs: u64) -> bool {
        self.status == RoomStatus::Open && now_ms - self.created_at > (ttl_secs as i64) * 1000
    }
}

/// Room listing entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub room_id: String,
    pub creator: String,
    pub bet_amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player2: Option<String>,
    pub created_at: i64,
}

impl From<&BettingRoom> for RoomSummary {
    fn from(room: &BettingRoom) -> Self {
        Self {
            room_id: room.room_id.clone(),
            creator: room.creator.clone(),
            bet_amount: room.bet_amount,
            player2: room.challenger.clone(),
            created_at: room.created_at,
        }
    }
}

/// Emitted once a betting room resolves.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BettingResult {
    pub room_id: String,
    pub creator: String,
    pub challenger: String,
    pub creator_choice: Choice,
    pub challenger_choice: Choice,
    pub outcome: Outcome,
    /// Winning wallet, absent on a tie.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,
    pub bet_amount: f64,
    /// Both wagers combined, in token units.
    pub pot: f64,
    /// Pot value in base currency at resolution time.
    pub pot_base: f64,
}
