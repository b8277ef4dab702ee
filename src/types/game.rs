use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A player's move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Choice {
    Rock,
    Paper,
    Scissors,
}

impl Choice {
    pub const ALL: [Choice; 3] = [Choice::Rock, Choice::Paper, Choice::Scissors];

    pub fn as_str(&self) -> &'static str {
        match self {
            Choice::Rock => "rock",
            Choice::Paper => "paper",
            Choice::Scissors => "scissors",
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Choice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rock" => Ok(Choice::Rock),
            "paper" => Ok(Choice::Paper),
            "scissors" => Ok(Choice::Scissors),
            other => Err(other.to_string()),
        }
    }
}

/// Result of pitting two choices against each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Player1,
    Player2,
    Tie,
}

/// Where a queued wallet currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueState {
    Waiting,
    Matched { match_id: String },
}

/// A wallet waiting for an opponent.
#[derive(Debug, Clone)]
pub struct QueueEntry {
    pub wallet: String,
    /// Unix millis at insertion.
    pub joined_at: i64,
    pub state: QueueState,
}

/// Choice slots for a quick match.
#[derive(Debug, Clone, Default)]
pub struct MatchChoices {
    pub player1: Option<Choice>,
    pub player2: Option<Choice>,
}

impl MatchChoices {
    pub fn is_complete(&self) -> bool {
        self.player1.is_some() && self.player2.is_some()
    }
}

/// An in-flight two-party match awaiting both choices.
#[derive(Debug, Clone)]
pub struct ActiveMatch {
    pub match_id: String,
    pub player1: String,
    pub player2: String,
    pub is_bot: bool,
    pub choices: MatchChoices,
    /// Unix millis at creation.
    pub created_at: i64,
    /// Set by the submission that completes the pair, so resolution runs once.
    pub resolving: bool,
}

impl ActiveMatch {
    /// Match ids are derived from both participants plus a timestamp.
    pub fn derive_id(player1: &str, player2: &str, timestamp_ms: i64) -> String {
        let p1: String = player1.chars().take(6).collect();
        let p2: String = player2.chars().take(6).collect();
        format!("m-{}-{}-{}", p1, p2, timestamp_ms)
    }

    pub fn new(player1: String, player2: String, is_bot: bool, created_at: i64) -> Self {
        let match_id = Self::derive_id(&player1, &player2, created_at);
        Self {
            match_id,
            player1,
            player2,
            is_bot,
            choices: MatchChoices::default(),
            created_at,
            resolving: false,
        }
    }

    pub fn is_participant(&self, wallet: &str) -> bool {
        self.player1 == wallet || self.player2 == wallet
    }
}

/// Emitted once a quick match resolves.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub match_id: String,
    pub player1: String,
    pub player2: String,
    pub player1_choice: Choice,
    pub player2_choice: Choice,
    pub outcome: Outcome,
    /// Winning wallet, absent on a tie.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,
    pub is_bot: bool,
}
