use super::{BettingResult, MatchResult, RoomSummary};
use serde::{Deserialize, Serialize};

/// Incoming WebSocket message from a client.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Subscribe to broadcast channels (`lobby`, a wallet, or a room id).
    Subscribe { channels: Vec<String> },
    Unsubscribe { channels: Vec<String> },
}

/// Two wallets were paired (or a bot stepped in).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchFoundData {
    pub match_id: String,
    pub player1: String,
    pub player2: String,
    pub is_bot: bool,
}

/// A challenger joined a room.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomJoinedData {
    pub room_id: String,
    pub creator: String,
    pub player2: String,
    pub bet_amount: f64,
}

/// A room left the listing (cancelled, expired, or cleaned up post-resolution).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRemovedData {
    pub room_id: String,
    pub reason: String,
}

/// Outgoing WebSocket message to a client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    MatchFound { data: MatchFoundData },
    MatchResult { data: MatchResult },
    RoomCreated { data: RoomSummary },
    RoomJoined { data: RoomJoinedData },
    RoomCancelled { data: RoomRemovedData },
    RoomRemoved { data: RoomRemovedData },
    BettingMatchResult { data: BettingResult },
    Subscribed { channels: Vec<String> },
    Unsubscribed { channels: Vec<String> },
    Error { error: String },
}
