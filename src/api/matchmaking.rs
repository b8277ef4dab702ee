use crate::error::{AppError, Result};
use crate::services::{JoinOutcome, QueueStatus};
use crate::types::MatchResult;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinQueueRequest {
    pub wallet: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinQueueResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opponent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_bot: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub waited_ms: Option<i64>,
}

/// POST /api/matchmaking/queue
async fn join_queue(
    State(state): State<AppState>,
    Json(request): Json<JoinQueueRequest>,
) -> Result<Json<JoinQueueResponse>> {
    let wallet = request.wallet.trim();
    if wallet.is_empty() {
        return Err(AppError::BadRequest("wallet is required".to_string()));
    }

    let response = match state.matchmaking.join_queue(wallet) {
        JoinOutcome::Matched(found) => {
            let opponent = if found.player1 == wallet {
                found.player2.clone()
            } else {
                found.player1.clone()
            };
            JoinQueueResponse {
                status: "matched",
                match_id: Some(found.match_id),
                opponent: Some(opponent),
                is_bot: Some(found.is_bot),
                waited_ms: None,
            }
        }
        JoinOutcome::Queued { waited_ms } => JoinQueueResponse {
            status: "inQueue",
            match_id: None,
            opponent: None,
            is_bot: None,
            waited_ms: Some(waited_ms),
        },
    };

    Ok(Json(response))
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum MatchStatusResponse {
    #[serde(rename_all = "camelCase")]
    Matched {
        has_match: bool,
        match_id: String,
        player1: String,
        player2: String,
        is_bot: bool,
    },
    #[serde(rename_all = "camelCase")]
    InQueue { in_queue: bool, waited_ms: i64 },
    None,
}

/// GET /api/matchmaking/status/:wallet
async fn get_status(
    State(state): State<AppState>,
    Path(wallet): Path<String>,
) -> Json<MatchStatusResponse> {
    let response = match state.matchmaking.get_status(&wallet) {
        QueueStatus::Matched(found) => MatchStatusResponse::Matched {
            has_match: true,
            match_id: found.match_id,
            player1: found.player1,
            player2: found.player2,
            is_bot: found.is_bot,
        },
        QueueStatus::InQueue { waited_ms } => MatchStatusResponse::InQueue {
            in_queue: true,
            waited_ms,
        },
        QueueStatus::NotFound => MatchStatusResponse::None,
    };
    Json(response)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitChoiceRequest {
    pub match_id: String,
    pub wallet: String,
    pub choice: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitChoiceResponse {
    pub submitted: bool,
    pub both_submitted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<MatchResult>,
}

/// POST /api/matchmaking/choice
async fn submit_choice(
    State(state): State<AppState>,
    Json(request): Json<SubmitChoiceRequest>,
) -> Result<Json<SubmitChoiceResponse>> {
    if request.wallet.trim().is_empty() || request.match_id.trim().is_empty() {
        return Err(AppError::BadRequest("matchId and wallet are required".to_string()));
    }

    let submission =
        state
            .matchmaking
            .submit_choice(&request.match_id, &request.wallet, &request.choice)?;

    Ok(Json(SubmitChoiceResponse {
        submitted: true,
        both_submitted: submission.both_submitted,
        result: submission.result,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/queue", post(join_queue))
        .route("/status/:wallet", get(get_status))
        .route("/choice", post(submit_choice))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_response_matched_serialization() {
        let response = JoinQueueResponse {
            status: "matched",
            match_id: Some("m-1".to_string()),
            opponent: Some("bob".to_string()),
            is_bot: Some(false),
            waited_ms: None,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"matched\""));
        assert!(json.contains("\"matchId\":\"m-1\""));
        assert!(json.contains("\"isBot\":false"));
        assert!(!json.contains("waitedMs"));
    }

    #[test]
    fn test_join_response_queued_serialization() {
        let response = JoinQueueResponse {
            status: "inQueue",
            match_id: None,
            opponent: None,
            is_bot: None,
            waited_ms: Some(0),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"inQueue\""));
        assert!(json.contains("\"waitedMs\":0"));
        assert!(!json.contains("matchId"));
    }

    #[test]
    fn test_status_response_variants() {
        let matched = MatchStatusResponse::Matched {
            has_match: true,
            match_id: "m-1".to_string(),
            player1: "alice".to_string(),
            player2: "bob".to_string(),
            is_bot: false,
        };
        let json = serde_json::to_string(&matched).unwrap();
        assert!(json.contains("\"status\":\"matched\""));
        assert!(json.contains("\"hasMatch\":true"));

        let none = MatchStatusResponse::None;
        let json = serde_json::to_string(&none).unwrap();
        assert!(json.contains("\"status\":\"none\""));
    }

    #[test]
    fn test_choice_request_deserialization() {
        let json = r#"{"matchId": "m-1", "wallet": "alice", "choice": "rock"}"#;
        let request: SubmitChoiceRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.match_id, "m-1");
        assert_eq!(request.choice, "rock");
    }
}
