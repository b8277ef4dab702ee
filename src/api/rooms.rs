use crate::error::{AppError, Result};
use crate::types::{BettingResult, RoomSummary};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    pub wallet: String,
    pub bet_amount: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomResponse {
    pub room_id: String,
}

/// POST /api/rooms
async fn create_room(
    State(state): State<AppState>,
    Json(request): Json<CreateRoomRequest>,
) -> Result<Json<CreateRoomResponse>> {
    let wallet = request.wallet.trim();
    if wallet.is_empty() {
        return Err(AppError::BadRequest("wallet is required".to_string()));
    }

    let summary = state.rooms.create_room(wallet, request.bet_amount).await?;
    Ok(Json(CreateRoomResponse {
        room_id: summary.room_id,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomRequest {
    pub wallet: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomResponse {
    pub room_id: String,
    pub creator: String,
    pub bet_amount: f64,
}

/// POST /api/rooms/:id/join
async fn join_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(request): Json<JoinRoomRequest>,
) -> Result<Json<JoinRoomResponse>> {
    let wallet = request.wallet.trim();
    if wallet.is_empty() {
        return Err(AppError::BadRequest("wallet is required".to_string()));
    }

    let summary = state.rooms.join_room(wallet, &room_id).await?;
    Ok(Json(JoinRoomResponse {
        room_id: summary.room_id,
        creator: summary.creator,
        bet_amount: summary.bet_amount,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelRoomRequest {
    pub wallet: String,
}

#[derive(Debug, Serialize)]
pub struct CancelRoomResponse {
    pub ok: bool,
}

/// POST /api/rooms/:id/cancel
async fn cancel_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(request): Json<CancelRoomRequest>,
) -> Result<Json<CancelRoomResponse>> {
    let wallet = request.wallet.trim();
    if wallet.is_empty() {
        return Err(AppError::BadRequest("wallet is required".to_string()));
    }

    state.rooms.cancel_room(wallet, &room_id)?;
    Ok(Json(CancelRoomResponse { ok: true }))
}

/// GET /api/rooms
async fn list_rooms(State(state): State<AppState>) -> Json<Vec<RoomSummary>> {
    Json(state.rooms.list_rooms())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomChoiceRequest {
    pub wallet: String,
    pub choice: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomChoiceResponse {
    pub submitted: bool,
    pub both_submitted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<BettingResult>,
}

/// POST /api/rooms/:id/choice
async fn submit_choice(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(request): Json<RoomChoiceRequest>,
) -> Result<Json<RoomChoiceResponse>> {
    let wallet = request.wallet.trim();
    if wallet.is_empty() {
        return Err(AppError::BadRequest("wallet is required".to_string()));
    }

    let submission = state
        .rooms
        .submit_choice(wallet, &room_id, &request.choice)
        .await?;

    Ok(Json(RoomChoiceResponse {
        submitted: true,
        both_submitted: submission.both_submitted,
        result: submission.result,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_rooms))
        .route("/", post(create_room))
        .route("/:id/join", post(join_room))
        .route("/:id/cancel", post(cancel_room))
        .route("/:id/choice", post(submit_choice))
}
