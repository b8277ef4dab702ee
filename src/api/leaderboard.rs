use crate::types::RankedEntry;
use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};

/// GET /api/leaderboard
async fn get_leaderboard(State(state): State<AppState>) -> Json<Vec<RankedEntry>> {
    Json(state.leaderboard.ranked())
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_leaderboard))
}
