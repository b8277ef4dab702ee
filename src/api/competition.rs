use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitionTimeResponse {
    /// Milliseconds until the epoch ends.
    pub time_remaining: i64,
    pub started_at: i64,
    pub ends_at: i64,
    pub is_active: bool,
}

/// GET /api/competition
async fn get_competition_time(State(state): State<AppState>) -> Json<CompetitionTimeResponse> {
    let epoch = state.leaderboard.epoch();
    let now = Utc::now().timestamp_millis();

    Json(CompetitionTimeResponse {
        time_remaining: epoch.remaining_ms(now),
        started_at: epoch.started_at,
        ends_at: epoch.ends_at,
        is_active: !epoch.is_elapsed(now),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_competition_time))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_serialization() {
        let response = CompetitionTimeResponse {
            time_remaining: 1000,
            started_at: 0,
            ends_at: 1000,
            is_active: true,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"timeRemaining\":1000"));
        assert!(json.contains("\"isActive\":true"));
    }
}
