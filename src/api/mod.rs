pub mod competition;
pub mod fees;
pub mod health;
pub mod leaderboard;
pub mod matchmaking;
pub mod price;
pub mod rewards;
pub mod rooms;

use crate::AppState;
use axum::Router;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/api/matchmaking", matchmaking::router())
        .nest("/api/rooms", rooms::router())
        .nest("/api/price", price::router())
        .nest("/api/fees", fees::router())
        .nest("/api/leaderboard", leaderboard::router())
        .nest("/api/rewards", rewards::router())
        .nest("/api/competition", competition::router())
}
