use axum::{routing::get, Router};
use rumble::config::Config;
use rumble::services::{
    EventLog, FeeLedger, LeaderboardService, MatchmakingService, PriceOracle, RewardService,
    RoomService, Scheduler, TransferClient,
};
use rumble::websocket::{self, Hub};
use rumble::{api, AppState};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rumble=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Arc::new(Config::from_env());
    info!("Starting Rumble server on {}:{}", config.host, config.port);

    // Shared infrastructure
    let hub = Hub::new();
    let scheduler = Scheduler::new();
    let event_log = EventLog::new(config.event_log_url.clone());
    let oracle = PriceOracle::new(&config.oracle);
    let fees = FeeLedger::new();

    // Game services
    let matchmaking = MatchmakingService::with_hub(
        &config.game,
        scheduler.clone(),
        event_log.clone(),
        hub.clone(),
    );
    let leaderboard = LeaderboardService::new(&config.competition);
    let transfer = TransferClient::new(&config.rewards);
    let rewards = RewardService::new(&config.rewards, leaderboard.clone(), transfer);
    let rooms = RoomService::new(
        &config.game,
        &config.oracle,
        oracle.clone(),
        fees.clone(),
        leaderboard.clone(),
        rewards.clone(),
        scheduler.clone(),
        event_log.clone(),
        Some(hub.clone()),
    );

    // Periodic competition-epoch check. A rollover wipes the standings and
    // discards whatever pool value was never distributed.
    {
        let leaderboard = leaderboard.clone();
        let rewards = rewards.clone();
        let interval = Duration::from_secs(config.competition.epoch_check_secs);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                if leaderboard.roll_epoch_if_elapsed() {
                    let undistributed = rewards.reset_pool();
                    if undistributed > 0.0 {
                        warn!(
                            "Epoch reset discarded an undistributed reward pool of {}",
                            undistributed
                        );
                    }
                }
            }
        });
    }

    // Create application state
    let state = AppState {
        config: config.clone(),
        hub,
        oracle,
        fees,
        matchmaking,
        rooms,
        leaderboard,
        rewards,
    };

    // Build CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the router
    let app = Router::new()
        .merge(api::router())
        .route("/ws", get(websocket::ws_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start the server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Rumble server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
