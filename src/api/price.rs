use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceResponse {
    pub price: Option<f64>,
    pub cached_at: Option<i64>,
    pub stale: bool,
}

/// GET /api/price
///
/// Never fails: with every source down and nothing cached, the price is null
/// and callers fall back to their own conversion rate.
async fn get_price(State(state): State<AppState>) -> Json<PriceResponse> {
    let response = match state.oracle.get_price().await {
        Some(quote) => PriceResponse {
            price: Some(quote.price),
            cached_at: Some(quote.cached_at),
            stale: quote.stale,
        },
        None => PriceResponse {
            price: None,
            cached_at: None,
            stale: true,
        },
    };
    Json(response)
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_price))
}
