use crate::types::WalletFees;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletTotal {
    pub wallet: String,
    pub total_fees: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeesResponse {
    pub total_collected: f64,
    pub wallets: Vec<WalletTotal>,
}

/// GET /api/fees
async fn get_all_fees(State(state): State<AppState>) -> Json<FeesResponse> {
    let mut wallets: Vec<WalletTotal> = state
        .fees
        .all_totals()
        .into_iter()
        .map(|(wallet, total_fees)| WalletTotal { wallet, total_fees })
        .collect();
    wallets.sort_by(|a, b| b.total_fees.total_cmp(&a.total_fees));

    Json(FeesResponse {
        total_collected: state.fees.total_collected(),
        wallets,
    })
}

/// GET /api/fees/:wallet
///
/// A wallet that was never charged reads as an empty record, not an error.
async fn get_wallet_fees(
    State(state): State<AppState>,
    Path(wallet): Path<String>,
) -> Json<WalletFees> {
    Json(state.fees.wallet_fees(&wallet).unwrap_or_default())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_all_fees))
        .route("/:wallet", get(get_wallet_fees))
}
