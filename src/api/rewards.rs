use crate::error::Result;
use crate::types::{DistributionReport, PlanShare};
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributeRequest {
    /// Defaults to the accumulated pool when omitted.
    #[serde(default)]
    pub pool_amount: Option<f64>,
}

/// POST /api/rewards/distribute
async fn distribute(
    State(state): State<AppState>,
    Json(request): Json<DistributeRequest>,
) -> Result<Json<DistributionReport>> {
    let amount = request.pool_amount.unwrap_or_else(|| state.rewards.pool());
    let report = state.rewards.distribute(amount).await?;
    Ok(Json(report))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolStatusResponse {
    pub pool: f64,
    pub distribution_plan: Vec<PlanShare>,
}

/// GET /api/rewards/pool
async fn get_pool_status(State(state): State<AppState>) -> Json<PoolStatusResponse> {
    Json(PoolStatusResponse {
        pool: state.rewards.pool(),
        distribution_plan: state.rewards.plan(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/distribute", post(distribute))
        .route("/pool", get(get_pool_status))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distribute_request_defaults() {
        let request: DistributeRequest = serde_json::from_str("{}").unwrap();
        assert!(request.pool_amount.is_none());

        let request: DistributeRequest =
            serde_json::from_str(r#"{"poolAmount": 42.0}"#).unwrap();
        assert_eq!(request.pool_amount, Some(42.0));
    }

    #[test]
    fn test_pool_status_serialization() {
        let response = PoolStatusResponse {
            pool: 12.5,
            distribution_plan: vec![PlanShare {
                recipient: "rank1".to_string(),
                percentage: 20.0,
            }],
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"pool\":12.5"));
        assert!(json.contains("\"distributionPlan\""));
        assert!(json.contains("\"recipient\":\"rank1\""));
    }
}
