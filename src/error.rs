use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            AppError::ExternalApi(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            AppError::Reqwest(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
            AppError::SerdeJson(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            AppError::Anyhow(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

impl From<crate::services::MatchError> for AppError {
    fn from(e: crate::services::MatchError) -> Self {
        use crate::services::MatchError::*;
        match e {
            NotFound(_) => AppError::NotFound(e.to_string()),
            NotParticipant(_) => AppError::Unauthorized(e.to_string()),
            InvalidChoice(_) => AppError::BadRequest(e.to_string()),
        }
    }
}

impl From<crate::services::RoomError> for AppError {
    fn from(e: crate::services::RoomError) -> Self {
        use crate::services::RoomError::*;
        match e {
            NotFound(_) => AppError::NotFound(e.to_string()),
            BetTooSmall { .. } | InvalidChoice(_) => AppError::BadRequest(e.to_string()),
            SelfJoin | RoomFull(_) | NotFull(_) | GameInProgress => {
                AppError::Conflict(e.to_string())
            }
            NotParticipant(_) => AppError::Unauthorized(e.to_string()),
        }
    }
}

impl From<crate::services::RewardError> for AppError {
    fn from(e: crate::services::RewardError) -> Self {
        use crate::services::RewardError::*;
        match e {
            InvalidAmount(_) => AppError::BadRequest(e.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let response = AppError::NotFound("room abc".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_conflict_maps_to_409() {
        let response = AppError::Conflict("room is full".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_unauthorized_maps_to_403() {
        let response = AppError::Unauthorized("not a participant".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_room_error_taxonomy() {
        use crate::services::RoomError;

        assert!(matches!(
            AppError::from(RoomError::SelfJoin),
            AppError::Conflict(_)
        ));
        assert!(matches!(
            AppError::from(RoomError::NotFound("r-1".to_string())),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from(RoomError::NotParticipant("mallory".to_string())),
            AppError::Unauthorized(_)
        ));
        assert!(matches!(
            AppError::from(RoomError::InvalidChoice("lizard".to_string())),
            AppError::BadRequest(_)
        ));
    }
}
