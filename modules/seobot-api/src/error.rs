//! API error taxonomy. Every failure surfaces as a JSON body with
//! `success: false` and a status matching its category; internal errors are
//! logged with their cause and returned with a generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use tracing::error;

use seobot_common::SeoBotError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            ApiError::Internal(cause) => {
                error!(error = cause.as_str(), "Internal error handling bot action");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (
            self.status(),
            Json(serde_json::json!({ "success": false, "error": message })),
        )
            .into_response()
    }
}

/// Workflow errors carry their category as a `SeoBotError`; everything else
/// is internal.
impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<SeoBotError>() {
            Some(SeoBotError::Validation(message)) => ApiError::BadRequest(message.clone()),
            Some(SeoBotError::NotFound(message)) => ApiError::NotFound(message.clone()),
            _ => ApiError::Internal(format!("{err:#}")),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workflow_errors_map_to_their_category() {
        let validation: anyhow::Error = SeoBotError::Validation("batch_id or slug required".into()).into();
        assert!(matches!(ApiError::from(validation), ApiError::BadRequest(_)));

        let not_found: anyhow::Error = SeoBotError::NotFound("No history found".into()).into();
        assert!(matches!(ApiError::from(not_found), ApiError::NotFound(_)));

        let other: anyhow::Error = anyhow::anyhow!("connection refused");
        assert!(matches!(ApiError::from(other), ApiError::Internal(_)));
    }

    #[test]
    fn statuses_follow_the_taxonomy() {
        assert_eq!(
            ApiError::Unauthenticated("x".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::Forbidden("x".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::BadRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Internal("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
