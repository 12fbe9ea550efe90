//! Error types shared by every handler.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::StoreError;

/// JSON error body: `{"error": "...", "message": "..."}`
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
            AppError::Store(StoreError::Conflict(_)) => StatusCode::CONFLICT,
            AppError::Store(StoreError::CategoryInUse { .. }) => StatusCode::CONFLICT,
            AppError::Store(StoreError::InvalidReference(_)) => StatusCode::BAD_REQUEST,
            AppError::Store(StoreError::Database(_)) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn body(&self) -> ErrorResponse {
        match self {
            AppError::Validation(msg) => ErrorResponse::new(msg.clone()),
            AppError::Unauthorized => ErrorResponse::new("Unauthorized"),
            AppError::Store(StoreError::NotFound) => ErrorResponse::new("Not found"),
            AppError::Store(StoreError::Conflict(msg))
            | AppError::Store(StoreError::InvalidReference(msg)) => ErrorResponse::new(msg.clone()),
            AppError::Store(StoreError::CategoryInUse { count }) => ErrorResponse::new(format!(
                "Cannot delete category with {} articles attached",
                count
            )),
            AppError::Store(StoreError::Database(e)) => {
                tracing::error!("Database error: {}", e);
                ErrorResponse::new("Database error")
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ErrorResponse::new("Internal server error")
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(err: AppError) -> (StatusCode, ErrorResponse) {
        let res = err.into_response();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_category_in_use_is_conflict_with_count() {
        let (status, body) = body_of(StoreError::CategoryInUse { count: 3 }.into()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body.error, "Cannot delete category with 3 articles attached");
    }

    #[tokio::test]
    async fn test_database_error_is_generic_500() {
        let (status, body) = body_of(StoreError::Database(sqlx::Error::PoolTimedOut).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Database error");
        assert!(body.message.is_none());
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::Store(StoreError::NotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Store(StoreError::Conflict("dup".into())).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Store(StoreError::InvalidReference("Unknown category".into())).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
