/**
 * Health Routes
 * Liveness and content-store checks
 */
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::AppState;

lazy_static::lazy_static! {
    static ref SERVER_START: Instant = Instant::now();
}

/// Pin the uptime origin to server start rather than the first health call.
pub fn init_start_time() {
    lazy_static::initialize(&SERVER_START);
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PingResponse {
    pub status: String,
    pub uptime: u64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCheck {
    pub status: String,
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// GET /health
pub async fn health_ping() -> Json<PingResponse> {
    Json(PingResponse {
        status: "ok".to_string(),
        uptime: SERVER_START.elapsed().as_secs(),
    })
}

/// GET /health/database - 503 when the store does not answer
pub async fn health_database(State(state): State<AppState>) -> (StatusCode, Json<ServiceCheck>) {
    let backend = state.store.backend().to_string();
    match state.store.ping().await {
        Ok(duration) => (
            StatusCode::OK,
            Json(ServiceCheck {
                status: "healthy".to_string(),
                backend,
                response_time: Some(duration.as_millis() as u64),
                error: None,
            }),
        ),
        Err(e) => {
            tracing::error!("Content store health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ServiceCheck {
                    status: "unhealthy".to_string(),
                    backend,
                    response_time: None,
                    error: Some("Content store unavailable".to_string()),
                }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_app;
    use crate::routes::testing::{self, send};

    #[tokio::test]
    async fn test_health_ping_returns_ok() {
        init_start_time();
        let (status, body) = send(create_app(testing::state()), testing::get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert!(body["uptime"].is_u64());
    }

    #[tokio::test]
    async fn test_health_database_reports_memory_backend() {
        let (status, body) =
            send(create_app(testing::state()), testing::get("/health/database")).await;
        assert_eq!(status, StatusCode::OK);
        let check: ServiceCheck = serde_json::from_value(body).unwrap();
        assert_eq!(check.status, "healthy");
        assert_eq!(check.backend, "memory");
    }
}
