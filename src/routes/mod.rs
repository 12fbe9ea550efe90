/**
 * Routes Module
 * API route handlers
 */
use serde::{Deserialize, Serialize};

pub mod articles;
pub mod auth;
pub mod categories;
pub mod contacts;
pub mod health;
pub mod news;
pub mod upload;

pub use crate::error::ErrorResponse;

/// Body for deletes and logout
#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[cfg(test)]
pub(crate) mod testing {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::config::AppConfig;
    use crate::db::models::NewAdmin;
    use crate::db::{ContentStore, MemoryStore};
    use crate::AppState;

    pub const ADMIN_EMAIL: &str = "admin@example.com";
    pub const ADMIN_PASSWORD: &str = "correct horse";

    pub fn state() -> AppState {
        let config = AppConfig {
            jwt_secret: "test-secret".to_string(),
            upload_dir: std::env::temp_dir().join(format!("insights-test-{}", uuid::Uuid::new_v4())),
            ..AppConfig::default()
        };
        AppState::new(ContentStore::Memory(MemoryStore::new()), config)
    }

    /// State with one admin account, plus a valid bearer token for it.
    pub async fn admin_state() -> (AppState, String) {
        let state = state();
        let hash = bcrypt::hash(ADMIN_PASSWORD, 4).unwrap();
        let admin = state
            .store
            .upsert_admin(NewAdmin {
                email: ADMIN_EMAIL.to_string(),
                password_hash: hash,
                name: Some("Admin".to_string()),
            })
            .await
            .unwrap();
        let token = crate::routes::auth::create_session_token(&state.config, &admin).unwrap();
        (state, token)
    }

    pub async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    pub fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    pub fn json(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap()
    }

    pub fn authed(method: &str, uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    }
}
