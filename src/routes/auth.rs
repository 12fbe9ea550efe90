/**
 * Authentication Routes
 * Admin login, logout and the session gate for /api/admin
 */
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
    Extension, Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::db::models::Admin;
use crate::error::AppError;
use crate::routes::SuccessResponse;
use crate::AppState;

pub const SESSION_COOKIE: &str = "session";
pub const LOGIN_PATH: &str = "/api/admin/login";

// ============================================================================
// Types
// ============================================================================

/// Session JWT claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,   // Admin ID
    pub email: String, // Admin email
    #[serde(default)]
    pub name: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

/// Admin identity returned to the console
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AdminInfo {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
}

impl From<&Claims> for AdminInfo {
    fn from(claims: &Claims) -> Self {
        Self {
            id: claims.sub.clone(),
            email: claims.email.clone(),
            name: claims.name.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub user: AdminInfo,
    /// Same value as the cookie, for clients without a cookie jar
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub authenticated: bool,
    pub user: AdminInfo,
}

// ============================================================================
// Tokens
// ============================================================================

pub fn create_session_token(config: &AppConfig, admin: &Admin) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
        sub: admin.id.to_string(),
        email: admin.email.clone(),
        name: admin.name.clone(),
        exp: (now + Duration::hours(config.session_ttl_hours)).timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to create session token: {}", e)))
}

pub fn verify_session_token(
    secret: &str,
    token: &str,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Valid session from the `session` cookie, else from a bearer header.
pub fn session_claims(secret: &str, jar: &CookieJar, headers: &HeaderMap) -> Option<Claims> {
    let from_cookie = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());
    let from_header = extract_bearer_token(headers).map(str::to_string);

    [from_cookie, from_header]
        .into_iter()
        .flatten()
        .find_map(|token| verify_session_token(secret, &token).ok())
}

/// The gate: the login endpoint is always reachable, everything else needs a session.
pub fn is_authorized(path: &str, has_session: bool) -> bool {
    path == LOGIN_PATH || has_session
}

fn session_cookie(token: String, config: &AppConfig) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.is_production())
        .build()
}

// ============================================================================
// Middleware
// ============================================================================

/// Applied to every `/api/admin` route.
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = session_claims(&state.config.jwt_secret, &jar, request.headers());

    if !is_authorized(request.uri().path(), claims.is_some()) {
        tracing::warn!(uri = %request.uri(), "Rejected admin request without session");
        return Err(AppError::Unauthorized);
    }

    if let Some(claims) = claims {
        request.extensions_mut().insert(claims);
    }
    Ok(next.run(request).await)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/admin/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    let email = payload.email.trim().to_lowercase();

    if email.is_empty() || payload.password.is_empty() {
        return Err(AppError::Validation(
            "Email and password are required".to_string(),
        ));
    }
    if !email.contains('@') {
        return Err(AppError::Validation("Invalid email format".to_string()));
    }

    let Some(admin) = state.store.find_admin_by_email(&email).await? else {
        tracing::warn!("Login attempt for unknown admin: {}", email);
        return Err(AppError::Unauthorized);
    };

    // bcrypt is CPU-bound; keep it off the async workers.
    let password = payload.password;
    let hash = admin.password_hash.clone();
    let password_ok = tokio::task::spawn_blocking(move || {
        bcrypt::verify(&password, &hash).unwrap_or(false)
    })
    .await
    .map_err(|e| AppError::Internal(format!("Password check failed: {}", e)))?;

    if !password_ok {
        tracing::warn!("Failed login attempt for: {}", email);
        return Err(AppError::Unauthorized);
    }

    let token = create_session_token(&state.config, &admin)?;
    tracing::info!("Successful login for admin: {}", admin.email);

    let jar = jar.add(session_cookie(token.clone(), &state.config));
    Ok((
        jar,
        Json(LoginResponse {
            success: true,
            user: AdminInfo {
                id: admin.id.to_string(),
                email: admin.email,
                name: admin.name,
            },
            token,
        }),
    ))
}

/// POST /api/admin/logout - always succeeds
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<SuccessResponse>) {
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, Json(SuccessResponse { success: true }))
}

/// GET /api/admin/session
pub async fn session(Extension(claims): Extension<Claims>) -> Json<SessionResponse> {
    Json(SessionResponse {
        authenticated: true,
        user: AdminInfo::from(&claims),
    })
}
