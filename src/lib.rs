//! Insights Backend - library for app logic and testing

pub mod admin;
pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod i18n;
pub mod logging;
pub mod routes;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer,
    services::ServeDir, trace::TraceLayer,
};

use config::AppConfig;
use db::ContentStore;
use i18n::Translations;

pub use error::{AppError, ErrorResponse};

/// Shared handler state
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: ContentStore,
    pub translations: Arc<Translations>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: ContentStore, config: AppConfig) -> Self {
        Self {
            store,
            translations: Arc::new(Translations::bundled().clone()),
            config: Arc::new(config),
        }
    }
}

/// CORS for the configured frontend origins. Credentials are allowed so the
/// session cookie travels with admin requests.
pub fn configure_cors(config: &AppConfig) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(config.allowed_origins.clone())
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

/// Routes behind the session gate.
fn admin_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/admin/login", post(routes::auth::login))
        .route("/api/admin/session", get(routes::auth::session))
        .route("/api/admin/articles", post(routes::articles::create_article))
        .route(
            "/api/admin/articles/{slug}",
            put(routes::articles::update_article).delete(routes::articles::delete_article),
        )
        .route(
            "/api/admin/categories",
            post(routes::categories::create_category),
        )
        .route(
            "/api/admin/categories/{id}",
            delete(routes::categories::delete_category),
        )
        .route("/api/admin/contacts", get(routes::contacts::list_contacts))
        .route(
            "/api/admin/upload",
            post(routes::upload::upload_image)
                .layer(DefaultBodyLimit::max(routes::upload::MAX_BODY_SIZE)),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            routes::auth::require_session,
        ))
}

/// Create and configure the application router.
pub fn create_app(state: AppState) -> Router {
    let cors = configure_cors(&state.config);
    let uploads = ServeDir::new(&state.config.upload_dir);

    Router::new()
        .route("/api/articles", get(routes::articles::list_articles))
        .route("/api/articles/{slug}", get(routes::articles::get_article))
        .route("/api/categories", get(routes::categories::list_categories))
        .route("/api/contacts", post(routes::contacts::create_contact))
        .route("/api/news", get(routes::news::list_news))
        .route("/api/news/{slug}", get(routes::news::news_detail))
        .route("/api/admin/logout", post(routes::auth::logout))
        .merge(admin_router(&state))
        .route("/health", get(routes::health::health_ping))
        .route("/health/database", get(routes::health::health_database))
        .nest_service("/uploads", uploads)
        .with_state(state)
        .layer(logging::middleware::propagate_request_id_layer())
        .layer(middleware::from_fn(logging::middleware::log_request))
        .layer(logging::middleware::request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(RequestBodyLimitLayer::new(routes::upload::MAX_BODY_SIZE))
        .layer(cors)
}

/// Without a database there is nowhere to provision admins, so the
/// in-memory store gets the account from `ADMIN_EMAIL` / `ADMIN_PASSWORD`.
async fn bootstrap_admin(store: &ContentStore, config: &AppConfig) -> Result<(), AppError> {
    let Some((email, password)) = config.bootstrap_admin.clone() else {
        tracing::warn!("No ADMIN_EMAIL/ADMIN_PASSWORD set; admin login is unavailable");
        return Ok(());
    };

    let password_hash =
        tokio::task::spawn_blocking(move || bcrypt::hash(&password, bcrypt::DEFAULT_COST))
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?
            .map_err(|e| AppError::Internal(e.to_string()))?;

    let admin = store
        .upsert_admin(db::models::NewAdmin {
            email: email.trim().to_lowercase(),
            password_hash,
            name: None,
        })
        .await?;
    tracing::info!("Bootstrap admin ready: {}", admin.email);
    Ok(())
}

/// Run the server (used by main).
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let _log_guards = logging::init(&logging::LogConfig::from_env());

    routes::health::init_start_time();

    let config = AppConfig::from_env();
    config.check_secret()?;

    let store = match ContentStore::connect(config.database.clone()).await {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to initialize content store: {}", e);
            return Err(e.into());
        }
    };
    tracing::info!("Content store ready ({})", store.backend());

    if let ContentStore::Memory(_) = store {
        bootstrap_admin(&store, &config).await?;
    }

    let addr = config.bind_addr()?;
    let app = create_app(AppState::new(store, config));

    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
