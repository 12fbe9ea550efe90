pub mod memory;
pub mod models;
pub mod postgres;

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::OnceCell;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use models::{
    Admin, Article, ArticleFields, Category, Contact, NewAdmin, NewArticle, NewCategory,
    NewContact,
};

static DB_POOL: OnceCell<Arc<PgPool>> = OnceCell::const_new();

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgresql://localhost/insights".to_string()),
            max_connections: std::env::var("DB_POOL_MAX")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            min_connections: std::env::var("DB_POOL_MIN")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
            connect_timeout_secs: std::env::var("DB_CONNECT_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            idle_timeout_secs: std::env::var("DB_IDLE_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(300),
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("{0}")]
    Conflict(String),

    #[error("category still has {count} articles attached")]
    CategoryInUse { count: i64 },

    #[error("{0}")]
    InvalidReference(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Map constraint violations onto domain errors; everything else stays a database error.
    pub(crate) fn classify(err: sqlx::Error, conflict: &str) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                return StoreError::Conflict(conflict.to_string());
            }
            if db_err.is_foreign_key_violation() {
                return StoreError::InvalidReference("Unknown category".to_string());
            }
        }
        StoreError::Database(err)
    }
}

// ============================================================================
// Pool
// ============================================================================

/// Create the process-wide pool on first call; later calls reuse it.
pub async fn init_pool(config: Option<DbConfig>) -> Result<Arc<PgPool>, sqlx::Error> {
    DB_POOL
        .get_or_try_init(|| async move {
            let config = config.unwrap_or_default();

            tracing::info!("Initializing database connection pool...");
            tracing::debug!(
                "Database URL: {}",
                config.url.replace(
                    |c: char| !c.is_ascii_alphanumeric()
                        && c != ':'
                        && c != '/'
                        && c != '@'
                        && c != '.',
                    "*"
                )
            );

            let pool = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .min_connections(config.min_connections)
                .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
                .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
                .max_lifetime(Duration::from_secs(1800))
                .test_before_acquire(true)
                .connect(&config.url)
                .await?;

            sqlx::query("SELECT 1").fetch_one(&pool).await?;

            tracing::info!("Database connection pool initialized successfully");
            Ok::<_, sqlx::Error>(Arc::new(pool))
        })
        .await
        .cloned()
}

pub fn get_pool() -> Option<Arc<PgPool>> {
    DB_POOL.get().cloned()
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running database migrations...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS admins (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            email TEXT UNIQUE NOT NULL,
            password_hash TEXT NOT NULL,
            name TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
    "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS categories (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name TEXT UNIQUE NOT NULL,
            slug TEXT UNIQUE NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
    "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS articles (
            slug TEXT PRIMARY KEY,
            title TEXT NOT NULL DEFAULT '',
            category TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL DEFAULT '',
            content TEXT,
            image_url TEXT NOT NULL DEFAULT '',
            localized JSONB,
            seo_title TEXT,
            seo_description TEXT,
            seo_keywords TEXT[] NOT NULL DEFAULT '{}',
            category_id UUID REFERENCES categories(id) ON DELETE RESTRICT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
    "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_articles_created_at ON articles(created_at DESC)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_articles_category_id ON articles(category_id)")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS contacts (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            full_name TEXT NOT NULL,
            phone TEXT,
            email TEXT,
            note TEXT,
            status TEXT NOT NULL DEFAULT 'pending',
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
    "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_contacts_created_at ON contacts(created_at DESC)")
        .execute(pool)
        .await?;

    tracing::info!("Database migrations completed successfully");

    Ok(())
}

// ============================================================================
// Store
// ============================================================================

/// Data access for every persisted entity.
///
/// Postgres in deployments; the in-memory backend is used when no
/// `DATABASE_URL` is configured and throughout the tests.
#[derive(Debug, Clone)]
pub enum ContentStore {
    Postgres(PgStore),
    Memory(MemoryStore),
}

impl ContentStore {
    /// Connect to Postgres when a config is given, otherwise fall back to memory.
    pub async fn connect(config: Option<DbConfig>) -> Result<Self, sqlx::Error> {
        match config {
            Some(config) => {
                let pool = init_pool(Some(config)).await?;
                run_migrations(&pool).await?;
                Ok(ContentStore::Postgres(PgStore::new(pool)))
            }
            None => {
                tracing::info!("DATABASE_URL not set. Using in-memory content store.");
                Ok(ContentStore::Memory(MemoryStore::new()))
            }
        }
    }

    pub fn backend(&self) -> &'static str {
        match self {
            ContentStore::Postgres(_) => "postgres",
            ContentStore::Memory(_) => "memory",
        }
    }

    pub async fn ping(&self) -> Result<Duration, StoreError> {
        match self {
            ContentStore::Postgres(s) => s.ping().await,
            ContentStore::Memory(s) => s.ping().await,
        }
    }

    // ---- articles ----

    pub async fn list_articles(&self) -> Result<Vec<Article>, StoreError> {
        match self {
            ContentStore::Postgres(s) => s.list_articles().await,
            ContentStore::Memory(s) => s.list_articles().await,
        }
    }

    pub async fn get_article(&self, slug: &str) -> Result<Article, StoreError> {
        match self {
            ContentStore::Postgres(s) => s.get_article(slug).await,
            ContentStore::Memory(s) => s.get_article(slug).await,
        }
    }

    pub async fn create_article(&self, new: NewArticle) -> Result<Article, StoreError> {
        match self {
            ContentStore::Postgres(s) => s.create_article(new).await,
            ContentStore::Memory(s) => s.create_article(new).await,
        }
    }

    pub async fn update_article(
        &self,
        slug: &str,
        fields: ArticleFields,
    ) -> Result<Article, StoreError> {
        match self {
            ContentStore::Postgres(s) => s.update_article(slug, fields).await,
            ContentStore::Memory(s) => s.update_article(slug, fields).await,
        }
    }

    pub async fn delete_article(&self, slug: &str) -> Result<(), StoreError> {
        match self {
            ContentStore::Postgres(s) => s.delete_article(slug).await,
            ContentStore::Memory(s) => s.delete_article(slug).await,
        }
    }

    // ---- categories ----

    pub async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        match self {
            ContentStore::Postgres(s) => s.list_categories().await,
            ContentStore::Memory(s) => s.list_categories().await,
        }
    }

    pub async fn create_category(&self, new: NewCategory) -> Result<Category, StoreError> {
        match self {
            ContentStore::Postgres(s) => s.create_category(new).await,
            ContentStore::Memory(s) => s.create_category(new).await,
        }
    }

    /// Refuses with `CategoryInUse` while any article still points at it.
    pub async fn delete_category(&self, id: Uuid) -> Result<(), StoreError> {
        match self {
            ContentStore::Postgres(s) => s.delete_category(id).await,
            ContentStore::Memory(s) => s.delete_category(id).await,
        }
    }

    // ---- contacts ----

    pub async fn list_contacts(&self) -> Result<Vec<Contact>, StoreError> {
        match self {
            ContentStore::Postgres(s) => s.list_contacts().await,
            ContentStore::Memory(s) => s.list_contacts().await,
        }
    }

    pub async fn create_contact(&self, new: NewContact) -> Result<Contact, StoreError> {
        match self {
            ContentStore::Postgres(s) => s.create_contact(new).await,
            ContentStore::Memory(s) => s.create_contact(new).await,
        }
    }

    // ---- admins ----

    pub async fn find_admin_by_email(&self, email: &str) -> Result<Option<Admin>, StoreError> {
        match self {
            ContentStore::Postgres(s) => s.find_admin_by_email(email).await,
            ContentStore::Memory(s) => s.find_admin_by_email(email).await,
        }
    }

    pub async fn upsert_admin(&self, new: NewAdmin) -> Result<Admin, StoreError> {
        match self {
            ContentStore::Postgres(s) => s.upsert_admin(new).await,
            ContentStore::Memory(s) => s.upsert_admin(new).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_config_default_uses_env_or_fallback() {
        let config = DbConfig::default();
        assert!(config.max_connections >= 1);
        assert!(config.connect_timeout_secs >= 1);
        assert!(config.idle_timeout_secs >= 1);
        assert!(!config.url.is_empty());
    }

    #[test]
    fn test_get_pool_none_before_init() {
        assert!(get_pool().is_none());
    }

    #[tokio::test]
    async fn test_connect_without_config_uses_memory() {
        let store = ContentStore::connect(None).await.unwrap();
        assert_eq!(store.backend(), "memory");
        assert!(store.ping().await.is_ok());
    }

    #[test]
    fn test_classify_keeps_non_constraint_errors() {
        let err = StoreError::classify(sqlx::Error::RowNotFound, "dup");
        assert!(matches!(err, StoreError::Database(sqlx::Error::RowNotFound)));
    }
}
