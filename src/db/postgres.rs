use sqlx::PgPool;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

use super::models::{
    Admin, Article, ArticleFields, ArticleRow, Category, Contact, ContactRow, NewAdmin,
    NewArticle, NewCategory, NewContact,
};
use super::StoreError;

/// Joined projection shared by every article read. `a` is the article source.
const ARTICLE_COLUMNS: &str = r#"
    a.slug, a.title, a.category, a.description, a.content, a.image_url, a.localized,
    a.seo_title, a.seo_description, a.seo_keywords, a.category_id,
    c.name AS category_rel_name, c.slug AS category_rel_slug,
    a.created_at, a.updated_at
"#;

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: Arc<PgPool>,
}

impl PgStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    pub async fn ping(&self) -> Result<Duration, StoreError> {
        let start = Instant::now();
        sqlx::query("SELECT 1").fetch_one(self.pool.as_ref()).await?;
        Ok(start.elapsed())
    }

    // ========================================================================
    // Articles
    // ========================================================================

    pub async fn list_articles(&self) -> Result<Vec<Article>, StoreError> {
        let sql = format!(
            "SELECT {} FROM articles a LEFT JOIN categories c ON c.id = a.category_id \
             ORDER BY a.created_at DESC",
            ARTICLE_COLUMNS
        );
        let rows = sqlx::query_as::<_, ArticleRow>(&sql)
            .fetch_all(self.pool.as_ref())
            .await?;
        Ok(rows.into_iter().map(Article::from).collect())
    }

    pub async fn get_article(&self, slug: &str) -> Result<Article, StoreError> {
        let sql = format!(
            "SELECT {} FROM articles a LEFT JOIN categories c ON c.id = a.category_id \
             WHERE a.slug = $1",
            ARTICLE_COLUMNS
        );
        sqlx::query_as::<_, ArticleRow>(&sql)
            .bind(slug)
            .fetch_optional(self.pool.as_ref())
            .await?
            .map(Article::from)
            .ok_or(StoreError::NotFound)
    }

    pub async fn create_article(&self, new: NewArticle) -> Result<Article, StoreError> {
        let NewArticle { slug, fields } = new;
        let sql = format!(
            r#"
            WITH a AS (
                INSERT INTO articles (slug, title, category, description, content, image_url,
                                      localized, seo_title, seo_description, seo_keywords,
                                      category_id, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, now(), now())
                RETURNING *
            )
            SELECT {} FROM a LEFT JOIN categories c ON c.id = a.category_id
            "#,
            ARTICLE_COLUMNS
        );

        sqlx::query_as::<_, ArticleRow>(&sql)
            .bind(&slug)
            .bind(&fields.title)
            .bind(&fields.category)
            .bind(&fields.description)
            .bind(&fields.content)
            .bind(&fields.image_url)
            .bind(stored_localized(&fields))
            .bind(&fields.seo_title)
            .bind(&fields.seo_description)
            .bind(&fields.seo_keywords)
            .bind(fields.category_id)
            .fetch_one(self.pool.as_ref())
            .await
            .map(Article::from)
            .map_err(|e| StoreError::classify(e, "Slug already exists"))
    }

    pub async fn update_article(
        &self,
        slug: &str,
        fields: ArticleFields,
    ) -> Result<Article, StoreError> {
        let sql = format!(
            r#"
            WITH a AS (
                UPDATE articles
                SET title = $1, category = $2, description = $3, content = $4, image_url = $5,
                    localized = $6, seo_title = $7, seo_description = $8, seo_keywords = $9,
                    category_id = $10, updated_at = now()
                WHERE slug = $11
                RETURNING *
            )
            SELECT {} FROM a LEFT JOIN categories c ON c.id = a.category_id
            "#,
            ARTICLE_COLUMNS
        );

        sqlx::query_as::<_, ArticleRow>(&sql)
            .bind(&fields.title)
            .bind(&fields.category)
            .bind(&fields.description)
            .bind(&fields.content)
            .bind(&fields.image_url)
            .bind(stored_localized(&fields))
            .bind(&fields.seo_title)
            .bind(&fields.seo_description)
            .bind(&fields.seo_keywords)
            .bind(fields.category_id)
            .bind(slug)
            .fetch_optional(self.pool.as_ref())
            .await
            .map_err(|e| StoreError::classify(e, "Slug already exists"))?
            .map(Article::from)
            .ok_or(StoreError::NotFound)
    }

    pub async fn delete_article(&self, slug: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM articles WHERE slug = $1")
            .bind(slug)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    // ========================================================================
    // Categories
    // ========================================================================

    pub async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT c.id, c.name, c.slug, COUNT(a.slug) AS article_count
            FROM categories c
            LEFT JOIN articles a ON a.category_id = c.id
            GROUP BY c.id, c.name, c.slug
            ORDER BY c.name ASC
            "#,
        )
        .fetch_all(self.pool.as_ref())
        .await?;
        Ok(categories)
    }

    pub async fn create_category(&self, new: NewCategory) -> Result<Category, StoreError> {
        sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, slug, created_at, updated_at)
            VALUES ($1, $2, now(), now())
            RETURNING id, name, slug, 0::BIGINT AS article_count
            "#,
        )
        .bind(&new.name)
        .bind(&new.slug)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| StoreError::classify(e, "Category name or slug already exists"))
    }

    pub async fn delete_category(&self, id: Uuid) -> Result<(), StoreError> {
        // Guard and delete are a single statement.
        let result = sqlx::query(
            r#"
            DELETE FROM categories c
            WHERE c.id = $1
              AND NOT EXISTS (SELECT 1 FROM articles a WHERE a.category_id = c.id)
            "#,
        )
        .bind(id)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| StoreError::classify(e, "Category is in use"))?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        let (exists, count): (bool, i64) = sqlx::query_as(
            r#"
            SELECT EXISTS (SELECT 1 FROM categories WHERE id = $1),
                   (SELECT COUNT(*) FROM articles WHERE category_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(self.pool.as_ref())
        .await?;

        match (exists, count) {
            (false, _) => Err(StoreError::NotFound),
            (true, count) if count > 0 => Err(StoreError::CategoryInUse { count }),
            (true, _) => Err(StoreError::Conflict(
                "Category changed during delete, try again".to_string(),
            )),
        }
    }

    // ========================================================================
    // Contacts
    // ========================================================================

    pub async fn list_contacts(&self) -> Result<Vec<Contact>, StoreError> {
        let rows = sqlx::query_as::<_, ContactRow>(
            r#"
            SELECT id, full_name, phone, email, note, status, created_at
            FROM contacts
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(self.pool.as_ref())
        .await?;
        Ok(rows.into_iter().map(Contact::from).collect())
    }

    pub async fn create_contact(&self, new: NewContact) -> Result<Contact, StoreError> {
        let row = sqlx::query_as::<_, ContactRow>(
            r#"
            INSERT INTO contacts (full_name, phone, email, note, status, created_at)
            VALUES ($1, $2, $3, $4, 'pending', now())
            RETURNING id, full_name, phone, email, note, status, created_at
            "#,
        )
        .bind(&new.full_name)
        .bind(&new.phone)
        .bind(&new.email)
        .bind(&new.note)
        .fetch_one(self.pool.as_ref())
        .await?;
        Ok(row.into())
    }

    // ========================================================================
    // Admins
    // ========================================================================

    pub async fn find_admin_by_email(&self, email: &str) -> Result<Option<Admin>, StoreError> {
        let admin = sqlx::query_as::<_, Admin>(
            "SELECT id, email, password_hash, name, created_at FROM admins WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(self.pool.as_ref())
        .await?;
        Ok(admin)
    }

    pub async fn upsert_admin(&self, new: NewAdmin) -> Result<Admin, StoreError> {
        let admin = sqlx::query_as::<_, Admin>(
            r#"
            INSERT INTO admins (email, password_hash, name, created_at, updated_at)
            VALUES ($1, $2, $3, now(), now())
            ON CONFLICT (email) DO UPDATE
                SET password_hash = EXCLUDED.password_hash,
                    name = COALESCE(EXCLUDED.name, admins.name),
                    updated_at = now()
            RETURNING id, email, password_hash, name, created_at
            "#,
        )
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.name)
        .fetch_one(self.pool.as_ref())
        .await?;
        Ok(admin)
    }
}

/// `localized` column value; an empty map is stored as NULL.
fn stored_localized(fields: &ArticleFields) -> Option<serde_json::Value> {
    if fields.localized.is_empty() {
        None
    } else {
        Some(fields.localized.to_stored())
    }
}
