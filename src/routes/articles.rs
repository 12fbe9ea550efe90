/**
 * Article Routes
 * Public reads and gated CRUD for insights
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::content::{is_valid_slug, sanitize_html, Localized};
use crate::db::models::{Article, ArticleFields, NewArticle};
use crate::error::AppError;
use crate::routes::SuccessResponse;
use crate::AppState;

// ============================================================================
// Request Types
// ============================================================================

/// Keywords arrive either as a list or as one comma-separated string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Keywords {
    List(Vec<String>),
    Text(String),
}

impl Keywords {
    fn into_vec(self) -> Vec<String> {
        let raw = match self {
            Keywords::List(items) => items,
            Keywords::Text(text) => text.split(',').map(str::to_string).collect(),
        };
        raw.into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect()
    }
}

/// Body for POST and PUT. `id` is the slug and only matters on create.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRequest {
    #[serde(default, alias = "slug")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub localized: Option<Value>,
    #[serde(default)]
    pub seo_title: Option<String>,
    #[serde(default)]
    pub seo_description: Option<String>,
    #[serde(default)]
    pub seo_keywords: Option<Keywords>,
    #[serde(default)]
    pub category_id: Option<Uuid>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ArticleRequest {
    /// Validate `localized` and sanitize every HTML body.
    fn into_fields(self) -> Result<ArticleFields, AppError> {
        let mut localized = match self.localized {
            None | Some(Value::Null) => Localized::empty(),
            Some(value) => Localized::from_write(value)?,
        };
        for variant in localized.variants_mut() {
            variant.content = sanitize_html(&variant.content);
        }

        Ok(ArticleFields {
            title: self.title.trim().to_string(),
            category: self.category.trim().to_string(),
            description: self.description,
            content: non_empty(self.content).map(|html| sanitize_html(&html)),
            image_url: self.image_url.trim().to_string(),
            localized,
            seo_title: non_empty(self.seo_title),
            seo_description: non_empty(self.seo_description),
            seo_keywords: self.seo_keywords.map(Keywords::into_vec).unwrap_or_default(),
            category_id: self.category_id,
        })
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/articles - newest first, with category
pub async fn list_articles(State(state): State<AppState>) -> Result<Json<Vec<Article>>, AppError> {
    Ok(Json(state.store.list_articles().await?))
}

/// GET /api/articles/{slug}
pub async fn get_article(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Article>, AppError> {
    Ok(Json(state.store.get_article(&slug).await?))
}

/// POST /api/admin/articles
pub async fn create_article(
    State(state): State<AppState>,
    Json(payload): Json<ArticleRequest>,
) -> Result<(StatusCode, Json<Article>), AppError> {
    let slug = payload
        .id
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_string();

    if slug.is_empty() {
        return Err(AppError::Validation("Slug is required".to_string()));
    }
    if !is_valid_slug(&slug) {
        return Err(AppError::Validation(
            "Slug may only contain lowercase letters, digits, underscores and single hyphens"
                .to_string(),
        ));
    }

    let fields = payload.into_fields()?;
    let article = state
        .store
        .create_article(NewArticle { slug, fields })
        .await?;

    tracing::info!("Article created: {}", article.slug);
    Ok((StatusCode::CREATED, Json(article)))
}

/// PUT /api/admin/articles/{slug} - full replace
pub async fn update_article(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(payload): Json<ArticleRequest>,
) -> Result<Json<Article>, AppError> {
    if let Some(id) = payload.id.as_deref().map(str::trim) {
        if !id.is_empty() && id != slug {
            return Err(AppError::Validation(
                "Slug cannot be changed after creation".to_string(),
            ));
        }
    }

    let fields = payload.into_fields()?;
    let article = state.store.update_article(&slug, fields).await?;

    tracing::info!("Article updated: {}", article.slug);
    Ok(Json(article))
}

/// DELETE /api/admin/articles/{slug}
pub async fn delete_article(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.store.delete_article(&slug).await?;
    tracing::info!("Article deleted: {}", slug);
    Ok(Json(SuccessResponse { success: true }))
}

#[cfg(test)]
mod tests {
    use crate::admin::{ArticleForm, CategoryForm};
    use crate::create_app;
    use crate::db::models::{Category, NewCategory};
    use crate::i18n::Language;
    use crate::routes::testing::{self, admin_state, send};
    use axum::http::StatusCode;
    use serde_json::json;

    const ARTICLES: &str = "/api/admin/articles";

    fn localized() -> serde_json::Value {
        json!({
            "en": { "title": "Meta Ads", "desc": "Scaling", "cat": "Paid", "content": "<p>Body</p><script>x()</script>" },
            "vi": { "title": "Quảng cáo Meta", "desc": "Mở rộng", "cat": "Trả phí", "content": "" }
        })
    }

    #[tokio::test]
    async fn test_create_then_read_back() {
        let (state, token) = admin_state().await;
        let body = json!({
            "id": "meta-ads",
            "title": "Meta Ads",
            "category": "Paid",
            "description": "Scaling",
            "content": "<p>Hi</p><script>alert(1)</script>",
            "imageUrl": "/uploads/a.png",
            "localized": localized(),
            "seoKeywords": "meta, ads"
        });

        let (status, created) =
            send(create_app(state.clone()), testing::json("POST", ARTICLES, Some(&token), &body)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["id"], "meta-ads");
        assert_eq!(created["content"], "<p>Hi</p>");
        assert_eq!(created["seoKeywords"], json!(["meta", "ads"]));
        assert_eq!(created["localized"]["vi"]["title"], "Quảng cáo Meta");
        assert_eq!(created["localized"]["en"]["content"], "<p>Body</p>");

        let (status, fetched) = send(create_app(state), testing::get("/api/articles/meta-ads")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["localized"], created["localized"]);
    }

    #[tokio::test]
    async fn test_create_validates_slug_and_localized() {
        let (state, token) = admin_state().await;
        let cases = [
            json!({ "title": "No slug" }),
            json!({ "id": "   " }),
            json!({ "id": "Not A Slug" }),
            json!({ "id": "trailing-" }),
            json!({ "id": "ok", "localized": { "en": { "title": "only en" } } }),
            json!({ "id": "ok", "localized": "text" }),
        ];
        for body in cases {
            let (status, response) =
                send(create_app(state.clone()), testing::json("POST", ARTICLES, Some(&token), &body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);
            assert!(response["error"].is_string());
        }
        let (_, list) = send(create_app(state), testing::get("/api/articles")).await;
        assert_eq!(list, json!([]));
    }

    #[tokio::test]
    async fn test_duplicate_slug_is_conflict_and_count_unchanged() {
        let (state, token) = admin_state().await;
        let body = json!({ "id": "meta-ads", "title": "Meta Ads" });

        let (status, _) =
            send(create_app(state.clone()), testing::json("POST", ARTICLES, Some(&token), &body)).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, response) =
            send(create_app(state.clone()), testing::json("POST", ARTICLES, Some(&token), &body)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(response["error"], "Slug already exists");

        let (_, list) = send(create_app(state), testing::get("/api/articles")).await;
        assert_eq!(list.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_category_id_is_bad_request() {
        let (state, token) = admin_state().await;
        let body = json!({ "id": "orphan", "categoryId": uuid::Uuid::new_v4() });
        let (status, _) =
            send(create_app(state), testing::json("POST", ARTICLES, Some(&token), &body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_replaces_and_delete_removes() {
        let (state, token) = admin_state().await;
        let create = json!({ "id": "meta-ads", "title": "Meta Ads", "content": "<p>old</p>" });
        send(create_app(state.clone()), testing::json("POST", ARTICLES, Some(&token), &create)).await;

        let update = json!({ "title": "Meta Ads 2026", "description": "New" });
        let (status, updated) = send(
            create_app(state.clone()),
            testing::json("PUT", "/api/admin/articles/meta-ads", Some(&token), &update),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["title"], "Meta Ads 2026");
        assert!(updated["content"].is_null(), "full replace clears omitted fields");

        let rename = json!({ "id": "other", "title": "x" });
        let (status, _) = send(
            create_app(state.clone()),
            testing::json("PUT", "/api/admin/articles/meta-ads", Some(&token), &rename),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            create_app(state.clone()),
            testing::json("PUT", "/api/admin/articles/missing", Some(&token), &update),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(
            create_app(state.clone()),
            testing::authed("DELETE", "/api/admin/articles/meta-ads", &token),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let (status, _) = send(
            create_app(state),
            testing::authed("DELETE", "/api/admin/articles/meta-ads", &token),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_admin_form_payload_is_accepted() {
        let (state, token) = admin_state().await;
        let paid: Category = state
            .store
            .create_category(NewCategory {
                name: "Paid".to_string(),
                slug: "paid".to_string(),
            })
            .await
            .unwrap();

        let mut form = ArticleForm::new();
        form.open_create();
        form.set_title(Language::En, "Meta Ads").unwrap();
        form.set_title(Language::Vi, "Quảng cáo Meta").unwrap();
        form.select_category(Some(paid.id)).unwrap();
        let payload = form.begin_submit(&[], std::slice::from_ref(&paid)).unwrap();

        let body = serde_json::to_value(&payload).unwrap();
        let (status, created) =
            send(create_app(state.clone()), testing::json("POST", ARTICLES, Some(&token), &body)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["categoryRel"]["name"], "Paid");
        form.finish_submit(Ok(())).unwrap();

        let categories = state.store.list_categories().await.unwrap();
        assert_eq!(categories[0].article_count, 1);
        assert!(CategoryForm::check_delete(&categories[0]).is_err());
    }
}
