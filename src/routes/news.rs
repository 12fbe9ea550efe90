/**
 * News Routes
 * Public listing and detail, rendered for one language
 */
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::content::{build_listing, render_detail, ArticleDetail, Listing, ListingQuery};
use crate::error::AppError;
use crate::i18n::Language;
use crate::AppState;

/// Query parameters for GET /api/news
#[derive(Debug, Default, Deserialize)]
pub struct NewsQuery {
    pub lang: Option<String>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub page: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LangQuery {
    pub lang: Option<String>,
}

fn language(raw: Option<&str>) -> Language {
    raw.map(Language::from_code).unwrap_or_default()
}

/// GET /api/news?lang=&search=&category=&page=
pub async fn list_news(
    State(state): State<AppState>,
    Query(query): Query<NewsQuery>,
) -> Result<Json<Listing>, AppError> {
    let lang = language(query.lang.as_deref());
    let listing_query = ListingQuery {
        search: query.search.unwrap_or_default(),
        category: query.category,
        page: query.page.unwrap_or(1),
    };

    let articles = state.store.list_articles().await?;
    Ok(Json(build_listing(
        &articles,
        &listing_query,
        lang,
        &state.translations,
    )))
}

/// GET /api/news/{slug}?lang=
pub async fn news_detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<LangQuery>,
) -> Result<Json<ArticleDetail>, AppError> {
    let lang = language(query.lang.as_deref());
    let article = state.store.get_article(&slug).await?;
    let all = state.store.list_articles().await?;

    Ok(Json(render_detail(&article, &all, lang, &state.translations)))
}

#[cfg(test)]
mod tests {
    use crate::content::{Localized, LocalizedVariant};
    use crate::create_app;
    use crate::db::models::{ArticleFields, NewArticle};
    use crate::routes::testing::{self, send};
    use crate::AppState;
    use axum::http::StatusCode;

    async fn seed(state: &AppState, count: usize) {
        for i in 1..=count {
            state
                .store
                .create_article(NewArticle {
                    slug: format!("article-{}", i),
                    fields: ArticleFields {
                        title: format!("Article {}", i),
                        category: if i % 2 == 0 { "Viral" } else { "Paid" }.to_string(),
                        description: "Canonical description".to_string(),
                        localized: Localized::new(
                            LocalizedVariant::default(),
                            LocalizedVariant {
                                title: format!("Bài viết {}", i),
                                ..Default::default()
                            },
                        ),
                        ..Default::default()
                    },
                })
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_listing_paginates_and_clamps() {
        let state = testing::state();
        seed(&state, 13).await;

        let (status, page3) = send(create_app(state.clone()), testing::get("/api/news?page=3")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page3["items"].as_array().unwrap().len(), 1);
        assert_eq!(page3["totalPages"], 3);
        assert_eq!(page3["totalItems"], 13);

        let (_, page0) = send(create_app(state.clone()), testing::get("/api/news?page=0")).await;
        assert_eq!(page0["page"], 1);
        assert_eq!(page0["items"].as_array().unwrap().len(), 6);

        let (_, page4) = send(create_app(state), testing::get("/api/news?page=4")).await;
        assert_eq!(page4["page"], 3);
    }

    #[tokio::test]
    async fn test_listing_language_fallback_and_filter() {
        let state = testing::state();
        seed(&state, 3).await;

        let (_, vi) = send(create_app(state.clone()), testing::get("/api/news")).await;
        assert_eq!(vi["language"], "vi");
        assert_eq!(vi["items"][0]["title"], "Bài viết 3");
        assert_eq!(vi["headings"]["title"], "Nhật ký Kỹ thuật số");

        let (_, en) = send(
            create_app(state.clone()),
            testing::get("/api/news?lang=EN&category=Paid&search=article"),
        )
        .await;
        let titles: Vec<&str> = en["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, vec!["Article 3", "Article 1"]);
        assert_eq!(en["categories"], serde_json::json!(["Paid", "Viral"]));
    }

    #[tokio::test]
    async fn test_detail_renders_and_unknown_is_404() {
        let state = testing::state();
        seed(&state, 3).await;

        let (status, detail) =
            send(create_app(state.clone()), testing::get("/api/news/article-2?lang=vi")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(detail["title"], "Bài viết 2");
        assert_eq!(detail["sources"]["title"], "localized");
        assert_eq!(detail["sources"]["content"], "staticDefault");
        assert_eq!(detail["seo"]["title"], "Bài viết 2");
        assert_eq!(detail["related"].as_array().unwrap().len(), 2);

        let (status, _) = send(create_app(state), testing::get("/api/news/missing")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
