/**
 * Category Routes
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::db::models::{Category, NewCategory};
use crate::error::AppError;
use crate::routes::SuccessResponse;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

/// GET /api/categories - ascending by name, with article counts
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(state.store.list_categories().await?))
}

/// POST /api/admin/categories
pub async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let name = payload.name.trim().to_string();
    let slug = payload.slug.trim().to_string();

    if name.is_empty() || slug.is_empty() {
        return Err(AppError::Validation("Name and slug are required".to_string()));
    }

    let category = state
        .store
        .create_category(NewCategory { name, slug })
        .await?;

    tracing::info!("Category created: {} ({})", category.name, category.id);
    Ok((StatusCode::CREATED, Json(category)))
}

/// DELETE /api/admin/categories/{id} - refused while articles reference it
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.store.delete_category(id).await?;
    tracing::info!("Category deleted: {}", id);
    Ok(Json(SuccessResponse { success: true }))
}
