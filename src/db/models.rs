//! Database Models - structs representing database tables (used by sqlx/serde).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::content::localized::Localized;

// ============================================================================
// Articles
// ============================================================================

/// Category summary embedded in article reads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

/// Article ("insight") as returned to callers, `localized` already decoded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(rename = "id")]
    pub slug: String,
    pub title: String,
    pub category: String,
    pub description: String,
    pub content: Option<String>,
    pub image_url: String,
    #[serde(default)]
    pub localized: Localized,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    #[serde(default)]
    pub seo_keywords: Vec<String>,
    pub category_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_rel: Option<CategoryRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw `articles` row joined with its category
#[derive(Debug, Clone, FromRow)]
pub struct ArticleRow {
    pub slug: String,
    pub title: String,
    pub category: String,
    pub description: String,
    pub content: Option<String>,
    pub image_url: String,
    pub localized: Option<Value>,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub seo_keywords: Vec<String>,
    pub category_id: Option<Uuid>,
    pub category_rel_name: Option<String>,
    pub category_rel_slug: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ArticleRow> for Article {
    fn from(row: ArticleRow) -> Self {
        let category_rel = match (row.category_id, row.category_rel_name, row.category_rel_slug) {
            (Some(id), Some(name), Some(slug)) => Some(CategoryRef { id, name, slug }),
            _ => None,
        };

        Article {
            slug: row.slug,
            title: row.title,
            category: row.category,
            description: row.description,
            content: row.content,
            image_url: row.image_url,
            localized: Localized::from_stored(row.localized),
            seo_title: row.seo_title,
            seo_description: row.seo_description,
            seo_keywords: row.seo_keywords,
            category_id: row.category_id,
            category_rel,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Mutable article fields; an update replaces all of them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticleFields {
    pub title: String,
    pub category: String,
    pub description: String,
    pub content: Option<String>,
    pub image_url: String,
    pub localized: Localized,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub seo_keywords: Vec<String>,
    pub category_id: Option<Uuid>,
}

/// New article for insertion
#[derive(Debug, Clone, PartialEq)]
pub struct NewArticle {
    pub slug: String,
    pub fields: ArticleFields,
}

// ============================================================================
// Categories
// ============================================================================

/// Category with its reverse-relation count
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub article_count: i64,
}

/// New category for insertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub name: String,
    pub slug: String,
}

// ============================================================================
// Contacts
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    #[default]
    Pending,
    Resolved,
}

impl ContactStatus {
    pub fn from_db(raw: &str) -> Self {
        match raw {
            "resolved" => ContactStatus::Resolved,
            _ => ContactStatus::Pending,
        }
    }
}

/// Contact inquiry submitted from the public site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: Uuid,
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub note: Option<String>,
    pub status: ContactStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ContactRow {
    pub id: Uuid,
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub note: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<ContactRow> for Contact {
    fn from(row: ContactRow) -> Self {
        Contact {
            id: row.id,
            full_name: row.full_name,
            phone: row.phone,
            email: row.email,
            note: row.note,
            status: ContactStatus::from_db(&row.status),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub note: Option<String>,
}

// ============================================================================
// Admins
// ============================================================================

/// Admin account (credentials only; never serialized)
#[derive(Debug, Clone, FromRow)]
pub struct Admin {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
}
