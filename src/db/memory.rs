use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{
    Admin, Article, ArticleFields, Category, CategoryRef, Contact, ContactStatus, NewAdmin,
    NewArticle, NewCategory, NewContact,
};
use super::StoreError;

#[derive(Debug, Default)]
struct Tables {
    // Insertion order; reads sort as needed.
    articles: Vec<Article>,
    categories: Vec<CategoryRef>,
    contacts: Vec<Contact>,
    admins: Vec<Admin>,
}

impl Tables {
    fn category_ref(&self, id: Option<Uuid>) -> Option<CategoryRef> {
        id.and_then(|id| self.categories.iter().find(|c| c.id == id).cloned())
    }

    fn article_count(&self, category_id: Uuid) -> i64 {
        self.articles
            .iter()
            .filter(|a| a.category_id == Some(category_id))
            .count() as i64
    }

    fn check_category(&self, id: Option<Uuid>) -> Result<Option<CategoryRef>, StoreError> {
        match id {
            None => Ok(None),
            Some(_) => self
                .category_ref(id)
                .map(Some)
                .ok_or_else(|| StoreError::InvalidReference("Unknown category".to_string())),
        }
    }
}

/// In-process store with the same constraints as the Postgres schema.
///
/// Every write takes the single write lock, so check-then-insert sequences
/// are atomic.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn ping(&self) -> Result<Duration, StoreError> {
        let start = Instant::now();
        let _tables = self.tables.read().await;
        Ok(start.elapsed())
    }

    // ---- articles ----

    pub async fn list_articles(&self) -> Result<Vec<Article>, StoreError> {
        let tables = self.tables.read().await;
        let mut articles: Vec<Article> = tables.articles.iter().rev().cloned().collect();
        articles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(articles)
    }

    pub async fn get_article(&self, slug: &str) -> Result<Article, StoreError> {
        let tables = self.tables.read().await;
        tables
            .articles
            .iter()
            .find(|a| a.slug == slug)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    pub async fn create_article(&self, new: NewArticle) -> Result<Article, StoreError> {
        let mut tables = self.tables.write().await;

        if tables.articles.iter().any(|a| a.slug == new.slug) {
            return Err(StoreError::Conflict("Slug already exists".to_string()));
        }
        let category_rel = tables.check_category(new.fields.category_id)?;

        let now = Utc::now();
        let ArticleFields {
            title,
            category,
            description,
            content,
            image_url,
            localized,
            seo_title,
            seo_description,
            seo_keywords,
            category_id,
        } = new.fields;

        let article = Article {
            slug: new.slug,
            title,
            category,
            description,
            content,
            image_url,
            localized,
            seo_title,
            seo_description,
            seo_keywords,
            category_id,
            category_rel,
            created_at: now,
            updated_at: now,
        };
        tables.articles.push(article.clone());
        Ok(article)
    }

    pub async fn update_article(
        &self,
        slug: &str,
        fields: ArticleFields,
    ) -> Result<Article, StoreError> {
        let mut tables = self.tables.write().await;
        let category_rel = tables.check_category(fields.category_id)?;

        let article = tables
            .articles
            .iter_mut()
            .find(|a| a.slug == slug)
            .ok_or(StoreError::NotFound)?;

        article.title = fields.title;
        article.category = fields.category;
        article.description = fields.description;
        article.content = fields.content;
        article.image_url = fields.image_url;
        article.localized = fields.localized;
        article.seo_title = fields.seo_title;
        article.seo_description = fields.seo_description;
        article.seo_keywords = fields.seo_keywords;
        article.category_id = fields.category_id;
        article.category_rel = category_rel;
        article.updated_at = Utc::now();

        Ok(article.clone())
    }

    pub async fn delete_article(&self, slug: &str) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let before = tables.articles.len();
        tables.articles.retain(|a| a.slug != slug);
        if tables.articles.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    // ---- categories ----

    pub async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let tables = self.tables.read().await;
        let mut categories: Vec<Category> = tables
            .categories
            .iter()
            .map(|c| Category {
                id: c.id,
                name: c.name.clone(),
                slug: c.slug.clone(),
                article_count: tables.article_count(c.id),
            })
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    pub async fn create_category(&self, new: NewCategory) -> Result<Category, StoreError> {
        let mut tables = self.tables.write().await;

        if tables
            .categories
            .iter()
            .any(|c| c.name == new.name || c.slug == new.slug)
        {
            return Err(StoreError::Conflict(
                "Category name or slug already exists".to_string(),
            ));
        }

        let category = CategoryRef {
            id: Uuid::new_v4(),
            name: new.name,
            slug: new.slug,
        };
        tables.categories.push(category.clone());

        Ok(Category {
            id: category.id,
            name: category.name,
            slug: category.slug,
            article_count: 0,
        })
    }

    pub async fn delete_category(&self, id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;

        if !tables.categories.iter().any(|c| c.id == id) {
            return Err(StoreError::NotFound);
        }
        let count = tables.article_count(id);
        if count > 0 {
            return Err(StoreError::CategoryInUse { count });
        }

        tables.categories.retain(|c| c.id != id);
        Ok(())
    }

    // ---- contacts ----

    pub async fn list_contacts(&self) -> Result<Vec<Contact>, StoreError> {
        let tables = self.tables.read().await;
        let mut contacts: Vec<Contact> = tables.contacts.iter().rev().cloned().collect();
        contacts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(contacts)
    }

    pub async fn create_contact(&self, new: NewContact) -> Result<Contact, StoreError> {
        let mut tables = self.tables.write().await;
        let contact = Contact {
            id: Uuid::new_v4(),
            full_name: new.full_name,
            phone: new.phone,
            email: new.email,
            note: new.note,
            status: ContactStatus::Pending,
            created_at: Utc::now(),
        };
        tables.contacts.push(contact.clone());
        Ok(contact)
    }

    // ---- admins ----

    pub async fn find_admin_by_email(&self, email: &str) -> Result<Option<Admin>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.admins.iter().find(|a| a.email == email).cloned())
    }

    pub async fn upsert_admin(&self, new: NewAdmin) -> Result<Admin, StoreError> {
        let mut tables = self.tables.write().await;

        if let Some(existing) = tables.admins.iter_mut().find(|a| a.email == new.email) {
            existing.password_hash = new.password_hash;
            if new.name.is_some() {
                existing.name = new.name;
            }
            return Ok(existing.clone());
        }

        let admin = Admin {
            id: Uuid::new_v4(),
            email: new.email,
            password_hash: new.password_hash,
            name: new.name,
            created_at: Utc::now(),
        };
        tables.admins.push(admin.clone());
        Ok(admin)
    }
}
