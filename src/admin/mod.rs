//! Admin console state.
//!
//! Everything here is owned by the caller for the length of one admin
//! session: create an [`AdminConsole`] after login, drop it on logout.

pub mod article_form;
pub mod category_form;

use thiserror::Error;
use uuid::Uuid;

pub use article_form::{ArticleDraft, ArticleForm, ArticlePayload};
pub use category_form::{CategoryForm, CategoryPayload};

use crate::db::models::{Article, Category, Contact};
use crate::i18n::Language;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    /// Editing the article with this slug
    Edit(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FormPhase {
    #[default]
    Idle,
    Composing {
        mode: FormMode,
    },
    Submitting {
        mode: FormMode,
    },
}

/// Rejections raised before anything is sent; the message is the alert text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Form is not open")]
    NotComposing,

    #[error("No submission in progress")]
    NotSubmitting,

    #[error("Slug cannot be changed after creation")]
    SlugLocked,

    #[error("Slug is required")]
    SlugRequired,

    #[error("Please select a category")]
    CategoryRequired,

    #[error("Selected category no longer exists")]
    UnknownCategory,

    #[error("Slug \"{0}\" already exists. Please choose another one")]
    DuplicateSlug(String),

    #[error("Name and slug are required")]
    NameAndSlugRequired,

    #[error("Cannot delete category with {0} articles attached")]
    CategoryInUse(i64),
}

#[derive(Debug, Clone, Default)]
pub struct AdminConsole {
    pub language: Language,
    pub articles: Vec<Article>,
    pub categories: Vec<Category>,
    pub contacts: Vec<Contact>,
    pub article_form: ArticleForm,
    pub category_form: CategoryForm,
}

impl AdminConsole {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            ..Self::default()
        }
    }

    /// Replace every cache with a fresh fetch.
    pub fn load(&mut self, articles: Vec<Article>, categories: Vec<Category>, contacts: Vec<Contact>) {
        self.articles = articles;
        self.categories = categories;
        self.contacts = contacts;
    }

    /// Insert or replace by slug. New articles go first (newest first).
    pub fn apply_article_saved(&mut self, article: Article) {
        let previous_category = match self.articles.iter().position(|a| a.slug == article.slug) {
            Some(index) => {
                let old = std::mem::replace(&mut self.articles[index], article.clone());
                old.category_id
            }
            None => {
                self.articles.insert(0, article.clone());
                None
            }
        };

        if previous_category != article.category_id {
            self.adjust_count(previous_category, -1);
            self.adjust_count(article.category_id, 1);
        }
    }

    pub fn apply_article_deleted(&mut self, slug: &str) {
        if let Some(index) = self.articles.iter().position(|a| a.slug == slug) {
            let removed = self.articles.remove(index);
            self.adjust_count(removed.category_id, -1);
        }
    }

    pub fn apply_category_created(&mut self, category: Category) {
        self.categories.retain(|c| c.id != category.id);
        let at = self
            .categories
            .partition_point(|c| c.name < category.name);
        self.categories.insert(at, category);
    }

    pub fn apply_category_deleted(&mut self, id: Uuid) {
        self.categories.retain(|c| c.id != id);
    }

    /// Client-side delete guard using the cached count.
    pub fn check_category_delete(&self, id: Uuid) -> Result<(), FormError> {
        match self.categories.iter().find(|c| c.id == id) {
            Some(category) => CategoryForm::check_delete(category),
            None => Err(FormError::UnknownCategory),
        }
    }

    fn adjust_count(&mut self, id: Option<Uuid>, delta: i64) {
        if let Some(category) = id.and_then(|id| self.categories.iter_mut().find(|c| c.id == id)) {
            category.article_count = (category.article_count + delta).max(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::render::tests::article;

    fn category(name: &str, count: i64) -> Category {
        Category {
            id: Uuid::new_v4(),
            name: name.to_string(),
            slug: name.to_lowercase(),
            article_count: count,
        }
    }

    #[test]
    fn test_saved_article_patches_list_and_counts() {
        let paid = category("Paid", 0);
        let viral = category("Viral", 1);
        let mut console = AdminConsole::new(Language::Vi);
        let mut existing = article("old", "Old", "Viral");
        existing.category_id = Some(viral.id);
        console.load(vec![existing.clone()], vec![paid.clone(), viral.clone()], vec![]);

        let mut created = article("new", "New", "Paid");
        created.category_id = Some(paid.id);
        console.apply_article_saved(created);
        assert_eq!(console.articles[0].slug, "new");
        assert_eq!(console.categories[0].article_count, 1);

        // move "old" from Viral to Paid
        existing.category_id = Some(paid.id);
        console.apply_article_saved(existing);
        assert_eq!(console.articles.len(), 2);
        assert_eq!(console.categories[0].article_count, 2);
        assert_eq!(console.categories[1].article_count, 0);

        console.apply_article_deleted("new");
        assert_eq!(console.articles.len(), 1);
        assert_eq!(console.categories[0].article_count, 1);
    }

    #[test]
    fn test_category_patches_keep_name_order() {
        let mut console = AdminConsole::new(Language::En);
        console.load(vec![], vec![category("Alpha", 0), category("Gamma", 0)], vec![]);

        let beta = category("Beta", 0);
        console.apply_category_created(beta.clone());
        let names: Vec<&str> = console.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Beta", "Gamma"]);

        console.apply_category_deleted(beta.id);
        assert_eq!(console.categories.len(), 2);
    }

    #[test]
    fn test_category_delete_guard() {
        let busy = category("Busy", 3);
        let mut console = AdminConsole::new(Language::En);
        console.load(vec![], vec![busy.clone()], vec![]);
        assert_eq!(
            console.check_category_delete(busy.id),
            Err(FormError::CategoryInUse(3))
        );
        assert_eq!(
            console.check_category_delete(Uuid::new_v4()),
            Err(FormError::UnknownCategory)
        );
    }
}
