use serde::{Deserialize, Serialize};

use super::{FormError, FormMode, FormPhase};
use crate::content::derive_slug;
use crate::db::models::Category;

/// Body sent to `POST /api/admin/categories`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPayload {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryForm {
    phase: FormPhase,
    name: String,
    slug: String,
    slug_touched: bool,
    alert: Option<String>,
}

impl CategoryForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &FormPhase {
        &self.phase
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    /// Categories are only ever created, never edited.
    pub fn open(&mut self) {
        *self = Self {
            phase: FormPhase::Composing {
                mode: FormMode::Create,
            },
            ..Self::default()
        };
    }

    fn ensure_composing(&self) -> Result<(), FormError> {
        match self.phase {
            FormPhase::Composing { .. } => Ok(()),
            _ => Err(FormError::NotComposing),
        }
    }

    pub fn set_name(&mut self, text: &str) -> Result<(), FormError> {
        self.ensure_composing()?;
        self.name = text.to_string();
        if !self.slug_touched {
            self.slug = derive_slug(text);
        }
        Ok(())
    }

    pub fn set_slug(&mut self, text: &str) -> Result<(), FormError> {
        self.ensure_composing()?;
        self.slug = derive_slug(text);
        self.slug_touched = true;
        Ok(())
    }

    pub fn begin_submit(&mut self) -> Result<CategoryPayload, FormError> {
        self.ensure_composing()?;

        let name = self.name.trim();
        let slug = self.slug.trim();
        let checked = if name.is_empty() || slug.is_empty() {
            Err(FormError::NameAndSlugRequired)
        } else {
            Ok(CategoryPayload {
                name: name.to_string(),
                slug: slug.to_string(),
            })
        };

        match checked {
            Ok(payload) => {
                self.alert = None;
                self.phase = FormPhase::Submitting {
                    mode: FormMode::Create,
                };
                Ok(payload)
            }
            Err(err) => {
                self.alert = Some(err.to_string());
                Err(err)
            }
        }
    }

    pub fn finish_submit(&mut self, result: Result<(), String>) -> Result<(), FormError> {
        if !matches!(self.phase, FormPhase::Submitting { .. }) {
            return Err(FormError::NotSubmitting);
        }
        match result {
            Ok(()) => *self = Self::default(),
            Err(message) => {
                self.alert = Some(message);
                self.phase = FormPhase::Composing {
                    mode: FormMode::Create,
                };
            }
        }
        Ok(())
    }

    /// Client-side guard mirroring the server's delete rule.
    pub fn check_delete(category: &Category) -> Result<(), FormError> {
        if category.article_count > 0 {
            return Err(FormError::CategoryInUse(category.article_count));
        }
        Ok(())
    }
}
