use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{FormError, FormMode, FormPhase};
use crate::content::{derive_slug, Localized, LocalizedVariant};
use crate::db::models::{Article, Category};
use crate::i18n::Language;

/// Body sent to `POST /api/admin/articles` or `PUT /api/admin/articles/{slug}`.
///
/// `id` is only present when creating; the slug cannot change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticlePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub category: String,
    pub category_id: Uuid,
    pub description: String,
    pub content: String,
    pub image_url: String,
    pub seo_title: String,
    pub seo_description: String,
    pub seo_keywords: Vec<String>,
    pub localized: Localized,
}

/// Editable fields of the article form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleDraft {
    pub slug: String,
    pub title_en: String,
    pub title_vi: String,
    pub desc_en: String,
    pub desc_vi: String,
    pub content_en: String,
    pub content_vi: String,
    pub image_url: String,
    pub category_id: Option<Uuid>,
    pub seo_title: String,
    pub seo_description: String,
    /// Comma-separated, as typed
    pub seo_keywords: String,
}

impl ArticleDraft {
    /// Slug source: English title, or the Vietnamese one while English is empty.
    fn slug_source(&self) -> &str {
        if self.title_en.trim().is_empty() {
            &self.title_vi
        } else {
            &self.title_en
        }
    }

    fn keywords(&self) -> Vec<String> {
        self.seo_keywords
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleForm {
    phase: FormPhase,
    draft: ArticleDraft,
    slug_touched: bool,
    alert: Option<String>,
}

impl ArticleForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &FormPhase {
        &self.phase
    }

    pub fn draft(&self) -> &ArticleDraft {
        &self.draft
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn slug_touched(&self) -> bool {
        self.slug_touched
    }

    pub fn open_create(&mut self) {
        self.reset();
        self.phase = FormPhase::Composing {
            mode: FormMode::Create,
        };
    }

    /// Pre-fill from an existing article. Localized variants win over the
    /// canonical fields; the category falls back to a lookup by name.
    pub fn open_edit(&mut self, article: &Article, categories: &[Category]) {
        let en = article.localized.get(Language::En);
        let vi = article.localized.get(Language::Vi);
        let pick = |value: Option<&String>, fallback: &str| -> String {
            value
                .filter(|v| !v.is_empty())
                .cloned()
                .unwrap_or_else(|| fallback.to_string())
        };

        let category_id = article.category_id.or_else(|| {
            categories
                .iter()
                .find(|c| c.name == article.category)
                .map(|c| c.id)
        });

        self.draft = ArticleDraft {
            slug: article.slug.clone(),
            title_en: pick(en.map(|v| &v.title), &article.title),
            title_vi: pick(vi.map(|v| &v.title), ""),
            desc_en: pick(en.map(|v| &v.desc), &article.description),
            desc_vi: pick(vi.map(|v| &v.desc), ""),
            content_en: pick(
                en.map(|v| &v.content),
                article.content.as_deref().unwrap_or_default(),
            ),
            content_vi: pick(vi.map(|v| &v.content), ""),
            image_url: article.image_url.clone(),
            category_id,
            seo_title: article.seo_title.clone().unwrap_or_default(),
            seo_description: article.seo_description.clone().unwrap_or_default(),
            seo_keywords: article.seo_keywords.join(", "),
        };
        self.slug_touched = true;
        self.alert = None;
        self.phase = FormPhase::Composing {
            mode: FormMode::Edit(article.slug.clone()),
        };
    }

    pub fn cancel(&mut self) {
        self.reset();
    }

    fn composing_mode(&self) -> Result<&FormMode, FormError> {
        match &self.phase {
            FormPhase::Composing { mode } => Ok(mode),
            _ => Err(FormError::NotComposing),
        }
    }

    /// Title keystroke. Recomputes the slug until the slug was edited by hand.
    pub fn set_title(&mut self, lang: Language, text: &str) -> Result<(), FormError> {
        let creating = matches!(self.composing_mode()?, FormMode::Create);
        match lang {
            Language::En => self.draft.title_en = text.to_string(),
            Language::Vi => self.draft.title_vi = text.to_string(),
        }
        if creating && !self.slug_touched {
            self.draft.slug = derive_slug(self.draft.slug_source());
        }
        Ok(())
    }

    pub fn set_slug(&mut self, text: &str) -> Result<(), FormError> {
        if let FormMode::Edit(_) = self.composing_mode()? {
            return Err(FormError::SlugLocked);
        }
        self.draft.slug = derive_slug(text);
        self.slug_touched = true;
        Ok(())
    }

    pub fn set_description(&mut self, lang: Language, text: &str) -> Result<(), FormError> {
        self.composing_mode()?;
        match lang {
            Language::En => self.draft.desc_en = text.to_string(),
            Language::Vi => self.draft.desc_vi = text.to_string(),
        }
        Ok(())
    }

    pub fn set_content(&mut self, lang: Language, html: &str) -> Result<(), FormError> {
        self.composing_mode()?;
        match lang {
            Language::En => self.draft.content_en = html.to_string(),
            Language::Vi => self.draft.content_vi = html.to_string(),
        }
        Ok(())
    }

    pub fn set_image_url(&mut self, url: &str) -> Result<(), FormError> {
        self.composing_mode()?;
        self.draft.image_url = url.to_string();
        Ok(())
    }

    pub fn select_category(&mut self, id: Option<Uuid>) -> Result<(), FormError> {
        self.composing_mode()?;
        self.draft.category_id = id;
        Ok(())
    }

    pub fn set_seo(
        &mut self,
        title: &str,
        description: &str,
        keywords: &str,
    ) -> Result<(), FormError> {
        self.composing_mode()?;
        self.draft.seo_title = title.to_string();
        self.draft.seo_description = description.to_string();
        self.draft.seo_keywords = keywords.to_string();
        Ok(())
    }

    /// Validate and move to `Submitting`.
    ///
    /// The duplicate check only sees `loaded`; the store decides races.
    pub fn begin_submit(
        &mut self,
        loaded: &[Article],
        categories: &[Category],
    ) -> Result<ArticlePayload, FormError> {
        let mode = self.composing_mode()?.clone();
        match self.validate(&mode, loaded, categories) {
            Ok(payload) => {
                self.alert = None;
                self.phase = FormPhase::Submitting { mode };
                Ok(payload)
            }
            Err(err) => {
                self.alert = Some(err.to_string());
                Err(err)
            }
        }
    }

    fn validate(
        &self,
        mode: &FormMode,
        loaded: &[Article],
        categories: &[Category],
    ) -> Result<ArticlePayload, FormError> {
        let draft = &self.draft;
        let slug = draft.slug.trim();
        if slug.is_empty() {
            return Err(FormError::SlugRequired);
        }

        let category_id = draft.category_id.ok_or(FormError::CategoryRequired)?;
        let category = categories
            .iter()
            .find(|c| c.id == category_id)
            .ok_or(FormError::UnknownCategory)?;

        if *mode == FormMode::Create && loaded.iter().any(|a| a.slug == slug) {
            return Err(FormError::DuplicateSlug(slug.to_string()));
        }

        let localized = Localized::new(
            LocalizedVariant {
                title: draft.title_en.clone(),
                desc: draft.desc_en.clone(),
                cat: category.name.clone(),
                content: draft.content_en.clone(),
            },
            LocalizedVariant {
                title: draft.title_vi.clone(),
                desc: draft.desc_vi.clone(),
                cat: category.name.clone(),
                content: draft.content_vi.clone(),
            },
        );

        Ok(ArticlePayload {
            id: match mode {
                FormMode::Create => Some(slug.to_string()),
                FormMode::Edit(_) => None,
            },
            title: draft.title_en.clone(),
            category: category.name.clone(),
            category_id,
            description: draft.desc_en.clone(),
            content: draft.content_en.clone(),
            image_url: draft.image_url.clone(),
            seo_title: draft.seo_title.clone(),
            seo_description: draft.seo_description.clone(),
            seo_keywords: draft.keywords(),
            localized,
        })
    }

    /// Outcome of the request started by `begin_submit`.
    pub fn finish_submit(&mut self, result: Result<(), String>) -> Result<(), FormError> {
        let mode = match &self.phase {
            FormPhase::Submitting { mode } => mode.clone(),
            _ => return Err(FormError::NotSubmitting),
        };
        match result {
            Ok(()) => self.reset(),
            Err(message) => {
                self.alert = Some(message);
                self.phase = FormPhase::Composing { mode };
            }
        }
        Ok(())
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::render::tests::article;

    fn categories() -> Vec<Category> {
        vec![Category {
            id: Uuid::new_v4(),
            name: "Paid".to_string(),
            slug: "paid".to_string(),
            article_count: 0,
        }]
    }

    #[test]
    fn test_title_derives_slug_until_touched() {
        let mut form = ArticleForm::new();
        form.open_create();

        form.set_title(Language::Vi, "Quảng cáo Meta").unwrap();
        assert_eq!(form.draft().slug, "quang-cao-meta");

        form.set_title(Language::En, "Meta Ads 2026").unwrap();
        assert_eq!(form.draft().slug, "meta-ads-2026");

        form.set_slug("Custom Slug").unwrap();
        assert!(form.slug_touched());
        form.set_title(Language::En, "Something else").unwrap();
        assert_eq!(form.draft().slug, "custom-slug");
    }

    #[test]
    fn test_edits_rejected_while_idle() {
        let mut form = ArticleForm::new();
        assert_eq!(
            form.set_title(Language::En, "x"),
            Err(FormError::NotComposing)
        );
    }

    #[test]
    fn test_submit_checks_run_in_order() {
        let cats = categories();
        let mut form = ArticleForm::new();
        form.open_create();

        assert_eq!(form.begin_submit(&[], &cats), Err(FormError::SlugRequired));
        assert_eq!(form.alert(), Some("Slug is required"));

        form.set_title(Language::En, "Meta Ads").unwrap();
        assert_eq!(
            form.begin_submit(&[], &cats),
            Err(FormError::CategoryRequired)
        );

        form.select_category(Some(Uuid::new_v4())).unwrap();
        assert_eq!(
            form.begin_submit(&[], &cats),
            Err(FormError::UnknownCategory)
        );

        form.select_category(Some(cats[0].id)).unwrap();
        let existing = vec![article("meta-ads", "Meta Ads", "Paid")];
        assert!(matches!(
            form.begin_submit(&existing, &cats),
            Err(FormError::DuplicateSlug(_))
        ));
        assert!(matches!(form.phase(), FormPhase::Composing { .. }));
    }

    #[test]
    fn test_successful_submit_builds_payload_and_resets() {
        let cats = categories();
        let mut form = ArticleForm::new();
        form.open_create();
        form.set_title(Language::En, "Meta Ads").unwrap();
        form.set_title(Language::Vi, "Quảng cáo Meta").unwrap();
        form.set_description(Language::En, "Scaling").unwrap();
        form.select_category(Some(cats[0].id)).unwrap();
        form.set_seo("Meta", "Guide", "meta, ads, ").unwrap();

        let payload = form.begin_submit(&[], &cats).unwrap();
        assert_eq!(payload.id.as_deref(), Some("meta-ads"));
        assert_eq!(payload.category, "Paid");
        assert_eq!(payload.seo_keywords, vec!["meta", "ads"]);
        let vi = payload.localized.get(Language::Vi).unwrap();
        assert_eq!(vi.title, "Quảng cáo Meta");
        assert_eq!(vi.cat, "Paid");
        assert!(matches!(form.phase(), FormPhase::Submitting { .. }));

        form.finish_submit(Ok(())).unwrap();
        assert_eq!(form, ArticleForm::new());
    }

    #[test]
    fn test_failed_submit_returns_to_composing_with_alert() {
        let cats = categories();
        let mut form = ArticleForm::new();
        form.open_create();
        form.set_slug("meta-ads").unwrap();
        form.select_category(Some(cats[0].id)).unwrap();
        form.begin_submit(&[], &cats).unwrap();

        form.finish_submit(Err("Slug already exists".to_string()))
            .unwrap();
        assert_eq!(
            form.phase(),
            &FormPhase::Composing {
                mode: FormMode::Create
            }
        );
        assert_eq!(form.alert(), Some("Slug already exists"));
        assert_eq!(form.draft().slug, "meta-ads");
        assert_eq!(form.finish_submit(Ok(())), Err(FormError::NotSubmitting));
    }

    #[test]
    fn test_open_edit_prefills_and_locks_slug() {
        let cats = categories();
        let mut existing = article("meta-ads", "Meta Ads", "Paid");
        existing.content = Some("<p>Canonical</p>".to_string());
        existing.seo_keywords = vec!["meta".to_string(), "ads".to_string()];
        existing.localized = serde_json::from_value(serde_json::json!({
            "en": { "title": "", "desc": "", "cat": "Paid", "content": "" },
            "vi": { "title": "Quảng cáo Meta", "desc": "Mở rộng", "cat": "Trả phí", "content": "" }
        }))
        .unwrap();

        let mut form = ArticleForm::new();
        form.open_edit(&existing, &cats);

        let draft = form.draft();
        assert_eq!(draft.title_en, "Meta Ads");
        assert_eq!(draft.title_vi, "Quảng cáo Meta");
        assert_eq!(draft.content_en, "<p>Canonical</p>");
        assert_eq!(draft.category_id, Some(cats[0].id));
        assert_eq!(draft.seo_keywords, "meta, ads");

        assert_eq!(form.set_slug("renamed"), Err(FormError::SlugLocked));
        form.set_title(Language::En, "Renamed title").unwrap();
        assert_eq!(form.draft().slug, "meta-ads");

        // editing its own slug is not a duplicate
        let payload = form.begin_submit(&[existing], &cats).unwrap();
        assert!(payload.id.is_none());
    }
}
