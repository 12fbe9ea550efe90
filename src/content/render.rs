//! Per-language rendering of articles for the public site.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::models::{Article, CategoryRef};
use crate::i18n::{Language, Translations};

/// How many other articles a detail page links to
pub const RELATED_LIMIT: usize = 2;

/// A display value tagged with the tier that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    FromLocalized(String),
    FromCanonical(String),
    FromStaticDefault(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Source {
    Localized,
    Canonical,
    StaticDefault,
}

impl Resolved {
    pub fn as_str(&self) -> &str {
        match self {
            Resolved::FromLocalized(s) | Resolved::FromCanonical(s) | Resolved::FromStaticDefault(s) => s,
        }
    }

    pub fn source(&self) -> Source {
        match self {
            Resolved::FromLocalized(_) => Source::Localized,
            Resolved::FromCanonical(_) => Source::Canonical,
            Resolved::FromStaticDefault(_) => Source::StaticDefault,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            Resolved::FromLocalized(s) | Resolved::FromCanonical(s) | Resolved::FromStaticDefault(s) => s,
        }
    }
}

/// Localized value when present and non-empty, else the canonical one.
fn prefer_localized(localized: Option<&str>, canonical: &str) -> Resolved {
    match localized {
        Some(value) if !value.trim().is_empty() => Resolved::FromLocalized(value.to_string()),
        _ => Resolved::FromCanonical(canonical.to_string()),
    }
}

pub fn resolve_title(article: &Article, lang: Language) -> Resolved {
    let variant = article.localized.get(lang);
    prefer_localized(variant.map(|v| v.title.as_str()), &article.title)
}

pub fn resolve_description(article: &Article, lang: Language) -> Resolved {
    let variant = article.localized.get(lang);
    prefer_localized(variant.map(|v| v.desc.as_str()), &article.description)
}

pub fn resolve_category(article: &Article, lang: Language) -> Resolved {
    let variant = article.localized.get(lang);
    prefer_localized(variant.map(|v| v.cat.as_str()), &article.category)
}

/// Body HTML: localized, then canonical, then a static block from the
/// translation table (`insights.items.<slug>.content`, else the generic
/// `insight_detail.fallback_content`).
pub fn resolve_content(article: &Article, lang: Language, translations: &Translations) -> Resolved {
    if let Some(content) = article
        .localized
        .get(lang)
        .map(|v| v.content.as_str())
        .filter(|c| !c.trim().is_empty())
    {
        return Resolved::FromLocalized(content.to_string());
    }

    if let Some(content) = article
        .content
        .as_deref()
        .filter(|c| !c.trim().is_empty())
    {
        return Resolved::FromCanonical(content.to_string());
    }

    let item_key = format!("insights.items.{}.content", article.slug);
    let fallback = match translations.resolve(lang, &item_key).as_text() {
        Some(text) => text.to_string(),
        None => translations.t(lang, "insight_detail.fallback_content"),
    };
    Resolved::FromStaticDefault(fallback)
}

/// Listing card
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayArticle {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_rel: Option<CategoryRef>,
    pub created_at: DateTime<Utc>,
}

impl DisplayArticle {
    pub fn render(article: &Article, lang: Language) -> Self {
        Self {
            id: article.slug.clone(),
            title: resolve_title(article, lang).into_string(),
            description: resolve_description(article, lang).into_string(),
            category: resolve_category(article, lang).into_string(),
            image_url: article.image_url.clone(),
            category_rel: article.category_rel.clone(),
            created_at: article.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSources {
    pub title: Source,
    pub description: Source,
    pub category: Source,
    pub content: Source,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoMeta {
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailLabels {
    pub back: String,
    pub related: String,
    pub reading_time: String,
}

/// Detail page
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleDetail {
    pub language: Language,
    #[serde(flatten)]
    pub article: DisplayArticle,
    pub content: String,
    pub sources: FieldSources,
    pub seo: SeoMeta,
    pub related: Vec<DisplayArticle>,
    pub labels: DetailLabels,
}

/// Render one article. `all` is the newest-first article list used for related links.
pub fn render_detail(
    article: &Article,
    all: &[Article],
    lang: Language,
    translations: &Translations,
) -> ArticleDetail {
    let title = resolve_title(article, lang);
    let description = resolve_description(article, lang);
    let category = resolve_category(article, lang);
    let content = resolve_content(article, lang, translations);

    let sources = FieldSources {
        title: title.source(),
        description: description.source(),
        category: category.source(),
        content: content.source(),
    };

    let seo = SeoMeta {
        title: non_empty(article.seo_title.as_deref()).unwrap_or(title.as_str()).to_string(),
        description: non_empty(article.seo_description.as_deref())
            .unwrap_or(description.as_str())
            .to_string(),
        keywords: article.seo_keywords.clone(),
        image: article.image_url.clone(),
    };

    let related = all
        .iter()
        .filter(|other| other.slug != article.slug)
        .take(RELATED_LIMIT)
        .map(|other| DisplayArticle::render(other, lang))
        .collect();

    let labels = DetailLabels {
        back: translations.t(lang, "insight_detail.back"),
        related: translations.t(lang, "insight_detail.related"),
        reading_time: translations.t(lang, "insight_detail.reading_time"),
    };

    ArticleDetail {
        language: lang,
        article: DisplayArticle {
            id: article.slug.clone(),
            title: title.into_string(),
            description: description.into_string(),
            category: category.into_string(),
            image_url: article.image_url.clone(),
            category_rel: article.category_rel.clone(),
            created_at: article.created_at,
        },
        content: content.into_string(),
        sources,
        seo,
        related,
        labels,
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
