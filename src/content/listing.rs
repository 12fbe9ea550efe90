//! Search, category filter and pagination over rendered articles.

use serde::{Deserialize, Serialize};

use super::render::{resolve_category, DisplayArticle};
use crate::db::models::Article;
use crate::i18n::{Language, Translations};

pub const PAGE_SIZE: usize = 6;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListingQuery {
    #[serde(default)]
    pub search: String,
    /// `None` (or empty) means all categories
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "first_page")]
    pub page: usize,
}

fn first_page() -> usize {
    1
}

impl ListingQuery {
    fn category_filter(&self) -> Option<&str> {
        self.category.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }

    /// Case-insensitive substring over title or description, AND the category
    /// filter against either the resolved label or the canonical name.
    pub fn matches(&self, article: &Article, card: &DisplayArticle) -> bool {
        let needle = self.search.trim().to_lowercase();
        let matches_search = needle.is_empty()
            || card.title.to_lowercase().contains(&needle)
            || card.description.to_lowercase().contains(&needle);

        let matches_category = match self.category_filter() {
            None => true,
            Some(category) => card.category == category || article.category == category,
        };

        matches_search && matches_category
    }
}

/// Caller-owned filter state. Changing the search or category returns to page 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingState {
    query: ListingQuery,
}

impl Default for ListingState {
    fn default() -> Self {
        Self {
            query: ListingQuery {
                page: 1,
                ..Default::default()
            },
        }
    }
}

impl ListingState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &ListingQuery {
        &self.query
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        let search = search.into();
        if search != self.query.search {
            self.query.search = search;
            self.query.page = 1;
        }
    }

    pub fn set_category(&mut self, category: Option<String>) {
        if category != self.query.category {
            self.query.category = category;
            self.query.page = 1;
        }
    }

    pub fn set_page(&mut self, page: usize) {
        self.query.page = page;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Page actually served after clamping
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    total_items.div_ceil(page_size).max(1)
}

/// Slice one page out of `items`; the requested page is clamped into range.
pub fn paginate<T: Clone>(items: &[T], requested: usize, page_size: usize) -> Page<T> {
    let total_pages = total_pages(items.len(), page_size);
    let page = requested.clamp(1, total_pages);
    let start = (page - 1) * page_size;

    Page {
        items: items.iter().skip(start).take(page_size).cloned().collect(),
        page,
        page_size,
        total_pages,
        total_items: items.len(),
    }
}

/// Distinct category labels in the given language, first-seen order.
pub fn category_chips(articles: &[Article], lang: Language) -> Vec<String> {
    let mut chips: Vec<String> = Vec::new();
    for article in articles {
        let label = resolve_category(article, lang).into_string();
        if !label.is_empty() && !chips.contains(&label) {
            chips.push(label);
        }
    }
    chips
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingHeadings {
    pub title: String,
    pub subtitle: String,
    pub search_placeholder: String,
    pub all_categories: String,
    pub no_results: String,
}

impl ListingHeadings {
    pub fn resolve(translations: &Translations, lang: Language) -> Self {
        Self {
            title: translations.t(lang, "news.title"),
            subtitle: translations.t(lang, "news.subtitle"),
            search_placeholder: translations.t(lang, "news.search_placeholder"),
            all_categories: translations.t(lang, "news.all_categories"),
            no_results: translations.t(lang, "news.no_results"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub language: Language,
    pub search: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub categories: Vec<String>,
    pub headings: ListingHeadings,
    #[serde(flatten)]
    pub page: Page<DisplayArticle>,
}

/// Render, filter and paginate. `articles` is expected newest first.
pub fn build_listing(
    articles: &[Article],
    query: &ListingQuery,
    lang: Language,
    translations: &Translations,
) -> Listing {
    let filtered: Vec<DisplayArticle> = articles
        .iter()
        .filter_map(|article| {
            let card = DisplayArticle::render(article, lang);
            query.matches(article, &card).then_some(card)
        })
        .collect();

    Listing {
        language: lang,
        search: query.search.clone(),
        category: query.category_filter().map(str::to_string),
        categories: category_chips(articles, lang),
        headings: ListingHeadings::resolve(translations, lang),
        page: paginate(&filtered, query.page, PAGE_SIZE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::render::tests::article;

    fn pair() -> Vec<Article> {
        let mut meta = article("meta-ads", "Meta Ads", "Paid");
        meta.description = "Scaling paid social".to_string();
        let mut tiktok = article("tiktok-growth", "TikTok Growth", "Viral");
        tiktok.description = "Short-form storytelling".to_string();
        vec![meta, tiktok]
    }

    fn query(search: &str, category: Option<&str>) -> ListingQuery {
        ListingQuery {
            search: search.to_string(),
            category: category.map(str::to_string),
            page: 1,
        }
    }

    fn ids(listing: &Listing) -> Vec<&str> {
        listing.page.items.iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn test_search_and_category_compose() {
        let t = Translations::bundled();
        let articles = pair();

        let hit = build_listing(&articles, &query("ads", Some("Paid")), Language::En, t);
        assert_eq!(ids(&hit), vec!["meta-ads"]);

        for category in [None, Some("Paid"), Some("Viral")] {
            let miss = build_listing(&articles, &query("zzz", category), Language::En, t);
            assert!(miss.page.items.is_empty());
            assert_eq!(miss.page.total_pages, 1);
        }

        let viral_ads = build_listing(&articles, &query("ads", Some("Viral")), Language::En, t);
        assert!(viral_ads.page.items.is_empty());
    }

    #[test]
    fn test_search_is_case_insensitive_over_description() {
        let t = Translations::bundled();
        let listing = build_listing(&pair(), &query("STORYTELLING", None), Language::En, t);
        assert_eq!(ids(&listing), vec!["tiktok-growth"]);
    }

    #[test]
    fn test_category_matches_localized_label_or_canonical_name() {
        let t = Translations::bundled();
        let mut articles = pair();
        articles[0].localized = serde_json::from_value(serde_json::json!({
            "vi": { "title": "Quảng cáo Meta", "desc": "", "cat": "Trả phí", "content": "" }
        }))
        .unwrap();

        let by_label = build_listing(&articles, &query("", Some("Trả phí")), Language::Vi, t);
        assert_eq!(ids(&by_label), vec!["meta-ads"]);

        let by_canonical = build_listing(&articles, &query("", Some("Paid")), Language::Vi, t);
        assert_eq!(ids(&by_canonical), vec!["meta-ads"]);

        assert_eq!(by_label.categories, vec!["Trả phí", "Viral"]);
    }

    #[test]
    fn test_thirteen_items_paginate_into_three_pages() {
        let items: Vec<u32> = (1..=13).collect();

        let third = paginate(&items, 3, PAGE_SIZE);
        assert_eq!(third.items, vec![13]);
        assert_eq!(third.total_pages, 3);

        let zero = paginate(&items, 0, PAGE_SIZE);
        assert_eq!(zero.page, 1);
        assert_eq!(zero.items, (1..=6).collect::<Vec<u32>>());

        let past_end = paginate(&items, 4, PAGE_SIZE);
        assert_eq!(past_end.page, 3);
        assert_eq!(past_end.items, vec![13]);
    }

    #[test]
    fn test_empty_result_is_single_empty_page() {
        let empty: Vec<u32> = Vec::new();
        let page = paginate(&empty, 5, PAGE_SIZE);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 1);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_state_resets_page_on_filter_change() {
        let mut state = ListingState::new();
        state.set_page(3);
        state.set_search("meta");
        assert_eq!(state.query().page, 1);

        state.set_page(2);
        state.set_search("meta");
        assert_eq!(state.query().page, 2, "unchanged search keeps the page");

        state.set_category(Some("Paid".to_string()));
        assert_eq!(state.query().page, 1);
    }

    #[test]
    fn test_headings_follow_language() {
        let t = Translations::bundled();
        assert_eq!(ListingHeadings::resolve(t, Language::En).title, "Digital Journal");
        assert_eq!(
            ListingHeadings::resolve(t, Language::Vi).title,
            "Nhật ký Kỹ thuật số"
        );
    }
}
