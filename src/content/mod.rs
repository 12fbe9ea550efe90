//! Article content: slugs, localized variants, public rendering.

pub mod listing;
pub mod localized;
pub mod render;
pub mod slug;

pub use listing::{build_listing, Listing, ListingQuery, ListingState, PAGE_SIZE};
pub use localized::{Localized, LocalizedVariant};
pub use render::{render_detail, ArticleDetail, DisplayArticle, Resolved};
pub use slug::{derive_slug, is_valid_slug};

/// Sanitize article HTML before it is stored.
pub fn sanitize_html(html: &str) -> String {
    ammonia::clean(html)
}
