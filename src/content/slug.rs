use regex::Regex;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

lazy_static::lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref NON_WORD: Regex = Regex::new(r"[^A-Za-z0-9_\-]+").unwrap();
    static ref HYPHEN_RUN: Regex = Regex::new(r"-{2,}").unwrap();

    /// Valid slug pattern: word characters separated by single hyphens
    static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9_]+(?:-[a-z0-9_]+)*$").unwrap();
}

/// Derive a URL slug from free text.
///
/// Lowercases, strips diacritics (NFD + combining marks), turns whitespace
/// runs into hyphens, drops anything that is not an ASCII word character or
/// hyphen, collapses hyphen runs and trims hyphens from both ends.
pub fn derive_slug(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped: String = lowered.nfd().filter(|c| !is_combining_mark(*c)).collect();
    let hyphenated = WHITESPACE.replace_all(&stripped, "-");
    let words = NON_WORD.replace_all(&hyphenated, "");
    let collapsed = HYPHEN_RUN.replace_all(&words, "-");
    collapsed.trim_matches('-').to_string()
}

/// Whether `slug` is already in canonical form.
pub fn is_valid_slug(slug: &str) -> bool {
    SLUG_REGEX.is_match(slug)
}
