/**
 * Localization
 * Language codes and dotted-path lookup into the bundled translation table
 */
use serde::{Deserialize, Serialize};
use serde_json::Value;

lazy_static::lazy_static! {
    /// Translation table shipped with the binary (locales/translations.json)
    static ref BUNDLED: Translations = Translations::from_json(include_str!("../../locales/translations.json"))
        .unwrap_or_else(|e| {
            tracing::error!("Bundled translation table is invalid: {}", e);
            Translations::default()
        });
}

// ============================================================================
// Language
// ============================================================================

/// Display languages supported by the site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    #[default]
    Vi,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Vi => "vi",
        }
    }

    /// Parse a language code, falling back to the default for anything unknown.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" => Language::En,
            "vi" => Language::Vi,
            _ => Language::default(),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

// ============================================================================
// Lookup
// ============================================================================

/// Outcome of walking a dotted path through the table.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<'a> {
    /// Path ended on a string leaf
    Text(&'a str),
    /// Path ended on a nested table (or a non-string leaf)
    Table(&'a Value),
    /// Some segment was missing; carries the original path
    Unresolved(&'a str),
}

impl<'a> Lookup<'a> {
    pub fn as_text(&self) -> Option<&'a str> {
        match self {
            Lookup::Text(s) => Some(*s),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Translations {
    root: Value,
}

impl Translations {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        Ok(Self {
            root: serde_json::from_str(raw)?,
        })
    }

    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    pub fn bundled() -> &'static Translations {
        &BUNDLED
    }

    /// Walk `path` segment by segment under the table for `lang`.
    ///
    /// An empty path yields the language's root table.
    pub fn resolve<'a>(&'a self, lang: Language, path: &'a str) -> Lookup<'a> {
        let Some(mut node) = self.root.get(lang.code()) else {
            return Lookup::Unresolved(path);
        };

        if !path.is_empty() {
            for key in path.split('.') {
                match node.get(key) {
                    Some(next) => node = next,
                    None => return Lookup::Unresolved(path),
                }
            }
        }

        match node {
            Value::String(s) => Lookup::Text(s),
            other => Lookup::Table(other),
        }
    }

    /// String lookup; returns the path itself when it does not name a string.
    pub fn t(&self, lang: Language, path: &str) -> String {
        match self.resolve(lang, path) {
            Lookup::Text(s) => s.to_string(),
            _ => path.to_string(),
        }
    }
}
