//! Per-language display bundles attached to an article.
//!
//! Written as a strict `{en, vi}` object (both languages, four string fields
//! each) and read leniently: a stored value that does not decode becomes an
//! empty map instead of failing the read.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;
use crate::i18n::Language;

/// Display strings for one language
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LocalizedVariant {
    pub title: String,
    pub desc: String,
    pub cat: String,
    pub content: String,
}

/// Language-keyed variants; serializes as a plain JSON object (`{}` when empty).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Localized(BTreeMap<Language, LocalizedVariant>);

/// Shape accepted on write. Unknown language keys are rejected.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct StrictLocalized {
    en: LocalizedVariant,
    vi: LocalizedVariant,
}

impl Localized {
    pub fn new(en: LocalizedVariant, vi: LocalizedVariant) -> Self {
        let mut map = BTreeMap::new();
        map.insert(Language::En, en);
        map.insert(Language::Vi, vi);
        Self(map)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, lang: Language) -> Option<&LocalizedVariant> {
        self.0.get(&lang)
    }

    pub fn variants_mut(&mut self) -> impl Iterator<Item = &mut LocalizedVariant> {
        self.0.values_mut()
    }

    /// Validate a client-supplied value before it is stored.
    pub fn from_write(value: Value) -> Result<Self, AppError> {
        let strict: StrictLocalized = serde_json::from_value(value).map_err(|e| {
            AppError::Validation(format!(
                "localized must contain en and vi with title, desc, cat and content: {}",
                e
            ))
        })?;
        Ok(Self::new(strict.en, strict.vi))
    }

    /// Decode a stored column value. Anything malformed degrades to empty.
    pub fn from_stored(value: Option<Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::empty(),
            // Legacy rows kept the blob as JSON-encoded text
            Some(Value::String(raw)) => match serde_json::from_str::<Value>(&raw) {
                Ok(inner) => Self::from_stored(Some(inner)),
                Err(e) => {
                    tracing::warn!("Discarding undecodable localized text: {}", e);
                    Self::empty()
                }
            },
            Some(other) => serde_json::from_value(other).unwrap_or_else(|e| {
                tracing::warn!("Discarding malformed localized value: {}", e);
                Self::empty()
            }),
        }
    }

    /// Encode for the `localized` column.
    pub fn to_stored(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Default::default()))
    }
}
