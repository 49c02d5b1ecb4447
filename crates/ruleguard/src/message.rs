//! Message catalogs: localized templates keyed by message key.

use crate::error::MissingMessageError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Supplies message templates by key and locale.
pub trait MessageCatalog: Send + Sync {
    /// The template for `key` in `locale`. A missing entry is an error, never
    /// a silent default.
    fn template(&self, key: &str, locale: &str) -> Result<String, MissingMessageError>;
}

/// In-memory catalog.
///
/// Lookups walk the locale's parent chain: `de-CH` falls back to `de`, then to
/// the root locale `""` when the bundle has one. There is no fallback to
/// another language.
///
/// ## Example
///
/// ```rust
/// use ruleguard::{MessageBundle, MessageCatalog};
///
/// let bundle = MessageBundle::from_json(r#"{"en": {"not_null": "${problem.target.name} is required"}}"#).unwrap();
/// assert_eq!(bundle.template("not_null", "en-GB").unwrap(), "${problem.target.name} is required");
/// assert!(bundle.template("not_null", "fr").is_err());
///
/// let rooted = bundle.with("", "not_null", "required");
/// assert_eq!(rooted.template("not_null", "fr").unwrap(), "required");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageBundle {
    locales: HashMap<String, HashMap<String, String>>,
}

impl MessageBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `{"locale": {"key": "template"}}`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Add or replace one template.
    pub fn insert(
        &mut self,
        locale: impl Into<String>,
        key: impl Into<String>,
        template: impl Into<String>,
    ) -> &mut Self {
        self.locales
            .entry(locale.into())
            .or_default()
            .insert(key.into(), template.into());
        self
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(
        mut self,
        locale: impl Into<String>,
        key: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        self.insert(locale, key, template);
        self
    }

    /// Take every template from `other`, replacing clashes.
    pub fn merge(&mut self, other: MessageBundle) -> &mut Self {
        for (locale, templates) in other.locales {
            self.locales.entry(locale).or_default().extend(templates);
        }
        self
    }

    /// Locales with at least one template.
    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.locales.keys().map(String::as_str)
    }
}

impl MessageCatalog for MessageBundle {
    fn template(&self, key: &str, locale: &str) -> Result<String, MissingMessageError> {
        let mut current = Some(locale);
        while let Some(candidate) = current {
            if let Some(template) = self.locales.get(candidate).and_then(|t| t.get(key)) {
                return Ok(template.clone());
            }
            current = parent_locale(candidate);
        }

        Err(MissingMessageError {
            key: key.to_string(),
            locale: locale.to_string(),
        })
    }
}

/// `en-US` -> `en`, `zh_Hant_TW` -> `zh_Hant`, `en` -> root, root -> none.
fn parent_locale(locale: &str) -> Option<&str> {
    if locale.is_empty() {
        return None;
    }
    Some(locale.rfind(['-', '_']).map_or("", |pos| &locale[..pos]))
}
