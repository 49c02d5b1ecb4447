//! Rule descriptors: the declarative metadata attached to members.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Kind of the exempt-from-validation marker.
pub const EXEMPT: &str = "exempt";

/// Declarative metadata attached to a member.
///
/// A descriptor is a rule only when it carries a validator reference. Other
/// descriptors are plain metadata and are skipped by the engine, except for the
/// [`EXEMPT`] marker, which satisfies strict mode.
///
/// ## Example
///
/// ```rust
/// use ruleguard::RuleDescriptor;
///
/// let rule = RuleDescriptor::rule("min_length")
///     .param("value", 3)
///     .required(true)
///     .message_key("user.name.too_short");
///
/// assert_eq!(rule.validator.as_deref(), Some("min_length"));
/// assert_eq!(rule.param_as::<usize>("value").unwrap(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDescriptor {
    /// Declared rule type. Two descriptors of the same kind resolve to
    /// interchangeable validators.
    pub kind: String,
    /// Reference to a registered validator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validator: Option<String>,
    /// Message catalog key, defaults to the violation code when absent or empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_key: Option<String>,
    /// Whether an absent value violates the rule.
    #[serde(default)]
    pub required: bool,
    /// Rule specific parameters.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub params: Map<String, Value>,
}

impl RuleDescriptor {
    /// A rule whose validator reference is its own kind.
    pub fn rule(kind: impl Into<String>) -> Self {
        let kind = kind.into();
        Self {
            validator: Some(kind.clone()),
            ..Self::marker(kind)
        }
    }

    /// Metadata without a validator reference.
    pub fn marker(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            validator: None,
            message_key: None,
            required: false,
            params: Map::new(),
        }
    }

    /// The exempt-from-validation marker.
    pub fn exempt() -> Self {
        Self::marker(EXEMPT)
    }

    /// Point this descriptor at a different validator.
    pub fn validator(mut self, reference: impl Into<String>) -> Self {
        self.validator = Some(reference.into());
        self
    }

    /// Set the message key.
    pub fn message_key(mut self, key: impl Into<String>) -> Self {
        self.message_key = Some(key.into());
        self
    }

    /// Set whether an absent value is a violation.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Add a parameter. Values that fail to serialize are ignored.
    pub fn param(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.params.insert(key.into(), v);
        }
        self
    }

    /// Look up a raw parameter.
    pub fn parameter(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    /// Deserialize a parameter into `T`.
    pub fn param_as<T: DeserializeOwned>(&self, key: &str) -> Result<T, ParamError> {
        let value = self.params.get(key).ok_or_else(|| ParamError::Missing {
            kind: self.kind.clone(),
            key: key.to_string(),
        })?;
        serde_json::from_value(value.clone()).map_err(|source| ParamError::Invalid {
            kind: self.kind.clone(),
            key: key.to_string(),
            source,
        })
    }

    /// Deserialize an optional parameter, `None` when absent.
    pub fn param_opt<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ParamError> {
        if self.params.contains_key(key) {
            self.param_as(key).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Whether this is the exempt marker.
    pub fn is_exempt(&self) -> bool {
        self.kind == EXEMPT && self.validator.is_none()
    }

    /// Whether this descriptor names a validator at all.
    pub fn is_rule(&self) -> bool {
        self.validator.is_some()
    }
}

/// A descriptor parameter was missing or had the wrong shape.
#[derive(Debug, Error)]
pub enum ParamError {
    #[error("rule `{kind}` is missing parameter `{key}`")]
    Missing { kind: String, key: String },

    #[error("rule `{kind}` has an invalid `{key}` parameter: {source}")]
    Invalid {
        kind: String,
        key: String,
        #[source]
        source: serde_json::Error,
    },
}
