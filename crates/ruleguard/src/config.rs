//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Configuration for a [`ValidationEngine`](crate::ValidationEngine).
///
/// Every field has a default so the struct can be embedded in a host's own
/// configuration file with only the keys it cares about.
///
/// ```rust
/// use ruleguard::EngineConfig;
///
/// let config: EngineConfig = serde_json::from_str(r#"{"strict": true}"#).unwrap();
/// assert!(config.strict);
/// assert!(config.cache_validators);
/// assert_eq!(config.accessor_prefixes, vec!["get".to_string()]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Strict mode for the `validate_*` calls that do not take an explicit flag.
    pub strict: bool,
    /// Memoize resolved validators by rule kind.
    pub cache_validators: bool,
    /// Name prefixes that make a method accessor-shaped for the default method
    /// filter.
    pub accessor_prefixes: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strict: false,
            cache_validators: true,
            accessor_prefixes: vec!["get".to_string()],
        }
    }
}
