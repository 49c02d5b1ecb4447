//! The kind of member a rule is attached to.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The member a rule descriptor was attached to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Target {
    /// A declared field.
    Field { name: String },
    /// An accessor method.
    Method { name: String },
    /// A positional parameter of an operation.
    Parameter {
        method: String,
        index: usize,
        name: String,
    },
    /// The declaring type itself.
    Type { name: String },
}

impl Target {
    pub fn field(name: impl Into<String>) -> Self {
        Target::Field { name: name.into() }
    }

    pub fn method(name: impl Into<String>) -> Self {
        Target::Method { name: name.into() }
    }

    pub fn parameter(method: impl Into<String>, index: usize, name: impl Into<String>) -> Self {
        Target::Parameter {
            method: method.into(),
            index,
            name: name.into(),
        }
    }

    pub fn type_(name: impl Into<String>) -> Self {
        Target::Type { name: name.into() }
    }

    /// Name of the member (the parameter name for parameters).
    pub fn name(&self) -> &str {
        match self {
            Target::Field { name } | Target::Method { name } | Target::Type { name } => name,
            Target::Parameter { name, .. } => name,
        }
    }

    /// Lowercase kind label.
    pub fn kind(&self) -> &'static str {
        match self {
            Target::Field { .. } => "field",
            Target::Method { .. } => "method",
            Target::Parameter { .. } => "parameter",
            Target::Type { .. } => "type",
        }
    }

    /// Position of a parameter, `None` for every other target.
    pub fn index(&self) -> Option<usize> {
        match self {
            Target::Parameter { index, .. } => Some(*index),
            _ => None,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Field { name } => write!(f, "field `{}`", name),
            Target::Method { name } => write!(f, "method `{}`", name),
            Target::Parameter { method, index, .. } => {
                write!(f, "parameter {} on method `{}`", index, method)
            }
            Target::Type { name } => write!(f, "type `{}`", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameter_display() {
        let target = Target::parameter("transfer", 1, "amount");
        assert_eq!(target.to_string(), "parameter 1 on method `transfer`");
        assert_eq!(target.name(), "amount");
        assert_eq!(target.index(), Some(1));
    }

    #[test]
    fn serializes_with_kind_tag() {
        let json = serde_json::to_value(Target::field("email")).unwrap();
        assert_eq!(json["kind"], "field");
        assert_eq!(json["name"], "email");
    }
}
