//! Error types for rule resolution, dispatch and message rendering.

use crate::target::Target;
use thiserror::Error;

/// Boxed error used at the seams where foreign code (validators, factories,
/// inspection) can fail in arbitrary ways.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias for validation calls.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that abort a whole validation call.
///
/// A call either returns a complete [`ViolationSet`](crate::ViolationSet) or one
/// of these; partial results are never returned.
#[derive(Debug, Error)]
pub enum Error {
    /// A descriptor named a validator that could not be constructed.
    #[error(transparent)]
    Resolution(#[from] RuleResolutionError),

    /// Strict mode found a member without any rule.
    #[error(transparent)]
    StrictMode(#[from] StrictModeViolation),

    /// Reading a value or running a validator failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl Error {
    /// Returns true if this is a strict mode failure.
    pub fn is_strict_mode(&self) -> bool {
        matches!(self, Error::StrictMode(_))
    }
}

/// A descriptor referenced a validator that could not be produced.
///
/// A descriptor without any validator reference is not an error; it simply
/// is not a rule.
#[derive(Debug, Error)]
pub enum RuleResolutionError {
    /// No factory is registered under the reference.
    #[error("rule `{kind}` references validator `{reference}`, which is not registered")]
    Unregistered { kind: String, reference: String },

    /// The factory failed to build the validator.
    #[error("failed to construct validator `{reference}` for rule `{kind}`: {source}")]
    Construction {
        kind: String,
        reference: String,
        #[source]
        source: BoxError,
    },
}

/// Strict mode required a rule on `target` and found none.
#[derive(Debug, Clone, Error)]
#[error("strict mode is on, but {target} did not carry a validation rule")]
pub struct StrictModeViolation {
    /// The member that carried no rule.
    pub target: Target,
}

/// Catch-all for unexpected failures while reading values or running validators.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Description of the failure.
    pub message: String,
    #[source]
    source: Option<BoxError>,
}

impl ValidationError {
    /// Create a validation error with a message and no cause.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create a validation error with a message and an underlying cause.
    pub fn with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Wrap an arbitrary error.
    ///
    /// An error that already is a `ValidationError` is returned unchanged.
    pub fn wrap(error: BoxError) -> Self {
        match error.downcast::<ValidationError>() {
            Ok(inner) => *inner,
            Err(other) => Self {
                message: other.to_string(),
                source: Some(other),
            },
        }
    }
}

impl From<AccessError> for ValidationError {
    fn from(error: AccessError) -> Self {
        Self::with_source(error.to_string(), error)
    }
}

/// Failure while inspecting a subject.
#[derive(Debug, Error)]
pub enum AccessError {
    /// The type declares no such field or accessor.
    #[error("type `{type_name}` has no readable member `{member}`")]
    NoSuchMember { type_name: String, member: String },

    /// The member could not be converted into a value.
    #[error("failed to read `{member}`: {source}")]
    Serialize {
        member: String,
        #[source]
        source: serde_json::Error,
    },

    /// Any other failure raised by the subject.
    #[error("failed to read `{member}`: {source}")]
    Failed {
        member: String,
        #[source]
        source: BoxError,
    },
}

impl AccessError {
    /// Shorthand for [`AccessError::NoSuchMember`].
    pub fn no_such_member(type_name: impl Into<String>, member: impl Into<String>) -> Self {
        Self::NoSuchMember {
            type_name: type_name.into(),
            member: member.into(),
        }
    }

    /// Shorthand for [`AccessError::Serialize`].
    pub fn serialize(member: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialize {
            member: member.into(),
            source,
        }
    }
}

/// Failure while rendering a message template.
#[derive(Debug, Error)]
pub enum InterpolationError {
    /// The template ended inside `${...`.
    #[error("unterminated expression: {fragment}")]
    Unterminated {
        /// The open fragment, starting at the `${` marker.
        fragment: String,
    },

    /// The expression did not start with a bound identifier.
    #[error("unknown identifier `{identifier}` in expression `{expression}`")]
    UnknownIdentifier {
        identifier: String,
        expression: String,
    },

    /// Evaluating the expression failed.
    #[error("failed to evaluate `{expression}`: {source}")]
    Evaluation {
        expression: String,
        #[source]
        source: BoxError,
    },
}

/// The catalog has no template for a message key.
#[derive(Debug, Clone, Error)]
#[error("no message for key `{key}` in locale `{locale}`")]
pub struct MissingMessageError {
    pub key: String,
    pub locale: String,
}

/// Errors surfaced when rendering a localized violation message.
#[derive(Debug, Error)]
pub enum MessageError {
    #[error(transparent)]
    Missing(#[from] MissingMessageError),

    #[error(transparent)]
    Interpolation(#[from] InterpolationError),
}
