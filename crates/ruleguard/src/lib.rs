//! # Ruleguard
//!
//! Declarative, metadata-driven validation. Rules are attached to struct
//! fields, accessor methods, operation parameters or the type itself; a
//! [`ValidationEngine`] walks the declared members, resolves each rule to a
//! [`Validator`], and collects every failure into a [`ViolationSet`].
//! Violations render into localized messages through a [`MessageCatalog`] and
//! an [`Interpolator`].
//!
//! ## Example
//!
//! ```rust
//! use ruleguard::prelude::*;
//!
//! #[derive(Inspect)]
//! struct CreateUser {
//!     #[rule(email(required = true))]
//!     email: String,
//!
//!     #[rule(length(min = 3, max = 50))]
//!     username: String,
//!
//!     #[rule(not_null)]
//!     password: Option<String>,
//!
//!     #[rule(match_field(value = "password"))]
//!     confirm: Option<String>,
//!
//!     #[rule(exempt)]
//!     nickname: Option<String>,
//! }
//!
//! let engine = ValidationEngine::standard();
//! let user = CreateUser {
//!     email: "bademail".into(),
//!     username: "al".into(),
//!     password: Some("hunter2".into()),
//!     confirm: Some("hunter2".into()),
//!     nickname: None,
//! };
//!
//! let results = engine.validate_fields_strict(&user).unwrap();
//! assert_eq!(results.len(), 2);
//!
//! let messages = ruleguard::rules::default_messages();
//! let rendered: Vec<String> = results
//!     .iter()
//!     .map(|v| v.localized_message(&messages, "en-US").unwrap())
//!     .collect();
//! assert_eq!(rendered[0], "bademail is not a valid email address");
//! assert_eq!(rendered[1], "username must be between 3 and 50 characters");
//! ```
//!
//! ## Rule attributes
//!
//! - `#[rule(kind)]` / `#[rule(kind(key = value, ...))]` - attach a rule;
//!   `validator`, `message_key` and `required` are reserved keys, every other
//!   key becomes a parameter
//! - `#[rule(exempt)]` - satisfy strict mode without a rule
//! - `#[meta(kind)]` - plain metadata, never resolved
//! - `#[inspect(skip)]` / `#[inspect(synthetic)]` - hide a field from validation
//!
//! ## Strict mode
//!
//! In strict mode every examined member must carry a rule or the exempt
//! marker, otherwise the call fails with [`StrictModeViolation`].

extern crate self as ruleguard;

mod config;
mod descriptor;
mod engine;
mod error;
mod filter;
mod inspect;
pub mod interpolate;
mod message;
mod metadata;
mod resolver;
pub mod rules;
mod target;
mod validator;
mod violation;

pub use config::EngineConfig;
pub use descriptor::{ParamError, RuleDescriptor, EXEMPT};
pub use engine::{ValidationEngine, ValidationEngineBuilder};
pub use error::{
    AccessError, BoxError, Error, InterpolationError, MessageError, MissingMessageError, Result,
    RuleResolutionError, StrictModeViolation, ValidationError,
};
pub use filter::{AllFields, AnyMethod, GetterFilter, MemberFilter};
pub use inspect::Inspect;
pub use interpolate::{AccessorChain, Evaluate, Interpolator, TemplateExpression};
pub use message::{MessageBundle, MessageCatalog};
pub use metadata::{Member, MemberKind, Operation, Parameter, TypeMetadata};
pub use resolver::{CachingResolver, RegistryResolver, RuleResolver, ValidatorFactory};
pub use target::Target;
pub use validator::{Outcome, PredicateFn, PredicateValidator, Validator};
pub use violation::{Violation, ViolationRecord, ViolationSet};

/// Derive [`Inspect`] from `#[rule]`, `#[meta]` and `#[inspect]` attributes.
pub use ruleguard_macros::Inspect;

/// Prelude module for validation
pub mod prelude {
    pub use crate::{
        EngineConfig, Error, Inspect, Interpolator, MessageBundle, MessageCatalog, RuleDescriptor,
        Target, ValidationEngine, Validator, Violation, ViolationSet,
    };
}

/// Support code for `#[derive(Inspect)]`. Not public API.
#[doc(hidden)]
pub mod __private {
    pub use serde_json::{Map, Value};

    use crate::AccessError;
    use serde::Serialize;

    pub fn to_value<T: Serialize + ?Sized>(member: &str, value: &T) -> Result<Value, AccessError> {
        serde_json::to_value(value).map_err(|e| AccessError::serialize(member, e))
    }
}
