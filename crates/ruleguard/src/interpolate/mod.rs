//! Message interpolation: `${...}` expressions evaluated against a violation.
//!
//! The scanner and the evaluation strategy are separate. [`AccessorChain`]
//! only walks `problem.a.b` chains; [`TemplateExpression`] adds Tera's
//! operators and filters on top.

mod accessor;
pub mod scan;
mod template;

pub use accessor::{AccessorChain, ROOT};
pub use template::TemplateExpression;

use crate::error::InterpolationError;
use crate::violation::Violation;

/// Evaluates one expression body against the violation being rendered.
pub trait Evaluate: Send + Sync {
    fn evaluate(&self, expression: &str, problem: &Violation<'_>) -> Result<String, InterpolationError>;
}

/// Renders message templates.
///
/// ## Example
///
/// ```rust
/// use ruleguard::interpolate::Interpolator;
/// # use ruleguard::{AccessError, Inspect, RuleDescriptor, Target, TypeMetadata, Violation};
/// # use serde_json::Value;
/// # use std::sync::{Arc, OnceLock};
/// # struct User;
/// # impl Inspect for User {
/// #     fn metadata(&self) -> &TypeMetadata {
/// #         static META: OnceLock<TypeMetadata> = OnceLock::new();
/// #         META.get_or_init(|| TypeMetadata::new("User"))
/// #     }
/// #     fn read_field(&self, name: &str) -> Result<Value, AccessError> {
/// #         Err(AccessError::no_such_member("User", name))
/// #     }
/// # }
/// # let user = User;
/// let problem = Violation::new(
///     &user,
///     Arc::new(RuleDescriptor::rule("email")),
///     Target::field("email"),
///     Value::from("bademail"),
/// );
///
/// let text = Interpolator::accessors().render("bad: ${problem.value}", &problem).unwrap();
/// assert_eq!(text, "bad: bademail");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Interpolator<E = AccessorChain> {
    evaluator: E,
}

impl Interpolator<AccessorChain> {
    /// Accessor chains only.
    pub fn accessors() -> Self {
        Self::new(AccessorChain)
    }
}

impl Interpolator<TemplateExpression> {
    /// Full Tera expressions.
    pub fn templated() -> Self {
        Self::new(TemplateExpression::new())
    }
}

impl<E: Evaluate> Interpolator<E> {
    pub fn new(evaluator: E) -> Self {
        Self { evaluator }
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Render `template`, replacing each `${...}` with its evaluated value.
    pub fn render(&self, template: &str, problem: &Violation<'_>) -> Result<String, InterpolationError> {
        scan::scan(template, |expression| {
            self.evaluator.evaluate(expression, problem)
        })
    }
}
