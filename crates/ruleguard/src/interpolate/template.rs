//! The full expression strategy, backed by Tera.

use super::accessor::{AccessorChain, ROOT};
use super::Evaluate;
use crate::error::{AccessError, InterpolationError};
use crate::violation::Violation;
use regex::Regex;
use serde_json::{json, Value};
use std::sync::OnceLock;
use tera::{Context, Tera};

static ACCESSOR_CHAIN: OnceLock<Regex> = OnceLock::new();

fn accessor_chain_regex() -> &'static Regex {
    ACCESSOR_CHAIN.get_or_init(|| {
        Regex::new(r"^\s*[A-Za-z_][A-Za-z0-9_]*(\s*\.\s*[A-Za-z0-9_]+\s*(\(\s*\))?)*\s*$")
            .expect("accessor chain regex is valid")
    })
}

/// Evaluates expressions with Tera: operators, filters, tests and literals.
///
/// Plain `problem.a.b` chains go through [`AccessorChain`] so both strategies
/// agree on that subset. Anything else is rendered as `{{ expression }}`
/// against a context where `problem` is the JSON form of the violation:
///
/// ```text
/// problem.code, problem.value, problem.message_key, problem.details,
/// problem.target.{kind, name, method, index},
/// problem.rule.{kind, validator, message_key, required, params},
/// problem.subject (non-synthetic fields)
/// ```
///
/// ```rust
/// use ruleguard::interpolate::{Interpolator, TemplateExpression};
/// # use ruleguard::{AccessError, Inspect, RuleDescriptor, Target, TypeMetadata, Violation};
/// # use serde_json::Value;
/// # use std::sync::{Arc, OnceLock};
/// # struct Name;
/// # impl Inspect for Name {
/// #     fn metadata(&self) -> &TypeMetadata {
/// #         static META: OnceLock<TypeMetadata> = OnceLock::new();
/// #         META.get_or_init(|| TypeMetadata::new("Name"))
/// #     }
/// #     fn read_field(&self, name: &str) -> Result<Value, AccessError> {
/// #         Err(AccessError::no_such_member("Name", name))
/// #     }
/// # }
/// # let subject = Name;
/// let rule = Arc::new(RuleDescriptor::rule("max_length").param("value", 3));
/// let problem = Violation::new(&subject, rule, Target::field("name"), Value::from("abcdef"));
///
/// let interpolator = Interpolator::templated();
/// let text = interpolator
///     .render("${problem.value | upper} exceeds ${problem.rule.params.value} characters", &problem)
///     .unwrap();
/// assert_eq!(text, "ABCDEF exceeds 3 characters");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateExpression {
    chain: AccessorChain,
}

impl TemplateExpression {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Evaluate for TemplateExpression {
    fn evaluate(&self, expression: &str, problem: &Violation<'_>) -> Result<String, InterpolationError> {
        if accessor_chain_regex().is_match(expression) {
            return self.chain.evaluate(expression, problem);
        }

        let evaluation_error = |source: Box<dyn std::error::Error + Send + Sync>| {
            InterpolationError::Evaluation {
                expression: expression.to_string(),
                source,
            }
        };

        let mut context = Context::new();
        context.insert(ROOT, &problem_context(problem).map_err(|e| evaluation_error(Box::new(e)))?);

        let rendered = Tera::one_off(&format!("{{{{ {expression} }}}}"), &context, false)
            .map_err(|e| evaluation_error(Box::new(e)))?;
        tracing::trace!(expression, "evaluated template expression");
        Ok(rendered)
    }
}

/// JSON view of a violation exposed to Tera as `problem`.
fn problem_context(problem: &Violation<'_>) -> Result<Value, AccessError> {
    let rule = problem.rule();
    let target = problem.target();
    Ok(json!({
        "code": problem.code(),
        "value": problem.value(),
        "message_key": problem.message_key(),
        "details": problem.details(),
        "target": target,
        "rule": {
            "kind": rule.kind,
            "validator": rule.validator,
            "message_key": rule.message_key,
            "required": rule.required,
            "params": rule.params,
        },
        "subject": problem.subject().snapshot()?,
    }))
}
