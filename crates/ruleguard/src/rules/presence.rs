use super::{is_blank, Absence, ValueRule};
use crate::descriptor::RuleDescriptor;
use crate::error::BoxError;
use crate::inspect::Inspect;
use crate::target::Target;
use crate::validator::{Outcome, Validator};
use crate::violation::Violation;
use serde_json::Value;
use std::sync::Arc;

/// The value must not be null.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotNull;

impl ValueRule for NotNull {
    fn absence(&self) -> Absence {
        Absence::Never
    }

    fn passes(&self, value: &Value, _rule: &RuleDescriptor) -> Result<bool, BoxError> {
        Ok(!value.is_null())
    }
}

/// The value must not be null, an empty string, an empty array or an empty
/// object.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotEmpty;

impl ValueRule for NotEmpty {
    fn absence(&self) -> Absence {
        Absence::Never
    }

    fn passes(&self, value: &Value, _rule: &RuleDescriptor) -> Result<bool, BoxError> {
        let empty = match value {
            Value::Array(items) => items.is_empty(),
            Value::Object(map) => map.is_empty(),
            other => is_blank(other),
        };
        Ok(!empty)
    }
}

/// The value must be the boolean `true`. Null violates.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsTrue;

impl ValueRule for IsTrue {
    fn absence(&self) -> Absence {
        Absence::Never
    }

    fn passes(&self, value: &Value, _rule: &RuleDescriptor) -> Result<bool, BoxError> {
        Ok(value.as_bool() == Some(true))
    }
}

/// The value must be the boolean `false`. Null violates.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsFalse;

impl ValueRule for IsFalse {
    fn absence(&self) -> Absence {
        Absence::Never
    }

    fn passes(&self, value: &Value, _rule: &RuleDescriptor) -> Result<bool, BoxError> {
        Ok(value.as_bool() == Some(false))
    }
}

fn compare<'s>(
    subject: &'s dyn Inspect,
    rule: &Arc<RuleDescriptor>,
    target: &Target,
    value: &Value,
    expected: Value,
) -> Outcome<'s> {
    if *value == expected {
        return Ok(None);
    }

    Ok(Some(
        Violation::new(subject, rule.clone(), target.clone(), value.clone())
            .detail("expected", expected),
    ))
}

/// The value must equal another field of the same subject, named by the
/// `value` parameter. The other field's value is attached as the `expected`
/// detail.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchField;

impl Validator for MatchField {
    fn validate<'s>(
        &self,
        subject: &'s dyn Inspect,
        rule: &Arc<RuleDescriptor>,
        target: &Target,
        value: &Value,
    ) -> Outcome<'s> {
        let field: String = rule.param_as("value")?;
        let expected = subject.read_field(&field)?;
        compare(subject, rule, target, value, expected)
    }
}

/// Like [`MatchField`], but the expected value comes from the accessor named
/// by `value`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchMethod;

impl Validator for MatchMethod {
    fn validate<'s>(
        &self,
        subject: &'s dyn Inspect,
        rule: &Arc<RuleDescriptor>,
        target: &Target,
        value: &Value,
    ) -> Outcome<'s> {
        let accessor: String = rule.param_as("value")?;
        let expected = subject.call_accessor(&accessor)?;
        compare(subject, rule, target, value, expected)
    }
}
