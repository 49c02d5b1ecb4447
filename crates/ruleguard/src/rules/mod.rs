//! The standard rule set.
//!
//! Every rule is a stateless unit struct that reads its parameters from the
//! descriptor on each call, so one instance serves every descriptor of its
//! kind. Unless a rule says otherwise, an absent value only violates it when
//! the descriptor is `required`.

mod biz;
mod net;
mod numeric;
mod presence;
mod text;

pub use biz::{Phone, Ssn, ZipCode};
pub use net::{Email, IpAddress, Url};
pub use numeric::{GreaterThan, Hours, Id, LessThanOrEqual, Minutes, Seconds};
pub use presence::{IsFalse, IsTrue, MatchField, MatchMethod, NotEmpty, NotNull};
pub use text::{AllowOnly, Contains, Length, LowerCase, MaxLength, MinLength, RegexRule, UpperCase};

use crate::descriptor::RuleDescriptor;
use crate::error::BoxError;
use crate::inspect::Inspect;
use crate::message::MessageBundle;
use crate::resolver::RegistryResolver;
use crate::target::Target;
use crate::validator::{Outcome, Validator};
use crate::violation::Violation;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// What counts as "no value" for a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Absence {
    /// Only `null` is absent.
    Null,
    /// `null` and the empty string are absent.
    Blank,
    /// Nothing is absent; the rule sees every value.
    Never,
}

/// A rule that only needs the value and its descriptor.
///
/// Every `ValueRule` is a [`Validator`]: absent values pass unless the
/// descriptor is `required`, present values go to [`passes`](Self::passes).
pub trait ValueRule: fmt::Debug + Send + Sync {
    fn absence(&self) -> Absence {
        Absence::Null
    }

    /// Whether a present value passes.
    fn passes(&self, value: &Value, rule: &RuleDescriptor) -> Result<bool, BoxError>;
}

impl<T: ValueRule> Validator for T {
    fn validate<'s>(
        &self,
        subject: &'s dyn Inspect,
        rule: &Arc<RuleDescriptor>,
        target: &Target,
        value: &Value,
    ) -> Outcome<'s> {
        let absent = match self.absence() {
            Absence::Null => value.is_null(),
            Absence::Blank => is_blank(value),
            Absence::Never => false,
        };

        let passes = if absent {
            !rule.required
        } else {
            self.passes(value, rule)?
        };

        if passes {
            Ok(None)
        } else {
            Ok(Some(Violation::new(
                subject,
                rule.clone(),
                target.clone(),
                value.clone(),
            )))
        }
    }
}

pub(crate) fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

pub(crate) fn expect_str<'v>(value: &'v Value, rule: &RuleDescriptor) -> Result<&'v str, BoxError> {
    value
        .as_str()
        .ok_or_else(|| mismatch(value, rule, "a string"))
}

pub(crate) fn expect_number(value: &Value, rule: &RuleDescriptor) -> Result<f64, BoxError> {
    value
        .as_f64()
        .ok_or_else(|| mismatch(value, rule, "a number"))
}

fn mismatch(value: &Value, rule: &RuleDescriptor, expected: &str) -> BoxError {
    format!("rule `{}` expects {}, got {}", rule.kind, expected, value).into()
}

/// A registry with every standard rule registered under its kind.
pub fn standard_registry() -> RegistryResolver {
    RegistryResolver::new()
        .with("not_null", NotNull)
        .with("not_empty", NotEmpty)
        .with("is_true", IsTrue)
        .with("is_false", IsFalse)
        .with("match_field", MatchField)
        .with("match_method", MatchMethod)
        .with("min_length", MinLength)
        .with("max_length", MaxLength)
        .with("length", Length)
        .with("contains", Contains)
        .with("allow_only", AllowOnly)
        .with("regex", RegexRule)
        .with("upper_case", UpperCase)
        .with("lower_case", LowerCase)
        .with("email", Email)
        .with("url", Url)
        .with("ip_address", IpAddress)
        .with("greater_than", GreaterThan)
        .with("less_than_or_equal", LessThanOrEqual)
        .with("id", Id)
        .with("hours", Hours)
        .with("minutes", Minutes)
        .with("seconds", Seconds)
        .with("phone", Phone)
        .with("ssn", Ssn)
        .with("zip_code", ZipCode)
}

/// English templates for every standard rule, keyed by rule kind.
pub fn default_messages() -> MessageBundle {
    const EN: &[(&str, &str)] = &[
        ("not_null", "${problem.target.name} is required"),
        ("not_empty", "${problem.target.name} must not be empty"),
        ("is_true", "${problem.target.name} must be true"),
        ("is_false", "${problem.target.name} must be false"),
        ("match_field", "${problem.target.name} must match ${problem.rule.value}"),
        ("match_method", "${problem.target.name} must match ${problem.rule.value}"),
        ("min_length", "${problem.target.name} must be at least ${problem.rule.value} characters"),
        ("max_length", "${problem.target.name} must be at most ${problem.rule.value} characters"),
        ("length", "${problem.target.name} must be between ${problem.rule.min} and ${problem.rule.max} characters"),
        ("contains", "${problem.target.name} must contain ${problem.rule.value}"),
        ("allow_only", "${problem.value} is not an allowed value for ${problem.target.name}"),
        ("regex", "${problem.target.name} has an invalid format"),
        ("upper_case", "${problem.target.name} must be upper case"),
        ("lower_case", "${problem.target.name} must be lower case"),
        ("email", "${problem.value} is not a valid email address"),
        ("url", "${problem.value} is not a valid URL"),
        ("ip_address", "${problem.value} is not a valid IP address"),
        ("greater_than", "${problem.target.name} must be greater than ${problem.rule.value}"),
        ("less_than_or_equal", "${problem.target.name} must be at most ${problem.rule.value}"),
        ("id", "${problem.value} is not a valid identifier"),
        ("hours", "${problem.value} is not a valid hour"),
        ("minutes", "${problem.value} is not a valid minute"),
        ("seconds", "${problem.value} is not a valid second"),
        ("phone", "${problem.value} is not a valid phone number"),
        ("ssn", "${problem.value} is not a valid social security number"),
        ("zip_code", "${problem.value} is not a valid zip code"),
    ];

    let mut bundle = MessageBundle::new();
    for (key, template) in EN {
        bundle.insert("en", *key, *template);
    }
    bundle
}
