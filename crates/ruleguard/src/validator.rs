//! The validator contract.

use crate::descriptor::RuleDescriptor;
use crate::error::BoxError;
use crate::inspect::Inspect;
use crate::target::Target;
use crate::violation::Violation;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Outcome of running one validator.
pub type Outcome<'s> = Result<Option<Violation<'s>>, BoxError>;

/// Predicate logic for one rule kind.
///
/// Validators are stateless and interchangeable: the engine may share one
/// instance across subjects, threads and descriptors of the same kind, so any
/// rule parameters must be read from `rule` on every call.
///
/// ## Example
///
/// ```rust
/// use ruleguard::{Inspect, Outcome, RuleDescriptor, Target, Validator, Violation};
/// use serde_json::Value;
/// use std::sync::Arc;
///
/// #[derive(Debug)]
/// struct Positive;
///
/// impl Validator for Positive {
///     fn validate<'s>(
///         &self,
///         subject: &'s dyn Inspect,
///         rule: &Arc<RuleDescriptor>,
///         target: &Target,
///         value: &Value,
///     ) -> Outcome<'s> {
///         match value.as_f64() {
///             Some(n) if n > 0.0 => Ok(None),
///             _ => Ok(Some(Violation::new(subject, rule.clone(), target.clone(), value.clone()))),
///         }
///     }
/// }
/// ```
pub trait Validator: fmt::Debug + Send + Sync {
    /// Check `value`, read from `target` on `subject`, against `rule`.
    ///
    /// Returns `Ok(None)` when the value passes. Errors abort the enclosing
    /// validation call.
    fn validate<'s>(
        &self,
        subject: &'s dyn Inspect,
        rule: &Arc<RuleDescriptor>,
        target: &Target,
        value: &Value,
    ) -> Outcome<'s>;
}

/// Signature of a value-only predicate usable with [`PredicateValidator`].
pub type PredicateFn = dyn Fn(&Value, &RuleDescriptor) -> Result<bool, BoxError> + Send + Sync;

/// Adapts a plain predicate into a [`Validator`].
///
/// The predicate returns `true` when the value passes.
#[derive(Clone)]
pub struct PredicateValidator {
    name: &'static str,
    predicate: Arc<PredicateFn>,
}

impl PredicateValidator {
    pub fn new<F>(name: &'static str, predicate: F) -> Self
    where
        F: Fn(&Value, &RuleDescriptor) -> Result<bool, BoxError> + Send + Sync + 'static,
    {
        Self {
            name,
            predicate: Arc::new(predicate),
        }
    }
}

impl fmt::Debug for PredicateValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateValidator")
            .field("name", &self.name)
            .finish()
    }
}

impl Validator for PredicateValidator {
    fn validate<'s>(
        &self,
        subject: &'s dyn Inspect,
        rule: &Arc<RuleDescriptor>,
        target: &Target,
        value: &Value,
    ) -> Outcome<'s> {
        if (self.predicate)(value, rule)? {
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
