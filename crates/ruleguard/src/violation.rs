//! Violations and the per-call violation set.

use crate::descriptor::RuleDescriptor;
use crate::error::MessageError;
use crate::inspect::Inspect;
use crate::interpolate::{Evaluate, Interpolator};
use crate::message::MessageCatalog;
use crate::target::Target;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// The record produced when a validator rejects a value.
///
/// A violation borrows the validated subject and shares the descriptor that
/// failed. It is immutable once built.
#[derive(Clone)]
pub struct Violation<'s> {
    subject: &'s dyn Inspect,
    rule: Arc<RuleDescriptor>,
    target: Target,
    value: Value,
    code: String,
    details: Map<String, Value>,
}

impl<'s> Violation<'s> {
    /// Create a violation. The code defaults to the rule kind.
    pub fn new(
        subject: &'s dyn Inspect,
        rule: Arc<RuleDescriptor>,
        target: Target,
        value: Value,
    ) -> Self {
        let code = rule.kind.clone();
        Self {
            subject,
            rule,
            target,
            value,
            code,
            details: Map::new(),
        }
    }

    /// Override the violation code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Attach a readable detail. Values that fail to serialize are ignored.
    pub fn detail(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.details.insert(key.into(), v);
        }
        self
    }

    pub fn subject(&self) -> &'s dyn Inspect {
        self.subject
    }

    pub fn rule(&self) -> &RuleDescriptor {
        &self.rule
    }

    /// The shared descriptor handle.
    pub fn rule_handle(&self) -> &Arc<RuleDescriptor> {
        &self.rule
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Violation type name.
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn details(&self) -> &Map<String, Value> {
        &self.details
    }

    /// Catalog key: the descriptor's message key, or the code when that is
    /// absent or empty.
    pub fn message_key(&self) -> &str {
        match self.rule.message_key.as_deref() {
            Some(key) if !key.is_empty() => key,
            _ => &self.code,
        }
    }

    /// Render the catalog message for `locale` with the default interpolator.
    pub fn localized_message(
        &self,
        catalog: &dyn MessageCatalog,
        locale: &str,
    ) -> Result<String, MessageError> {
        self.localized_message_with(catalog, locale, &Interpolator::accessors())
    }

    /// Render the catalog message for `locale` with a chosen interpolator.
    pub fn localized_message_with<E: Evaluate>(
        &self,
        catalog: &dyn MessageCatalog,
        locale: &str,
        interpolator: &Interpolator<E>,
    ) -> Result<String, MessageError> {
        let template = catalog.template(self.message_key(), locale)?;
        Ok(interpolator.render(&template, self)?)
    }

    /// Detached, serializable form of this violation.
    pub fn record(&self) -> ViolationRecord {
        ViolationRecord {
            target: self.target.clone(),
            code: self.code.clone(),
            value: self.value.clone(),
            details: self.details.clone(),
        }
    }
}

impl fmt::Debug for Violation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Violation")
            .field("subject", &self.subject.type_name())
            .field("rule", &self.rule.kind)
            .field("target", &self.target)
            .field("value", &self.value)
            .field("code", &self.code)
            .finish()
    }
}

impl fmt::Display for Violation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} of `{}`", self.code, self.target, self.subject.type_name())
    }
}

/// A violation detached from its subject, for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViolationRecord {
    pub target: Target,
    pub code: String,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub details: Map<String, Value>,
}

/// The result of one validation call.
///
/// Violations keep insertion order and are never deduplicated. `validated`
/// records whether at least one rule actually ran; once raised it stays raised.
#[derive(Debug, Clone, Default)]
pub struct ViolationSet<'s> {
    violations: Vec<Violation<'s>>,
    validated: bool,
}

impl<'s> ViolationSet<'s> {
    /// An empty, unvalidated set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one violation.
    pub fn add(&mut self, violation: Violation<'s>) {
        self.violations.push(violation);
    }

    /// Add several violations in order.
    pub fn add_all(&mut self, violations: impl IntoIterator<Item = Violation<'s>>) {
        self.violations.extend(violations);
    }

    /// Merge another set into this one.
    pub fn merge(&mut self, other: ViolationSet<'s>) {
        self.validated |= other.validated;
        self.add_all(other.violations);
    }

    /// Record that at least one rule ran.
    pub fn mark_validated(&mut self) {
        self.validated = true;
    }

    /// Whether at least one rule ran.
    pub fn is_validated(&self) -> bool {
        self.validated
    }

    pub fn violations(&self) -> &[Violation<'s>] {
        &self.violations
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Violation<'s>> {
        self.violations.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Ok when no violations were found.
    pub fn into_result(self) -> Result<Self, Self> {
        if self.is_empty() {
            Ok(self)
        } else {
            Err(self)
        }
    }

    /// Serializable records of every violation, in order.
    pub fn report(&self) -> Vec<ViolationRecord> {
        self.violations.iter().map(Violation::record).collect()
    }
}

impl<'s> IntoIterator for ViolationSet<'s> {
    type Item = Violation<'s>;
    type IntoIter = std::vec::IntoIter<Violation<'s>>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.into_iter()
    }
}

impl<'a, 's> IntoIterator for &'a ViolationSet<'s> {
    type Item = &'a Violation<'s>;
    type IntoIter = std::slice::Iter<'a, Violation<'s>>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AccessError;
    use crate::metadata::TypeMetadata;
    use std::sync::OnceLock;

    struct Blank;

    impl Inspect for Blank {
        fn metadata(&self) -> &TypeMetadata {
            static META: OnceLock<TypeMetadata> = OnceLock::new();
            META.get_or_init(|| TypeMetadata::new("Blank"))
        }

        fn read_field(&self, name: &str) -> Result<Value, AccessError> {
            Err(AccessError::no_such_member("Blank", name))
        }
    }

    fn violation<'s>(subject: &'s Blank, field: &str) -> Violation<'s> {
        Violation::new(
            subject,
            Arc::new(RuleDescriptor::rule("not_null")),
            Target::field(field),
            Value::Null,
        )
    }

    fn set_of<'s>(subject: &'s Blank, count: usize, validated: bool) -> ViolationSet<'s> {
        let mut set = ViolationSet::new();
        for i in 0..count {
            set.add(violation(subject, &format!("f{i}")));
        }
        if validated {
            set.mark_validated();
        }
        set
    }

    #[test]
    fn merge_unions_and_raises_flag() {
        let subject = Blank;
        let mut a = set_of(&subject, 2, false);
        let b = set_of(&subject, 3, true);
        a.merge(b);
        assert_eq!(a.len(), 5);
        assert!(a.is_validated());
    }

    #[test]
    fn merge_never_lowers_flag() {
        let subject = Blank;
        let mut a = set_of(&subject, 0, true);
        a.merge(set_of(&subject, 0, false));
        assert!(a.is_validated());
    }

    #[test]
    fn merging_empty_sets_stays_empty() {
        let subject = Blank;
        let mut a = set_of(&subject, 0, false);
        a.merge(set_of(&subject, 0, false));
        assert!(a.is_empty());
        assert!(!a.is_validated());
    }

    #[test]
    fn insertion_order_is_kept() {
        let subject = Blank;
        let mut set = set_of(&subject, 2, false);
        set.add(violation(&subject, "f0"));
        let names: Vec<_> = set.iter().map(|v| v.target().name().to_string()).collect();
        assert_eq!(names, vec!["f0", "f1", "f0"]);
    }

    #[test]
    fn message_key_falls_back_to_code() {
        let subject = Blank;
        let plain = violation(&subject, "email");
        assert_eq!(plain.message_key(), "not_null");

        let empty_key = Violation::new(
            &subject,
            Arc::new(RuleDescriptor::rule("not_null").message_key("")),
            Target::field("email"),
            Value::Null,
        );
        assert_eq!(empty_key.message_key(), "not_null");

        let keyed = Violation::new(
            &subject,
            Arc::new(RuleDescriptor::rule("not_null").message_key("user.email.missing")),
            Target::field("email"),
            Value::Null,
        )
        .with_code("missing");
        assert_eq!(keyed.message_key(), "user.email.missing");
        assert_eq!(keyed.code(), "missing");
    }

    #[test]
    fn report_serializes() {
        let subject = Blank;
        let set = set_of(&subject, 1, true);
        let json = serde_json::to_value(set.report()).unwrap();
        assert_eq!(json[0]["code"], "not_null");
        assert_eq!(json[0]["target"]["name"], "f0");
    }
}
