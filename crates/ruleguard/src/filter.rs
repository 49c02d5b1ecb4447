//! Member filters restrict which declared members a validation call examines.

use crate::metadata::Member;

/// Decides whether a declared member takes part in validation.
///
/// Any `Fn(&Member) -> bool` is a filter.
pub trait MemberFilter {
    fn include(&self, member: &Member) -> bool;
}

impl<F> MemberFilter for F
where
    F: Fn(&Member) -> bool,
{
    fn include(&self, member: &Member) -> bool {
        self(member)
    }
}

/// Accepts every declared field. Synthetic fields are excluded by the engine
/// regardless of the filter.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllFields;

impl MemberFilter for AllFields {
    fn include(&self, _member: &Member) -> bool {
        true
    }
}

/// Accepts every declared method.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyMethod;

impl MemberFilter for AnyMethod {
    fn include(&self, _member: &Member) -> bool {
        true
    }
}

/// Accepts accessor-shaped methods: named with an accessor prefix, taking a
/// receiver and returning a value.
#[derive(Debug, Clone)]
pub struct GetterFilter {
    prefixes: Vec<String>,
}

impl GetterFilter {
    /// A getter filter matching any of `prefixes`.
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for GetterFilter {
    fn default() -> Self {
        Self::new(["get"])
    }
}

impl MemberFilter for GetterFilter {
    fn include(&self, member: &Member) -> bool {
        if member.is_synthetic() || !member.has_receiver() || !member.returns_value() {
            return false;
        }
        self.prefixes
            .iter()
            .any(|prefix| member.name().starts_with(prefix.as_str()))
    }
}
