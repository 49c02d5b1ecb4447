//! The dispatch engine: walks declared members, resolves their rules, runs the
//! validators and aggregates violations.

use crate::config::EngineConfig;
use crate::descriptor::RuleDescriptor;
use crate::error::{BoxError, Result, StrictModeViolation, ValidationError};
use crate::filter::{AllFields, GetterFilter, MemberFilter};
use crate::inspect::Inspect;
use crate::metadata::MemberKind;
use crate::resolver::{CachingResolver, RegistryResolver, RuleResolver};
use crate::rules;
use crate::target::Target;
use crate::validator::Validator;
use crate::violation::ViolationSet;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Validates subjects against the rules declared on their members.
///
/// An engine is cheap to share: create one per application and pass it where
/// it is needed. Calls are synchronous and independent; the only state shared
/// between concurrent calls is the resolver's validator cache.
///
/// Every call either returns the complete [`ViolationSet`] or aborts with an
/// [`Error`](crate::Error); partial results are never returned.
///
/// ## Example
///
/// ```rust
/// use ruleguard::prelude::*;
///
/// #[derive(Inspect)]
/// struct Signup {
///     #[rule(not_null)]
///     email: Option<String>,
/// }
///
/// let engine = ValidationEngine::standard();
///
/// let signup = Signup { email: None };
/// let results = engine.validate_fields(&signup).unwrap();
/// assert_eq!(results.len(), 1);
/// assert!(results.is_validated());
/// ```
#[derive(Clone)]
pub struct ValidationEngine {
    resolver: Arc<dyn RuleResolver>,
    config: EngineConfig,
    getters: GetterFilter,
}

impl ValidationEngine {
    /// An engine over `resolver` with the default configuration.
    ///
    /// The resolver is used as given; wrap it in a
    /// [`CachingResolver`] yourself if it should be memoized.
    pub fn new(resolver: impl RuleResolver + 'static) -> Self {
        Self::from_parts(Arc::new(resolver), EngineConfig::default())
    }

    /// An engine over the standard rule set, with validator caching.
    pub fn standard() -> Self {
        Self::builder().standard_rules().build()
    }

    /// Create a builder for constructing an engine.
    pub fn builder() -> ValidationEngineBuilder {
        ValidationEngineBuilder::new()
    }

    fn from_parts(resolver: Arc<dyn RuleResolver>, config: EngineConfig) -> Self {
        let getters = GetterFilter::new(config.accessor_prefixes.iter().cloned());
        Self {
            resolver,
            config,
            getters,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn resolver(&self) -> &dyn RuleResolver {
        self.resolver.as_ref()
    }

    // ------------------------------------------------------------------
    // Fields
    // ------------------------------------------------------------------

    /// Validate every declared field.
    pub fn validate_fields<'s>(&self, subject: &'s dyn Inspect) -> Result<ViolationSet<'s>> {
        self.validate_fields_with(subject, &AllFields, self.config.strict)
    }

    /// Validate every declared field in strict mode.
    pub fn validate_fields_strict<'s>(
        &self,
        subject: &'s dyn Inspect,
    ) -> Result<ViolationSet<'s>> {
        self.validate_fields_with(subject, &AllFields, true)
    }

    /// Validate the declared fields accepted by `filter`.
    pub fn validate_fields_with<'s>(
        &self,
        subject: &'s dyn Inspect,
        filter: &dyn MemberFilter,
        strict: bool,
    ) -> Result<ViolationSet<'s>> {
        self.validate_members(subject, MemberKind::Field, filter, strict)
    }

    // ------------------------------------------------------------------
    // Accessor methods
    // ------------------------------------------------------------------

    /// Validate every accessor-shaped method.
    pub fn validate_methods<'s>(&self, subject: &'s dyn Inspect) -> Result<ViolationSet<'s>> {
        self.validate_methods_with(subject, &self.getters, self.config.strict)
    }

    /// Validate every accessor-shaped method in strict mode.
    pub fn validate_methods_strict<'s>(
        &self,
        subject: &'s dyn Inspect,
    ) -> Result<ViolationSet<'s>> {
        self.validate_methods_with(subject, &self.getters, true)
    }

    /// Validate the declared methods accepted by `filter`.
    pub fn validate_methods_with<'s>(
        &self,
        subject: &'s dyn Inspect,
        filter: &dyn MemberFilter,
        strict: bool,
    ) -> Result<ViolationSet<'s>> {
        self.validate_members(subject, MemberKind::Method, filter, strict)
    }

    // ------------------------------------------------------------------
    // Operation parameters
    // ------------------------------------------------------------------

    /// Validate `args` against the parameter rules of `operation`.
    pub fn validate_parameters<'s>(
        &self,
        subject: &'s dyn Inspect,
        operation: &str,
        args: &[Value],
    ) -> Result<ViolationSet<'s>> {
        self.validate_parameters_with(subject, operation, args, self.config.strict)
    }

    /// Validate `args` against the parameter rules of `operation` in strict mode.
    pub fn validate_parameters_strict<'s>(
        &self,
        subject: &'s dyn Inspect,
        operation: &str,
        args: &[Value],
    ) -> Result<ViolationSet<'s>> {
        self.validate_parameters_with(subject, operation, args, true)
    }

    /// Validate `args` against the parameter rules of `operation`.
    ///
    /// A parameter carrying the exempt marker never fails strict mode; its
    /// other rules still run.
    pub fn validate_parameters_with<'s>(
        &self,
        subject: &'s dyn Inspect,
        operation: &str,
        args: &[Value],
        strict: bool,
    ) -> Result<ViolationSet<'s>> {
        self.run("parameters", subject, strict, |results| {
            let declared = subject.metadata().find_operation(operation).ok_or_else(|| {
                ValidationError::new(format!(
                    "type `{}` declares no operation `{}`",
                    subject.type_name(),
                    operation
                ))
            })?;

            for (index, param) in declared.params().iter().enumerate() {
                // The exempt marker is checked before any rule on the parameter runs.
                let exempt = param.rules().iter().any(|rule| rule.is_exempt());
                let target = Target::parameter(operation, index, param.name());
                let strict = strict && !exempt;
                self.check_member(subject, param.rules(), &target, strict, results, || {
                    args.get(index).cloned().ok_or_else(|| {
                        ValidationError::new(format!(
                            "operation `{}` has no argument for parameter {} (`{}`), {} supplied",
                            operation,
                            index,
                            param.name(),
                            args.len()
                        ))
                    })
                })?;
            }
            Ok(())
        })
    }

    // ------------------------------------------------------------------
    // The type itself
    // ------------------------------------------------------------------

    /// Validate the type-level rules, with the subject as the value.
    pub fn validate_type<'s>(&self, subject: &'s dyn Inspect) -> Result<ViolationSet<'s>> {
        self.validate_type_with(subject, self.config.strict)
    }

    /// Validate the type-level rules in strict mode.
    pub fn validate_type_strict<'s>(&self, subject: &'s dyn Inspect) -> Result<ViolationSet<'s>> {
        self.validate_type_with(subject, true)
    }

    /// Validate the type-level rules.
    pub fn validate_type_with<'s>(
        &self,
        subject: &'s dyn Inspect,
        strict: bool,
    ) -> Result<ViolationSet<'s>> {
        self.run("type", subject, strict, |results| {
            let target = Target::type_(subject.type_name());
            self.check_member(
                subject,
                subject.metadata().rules(),
                &target,
                strict,
                results,
                || subject.snapshot().map_err(ValidationError::from),
            )
        })
    }

    // ------------------------------------------------------------------
    // Shared algorithm
    // ------------------------------------------------------------------

    fn validate_members<'s>(
        &self,
        subject: &'s dyn Inspect,
        kind: MemberKind,
        filter: &dyn MemberFilter,
        strict: bool,
    ) -> Result<ViolationSet<'s>> {
        let mode = match kind {
            MemberKind::Field => "fields",
            MemberKind::Method => "methods",
        };

        self.run(mode, subject, strict, |results| {
            for member in subject.metadata().members(kind) {
                // Host back-references never take part, whatever the filter says.
                if kind == MemberKind::Field && member.is_synthetic() {
                    continue;
                }
                if !filter.include(member) {
                    continue;
                }

                let name = member.name();
                self.check_member(subject, member.rules(), &member.target(), strict, results, || {
                    let read = match kind {
                        MemberKind::Field => subject.read_field(name),
                        MemberKind::Method => subject.call_accessor(name),
                    };
                    read.map_err(ValidationError::from)
                })?;
            }
            Ok(())
        })
    }

    /// Run every rule on one member.
    ///
    /// The value is read once, and only if at least one descriptor resolves to a
    /// validator.
    fn check_member<'s, F>(
        &self,
        subject: &'s dyn Inspect,
        rules: &[Arc<RuleDescriptor>],
        target: &Target,
        strict: bool,
        results: &mut ViolationSet<'s>,
        read: F,
    ) -> Result<()>
    where
        F: FnOnce() -> std::result::Result<Value, ValidationError>,
    {
        let mut resolved: Vec<(&Arc<RuleDescriptor>, Arc<dyn Validator>)> =
            Vec::with_capacity(rules.len());
        for rule in rules {
            if let Some(validator) = self.resolver.resolve(rule)? {
                resolved.push((rule, validator));
            }
        }

        if resolved.is_empty() {
            if strict && !rules.iter().any(|rule| rule.is_exempt()) {
                tracing::warn!(
                    subject = subject.type_name(),
                    member = %target,
                    "strict mode found a member without rules"
                );
                return Err(StrictModeViolation {
                    target: target.clone(),
                }
                .into());
            }
            return Ok(());
        }

        let value = read()?;
        for (rule, validator) in resolved {
            tracing::trace!(member = %target, rule = %rule.kind, "running validator");
            let outcome = validator
                .validate(subject, rule, target, &value)
                .map_err(ValidationError::wrap)?;
            if let Some(violation) = outcome {
                results.add(violation);
            }
        }
        results.mark_validated();
        Ok(())
    }

    fn run<'s, F>(
        &self,
        mode: &'static str,
        subject: &'s dyn Inspect,
        strict: bool,
        body: F,
    ) -> Result<ViolationSet<'s>>
    where
        F: FnOnce(&mut ViolationSet<'s>) -> Result<()>,
    {
        tracing::debug!(subject = subject.type_name(), mode, strict, "validation started");
        let mut results = ViolationSet::new();
        body(&mut results)?;
        tracing::debug!(
            subject = subject.type_name(),
            mode,
            violations = results.len(),
            validated = results.is_validated(),
            "validation finished"
        );
        Ok(results)
    }
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for ValidationEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationEngine")
            .field("config", &self.config)
            .finish()
    }
}

/// Builder for constructing a [`ValidationEngine`].
#[derive(Default)]
pub struct ValidationEngineBuilder {
    config: EngineConfig,
    registry: RegistryResolver,
    resolver: Option<Arc<dyn RuleResolver>>,
}

impl ValidationEngineBuilder {
    /// Create a new builder with the default configuration and an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Default strict mode.
    pub fn strict(mut self, strict: bool) -> Self {
        self.config.strict = strict;
        self
    }

    /// Memoize resolved validators by rule kind.
    pub fn cache_validators(mut self, enabled: bool) -> Self {
        self.config.cache_validators = enabled;
        self
    }

    /// Add an accessor prefix for the default method filter.
    pub fn accessor_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        if !self.config.accessor_prefixes.contains(&prefix) {
            self.config.accessor_prefixes.push(prefix);
        }
        self
    }

    /// Register every standard rule.
    pub fn standard_rules(mut self) -> Self {
        self.registry.extend(rules::standard_registry());
        self
    }

    /// Register a validator factory.
    pub fn register<F>(mut self, reference: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&RuleDescriptor) -> std::result::Result<Arc<dyn Validator>, BoxError>
            + Send
            + Sync
            + 'static,
    {
        self.registry.register(reference, factory);
        self
    }

    /// Register a shared validator instance.
    pub fn register_instance(
        mut self,
        reference: impl Into<String>,
        validator: impl Validator + 'static,
    ) -> Self {
        self.registry.register_instance(reference, validator);
        self
    }

    /// Use a custom resolver instead of the builder's registry.
    pub fn resolver(mut self, resolver: impl RuleResolver + 'static) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Build the engine.
    pub fn build(self) -> ValidationEngine {
        let base: Arc<dyn RuleResolver> = match self.resolver {
            Some(resolver) => resolver,
            None => Arc::new(self.registry),
        };
        let resolver: Arc<dyn RuleResolver> = if self.config.cache_validators {
            Arc::new(CachingResolver::new(base))
        } else {
            base
        };
        ValidationEngine::from_parts(resolver, self.config)
    }
}
