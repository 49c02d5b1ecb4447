//! Rule resolution: from a descriptor to the validator that enforces it.

use crate::descriptor::RuleDescriptor;
use crate::error::{BoxError, RuleResolutionError};
use crate::validator::Validator;
use dashmap::DashMap;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Type alias for validator factories to reduce complexity.
pub type ValidatorFactory =
    Arc<dyn Fn(&RuleDescriptor) -> Result<Arc<dyn Validator>, BoxError> + Send + Sync>;

/// Maps a descriptor to the validator that enforces it.
pub trait RuleResolver: Send + Sync {
    /// Resolve `rule`.
    ///
    /// `Ok(None)` means the descriptor is not a rule (it carries no validator
    /// reference). Only genuine construction failures are errors.
    fn resolve(&self, rule: &RuleDescriptor)
        -> Result<Option<Arc<dyn Validator>>, RuleResolutionError>;
}

impl<R: RuleResolver + ?Sized> RuleResolver for Arc<R> {
    fn resolve(
        &self,
        rule: &RuleDescriptor,
    ) -> Result<Option<Arc<dyn Validator>>, RuleResolutionError> {
        (**self).resolve(rule)
    }
}

/// Resolves validator references against a registry of factories.
#[derive(Clone, Default)]
pub struct RegistryResolver {
    factories: HashMap<String, ValidatorFactory>,
}

impl RegistryResolver {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under `reference`. A later registration replaces an
    /// earlier one.
    pub fn register<F>(&mut self, reference: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&RuleDescriptor) -> Result<Arc<dyn Validator>, BoxError> + Send + Sync + 'static,
    {
        self.factories.insert(reference.into(), Arc::new(factory));
        self
    }

    /// Register one shared validator instance under `reference`.
    pub fn register_instance(
        &mut self,
        reference: impl Into<String>,
        validator: impl Validator + 'static,
    ) -> &mut Self {
        let validator: Arc<dyn Validator> = Arc::new(validator);
        self.register(reference, move |_| Ok(validator.clone()))
    }

    /// Builder-style [`register_instance`](Self::register_instance).
    pub fn with(mut self, reference: impl Into<String>, validator: impl Validator + 'static) -> Self {
        self.register_instance(reference, validator);
        self
    }

    /// Take over every registration from `other`, replacing clashes.
    pub fn extend(&mut self, other: RegistryResolver) -> &mut Self {
        self.factories.extend(other.factories);
        self
    }

    /// Whether a factory is registered under `reference`.
    pub fn contains(&self, reference: &str) -> bool {
        self.factories.contains_key(reference)
    }

    /// Registered references, in no particular order.
    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

impl fmt::Debug for RegistryResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut references: Vec<_> = self.factories.keys().collect();
        references.sort();
        f.debug_struct("RegistryResolver")
            .field("references", &references)
            .finish()
    }
}

impl RuleResolver for RegistryResolver {
    fn resolve(
        &self,
        rule: &RuleDescriptor,
    ) -> Result<Option<Arc<dyn Validator>>, RuleResolutionError> {
        let Some(reference) = rule.validator.as_deref() else {
            return Ok(None);
        };

        let factory =
            self.factories
                .get(reference)
                .ok_or_else(|| RuleResolutionError::Unregistered {
                    kind: rule.kind.clone(),
                    reference: reference.to_string(),
                })?;

        tracing::trace!(kind = %rule.kind, reference, "constructing validator");

        factory(rule)
            .map(Some)
            .map_err(|source| RuleResolutionError::Construction {
                kind: rule.kind.clone(),
                reference: reference.to_string(),
                source,
            })
    }
}

/// Memoizes another resolver by descriptor kind and validator reference.
///
/// At most one validator is kept per `(kind, reference)` pair. Descriptors
/// without a reference are never looked up or stored. Concurrent misses may
/// both consult the inner resolver; the last insert wins.
pub struct CachingResolver<R = RegistryResolver> {
    inner: R,
    cache: DashMap<(String, String), Arc<dyn Validator>>,
}

impl<R: RuleResolver> CachingResolver<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            cache: DashMap::new(),
        }
    }

    /// The wrapped resolver.
    pub fn inner(&self) -> &R {
        &self.inner
    }

    /// Number of cached validators.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

impl<R> fmt::Debug for CachingResolver<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachingResolver")
            .field("cached", &self.cache.len())
            .finish()
    }
}

impl<R: RuleResolver> RuleResolver for CachingResolver<R> {
    fn resolve(
        &self,
        rule: &RuleDescriptor,
    ) -> Result<Option<Arc<dyn Validator>>, RuleResolutionError> {
        let Some(reference) = rule.validator.as_deref() else {
            return Ok(None);
        };

        let key = (rule.kind.clone(), reference.to_string());
        if let Some(hit) = self.cache.get(&key) {
            tracing::trace!(kind = %rule.kind, reference, "validator cache hit");
            return Ok(Some(hit.value().clone()));
        }

        tracing::trace!(kind = %rule.kind, reference, "validator cache miss");
        let resolved = self.inner.resolve(rule)?;
        if let Some(validator) = &resolved {
            self.cache.insert(key, validator.clone());
        }
        Ok(resolved)
    }
}
