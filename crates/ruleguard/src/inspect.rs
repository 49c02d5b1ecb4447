//! The inspection capability subjects provide to the engine.

use crate::error::AccessError;
use crate::metadata::TypeMetadata;
use serde_json::{Map, Value};

/// A type whose members can be enumerated and read at runtime.
///
/// This is the seam where host reflection would sit. Derive it with
/// `#[derive(Inspect)]` for field and type rules, or implement it by hand when
/// accessor methods or operation parameters carry rules.
///
/// ## Example
///
/// ```rust
/// use ruleguard::{AccessError, Inspect, Member, RuleDescriptor, TypeMetadata};
/// use serde_json::Value;
/// use std::sync::OnceLock;
///
/// struct Invoice {
///     total: i64,
/// }
///
/// impl Inspect for Invoice {
///     fn metadata(&self) -> &TypeMetadata {
///         static META: OnceLock<TypeMetadata> = OnceLock::new();
///         META.get_or_init(|| {
///             TypeMetadata::new("Invoice").method(
///                 Member::method("get_total")
///                     .rule(RuleDescriptor::rule("greater_than").param("value", 0)),
///             )
///         })
///     }
///
///     fn read_field(&self, name: &str) -> Result<Value, AccessError> {
///         Err(AccessError::no_such_member("Invoice", name))
///     }
///
///     fn call_accessor(&self, name: &str) -> Result<Value, AccessError> {
///         match name {
///             "get_total" => Ok(Value::from(self.total)),
///             _ => Err(AccessError::no_such_member("Invoice", name)),
///         }
///     }
/// }
/// ```
pub trait Inspect {
    /// Declared members and descriptors of this type.
    fn metadata(&self) -> &TypeMetadata;

    /// Read the current value of a declared field.
    fn read_field(&self, name: &str) -> Result<Value, AccessError>;

    /// Invoke a zero-argument accessor.
    fn call_accessor(&self, name: &str) -> Result<Value, AccessError> {
        Err(AccessError::no_such_member(self.type_name(), name))
    }

    /// Name of the declaring type.
    fn type_name(&self) -> &str {
        self.metadata().type_name()
    }

    /// All non-synthetic field values as a JSON object.
    fn snapshot(&self) -> Result<Value, AccessError> {
        let mut object = Map::new();
        for field in self.metadata().fields() {
            if field.is_synthetic() {
                continue;
            }
            object.insert(field.name().to_string(), self.read_field(field.name())?);
        }
        Ok(Value::Object(object))
    }
}

impl std::fmt::Debug for dyn Inspect + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Inspect")
            .field("type_name", &self.type_name())
            .finish()
    }
}
