//! Declared members of a type and the descriptors attached to them.
//!
//! Rust has no runtime reflection, so a type describes itself once through a
//! [`TypeMetadata`] value, either built by hand or generated by
//! `#[derive(Inspect)]`.

use crate::descriptor::RuleDescriptor;
use crate::target::Target;
use std::sync::Arc;

/// Whether a member is a field or a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Field,
    Method,
}

/// A declared field or method.
#[derive(Debug, Clone)]
pub struct Member {
    name: String,
    kind: MemberKind,
    rules: Vec<Arc<RuleDescriptor>>,
    receiver: bool,
    returns_value: bool,
    synthetic: bool,
}

impl Member {
    /// Declare a field.
    pub fn field(name: impl Into<String>) -> Self {
        Self::new(name, MemberKind::Field)
    }

    /// Declare an instance method returning a value.
    pub fn method(name: impl Into<String>) -> Self {
        Self::new(name, MemberKind::Method)
    }

    fn new(name: impl Into<String>, kind: MemberKind) -> Self {
        Self {
            name: name.into(),
            kind,
            rules: Vec::new(),
            receiver: true,
            returns_value: true,
            synthetic: false,
        }
    }

    /// Attach a descriptor.
    pub fn rule(mut self, rule: RuleDescriptor) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Mark as compiler or host generated. Synthetic fields are never validated.
    pub fn synthetic(mut self) -> Self {
        self.synthetic = true;
        self
    }

    /// Mark a method as an associated function (no `self` receiver).
    pub fn associated(mut self) -> Self {
        self.receiver = false;
        self
    }

    /// Mark a method as returning `()`.
    pub fn returns_unit(mut self) -> Self {
        self.returns_value = false;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    pub fn rules(&self) -> &[Arc<RuleDescriptor>] {
        &self.rules
    }

    pub fn has_receiver(&self) -> bool {
        self.receiver
    }

    pub fn returns_value(&self) -> bool {
        self.returns_value
    }

    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }

    /// The validation target for this member.
    pub fn target(&self) -> Target {
        match self.kind {
            MemberKind::Field => Target::field(&self.name),
            MemberKind::Method => Target::method(&self.name),
        }
    }
}

/// A declared parameter of an operation.
#[derive(Debug, Clone)]
pub struct Parameter {
    name: String,
    rules: Vec<Arc<RuleDescriptor>>,
}

impl Parameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
        }
    }

    /// Attach a descriptor.
    pub fn rule(mut self, rule: RuleDescriptor) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> &[Arc<RuleDescriptor>] {
        &self.rules
    }
}

/// A method whose parameters carry descriptors.
#[derive(Debug, Clone)]
pub struct Operation {
    name: String,
    params: Vec<Parameter>,
}

impl Operation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
        }
    }

    /// Append the next positional parameter.
    pub fn param(mut self, param: Parameter) -> Self {
        self.params.push(param);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[Parameter] {
        &self.params
    }
}

/// Everything the engine needs to know about one type.
///
/// ## Example
///
/// ```rust
/// use ruleguard::{Member, Operation, Parameter, RuleDescriptor, TypeMetadata};
///
/// let meta = TypeMetadata::new("Account")
///     .rule(RuleDescriptor::rule("balanced"))
///     .field(Member::field("owner").rule(RuleDescriptor::rule("not_null")))
///     .method(Member::method("get_balance").rule(RuleDescriptor::rule("id")))
///     .operation(
///         Operation::new("deposit")
///             .param(Parameter::new("amount").rule(RuleDescriptor::rule("greater_than").param("value", 0))),
///     );
///
/// assert_eq!(meta.fields().len(), 1);
/// assert!(meta.find_operation("deposit").is_some());
/// ```
#[derive(Debug, Clone)]
pub struct TypeMetadata {
    type_name: String,
    rules: Vec<Arc<RuleDescriptor>>,
    fields: Vec<Member>,
    methods: Vec<Member>,
    operations: Vec<Operation>,
}

impl TypeMetadata {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            rules: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            operations: Vec::new(),
        }
    }

    /// Attach a type-level descriptor.
    pub fn rule(mut self, rule: RuleDescriptor) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Declare a field. The member kind is forced to [`MemberKind::Field`].
    pub fn field(mut self, mut member: Member) -> Self {
        member.kind = MemberKind::Field;
        self.fields.push(member);
        self
    }

    /// Declare a method. The member kind is forced to [`MemberKind::Method`].
    pub fn method(mut self, mut member: Member) -> Self {
        member.kind = MemberKind::Method;
        self.methods.push(member);
        self
    }

    /// Declare an operation with parameter descriptors.
    pub fn operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn rules(&self) -> &[Arc<RuleDescriptor>] {
        &self.rules
    }

    pub fn fields(&self) -> &[Member] {
        &self.fields
    }

    pub fn methods(&self) -> &[Member] {
        &self.methods
    }

    /// Declared members of one kind, in declaration order.
    pub fn members(&self, kind: MemberKind) -> &[Member] {
        match kind {
            MemberKind::Field => &self.fields,
            MemberKind::Method => &self.methods,
        }
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn find_operation(&self, name: &str) -> Option<&Operation> {
        self.operations.iter().find(|op| op.name == name)
    }

    pub fn find_field(&self, name: &str) -> Option<&Member> {
        self.fields.iter().find(|m| m.name == name)
    }

    pub fn find_method(&self, name: &str) -> Option<&Member> {
        self.methods.iter().find(|m| m.name == name)
    }
}
