//! The restricted evaluation strategy: `problem` followed by `.`-separated
//! zero-argument accessors.

use super::Evaluate;
use crate::descriptor::RuleDescriptor;
use crate::error::{AccessError, InterpolationError};
use crate::inspect::Inspect;
use crate::target::Target;
use crate::violation::Violation;
use serde_json::Value;
use std::borrow::Cow;

/// Name the rendered violation is bound to.
pub const ROOT: &str = "problem";

/// Resolves `problem.a.b.c` chains.
///
/// Each segment reads a property of the previous result. When a segment names
/// nothing readable, evaluation stops and the last resolved value is rendered.
/// Segments may be written as calls (`problem.value()`).
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessorChain;

impl AccessorChain {
    pub fn new() -> Self {
        Self
    }
}

impl Evaluate for AccessorChain {
    fn evaluate(&self, expression: &str, problem: &Violation<'_>) -> Result<String, InterpolationError> {
        let mut segments = expression
            .split('.')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(|segment| segment.strip_suffix("()").unwrap_or(segment).trim_end());

        let root = segments.next().unwrap_or_default();
        if root != ROOT {
            return Err(InterpolationError::UnknownIdentifier {
                identifier: root.to_string(),
                expression: expression.to_string(),
            });
        }

        let mut node = Node::Violation(problem);
        for segment in segments {
            match node.member(segment) {
                Ok(Some(next)) => node = next,
                Ok(None) => break,
                Err(source) => {
                    return Err(InterpolationError::Evaluation {
                        expression: expression.to_string(),
                        source: Box::new(source),
                    })
                }
            }
        }

        Ok(node.render())
    }
}

/// An intermediate result while walking a chain.
enum Node<'v, 's> {
    Violation(&'v Violation<'s>),
    Subject(&'s dyn Inspect),
    Rule(&'v RuleDescriptor),
    Target(&'v Target),
    Value(Cow<'v, Value>),
}

impl<'v, 's> Node<'v, 's> {
    fn owned(value: impl Into<Value>) -> Self {
        Node::Value(Cow::Owned(value.into()))
    }

    fn member(&self, name: &str) -> Result<Option<Node<'v, 's>>, AccessError> {
        let next = match self {
            Node::Violation(violation) => violation_member(*violation, name),
            Node::Subject(subject) => return subject_member(*subject, name),
            Node::Rule(rule) => rule_member(*rule, name),
            Node::Target(target) => target_member(*target, name),
            Node::Value(Cow::Borrowed(value)) => value_member(*value, name).map(Node::Value),
            Node::Value(Cow::Owned(value)) => {
                value_member(value, name).map(|v| Node::owned(v.into_owned()))
            }
        };
        Ok(next)
    }

    fn render(&self) -> String {
        match self {
            Node::Violation(violation) => violation.to_string(),
            Node::Subject(subject) => subject.type_name().to_string(),
            Node::Rule(rule) => rule.kind.clone(),
            Node::Target(target) => target.to_string(),
            Node::Value(value) => display_value(value),
        }
    }
}

/// Strings render raw, everything else as JSON.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn violation_member<'v, 's>(violation: &'v Violation<'s>, name: &str) -> Option<Node<'v, 's>> {
    let node = match name {
        "subject" | "instance" => Node::Subject(violation.subject()),
        "rule" | "descriptor" => Node::Rule(violation.rule()),
        "target" => Node::Target(violation.target()),
        "value" => Node::Value(Cow::Borrowed(violation.value())),
        "code" => Node::owned(violation.code()),
        "message_key" => Node::owned(violation.message_key()),
        "details" => Node::owned(Value::Object(violation.details().clone())),
        other => Node::Value(Cow::Borrowed(violation.details().get(other)?)),
    };
    Some(node)
}

fn subject_member<'v, 's>(
    subject: &'s dyn Inspect,
    name: &str,
) -> Result<Option<Node<'v, 's>>, AccessError> {
    if name == "type_name" {
        return Ok(Some(Node::owned(subject.type_name())));
    }

    if let Some(value) = found(subject.read_field(name))? {
        return Ok(Some(Node::owned(value)));
    }
    if let Some(value) = found(subject.call_accessor(name))? {
        return Ok(Some(Node::owned(value)));
    }
    Ok(found(subject.call_accessor(&format!("get_{name}")))?.map(Node::owned))
}

/// A missing member is not an error, it ends the chain.
fn found(read: Result<Value, AccessError>) -> Result<Option<Value>, AccessError> {
    match read {
        Ok(value) => Ok(Some(value)),
        Err(AccessError::NoSuchMember { .. }) => Ok(None),
        Err(err) => Err(err),
    }
}

fn rule_member<'v, 's>(rule: &'v RuleDescriptor, name: &str) -> Option<Node<'v, 's>> {
    let node = match name {
        "kind" => Node::owned(rule.kind.as_str()),
        "validator" => Node::owned(rule.validator.clone().map_or(Value::Null, Value::String)),
        "message_key" => Node::owned(rule.message_key.clone().map_or(Value::Null, Value::String)),
        "required" => Node::owned(rule.required),
        "params" => Node::owned(Value::Object(rule.params.clone())),
        other => Node::Value(Cow::Borrowed(rule.parameter(other)?)),
    };
    Some(node)
}

fn target_member<'v, 's>(target: &'v Target, name: &str) -> Option<Node<'v, 's>> {
    let node = match (name, target) {
        ("kind", _) => Node::owned(target.kind()),
        ("name", _) => Node::owned(target.name()),
        ("method", Target::Parameter { method, .. }) => Node::owned(method.as_str()),
        ("index", Target::Parameter { index, .. }) => Node::owned(*index),
        _ => return None,
    };
    Some(node)
}

fn value_member<'a>(value: &'a Value, name: &str) -> Option<Cow<'a, Value>> {
    match value {
        Value::Object(map) => {
            if let Some(found) = map.get(name) {
                return Some(Cow::Borrowed(found));
            }
        }
        Value::Array(items) => {
            if let Ok(index) = name.parse::<usize>() {
                return items.get(index).map(Cow::Borrowed);
            }
        }
        _ => {}
    }

    if name != "len" && name != "length" {
        return None;
    }
    let len = match value {
        Value::String(s) => s.chars().count(),
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        _ => return None,
    };
    Some(Cow::Owned(Value::from(len)))
}
