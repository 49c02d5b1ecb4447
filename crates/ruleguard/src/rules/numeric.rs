use super::{expect_number, ValueRule};
use crate::descriptor::RuleDescriptor;
use crate::error::BoxError;
use serde_json::Value;

/// Strictly greater than `value`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreaterThan;

impl ValueRule for GreaterThan {
    fn passes(&self, value: &Value, rule: &RuleDescriptor) -> Result<bool, BoxError> {
        Ok(expect_number(value, rule)? > rule.param_as::<f64>("value")?)
    }
}

/// At most `value`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LessThanOrEqual;

impl ValueRule for LessThanOrEqual {
    fn passes(&self, value: &Value, rule: &RuleDescriptor) -> Result<bool, BoxError> {
        Ok(expect_number(value, rule)? <= rule.param_as::<f64>("value")?)
    }
}

/// A non-negative identifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct Id;

impl ValueRule for Id {
    fn passes(&self, value: &Value, rule: &RuleDescriptor) -> Result<bool, BoxError> {
        Ok(expect_number(value, rule)?.trunc() >= 0.0)
    }
}

/// Whole part in `0..limit`.
fn clock_unit(value: &Value, rule: &RuleDescriptor, limit: f64) -> Result<bool, BoxError> {
    let whole = expect_number(value, rule)?.trunc();
    Ok((0.0..limit).contains(&whole))
}

/// An hour of the day, `0..24`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hours;

impl ValueRule for Hours {
    fn passes(&self, value: &Value, rule: &RuleDescriptor) -> Result<bool, BoxError> {
        clock_unit(value, rule, 24.0)
    }
}

/// A minute of the hour, `0..60`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Minutes;

impl ValueRule for Minutes {
    fn passes(&self, value: &Value, rule: &RuleDescriptor) -> Result<bool, BoxError> {
        clock_unit(value, rule, 60.0)
    }
}

/// A second of the minute, `0..60`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Seconds;

impl ValueRule for Seconds {
    fn passes(&self, value: &Value, rule: &RuleDescriptor) -> Result<bool, BoxError> {
        clock_unit(value, rule, 60.0)
    }
}
