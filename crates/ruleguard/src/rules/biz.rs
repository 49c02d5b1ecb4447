//! US business identifiers.
//!
//! Each rule accepts a `mode` parameter choosing between the dashed form, the
//! plain digit form, or both.

use super::{expect_str, Absence, ValueRule};
use crate::descriptor::RuleDescriptor;
use crate::error::BoxError;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Mode {
    Dashes,
    NoDashes,
    Both,
}

impl Mode {
    fn from_rule(rule: &RuleDescriptor, default: Mode) -> Result<Mode, BoxError> {
        Ok(rule.param_opt("mode")?.unwrap_or(default))
    }

    fn dashes(self) -> bool {
        self != Mode::NoDashes
    }

    fn plain(self) -> bool {
        self != Mode::Dashes
    }
}

/// ASCII digits everywhere except `dashes`, which must hold `-`.
fn shaped(text: &str, len: usize, dashes: &[usize]) -> bool {
    text.len() == len
        && text.bytes().enumerate().all(|(i, b)| {
            if dashes.contains(&i) {
                b == b'-'
            } else {
                b.is_ascii_digit()
            }
        })
}

fn check(
    value: &Value,
    rule: &RuleDescriptor,
    default: Mode,
    plain_len: usize,
    dashed_len: usize,
    dashes: &[usize],
) -> Result<bool, BoxError> {
    let text = expect_str(value, rule)?;
    let mode = Mode::from_rule(rule, default)?;
    Ok((mode.plain() && shaped(text, plain_len, &[]))
        || (mode.dashes() && shaped(text, dashed_len, dashes)))
}

/// `555-123-4567`, or `5551234567` depending on `mode` (default `dashes`).
#[derive(Debug, Clone, Copy, Default)]
pub struct Phone;

impl ValueRule for Phone {
    fn absence(&self) -> Absence {
        Absence::Blank
    }

    fn passes(&self, value: &Value, rule: &RuleDescriptor) -> Result<bool, BoxError> {
        check(value, rule, Mode::Dashes, 10, 12, &[3, 7])
    }
}

/// `123-45-6789` or `123456789` (default `both`).
#[derive(Debug, Clone, Copy, Default)]
pub struct Ssn;

impl ValueRule for Ssn {
    fn absence(&self) -> Absence {
        Absence::Blank
    }

    fn passes(&self, value: &Value, rule: &RuleDescriptor) -> Result<bool, BoxError> {
        check(value, rule, Mode::Both, 9, 11, &[3, 6])
    }
}

/// `12345` or `12345-6789` (default `both`). With `mode = "no_dashes"` only
/// the five digit form passes, with `"dashes"` only the nine digit form.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipCode;

impl ValueRule for ZipCode {
    fn absence(&self) -> Absence {
        Absence::Blank
    }

    fn passes(&self, value: &Value, rule: &RuleDescriptor) -> Result<bool, BoxError> {
        check(value, rule, Mode::Both, 5, 10, &[5])
    }
}
