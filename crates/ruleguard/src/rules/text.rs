use super::{expect_str, Absence, ValueRule};
use crate::descriptor::RuleDescriptor;
use crate::error::BoxError;
use dashmap::DashMap;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

static PATTERNS: OnceLock<DashMap<String, Regex>> = OnceLock::new();

/// The anchored form of `pattern`, compiled once per distinct pattern.
fn anchored(pattern: &str) -> Result<Regex, regex::Error> {
    let cache = PATTERNS.get_or_init(DashMap::new);
    if let Some(hit) = cache.get(pattern) {
        return Ok(hit.value().clone());
    }

    let compiled = Regex::new(&format!("^(?:{pattern})$"))?;
    cache.insert(pattern.to_string(), compiled.clone());
    Ok(compiled)
}

fn char_len(value: &Value, rule: &RuleDescriptor) -> Result<usize, BoxError> {
    Ok(expect_str(value, rule)?.chars().count())
}

/// At least `value` characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinLength;

impl ValueRule for MinLength {
    fn passes(&self, value: &Value, rule: &RuleDescriptor) -> Result<bool, BoxError> {
        Ok(char_len(value, rule)? >= rule.param_as::<usize>("value")?)
    }
}

/// At most `value` characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxLength;

impl ValueRule for MaxLength {
    fn passes(&self, value: &Value, rule: &RuleDescriptor) -> Result<bool, BoxError> {
        Ok(char_len(value, rule)? <= rule.param_as::<usize>("value")?)
    }
}

/// Between `min` and `max` characters, inclusive.
#[derive(Debug, Clone, Copy, Default)]
pub struct Length;

impl ValueRule for Length {
    fn passes(&self, value: &Value, rule: &RuleDescriptor) -> Result<bool, BoxError> {
        let len = char_len(value, rule)?;
        let min: usize = rule.param_as("min")?;
        let max: usize = rule.param_as("max")?;
        Ok((min..=max).contains(&len))
    }
}

/// Contains the `value` substring.
#[derive(Debug, Clone, Copy, Default)]
pub struct Contains;

impl ValueRule for Contains {
    fn absence(&self) -> Absence {
        Absence::Blank
    }

    fn passes(&self, value: &Value, rule: &RuleDescriptor) -> Result<bool, BoxError> {
        let needle: String = rule.param_as("value")?;
        Ok(expect_str(value, rule)?.contains(&needle))
    }
}

/// One of the entries of the `value` list.
///
/// Text is compared as text (case-insensitively with `ignore_case`), numbers
/// numerically.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowOnly;

impl ValueRule for AllowOnly {
    fn absence(&self) -> Absence {
        Absence::Blank
    }

    fn passes(&self, value: &Value, rule: &RuleDescriptor) -> Result<bool, BoxError> {
        let allowed: Vec<Value> = rule.param_as("value")?;

        if let Some(number) = value.as_f64() {
            return Ok(allowed.iter().any(|entry| entry.as_f64() == Some(number)));
        }

        let text = expect_str(value, rule)?;
        let ignore_case = rule.param_opt::<bool>("ignore_case")?.unwrap_or(false);
        Ok(allowed.iter().filter_map(Value::as_str).any(|entry| {
            if ignore_case {
                entry.to_lowercase() == text.to_lowercase()
            } else {
                entry == text
            }
        }))
    }
}

/// The whole text matches the `value` pattern.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexRule;

impl ValueRule for RegexRule {
    fn absence(&self) -> Absence {
        Absence::Blank
    }

    fn passes(&self, value: &Value, rule: &RuleDescriptor) -> Result<bool, BoxError> {
        let pattern: String = rule.param_as("value")?;
        Ok(anchored(&pattern)?.is_match(expect_str(value, rule)?))
    }
}

/// No lower case letters.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpperCase;

impl ValueRule for UpperCase {
    fn absence(&self) -> Absence {
        Absence::Blank
    }

    fn passes(&self, value: &Value, rule: &RuleDescriptor) -> Result<bool, BoxError> {
        Ok(!expect_str(value, rule)?.chars().any(char::is_lowercase))
    }
}

/// No upper case letters.
#[derive(Debug, Clone, Copy, Default)]
pub struct LowerCase;

impl ValueRule for LowerCase {
    fn absence(&self) -> Absence {
        Absence::Blank
    }

    fn passes(&self, value: &Value, rule: &RuleDescriptor) -> Result<bool, BoxError> {
        Ok(!expect_str(value, rule)?.chars().any(char::is_uppercase))
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::violates;
    use super::*;
    use serde_json::json;

    #[test]
    fn min_and_max_length_count_chars() {
        let min = RuleDescriptor::rule("min_length").param("value", 3);
        assert!(violates(&MinLength, min.clone(), json!("ab")).unwrap());
        assert!(!violates(&MinLength, min.clone(), json!("abc")).unwrap());
        assert!(!violates(&MinLength, min.clone(), json!("äöü")).unwrap());
        // Empty text is present for the length rules.
        assert!(violates(&MinLength, min, json!("")).unwrap());

        let max = RuleDescriptor::rule("max_length").param("value", 3);
        assert!(!violates(&MaxLength, max.clone(), json!("abc")).unwrap());
        assert!(violates(&MaxLength, max, json!("abcd")).unwrap());
    }

    #[test]
    fn length_range_is_inclusive() {
        let rule = RuleDescriptor::rule("length").param("min", 2).param("max", 4);
        assert!(violates(&Length, rule.clone(), json!("a")).unwrap());
        assert!(!violates(&Length, rule.clone(), json!("ab")).unwrap());
        assert!(!violates(&Length, rule.clone(), json!("abcd")).unwrap());
        assert!(violates(&Length, rule, json!("abcde")).unwrap());
    }

    #[test]
    fn missing_parameter_is_an_error() {
        let rule = RuleDescriptor::rule("length").param("min", 2);
        assert!(violates(&Length, rule, json!("abc")).is_err());
    }

    #[test]
    fn contains_substring() {
        let rule = RuleDescriptor::rule("contains").param("value", "@");
        assert!(!violates(&Contains, rule.clone(), json!("a@b")).unwrap());
        assert!(violates(&Contains, rule.clone(), json!("ab")).unwrap());
        assert!(!violates(&Contains, rule.clone(), json!("")).unwrap());
        assert!(violates(&Contains, rule.required(true), json!("")).unwrap());
    }

    #[test]
    fn allow_only_text_and_numbers() {
        let rule = RuleDescriptor::rule("allow_only").param("value", ["red", "green"]);
        assert!(!violates(&AllowOnly, rule.clone(), json!("red")).unwrap());
        assert!(violates(&AllowOnly, rule.clone(), json!("RED")).unwrap());
        assert!(!violates(&AllowOnly, rule.param("ignore_case", true), json!("RED")).unwrap());

        let numbers = RuleDescriptor::rule("allow_only").param("value", [1.5, 3.0]);
        assert!(!violates(&AllowOnly, numbers.clone(), json!(3)).unwrap());
        assert!(violates(&AllowOnly, numbers, json!(2)).unwrap());
    }

    #[test]
    fn regex_matches_whole_text() {
        let rule = RuleDescriptor::rule("regex").param("value", "[a-z]+");
        assert!(!violates(&RegexRule, rule.clone(), json!("abc")).unwrap());
        assert!(violates(&RegexRule, rule, json!("abc1")).unwrap());

        let broken = RuleDescriptor::rule("regex").param("value", "(");
        assert!(violates(&RegexRule, broken, json!("abc")).is_err());
    }

    #[test]
    fn regex_patterns_compile_once() {
        let rule = RuleDescriptor::rule("regex").param("value", "[0-9]{2}-[a-z]");
        assert!(!violates(&RegexRule, rule.clone(), json!("12-x")).unwrap());
        assert!(violates(&RegexRule, rule, json!("12-xy")).unwrap());

        let cache = PATTERNS.get().unwrap();
        let cached = cache.get("[0-9]{2}-[a-z]").map(|hit| hit.as_str().to_string());
        assert_eq!(cached.as_deref(), Some("^(?:[0-9]{2}-[a-z])$"));

        // Broken patterns are never stored.
        assert!(anchored("(").is_err());
        assert!(!cache.contains_key("("));
    }

    #[test]
    fn letter_case() {
        let upper = RuleDescriptor::rule("upper_case");
        assert!(!violates(&UpperCase, upper.clone(), json!("ABC 123")).unwrap());
        assert!(violates(&UpperCase, upper, json!("AbC")).unwrap());

        let lower = RuleDescriptor::rule("lower_case");
        assert!(!violates(&LowerCase, lower.clone(), json!("abc-1")).unwrap());
        assert!(violates(&LowerCase, lower, json!("aBc")).unwrap());
    }
}
