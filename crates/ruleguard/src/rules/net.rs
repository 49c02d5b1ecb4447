use super::{expect_str, Absence, ValueRule};
use crate::descriptor::RuleDescriptor;
use crate::error::BoxError;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

// Pre-compiled regex patterns
static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
static URL_REGEX: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_REGEX.get_or_init(|| {
        // RFC 5322 simplified email regex
        Regex::new(
            r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
        )
        .expect("email regex is valid")
    })
}

fn url_regex() -> &'static Regex {
    URL_REGEX.get_or_init(|| {
        Regex::new(r"^(https?|ftp)://[^\s/$.?#].[^\s]*$").expect("url regex is valid")
    })
}

/// An email address.
#[derive(Debug, Clone, Copy, Default)]
pub struct Email;

impl ValueRule for Email {
    fn absence(&self) -> Absence {
        Absence::Blank
    }

    fn passes(&self, value: &Value, rule: &RuleDescriptor) -> Result<bool, BoxError> {
        Ok(email_regex().is_match(expect_str(value, rule)?))
    }
}

/// An `http`, `https` or `ftp` URL.
#[derive(Debug, Clone, Copy, Default)]
pub struct Url;

impl ValueRule for Url {
    fn absence(&self) -> Absence {
        Absence::Blank
    }

    fn passes(&self, value: &Value, rule: &RuleDescriptor) -> Result<bool, BoxError> {
        Ok(url_regex().is_match(expect_str(value, rule)?))
    }
}

/// A dotted-quad IPv4 address.
#[derive(Debug, Clone, Copy, Default)]
pub struct IpAddress;

impl ValueRule for IpAddress {
    fn absence(&self) -> Absence {
        Absence::Blank
    }

    fn passes(&self, value: &Value, rule: &RuleDescriptor) -> Result<bool, BoxError> {
        let octets: Vec<&str> = expect_str(value, rule)?.split('.').collect();
        Ok(octets.len() == 4 && octets.iter().all(|octet| is_octet(octet)))
    }
}

fn is_octet(octet: &str) -> bool {
    (1..=3).contains(&octet.len())
        && octet.bytes().all(|b| b.is_ascii_digit())
        && octet.parse::<u16>().is_ok_and(|n| n <= 255)
}
