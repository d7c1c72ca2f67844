//! Validated value objects shared by the DTOs.
//!
//! Each type checks its invariant on construction, including when it is
//! deserialized from a response, so a DTO holding one is known to be
//! well-formed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("invalid email address: {0:?}")]
    Email(String),

    #[error("invalid phone number: {0:?}")]
    PhoneNumber(String),

    #[error("invalid amount: {0}")]
    Amount(String),
}

/// A normalized (trimmed, lowercased) email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    pub fn parse(input: &str) -> Result<Self, ValueError> {
        let email = input.trim().to_lowercase();
        let valid = match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.contains('@')
                    && !email.contains(char::is_whitespace)
                    && domain
                        .split_once('.')
                        .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
                    && !domain.ends_with('.')
            }
            None => false,
        };

        if valid {
            Ok(Self(email))
        } else {
            Err(ValueError::Email(input.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Email {
    type Error = ValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl FromStr for Email {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A Korean phone number, stored as hyphenated digits.
///
/// Accepts 9 to 11 digits starting with `0`, with optional hyphens or
/// spaces. Seoul numbers (`02`) use a two-digit area code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn parse(input: &str) -> Result<Self, ValueError> {
        let invalid = || ValueError::PhoneNumber(input.to_string());

        let stripped: String = input
            .chars()
            .filter(|c| *c != '-' && !c.is_whitespace())
            .collect();
        if !stripped.chars().all(|c| c.is_ascii_digit())
            || !stripped.starts_with('0')
            || !(9..=11).contains(&stripped.len())
        {
            return Err(invalid());
        }

        let area = if stripped.starts_with("02") { 2 } else { 3 };
        let rest = &stripped[area..];
        if !(7..=8).contains(&rest.len()) {
            return Err(invalid());
        }
        let split = rest.len() - 4;

        Ok(Self(format!(
            "{}-{}-{}",
            &stripped[..area],
            &rest[..split],
            &rest[split..]
        )))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The number without separators.
    pub fn digits(&self) -> String {
        self.0.replace('-', "")
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = ValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PhoneNumber> for String {
    fn from(value: PhoneNumber) -> Self {
        value.0
    }
}

impl FromStr for PhoneNumber {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A whole-won amount. Serialized as a plain non-negative JSON number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Won(u64);

impl Won {
    pub const ZERO: Won = Won(0);

    pub const fn new(amount: u64) -> Self {
        Self(amount)
    }

    pub const fn amount(&self) -> u64 {
        self.0
    }

    pub fn checked_sub(self, other: Won) -> Option<Won> {
        self.0.checked_sub(other.0).map(Won)
    }
}

impl TryFrom<i64> for Won {
    type Error = ValueError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u64::try_from(value)
            .map(Won)
            .map_err(|_| ValueError::Amount(value.to_string()))
    }
}

impl fmt::Display for Won {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, digit) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(digit);
        }
        write!(f, "{grouped}원")
    }
}
