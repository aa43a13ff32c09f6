//! Registry numbers (CAS RN) and their validation.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Two to seven digits, two digits, one check digit.
static REGISTRY_NUMBER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2,7}-\d{2}-\d$").expect("registry number regex should compile"));

/// Error returned when a string is not a well-formed registry number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid registry number '{input}'; expected NNNNNNN-NN-N")]
pub struct InvalidRegistryNumber {
    input: String,
}

impl InvalidRegistryNumber {
    /// The rejected input, untrimmed.
    pub fn input(&self) -> &str {
        &self.input
    }
}

/// A validated registry number such as `50-00-0`.
///
/// The only way to obtain one is through parsing, which trims surrounding
/// whitespace and checks the dashed digit pattern. The value never changes
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegistryNumber(String);

impl RegistryNumber {
    /// Parse and validate a registry number.
    pub fn parse(input: &str) -> Result<Self, InvalidRegistryNumber> {
        let trimmed = input.trim();
        if REGISTRY_NUMBER_REGEX.is_match(trimmed) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(InvalidRegistryNumber { input: input.to_string() })
        }
    }

    /// Returns true when `input` would parse.
    pub fn is_valid(input: &str) -> bool {
        REGISTRY_NUMBER_REGEX.is_match(input.trim())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The digits before the first dash, as an integer.
    ///
    /// At most seven digits, so this always fits.
    pub fn leading_segment(&self) -> u64 {
        self.0
            .split('-')
            .next()
            .and_then(|segment| segment.parse().ok())
            .unwrap_or(u64::MAX)
    }
}

impl FromStr for RegistryNumber {
    type Err = InvalidRegistryNumber;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RegistryNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RegistryNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for RegistryNumber {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl Serialize for RegistryNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RegistryNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_numbers_and_trims() {
        assert_eq!(RegistryNumber::parse("50-00-0").unwrap().as_str(), "50-00-0");
        assert_eq!(RegistryNumber::parse("  7732-18-5\t").unwrap().as_str(), "7732-18-5");
        assert!(RegistryNumber::parse("1234567-89-0").is_ok());
    }

    #[test]
    fn rejects_malformed_numbers() {
        for input in ["", "   ", "5-00-0", "12345678-00-0", "50-0-0", "50-00-00", "50_00_0", "50-00-0x", "abc-de-f"] {
            let error = RegistryNumber::parse(input).unwrap_err();
            assert_eq!(error.input(), input);
            assert!(!RegistryNumber::is_valid(input), "{input:?} should be invalid");
        }
    }

    #[test]
    fn leading_segment_is_numeric_prefix() {
        assert_eq!(RegistryNumber::parse("7732-18-5").unwrap().leading_segment(), 7732);
        assert_eq!(RegistryNumber::parse("0050-00-0").unwrap().leading_segment(), 50);
    }

    #[test]
    fn deserialize_validates() {
        let parsed: RegistryNumber = serde_json::from_str("\" 64-17-5 \"").unwrap();
        assert_eq!(parsed.as_str(), "64-17-5");
        assert!(serde_json::from_str::<RegistryNumber>("\"not-a-number\"").is_err());
    }
}
