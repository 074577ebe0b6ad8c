//! Value Objects - Immutable domain primitives
//!
//! Value objects are identified by their value rather than identity.
//! They are immutable and can be freely shared.

use serde::{Deserialize, Serialize};

/// ISO 3166-1 alpha-2 country code used as the key for all block records.
///
/// Codes are normalized to uppercase on construction, so lookups and
/// storage keys are case-insensitive: `us`, `Us` and `US` all address the
/// same blocklist entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountryCode(String);

/// Rejection for a string that is not a two-letter country code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid country code '{0}'")]
pub struct InvalidCountryCode(pub String);

impl CountryCode {
    /// Parse a country code from a string.
    ///
    /// Accepts exactly two ASCII letters (any case, surrounding whitespace
    /// ignored) and normalizes them to uppercase.
    ///
    /// # Examples
    /// ```
    /// use geo_blocker::CountryCode;
    ///
    /// assert_eq!(CountryCode::parse("us").unwrap().as_str(), "US");
    /// assert!(CountryCode::parse("usa").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, InvalidCountryCode> {
        let trimmed = s.trim();
        if trimmed.len() == 2 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(trimmed.to_ascii_uppercase()))
        } else {
            Err(InvalidCountryCode(s.to_string()))
        }
    }

    /// The normalized (uppercase) string representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for CountryCode {
    type Err = InvalidCountryCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for CountryCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CountryCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ===== Parse Tests =====

    #[test]
    fn test_parse_uppercase() {
        let code = CountryCode::parse("US").unwrap();
        assert_eq!(code.as_str(), "US");
    }

    #[test]
    fn test_parse_normalizes_case() {
        let tests = vec!["us", "Us", "uS", "US"];

        for input in tests {
            let code = CountryCode::parse(input).unwrap();
            assert_eq!(code.as_str(), "US", "Failed for input: {}", input);
        }
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let code = CountryCode::parse("  gb ").unwrap();
        assert_eq!(code.as_str(), "GB");
    }

    #[test]
    fn test_parse_rejects_invalid() {
        let invalid_inputs = vec!["", "u", "usa", "u1", "12", "U-", "united states"];

        for input in invalid_inputs {
            assert!(
                CountryCode::parse(input).is_err(),
                "Should reject input: {:?}",
                input
            );
        }
    }

    #[test]
    fn test_parse_error_carries_input() {
        let err = CountryCode::parse("bogus").unwrap_err();
        assert_eq!(err, InvalidCountryCode("bogus".to_string()));
        assert!(err.to_string().contains("bogus"));
    }

    // ===== Equality and Hash Tests =====

    #[test]
    fn test_case_insensitive_equality() {
        let lower = CountryCode::parse("eg").unwrap();
        let upper = CountryCode::parse("EG").unwrap();

        assert_eq!(lower, upper);
    }

    #[test]
    fn test_hash_consistency_across_cases() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(CountryCode::parse("jp").unwrap());

        assert!(set.contains(&CountryCode::parse("JP").unwrap()));
    }

    // ===== Display and Conversion Tests =====

    #[test]
    fn test_display() {
        let code = CountryCode::parse("br").unwrap();
        assert_eq!(format!("{}", code), "BR");
    }

    #[test]
    fn test_from_str() {
        let code: CountryCode = "de".parse().unwrap();
        assert_eq!(code.as_str(), "DE");
    }

    #[test]
    fn test_serde_roundtrip() {
        let code = CountryCode::parse("fr").unwrap();
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "\"FR\"");

        let back: CountryCode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, code);
    }
}
