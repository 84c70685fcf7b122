//! Validated ISO-4217-style currency code.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A three-letter uppercase currency code (ISO-4217 style).
///
/// Parsing rejects anything that is not exactly three ASCII uppercase
/// letters, so a stored code can be trusted downstream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

/// Error returned when parsing an invalid currency code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid currency code '{0}': expected three uppercase ASCII letters")]
pub struct InvalidCurrencyCode(pub String);

impl CurrencyCode {
    /// Parses a code, uppercasing ASCII input first ("usd" -> "USD").
    ///
    /// # Errors
    ///
    /// Returns `InvalidCurrencyCode` when the input is not three ASCII letters.
    pub fn parse(input: &str) -> Result<Self, InvalidCurrencyCode> {
        let upper = input.trim().to_ascii_uppercase();
        if upper.len() == 3 && upper.bytes().all(|b| b.is_ascii_uppercase()) {
            Ok(Self(upper))
        } else {
            Err(InvalidCurrencyCode(input.to_string()))
        }
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CurrencyCode {
    type Err = InvalidCurrencyCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = InvalidCurrencyCode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("USD")]
    #[case("eur")]
    #[case(" kzt ")]
    fn test_parse_accepts_valid_codes(#[case] input: &str) {
        let code = CurrencyCode::parse(input).unwrap();
        assert_eq!(code.as_str().len(), 3);
        assert!(code.as_str().bytes().all(|b| b.is_ascii_uppercase()));
    }

    #[rstest]
    #[case("")]
    #[case("US")]
    #[case("USDT")]
    #[case("U5D")]
    #[case("доллар")]
    fn test_parse_rejects_invalid_codes(#[case] input: &str) {
        assert!(CurrencyCode::parse(input).is_err());
    }

    #[test]
    fn test_display_and_from_str() {
        let code: CurrencyCode = "usd".parse().unwrap();
        assert_eq!(code.to_string(), "USD");
    }
}
