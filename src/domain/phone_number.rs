use serde::{de::Visitor, Deserialize, Deserializer, Serialize};
use std::fmt;

/// Country code assumed for numbers entered without a leading `+`.
pub const DEFAULT_COUNTRY_CODE: &str = "1";

const NATIONAL_NUMBER_LENGTH: usize = 10;
const MIN_DIGITS: usize = 10;
const MAX_DIGITS: usize = 15;

/// A phone number in canonical E.164-like form (`+` followed by digits).
///
/// Every storage key and lookup goes through [`PhoneNumber::normalize`], so
/// two inputs that differ only in punctuation resolve to the same subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PhoneNumber(String);

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for PhoneNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PhoneNumberVisitor;

        impl<'de> Visitor<'de> for PhoneNumberVisitor {
            type Value = PhoneNumber;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a valid phone number string")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                PhoneNumber::parse(value).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(PhoneNumberVisitor)
    }
}

impl PhoneNumber {
    /// Canonicalizes any input. Never fails: garbage in yields a canonical
    /// string that [`PhoneNumber::parse`] will reject.
    ///
    /// Keeps digits and a `+` that appears before the first digit; everything
    /// else is dropped. Without a `+`, the default country code is prefixed
    /// unless the digits already carry it in front of a national number.
    pub fn normalize(raw: &str) -> Self {
        let mut has_plus = false;
        let mut digits = String::with_capacity(raw.len());
        for c in raw.chars() {
            if c.is_ascii_digit() {
                digits.push(c);
            } else if c == '+' && digits.is_empty() {
                has_plus = true;
            }
        }

        if has_plus {
            return Self(format!("+{digits}"));
        }
        let carries_country_code = digits.len()
            == DEFAULT_COUNTRY_CODE.len() + NATIONAL_NUMBER_LENGTH
            && digits.starts_with(DEFAULT_COUNTRY_CODE);
        if carries_country_code {
            Self(format!("+{digits}"))
        } else {
            Self(format!("+{DEFAULT_COUNTRY_CODE}{digits}"))
        }
    }

    /// Normalizes, then accepts only `+` followed by 10 to 15 digits.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let candidate = Self::normalize(raw);
        let digits = candidate.0.trim_start_matches('+');
        let digit_count_ok = (MIN_DIGITS..=MAX_DIGITS).contains(&digits.len());
        if digit_count_ok && digits.chars().all(|c| c.is_ascii_digit()) {
            Ok(candidate)
        } else {
            Err(format!("{raw} is not a valid phone number."))
        }
    }
}
