use serde::{de::Visitor, Deserialize, Deserializer, Serialize};
use std::fmt;
use unicode_segmentation::UnicodeSegmentation;

const MIN_LENGTH: usize = 2;
const MAX_LENGTH: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriberName(String);

impl AsRef<str> for SubscriberName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubscriberName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for SubscriberName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SubscriberNameVisitor;

        impl<'de> Visitor<'de> for SubscriberNameVisitor {
            type Value = SubscriberName;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a valid subscriber name string")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                SubscriberName::parse(value).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(SubscriberNameVisitor)
    }
}

impl SubscriberName {
    /// Trims the input and checks length (in graphemes) and character set.
    /// The error string is user-facing.
    pub fn parse(s: &str) -> Result<Self, String> {
        let trimmed = s.trim();
        let length = trimmed.graphemes(true).count();

        if length < MIN_LENGTH {
            return Err("Name must be at least 2 characters long".to_string());
        }
        if length > MAX_LENGTH {
            return Err("Name must be less than 100 characters".to_string());
        }
        let allowed =
            |c: char| c.is_ascii_alphabetic() || c.is_whitespace() || c == '-' || c == '\'';
        if !trimmed.chars().all(allowed) {
            return Err("Name contains invalid characters".to_string());
        }
        Ok(Self(trimmed.to_string()))
    }
}
