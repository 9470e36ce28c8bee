use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::errors::FieldError;

/// Replaced with the recipient's first name when a template body is copied.
pub const FIRST_NAME_TOKEN: &str = "{first_name}";

/// Single-letter template identifier, always stored uppercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TemplateId(pub char);

#[derive(Debug, Error)]
#[error("template id must be a single letter, got '{0}'")]
pub struct InvalidTemplateId(String);

impl FromStr for TemplateId {
    type Err = InvalidTemplateId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_alphabetic() => Ok(TemplateId(c.to_ascii_uppercase())),
            _ => Err(InvalidTemplateId(s.to_string())),
        }
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for TemplateId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TemplateId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Template {
    pub id: TemplateId,
    pub descriptor: String,
    pub body: String,
}

impl Template {
    /// Checks every field and returns all failures so each can be shown
    /// beside its input. Over-long bodies are rejected, never truncated.
    pub fn validate(&self, body_max: usize) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        if self.descriptor.trim().is_empty() {
            errors.push(FieldError::new("descriptor", "Descriptor cannot be empty"));
        }

        let len = self.body.chars().count();
        if self.body.trim().is_empty() {
            errors.push(FieldError::new("body", "Body cannot be empty"));
        } else if len > body_max {
            errors.push(FieldError::new(
                "body",
                format!("Body is {len} characters; the limit is {body_max}"),
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Body with the first-name placeholder substituted.
    pub fn render_for(&self, first_name: &str) -> String {
        self.body.replace(FIRST_NAME_TOKEN, first_name)
    }
}
