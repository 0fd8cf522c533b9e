//! Structural validation errors reported back to clients as 422 bodies.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// One offending input location.
///
/// Serialises as `{"loc": ["body", "title"], "msg": "...", "type": "missing"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldError {
    pub fn new(loc: &[&str], kind: &str, msg: impl Into<String>) -> Self {
        Self {
            loc: loc.iter().map(|s| s.to_string()).collect(),
            msg: msg.into(),
            kind: kind.to_string(),
        }
    }

    pub fn body(field: &str, kind: &str, msg: impl Into<String>) -> Self {
        Self::new(&["body", field], kind, msg)
    }

    pub fn missing(field: &str) -> Self {
        Self::body(field, "missing", "Field required")
    }

    pub fn string_type(field: &str) -> Self {
        Self::body(field, "string_type", "Input should be a valid string")
    }

    pub fn bool_type(field: &str) -> Self {
        Self::body(field, "bool_type", "Input should be a valid boolean")
    }
}

/// Every field that failed validation for a single request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn single(error: FieldError) -> Self {
        Self(vec![error])
    }

    pub fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// `Ok(value)` when nothing was recorded, otherwise `Err(self)`.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation error(s)", self.0.len())?;
        for error in &self.0 {
            write!(f, "; {}: {}", error.loc.join("."), error.msg)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Parse a raw request body into JSON.
///
/// An empty or malformed body is reported at `["body"]`.
pub fn parse_json_body(bytes: &[u8]) -> Result<Value, ValidationErrors> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(ValidationErrors::single(FieldError::new(
            &["body"],
            "missing",
            "Field required",
        )));
    }

    serde_json::from_slice(bytes).map_err(|e| {
        ValidationErrors::single(FieldError::new(
            &["body"],
            "json_invalid",
            format!("JSON decode error: {}", e),
        ))
    })
}
