use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::validation::{FieldError, ValidationErrors};

/// An updatable field that may be omitted, explicitly null, or set.
///
/// Use with `#[serde(default)]` so a missing key deserializes as `Unset`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Patch<T> {
    /// Key not present in the request.
    #[default]
    Unset,
    /// Key present with JSON `null`.
    Null,
    /// Key present with a value.
    Set(T),
}

impl<T> Patch<T> {
    pub fn is_unset(&self) -> bool {
        matches!(self, Patch::Unset)
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Patch::Set(value) => value.serialize(serializer),
            _ => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(|value| value.map_or(Patch::Null, Patch::Set))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

impl CreateTaskRequest {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            completed: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    /// Validate a create payload.
    ///
    /// `title` is required and must be a non-empty string. `description` may be
    /// omitted or null; `completed` defaults to `false`. Every offending field
    /// is reported, not just the first.
    pub fn from_json(value: &Value) -> Result<Self, ValidationErrors> {
        let object = as_object(value)?;
        let mut errors = ValidationErrors::default();

        if !object.contains_key("title") {
            errors.push(FieldError::missing("title"));
        }
        check_field::<String>(object, "title", false, FieldError::string_type, &mut errors);
        if object.get("title").and_then(Value::as_str) == Some("") {
            errors.push(FieldError::body(
                "title",
                "string_too_short",
                "String should have at least 1 character",
            ));
        }
        check_field::<String>(object, "description", true, FieldError::string_type, &mut errors);
        check_field::<bool>(object, "completed", false, FieldError::bool_type, &mut errors);

        errors.into_result(())?;
        Self::deserialize(value).map_err(body_error)
    }
}

/// Merge-patch payload: only supplied keys are applied.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UpdateTaskRequest {
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub title: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub description: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub completed: Patch<bool>,
}

impl UpdateTaskRequest {
    /// Validate an update payload.
    ///
    /// `title` and `completed` are not nullable, so an explicit null for
    /// either is rejected. `description: null` clears the description.
    pub fn from_json(value: &Value) -> Result<Self, ValidationErrors> {
        let object = as_object(value)?;
        let mut errors = ValidationErrors::default();

        check_field::<String>(object, "title", false, FieldError::string_type, &mut errors);
        check_field::<String>(object, "description", true, FieldError::string_type, &mut errors);
        check_field::<bool>(object, "completed", false, FieldError::bool_type, &mut errors);

        errors.into_result(())?;
        Self::deserialize(value).map_err(body_error)
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_unset() && self.description.is_unset() && self.completed.is_unset()
    }
}

/// Query parameters for listing tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: default_limit(),
        }
    }
}

impl Pagination {
    /// Both bounds must be non-negative.
    pub fn validate(self) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        for (name, value) in [("skip", self.skip), ("limit", self.limit)] {
            if value < 0 {
                errors.push(FieldError::new(
                    &["query", name],
                    "greater_than_equal",
                    "Input should be greater than or equal to 0",
                ));
            }
        }
        errors.into_result(self)
    }
}

fn default_limit() -> i64 {
    100
}

/// Record an error for `name` if it is present but not a valid `T`.
///
/// Missing keys are left to the caller; `null` is accepted only when `nullable`.
fn check_field<T: DeserializeOwned>(
    object: &Map<String, Value>,
    name: &str,
    nullable: bool,
    type_error: fn(&str) -> FieldError,
    errors: &mut ValidationErrors,
) {
    let Some(value) = object.get(name) else {
        return;
    };
    let valid = if value.is_null() {
        nullable
    } else {
        T::deserialize(value).is_ok()
    };
    if !valid {
        errors.push(type_error(name));
    }
}

fn body_error(error: serde_json::Error) -> ValidationErrors {
    ValidationErrors::single(FieldError::new(&["body"], "value_error", error.to_string()))
}

fn as_object(value: &Value) -> Result<&Map<String, Value>, ValidationErrors> {
    value.as_object().ok_or_else(|| {
        ValidationErrors::single(FieldError::new(
            &["body"],
            "dict_type",
            "Input should be a valid dictionary or object",
        ))
    })
}
