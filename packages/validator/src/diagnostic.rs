use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A schema or tree problem located by its dotted path in the logical tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaError {
    /// Dotted path, e.g. `root.children[2].priority`
    pub path: String,

    /// Human-readable message
    pub message: String,

    /// The offending value (`null` when it is missing)
    pub value: Value,
}

impl SchemaError {
    pub fn new(path: impl Into<String>, message: impl Into<String>, value: Value) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            value,
        }
    }

    pub fn missing(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(path, message, Value::Null)
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<SchemaError>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    pub fn from_errors(errors: Vec<SchemaError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Combine two results; valid only if both are
    pub fn merge(mut self, other: ValidationResult) -> Self {
        self.valid = self.valid && other.valid;
        self.errors.extend(other.errors);
        self
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::ok()
    }
}
