use super::{display_name, Bounds, FieldCheck};
use crate::diagnostic::SchemaError;
use mindmap_parser::ast::FieldDefinition;
use serde_json::Value;

/// `string` fields: a string whose character count honors the length rules
pub struct StringCheck;

impl FieldCheck for StringCheck {
    fn name(&self) -> &'static str {
        "string"
    }

    fn check(&self, field: &FieldDefinition, value: &Value, path: &str) -> Vec<SchemaError> {
        let Some(text) = value.as_str() else {
            return vec![SchemaError::new(
                path,
                format!("'{}' must be a string", display_name(field)),
                value.clone(),
            )];
        };

        let mut errors = Vec::new();
        let length = text.chars().count() as f64;
        let bounds = Bounds::length(field);

        if let Some(min) = bounds.min {
            if length < min {
                errors.push(SchemaError::new(
                    path,
                    format!("'{}' must be at least {} characters long", display_name(field), min),
                    value.clone(),
                ));
            }
        }
        if let Some(max) = bounds.max {
            if length > max {
                errors.push(SchemaError::new(
                    path,
                    format!("'{}' must be at most {} characters long", display_name(field), max),
                    value.clone(),
                ));
            }
        }

        errors
    }
}
