use super::{display_name, Bounds, FieldCheck};
use crate::diagnostic::SchemaError;
use mindmap_parser::ast::FieldDefinition;
use serde_json::Value;

/// `number` fields: a JSON number within the `range`/`min`/`max` rules
pub struct NumberCheck;

impl FieldCheck for NumberCheck {
    fn name(&self) -> &'static str {
        "number"
    }

    fn check(&self, field: &FieldDefinition, value: &Value, path: &str) -> Vec<SchemaError> {
        let Some(number) = value.as_f64() else {
            return vec![SchemaError::new(
                path,
                format!("'{}' must be a number", display_name(field)),
                value.clone(),
            )];
        };

        let mut errors = Vec::new();
        let bounds = Bounds::numeric(field);

        if let Some(min) = bounds.min {
            if number < min {
                errors.push(SchemaError::new(
                    path,
                    format!("'{}' must be at least {}", display_name(field), min),
                    value.clone(),
                ));
            }
        }
        if let Some(max) = bounds.max {
            if number > max {
                errors.push(SchemaError::new(
                    path,
                    format!("'{}' must be at most {}", display_name(field), max),
                    value.clone(),
                ));
            }
        }

        errors
    }
}
