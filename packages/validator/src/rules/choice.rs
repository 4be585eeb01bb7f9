use super::{display_name, FieldCheck};
use crate::diagnostic::SchemaError;
use mindmap_parser::ast::FieldDefinition;
use serde_json::Value;

fn is_option(field: &FieldDefinition, value: &Value) -> bool {
    value
        .as_str()
        .is_some_and(|v| field.options().iter().any(|o| o == v))
}

fn not_an_option(field: &FieldDefinition, value: &Value, path: &str) -> SchemaError {
    SchemaError::new(
        path,
        format!(
            "Invalid value for '{}'. Valid values: {}",
            display_name(field),
            field.options().join(", ")
        ),
        value.clone(),
    )
}

/// `select` fields: exactly one of the options
pub struct SelectCheck;

impl FieldCheck for SelectCheck {
    fn name(&self) -> &'static str {
        "select"
    }

    fn check(&self, field: &FieldDefinition, value: &Value, path: &str) -> Vec<SchemaError> {
        if is_option(field, value) {
            Vec::new()
        } else {
            vec![not_an_option(field, value, path)]
        }
    }
}

/// `multiselect` fields: a list whose every element is one of the options
pub struct MultiselectCheck;

impl FieldCheck for MultiselectCheck {
    fn name(&self) -> &'static str {
        "multiselect"
    }

    fn check(&self, field: &FieldDefinition, value: &Value, path: &str) -> Vec<SchemaError> {
        let Some(items) = value.as_array() else {
            return vec![SchemaError::new(
                path,
                format!("'{}' must be a list of options", display_name(field)),
                value.clone(),
            )];
        };

        items
            .iter()
            .enumerate()
            .filter(|(_, item)| !is_option(field, item))
            .map(|(i, item)| not_an_option(field, item, &format!("{}[{}]", path, i)))
            .collect()
    }
}
