use super::{display_name, FieldCheck};
use crate::diagnostic::SchemaError;
use mindmap_parser::ast::FieldDefinition;
use serde_json::Value;

pub struct BooleanCheck;

impl FieldCheck for BooleanCheck {
    fn name(&self) -> &'static str {
        "boolean"
    }

    fn check(&self, field: &FieldDefinition, value: &Value, path: &str) -> Vec<SchemaError> {
        if value.is_boolean() {
            return Vec::new();
        }

        vec![SchemaError::new(
            path,
            format!("'{}' must be true or false", display_name(field)),
            value.clone(),
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindmap_parser::ast::FieldType;
    use serde_json::json;

    #[test]
    fn test_boolean_values() {
        let field = FieldDefinition::new("done", "Done", FieldType::Boolean);
        assert!(BooleanCheck.check(&field, &json!(false), "p").is_empty());
        assert_eq!(BooleanCheck.check(&field, &json!("true"), "p").len(), 1);
        assert_eq!(BooleanCheck.check(&field, &json!(1), "p").len(), 1);
    }
}
