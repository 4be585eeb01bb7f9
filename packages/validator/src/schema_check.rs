use crate::diagnostic::SchemaError;
use mindmap_parser::ast::{CustomSchema, FieldDefinition, FieldType, RuleKind};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;

fn to_value<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_default()
}

/// Check that a schema is well formed before it is applied to any node
pub fn validate_schema_definition(schema: &CustomSchema) -> Vec<SchemaError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for (i, field) in schema.custom_fields.iter().enumerate() {
        let base = format!("schema.customFields[{}]", i);
        errors.extend(check_definition(field, &base));

        if !field.name.is_empty() && !seen.insert(field.name.as_str()) {
            errors.push(SchemaError::new(
                format!("{}.name", base),
                format!("Duplicate field name '{}'", field.name),
                Value::String(field.name.clone()),
            ));
        }
    }

    for (i, rule) in schema.display_rules.iter().enumerate() {
        let base = format!("schema.displayRules[{}]", i);

        if schema.field(&rule.field).is_none() {
            errors.push(SchemaError::new(
                format!("{}.field", base),
                format!("Display rule references unknown field '{}'", rule.field),
                Value::String(rule.field.clone()),
            ));
        }
        if let Some(depends_on) = &rule.depends_on {
            if schema.field(depends_on).is_none() {
                errors.push(SchemaError::new(
                    format!("{}.dependsOn", base),
                    format!("Display rule depends on unknown field '{}'", depends_on),
                    Value::String(depends_on.clone()),
                ));
            }
        }
    }

    errors
}

fn check_definition(field: &FieldDefinition, base: &str) -> Vec<SchemaError> {
    let mut errors = Vec::new();

    if field.name.trim().is_empty() {
        errors.push(SchemaError::missing(
            format!("{}.name", base),
            "Field definition is missing 'name'",
        ));
    }
    if field.label.trim().is_empty() {
        errors.push(SchemaError::missing(
            format!("{}.label", base),
            "Field definition is missing 'label'",
        ));
    }

    match &field.field_type {
        None => errors.push(SchemaError::missing(
            format!("{}.type", base),
            "Field definition is missing 'type'",
        )),
        Some(FieldType::Unknown(name)) => errors.push(SchemaError::new(
            format!("{}.type", base),
            format!("Unknown field type '{}'", name),
            Value::String(name.clone()),
        )),
        Some(field_type) if field_type.has_options() && field.options().is_empty() => {
            errors.push(SchemaError::new(
                format!("{}.options", base),
                format!("A {} field needs at least one option", field_type),
                to_value(&field.options),
            ));
        }
        Some(_) => {}
    }

    for (j, rule) in field.validation.iter().enumerate() {
        let path = format!("{}.validation[{}]", base, j);

        if let RuleKind::Unknown(kind) = &rule.kind {
            errors.push(SchemaError::new(
                path,
                format!("Unknown validation rule '{}'", kind),
                to_value(rule),
            ));
            continue;
        }

        if let (Some(min), Some(max)) = (rule.min, rule.max) {
            if min > max {
                errors.push(SchemaError::new(
                    path,
                    format!("Rule '{}' has min {} greater than max {}", rule.kind.as_str(), min, max),
                    to_value(rule),
                ));
            }
        }
    }

    errors
}
