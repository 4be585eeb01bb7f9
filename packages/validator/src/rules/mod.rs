mod boolean;
mod choice;
mod date;
mod number;
mod text;

pub use boolean::BooleanCheck;
pub use choice::{MultiselectCheck, SelectCheck};
pub use date::{is_valid_date, DateCheck};
pub use number::NumberCheck;
pub use text::StringCheck;

use crate::diagnostic::SchemaError;
use mindmap_parser::ast::{FieldDefinition, FieldType};
use serde_json::Value;

/// Value check for one field type
pub trait FieldCheck {
    /// The field type this check handles
    fn name(&self) -> &'static str;

    /// Check a present, non-null value; `path` locates the value
    fn check(&self, field: &FieldDefinition, value: &Value, path: &str) -> Vec<SchemaError>;
}

/// The check for a field type. Unknown types have none; the schema
/// definition check reports them instead.
pub fn check_for(field_type: &FieldType) -> Option<&'static dyn FieldCheck> {
    match field_type {
        FieldType::String => Some(&StringCheck),
        FieldType::Number => Some(&NumberCheck),
        FieldType::Boolean => Some(&BooleanCheck),
        FieldType::Date => Some(&DateCheck),
        FieldType::Select => Some(&SelectCheck),
        FieldType::Multiselect => Some(&MultiselectCheck),
        FieldType::Unknown(_) => None,
    }
}

/// Check `value` against `field`'s type and rules
pub fn check_field(field: &FieldDefinition, value: &Value, path: &str) -> Vec<SchemaError> {
    match field.field_type.as_ref().and_then(check_for) {
        Some(check) => check.check(field, value, path),
        None => Vec::new(),
    }
}

/// Display name for messages: the label when there is one
pub(crate) fn display_name(field: &FieldDefinition) -> &str {
    if field.label.is_empty() {
        &field.name
    } else {
        &field.label
    }
}

/// Inclusive lower/upper bounds collected from a field's rules
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub(crate) struct Bounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Bounds {
    /// Tightest bounds of the numeric (`range`/`min`/`max`) rules
    pub fn numeric(field: &FieldDefinition) -> Self {
        Self::collect(field, |rule| rule.kind.is_numeric())
    }

    /// Tightest bounds of the length (`length`/`minLength`/`maxLength`) rules
    pub fn length(field: &FieldDefinition) -> Self {
        Self::collect(field, |rule| rule.kind.is_length())
    }

    fn collect(field: &FieldDefinition, wanted: impl Fn(&mindmap_parser::Rule) -> bool) -> Self {
        use mindmap_parser::RuleKind;

        let mut bounds = Self::default();
        for rule in field.validation.iter().filter(|r| wanted(r)) {
            let (min, max) = match rule.kind {
                RuleKind::Range | RuleKind::Length => (rule.min, rule.max),
                RuleKind::Min | RuleKind::MinLength => (rule.min, None),
                RuleKind::Max | RuleKind::MaxLength => (None, rule.max),
                RuleKind::Unknown(_) => (None, None),
            };
            if let Some(min) = min {
                bounds.min = Some(bounds.min.map_or(min, |m| m.max(min)));
            }
            if let Some(max) = max {
                bounds.max = Some(bounds.max.map_or(max, |m| m.min(max)));
            }
        }
        bounds
    }
}
