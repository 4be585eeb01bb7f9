use super::{display_name, FieldCheck};
use crate::diagnostic::SchemaError;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use mindmap_parser::ast::FieldDefinition;
use serde_json::Value;

/// Accepted date spellings besides RFC 3339
const DATE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

/// RFC 3339 timestamps, plain `YYYY-MM-DD` dates and local date-times
pub fn is_valid_date(text: &str) -> bool {
    let text = text.trim();
    DateTime::parse_from_rfc3339(text).is_ok()
        || NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok()
        || DATE_FORMATS
            .iter()
            .any(|format| NaiveDateTime::parse_from_str(text, format).is_ok())
}

pub struct DateCheck;

impl FieldCheck for DateCheck {
    fn name(&self) -> &'static str {
        "date"
    }

    fn check(&self, field: &FieldDefinition, value: &Value, path: &str) -> Vec<SchemaError> {
        if value.as_str().is_some_and(is_valid_date) {
            return Vec::new();
        }

        vec![SchemaError::new(
            path,
            format!("'{}' must be a valid date", display_name(field)),
            value.clone(),
        )]
    }
}
