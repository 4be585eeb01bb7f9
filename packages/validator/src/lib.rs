mod diagnostic;
mod rules;
mod schema_check;
mod validator;

pub use diagnostic::{SchemaError, ValidationResult};
pub use rules::{
    check_field, check_for, is_valid_date, BooleanCheck, DateCheck, FieldCheck, MultiselectCheck,
    NumberCheck, SelectCheck, StringCheck,
};
pub use schema_check::validate_schema_definition;
pub use validator::{validate, validate_document, validate_tree};
