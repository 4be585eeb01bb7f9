use crate::diagnostic::{SchemaError, ValidationResult};
use crate::rules::{check_field, display_name};
use crate::schema_check::validate_schema_definition;
use mindmap_parser::ast::{CustomSchema, MindmapDocument, MindmapNode};
use mindmap_parser::index::{display_path, NodeIndex};
use serde_json::Value;
use std::time::Instant;

/// Validate every node's custom fields against `schema`.
///
/// Without a schema the document is trivially valid. A schema whose
/// definition is broken reports only its definition errors.
pub fn validate(document: &MindmapDocument, schema: Option<&CustomSchema>) -> ValidationResult {
    let Some(schema) = schema else {
        return ValidationResult::ok();
    };

    let started = Instant::now();
    let definition_errors = validate_schema_definition(schema);
    if !definition_errors.is_empty() {
        tracing::warn!(
            errors = definition_errors.len(),
            "schema definition is invalid, skipping custom field checks"
        );
        return ValidationResult::from_errors(definition_errors);
    }

    let mut errors = Vec::new();
    validate_node(&document.root, "root", schema, &mut errors);

    tracing::debug!(
        nodes = document.node_count(),
        errors = errors.len(),
        elapsed = ?started.elapsed(),
        "validated document"
    );
    ValidationResult::from_errors(errors)
}

/// Recursively validate a node and its children
fn validate_node(node: &MindmapNode, path: &str, schema: &CustomSchema, errors: &mut Vec<SchemaError>) {
    for field in &schema.custom_fields {
        let field_path = format!("{}.{}", path, field.name);

        match node.custom_fields.get(&field.name) {
            None | Some(Value::Null) => {
                if field.required {
                    errors.push(SchemaError::missing(
                        field_path,
                        format!("Required field '{}' is missing", display_name(field)),
                    ));
                }
            }
            Some(value) => errors.extend(check_field(field, value, &field_path)),
        }
    }

    for (i, child) in node.children.iter().enumerate() {
        let child_path = format!("{}.children[{}]", path, i);
        validate_node(child, &child_path, schema, errors);
    }
}

/// Tree integrity: every repeated node id is an error at its occurrence
pub fn validate_tree(index: &NodeIndex) -> ValidationResult {
    let errors = index
        .duplicates()
        .iter()
        .map(|duplicate| {
            SchemaError::new(
                display_path(&duplicate.path),
                format!("Duplicate node id '{}'", duplicate.id),
                Value::String(duplicate.id.clone()),
            )
        })
        .collect();

    ValidationResult::from_errors(errors)
}

/// Tree integrity and custom fields together
pub fn validate_document(
    document: &MindmapDocument,
    index: &NodeIndex,
    schema: Option<&CustomSchema>,
) -> ValidationResult {
    validate_tree(index).merge(validate(document, schema))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindmap_parser::ast::{FieldDefinition, FieldType};
    use serde_json::json;

    fn document() -> MindmapDocument {
        MindmapDocument::new(
            "1.0",
            "Doc",
            MindmapNode::new("root", "Root")
                .with_custom_field("priority", json!("high"))
                .with_child(MindmapNode::new("a", "A").with_custom_field("priority", json!("urgent")))
                .with_child(
                    MindmapNode::new("b", "B")
                        .with_child(MindmapNode::new("c", "C").with_custom_field("priority", Value::Null)),
                ),
        )
    }

    fn schema() -> CustomSchema {
        CustomSchema {
            version: "1".to_string(),
            custom_fields: vec![FieldDefinition::new("priority", "Priority", FieldType::Select)
                .with_options(["low", "high"])
                .required()],
            display_rules: Vec::new(),
        }
    }

    #[test]
    fn test_no_schema_is_valid() {
        assert_eq!(validate(&document(), None), ValidationResult::ok());
    }

    #[test]
    fn test_errors_accumulate_across_tree() {
        let result = validate(&document(), Some(&schema()));
        let paths: Vec<_> = result.errors.iter().map(|e| e.path.as_str()).collect();

        assert!(!result.valid);
        assert_eq!(
            paths,
            vec![
                "root.children[0].priority",
                "root.children[1].priority",
                "root.children[1].children[0].priority",
            ]
        );
        assert_eq!(result.errors[0].value, json!("urgent"));
        assert_eq!(result.errors[1].message, "Required field 'Priority' is missing");
    }

    #[test]
    fn test_broken_schema_skips_walk() {
        let mut schema = schema();
        schema.custom_fields[0].options = Some(Vec::new());

        let result = validate(&document(), Some(&schema));
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].path, "schema.customFields[0].options");
    }

    #[test]
    fn test_duplicate_ids() {
        let root = MindmapNode::new("root", "Root")
            .with_child(MindmapNode::new("x", "X"))
            .with_child(MindmapNode::new("x", "X again").with_child(MindmapNode::new("root", "R")));
        let index = NodeIndex::build(&root);

        let result = validate_tree(&index);
        let paths: Vec<_> = result.errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["root.children[1]", "root.children[1].children[0]"]);
        assert_eq!(result.errors[0].message, "Duplicate node id 'x'");
    }

    #[test]
    fn test_validate_document_merges() {
        let doc = document();
        let index = NodeIndex::build(&doc.root);

        let result = validate_document(&doc, &index, Some(&schema()));
        assert_eq!(result.errors.len(), 3);
        assert!(validate_document(&doc, &index, None).valid);
    }
}
