/// Tests to verify the serializer round-trips every part of the model
use crate::*;
use serde_json::json;

fn rich_document() -> MindmapDocument {
    let schema = CustomSchema {
        version: "1".to_string(),
        custom_fields: vec![
            FieldDefinition::new("effort", "Effort", FieldType::Number)
                .with_rule(Rule::range(1.0, 13.0)),
            FieldDefinition::new("owner", "Owner", FieldType::Select)
                .with_options(["ana", "ben"])
                .required(),
        ],
        display_rules: vec![DisplayRule {
            field: "effort".to_string(),
            depends_on: Some("owner".to_string()),
            value: Some(json!("ana")),
        }],
    };

    let mut task = MindmapNode::new("task-1", "Write parser")
        .with_tag("rust")
        .with_tag("rust")
        .with_custom_field("effort", json!(5))
        .with_custom_field("owner", json!("ana"))
        .with_custom_field("labels", json!(["a", "b"]))
        .collapsed(true);
    task.description = Some("Multi-line\ndescription: with colon".to_string());
    task.priority = Some("high".to_string());
    task.status = Some("in-progress".to_string());
    task.created_at = Some("2024-03-01T10:00:00.000Z".to_string());
    task.updated_at = Some("2024-03-02T11:30:00.000Z".to_string());
    task.deadline = Some("2024-04-01".to_string());
    task.links.push(Link {
        title: Some("Docs".to_string()),
        url: "https://example.com/docs".to_string(),
    });
    task.links.push(Link {
        title: None,
        url: "https://example.com/raw".to_string(),
    });

    let root = MindmapNode::new("root", "Project")
        .with_child(task.with_child(MindmapNode::new("task-1-1", "Tokenizer")))
        .with_child(MindmapNode::new("task-2", "1.5"));

    MindmapDocument::new("1.0", "Roadmap: Q2", root).with_schema(schema)
}

#[test]
fn test_roundtrip_json() {
    let doc = rich_document();
    let text = serialize(&doc, Format::Json).unwrap();
    let reparsed = parse(&text, Format::Json).unwrap().unwrap();

    assert_eq!(doc, reparsed);
}

#[test]
fn test_roundtrip_yaml() {
    let doc = rich_document();
    let text = serialize(&doc, Format::Yaml).unwrap();
    let reparsed = parse(&text, Format::Yaml).unwrap().unwrap();

    assert_eq!(doc, reparsed);
}

#[test]
fn test_roundtrip_across_formats() {
    let doc = rich_document();
    let yaml = serialize(&doc, Format::Yaml).unwrap();
    let from_yaml = parse(&yaml, Format::Yaml).unwrap().unwrap();
    let json = serialize(&from_yaml, Format::Json).unwrap();
    let from_json = parse(&json, Format::Json).unwrap().unwrap();

    assert_eq!(doc, from_json);
}

#[test]
fn test_custom_field_order_is_preserved() {
    let doc = rich_document();
    let text = serialize(&doc, Format::Json).unwrap();
    let reparsed = parse(&text, Format::Json).unwrap().unwrap();

    let keys: Vec<_> = reparsed.root.children[0].custom_fields.keys().cloned().collect();
    assert_eq!(keys, vec!["effort", "owner", "labels"]);
}

#[test]
fn test_serialize_is_stable() {
    let doc = rich_document();
    let first = serialize(&doc, Format::Json).unwrap();
    let second = serialize(&parse(&first, Format::Json).unwrap().unwrap(), Format::Json).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_reserialize_keeps_source_text_unchanged() {
    let source = r#"{
    "version": "1.0",
    "title": "T",
    "root": {
        "id": "root",
        "title": "R",
        "children": []
    }
}"#;
    let doc = parse(source, Format::Json).unwrap().unwrap();
    let out = serialize_like(&doc, Format::Json, Some(source)).unwrap();

    assert_eq!(out, source);
}
