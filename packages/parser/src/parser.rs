//! # Document Parser
//!
//! Turns raw JSON/YAML text into a [`MindmapDocument`].
//!
//! ```text
//! text ──► serde_json / serde_yaml ──► Value ──► structure check ──► MindmapDocument
//!               │                                    │
//!          syntax error                      every missing id/title
//!          (one ParseError)                  (one ParseError each)
//! ```
//!
//! Syntax errors stop the parse at the first problem because the underlying
//! parsers do. Structural problems are all collected before giving up, so the
//! caller sees the whole list in one pass.

use crate::ast::MindmapDocument;
use crate::error::{ParseError, ParseResult};
use crate::format::Format;
use serde_json::{Map, Value};

/// Parse `source` in the given format.
///
/// Empty or whitespace-only text is `Ok(None)`: there is nothing to render,
/// but nothing went wrong either.
pub fn parse(source: &str, format: Format) -> ParseResult<Option<MindmapDocument>> {
    Parser::new(source, format).parse()
}

pub struct Parser<'src> {
    source: &'src str,
    format: Format,
    locator: Locator<'src>,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str, format: Format) -> Self {
        Self {
            source,
            format,
            locator: Locator { source },
        }
    }

    pub fn parse(&self) -> ParseResult<Option<MindmapDocument>> {
        if self.source.trim().is_empty() {
            tracing::debug!(format = %self.format, "empty source, no document");
            return Ok(None);
        }

        let mut value = self.parse_value().map_err(|e| vec![e])?;

        let errors = self.check_document(&value);
        if !errors.is_empty() {
            tracing::debug!(count = errors.len(), "structural errors in document");
            return Err(errors);
        }

        normalize_document(&mut value);

        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| vec![ParseError::at_start(format!("Invalid document: {}", e))])
    }

    fn parse_value(&self) -> Result<Value, ParseError> {
        match self.format {
            Format::Json => serde_json::from_str(self.source).map_err(|e| {
                ParseError::error(
                    e.line(),
                    e.column(),
                    format!("Invalid JSON: {}", strip_location(&e.to_string())),
                )
            }),
            Format::Yaml => serde_yaml::from_str(self.source).map_err(|e| {
                let (line, column) = e
                    .location()
                    .map(|loc| (loc.line(), loc.column()))
                    .unwrap_or((1, 1));
                ParseError::error(
                    line,
                    column,
                    format!("Invalid YAML: {}", strip_location(&e.to_string())),
                )
            }),
        }
    }

    fn check_document(&self, value: &Value) -> Vec<ParseError> {
        let mut errors = Vec::new();

        let Some(doc) = value.as_object() else {
            errors.push(ParseError::at_start(
                "Document must be a mapping with 'version', 'title' and 'root'",
            ));
            return errors;
        };

        for key in ["version", "title"] {
            match scalar_state(doc, key) {
                FieldState::Present | FieldState::Empty => {}
                FieldState::Missing => {
                    errors.push(ParseError::at_start(format!(
                        "Document is missing required field '{}'",
                        key
                    )));
                }
                FieldState::WrongType => {
                    let (line, column) = self.locator.key(key).unwrap_or((1, 1));
                    errors.push(ParseError::error(
                        line,
                        column,
                        format!("Document field '{}' must be a string", key),
                    ));
                }
            }
        }

        match doc.get("root") {
            None | Some(Value::Null) => {
                errors.push(ParseError::at_start("Document is missing required field 'root'"));
            }
            Some(Value::Object(root)) => self.check_node(root, "root", &mut errors),
            Some(_) => {
                let (line, column) = self.locator.key("root").unwrap_or((1, 1));
                errors.push(ParseError::error(line, column, "Field 'root' must be a mapping"));
            }
        }

        errors
    }

    fn check_node(&self, node: &Map<String, Value>, path: &str, errors: &mut Vec<ParseError>) {
        let (line, column) = self.locator.node(node);

        for key in ["id", "title"] {
            let message = match scalar_state(node, key) {
                FieldState::Present => continue,
                // an empty title is a legitimate (if unhelpful) title
                FieldState::Empty if key == "title" => continue,
                FieldState::Empty => format!("Node at {} has an empty '{}'", path, key),
                FieldState::Missing => {
                    format!("Node at {} is missing required field '{}'", path, key)
                }
                FieldState::WrongType => {
                    format!("Field '{}' of node at {} must be a string", key, path)
                }
            };
            errors.push(ParseError::error(line, column, message));
        }

        match node.get("children") {
            None | Some(Value::Null) => {}
            Some(Value::Array(children)) => {
                for (i, child) in children.iter().enumerate() {
                    let child_path = format!("{}.children[{}]", path, i);
                    match child.as_object() {
                        Some(child) => self.check_node(child, &child_path, errors),
                        None => errors.push(ParseError::error(
                            line,
                            column,
                            format!("Node at {} must be a mapping", child_path),
                        )),
                    }
                }
            }
            Some(_) => errors.push(ParseError::error(
                line,
                column,
                format!("Field 'children' of node at {} must be a list", path),
            )),
        }
    }
}

enum FieldState {
    Present,
    Empty,
    Missing,
    WrongType,
}

fn scalar_state(map: &Map<String, Value>, key: &str) -> FieldState {
    match map.get(key) {
        None | Some(Value::Null) => FieldState::Missing,
        Some(Value::String(s)) if s.trim().is_empty() => FieldState::Empty,
        Some(Value::String(_) | Value::Number(_) | Value::Bool(_)) => FieldState::Present,
        Some(_) => FieldState::WrongType,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// serde_json and serde_yaml append "at line X column Y" to their messages;
/// the position is reported separately.
fn strip_location(message: &str) -> &str {
    match message.find(" at line ") {
        Some(idx) => &message[..idx],
        None => message,
    }
}

/// Best-effort mapping from a logical node back to a text position
struct Locator<'src> {
    source: &'src str,
}

impl<'src> Locator<'src> {
    /// Position of the node's id (or, failing that, its title) in the source
    fn node(&self, node: &Map<String, Value>) -> (usize, usize) {
        for key in ["id", "title"] {
            let Some(text) = node.get(key).and_then(scalar_text) else {
                continue;
            };
            if text.is_empty() {
                continue;
            }

            let quoted = Value::String(text.clone()).to_string();
            let plain = format!("{}: {}", key, text);
            for needle in [quoted, plain] {
                if let Some(pos) = self.find_token(&needle) {
                    return pos;
                }
            }
        }
        (1, 1)
    }

    fn key(&self, key: &str) -> Option<(usize, usize)> {
        self.find_token(&format!("\"{}\"", key))
            .or_else(|| self.find_token(&format!("{}:", key)))
    }

    /// First occurrence of `needle` that is not the prefix of a longer word
    fn find_token(&self, needle: &str) -> Option<(usize, usize)> {
        self.source
            .match_indices(needle)
            .find(|(offset, _)| {
                let rest = &self.source[offset + needle.len()..];
                !rest
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '-')
            })
            .map(|(offset, _)| self.position(offset))
    }

    fn position(&self, offset: usize) -> (usize, usize) {
        let before = &self.source[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = before[line_start..].chars().count() + 1;
        (line, column)
    }
}

/// Coerce scalar ids/titles/versions to strings and drop null node keys so the
/// typed decode accepts what the structure check accepted.
fn normalize_document(value: &mut Value) {
    let Some(doc) = value.as_object_mut() else {
        return;
    };

    stringify(doc, "version");
    stringify(doc, "title");

    if doc.get("schema").is_some_and(Value::is_null) {
        doc.remove("schema");
    }
    if let Some(Value::Object(schema)) = doc.get_mut("schema") {
        stringify(schema, "version");
    }

    if let Some(Value::Object(root)) = doc.get_mut("root") {
        normalize_node(root);
    }
}

fn normalize_node(node: &mut Map<String, Value>) {
    stringify(node, "id");
    stringify(node, "title");
    node.retain(|_, v| !v.is_null());

    if let Some(Value::Array(children)) = node.get_mut("children") {
        for child in children.iter_mut() {
            if let Value::Object(child) = child {
                normalize_node(child);
            }
        }
    }
}

fn stringify(map: &mut Map<String, Value>, key: &str) {
    if let Some(value) = map.get_mut(key) {
        let text = match value {
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => return,
        };
        *value = Value::String(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str =
        r#"{"version":"1.0","title":"T","root":{"id":"root","title":"R","children":[]}}"#;

    #[test]
    fn test_minimal_document() {
        let doc = parse(MINIMAL, Format::Json).unwrap().unwrap();
        assert_eq!(doc.version, "1.0");
        assert_eq!(doc.title, "T");
        assert_eq!(doc.root.id, "root");
        assert_eq!(doc.root.title, "R");
        assert!(doc.root.children.is_empty());
        assert_eq!(doc.node_count(), 1);
    }

    #[test]
    fn test_whitespace_is_no_document() {
        assert_eq!(parse("", Format::Json).unwrap(), None);
        assert_eq!(parse("  \n\t ", Format::Yaml).unwrap(), None);
    }

    #[test]
    fn test_missing_root_id() {
        let source = r#"{"version":"1.0","title":"T","root":{"title":"R","children":[]}}"#;
        let errors = parse(source, Format::Json).unwrap_err();

        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("'id'"));
        assert!(errors[0].is_error());
    }

    #[test]
    fn test_json_syntax_error_has_position() {
        let source = "{\n  \"version\": \"1.0\",\n  \"title\": \"T\",,\n}";
        let errors = parse(source, Format::Json).unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, 3);
        assert!(errors[0].column > 1);
        assert!(errors[0].message.starts_with("Invalid JSON"));
        assert!(!errors[0].message.contains("at line"));
    }

    #[test]
    fn test_yaml_syntax_error_is_reported() {
        let source = "version: '1.0\ntitle: T\n";
        let errors = parse(source, Format::Yaml).unwrap_err();

        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.starts_with("Invalid YAML"));
    }

    #[test]
    fn test_structural_errors_accumulate() {
        let source = r#"{
  "version": "1.0",
  "title": "T",
  "root": {
    "id": "root",
    "title": "R",
    "children": [
      {"id": "a"},
      {"id": "b", "title": "B"},
      {"id": "c"}
    ]
  }
}"#;
        let errors = parse(source, Format::Json).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].message.contains("root.children[0]"));
        assert!(errors[1].message.contains("root.children[2]"));
    }

    #[test]
    fn test_structural_error_is_located_at_node() {
        let source = r#"{
  "version": "1.0",
  "title": "T",
  "root": {
    "id": "root",
    "title": "R",
    "children": [
      {"id": "child-1"}
    ]
  }
}"#;
        let errors = parse(source, Format::Json).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, 8);
        assert_eq!(errors[0].column, 14);
    }

    #[test]
    fn test_missing_top_level_fields() {
        let errors = parse(r#"{"root": {"id": "r", "title": "R"}}"#, Format::Json).unwrap_err();
        assert_eq!(errors.len(), 2);

        let errors = parse(r#"{"version": "1", "title": "T"}"#, Format::Json).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("'root'"));
    }

    #[test]
    fn test_top_level_must_be_mapping() {
        let errors = parse("[1, 2, 3]", Format::Json).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!((errors[0].line, errors[0].column), (1, 1));
    }

    #[test]
    fn test_yaml_scalars_are_normalized() {
        let source = "version: 1.0\ntitle: 2024\nroot:\n  id: 7\n  title: true\n  children:\n";
        let doc = parse(source, Format::Yaml).unwrap().unwrap();

        assert_eq!(doc.version, "1.0");
        assert_eq!(doc.title, "2024");
        assert_eq!(doc.root.id, "7");
        assert_eq!(doc.root.title, "true");
        assert!(doc.root.children.is_empty());
    }

    #[test]
    fn test_children_must_be_a_list() {
        let source = r#"{"version":"1","title":"T","root":{"id":"r","title":"R","children":{"id":"x"}}}"#;
        let errors = parse(source, Format::Json).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("must be a list"));
    }

    #[test]
    fn test_shape_mismatch_after_structure_check() {
        let source = r#"{"version":"1","title":"T","root":{"id":"r","title":"R","tags":"urgent"}}"#;
        let errors = parse(source, Format::Json).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.starts_with("Invalid document"));
    }

    #[test]
    fn test_locator_skips_longer_words() {
        let locator = Locator { source: "id: ab\nid: a\n" };
        assert_eq!(locator.find_token("id: a"), Some((2, 1)));
    }
}
