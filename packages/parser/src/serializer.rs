use crate::ast::MindmapDocument;
use crate::error::SerializeError;
use crate::format::Format;
use serde::Serialize as _;

/// Serializer converts a document back to text
///
/// Key order is fixed by the model (`version, title, schema, root`, and a
/// fixed order inside nodes) so that saving an unchanged tree produces an
/// unchanged file. When the previous text is known, its JSON indentation and
/// trailing newline are kept. YAML is always emitted in block style with the
/// emitter's own indentation.
#[derive(Debug, Clone)]
pub struct Serializer {
    indent_string: String,
    trailing_newline: bool,
}

impl Serializer {
    pub fn new() -> Self {
        Self {
            indent_string: "  ".to_string(), // 2 spaces
            trailing_newline: true,
        }
    }

    pub fn with_indent(indent: &str) -> Self {
        Self {
            indent_string: indent.to_string(),
            ..Self::new()
        }
    }

    /// Pick up the formatting choices of `previous`
    pub fn like(previous: &str) -> Self {
        if previous.trim().is_empty() {
            return Self::new();
        }

        Self {
            indent_string: detect_indent(previous).unwrap_or_else(|| "  ".to_string()),
            trailing_newline: previous.ends_with('\n'),
        }
    }

    pub fn indent(&self) -> &str {
        &self.indent_string
    }

    pub fn serialize(&self, doc: &MindmapDocument, format: Format) -> Result<String, SerializeError> {
        let mut output = match format {
            Format::Json => self.serialize_json(doc)?,
            Format::Yaml => serde_yaml::to_string(doc)?,
        };

        let trimmed_len = output.trim_end_matches('\n').len();
        output.truncate(trimmed_len);
        if self.trailing_newline {
            output.push('\n');
        }

        Ok(output)
    }

    fn serialize_json(&self, doc: &MindmapDocument) -> Result<String, SerializeError> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(self.indent_string.as_bytes());
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        doc.serialize(&mut ser)?;
        Ok(String::from_utf8(buf)?)
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialize with default formatting
pub fn serialize(doc: &MindmapDocument, format: Format) -> Result<String, SerializeError> {
    Serializer::new().serialize(doc, format)
}

/// Serialize keeping the formatting of `previous` where possible
pub fn serialize_like(
    doc: &MindmapDocument,
    format: Format,
    previous: Option<&str>,
) -> Result<String, SerializeError> {
    match previous {
        Some(previous) => Serializer::like(previous).serialize(doc, format),
        None => serialize(doc, format),
    }
}

/// Indentation unit of the first indented line in a JSON text
fn detect_indent(source: &str) -> Option<String> {
    source.lines().find_map(|line| {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.len() == line.len() {
            return None;
        }

        let leading = &line[..line.len() - trimmed.len()];
        if leading.starts_with('\t') {
            Some("\t".to_string())
        } else {
            Some(" ".repeat(leading.chars().take_while(|c| *c == ' ').count()))
        }
    })
}
