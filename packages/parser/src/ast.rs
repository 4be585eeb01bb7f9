use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Custom field values attached to a node, in authoring order
pub type CustomFields = Map<String, Value>;

/// Root document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MindmapDocument {
    pub version: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<CustomSchema>,
    pub root: Arc<MindmapNode>,
}

impl MindmapDocument {
    pub fn new(version: impl Into<String>, title: impl Into<String>, root: MindmapNode) -> Self {
        Self {
            version: version.into(),
            title: title.into(),
            schema: None,
            root: Arc::new(root),
        }
    }

    pub fn with_schema(mut self, schema: CustomSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Total number of nodes in the tree, root included
    pub fn node_count(&self) -> usize {
        self.root.subtree_size()
    }
}

/// A single entry in the outline tree
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MindmapNode {
    /// Empty on nodes handed to a mutation that should receive a generated id
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub collapsed: bool,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub custom_fields: CustomFields,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(default)]
    pub children: Vec<Arc<MindmapNode>>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl MindmapNode {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_child(mut self, child: MindmapNode) -> Self {
        self.children.push(Arc::new(child));
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_custom_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.custom_fields.insert(name.into(), value);
        self
    }

    pub fn collapsed(mut self, collapsed: bool) -> Self {
        self.collapsed = collapsed;
        self
    }

    /// Number of nodes in this subtree, including self
    pub fn subtree_size(&self) -> usize {
        1 + self.children.iter().map(|c| c.subtree_size()).sum::<usize>()
    }
}

/// External link attached to a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub url: String,
}

/// User-supplied description of custom fields
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomSchema {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub custom_fields: Vec<FieldDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub display_rules: Vec<DisplayRule>,
}

impl CustomSchema {
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.custom_fields.iter().find(|f| f.name == name)
    }
}

/// One custom field declared by a schema.
///
/// `name`, `label` and `type` are optional on the wire so an incomplete
/// schema still loads and can be reported on field by field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation: Vec<Rule>,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            field_type: Some(field_type),
            ..Default::default()
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.validation.push(rule);
        self
    }

    pub fn options(&self) -> &[String] {
        self.options.as_deref().unwrap_or(&[])
    }
}

/// Value kinds a custom field can hold.
///
/// Unrecognized type names are kept as `Unknown` so the schema can be
/// reported on instead of failing to load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Date,
    Select,
    Multiselect,
    Unknown(String),
}

impl FieldType {
    pub fn as_str(&self) -> &str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::Select => "select",
            FieldType::Multiselect => "multiselect",
            FieldType::Unknown(name) => name,
        }
    }

    /// Whether values of this type are chosen from `options`
    pub fn has_options(&self) -> bool {
        matches!(self, FieldType::Select | FieldType::Multiselect)
    }
}

impl From<String> for FieldType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "string" => FieldType::String,
            "number" => FieldType::Number,
            "boolean" => FieldType::Boolean,
            "date" => FieldType::Date,
            "select" => FieldType::Select,
            "multiselect" => FieldType::Multiselect,
            _ => FieldType::Unknown(name),
        }
    }
}

impl From<FieldType> for String {
    fn from(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Unknown(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Constraint attached to a field definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(rename = "type")]
    pub kind: RuleKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl Rule {
    pub fn range(min: f64, max: f64) -> Self {
        Self { kind: RuleKind::Range, min: Some(min), max: Some(max) }
    }

    pub fn min(min: f64) -> Self {
        Self { kind: RuleKind::Min, min: Some(min), max: None }
    }

    pub fn max(max: f64) -> Self {
        Self { kind: RuleKind::Max, min: None, max: Some(max) }
    }

    pub fn length(min: f64, max: f64) -> Self {
        Self { kind: RuleKind::Length, min: Some(min), max: Some(max) }
    }

    pub fn min_length(min: f64) -> Self {
        Self { kind: RuleKind::MinLength, min: Some(min), max: None }
    }

    pub fn max_length(max: f64) -> Self {
        Self { kind: RuleKind::MaxLength, min: None, max: Some(max) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RuleKind {
    Range,
    Min,
    Max,
    Length,
    MinLength,
    MaxLength,
    Unknown(String),
}

impl RuleKind {
    pub fn as_str(&self) -> &str {
        match self {
            RuleKind::Range => "range",
            RuleKind::Min => "min",
            RuleKind::Max => "max",
            RuleKind::Length => "length",
            RuleKind::MinLength => "minLength",
            RuleKind::MaxLength => "maxLength",
            RuleKind::Unknown(name) => name,
        }
    }

    /// Rules that bound a numeric value
    pub fn is_numeric(&self) -> bool {
        matches!(self, RuleKind::Range | RuleKind::Min | RuleKind::Max)
    }

    /// Rules that bound a string's length
    pub fn is_length(&self) -> bool {
        matches!(self, RuleKind::Length | RuleKind::MinLength | RuleKind::MaxLength)
    }
}

impl From<String> for RuleKind {
    fn from(name: String) -> Self {
        match name.as_str() {
            "range" => RuleKind::Range,
            "min" => RuleKind::Min,
            "max" => RuleKind::Max,
            "length" => RuleKind::Length,
            "minLength" => RuleKind::MinLength,
            "maxLength" => RuleKind::MaxLength,
            _ => RuleKind::Unknown(name),
        }
    }
}

impl From<RuleKind> for String {
    fn from(kind: RuleKind) -> Self {
        match kind {
            RuleKind::Unknown(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conditional visibility: show `field` when `depends_on` equals `value`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayRule {
    #[serde(default)]
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}
