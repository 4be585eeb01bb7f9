//! # Mindmap Parser
//!
//! Data model and text codecs for mindmap documents.
//!
//! ```text
//! JSON / YAML text ──parse──► MindmapDocument ──serialize──► JSON / YAML text
//!                                   │
//!                               NodeIndex (id → path, parent)
//! ```

pub mod ast;
pub mod error;
pub mod format;
pub mod id_generator;
pub mod index;
pub mod parser;
pub mod serializer;

#[cfg(test)]
mod tests_serializer;

pub use ast::{
    CustomFields, CustomSchema, DisplayRule, FieldDefinition, FieldType, Link, MindmapDocument,
    MindmapNode, Rule, RuleKind,
};
pub use error::{ParseError, ParseResult, SerializeError, Severity, UnknownFormat};
#[cfg(feature = "pretty-errors")]
pub use error::format_errors;
pub use format::Format;
pub use id_generator::IdGenerator;
pub use index::{display_path, node_at, DuplicateId, IndexEntry, NodeIndex};
pub use parser::{parse, Parser};
pub use serializer::{serialize, serialize_like, Serializer};
