pub mod check;
pub mod convert;
pub mod format;
pub mod init;
pub mod watch;

pub use check::{check, CheckArgs};
pub use convert::{convert, ConvertArgs};
pub use format::{format, FormatArgs};
pub use init::{init, InitArgs};
pub use watch::{watch, WatchArgs};

use anyhow::{anyhow, Context, Result};
use mindmap_parser::{format_errors, parse, CustomSchema, Format, MindmapDocument};
use std::fs;
use std::path::Path;

/// Read a schema file (JSON)
pub fn load_schema(path: &Path) -> Result<CustomSchema> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema {}", path.display()))?;
    let schema = serde_json::from_str(&content)
        .with_context(|| format!("Invalid schema {}", path.display()))?;
    Ok(schema)
}

/// Read and parse a document, printing parse errors with source context
pub fn load_document(path: &Path, format: Format) -> Result<(String, MindmapDocument)> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    match parse(&source, format) {
        Ok(Some(document)) => Ok((source, document)),
        Ok(None) => Err(anyhow!("{} is empty", path.display())),
        Err(errors) => {
            eprint!("{}", format_errors(&source, &path.display().to_string(), &errors));
            Err(anyhow!(
                "Failed to parse {} ({} error{})",
                path.display(),
                errors.len(),
                if errors.len() == 1 { "" } else { "s" }
            ))
        }
    }
}
