use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Parse failures accumulate; a failed parse reports every problem found
pub type ParseResult<T> = Result<T, Vec<ParseError>>;

/// Severity level of a parse diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        })
    }
}

/// A problem located in the raw text (1-based line and column)
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{line}:{column}: {severity}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
    pub severity: Severity,
}

impl ParseError {
    pub fn error(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line: line.max(1),
            column: column.max(1),
            message: message.into(),
            severity: Severity::Error,
        }
    }

    /// Error with no usable position
    pub fn at_start(message: impl Into<String>) -> Self {
        Self::error(1, 1, message)
    }

    pub fn warning(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(line, column, message)
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Character offset of a 1-based line/column position, clamped to `source`
#[cfg_attr(not(feature = "pretty-errors"), allow(dead_code))]
fn char_offset(source: &str, line: usize, column: usize) -> usize {
    let mut offset = 0;
    for (i, text) in source.split('\n').enumerate() {
        let len = text.chars().count();
        if i + 1 == line {
            return offset + column.saturating_sub(1).min(len);
        }
        offset += len + 1;
    }
    source.chars().count()
}

/// Pretty-print errors with source context using ariadne
#[cfg(feature = "pretty-errors")]
pub fn format_errors(source: &str, filename: &str, errors: &[ParseError]) -> String {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let total = source.chars().count();
    let mut output = Vec::new();

    for error in errors {
        let start = char_offset(source, error.line, error.column).min(total);
        let end = (start + 1).min(total);
        let (kind, color) = match error.severity {
            Severity::Error => (ReportKind::Error, Color::Red),
            Severity::Warning => (ReportKind::Warning, Color::Yellow),
            Severity::Info => (ReportKind::Advice, Color::Blue),
        };

        let report = Report::build(kind, filename, start)
            .with_message(&error.message)
            .with_label(
                Label::new((filename, start..end))
                    .with_color(color)
                    .with_message(format!("line {}, column {}", error.line, error.column)),
            )
            .finish();

        if let Err(e) = report.write((filename, Source::from(source)), &mut output) {
            tracing::debug!(error = %e, "failed to render parse error");
        }
    }

    String::from_utf8(output).unwrap_or_else(|_| "Error formatting failed".to_string())
}

#[derive(Error, Debug)]
pub enum SerializeError {
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Serialized output is not UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown document format '{0}' (expected json or yaml)")]
pub struct UnknownFormat(pub String);
