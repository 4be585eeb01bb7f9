use mindmap_parser::Format;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_NAME: &str = "mindmap.config.json";

/// Mindmap configuration file format
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Format for files whose extension does not name one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<Format>,

    /// Schema file, relative to the config directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Quiet period before `watch` re-parses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debounce_ms: Option<u64>,

    /// Spaces per level when writing new JSON files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indent: Option<usize>,
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            tracing::debug!(path = %config_path.display(), "loaded config");
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    /// Format for `path`: the explicit choice, then the extension, then the config
    pub fn format_for(&self, path: &Path, explicit: Option<Format>) -> Format {
        explicit
            .or_else(|| Format::from_path(path))
            .or(self.format)
            .unwrap_or_default()
    }

    /// Schema to use: the explicit path, else the configured one
    pub fn schema_path(&self, cwd: &Path, explicit: Option<PathBuf>) -> Option<PathBuf> {
        explicit.or_else(|| self.schema.as_ref().map(|s| cwd.join(s)))
    }

    pub fn debounce(&self) -> Duration {
        self.debounce_ms
            .map(Duration::from_millis)
            .unwrap_or(mindmap_editor::DEFAULT_DEBOUNCE)
    }

    pub fn indent_string(&self) -> String {
        " ".repeat(self.indent.unwrap_or(2))
    }
}
