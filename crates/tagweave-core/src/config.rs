use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// tagweave.toml schema - engine tuning knobs, every field optional
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// Upper bound on `[if]` reductions per render pass
    #[serde(default = "default_max_reductions")]
    pub max_reductions: usize,

    /// Separator used to render lists and to split delimited strings
    #[serde(default = "default_list_separator")]
    pub list_separator: String,

    /// Suffix appended by `truncate`
    #[serde(default = "default_ellipsis")]
    pub ellipsis: String,

    /// Format used by `date` when called without arguments
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Words (lowercase) read as true by `boolean` and `yes_no`
    #[serde(default = "default_truthy_words")]
    pub truthy_words: Vec<String>,

    /// Replace SVG attachments by their file content
    #[serde(default = "default_inline_svg")]
    pub inline_svg: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_reductions: default_max_reductions(),
            list_separator: default_list_separator(),
            ellipsis: default_ellipsis(),
            date_format: default_date_format(),
            truthy_words: default_truthy_words(),
            inline_svg: default_inline_svg(),
        }
    }
}

fn default_max_reductions() -> usize {
    1000
}

fn default_list_separator() -> String {
    ", ".to_string()
}

fn default_ellipsis() -> String {
    "...".to_string()
}

fn default_date_format() -> String {
    "F j, Y".to_string()
}

fn default_truthy_words() -> Vec<String> {
    ["true", "1", "yes", "on", "ja", "oui", "si", "sí"]
        .iter()
        .map(|w| w.to_string())
        .collect()
}

fn default_inline_svg() -> bool {
    true
}

impl EngineConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read tagweave.toml
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_reductions == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_reductions".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.list_separator.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "list_separator".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Whether `word` is one of the configured truthy words (case-insensitive)
    pub fn is_truthy_word(&self, word: &str) -> bool {
        let word = word.trim().to_lowercase();
        self.truthy_words.iter().any(|w| w.to_lowercase() == word)
    }
}
