//! Index-wide mapper settings.
//!
//! These are the fallbacks used when neither the document nor the field
//! mapping says otherwise.

use serde::{Deserialize, Serialize};

use crate::error::{ErrorCode, SatchelError, SatchelResult};

/// Default tantivy writer memory budget (50MB).
pub const DEFAULT_WRITER_HEAP_BYTES: usize = 50_000_000;

/// Settings shared by every attachment field of an index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperSettings {
    /// Fallback indexed-character limit. `None` or negative is unlimited.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indexed_chars: Option<i64>,
    /// Run language detection when the mapping does not say.
    pub detect_language: bool,
    /// Index unreadable attachments with empty content instead of failing.
    pub ignore_errors: bool,
    /// Memory budget for the index writer.
    pub writer_heap_bytes: usize,
}

impl Default for MapperSettings {
    fn default() -> Self {
        Self {
            indexed_chars: None,
            detect_language: false,
            ignore_errors: true,
            writer_heap_bytes: DEFAULT_WRITER_HEAP_BYTES,
        }
    }
}

fn settings_error(message: impl Into<String>) -> SatchelError {
    SatchelError::configuration(message, ErrorCode::CfgSettingsFile)
}

impl MapperSettings {
    /// Load settings from a file (TOML, JSON, or YAML).
    pub fn from_file(path: impl AsRef<std::path::Path>) -> SatchelResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| settings_error(format!("Failed to read {}: {}", path.display(), e)))?;
        let ext = path.extension().and_then(|e| e.to_str());

        match ext {
            Some("toml") => toml::from_str(&content).map_err(|e| settings_error(e.to_string())),
            Some("json") => serde_json::from_str(&content).map_err(|e| settings_error(e.to_string())),
            Some("yaml" | "yml") => {
                serde_yaml::from_str(&content).map_err(|e| settings_error(e.to_string()))
            }
            _ => Err(settings_error(
                "Unsupported settings file format. Use .toml, .json, or .yaml",
            )),
        }
    }

    /// Load settings from environment variables, keeping defaults for
    /// unset or unparseable values.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();

        if let Some(limit) = lookup("SATCHEL_INDEXED_CHARS").and_then(|v| v.trim().parse().ok()) {
            settings.indexed_chars = Some(limit);
        }
        if let Some(detect) = lookup("SATCHEL_DETECT_LANGUAGE").and_then(|v| parse_flag(&v)) {
            settings.detect_language = detect;
        }
        if let Some(ignore) = lookup("SATCHEL_IGNORE_ERRORS").and_then(|v| parse_flag(&v)) {
            settings.ignore_errors = ignore;
        }
        if let Some(heap) = lookup("SATCHEL_WRITER_HEAP_BYTES").and_then(|v| v.trim().parse().ok()) {
            settings.writer_heap_bytes = heap;
        }

        settings
    }

    /// Build settings using builder pattern.
    pub fn builder() -> MapperSettingsBuilder {
        MapperSettingsBuilder::default()
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Builder for MapperSettings.
#[derive(Default)]
pub struct MapperSettingsBuilder {
    settings: MapperSettings,
}

impl MapperSettingsBuilder {
    /// Set the fallback indexed-character limit.
    pub fn indexed_chars(mut self, limit: i64) -> Self {
        self.settings.indexed_chars = Some(limit);
        self
    }

    /// Set the fallback language-detection flag.
    pub fn detect_language(mut self, detect: bool) -> Self {
        self.settings.detect_language = detect;
        self
    }

    /// Set whether unreadable attachments are tolerated.
    pub fn ignore_errors(mut self, ignore: bool) -> Self {
        self.settings.ignore_errors = ignore;
        self
    }

    /// Set the index writer memory budget.
    pub fn writer_heap_bytes(mut self, bytes: usize) -> Self {
        self.settings.writer_heap_bytes = bytes;
        self
    }

    /// Build the settings.
    pub fn build(self) -> MapperSettings {
        self.settings
    }
}
