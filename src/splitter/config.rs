use std::path::Path;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::SplitterError;

/// Parameters for configuring sentence splitting.
///
/// Build one with [`SplitterConfig::builder`], deserialize it from JSON, or
/// start from `Default` and override fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[builder(default, setter(into))]
#[serde(default)]
pub struct SplitterConfig {
    /// Treat line breaks as hard sentence boundaries.
    pub split_on_newlines: bool,
    /// Append an empty sentence when `flush()` finds nothing buffered.
    ///
    /// Off by default, so closing an already drained stream adds nothing.
    pub emit_empty_sentences: bool,
    /// Extra abbreviations that never end a sentence (`"approx"`, `"dept"`).
    ///
    /// Matched case-insensitively, written without the trailing period.
    pub extra_abbreviations: Vec<String>,
    /// Sentence boundaries an open quote or bracket may hide before it is
    /// treated as never closed and stops hiding them.
    pub max_enclosed_boundaries: usize,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            split_on_newlines: true,
            emit_empty_sentences: false,
            extra_abbreviations: Vec::new(),
            max_enclosed_boundaries: 2,
        }
    }
}

impl SplitterConfig {
    pub fn builder() -> SplitterConfigBuilder {
        SplitterConfigBuilder::default()
    }

    /// Load a configuration from a JSON file.
    ///
    /// Missing fields fall back to their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, SplitterError> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| SplitterError::Config(format!("Failed to parse {}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::SplitterConfig;

    #[test]
    fn builder_overrides_only_given_fields() {
        let config = SplitterConfig::builder()
            .split_on_newlines(false)
            .build()
            .expect("builder has defaults for every field");

        assert!(!config.split_on_newlines);
        assert!(!config.emit_empty_sentences);
        assert!(config.extra_abbreviations.is_empty());
        assert_eq!(config.max_enclosed_boundaries, 2);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: SplitterConfig =
            serde_json::from_str(r#"{ "extra_abbreviations": ["approx"] }"#).unwrap();

        assert!(config.split_on_newlines);
        assert_eq!(config.extra_abbreviations, vec!["approx".to_string()]);
    }

    #[test]
    fn loads_from_json_file() {
        let path = std::env::temp_dir().join(format!(
            "tts-splitter-config-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, r#"{ "emit_empty_sentences": true }"#).unwrap();

        let config = SplitterConfig::from_json_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(config.emit_empty_sentences);
        assert!(config.split_on_newlines);
    }

    #[test]
    fn rejects_malformed_json() {
        let path = std::env::temp_dir().join(format!(
            "tts-splitter-bad-config-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, "{ not json").unwrap();

        let result = SplitterConfig::from_json_file(&path);
        std::fs::remove_file(&path).ok();

        assert!(matches!(
            result,
            Err(crate::error::SplitterError::Config(_))
        ));
    }
}
