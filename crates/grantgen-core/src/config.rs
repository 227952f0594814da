//! Generator configuration
//!
//! Loaded from TOML. Every key is optional; a missing file means defaults.
//!
//! ```toml
//! language = "si"
//! title_max_length = 150
//! prefer_structured_output = true
//! log_schema_diagnostics = false
//! ```

use crate::error::ConfigError;
use grantgen_response::{ProcessorOptions, DEFAULT_TITLE_MAX_LEN};
use grantgen_rules::Language;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Language used when a request names none
    pub language: Language,
    /// Maximum project title length, in characters
    pub title_max_length: usize,
    /// Send the JSON Schema to providers that enforce it natively
    pub prefer_structured_output: bool,
    /// Validate processed output against the JSON Schema and log findings
    pub log_schema_diagnostics: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            language: Language::default(),
            title_max_length: DEFAULT_TITLE_MAX_LEN,
            prefer_structured_output: true,
            log_schema_diagnostics: true,
        }
    }
}

impl GeneratorConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With default language
    #[inline]
    #[must_use]
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    /// With maximum title length
    #[inline]
    #[must_use]
    pub fn with_title_max_length(mut self, max: usize) -> Self {
        self.title_max_length = max;
        self
    }

    /// With structured-output preference
    #[inline]
    #[must_use]
    pub fn with_structured_output(mut self, prefer: bool) -> Self {
        self.prefer_structured_output = prefer;
        self
    }

    /// With schema diagnostics toggled
    #[inline]
    #[must_use]
    pub fn with_schema_diagnostics(mut self, enabled: bool) -> Self {
        self.log_schema_diagnostics = enabled;
        self
    }

    /// Parse from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load from a TOML file; a missing file yields defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml_str(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Response processor settings derived from this config
    #[must_use]
    pub fn processor_options(&self) -> ProcessorOptions {
        ProcessorOptions {
            title_max_len: self.title_max_length,
            schema_diagnostics: self.log_schema_diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = GeneratorConfig::from_toml_str("language = \"si\"\ntitle_max_length = 120\n").unwrap();
        assert_eq!(config.language, Language::Si);
        assert_eq!(config.title_max_length, 120);
        assert!(config.prefer_structured_output);
        assert!(config.log_schema_diagnostics);
    }

    #[test]
    fn invalid_toml_rejected() {
        assert!(matches!(
            GeneratorConfig::from_toml_str("language = ["),
            Err(ConfigError::Parse(_))
        ));
        assert!(GeneratorConfig::from_toml_str("language = \"de\"").is_err());
    }

    #[test]
    fn missing_file_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = GeneratorConfig::load(dir.path().join("grantgen.toml")).unwrap();
        assert_eq!(config, GeneratorConfig::default());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grantgen.toml");
        std::fs::write(&path, "prefer_structured_output = false\n").unwrap();
        let config = GeneratorConfig::load(&path).unwrap();
        assert!(!config.prefer_structured_output);
    }

    #[test]
    fn builder_and_processor_options() {
        let config = GeneratorConfig::new()
            .with_language(Language::Si)
            .with_title_max_length(80)
            .with_structured_output(false)
            .with_schema_diagnostics(false);
        let options = config.processor_options();
        assert_eq!(options.title_max_len, 80);
        assert!(!options.schema_diagnostics);
        assert_eq!(config.language, Language::Si);
    }
}
