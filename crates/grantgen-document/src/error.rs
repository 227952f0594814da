//! Error types for the document model

/// Errors raised by document access and identifier handling
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// No section is registered under the given key
    #[error("unknown section: '{0}'")]
    UnknownSection(String),

    /// Section data does not deserialize into the section's shape
    #[error("section {section} has invalid shape: {source}")]
    InvalidSectionData {
        /// Section key
        section: String,
        /// Underlying serde error
        #[source]
        source: serde_json::Error,
    },

    /// Identifier does not follow the per-kind naming convention
    #[error("invalid identifier: '{0}'")]
    InvalidId(String),

    /// Date string is not a calendar date
    #[error("invalid date: '{0}'")]
    InvalidDate(String),
}

impl DocumentError {
    /// Create invalid section data error
    pub fn invalid_section(section: impl Into<String>, source: serde_json::Error) -> Self {
        Self::InvalidSectionData {
            section: section.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_section_display() {
        let err = DocumentError::UnknownSection("budget".to_string());
        assert_eq!(err.to_string(), "unknown section: 'budget'");
    }

    #[test]
    fn invalid_section_display() {
        let source = serde_json::from_str::<u32>("\"x\"").unwrap_err();
        let err = DocumentError::invalid_section("risks", source);
        assert!(err.to_string().starts_with("section risks has invalid shape"));
    }
}
