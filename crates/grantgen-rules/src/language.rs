//! Supported proposal languages

use crate::error::RuleError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Language of a proposal variant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Language {
    /// English
    #[default]
    #[serde(rename = "en")]
    En,
    /// Slovenian
    #[serde(rename = "si", alias = "sl")]
    Si,
}

impl Language {
    /// All supported languages
    pub const ALL: [Language; 2] = [Self::En, Self::Si];

    /// Language code used in keys and file names
    #[inline]
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Si => "si",
        }
    }
}

impl Display for Language {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "si" | "sl" => Ok(Self::Si),
            other => Err(RuleError::UnsupportedLanguage(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_codes_and_alias() {
        assert_eq!("en".parse::<Language>().unwrap(), Language::En);
        assert_eq!("SI".parse::<Language>().unwrap(), Language::Si);
        assert_eq!("sl".parse::<Language>().unwrap(), Language::Si);
        assert!(matches!(
            "de".parse::<Language>(),
            Err(RuleError::UnsupportedLanguage(code)) if code == "de"
        ));
    }

    #[test]
    fn serde_uses_codes() {
        assert_eq!(serde_json::to_string(&Language::Si).unwrap(), "\"si\"");
        let parsed: Language = serde_json::from_str("\"sl\"").unwrap();
        assert_eq!(parsed, Language::Si);
    }
}
