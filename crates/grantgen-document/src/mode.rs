//! Generation modes
//!
//! A mode governs both the instruction given to the generator and how its
//! output is merged back into user data.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Mode discriminant, used as a key into rule sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModeKind {
    /// Replace the section outright
    Regenerate,
    /// Generate only what is missing
    Fill,
    /// Deepen existing content without re-theming it
    Enhance,
    /// Regenerate chosen list positions only
    TargetedFill,
}

impl ModeKind {
    /// All mode kinds
    pub const ALL: [ModeKind; 4] = [Self::Regenerate, Self::Fill, Self::Enhance, Self::TargetedFill];

    /// Stable key
    #[inline]
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Regenerate => "regenerate",
            Self::Fill => "fill",
            Self::Enhance => "enhance",
            Self::TargetedFill => "targetedFill",
        }
    }
}

impl Display for ModeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ModeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "regenerate" => Ok(Self::Regenerate),
            "fill" => Ok(Self::Fill),
            "enhance" => Ok(Self::Enhance),
            "targetedFill" | "targeted-fill" | "targeted_fill" => Ok(Self::TargetedFill),
            other => Err(format!("unknown mode: '{other}'")),
        }
    }
}

/// Generation mode with its parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum GenerationMode {
    /// Produce an entirely new, self-consistent section
    Regenerate,
    /// Keep non-empty content verbatim, generate what is missing
    Fill,
    /// Preserve topics, deepen and correct the text
    Enhance,
    /// Regenerate only the given list positions
    #[serde(rename_all = "camelCase")]
    TargetedFill {
        /// Zero-based positions to regenerate
        indices: Vec<usize>,
    },
}

impl GenerationMode {
    /// Targeted fill over the given positions (sorted, deduplicated)
    #[must_use]
    pub fn targeted(indices: impl IntoIterator<Item = usize>) -> Self {
        let mut indices: Vec<usize> = indices.into_iter().collect();
        indices.sort_unstable();
        indices.dedup();
        Self::TargetedFill { indices }
    }

    /// Mode discriminant
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ModeKind {
        match self {
            Self::Regenerate => ModeKind::Regenerate,
            Self::Fill => ModeKind::Fill,
            Self::Enhance => ModeKind::Enhance,
            Self::TargetedFill { .. } => ModeKind::TargetedFill,
        }
    }

    /// Targeted positions, empty for every other mode
    #[inline]
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        match self {
            Self::TargetedFill { indices } => indices,
            _ => &[],
        }
    }
}

impl Display for GenerationMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::TargetedFill { indices } => write!(f, "targetedFill{indices:?}"),
            other => f.write_str(other.kind().key()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn targeted_sorts_and_dedups() {
        let mode = GenerationMode::targeted([3, 1, 3]);
        assert_eq!(mode.indices(), &[1, 3]);
        assert_eq!(mode.kind(), ModeKind::TargetedFill);
    }

    #[test]
    fn mode_kind_parse_aliases() {
        assert_eq!("targeted-fill".parse::<ModeKind>().unwrap(), ModeKind::TargetedFill);
        assert_eq!("fill".parse::<ModeKind>().unwrap(), ModeKind::Fill);
        assert!("rewrite".parse::<ModeKind>().is_err());
    }

    #[test]
    fn mode_serde_is_tagged() {
        let mode = GenerationMode::targeted([1, 3]);
        let value = serde_json::to_value(&mode).unwrap();
        assert_eq!(value, json!({"mode": "targetedFill", "indices": [1, 3]}));
        let back: GenerationMode = serde_json::from_value(json!({"mode": "fill"})).unwrap();
        assert_eq!(back, GenerationMode::Fill);
    }

    #[test]
    fn display() {
        assert_eq!(GenerationMode::Enhance.to_string(), "enhance");
        assert_eq!(GenerationMode::targeted([0]).to_string(), "targetedFill[0]");
    }
}
