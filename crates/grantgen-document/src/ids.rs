//! Item identifiers
//!
//! Provides [`ItemId`], the per-kind sequential identifier carried by list
//! items (`WP1`, `RISK3`, `M1.2`, ...), and the continuity pass that gives
//! identifier-less items the next free number.
//!
//! Identifiers are never reused or renumbered: other sections reference them
//! (task dependencies point at `T1.2`, risks mention `WP3`), so a gap left by a
//! deleted item is preserved.

use crate::error::DocumentError;
use crate::section::SectionKind;
use serde_json::Value;
use std::collections::{BTreeSet, HashSet};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Identifier family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdPrefix {
    /// `GO1`
    GeneralObjective,
    /// `SO1`
    SpecificObjective,
    /// `WP1`
    WorkPackage,
    /// `RISK1`
    Risk,
    /// `KER1`
    Ker,
    /// `T1.1` (nested under a work package)
    Task,
    /// `M1.1` (nested under a work package)
    Milestone,
    /// `D1.1` (nested under a work package)
    Deliverable,
}

impl IdPrefix {
    // Longest prefixes first so `RISK` is not mistaken for something shorter.
    const PARSE_ORDER: [IdPrefix; 8] = [
        Self::Risk,
        Self::Ker,
        Self::WorkPackage,
        Self::GeneralObjective,
        Self::SpecificObjective,
        Self::Task,
        Self::Milestone,
        Self::Deliverable,
    ];

    /// Literal prefix text
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GeneralObjective => "GO",
            Self::SpecificObjective => "SO",
            Self::WorkPackage => "WP",
            Self::Risk => "RISK",
            Self::Ker => "KER",
            Self::Task => "T",
            Self::Milestone => "M",
            Self::Deliverable => "D",
        }
    }

    /// Whether identifiers of this family embed the parent work package number
    #[inline]
    #[must_use]
    pub fn is_nested(self) -> bool {
        matches!(self, Self::Task | Self::Milestone | Self::Deliverable)
    }
}

/// Parsed item identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemId {
    prefix: IdPrefix,
    parent: Option<u32>,
    sequence: u32,
}

impl ItemId {
    /// Top-level identifier such as `WP2`
    #[inline]
    #[must_use]
    pub fn top(prefix: IdPrefix, sequence: u32) -> Self {
        Self {
            prefix,
            parent: None,
            sequence,
        }
    }

    /// Nested identifier such as `M2.1`
    #[inline]
    #[must_use]
    pub fn nested(prefix: IdPrefix, parent: u32, sequence: u32) -> Self {
        Self {
            prefix,
            parent: Some(parent),
            sequence,
        }
    }

    /// Identifier family
    #[inline]
    #[must_use]
    pub fn prefix(&self) -> IdPrefix {
        self.prefix
    }

    /// Parent work package number for nested identifiers
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<u32> {
        self.parent
    }

    /// Sequence number within the family (and parent)
    #[inline]
    #[must_use]
    pub fn sequence(&self) -> u32 {
        self.sequence
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.parent {
            Some(parent) => write!(f, "{}{}.{}", self.prefix.as_str(), parent, self.sequence),
            None => write!(f, "{}{}", self.prefix.as_str(), self.sequence),
        }
    }
}

impl FromStr for ItemId {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || DocumentError::InvalidId(s.to_string());

        let prefix = IdPrefix::PARSE_ORDER
            .into_iter()
            .find(|p| trimmed.starts_with(p.as_str()))
            .ok_or_else(invalid)?;
        let rest = &trimmed[prefix.as_str().len()..];

        let number = |part: &str| -> Result<u32, DocumentError> {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            part.parse().map_err(|_| invalid())
        };

        if prefix.is_nested() {
            let (parent, sequence) = rest.split_once('.').ok_or_else(invalid)?;
            Ok(Self::nested(prefix, number(parent)?, number(sequence)?))
        } else {
            Ok(Self::top(prefix, number(rest)?))
        }
    }
}

/// Sequence numbers handed out by the continuity pass
///
/// Counts up from one past the highest existing number. Once that would
/// overflow, the lowest number not in use is taken instead.
#[derive(Debug)]
struct SequenceAllocator {
    used: BTreeSet<u32>,
    next: Option<u32>,
}

impl SequenceAllocator {
    fn new(used: BTreeSet<u32>) -> Self {
        let next = match used.last() {
            Some(&max) => max.checked_add(1),
            None => Some(1),
        };
        Self { used, next }
    }

    fn allocate(&mut self) -> Option<u32> {
        let sequence = match self.next {
            Some(n) => {
                self.next = n.checked_add(1);
                n
            }
            None => (1..=u32::MAX).find(|n| !self.used.contains(n))?,
        };
        self.used.insert(sequence);
        Some(sequence)
    }
}

/// Give every identifier-less item in `items` the next free identifier
///
/// Items whose identifier duplicates an earlier item's are treated as
/// identifier-less. Malformed identifiers are left untouched. Returns the
/// number of identifiers assigned.
pub fn assign_missing_ids(items: &mut [Value], prefix: IdPrefix, parent: Option<u32>) -> usize {
    let parse = |item: &Value| -> Option<ItemId> {
        item.get("id")
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<ItemId>().ok())
            .filter(|id| id.prefix == prefix && id.parent == parent)
    };

    let mut sequences = SequenceAllocator::new(items.iter().filter_map(parse).map(|id| id.sequence).collect());

    let mut seen = HashSet::new();
    let mut assigned = 0;
    for item in items.iter_mut() {
        let Value::Object(map) = item else { continue };
        let current = map.get("id").and_then(Value::as_str).unwrap_or("").trim().to_string();

        let needs_id = if current.is_empty() {
            true
        } else if !seen.insert(current.clone()) {
            tracing::warn!(id = %current, "duplicate item identifier reassigned");
            true
        } else {
            false
        };
        if !needs_id {
            continue;
        }

        let Some(sequence) = sequences.allocate() else {
            tracing::warn!(prefix = prefix.as_str(), "identifier space exhausted; item left without id");
            continue;
        };
        let id = match parent {
            Some(p) => ItemId::nested(prefix, p, sequence),
            None => ItemId::top(prefix, sequence),
        };
        seen.insert(id.to_string());
        map.insert("id".to_string(), Value::String(id.to_string()));
        assigned += 1;
    }
    assigned
}

/// Apply identifier continuity to a whole section value
///
/// For activities this also covers the tasks, milestones and deliverables of
/// every work package whose own identifier is well-formed.
pub fn assign_section_ids(section: SectionKind, value: &mut Value) -> usize {
    let Some(prefix) = section.id_prefix() else {
        return 0;
    };
    let Value::Array(items) = value else {
        return 0;
    };

    let mut assigned = assign_missing_ids(items, prefix, None);

    if section == SectionKind::Activities {
        for wp in items.iter_mut() {
            let Some(wp_number) = wp
                .get("id")
                .and_then(Value::as_str)
                .and_then(|s| s.parse::<ItemId>().ok())
                .map(|id| id.sequence)
            else {
                continue;
            };
            for (field, nested) in [
                ("tasks", IdPrefix::Task),
                ("milestones", IdPrefix::Milestone),
                ("deliverables", IdPrefix::Deliverable),
            ] {
                if let Some(Value::Array(children)) = wp.get_mut(field) {
                    assigned += assign_missing_ids(children, nested, Some(wp_number));
                }
            }
        }
    }

    assigned
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn ids(items: &[Value]) -> Vec<&str> {
        items.iter().map(|i| i["id"].as_str().unwrap()).collect()
    }

    #[test]
    fn parse_top_level() {
        let id: ItemId = "RISK12".parse().unwrap();
        assert_eq!(id.prefix(), IdPrefix::Risk);
        assert_eq!(id.sequence(), 12);
        assert_eq!(id.parent(), None);
        assert_eq!(id.to_string(), "RISK12");
    }

    #[test]
    fn parse_nested() {
        let id: ItemId = "D2.3".parse().unwrap();
        assert_eq!(id, ItemId::nested(IdPrefix::Deliverable, 2, 3));
        assert_eq!(id.to_string(), "D2.3");
    }

    #[test]
    fn parse_rejects_malformed() {
        for bad in ["", "WP", "WPx", "M1", "M.1", "X1", "WP-1", "T1.a"] {
            assert!(bad.parse::<ItemId>().is_err(), "{bad}");
        }
    }

    #[test]
    fn gaps_are_preserved() {
        let mut items = vec![
            json!({"id": "RISK1"}),
            json!({"id": "RISK4"}),
            json!({"id": ""}),
            json!({}),
        ];
        let n = assign_missing_ids(&mut items, IdPrefix::Risk, None);
        assert_eq!(n, 2);
        assert_eq!(ids(&items), vec!["RISK1", "RISK4", "RISK5", "RISK6"]);
    }

    #[test]
    fn duplicates_get_fresh_ids() {
        let mut items = vec![json!({"id": "WP1"}), json!({"id": "WP1"})];
        assign_missing_ids(&mut items, IdPrefix::WorkPackage, None);
        assert_eq!(ids(&items), vec!["WP1", "WP2"]);
    }

    #[test]
    fn highest_sequence_does_not_overflow() {
        let mut items = vec![
            json!({"id": format!("RISK{}", u32::MAX), "title": "a"}),
            json!({"title": "b"}),
            json!({"id": "RISK1"}),
            json!({}),
        ];
        let n = assign_missing_ids(&mut items, IdPrefix::Risk, None);
        assert_eq!(n, 2);
        assert_eq!(
            ids(&items),
            vec![format!("RISK{}", u32::MAX).as_str(), "RISK2", "RISK1", "RISK3"]
        );
    }

    #[test]
    fn nested_sequence_overflow_reuses_lowest_free() {
        let mut items = vec![json!({"id": format!("T1.{}", u32::MAX)}), json!({"id": ""})];
        assign_missing_ids(&mut items, IdPrefix::Task, Some(1));
        assert_eq!(items[1]["id"], "T1.1");
    }

    #[test]
    fn malformed_ids_are_left_alone() {
        let mut items = vec![json!({"id": "Package A"}), json!({"id": ""})];
        assign_missing_ids(&mut items, IdPrefix::WorkPackage, None);
        assert_eq!(ids(&items), vec!["Package A", "WP1"]);
    }

    #[test]
    fn activities_assign_nested_ids() {
        let mut value = json!([
            {"id": "WP2", "tasks": [{"id": "T2.1"}, {"id": ""}], "milestones": [{}], "deliverables": []},
            {"id": "", "tasks": [{}]}
        ]);
        assign_section_ids(SectionKind::Activities, &mut value);

        assert_eq!(value[0]["tasks"][1]["id"], "T2.2");
        assert_eq!(value[0]["milestones"][0]["id"], "M2.1");
        assert_eq!(value[1]["id"], "WP3");
        assert_eq!(value[1]["tasks"][0]["id"], "T3.1");
    }

    #[test]
    fn sections_without_prefix_are_untouched() {
        let mut value = json!([{"title": "x"}]);
        assert_eq!(assign_section_ids(SectionKind::Outputs, &mut value), 0);
        assert!(value[0].get("id").is_none());
    }
}
