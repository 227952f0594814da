//! Targeted fill strategy
//!
//! Only the designated list positions change. Every other position is copied
//! from the original unchanged, and the result has the original's length.

use crate::fill::fill_merge;
use crate::strategy::{MergeError, MergeStrategy};
use grantgen_document::GenerationMode;
use serde_json::Value;

/// Regenerate designated list positions
#[derive(Debug, Clone, Copy, Default)]
pub struct TargetedFillStrategy;

impl TargetedFillStrategy {
    /// Create targeted fill strategy
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Pair each targeted position with its generated item
///
/// A generator answering with at least one item per target is matched in
/// order, unless its answer mirrors the whole section, which is matched by
/// position. A short answer fills the first targets in order; the remaining
/// targets are returned unpaired.
fn pairings<'a>(
    indices: &[usize],
    original_len: usize,
    generated: &'a [Value],
) -> (Vec<(usize, &'a Value)>, Vec<usize>) {
    if generated.len() != indices.len() && generated.len() >= original_len {
        let (paired, unpaired): (Vec<_>, Vec<_>) =
            indices.iter().map(|&idx| (idx, generated.get(idx))).partition(|(_, item)| item.is_some());
        return (
            paired.into_iter().filter_map(|(idx, item)| item.map(|item| (idx, item))).collect(),
            unpaired.into_iter().map(|(idx, _)| idx).collect(),
        );
    }
    let paired: Vec<_> = indices.iter().copied().zip(generated).collect();
    let unpaired = indices[paired.len()..].to_vec();
    (paired, unpaired)
}

impl MergeStrategy for TargetedFillStrategy {
    fn merge(
        &self,
        original: &Value,
        generated: &Value,
        mode: &GenerationMode,
    ) -> Result<Value, MergeError> {
        let (Value::Array(orig), Value::Array(gen)) = (original, generated) else {
            return Err(MergeError::shape_mismatch(original, generated));
        };

        let (paired, unpaired) = pairings(mode.indices(), orig.len(), gen);
        if !unpaired.is_empty() {
            tracing::warn!(
                targets = ?unpaired,
                generated = gen.len(),
                "generator returned no item for targeted positions"
            );
        }

        let mut merged = orig.clone();
        for (idx, item) in paired {
            match merged.get_mut(idx) {
                // Existing non-empty fields such as identifiers win.
                Some(slot) => *slot = fill_merge(slot, item),
                None => tracing::warn!(
                    index = idx,
                    len = orig.len(),
                    "targeted index out of range, skipped"
                ),
            }
        }
        Ok(Value::Array(merged))
    }

    fn preserves_user_text(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "targeted-fill"
    }
}
