//! Line similarity scoring
//!
//! Produces a score in `[0, 1]` for a pair of line records. Structural
//! mismatches gate the comparison before any content is looked at: lines of
//! different kinds never pair unless one side is plain text, and sub-type
//! mismatches (header level, ordered vs unordered list) score a fixed soft
//! penalty instead of zero.
//!
//! The content measure is token-set Jaccard over the normalized text — the
//! cheap production path. A normalized-edit-distance measure is available
//! behind [`SimilarityMetric`] for short lines where character-level
//! agreement matters more than token overlap; the engine default is Jaccard
//! and every threshold in [`Thresholds`] is calibrated against it.

use crate::engine::segment::{LineRecord, StructuralKind};
use std::collections::HashSet;

pub const HARD_TYPE_MISMATCH: f64 = 0.0;
pub const SOFT_TYPE_MISMATCH: f64 = 0.1;
pub const METHODOLOGY_BONUS: f64 = 0.1;
pub const CONCLUSION_BONUS: f64 = 0.1;
pub const METRIC_BONUS: f64 = 0.05;

/// Tunable classification constants for the whole engine.
///
/// The exact values differ slightly across prior iterations of this engine;
/// this set is the consolidated one, kept in a single value so tests can
/// read them instead of re-hardcoding.
#[derive(Debug, Clone, PartialEq)]
pub struct Thresholds {
    /// At or above: lines are the same line (trivial whitespace aside).
    pub exact_match: f64,
    /// At or above (and below `exact_match`): a candidate modification.
    pub modified_floor: f64,
    /// Strictly above: a one-line lookahead probe signals a pure
    /// insertion/deletion instead of a paired modification.
    pub lookahead: f64,
    /// At or above (on lightly-normalized text): a modification is a
    /// formatting change rather than a content change.
    pub formatting: f64,
    /// At or above: a fingerprint-paired line counts as moved.
    pub move_similarity: f64,
    /// Moves must cross strictly more than this many lines.
    pub move_min_distance: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            exact_match: 0.95,
            modified_floor: 0.3,
            lookahead: 0.8,
            formatting: 0.8,
            move_similarity: 0.85,
            move_min_distance: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SimilarityMetric {
    #[default]
    Jaccard,
    EditDistance,
}

#[derive(Debug, Clone, Default)]
pub struct SimilarityScorer {
    metric: SimilarityMetric,
}

impl SimilarityScorer {
    pub fn new(metric: SimilarityMetric) -> Self {
        SimilarityScorer { metric }
    }

    pub fn metric(&self) -> SimilarityMetric {
        self.metric
    }

    /// Score two lines on their normalized content.
    pub fn score(&self, a: &LineRecord, b: &LineRecord) -> f64 {
        if let Some(gated) = structural_gate(a, b) {
            return gated;
        }

        if a.normalized() == b.normalized() {
            return 1.0;
        }

        if a.normalized().is_empty() || b.normalized().is_empty() {
            return 0.0;
        }

        let base = match self.metric {
            SimilarityMetric::Jaccard => jaccard(a.normalized(), b.normalized()),
            SimilarityMetric::EditDistance => {
                normalized_edit_distance(a.normalized(), b.normalized())
            }
        };

        (base + domain_bonus(a, b)).min(1.0)
    }

    /// Score two lines on their lightly-normalized text (markdown syntax
    /// kept), used to tell formatting changes from content changes.
    pub fn light_score(&self, a: &LineRecord, b: &LineRecord) -> f64 {
        if a.light_normalized() == b.light_normalized() {
            return 1.0;
        }

        if a.light_normalized().is_empty() || b.light_normalized().is_empty() {
            return 0.0;
        }

        match self.metric {
            SimilarityMetric::Jaccard => jaccard(a.light_normalized(), b.light_normalized()),
            SimilarityMetric::EditDistance => {
                normalized_edit_distance(a.light_normalized(), b.light_normalized())
            }
        }
    }
}

/// Structural pre-checks; `Some(score)` short-circuits content comparison.
fn structural_gate(a: &LineRecord, b: &LineRecord) -> Option<f64> {
    if a.kind() == b.kind() {
        return match a.kind() {
            StructuralKind::Header if a.header_level() != b.header_level() => {
                Some(SOFT_TYPE_MISMATCH)
            }
            StructuralKind::List if a.list_kind() != b.list_kind() => Some(SOFT_TYPE_MISMATCH),
            _ => None,
        };
    }

    if a.kind() == StructuralKind::Text || b.kind() == StructuralKind::Text {
        None
    } else {
        Some(HARD_TYPE_MISMATCH)
    }
}

fn domain_bonus(a: &LineRecord, b: &LineRecord) -> f64 {
    let mut bonus = 0.0;

    if a.markers().methodology && b.markers().methodology {
        bonus += METHODOLOGY_BONUS;
    }
    if a.markers().conclusion && b.markers().conclusion {
        bonus += CONCLUSION_BONUS;
    }
    if a.markers().metric && b.markers().metric {
        bonus += METRIC_BONUS;
    }

    bonus
}

/// Ratio of shared to total unique whitespace-split tokens.
pub fn jaccard(a: &str, b: &str) -> f64 {
    let set_a: HashSet<&str> = a.split_whitespace().collect();
    let set_b: HashSet<&str> = b.split_whitespace().collect();

    let union = set_a.union(&set_b).count();
    if union == 0 {
        return 0.0;
    }

    let intersection = set_a.intersection(&set_b).count();
    intersection as f64 / union as f64
}

/// Character-level Levenshtein distance scaled into `[0, 1]`.
pub fn normalized_edit_distance(a: &str, b: &str) -> f64 {
    let chars_a: Vec<char> = a.chars().collect();
    let chars_b: Vec<char> = b.chars().collect();
    let max_len = chars_a.len().max(chars_b.len());

    if max_len == 0 {
        return 1.0;
    }

    (max_len - levenshtein(&chars_a, &chars_b)) as f64 / max_len as f64
}

fn levenshtein(a: &[char], b: &[char]) -> usize {
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, &char_a) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, &char_b) in b.iter().enumerate() {
            let substitution_cost = if char_a == char_b { 0 } else { 1 };
            current[j + 1] = (previous[j] + substitution_cost)
                .min(previous[j + 1] + 1)
                .min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}
