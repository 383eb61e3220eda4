//! Move detection via line fingerprints
//!
//! Pairs lines whose fingerprint signatures recur at distant positions in
//! both texts, so the reconciler can report them as relocated instead of
//! removed on one side and added on the other. A candidate pair must share
//! its signature and structural kind, sit strictly more than
//! `move_min_distance` lines apart (closer reordering is handled natively
//! by reconciliation), and survive verification with the full similarity
//! score. Lines without significant words never move.
//!
//! Pairing is greedy first-found over left index then right index, and each
//! index is claimed at most once. When several candidates share a signature
//! this can pick a worse pairing than a best-similarity assignment would;
//! kept as is, matching the behavior this detector was tuned against. The
//! one refinement: a verified match within the minimum distance vetoes any
//! distant pairing for that line, so duplicated boilerplate lines do not
//! read as crossed moves when a text is diffed against itself.

use crate::engine::segment::{LineRecord, StructuralKind};
use crate::engine::similarity::{SimilarityScorer, Thresholds};
use derive_new::new;
use std::collections::HashMap;

/// Accepted relocations, indexed from both sides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveSet {
    by_origin: HashMap<usize, usize>,
    by_destination: HashMap<usize, usize>,
}

impl MoveSet {
    fn insert(&mut self, from: usize, to: usize) {
        self.by_origin.insert(from, to);
        self.by_destination.insert(to, from);
    }

    /// Destination index in the right text for a left line, if it moved.
    pub fn destination(&self, from: usize) -> Option<usize> {
        self.by_origin.get(&from).copied()
    }

    /// Origin index in the left text for a right line, if it moved.
    pub fn origin(&self, to: usize) -> Option<usize> {
        self.by_destination.get(&to).copied()
    }

    pub fn claims_left(&self, index: usize) -> bool {
        self.by_origin.contains_key(&index)
    }

    pub fn claims_right(&self, index: usize) -> bool {
        self.by_destination.contains_key(&index)
    }

    pub fn len(&self) -> usize {
        self.by_origin.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_origin.is_empty()
    }
}

#[derive(new)]
pub struct MoveDetector<'d> {
    left: &'d [LineRecord],
    right: &'d [LineRecord],
    scorer: &'d SimilarityScorer,
    thresholds: &'d Thresholds,
}

impl MoveDetector<'_> {
    pub fn detect(&self) -> MoveSet {
        let mut moves = MoveSet::default();

        for (i, left_line) in self.left.iter().enumerate() {
            if left_line.kind() == StructuralKind::Empty
                || !left_line.fingerprint().is_significant()
            {
                continue;
            }

            let mut candidate = None;

            for (j, right_line) in self.right.iter().enumerate() {
                if moves.claims_right(j) {
                    continue;
                }

                if left_line.fingerprint().signature() != right_line.fingerprint().signature()
                    || left_line.kind() != right_line.kind()
                    || self.scorer.score(left_line, right_line) < self.thresholds.move_similarity
                {
                    continue;
                }

                // a matching line within the minimum distance belongs to
                // plain reconciliation; it vetoes any distant pairing, so
                // diffing a text against itself never reports moves
                if i.abs_diff(j) <= self.thresholds.move_min_distance {
                    candidate = None;
                    break;
                }

                if candidate.is_none() {
                    candidate = Some(j);
                }
            }

            if let Some(j) = candidate {
                moves.insert(i, j);
            }
        }

        moves
    }
}
