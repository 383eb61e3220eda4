//! Line reconciliation — the sequence-alignment core
//!
//! Aligns two segmented line sequences into an ordered operation sequence
//! covering every input line on each side exactly once.
//!
//! ## Algorithm Overview
//!
//! The reconciler walks both sequences with a pointer pair `(i, j)`. Per
//! step, in priority order:
//!
//! 1. **Move short-circuit** — a left line claimed by the move detector is
//!    emitted as `Moved` immediately and only `i` advances; its destination
//!    line is skipped when `j` later reaches it.
//! 2. **Exhaustion** — once one side runs out, the remainder of the other
//!    side drains as `Added`/`Removed`.
//! 3. **Similarity classification** — the pointer pair is scored:
//!    at or above `exact_match` the lines are `Unchanged`; below
//!    `modified_floor` they are an unrelated `Removed` + `Added` pair;
//!    in between they are a candidate `Modified`, annotated with intra-line
//!    spans. In the latter two bands a one-line lookahead probe can instead
//!    classify the current line as a pure insertion or deletion: when
//!    `score(A[i+1], B[j])` or `score(A[i], B[j+1])` crosses the lookahead
//!    threshold, a single `Removed`/`Added` is emitted and one pointer
//!    advances. When both probes cross it, the deletion side wins so the
//!    left sequence stays stable.
//!
//! Classification only ever looks at the current pointer pair and its
//! one-line lookahead, keeping the walk `O(n + m)` amortized on top of the
//! move-detection preprocessing.
//!
//! ## Anchored reconciliation
//!
//! Segments larger than [`ANCHOR_MIN_SEGMENT`] are first split at anchors:
//! lines whose normalized text occurs exactly once on both sides (unique
//! headers rank before code fences before other unique lines). Accepted
//! anchors must be strictly monotonic in both sequences; each becomes a
//! fixed `Unchanged` point and the gaps between them recurse through the
//! same procedure, bounded by [`ANCHOR_DEPTH_CAP`] before falling back to
//! the plain pointer walk.

use crate::engine::intraline::intraline_diff;
use crate::engine::moves::{MoveDetector, MoveSet};
use crate::engine::operation::{ChangeKind, DiffLine, DiffOperation};
use crate::engine::segment::{LineRecord, StructuralKind};
use crate::engine::similarity::{SimilarityScorer, Thresholds};
use derive_new::new;
use std::collections::HashMap;
use std::ops::Range;

/// Segments at most this long skip anchor extraction.
pub const ANCHOR_MIN_SEGMENT: usize = 3;
/// Recursion bound for anchored reconciliation.
pub const ANCHOR_DEPTH_CAP: usize = 10;

#[derive(new)]
pub struct Reconciler<'d> {
    left: &'d [LineRecord],
    right: &'d [LineRecord],
    scorer: &'d SimilarityScorer,
    thresholds: &'d Thresholds,
}

impl Reconciler<'_> {
    pub fn reconcile(&self) -> Vec<DiffOperation> {
        let moves = MoveDetector::new(self.left, self.right, self.scorer, self.thresholds).detect();

        let mut operations = Vec::new();
        self.reconcile_segment(
            0..self.left.len(),
            0..self.right.len(),
            &moves,
            0,
            &mut operations,
        );
        operations
    }

    fn reconcile_segment(
        &self,
        range1: Range<usize>,
        range2: Range<usize>,
        moves: &MoveSet,
        depth: usize,
        operations: &mut Vec<DiffOperation>,
    ) {
        if depth < ANCHOR_DEPTH_CAP
            && (range1.len() > ANCHOR_MIN_SEGMENT || range2.len() > ANCHOR_MIN_SEGMENT)
        {
            let anchors = self.find_anchors(&range1, &range2, moves);
            if !anchors.is_empty() {
                let mut cursor1 = range1.start;
                let mut cursor2 = range2.start;

                for (anchor1, anchor2) in anchors {
                    self.reconcile_segment(
                        cursor1..anchor1,
                        cursor2..anchor2,
                        moves,
                        depth + 1,
                        operations,
                    );
                    operations.push(DiffOperation::Unchanged {
                        line1: diff_line(&self.left[anchor1]),
                        line2: diff_line(&self.right[anchor2]),
                    });
                    cursor1 = anchor1 + 1;
                    cursor2 = anchor2 + 1;
                }

                self.reconcile_segment(
                    cursor1..range1.end,
                    cursor2..range2.end,
                    moves,
                    depth + 1,
                    operations,
                );
                return;
            }
        }

        self.scan(range1, range2, moves, operations);
    }

    /// The pointer walk over one segment.
    fn scan(
        &self,
        range1: Range<usize>,
        range2: Range<usize>,
        moves: &MoveSet,
        operations: &mut Vec<DiffOperation>,
    ) {
        let (mut i, mut j) = (range1.start, range2.start);
        let (end1, end2) = (range1.end, range2.end);

        while i < end1 || j < end2 {
            if i < end1
                && let Some(to) = moves.destination(i)
            {
                operations.push(DiffOperation::Moved {
                    line1: diff_line(&self.left[i]),
                    line2: diff_line(&self.right[to]),
                });
                i += 1;
                continue;
            }

            // relocated into this position; already emitted from the left
            if j < end2 && moves.claims_right(j) {
                j += 1;
                continue;
            }

            if i >= end1 {
                operations.push(added(&self.right[j]));
                j += 1;
                continue;
            }

            if j >= end2 {
                operations.push(removed(&self.left[i]));
                i += 1;
                continue;
            }

            let score = self.scorer.score(&self.left[i], &self.right[j]);

            if score >= self.thresholds.exact_match {
                operations.push(DiffOperation::Unchanged {
                    line1: diff_line(&self.left[i]),
                    line2: diff_line(&self.right[j]),
                });
                i += 1;
                j += 1;
                continue;
            }

            // a strong one-line lookahead means the current line is a pure
            // deletion or insertion rather than half of a modification
            let deletion_probe = if i + 1 < end1 {
                self.scorer.score(&self.left[i + 1], &self.right[j])
            } else {
                0.0
            };
            let insertion_probe = if j + 1 < end2 {
                self.scorer.score(&self.left[i], &self.right[j + 1])
            } else {
                0.0
            };

            if deletion_probe > self.thresholds.lookahead {
                operations.push(removed(&self.left[i]));
                i += 1;
            } else if insertion_probe > self.thresholds.lookahead {
                operations.push(added(&self.right[j]));
                j += 1;
            } else if score >= self.thresholds.modified_floor {
                operations.push(self.modified(&self.left[i], &self.right[j]));
                i += 1;
                j += 1;
            } else {
                operations.push(removed(&self.left[i]));
                operations.push(added(&self.right[j]));
                i += 1;
                j += 1;
            }
        }
    }

    fn modified(&self, left: &LineRecord, right: &LineRecord) -> DiffOperation {
        let (left_spans, right_spans) = intraline_diff(left.raw(), right.raw()).into_parts();

        let change_kind = if self.scorer.light_score(left, right) >= self.thresholds.formatting {
            ChangeKind::Formatting
        } else {
            ChangeKind::Content
        };

        DiffOperation::Modified {
            line1: diff_line(left),
            line2: diff_line(right),
            left_spans,
            right_spans,
            change_kind,
        }
    }

    /// Anchor pairs within a segment, ordered by left index, strictly
    /// monotonic in both sequences.
    fn find_anchors(
        &self,
        range1: &Range<usize>,
        range2: &Range<usize>,
        moves: &MoveSet,
    ) -> Vec<(usize, usize)> {
        let left_counts = occurrence_counts(self.left, range1);
        let right_counts = occurrence_counts(self.right, range2);

        let mut candidates = Vec::new();
        for i in range1.clone() {
            if moves.claims_left(i) {
                continue;
            }

            let record = &self.left[i];
            if !matches!(left_counts.get(record.normalized()), Some(&(1, _))) {
                continue;
            }

            if let Some(&(1, j)) = right_counts.get(record.normalized())
                && !moves.claims_right(j)
                && self.right[j].kind() == record.kind()
            {
                candidates.push((anchor_priority(record.kind()), i, j));
            }
        }

        candidates.sort_unstable();

        let mut accepted: Vec<(usize, usize)> = Vec::new();
        for (_, i, j) in candidates {
            let position = accepted.partition_point(|&(accepted1, _)| accepted1 < i);
            let fits_before = position == 0 || accepted[position - 1].1 < j;
            let fits_after = position == accepted.len() || accepted[position].1 > j;
            if fits_before && fits_after {
                accepted.insert(position, (i, j));
            }
        }

        accepted
    }
}

fn anchor_priority(kind: StructuralKind) -> u8 {
    match kind {
        StructuralKind::Header => 0,
        StructuralKind::CodeFence => 1,
        _ => 2,
    }
}

/// Normalized-text occurrence count and last index within a range.
fn occurrence_counts<'r>(
    records: &'r [LineRecord],
    range: &Range<usize>,
) -> HashMap<&'r str, (usize, usize)> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for index in range.clone() {
        let entry = counts
            .entry(records[index].normalized())
            .or_insert((0, index));
        entry.0 += 1;
        entry.1 = index;
    }
    counts
}

fn diff_line(record: &LineRecord) -> DiffLine {
    DiffLine::new(record.index(), record.raw().to_string())
}

fn added(record: &LineRecord) -> DiffOperation {
    DiffOperation::Added {
        line2: diff_line(record),
    }
}

fn removed(record: &LineRecord) -> DiffOperation {
    DiffOperation::Removed {
        line1: diff_line(record),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::intraline::SpanKind;
    use crate::engine::segment::segment;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn reconcile(text1: &str, text2: &str) -> Vec<DiffOperation> {
        let left = segment(text1);
        let right = segment(text2);
        let scorer = SimilarityScorer::default();
        let thresholds = Thresholds::default();
        Reconciler::new(&left, &right, &scorer, &thresholds).reconcile()
    }

    fn status_string(operations: &[DiffOperation]) -> String {
        operations.iter().map(DiffOperation::status_char).collect()
    }

    #[rstest]
    fn identical_texts_reconcile_unchanged() {
        let text = "# Title\n\nfirst paragraph\nsecond paragraph";
        let operations = reconcile(text, text);

        assert_eq!(status_string(&operations), "UUUU");
        for operation in &operations {
            assert_eq!(
                operation.line1().map(DiffLine::text),
                operation.line2().map(DiffLine::text)
            );
        }
    }

    #[rstest]
    fn empty_texts_reconcile_to_nothing() {
        assert_eq!(reconcile("", ""), Vec::new());
    }

    #[rstest]
    fn one_empty_side_drains_as_additions() {
        let operations = reconcile("", "line one\nline two");
        assert_eq!(status_string(&operations), "AA");

        let operations = reconcile("line one\nline two", "");
        assert_eq!(status_string(&operations), "DD");
    }

    #[rstest]
    fn modified_line_carries_intraline_spans() {
        let operations = reconcile("# Title\nHello world", "# Title\nHello there");
        assert_eq!(status_string(&operations), "UM");

        let DiffOperation::Modified {
            line1,
            line2,
            left_spans,
            right_spans,
            change_kind,
        } = &operations[1]
        else {
            panic!("expected a modified operation, got {:?}", operations[1]);
        };

        assert_eq!(line1.text(), "Hello world");
        assert_eq!(line2.text(), "Hello there");
        assert_eq!(*change_kind, ChangeKind::Content);

        let left_text: String = left_spans.iter().map(|span| span.text()).collect();
        let right_text: String = right_spans.iter().map(|span| span.text()).collect();
        assert_eq!(left_text, "Hello world");
        assert_eq!(right_text, "Hello there");

        assert_eq!(left_spans[0].kind(), SpanKind::Unchanged);
        assert_eq!(left_spans[0].text(), "Hello ");
        assert!(left_spans.iter().any(|s| s.kind() == SpanKind::Removed));
        assert!(right_spans.iter().any(|s| s.kind() == SpanKind::Added));
    }

    #[rstest]
    fn short_distance_swap_is_not_a_move() {
        // |1 - 2| = 1 is under the move distance, so the swap reconciles as
        // a deletion before the matching line plus a trailing addition
        let operations = reconcile("A\nB\nC", "A\nC\nB");
        assert_eq!(status_string(&operations), "UDUA");

        assert_eq!(operations[1].line1().map(DiffLine::text), Some("B"));
        assert_eq!(operations[2].line1().map(DiffLine::text), Some("C"));
        assert_eq!(operations[3].line2().map(DiffLine::text), Some("B"));
    }

    #[rstest]
    fn distant_relocation_reconciles_as_moved() {
        let text1 = "a memorable opening paragraph\none\ntwo\nthree\nfour\nfive";
        let text2 = "one\ntwo\nthree\nfour\nfive\na memorable opening paragraph";

        let operations = reconcile(text1, text2);
        assert_eq!(status_string(&operations), "VUUUUU");

        let DiffOperation::Moved { line1, line2 } = &operations[0] else {
            panic!("expected a moved operation, got {:?}", operations[0]);
        };
        assert_eq!(line1.index(), 0);
        assert_eq!(line2.index(), 5);
    }

    #[rstest]
    fn insertion_before_similar_line_is_not_a_modification() {
        // the new heading slots in; the old first line must not pair with it
        let operations = reconcile(
            "shared closing sentence here",
            "a brand new introduction line\nshared closing sentence here",
        );
        assert_eq!(status_string(&operations), "AU");
    }

    #[rstest]
    fn unrelated_lines_replace_as_removed_plus_added() {
        let operations = reconcile(
            "alpha beta gamma delta\ncompletely different words",
            "alpha beta gamma delta\nanother unrelated sentence",
        );
        assert_eq!(status_string(&operations), "UDA");
    }

    #[rstest]
    fn formatting_heavy_modification_is_flagged() {
        // the shared list marker keeps the lightly-normalized comparison
        // high while the stripped comparison sits in the modified band
        let operations = reconcile(
            "- alpha beta gamma delta",
            "- alpha beta gamma delta epsilon",
        );
        assert_eq!(status_string(&operations), "M");

        let DiffOperation::Modified { change_kind, .. } = &operations[0] else {
            panic!("expected a modified operation, got {:?}", operations[0]);
        };
        assert_eq!(*change_kind, ChangeKind::Formatting);
    }

    #[rstest]
    fn grown_list_item_is_a_single_modification() {
        let operations = reconcile("- item one", "- item one modified");
        assert_eq!(status_string(&operations), "M");

        let DiffOperation::Modified {
            left_spans,
            right_spans,
            change_kind,
            ..
        } = &operations[0]
        else {
            panic!("expected a modified operation, got {:?}", operations[0]);
        };

        // short lines diff character-wise; the left side is untouched
        assert_eq!(left_spans.len(), 1);
        assert_eq!(left_spans[0].kind(), SpanKind::Unchanged);
        assert_eq!(*change_kind, ChangeKind::Content);

        let right_text: String = right_spans.iter().map(|span| span.text()).collect();
        assert_eq!(right_text, "- item one modified");
    }

    #[rstest]
    fn thresholds_are_tunable() {
        let left = segment("alpha beta gamma delta\nshared tail line");
        let right = segment("alpha beta gamma epsilon\nshared tail line");
        let scorer = SimilarityScorer::default();

        // with the defaults the 3-of-5 token overlap is a modification
        let default_thresholds = Thresholds::default();
        let operations =
            Reconciler::new(&left, &right, &scorer, &default_thresholds).reconcile();
        assert_eq!(status_string(&operations), "MU");

        // raising the floor turns the same pair into a replacement
        let strict = Thresholds {
            modified_floor: 0.7,
            ..Thresholds::default()
        };
        let operations = Reconciler::new(&left, &right, &scorer, &strict).reconcile();
        assert_eq!(status_string(&operations), "DAU");
    }

    #[rstest]
    fn unique_header_anchors_large_segments() {
        let text1 = "intro line alpha\nintro line beta\nintro line gamma\n\
                     ## Results Section\nfirst finding entry\nsecond finding entry";
        let text2 = "intro line alpha\nreworked intro line beta\nintro line gamma\n\
                     ## Results Section\nfirst finding entry\nbrand new closing entry";

        let operations = reconcile(text1, text2);

        // the unique header stays a fixed unchanged point
        assert!(operations.iter().any(|operation| matches!(
            operation,
            DiffOperation::Unchanged { line1, .. } if line1.text() == "## Results Section"
        )));

        assert_coverage(&operations, 6, 6);
    }

    #[rstest]
    #[case("# Title\n\nbody text here", "# Title\n\nbody text here")]
    #[case("a\nb\nc\nd\ne", "e\nd\nc\nb\na")]
    #[case("", "anything at all")]
    #[case("# One\ntwo\n## Three\nfour five six", "four five six\n# One\ntwo")]
    fn every_line_is_covered_exactly_once(#[case] text1: &str, #[case] text2: &str) {
        let operations = reconcile(text1, text2);
        let lines1 = if text1.is_empty() { 0 } else { text1.split('\n').count() };
        let lines2 = if text2.is_empty() { 0 } else { text2.split('\n').count() };
        assert_coverage(&operations, lines1, lines2);
    }

    fn assert_coverage(operations: &[DiffOperation], lines1: usize, lines2: usize) {
        let mut seen1 = vec![0usize; lines1];
        let mut seen2 = vec![0usize; lines2];

        for operation in operations {
            if let Some(line1) = operation.line1() {
                seen1[line1.index()] += 1;
            }
            if let Some(line2) = operation.line2() {
                seen2[line2.index()] += 1;
            }
        }

        assert!(seen1.iter().all(|&count| count == 1), "left coverage: {seen1:?}");
        assert!(seen2.iter().all(|&count| count == 1), "right coverage: {seen2:?}");
    }
}
