//! Intra-line word and character diffing
//!
//! Annotates a `modified` line pair with highlight spans. Both granularities
//! share one Levenshtein-style alignment (unit insert/delete/substitution
//! cost 1) backtracked into unchanged/added/removed units, then run-length
//! encoded so that consecutive same-kind units merge into a single span.
//!
//! Granularity selection: short lines (at most [`CHAR_DIFF_TOKEN_CEILING`]
//! tokens on both sides, counting whitespace runs as tokens, or both under
//! [`SHORT_LINE_THRESHOLD`] characters) are compared character by character;
//! everything else word by word with whitespace runs kept as their own
//! units. Lines over [`INTRALINE_SIZE_GUARD`] characters skip the quadratic
//! alignment entirely and come back as one whole-line span per side.
//!
//! The backtrack consumes the right sequence before the left on equal
//! alignment cost, which keeps output deterministic.

use derive_new::new;

/// Token ceiling at or below which character-level diffing fires.
pub const CHAR_DIFF_TOKEN_CEILING: usize = 6;
/// Character count under which both lines are compared character-wise.
pub const SHORT_LINE_THRESHOLD: usize = 30;
/// Character count above which the DP alignment is skipped.
pub const INTRALINE_SIZE_GUARD: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    Unchanged,
    Added,
    Removed,
}

/// A maximal run of same-kind units within one side of a modified line.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Span {
    kind: SpanKind,
    text: String,
}

impl Span {
    pub fn kind(&self) -> SpanKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Left and right highlight views of one modified line pair.
///
/// Concatenating either side's span text reproduces that side's raw line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IntralineDiff {
    left: Vec<Span>,
    right: Vec<Span>,
}

impl IntralineDiff {
    pub fn left(&self) -> &[Span] {
        &self.left
    }

    pub fn right(&self) -> &[Span] {
        &self.right
    }

    pub fn into_parts(self) -> (Vec<Span>, Vec<Span>) {
        (self.left, self.right)
    }
}

/// Compute highlight spans for two raw lines already classified as similar.
pub fn intraline_diff(line1: &str, line2: &str) -> IntralineDiff {
    if line1 == line2 {
        return IntralineDiff {
            left: whole_line(line1, SpanKind::Unchanged),
            right: whole_line(line2, SpanKind::Unchanged),
        };
    }

    let len1 = line1.chars().count();
    let len2 = line2.chars().count();

    // one side empty, or too long for the quadratic alignment
    if line1.is_empty() || line2.is_empty() || len1.max(len2) > INTRALINE_SIZE_GUARD {
        return IntralineDiff {
            left: whole_line(line1, SpanKind::Removed),
            right: whole_line(line2, SpanKind::Added),
        };
    }

    let words1 = split_preserving_whitespace(line1);
    let words2 = split_preserving_whitespace(line2);

    let char_level = (words1.len() <= CHAR_DIFF_TOKEN_CEILING
        && words2.len() <= CHAR_DIFF_TOKEN_CEILING)
        || (len1 < SHORT_LINE_THRESHOLD && len2 < SHORT_LINE_THRESHOLD);

    if char_level {
        char_diff(line1, line2)
    } else {
        word_diff(&words1, &words2)
    }
}

fn whole_line(line: &str, kind: SpanKind) -> Vec<Span> {
    if line.is_empty() {
        Vec::new()
    } else {
        vec![Span::new(kind, line.to_string())]
    }
}

fn char_diff(line1: &str, line2: &str) -> IntralineDiff {
    let chars1: Vec<char> = line1.chars().collect();
    let chars2: Vec<char> = line2.chars().collect();

    let mut left = SpanBuilder::default();
    let mut right = SpanBuilder::default();

    for step in UnitDiff::new(&chars1, &chars2).steps() {
        match step {
            EditStep::Equal { a, b } => {
                left.push_char(SpanKind::Unchanged, chars1[a]);
                right.push_char(SpanKind::Unchanged, chars2[b]);
            }
            EditStep::Delete { a } => left.push_char(SpanKind::Removed, chars1[a]),
            EditStep::Insert { b } => right.push_char(SpanKind::Added, chars2[b]),
        }
    }

    IntralineDiff {
        left: left.finish(),
        right: right.finish(),
    }
}

fn word_diff(words1: &[&str], words2: &[&str]) -> IntralineDiff {
    let mut left = SpanBuilder::default();
    let mut right = SpanBuilder::default();

    for step in UnitDiff::new(words1, words2).steps() {
        match step {
            EditStep::Equal { a, b } => {
                left.push_str(SpanKind::Unchanged, words1[a]);
                right.push_str(SpanKind::Unchanged, words2[b]);
            }
            EditStep::Delete { a } => left.push_str(SpanKind::Removed, words1[a]),
            EditStep::Insert { b } => right.push_str(SpanKind::Added, words2[b]),
        }
    }

    IntralineDiff {
        left: left.finish(),
        right: right.finish(),
    }
}

/// Split into alternating runs of non-whitespace and whitespace, so that
/// spacing survives span reconstruction.
fn split_preserving_whitespace(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut in_whitespace: Option<bool> = None;

    for (pos, ch) in text.char_indices() {
        let whitespace = ch.is_whitespace();
        if let Some(previous) = in_whitespace
            && previous != whitespace
        {
            tokens.push(&text[start..pos]);
            start = pos;
        }
        in_whitespace = Some(whitespace);
    }

    if !text.is_empty() {
        tokens.push(&text[start..]);
    }

    tokens
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditStep {
    Equal { a: usize, b: usize },
    Insert { b: usize },
    Delete { a: usize },
}

/// Shared alignment over any unit type; chars and words use the same table
/// and the same backtrack policy.
#[derive(Debug, new)]
struct UnitDiff<'d, T> {
    a: &'d [T],
    b: &'d [T],
}

impl<T: Eq> UnitDiff<'_, T> {
    fn distance_table(&self) -> Vec<Vec<usize>> {
        let (n, m) = (self.a.len(), self.b.len());
        let mut dp = vec![vec![0usize; m + 1]; n + 1];

        for (i, row) in dp.iter_mut().enumerate() {
            row[0] = i;
        }
        for j in 0..=m {
            dp[0][j] = j;
        }

        for i in 1..=n {
            for j in 1..=m {
                dp[i][j] = if self.a[i - 1] == self.b[j - 1] {
                    dp[i - 1][j - 1]
                } else {
                    1 + dp[i - 1][j].min(dp[i][j - 1]).min(dp[i - 1][j - 1])
                };
            }
        }

        dp
    }

    /// Edit steps in left-to-right order. On ties the insertion branch wins
    /// over the deletion branch.
    fn steps(&self) -> Vec<EditStep> {
        let dp = self.distance_table();
        let (mut i, mut j) = (self.a.len(), self.b.len());
        let mut steps = Vec::new();

        while i > 0 || j > 0 {
            if i > 0 && j > 0 && self.a[i - 1] == self.b[j - 1] {
                steps.push(EditStep::Equal { a: i - 1, b: j - 1 });
                i -= 1;
                j -= 1;
            } else if j > 0 && (i == 0 || dp[i][j - 1] <= dp[i - 1][j]) {
                steps.push(EditStep::Insert { b: j - 1 });
                j -= 1;
            } else {
                steps.push(EditStep::Delete { a: i - 1 });
                i -= 1;
            }
        }

        steps.reverse();
        steps
    }
}

/// Run-length encodes classified units into spans.
#[derive(Debug, Default)]
struct SpanBuilder {
    spans: Vec<Span>,
    current: Option<(SpanKind, String)>,
}

impl SpanBuilder {
    fn push_char(&mut self, kind: SpanKind, unit: char) {
        match &mut self.current {
            Some((current_kind, text)) if *current_kind == kind => text.push(unit),
            _ => self.start_run(kind, unit.to_string()),
        }
    }

    fn push_str(&mut self, kind: SpanKind, unit: &str) {
        match &mut self.current {
            Some((current_kind, text)) if *current_kind == kind => text.push_str(unit),
            _ => self.start_run(kind, unit.to_string()),
        }
    }

    fn start_run(&mut self, kind: SpanKind, text: String) {
        if let Some((finished_kind, finished_text)) = self.current.take() {
            self.spans.push(Span::new(finished_kind, finished_text));
        }
        self.current = Some((kind, text));
    }

    fn finish(mut self) -> Vec<Span> {
        if let Some((kind, text)) = self.current.take() {
            self.spans.push(Span::new(kind, text));
        }
        self.spans
    }
}
