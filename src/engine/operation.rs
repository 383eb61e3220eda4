//! Diff operation data model
//!
//! The reconciler emits an ordered sequence of operations; together they
//! cover every input line on each side exactly once. Operations carry raw
//! line text and original indices so a renderer can maintain independent
//! left/right line counters without re-reading the input.

use crate::engine::intraline::Span;
use derive_new::new;

/// A raw input line together with its zero-based index in its source text.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct DiffLine {
    index: usize,
    text: String,
}

impl DiffLine {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Whether a modification changed visible content or only markdown
/// formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Content,
    Formatting,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DiffOperation {
    Unchanged {
        line1: DiffLine,
        line2: DiffLine,
    },
    Added {
        line2: DiffLine,
    },
    Removed {
        line1: DiffLine,
    },
    Modified {
        line1: DiffLine,
        line2: DiffLine,
        left_spans: Vec<Span>,
        right_spans: Vec<Span>,
        change_kind: ChangeKind,
    },
    /// A line relocated across the texts; `line1.index()` is the origin,
    /// `line2.index()` the destination.
    Moved {
        line1: DiffLine,
        line2: DiffLine,
    },
}

impl DiffOperation {
    /// The left-side line this operation consumes, if any.
    pub fn line1(&self) -> Option<&DiffLine> {
        match self {
            DiffOperation::Unchanged { line1, .. }
            | DiffOperation::Removed { line1 }
            | DiffOperation::Modified { line1, .. }
            | DiffOperation::Moved { line1, .. } => Some(line1),
            DiffOperation::Added { .. } => None,
        }
    }

    /// The right-side line this operation consumes, if any.
    pub fn line2(&self) -> Option<&DiffLine> {
        match self {
            DiffOperation::Unchanged { line2, .. }
            | DiffOperation::Added { line2 }
            | DiffOperation::Modified { line2, .. }
            | DiffOperation::Moved { line2, .. } => Some(line2),
            DiffOperation::Removed { .. } => None,
        }
    }

    pub fn is_unchanged(&self) -> bool {
        matches!(self, DiffOperation::Unchanged { .. })
    }

    pub fn status_char(&self) -> char {
        match self {
            DiffOperation::Unchanged { .. } => 'U',
            DiffOperation::Added { .. } => 'A',
            DiffOperation::Removed { .. } => 'D',
            DiffOperation::Modified { .. } => 'M',
            DiffOperation::Moved { .. } => 'V',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    fn sides_expose_the_lines_they_consume() {
        let removed = DiffOperation::Removed {
            line1: DiffLine::new(4, "gone".to_string()),
        };
        assert_eq!(removed.line1().map(DiffLine::index), Some(4));
        assert_eq!(removed.line2(), None);

        let added = DiffOperation::Added {
            line2: DiffLine::new(2, "new".to_string()),
        };
        assert_eq!(added.line1(), None);
        assert_eq!(added.line2().map(DiffLine::text), Some("new"));
    }

    #[rstest]
    fn moved_carries_origin_and_destination() {
        let moved = DiffOperation::Moved {
            line1: DiffLine::new(1, "para".to_string()),
            line2: DiffLine::new(9, "para".to_string()),
        };
        assert_eq!(moved.line1().map(DiffLine::index), Some(1));
        assert_eq!(moved.line2().map(DiffLine::index), Some(9));
        assert_eq!(moved.status_char(), 'V');
    }
}
