//! Line segmentation and structural analysis
//!
//! Splits raw text into per-line records carrying everything later stages
//! need: the structural kind of the line, a normalized form with markdown
//! syntax stripped (used only for comparison, never for output), a lightly
//! normalized form that keeps the syntax, and a fingerprint for move
//! detection.
//!
//! Classification is total over all strings; malformed markdown never fails,
//! it just classifies as plain text.

use crate::engine::patterns::{
    CODE_FENCE_MARKER, CONCLUSION_KEYWORDS, METHODOLOGY_KEYWORDS, PATTERNS, matches_keyword_class,
};
use std::collections::HashSet;

/// Tokens must be longer than this to participate in fingerprints.
pub const SIGNIFICANT_WORD_LEN: usize = 3;
/// Number of significant words joined into a fingerprint signature.
pub const SIGNATURE_WIDTH: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructuralKind {
    Header,
    List,
    Quote,
    CodeFence,
    Divider,
    Image,
    Empty,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListKind {
    Ordered,
    Unordered,
    #[default]
    None,
}

/// Content summary used to pair relocated lines across the two texts.
///
/// The signature is the first [`SIGNATURE_WIDTH`] significant words joined
/// with `|`; lines without any significant word get an empty signature and
/// are never considered move candidates.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Fingerprint {
    significant_words: Vec<String>,
    signature: String,
    word_set: HashSet<String>,
}

impl Fingerprint {
    fn from_normalized(normalized: &str) -> Self {
        let significant_words = normalized
            .split_whitespace()
            .filter(|word| word.chars().count() > SIGNIFICANT_WORD_LEN)
            .map(str::to_string)
            .collect::<Vec<_>>();

        let signature = significant_words
            .iter()
            .take(SIGNATURE_WIDTH)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("|");

        let word_set = significant_words.iter().cloned().collect();

        Fingerprint {
            significant_words,
            signature,
            word_set,
        }
    }

    pub fn significant_words(&self) -> &[String] {
        &self.significant_words
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn word_set(&self) -> &HashSet<String> {
        &self.word_set
    }

    pub fn is_significant(&self) -> bool {
        !self.signature.is_empty()
    }
}

/// Blog-domain content classes detected per line; matching classes on both
/// sides of a comparison earn a similarity bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DomainMarkers {
    pub methodology: bool,
    pub conclusion: bool,
    pub metric: bool,
}

/// One line of input text, classified and normalized.
///
/// Records are created once per diff run by [`segment`] and immutable
/// afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct LineRecord {
    raw: String,
    index: usize,
    kind: StructuralKind,
    normalized: String,
    light_normalized: String,
    header_level: usize,
    list_kind: ListKind,
    fingerprint: Fingerprint,
    markers: DomainMarkers,
}

impl LineRecord {
    fn from_line(raw: &str, index: usize) -> Self {
        let trimmed = raw.trim();
        let kind = classify(trimmed);
        let normalized = normalize(trimmed);
        let light_normalized = light_normalize(trimmed);
        let fingerprint = Fingerprint::from_normalized(&normalized);

        let header_level = match kind {
            StructuralKind::Header => PATTERNS
                .header
                .captures(trimmed)
                .map(|caps| caps[1].len())
                .unwrap_or(0),
            _ => 0,
        };

        let list_kind = match kind {
            StructuralKind::List if PATTERNS.list_ordered.is_match(trimmed) => ListKind::Ordered,
            StructuralKind::List => ListKind::Unordered,
            _ => ListKind::None,
        };

        let markers = DomainMarkers {
            methodology: matches_keyword_class(&normalized, &METHODOLOGY_KEYWORDS),
            conclusion: matches_keyword_class(&normalized, &CONCLUSION_KEYWORDS),
            metric: PATTERNS.metric.is_match(trimmed),
        };

        LineRecord {
            raw: raw.to_string(),
            index,
            kind,
            normalized,
            light_normalized,
            header_level,
            list_kind,
            fingerprint,
            markers,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn trimmed(&self) -> &str {
        self.raw.trim()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn kind(&self) -> StructuralKind {
        self.kind
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    pub fn light_normalized(&self) -> &str {
        &self.light_normalized
    }

    pub fn header_level(&self) -> usize {
        self.header_level
    }

    pub fn list_kind(&self) -> ListKind {
        self.list_kind
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    pub fn markers(&self) -> DomainMarkers {
        self.markers
    }
}

/// Split text into classified line records, preserving empty lines.
///
/// The empty string yields zero records.
pub fn segment(text: &str) -> Vec<LineRecord> {
    if text.is_empty() {
        return Vec::new();
    }

    text.split('\n')
        .enumerate()
        .map(|(index, line)| LineRecord::from_line(line, index))
        .collect()
}

/// Classify a trimmed line by ordered pattern precedence.
pub fn classify(trimmed: &str) -> StructuralKind {
    if trimmed.is_empty() {
        StructuralKind::Empty
    } else if PATTERNS.header.is_match(trimmed) {
        StructuralKind::Header
    } else if PATTERNS.list_unordered.is_match(trimmed) || PATTERNS.list_ordered.is_match(trimmed) {
        StructuralKind::List
    } else if PATTERNS.quote.is_match(trimmed) {
        StructuralKind::Quote
    } else if trimmed.starts_with(CODE_FENCE_MARKER) {
        StructuralKind::CodeFence
    } else if PATTERNS.divider.is_match(trimmed) {
        StructuralKind::Divider
    } else if PATTERNS.image.is_match(trimmed) {
        StructuralKind::Image
    } else {
        StructuralKind::Text
    }
}

/// Strip markdown syntax and collapse whitespace for content comparison.
///
/// Lossy by design; the result is only ever compared, never rendered.
pub fn normalize(trimmed: &str) -> String {
    let text = PATTERNS.header.replace(trimmed, "$2");
    let text = PATTERNS.list_unordered.replace(&text, "$2");
    let text = PATTERNS.list_ordered.replace(&text, "$2");
    let text = PATTERNS.quote.replace(&text, "$1");
    let text = PATTERNS.image.replace_all(&text, "$1");
    let text = PATTERNS.link.replace_all(&text, "$1");
    let text = PATTERNS.bold.replace_all(&text, "$1");
    let text = PATTERNS.italic.replace_all(&text, "$1");
    let text = PATTERNS.code_inline.replace_all(&text, "$1");

    collapse_whitespace(&text).to_lowercase()
}

/// Collapse whitespace and casefold but keep markdown syntax, so that
/// formatting-only edits stay visible to the comparison.
pub fn light_normalize(trimmed: &str) -> String {
    collapse_whitespace(trimmed).to_lowercase()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
