//! Markdown pattern set shared by the segmenter and similarity scorer
//!
//! Pattern sources are plain consts so tests can reference them; the compiled
//! set is built once behind a `Lazy` static and is read-only afterwards.

use once_cell::sync::Lazy;
use regex::Regex;

pub const HEADER_REGEX: &str = r"^(#{1,6})\s+(.+)$";
pub const LIST_UNORDERED_REGEX: &str = r"^\s*([-*+])\s+(.+)$";
pub const LIST_ORDERED_REGEX: &str = r"^\s*(\d+)[.)]\s+(.+)$";
pub const QUOTE_REGEX: &str = r"^>\s+(.*)$";
pub const DIVIDER_REGEX: &str = r"^[-*_]{3,}$";
pub const IMAGE_REGEX: &str = r"!\[([^\]]*)\]\(([^)]+)\)";
pub const LINK_REGEX: &str = r"\[([^\]]+)\]\(([^)]+)\)";
pub const BOLD_REGEX: &str = r"\*\*([^*]+)\*\*";
pub const ITALIC_REGEX: &str = r"\*([^*]+)\*";
pub const CODE_INLINE_REGEX: &str = r"`([^`]+)`";
pub const METRIC_REGEX: &str = r"(?i)\d+%|\$[\d,]+|CTR|CPC|ROAS|CPM|CPA";

pub const CODE_FENCE_MARKER: &str = "```";

/// Keyword classes that mark blog-domain content; both sides matching the
/// same class earns a similarity bonus.
pub static METHODOLOGY_KEYWORDS: phf::Set<&'static str> = phf::phf_set! {
    "method", "data", "prompt", "model", "approach", "experiment",
};

pub static CONCLUSION_KEYWORDS: phf::Set<&'static str> = phf::phf_set! {
    "verdict", "conclusion", "takeaway", "summary", "findings", "results",
};

pub struct Patterns {
    pub header: Regex,
    pub list_unordered: Regex,
    pub list_ordered: Regex,
    pub quote: Regex,
    pub divider: Regex,
    pub image: Regex,
    pub link: Regex,
    pub bold: Regex,
    pub italic: Regex,
    pub code_inline: Regex,
    pub metric: Regex,
}

pub static PATTERNS: Lazy<Patterns> = Lazy::new(|| Patterns {
    header: Regex::new(HEADER_REGEX).expect("regex: header"),
    list_unordered: Regex::new(LIST_UNORDERED_REGEX).expect("regex: unordered list"),
    list_ordered: Regex::new(LIST_ORDERED_REGEX).expect("regex: ordered list"),
    quote: Regex::new(QUOTE_REGEX).expect("regex: quote"),
    divider: Regex::new(DIVIDER_REGEX).expect("regex: divider"),
    image: Regex::new(IMAGE_REGEX).expect("regex: image"),
    link: Regex::new(LINK_REGEX).expect("regex: link"),
    bold: Regex::new(BOLD_REGEX).expect("regex: bold"),
    italic: Regex::new(ITALIC_REGEX).expect("regex: italic"),
    code_inline: Regex::new(CODE_INLINE_REGEX).expect("regex: inline code"),
    metric: Regex::new(METRIC_REGEX).expect("regex: metric"),
});

pub fn matches_keyword_class(normalized: &str, class: &phf::Set<&'static str>) -> bool {
    class.iter().any(|keyword| normalized.contains(keyword))
}
