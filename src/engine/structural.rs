//! Structural element comparison
//!
//! Diffs the structural element lists (headers, lists, quotes, code fences)
//! of two texts independently of line reconciliation, producing a summary
//! signal per category. Deliberately simpler than the reconciler: exact
//! matching only, informational only, and never fed back into the
//! operation sequence.

use crate::engine::patterns::{CODE_FENCE_MARKER, PATTERNS};
use crate::engine::segment::{LineRecord, ListKind, StructuralKind};
use derive_new::new;

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct HeaderElement {
    level: usize,
    text: String,
    normalized: String,
    index: usize,
}

impl HeaderElement {
    pub fn level(&self) -> usize {
        self.level
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct ListElement {
    kind: ListKind,
    text: String,
    index: usize,
}

impl ListElement {
    pub fn kind(&self) -> ListKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct QuoteElement {
    text: String,
    index: usize,
}

impl QuoteElement {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct CodeFenceElement {
    language: String,
    text: String,
    index: usize,
}

impl CodeFenceElement {
    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

/// Structural elements of one text, grouped by category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuralElements {
    headers: Vec<HeaderElement>,
    lists: Vec<ListElement>,
    quotes: Vec<QuoteElement>,
    code_fences: Vec<CodeFenceElement>,
}

impl StructuralElements {
    pub fn collect(records: &[LineRecord]) -> Self {
        let mut elements = StructuralElements::default();

        for record in records {
            let trimmed = record.trimmed();
            match record.kind() {
                StructuralKind::Header => {
                    let text = PATTERNS
                        .header
                        .captures(trimmed)
                        .map(|caps| caps[2].to_string())
                        .unwrap_or_else(|| trimmed.to_string());
                    elements.headers.push(HeaderElement::new(
                        record.header_level(),
                        text,
                        record.normalized().to_string(),
                        record.index(),
                    ));
                }
                StructuralKind::List => {
                    elements.lists.push(ListElement::new(
                        record.list_kind(),
                        trimmed.to_string(),
                        record.index(),
                    ));
                }
                StructuralKind::Quote => {
                    elements
                        .quotes
                        .push(QuoteElement::new(trimmed.to_string(), record.index()));
                }
                StructuralKind::CodeFence => {
                    let language = trimmed.trim_start_matches(CODE_FENCE_MARKER).to_string();
                    elements.code_fences.push(CodeFenceElement::new(
                        language,
                        trimmed.to_string(),
                        record.index(),
                    ));
                }
                _ => {}
            }
        }

        elements
    }

    pub fn headers(&self) -> &[HeaderElement] {
        &self.headers
    }

    pub fn lists(&self) -> &[ListElement] {
        &self.lists
    }

    pub fn quotes(&self) -> &[QuoteElement] {
        &self.quotes
    }

    pub fn code_fences(&self) -> &[CodeFenceElement] {
        &self.code_fences
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementChangeKind {
    Unchanged,
    Moved,
    Removed,
    Added,
}

/// One element's fate across the two texts.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct ElementChange<T> {
    kind: ElementChangeKind,
    element: T,
    from_index: Option<usize>,
    to_index: Option<usize>,
}

impl<T> ElementChange<T> {
    pub fn kind(&self) -> ElementChangeKind {
        self.kind
    }

    pub fn element(&self) -> &T {
        &self.element
    }

    pub fn from_index(&self) -> Option<usize> {
        self.from_index
    }

    pub fn to_index(&self) -> Option<usize> {
        self.to_index
    }
}

/// Count of non-unchanged elements per category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StructuralCounts {
    pub headers: usize,
    pub lists: usize,
    pub quotes: usize,
    pub code_fences: usize,
}

impl StructuralCounts {
    pub fn total(&self) -> usize {
        self.headers + self.lists + self.quotes + self.code_fences
    }
}

/// Per-category element changes plus aggregate counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuralChangeSummary {
    headers: Vec<ElementChange<HeaderElement>>,
    lists: Vec<ElementChange<ListElement>>,
    quotes: Vec<ElementChange<QuoteElement>>,
    code_fences: Vec<ElementChange<CodeFenceElement>>,
    counts: StructuralCounts,
}

impl StructuralChangeSummary {
    pub fn headers(&self) -> &[ElementChange<HeaderElement>] {
        &self.headers
    }

    pub fn lists(&self) -> &[ElementChange<ListElement>] {
        &self.lists
    }

    pub fn quotes(&self) -> &[ElementChange<QuoteElement>] {
        &self.quotes
    }

    pub fn code_fences(&self) -> &[ElementChange<CodeFenceElement>] {
        &self.code_fences
    }

    pub fn counts(&self) -> StructuralCounts {
        self.counts
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
            && self.lists.is_empty()
            && self.quotes.is_empty()
            && self.code_fences.is_empty()
    }
}

/// Compare both texts' structural elements category by category.
pub fn compare(left: &StructuralElements, right: &StructuralElements) -> StructuralChangeSummary {
    let headers = compare_category(&left.headers, &right.headers, |a, b| {
        a.normalized == b.normalized
    }, |a, b| a.level == b.level);
    let lists = compare_category(
        &left.lists,
        &right.lists,
        |a, b| a.text == b.text && a.kind == b.kind,
        |_, _| true,
    );
    let quotes = compare_category(&left.quotes, &right.quotes, |a, b| a.text == b.text, |_, _| {
        true
    });
    let code_fences = compare_category(
        &left.code_fences,
        &right.code_fences,
        |a, b| a.text == b.text,
        |_, _| true,
    );

    let counts = StructuralCounts {
        headers: changed_count(&headers),
        lists: changed_count(&lists),
        quotes: changed_count(&quotes),
        code_fences: changed_count(&code_fences),
    };

    StructuralChangeSummary {
        headers,
        lists,
        quotes,
        code_fences,
        counts,
    }
}

fn changed_count<T>(changes: &[ElementChange<T>]) -> usize {
    changes
        .iter()
        .filter(|change| change.kind() != ElementChangeKind::Unchanged)
        .count()
}

trait Indexed {
    fn element_index(&self) -> usize;
}

impl Indexed for HeaderElement {
    fn element_index(&self) -> usize {
        self.index
    }
}

impl Indexed for ListElement {
    fn element_index(&self) -> usize {
        self.index
    }
}

impl Indexed for QuoteElement {
    fn element_index(&self) -> usize {
        self.index
    }
}

impl Indexed for CodeFenceElement {
    fn element_index(&self) -> usize {
        self.index
    }
}

/// Exact matching with a used-set: left elements claim the first unclaimed
/// right match, leftovers on either side become removals and additions.
fn compare_category<T: Indexed + Clone>(
    left: &[T],
    right: &[T],
    matches: impl Fn(&T, &T) -> bool,
    in_place: impl Fn(&T, &T) -> bool,
) -> Vec<ElementChange<T>> {
    let mut changes = Vec::new();
    let mut used = vec![false; right.len()];

    for element in left {
        let matched = right
            .iter()
            .enumerate()
            .find(|(j, candidate)| !used[*j] && matches(element, candidate));

        match matched {
            Some((j, candidate)) => {
                used[j] = true;
                let relocated = element.element_index() != candidate.element_index()
                    || !in_place(element, candidate);
                if relocated {
                    changes.push(ElementChange::new(
                        ElementChangeKind::Moved,
                        element.clone(),
                        Some(element.element_index()),
                        Some(candidate.element_index()),
                    ));
                } else {
                    changes.push(ElementChange::new(
                        ElementChangeKind::Unchanged,
                        element.clone(),
                        Some(element.element_index()),
                        Some(candidate.element_index()),
                    ));
                }
            }
            None => changes.push(ElementChange::new(
                ElementChangeKind::Removed,
                element.clone(),
                Some(element.element_index()),
                None,
            )),
        }
    }

    for (j, element) in right.iter().enumerate() {
        if !used[j] {
            changes.push(ElementChange::new(
                ElementChangeKind::Added,
                element.clone(),
                None,
                Some(element.element_index()),
            ));
        }
    }

    changes
}
