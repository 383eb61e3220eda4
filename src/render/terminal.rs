//! Colorized unified diff output
//!
//! One row per operation (two for modifications, old side then new side),
//! with left/right line numbers in the gutter and intra-line highlight runs
//! inside modified rows. Operation classes can be filtered with a
//! single-letter spec, `git diff --diff-filter` style.

use crate::engine::DiffReport;
use crate::engine::intraline::{Span, SpanKind};
use crate::engine::operation::{ChangeKind, DiffLine, DiffOperation};
use crate::engine::structural::{ElementChange, ElementChangeKind, StructuralChangeSummary};
use bitflags::bitflags;
use colored::{ColoredString, Colorize};
use std::cell::{RefCell, RefMut};
use std::io::Write;
use std::path::Path;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct OpFilter: u32 {
        const ADDED = 0b00001;
        const REMOVED = 0b00010;
        const MODIFIED = 0b00100;
        const MOVED = 0b01000;
        const UNCHANGED = 0b10000;
    }
}

impl OpFilter {
    pub fn try_parse(s: &str) -> Option<Self> {
        let mut filter = Self::empty();

        for c in s.chars() {
            match c {
                'A' => filter |= Self::ADDED,
                'D' => filter |= Self::REMOVED,
                'M' => filter |= Self::MODIFIED,
                'V' => filter |= Self::MOVED,
                'U' => filter |= Self::UNCHANGED,
                _ => return None,
            }
        }

        Some(filter)
    }

    fn admits(&self, operation: &DiffOperation) -> bool {
        match operation {
            DiffOperation::Added { .. } => self.contains(Self::ADDED),
            DiffOperation::Removed { .. } => self.contains(Self::REMOVED),
            DiffOperation::Modified { .. } => self.contains(Self::MODIFIED),
            DiffOperation::Moved { .. } => self.contains(Self::MOVED),
            DiffOperation::Unchanged { .. } => self.contains(Self::UNCHANGED),
        }
    }
}

pub struct DiffPrinter {
    writer: RefCell<Box<dyn Write>>,
    filter: OpFilter,
}

impl DiffPrinter {
    pub fn new(writer: Box<dyn Write>, filter: OpFilter) -> Self {
        DiffPrinter {
            writer: RefCell::new(writer),
            filter,
        }
    }

    fn writer(&'_ self) -> RefMut<'_, Box<dyn Write>> {
        self.writer.borrow_mut()
    }

    pub fn print_report(
        &self,
        report: &DiffReport,
        old_label: &Path,
        new_label: &Path,
        with_summary: bool,
    ) -> anyhow::Result<()> {
        writeln!(
            self.writer(),
            "{}",
            format!("--- {}", old_label.display()).bold()
        )?;
        writeln!(
            self.writer(),
            "{}",
            format!("+++ {}", new_label.display()).bold()
        )?;

        for operation in report.operations() {
            if self.filter.admits(operation) {
                self.print_operation(operation)?;
            }
        }

        if with_summary {
            writeln!(self.writer())?;
            self.print_summary(report.structural())?;
        }

        Ok(())
    }

    fn print_operation(&self, operation: &DiffOperation) -> anyhow::Result<()> {
        match operation {
            DiffOperation::Unchanged { line1, line2 } => {
                self.print_row(Some(line1), Some(line2), ' ', line1.text().normal())?;
            }
            DiffOperation::Added { line2 } => {
                self.print_row(None, Some(line2), '+', line2.text().green())?;
            }
            DiffOperation::Removed { line1 } => {
                self.print_row(Some(line1), None, '-', line1.text().red())?;
            }
            DiffOperation::Modified {
                line1,
                line2,
                left_spans,
                right_spans,
                change_kind,
            } => {
                let marker = match change_kind {
                    ChangeKind::Content => '~',
                    ChangeKind::Formatting => '=',
                };
                self.print_span_row(Some(line1), None, marker, left_spans)?;
                self.print_span_row(None, Some(line2), marker, right_spans)?;
            }
            DiffOperation::Moved { line1, line2 } => {
                let annotated = format!(
                    "{} (line {} -> {})",
                    line1.text(),
                    line1.index() + 1,
                    line2.index() + 1
                );
                self.print_row(Some(line1), Some(line2), '>', annotated.cyan())?;
            }
        }

        Ok(())
    }

    fn print_row(
        &self,
        line1: Option<&DiffLine>,
        line2: Option<&DiffLine>,
        marker: char,
        text: ColoredString,
    ) -> anyhow::Result<()> {
        writeln!(
            self.writer(),
            "{} {} {}{}",
            gutter(line1),
            gutter(line2),
            marker,
            text
        )?;

        Ok(())
    }

    fn print_span_row(
        &self,
        line1: Option<&DiffLine>,
        line2: Option<&DiffLine>,
        marker: char,
        spans: &[Span],
    ) -> anyhow::Result<()> {
        let mut rendered = String::new();
        for span in spans {
            let fragment = match span.kind() {
                SpanKind::Unchanged => span.text().normal(),
                SpanKind::Added => span.text().green().bold(),
                SpanKind::Removed => span.text().red().bold(),
            };
            rendered.push_str(&fragment.to_string());
        }

        writeln!(
            self.writer(),
            "{} {} {}{}",
            gutter(line1),
            gutter(line2),
            marker,
            rendered
        )?;

        Ok(())
    }

    fn print_summary(&self, summary: &StructuralChangeSummary) -> anyhow::Result<()> {
        writeln!(
            self.writer(),
            "{}",
            format!(
                "structural changes: {} total",
                summary.counts().total()
            )
            .bold()
        )?;

        self.print_category("headers", summary.counts().headers, summary.headers(), |h| {
            format!("{} {}", "#".repeat(h.level()), h.text())
        })?;
        self.print_category("lists", summary.counts().lists, summary.lists(), |l| {
            l.text().to_string()
        })?;
        self.print_category("quotes", summary.counts().quotes, summary.quotes(), |q| {
            q.text().to_string()
        })?;
        self.print_category(
            "code blocks",
            summary.counts().code_fences,
            summary.code_fences(),
            |c| c.text().to_string(),
        )?;

        Ok(())
    }

    fn print_category<T>(
        &self,
        label: &str,
        changed: usize,
        changes: &[ElementChange<T>],
        describe: impl Fn(&T) -> String,
    ) -> anyhow::Result<()> {
        if changes.is_empty() {
            return Ok(());
        }

        writeln!(self.writer(), "  {label}: {changed} changed")?;

        for change in changes {
            let line = match change.kind() {
                ElementChangeKind::Unchanged => continue,
                ElementChangeKind::Added => {
                    format!("    + {}", describe(change.element())).green()
                }
                ElementChangeKind::Removed => {
                    format!("    - {}", describe(change.element())).red()
                }
                ElementChangeKind::Moved => format!(
                    "    > {} (line {} -> {})",
                    describe(change.element()),
                    change.from_index().map(|i| i + 1).unwrap_or_default(),
                    change.to_index().map(|i| i + 1).unwrap_or_default()
                )
                .cyan(),
            };
            writeln!(self.writer(), "{line}")?;
        }

        Ok(())
    }
}

const GUTTER_WIDTH: usize = 4;

fn gutter(line: Option<&DiffLine>) -> String {
    match line {
        Some(line) => format!("{:>width$}", line.index() + 1, width = GUTTER_WIDTH),
        None => " ".repeat(GUTTER_WIDTH),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::diff;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn render(text1: &str, text2: &str, filter: OpFilter, summary: bool) -> String {
        colored::control::set_override(false);

        let report = diff(text1, text2);
        let buffer: std::rc::Rc<RefCell<Vec<u8>>> = Default::default();

        struct SharedBuffer(std::rc::Rc<RefCell<Vec<u8>>>);
        impl Write for SharedBuffer {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.borrow_mut().extend_from_slice(buf);
                Ok(buf.len())
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let printer = DiffPrinter::new(Box::new(SharedBuffer(buffer.clone())), filter);
        printer
            .print_report(&report, Path::new("old.md"), Path::new("new.md"), summary)
            .expect("rendering into a buffer cannot fail");

        let bytes = buffer.borrow().clone();
        String::from_utf8(bytes).expect("rendered output is utf-8")
    }

    #[rstest]
    #[case("UA", Some(OpFilter::UNCHANGED | OpFilter::ADDED))]
    #[case("ADMVU", Some(OpFilter::all()))]
    #[case("", Some(OpFilter::empty()))]
    #[case("X", None)]
    fn filter_parsing_accepts_status_letters(
        #[case] spec: &str,
        #[case] expected: Option<OpFilter>,
    ) {
        assert_eq!(OpFilter::try_parse(spec), expected);
    }

    #[rstest]
    fn renders_markers_and_line_numbers() {
        let output = render("# T\nkept line\ngone line", "# T\nkept line", OpFilter::all(), false);

        assert!(output.contains("--- old.md"));
        assert!(output.contains("+++ new.md"));
        assert!(output.contains("   1    1  # T"));
        assert!(output.contains("   3      -gone line"));
    }

    #[rstest]
    fn filter_hides_unchanged_rows() {
        let output = render(
            "# T\nkept line\ngone line",
            "# T\nkept line",
            OpFilter::REMOVED,
            false,
        );

        assert!(!output.contains("kept line"));
        assert!(output.contains("gone line"));
    }

    #[rstest]
    fn modified_lines_render_both_sides() {
        let output = render("Hello world", "Hello there", OpFilter::all(), false);

        assert!(output.contains("   1      ~Hello world"));
        assert!(output.contains("        1 ~Hello there"));
    }

    #[rstest]
    fn summary_lists_structural_changes() {
        let output = render("# Gone", "# Fresh", OpFilter::all(), true);

        assert!(output.contains("structural changes: 2 total"));
        assert!(output.contains("headers: 2 changed"));
        assert!(output.contains("    - # Gone"));
        assert!(output.contains("    + # Fresh"));
    }
}
