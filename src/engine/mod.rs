//! Markdown diff engine
//!
//! This module contains the diff core and its stages:
//!
//! - `patterns`: compiled markdown pattern set and keyword tables
//! - `segment`: line segmentation and structural analysis
//! - `similarity`: line similarity scoring and engine thresholds
//! - `moves`: fingerprint-based move detection
//! - `reconcile`: the line alignment core
//! - `intraline`: word/character highlight spans for modified lines
//! - `structural`: per-category structural change summary
//! - `operation`: the operation data model consumed by renderers
//!
//! The engine is a pure function of its two inputs: same texts in, same
//! report out, no I/O and no shared mutable state across invocations.

pub mod intraline;
pub mod moves;
pub mod operation;
pub mod patterns;
pub mod reconcile;
pub mod segment;
pub mod similarity;
pub mod structural;

use crate::engine::operation::DiffOperation;
use crate::engine::reconcile::Reconciler;
use crate::engine::segment::segment;
use crate::engine::similarity::{SimilarityMetric, SimilarityScorer, Thresholds};
use crate::engine::structural::{StructuralChangeSummary, StructuralElements};

/// Everything a renderer needs: the ordered operation sequence plus the
/// independent structural summary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiffReport {
    operations: Vec<DiffOperation>,
    structural: StructuralChangeSummary,
}

impl DiffReport {
    pub fn operations(&self) -> &[DiffOperation] {
        &self.operations
    }

    pub fn structural(&self) -> &StructuralChangeSummary {
        &self.structural
    }

    /// True when no operation changes anything.
    pub fn is_unchanged(&self) -> bool {
        self.operations.iter().all(DiffOperation::is_unchanged)
    }
}

/// The diff engine: thresholds plus the similarity metric choice.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    scorer: SimilarityScorer,
    thresholds: Thresholds,
}

impl Engine {
    pub fn new() -> Self {
        Engine::default()
    }

    pub fn with_metric(metric: SimilarityMetric) -> Self {
        Engine {
            scorer: SimilarityScorer::new(metric),
            thresholds: Thresholds::default(),
        }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Diff two texts into an operation sequence and structural summary.
    pub fn diff(&self, text1: &str, text2: &str) -> DiffReport {
        let left = segment(text1);
        let right = segment(text2);

        let operations =
            Reconciler::new(&left, &right, &self.scorer, &self.thresholds).reconcile();

        let structural = structural::compare(
            &StructuralElements::collect(&left),
            &StructuralElements::collect(&right),
        );

        DiffReport {
            operations,
            structural,
        }
    }
}

/// Diff two texts with the default engine configuration.
pub fn diff(text1: &str, text2: &str) -> DiffReport {
    Engine::new().diff(text1, text2)
}
