//! Structured observability hooks for BrainBug pipeline stages.
//!
//! This module provides:
//! - Stage-scoped tracing spans via the `StageSpan` RAII guard
//! - Emission functions for key lifecycle events: curation, split write,
//!   prediction, evaluation
//!
//! Events are emitted at `info!` level (filter with `RUST_LOG`).

use tracing::info;

use crate::curation::CurationSummary;
use crate::eval::harness::EvaluationReport;

/// RAII guard that enters a stage-scoped span for the duration of a command.
///
/// # Example
///
/// ```ignore
/// let _span = StageSpan::enter("evaluate", "3f2c...");
/// // tracing calls below carry stage = "evaluate" and the run_id
/// ```
pub struct StageSpan {
    _span: tracing::span::EnteredSpan,
}

impl StageSpan {
    pub fn enter(stage: &str, run_id: &str) -> Self {
        let span = tracing::info_span!("brainbug.stage", stage = %stage, run_id = %run_id);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: curation finished with before/after counts.
pub fn emit_curation_finished(variant: &str, summary: &CurationSummary) {
    info!(
        event = "curation.finished",
        variant = %variant,
        raw_records = summary.raw_records,
        usable_records = summary.usable_records,
        dropped_records = summary.dropped_records,
        examples = summary.examples,
    );
}

/// Emit event: one split file written.
pub fn emit_split_written(split: &str, count: usize, sha256: &str) {
    info!(event = "split.written", split = %split, count = count, sha256 = %sha256);
}

/// Emit event: predictions generated by an inference backend.
pub fn emit_predictions_generated(requested: usize, generated: usize) {
    info!(
        event = "prediction.generated",
        requested = requested,
        generated = generated,
    );
}

/// Emit event: evaluation finished with its aggregate metrics.
pub fn emit_evaluation_finished(report: &EvaluationReport) {
    info!(
        event = "evaluation.finished",
        test_examples = report.test_examples,
        exact_match_accuracy = report.exact_match_accuracy,
        token_level_accuracy = report.token_level_accuracy,
        average_similarity = report.average_similarity,
    );
}
