use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::curation::CurationSummary;
use crate::digest::examples_digest;
use crate::domain::example::{CuratedExample, PipelineVariant};
use crate::eval::harness::EvaluationReport;
use crate::obs::emit_split_written;
use crate::split::{SplitRatios, SplitSet};

pub const MANIFEST_SCHEMA_VERSION: &str = "1.0";
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// One split entry in manifest.json.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SplitManifestEntry {
    pub name: String,
    pub file: String,
    pub count: usize,
    pub sha256: String,
}

/// Record of how a set of split files was produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SplitManifest {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub profile: String,
    pub variant: PipelineVariant,
    pub seed: u64,
    pub ratios: SplitRatios,
    pub summary: CurationSummary,
    pub splits: Vec<SplitManifestEntry>,
}

/// Inputs to [`write_splits`] that are not in the splits themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitRunInfo {
    pub profile: String,
    pub variant: PipelineVariant,
    pub seed: u64,
    pub ratios: SplitRatios,
    pub summary: CurationSummary,
}

fn write_pretty_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value).context("serialize json")?;
    std::fs::write(path, content).with_context(|| format!("write {:?}", path))?;
    Ok(())
}

/// Write train.json, val.json, test.json and manifest.json into `dir`,
/// creating it if needed.
pub fn write_splits(dir: &Path, splits: &SplitSet, info: &SplitRunInfo) -> Result<SplitManifest> {
    std::fs::create_dir_all(dir).with_context(|| format!("create {:?}", dir))?;

    let mut entries = Vec::with_capacity(3);
    for split in splits.iter() {
        let file = split.name().file_name();
        write_pretty_json(&dir.join(&file), split.examples())?;

        let sha256 = examples_digest(split.examples())
            .with_context(|| format!("digest {} split", split.name()))?;
        emit_split_written(split.name().as_str(), split.len(), &sha256);
        entries.push(SplitManifestEntry {
            name: split.name().to_string(),
            file,
            count: split.len(),
            sha256,
        });
    }

    let manifest = SplitManifest {
        schema_version: MANIFEST_SCHEMA_VERSION.to_string(),
        generated_at: Utc::now(),
        profile: info.profile.clone(),
        variant: info.variant,
        seed: info.seed,
        ratios: info.ratios,
        summary: info.summary,
        splits: entries,
    };
    write_pretty_json(&dir.join(MANIFEST_FILE_NAME), &manifest)?;
    Ok(manifest)
}

/// Read a split file (JSON array of curated examples).
pub fn read_examples(path: &Path) -> Result<Vec<CuratedExample>> {
    let content = std::fs::read_to_string(path).with_context(|| format!("read {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("parse examples in {:?}", path))
}

/// Read predictions (JSON array of strings).
pub fn read_predictions(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path).with_context(|| format!("read {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("parse predictions in {:?}", path))
}

pub fn write_predictions(path: &Path, predictions: &[String]) -> Result<()> {
    write_pretty_json(path, predictions)
}

/// Write the evaluation report in pretty JSON format.
pub fn write_evaluation_report(path: &Path, report: &EvaluationReport) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("create {:?}", parent))?;
    }
    write_pretty_json(path, report)
}

/// Render a markdown summary of an evaluation report.
pub fn render_report_md(report: &EvaluationReport) -> String {
    let mut out = String::new();
    out.push_str("# Evaluation Results\n\n");
    out.push_str(&format!(
        "- test examples: {}\n- exact match accuracy: {:.2}%\n- token-level accuracy: {:.2}%\n- average similarity: {:.2}%\n",
        report.test_examples,
        report.exact_match_accuracy * 100.0,
        report.token_level_accuracy * 100.0,
        report.average_similarity * 100.0,
    ));

    if !report.sample_predictions.is_empty() {
        out.push_str("\n## Sample Predictions\n");
        for (i, sample) in report.sample_predictions.iter().enumerate() {
            out.push_str(&format!(
                "\n### Example {}\n\nsimilarity: {:.2}%\n\n```\n{}\n```\n\nexpected:\n\n```\n{}\n```\n",
                i + 1,
                sample.similarity * 100.0,
                sample.prediction,
                sample.expected,
            ));
        }
    }
    out
}
