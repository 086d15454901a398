//! Curated examples: the unit written to split files and consumed by
//! training and evaluation.

use serde::{Deserialize, Serialize};

/// Maximum number of characters of a diff patch kept on a repair example.
pub const MAX_DIFF_CHARS: usize = 500;

/// Which example shape a curation run produces.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PipelineVariant {
    /// One fix example per record.
    Repair,
    /// Two binary-labeled examples per record (buggy + fixed).
    Detection,
}

impl std::fmt::Display for PipelineVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineVariant::Repair => f.write_str("repair"),
            PipelineVariant::Detection => f.write_str("detection"),
        }
    }
}

/// Faulty code paired with its fix and derived error analysis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RepairExample {
    pub faulty_code: String,
    pub fixed_code: String,
    pub error_type: String,
    pub error_description: String,
    pub fault_acronym: String,
    pub bug_description: String,
    pub fix_suggestion: String,
    /// `Error: {error_type} | Description: {error_description} | Fix: {fix_suggestion}`
    pub target_detailed: String,
    pub project: String,
    /// Truncated to [`MAX_DIFF_CHARS`] characters.
    pub diff_patch: String,
}

/// Detection label: 1 for the buggy snippet, 0 for the fixed one.
pub const LABEL_BUGGY: u8 = 1;
pub const LABEL_FIXED: u8 = 0;

/// A code snippet with a binary has-bug label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct DetectionExample {
    pub code: String,
    pub label: u8,
    pub bug_type: String,
    pub bug_description: String,
    /// Kept on both labels for traceability.
    pub fixed_code: String,
}

impl DetectionExample {
    pub fn is_buggy(&self) -> bool {
        self.label == LABEL_BUGGY
    }
}

/// Either example shape. Serialized untagged so a split file is a plain
/// array of objects in the shape of its variant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum CuratedExample {
    Repair(RepairExample),
    Detection(DetectionExample),
}

impl CuratedExample {
    pub fn variant(&self) -> PipelineVariant {
        match self {
            CuratedExample::Repair(_) => PipelineVariant::Repair,
            CuratedExample::Detection(_) => PipelineVariant::Detection,
        }
    }

    /// The code a model is asked to look at.
    pub fn input_code(&self) -> &str {
        match self {
            CuratedExample::Repair(ex) => &ex.faulty_code,
            CuratedExample::Detection(ex) => &ex.code,
        }
    }

    /// Reference text for evaluation: the fixed code.
    pub fn reference(&self) -> &str {
        match self {
            CuratedExample::Repair(ex) => &ex.fixed_code,
            CuratedExample::Detection(ex) => &ex.fixed_code,
        }
    }

    pub fn as_repair(&self) -> Option<&RepairExample> {
        match self {
            CuratedExample::Repair(ex) => Some(ex),
            CuratedExample::Detection(_) => None,
        }
    }

    pub fn as_detection(&self) -> Option<&DetectionExample> {
        match self {
            CuratedExample::Detection(ex) => Some(ex),
            CuratedExample::Repair(_) => None,
        }
    }
}

impl From<RepairExample> for CuratedExample {
    fn from(ex: RepairExample) -> Self {
        CuratedExample::Repair(ex)
    }
}

impl From<DetectionExample> for CuratedExample {
    fn from(ex: DetectionExample) -> Self {
        CuratedExample::Detection(ex)
    }
}

/// First `max_chars` Unicode scalar values of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
