//! Dataset curation: raw bug records -> curated examples.
//!
//! [`ExampleBuilder`] turns one record into examples for a
//! [`PipelineVariant`]; [`DatasetCurator`] drops unusable records, keeps the
//! original order, and reports before/after counts.

use serde::{Deserialize, Serialize};

use crate::domain::example::{
    truncate_chars, CuratedExample, DetectionExample, PipelineVariant, RepairExample,
    LABEL_BUGGY, LABEL_FIXED, MAX_DIFF_CHARS,
};
use crate::domain::record::RawBugRecord;
use crate::domain::taxonomy::classify;
use crate::metrics::METRICS;
use crate::obs::emit_curation_finished;

// ---------------------------------------------------------------------------
// Example builder
// ---------------------------------------------------------------------------

/// Builds curated examples from a single record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExampleBuilder {
    variant: PipelineVariant,
}

impl ExampleBuilder {
    pub fn new(variant: PipelineVariant) -> Self {
        Self { variant }
    }

    pub fn variant(&self) -> PipelineVariant {
        self.variant
    }

    /// Build the examples for one record: one repair example, or a
    /// buggy/fixed detection pair.
    pub fn build(&self, record: &RawBugRecord) -> Vec<CuratedExample> {
        match self.variant {
            PipelineVariant::Repair => vec![build_repair(record).into()],
            PipelineVariant::Detection => {
                let [buggy, fixed] = build_detection_pair(record);
                vec![buggy.into(), fixed.into()]
            }
        }
    }
}

/// Repair example with taxonomy-derived error analysis.
pub fn build_repair(record: &RawBugRecord) -> RepairExample {
    let acronym = record.fault_acronym_text();
    let classification = classify(acronym);
    let error_description = record.implementation_description_text().to_string();
    let target_detailed = format!(
        "Error: {} | Description: {} | Fix: {}",
        classification.category, error_description, classification.fix_suggestion
    );

    RepairExample {
        faulty_code: record.faulty_code_text().to_string(),
        fixed_code: record.fixed_code_text().to_string(),
        error_type: classification.category,
        error_description,
        fault_acronym: acronym.to_string(),
        bug_description: record.bug_description_text().to_string(),
        fix_suggestion: classification.fix_suggestion,
        target_detailed,
        project: record.project_text().to_string(),
        diff_patch: truncate_chars(record.diff_patch_text(), MAX_DIFF_CHARS).to_string(),
    }
}

/// Balanced detection pair: `[buggy (label 1), fixed (label 0)]`.
pub fn build_detection_pair(record: &RawBugRecord) -> [DetectionExample; 2] {
    let fixed_code = record.fixed_code_text().to_string();
    [
        DetectionExample {
            code: record.faulty_code_text().to_string(),
            label: LABEL_BUGGY,
            bug_type: record.bug_type_text().to_string(),
            bug_description: record.bug_description_text().to_string(),
            fixed_code: fixed_code.clone(),
        },
        DetectionExample {
            code: fixed_code.clone(),
            label: LABEL_FIXED,
            bug_type: "none".to_string(),
            bug_description: String::new(),
            fixed_code,
        },
    ]
}

// ---------------------------------------------------------------------------
// Curator
// ---------------------------------------------------------------------------

/// Before/after counts for a curation run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CurationSummary {
    pub raw_records: usize,
    pub usable_records: usize,
    pub dropped_records: usize,
    pub examples: usize,
}

/// Result of [`DatasetCurator::curate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurationOutput {
    pub examples: Vec<CuratedExample>,
    pub summary: CurationSummary,
}

/// Filters raw records and accumulates curated examples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetCurator {
    builder: ExampleBuilder,
}

impl DatasetCurator {
    pub fn new(variant: PipelineVariant) -> Self {
        Self {
            builder: ExampleBuilder::new(variant),
        }
    }

    pub fn variant(&self) -> PipelineVariant {
        self.builder.variant()
    }

    /// Curate records in order. Records missing faulty or fixed code are
    /// dropped and counted.
    pub fn curate(&self, records: &[RawBugRecord]) -> CurationOutput {
        let mut examples = Vec::with_capacity(records.len() * 2);
        let mut usable = 0usize;

        for record in records.iter().filter(|r| r.is_usable()) {
            usable += 1;
            examples.extend(self.builder.build(record));
        }

        let summary = CurationSummary {
            raw_records: records.len(),
            usable_records: usable,
            dropped_records: records.len() - usable,
            examples: examples.len(),
        };

        METRICS.add_records_dropped(summary.dropped_records as u64);
        METRICS.add_examples_built(summary.examples as u64);
        emit_curation_finished(&self.variant().to_string(), &summary);

        CurationOutput { examples, summary }
    }
}

// ---------------------------------------------------------------------------
// Fault distribution
// ---------------------------------------------------------------------------

/// Count of usable records for one fault acronym.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FaultCount {
    pub fault_acronym: String,
    pub category: String,
    pub count: usize,
}

/// Per-acronym counts over usable records, most common first. Ties keep
/// first-seen order.
pub fn fault_distribution(records: &[RawBugRecord]) -> Vec<FaultCount> {
    let mut counts: Vec<FaultCount> = Vec::new();

    for record in records.iter().filter(|r| r.is_usable()) {
        let acronym = record.fault_acronym_text();
        match counts.iter_mut().find(|c| c.fault_acronym == acronym) {
            Some(entry) => entry.count += 1,
            None => counts.push(FaultCount {
                fault_acronym: acronym.to_string(),
                category: classify(acronym).category,
                count: 1,
            }),
        }
    }

    // sort_by is stable
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}
