//! Raw bug records as they appear in the source corpus.

use serde::{Deserialize, Serialize};

pub const COL_FAULTY_CODE: &str = "Faulty Code";
pub const COL_FIXED_CODE: &str = "Fault Free Code";
pub const COL_FAULT_ACRONYM: &str = "Fault_Acronym";
pub const COL_IMPLEMENTATION_DESCRIPTION: &str = "Implementation-Level Description";
pub const COL_BUG_DESCRIPTION: &str = "Bug_Description";
pub const COL_PROJECT: &str = "Project";
pub const COL_DIFF_PATCH: &str = "Diff_patch";
pub const COL_BUG_TYPE: &str = "Bug_Type";

/// Columns that must exist in the corpus header. Individual cells may
/// still be empty.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    COL_FAULTY_CODE,
    COL_FIXED_CODE,
    COL_FAULT_ACRONYM,
    COL_IMPLEMENTATION_DESCRIPTION,
    COL_BUG_DESCRIPTION,
    COL_PROJECT,
    COL_DIFF_PATCH,
];

/// One row of the source corpus. Every cell is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawBugRecord {
    #[serde(rename = "Faulty Code", default)]
    pub faulty_code: Option<String>,

    #[serde(rename = "Fault Free Code", default)]
    pub fixed_code: Option<String>,

    #[serde(rename = "Fault_Acronym", default)]
    pub fault_acronym: Option<String>,

    #[serde(rename = "Implementation-Level Description", default)]
    pub implementation_description: Option<String>,

    #[serde(rename = "Bug_Description", default)]
    pub bug_description: Option<String>,

    #[serde(rename = "Project", default)]
    pub project: Option<String>,

    #[serde(rename = "Diff_patch", default)]
    pub diff_patch: Option<String>,

    #[serde(rename = "Bug_Type", default)]
    pub bug_type: Option<String>,
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.trim().is_empty())
}

impl RawBugRecord {
    /// Create a record with just the two code fields set.
    pub fn new(faulty_code: impl Into<String>, fixed_code: impl Into<String>) -> Self {
        Self {
            faulty_code: Some(faulty_code.into()),
            fixed_code: Some(fixed_code.into()),
            ..Self::default()
        }
    }

    pub fn with_fault_acronym(mut self, acronym: impl Into<String>) -> Self {
        self.fault_acronym = Some(acronym.into());
        self
    }

    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// A record is usable iff both faulty and fixed code are present and
    /// not blank.
    pub fn is_usable(&self) -> bool {
        present(&self.faulty_code).is_some() && present(&self.fixed_code).is_some()
    }

    pub fn faulty_code_text(&self) -> &str {
        self.faulty_code.as_deref().unwrap_or_default()
    }

    pub fn fixed_code_text(&self) -> &str {
        self.fixed_code.as_deref().unwrap_or_default()
    }

    pub fn fault_acronym_text(&self) -> &str {
        self.fault_acronym.as_deref().unwrap_or_default()
    }

    pub fn implementation_description_text(&self) -> &str {
        self.implementation_description.as_deref().unwrap_or_default()
    }

    pub fn bug_description_text(&self) -> &str {
        self.bug_description.as_deref().unwrap_or_default()
    }

    pub fn project_text(&self) -> &str {
        self.project.as_deref().unwrap_or_default()
    }

    pub fn diff_patch_text(&self) -> &str {
        self.diff_patch.as_deref().unwrap_or_default()
    }

    /// Bug type for detection examples: the `Bug_Type` cell, else the fault
    /// acronym, else `"unknown"`.
    pub fn bug_type_text(&self) -> &str {
        present(&self.bug_type)
            .or_else(|| present(&self.fault_acronym))
            .map(str::trim)
            .unwrap_or("unknown")
    }
}
