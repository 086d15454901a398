//! Domain models for BrainBug.
//!
//! Canonical definitions for the core entities:
//! - `RawBugRecord`: One row of the source bug corpus
//! - `CuratedExample`: Repair or detection example derived from a record
//! - `FaultCode`: Static fault taxonomy

pub mod error;
pub mod example;
pub mod record;
pub mod taxonomy;

// Re-export main types and errors
pub use error::{BrainbugError, Result};
pub use example::{
    truncate_chars, CuratedExample, DetectionExample, PipelineVariant, RepairExample,
    LABEL_BUGGY, LABEL_FIXED, MAX_DIFF_CHARS,
};
pub use record::{RawBugRecord, REQUIRED_COLUMNS};
pub use taxonomy::{classify, Classification, FaultCode, GENERIC_FIX_SUGGESTION};
