//! BrainBug Core Library
//!
//! Curates buggy/fixed code pairs into reproducible training splits and
//! scores generated fixes against references.

pub mod config;
pub mod corpus;
pub mod curation;
pub mod digest;
pub mod domain;
pub mod eval;
pub mod inference;
pub mod metrics;
pub mod obs;
pub mod reporting;
pub mod split;
pub mod telemetry;

pub use domain::{
    classify, BrainbugError, Classification, CuratedExample, DetectionExample, FaultCode,
    PipelineVariant, RawBugRecord, RepairExample, Result, REQUIRED_COLUMNS,
};

pub use config::{BrainbugConfig, DirLayout, REPORT_FILE_NAME};
pub use corpus::{read_corpus, read_corpus_csv, read_corpus_json};
pub use curation::{
    build_detection_pair, build_repair, fault_distribution, CurationOutput, CurationSummary,
    DatasetCurator, ExampleBuilder, FaultCount,
};
pub use digest::{examples_digest, sha256_hex};
pub use eval::{
    similarity_ratio, CodeTokenizer, EvaluationHarness, EvaluationReport, PredictionResult,
    SamplePrediction, Tokenizer, WhitespaceTokenizer,
};
pub use inference::{
    generate_predictions, repair_prompt, HttpInferenceBackend, HttpInferenceConfig,
    InferenceBackend,
};
pub use reporting::{
    read_examples, read_predictions, render_report_md, write_evaluation_report,
    write_predictions, write_splits, SplitManifest, SplitManifestEntry, SplitRunInfo,
};
pub use split::{
    shuffled_indices, split, CurationProfile, DatasetSplit, SplitName, SplitRatios, SplitSet,
    DEFAULT_SEED,
};

pub use metrics::METRICS;
pub use obs::{
    emit_curation_finished, emit_evaluation_finished, emit_predictions_generated,
    emit_split_written, StageSpan,
};
pub use telemetry::{init_tracing, log_file_path, LOG_FILE_NAME};

/// BrainBug version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
