//! Fix evaluation: metrics and the harness that aggregates them.

pub mod harness;
pub mod similarity;
pub mod tokenize;

pub use harness::{
    EvaluationHarness, EvaluationReport, PredictionResult, SamplePrediction, ScoreTotals,
    DEFAULT_MAX_EVAL_PAIRS, MAX_SAMPLE_SIZE, SAMPLE_TEXT_CHARS,
};
pub use similarity::{similarity_ratio, MatchBlock, SequenceMatcher};
pub use tokenize::{CodeTokenizer, Tokenizer, WhitespaceTokenizer};
