//! Evaluation harness: score predictions against references.
//!
//! Each pair gets three independent scores:
//! - exact match of the trimmed texts
//! - positional token matches (reference token `i` vs prediction token `i`,
//!   no alignment, so one inserted token shifts every later position)
//! - Ratcliff/Obershelp similarity of the trimmed texts
//!
//! Aggregates are built from order-independent sums, so pairs can be
//! scored in any order.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::error::{BrainbugError, Result};
use crate::domain::example::truncate_chars;
use crate::eval::similarity::SequenceMatcher;
use crate::eval::tokenize::{CodeTokenizer, Tokenizer};
use crate::metrics::METRICS;
use crate::obs::emit_evaluation_finished;

/// Pair cap used when none is configured.
pub const DEFAULT_MAX_EVAL_PAIRS: usize = 500;
/// Upper bound on the number of sample predictions kept in a report.
pub const MAX_SAMPLE_SIZE: usize = 5;
/// Characters of each text kept in a sample entry.
pub const SAMPLE_TEXT_CHARS: usize = 100;
/// Sample entries echoed to the log.
const LOGGED_SAMPLES: usize = 3;

// ---------------------------------------------------------------------------
// Per-pair and aggregate results
// ---------------------------------------------------------------------------

/// Scores for one (prediction, reference) pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionResult {
    pub prediction: String,
    pub reference: String,
    pub exact_match: bool,
    /// Reference positions whose token equals the prediction token at the
    /// same position.
    pub matched_tokens: usize,
    pub reference_tokens: usize,
    pub similarity: f64,
}

/// Running sums over scored pairs.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreTotals {
    pub pairs: usize,
    pub exact_matches: usize,
    pub matched_tokens: usize,
    pub reference_tokens: usize,
    pub similarity_sum: f64,
}

impl ScoreTotals {
    pub fn add(&mut self, result: &PredictionResult) {
        self.pairs += 1;
        self.exact_matches += usize::from(result.exact_match);
        self.matched_tokens += result.matched_tokens;
        self.reference_tokens += result.reference_tokens;
        self.similarity_sum += result.similarity;
    }

    /// Combine two partial totals.
    pub fn merge(self, other: ScoreTotals) -> ScoreTotals {
        ScoreTotals {
            pairs: self.pairs + other.pairs,
            exact_matches: self.exact_matches + other.exact_matches,
            matched_tokens: self.matched_tokens + other.matched_tokens,
            reference_tokens: self.reference_tokens + other.reference_tokens,
            similarity_sum: self.similarity_sum + other.similarity_sum,
        }
    }

    pub fn exact_match_accuracy(&self) -> f64 {
        ratio_or_zero(self.exact_matches as f64, self.pairs)
    }

    /// 0 when no reference tokens were seen.
    pub fn token_level_accuracy(&self) -> f64 {
        ratio_or_zero(self.matched_tokens as f64, self.reference_tokens)
    }

    pub fn average_similarity(&self) -> f64 {
        ratio_or_zero(self.similarity_sum, self.pairs)
    }
}

fn ratio_or_zero(numerator: f64, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator / denominator as f64
    }
}

/// One worked example kept for human inspection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SamplePrediction {
    pub input: String,
    pub prediction: String,
    pub expected: String,
    pub similarity: f64,
}

/// Terminal artifact of an evaluation run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvaluationReport {
    /// Number of pairs actually scored (after the cap).
    pub test_examples: usize,
    pub exact_match_accuracy: f64,
    pub token_level_accuracy: f64,
    pub average_similarity: f64,
    pub exact_matches: usize,
    pub matched_tokens: usize,
    pub reference_tokens: usize,
    pub sample_predictions: Vec<SamplePrediction>,
}

impl EvaluationReport {
    fn from_totals(totals: &ScoreTotals, sample_predictions: Vec<SamplePrediction>) -> Self {
        Self {
            test_examples: totals.pairs,
            exact_match_accuracy: totals.exact_match_accuracy(),
            token_level_accuracy: totals.token_level_accuracy(),
            average_similarity: totals.average_similarity(),
            exact_matches: totals.exact_matches,
            matched_tokens: totals.matched_tokens,
            reference_tokens: totals.reference_tokens,
            sample_predictions,
        }
    }
}

fn sample_text(text: &str) -> String {
    format!("{}...", truncate_chars(text, SAMPLE_TEXT_CHARS))
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

/// Scores pre-computed predictions. The harness never runs inference
/// itself; see [`crate::inference`] for producing predictions.
#[derive(Debug, Clone)]
pub struct EvaluationHarness<T = CodeTokenizer> {
    tokenizer: T,
    max_pairs: usize,
    sample_size: usize,
    autojunk: bool,
}

impl Default for EvaluationHarness<CodeTokenizer> {
    fn default() -> Self {
        Self::new()
    }
}

impl EvaluationHarness<CodeTokenizer> {
    pub fn new() -> Self {
        Self {
            tokenizer: CodeTokenizer,
            max_pairs: DEFAULT_MAX_EVAL_PAIRS,
            sample_size: MAX_SAMPLE_SIZE,
            autojunk: true,
        }
    }
}

impl<T: Tokenizer> EvaluationHarness<T> {
    /// Swap the tokenizer used for token-level accuracy.
    pub fn with_tokenizer<U: Tokenizer>(self, tokenizer: U) -> EvaluationHarness<U> {
        EvaluationHarness {
            tokenizer,
            max_pairs: self.max_pairs,
            sample_size: self.sample_size,
            autojunk: self.autojunk,
        }
    }

    /// Cap on the number of pairs scored.
    pub fn with_max_pairs(mut self, max_pairs: usize) -> Self {
        self.max_pairs = max_pairs;
        self
    }

    /// Number of sample predictions kept (clamped to [`MAX_SAMPLE_SIZE`]).
    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size.min(MAX_SAMPLE_SIZE);
        self
    }

    /// Toggle the popular-element heuristic in the similarity ratio.
    pub fn with_autojunk(mut self, autojunk: bool) -> Self {
        self.autojunk = autojunk;
        self
    }

    pub fn max_pairs(&self) -> usize {
        self.max_pairs
    }

    /// Score a single pair.
    pub fn score_pair(&self, prediction: &str, reference: &str) -> PredictionResult {
        let pred_trimmed = prediction.trim();
        let ref_trimmed = reference.trim();

        let pred_tokens = self.tokenizer.tokenize(prediction);
        let ref_tokens = self.tokenizer.tokenize(reference);
        let matched_tokens = ref_tokens
            .iter()
            .enumerate()
            .filter(|(i, tok)| pred_tokens.get(*i) == Some(*tok))
            .count();

        PredictionResult {
            prediction: prediction.to_string(),
            reference: reference.to_string(),
            exact_match: pred_trimmed == ref_trimmed,
            matched_tokens,
            reference_tokens: ref_tokens.len(),
            similarity: SequenceMatcher::new(pred_trimmed, ref_trimmed, self.autojunk).ratio(),
        }
    }

    /// Score `predictions[i]` against `references[i]`.
    ///
    /// Fails with [`BrainbugError::LengthMismatch`] when the sequences differ
    /// in length and [`BrainbugError::EmptyEvaluation`] when both are empty.
    pub fn evaluate<P, R>(&self, predictions: &[P], references: &[R]) -> Result<EvaluationReport>
    where
        P: AsRef<str>,
        R: AsRef<str>,
    {
        self.run::<&str, P, R>(None, predictions, references)
    }

    /// Like [`evaluate`](Self::evaluate), with the model inputs recorded in
    /// the report sample. `inputs` must be as long as `predictions`.
    pub fn evaluate_with_inputs<I, P, R>(
        &self,
        inputs: &[I],
        predictions: &[P],
        references: &[R],
    ) -> Result<EvaluationReport>
    where
        I: AsRef<str>,
        P: AsRef<str>,
        R: AsRef<str>,
    {
        self.run(Some(inputs), predictions, references)
    }

    fn run<I, P, R>(
        &self,
        inputs: Option<&[I]>,
        predictions: &[P],
        references: &[R],
    ) -> Result<EvaluationReport>
    where
        I: AsRef<str>,
        P: AsRef<str>,
        R: AsRef<str>,
    {
        if predictions.len() != references.len() {
            return Err(BrainbugError::LengthMismatch {
                predictions: predictions.len(),
                references: references.len(),
            });
        }
        if let Some(inputs) = inputs {
            if inputs.len() != predictions.len() {
                return Err(BrainbugError::MalformedInput(format!(
                    "{} inputs for {} predictions",
                    inputs.len(),
                    predictions.len()
                )));
            }
        }
        if predictions.is_empty() {
            return Err(BrainbugError::EmptyEvaluation);
        }

        let limit = predictions.len().min(self.max_pairs);
        if limit < predictions.len() {
            info!(
                candidates = predictions.len(),
                evaluated = limit,
                "capping evaluation set"
            );
        }

        let mut totals = ScoreTotals::default();
        let mut samples = Vec::with_capacity(self.sample_size.min(limit));

        for idx in 0..limit {
            let result = self.score_pair(predictions[idx].as_ref(), references[idx].as_ref());
            totals.add(&result);

            if samples.len() < self.sample_size {
                let input = inputs.map(|xs| xs[idx].as_ref()).unwrap_or_default();
                samples.push(SamplePrediction {
                    input: sample_text(input),
                    prediction: sample_text(&result.prediction),
                    expected: sample_text(&result.reference),
                    similarity: result.similarity,
                });
            }
        }

        METRICS.add_pairs_scored(totals.pairs as u64);
        let report = EvaluationReport::from_totals(&totals, samples);

        for (n, sample) in report.sample_predictions.iter().take(LOGGED_SAMPLES).enumerate() {
            info!(
                example = n + 1,
                similarity = sample.similarity,
                prediction = %sample.prediction,
                expected = %sample.expected,
                "sample prediction"
            );
        }
        emit_evaluation_finished(&report);

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::tokenize::WhitespaceTokenizer;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_score_pair_positional_tokens() {
        let h = EvaluationHarness::new();
        let r = h.score_pair("a x c", "a b c");
        assert_eq!(r.matched_tokens, 2);
        assert_eq!(r.reference_tokens, 3);
        assert!(!r.exact_match);
    }

    #[test]
    fn test_score_pair_insertion_cascades() {
        let h = EvaluationHarness::new();
        let r = h.score_pair("z a b c", "a b c");
        assert_eq!(r.matched_tokens, 0);
    }

    #[test]
    fn test_score_pair_exact_match_trims() {
        let h = EvaluationHarness::new();
        let r = h.score_pair("  return x\n", "return x");
        assert!(r.exact_match);
        assert!(approx(r.similarity, 1.0));
    }

    #[test]
    fn test_evaluate_single_pair_token_accuracy() {
        let report = EvaluationHarness::new()
            .evaluate(&["a x c"], &["a b c"])
            .expect("evaluate");
        assert!(approx(report.token_level_accuracy, 2.0 / 3.0));
        assert_eq!(report.test_examples, 1);
    }

    #[test]
    fn test_evaluate_zero_reference_tokens_is_zero() {
        let report = EvaluationHarness::new()
            .evaluate(&["x"], &["   "])
            .expect("evaluate");
        assert_eq!(report.reference_tokens, 0);
        assert!(approx(report.token_level_accuracy, 0.0));
    }

    #[test]
    fn test_evaluate_length_mismatch() {
        let err = EvaluationHarness::new()
            .evaluate(&["a", "b"], &["a"])
            .expect_err("should fail");
        assert!(matches!(
            err,
            BrainbugError::LengthMismatch {
                predictions: 2,
                references: 1
            }
        ));
    }

    #[test]
    fn test_evaluate_empty_is_error() {
        let empty: [&str; 0] = [];
        let err = EvaluationHarness::new()
            .evaluate(&empty, &empty)
            .expect_err("should fail");
        assert!(matches!(err, BrainbugError::EmptyEvaluation));
    }

    #[test]
    fn test_evaluate_caps_pairs() {
        let preds: Vec<String> = (0..10).map(|i| format!("p{i}")).collect();
        let refs: Vec<String> = (0..10).map(|i| format!("p{i}")).collect();
        let report = EvaluationHarness::new()
            .with_max_pairs(4)
            .evaluate(&preds, &refs)
            .expect("evaluate");
        assert_eq!(report.test_examples, 4);
        assert!(approx(report.exact_match_accuracy, 1.0));
    }

    #[test]
    fn test_sample_is_truncated_and_bounded() {
        let long = "y".repeat(250);
        let preds = vec![long.clone(); 8];
        let refs = vec![long.clone(); 8];
        let inputs = vec!["in".to_string(); 8];
        let report = EvaluationHarness::new()
            .with_sample_size(20)
            .evaluate_with_inputs(&inputs, &preds, &refs)
            .expect("evaluate");

        assert_eq!(report.sample_predictions.len(), MAX_SAMPLE_SIZE);
        let s = &report.sample_predictions[0];
        assert_eq!(s.input, "in...");
        assert_eq!(s.prediction.chars().count(), SAMPLE_TEXT_CHARS + 3);
        assert!(s.expected.ends_with("..."));
    }

    #[test]
    fn test_inputs_length_must_match() {
        let err = EvaluationHarness::new()
            .evaluate_with_inputs(&["i"], &["a", "b"], &["a", "b"])
            .expect_err("should fail");
        assert!(matches!(err, BrainbugError::MalformedInput(_)));
    }

    #[test]
    fn test_custom_tokenizer() {
        let h = EvaluationHarness::new().with_tokenizer(WhitespaceTokenizer);
        let r = h.score_pair("f(a, b)", "f(a, c)");
        assert_eq!(r.reference_tokens, 2);
        assert_eq!(r.matched_tokens, 1);
    }

    #[test]
    fn test_totals_merge_is_commutative() {
        let h = EvaluationHarness::new();
        let mut left = ScoreTotals::default();
        left.add(&h.score_pair("a b", "a b"));
        let mut right = ScoreTotals::default();
        right.add(&h.score_pair("a", "c d"));

        assert_eq!(left.merge(right), right.merge(left));
        let both = left.merge(right);
        assert_eq!(both.pairs, 2);
        assert!(approx(both.token_level_accuracy(), 2.0 / 4.0));
    }
}
