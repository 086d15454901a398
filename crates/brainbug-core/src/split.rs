//! Deterministic train/val/test splitting.
//!
//! Two-stage policy: hold out `ceil((val + test) * N)` examples from a
//! seeded shuffle, keep the rest as train, then shuffle the held-out set
//! with the same seed and take `ceil(test / (val + test) * held_out)` as
//! test. Rounding always favours the held-out side, so the remainder lands
//! in train. The output is a pure function of `(examples, ratios, seed)`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::error::{BrainbugError, Result};
use crate::domain::example::{CuratedExample, PipelineVariant};

/// Seed used when none is configured.
pub const DEFAULT_SEED: u64 = 42;

const RATIO_TOLERANCE: f64 = 1e-6;
const CEIL_SLACK: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Ratios and profiles
// ---------------------------------------------------------------------------

/// Fractions of the collection assigned to each split.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SplitRatios {
    pub train: f64,
    pub val: f64,
    pub test: f64,
}

impl SplitRatios {
    /// 80/10/10.
    pub const EIGHTY_TEN_TEN: SplitRatios = SplitRatios {
        train: 0.8,
        val: 0.1,
        test: 0.1,
    };

    /// 70/15/15.
    pub const SEVENTY_FIFTEEN_FIFTEEN: SplitRatios = SplitRatios {
        train: 0.7,
        val: 0.15,
        test: 0.15,
    };

    /// Build and validate.
    pub fn new(train: f64, val: f64, test: f64) -> Result<Self> {
        let ratios = Self { train, val, test };
        ratios.validate()?;
        Ok(ratios)
    }

    /// Parse `"0.7,0.15,0.15"`.
    pub fn parse(s: &str) -> Result<Self> {
        let parts = s
            .split(',')
            .map(|p| {
                p.trim()
                    .parse::<f64>()
                    .map_err(|e| BrainbugError::InvalidRatios(format!("{p:?}: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;

        match parts.as_slice() {
            [train, val, test] => Self::new(*train, *val, *test),
            _ => Err(BrainbugError::InvalidRatios(format!(
                "expected three comma-separated ratios, got {}",
                parts.len()
            ))),
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("train", self.train), ("val", self.val), ("test", self.test)] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(BrainbugError::InvalidRatios(format!(
                    "{name} ratio {value} is outside [0, 1]"
                )));
            }
        }
        let sum = self.train + self.val + self.test;
        if (sum - 1.0).abs() > RATIO_TOLERANCE {
            return Err(BrainbugError::InvalidRatios(format!(
                "ratios sum to {sum}, expected 1"
            )));
        }
        Ok(())
    }

    fn held_out_fraction(&self) -> f64 {
        self.val + self.test
    }

    fn test_share_of_held_out(&self) -> f64 {
        let held_out = self.held_out_fraction();
        if held_out <= 0.0 {
            0.0
        } else {
            self.test / held_out
        }
    }

    /// `(train, val, test)` sizes for a collection of `n` examples.
    pub fn sizes(&self, n: usize) -> (usize, usize, usize) {
        let held_out = ceil_count(self.held_out_fraction(), n);
        let test = ceil_count(self.test_share_of_held_out(), held_out);
        (n - held_out, held_out - test, test)
    }
}

fn ceil_count(fraction: f64, n: usize) -> usize {
    let raw = (fraction * n as f64 - CEIL_SLACK).ceil();
    (raw.max(0.0) as usize).min(n)
}

/// A named pairing of example shape and split ratios.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CurationProfile {
    pub variant: PipelineVariant,
    pub ratios: SplitRatios,
}

impl CurationProfile {
    /// Repair examples, 80/10/10.
    pub fn repair() -> Self {
        Self {
            variant: PipelineVariant::Repair,
            ratios: SplitRatios::EIGHTY_TEN_TEN,
        }
    }

    /// Detection pairs, 70/15/15.
    pub fn detection() -> Self {
        Self {
            variant: PipelineVariant::Detection,
            ratios: SplitRatios::SEVENTY_FIFTEEN_FIFTEEN,
        }
    }

    pub fn for_variant(variant: PipelineVariant) -> Self {
        match variant {
            PipelineVariant::Repair => Self::repair(),
            PipelineVariant::Detection => Self::detection(),
        }
    }

    pub fn with_ratios(mut self, ratios: SplitRatios) -> Self {
        self.ratios = ratios;
        self
    }
}

// ---------------------------------------------------------------------------
// Splits
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SplitName {
    Train,
    Val,
    Test,
}

impl SplitName {
    pub const ALL: [SplitName; 3] = [SplitName::Train, SplitName::Val, SplitName::Test];

    pub fn as_str(self) -> &'static str {
        match self {
            SplitName::Train => "train",
            SplitName::Val => "val",
            SplitName::Test => "test",
        }
    }

    /// File name the split is persisted under.
    pub fn file_name(self) -> String {
        format!("{}.json", self.as_str())
    }
}

impl std::fmt::Display for SplitName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One named, ordered split. Contents are fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSplit {
    name: SplitName,
    examples: Vec<CuratedExample>,
}

impl DatasetSplit {
    pub fn new(name: SplitName, examples: Vec<CuratedExample>) -> Self {
        Self { name, examples }
    }

    pub fn name(&self) -> SplitName {
        self.name
    }

    pub fn examples(&self) -> &[CuratedExample] {
        &self.examples
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn into_examples(self) -> Vec<CuratedExample> {
        self.examples
    }
}

/// The three splits of one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitSet {
    pub train: DatasetSplit,
    pub val: DatasetSplit,
    pub test: DatasetSplit,
}

impl SplitSet {
    pub fn iter(&self) -> impl Iterator<Item = &DatasetSplit> {
        [&self.train, &self.val, &self.test].into_iter()
    }

    pub fn total(&self) -> usize {
        self.iter().map(DatasetSplit::len).sum()
    }
}

/// Fisher–Yates permutation of `0..n` driven by a 64-bit LCG.
pub fn shuffled_indices(n: usize, seed: u64) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut state = seed;
    for i in (1..n).rev() {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let j = (state >> 33) as usize % (i + 1);
        indices.swap(i, j);
    }
    indices
}

/// Shuffle `items` with `seed` and cut off the first `head` items.
/// Returns `(head, rest)`.
fn shuffle_split<T: Clone>(items: &[T], head: usize, seed: u64) -> (Vec<T>, Vec<T>) {
    let order = shuffled_indices(items.len(), seed);
    let (head_idx, rest_idx) = order.split_at(head.min(items.len()));
    (
        head_idx.iter().map(|&i| items[i].clone()).collect(),
        rest_idx.iter().map(|&i| items[i].clone()).collect(),
    )
}

/// Partition `examples` into train/val/test.
pub fn split(examples: &[CuratedExample], ratios: SplitRatios, seed: u64) -> Result<SplitSet> {
    ratios.validate()?;

    let (n_train, n_val, n_test) = ratios.sizes(examples.len());
    let (held_out, train) = shuffle_split(examples, n_val + n_test, seed);
    let (test, val) = shuffle_split(&held_out, n_test, seed);

    debug!(
        total = examples.len(),
        train = n_train,
        val = n_val,
        test = n_test,
        seed,
        "split computed"
    );

    Ok(SplitSet {
        train: DatasetSplit::new(SplitName::Train, train),
        val: DatasetSplit::new(SplitName::Val, val),
        test: DatasetSplit::new(SplitName::Test, test),
    })
}
