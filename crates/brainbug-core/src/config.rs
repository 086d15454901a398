//! Pipeline configuration.
//!
//! A flat key-value document in TOML or JSON (chosen by file extension).
//! Every key has a default and unknown keys are ignored, so a training
//! config carrying optimizer settings can be read as-is. Relative
//! directories are resolved against an explicit base directory through
//! [`DirLayout`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::error::{BrainbugError, Result};
use crate::eval::harness::{DEFAULT_MAX_EVAL_PAIRS, MAX_SAMPLE_SIZE};
use crate::split::{SplitName, DEFAULT_SEED};

/// File name the evaluation report is written under in the output dir.
pub const REPORT_FILE_NAME: &str = "evaluation_metrics.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BrainbugConfig {
    /// Base model identifier. Passed through, never interpreted.
    #[serde(alias = "model_name")]
    pub base_model: String,

    /// Maximum sequence length for generation requests.
    pub max_length: usize,

    /// Concurrent inference requests when generating predictions.
    pub batch_size: usize,

    /// Where curated split files live.
    pub data_dir: PathBuf,

    /// Model output dir; the evaluation report is written here.
    pub output_dir: PathBuf,

    pub logging_dir: PathBuf,

    /// Cap on pairs scored per evaluation run.
    pub max_eval_pairs: usize,

    /// Sample predictions kept in the report (at most 5).
    pub sample_size: usize,

    /// Split shuffle seed.
    pub seed: u64,
}

impl Default for BrainbugConfig {
    fn default() -> Self {
        Self {
            base_model: "Salesforce/codet5-small".to_string(),
            max_length: 256,
            batch_size: 4,
            data_dir: PathBuf::from("data/processed"),
            output_dir: PathBuf::from("models/brainbug"),
            logging_dir: PathBuf::from("logs"),
            max_eval_pairs: DEFAULT_MAX_EVAL_PAIRS,
            sample_size: MAX_SAMPLE_SIZE,
            seed: DEFAULT_SEED,
        }
    }
}

impl BrainbugConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON document.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file; `.json` is parsed as JSON, anything else as TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        debug!(path = %path.display(), json = is_json, "loading config");
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("max_length", self.max_length),
            ("batch_size", self.batch_size),
            ("max_eval_pairs", self.max_eval_pairs),
        ] {
            if value == 0 {
                return Err(BrainbugError::InvalidConfig(format!(
                    "{key} must be greater than zero"
                )));
            }
        }
        if self.sample_size > MAX_SAMPLE_SIZE {
            return Err(BrainbugError::InvalidConfig(format!(
                "sample_size must be at most {MAX_SAMPLE_SIZE}, got {}",
                self.sample_size
            )));
        }
        Ok(())
    }
}

/// Concrete directories for one run, resolved against a base directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirLayout {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub logging_dir: PathBuf,
}

fn resolve(base: &Path, dir: &Path) -> PathBuf {
    if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        base.join(dir)
    }
}

impl DirLayout {
    pub fn new(base_dir: &Path, config: &BrainbugConfig) -> Self {
        Self {
            data_dir: resolve(base_dir, &config.data_dir),
            output_dir: resolve(base_dir, &config.output_dir),
            logging_dir: resolve(base_dir, &config.logging_dir),
        }
    }

    pub fn split_path(&self, split: SplitName) -> PathBuf {
        self.data_dir.join(split.file_name())
    }

    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(REPORT_FILE_NAME)
    }
}
