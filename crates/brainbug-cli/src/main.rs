//! BrainBug CLI
//!
//! The `brainbug` command curates bug corpora into training splits and
//! scores generated fixes.
//!
//! ## Commands
//!
//! - `curate`: Build curated examples from a raw corpus and write train/val/test splits
//! - `stats`: Show usable/dropped counts and the fault distribution of a corpus
//! - `classify`: Look up a fault acronym in the taxonomy
//! - `predict`: Generate predictions for a split through a hosted model endpoint
//! - `evaluate`: Score predictions against a split and write the report

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use uuid::Uuid;

use brainbug_core::{
    classify, fault_distribution, generate_predictions, read_corpus, read_examples,
    read_predictions, render_report_md, split, write_evaluation_report, write_predictions,
    write_splits, BrainbugConfig, CuratedExample, CurationProfile, DatasetCurator, DirLayout,
    EvaluationHarness, HttpInferenceBackend, HttpInferenceConfig, PipelineVariant, SplitName,
    SplitRatios, SplitRunInfo, StageSpan, METRICS,
};

#[derive(Parser)]
#[command(name = "brainbug")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Bug-fix corpus curation and fix evaluation", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Config file (TOML or JSON)
    #[arg(long, global = true, env = "BRAINBUG_CONFIG")]
    config: Option<PathBuf>,

    /// Base directory that relative config paths resolve against
    #[arg(long, global = true, default_value = ".")]
    base_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Profile {
    /// One fix example per record, 80/10/10 split
    Repair,
    /// Buggy/fixed labeled pair per record, 70/15/15 split
    Detection,
}

impl From<Profile> for PipelineVariant {
    fn from(p: Profile) -> Self {
        match p {
            Profile::Repair => PipelineVariant::Repair,
            Profile::Detection => PipelineVariant::Detection,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Curate a raw corpus and write train/val/test splits
    Curate {
        /// Raw corpus (CSV, or JSON array of rows)
        #[arg(short, long)]
        input: PathBuf,

        /// Curation profile
        #[arg(short, long, value_enum)]
        profile: Profile,

        /// Override split ratios as TRAIN,VAL,TEST
        #[arg(long)]
        ratios: Option<String>,

        /// Shuffle seed (default: config seed)
        #[arg(long)]
        seed: Option<u64>,

        /// Output directory (default: config data_dir)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },

    /// Show corpus counts and fault distribution
    Stats {
        /// Raw corpus (CSV, or JSON array of rows)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Look up a fault acronym
    Classify {
        /// Fault acronym, e.g. WPFV
        code: String,
    },

    /// Generate predictions for a split through a hosted model endpoint
    Predict {
        /// Split file to predict on (default: <data_dir>/test.json)
        #[arg(long)]
        test: Option<PathBuf>,

        /// Text-generation endpoint URL
        #[arg(long, env = "BRAINBUG_ENDPOINT")]
        endpoint: String,

        /// Bearer token for the endpoint
        #[arg(long, env = "HF_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Where to write predictions (default: <data_dir>/predictions.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Maximum number of examples (default: config max_eval_pairs)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Score predictions against a split
    Evaluate {
        /// Split file with references (default: <data_dir>/test.json)
        #[arg(long)]
        test: Option<PathBuf>,

        /// Predictions file (JSON array of strings)
        #[arg(long)]
        predictions: PathBuf,

        /// Report path (default: <output_dir>/evaluation_metrics.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Maximum number of pairs (default: config max_eval_pairs)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Also write a markdown summary here
        #[arg(long)]
        markdown: Option<PathBuf>,
    },
}

impl Commands {
    /// Stages that also append to the run log in `logging_dir`.
    fn writes_run_log(&self) -> bool {
        matches!(
            self,
            Commands::Curate { .. } | Commands::Predict { .. } | Commands::Evaluate { .. }
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => BrainbugConfig::load(path)
            .with_context(|| format!("Failed to load config {:?}", path))?,
        None => BrainbugConfig::default(),
    };
    let layout = DirLayout::new(&cli.base_dir, &config);

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let log_dir = cli
        .command
        .writes_run_log()
        .then_some(layout.logging_dir.as_path());
    brainbug_core::init_tracing(cli.json, level, log_dir)
        .with_context(|| format!("Failed to open run log in {:?}", layout.logging_dir))?;

    let run_id = Uuid::new_v4().to_string();
    let result = match cli.command {
        Commands::Curate {
            input,
            profile,
            ratios,
            seed,
            out_dir,
        } => {
            let _span = StageSpan::enter("curate", &run_id);
            let out_dir = out_dir.unwrap_or_else(|| layout.data_dir.clone());
            cmd_curate(
                &input,
                profile,
                ratios.as_deref(),
                seed.unwrap_or(config.seed),
                &out_dir,
            )
        }
        Commands::Stats { input } => cmd_stats(&input),
        Commands::Classify { code } => cmd_classify(&code),
        Commands::Predict {
            test,
            endpoint,
            token,
            output,
            limit,
        } => {
            let _span = StageSpan::enter("predict", &run_id);
            let test = test.unwrap_or_else(|| layout.split_path(SplitName::Test));
            let output = output.unwrap_or_else(|| layout.data_dir.join("predictions.json"));
            cmd_predict(
                &config,
                &test,
                &endpoint,
                token.as_deref(),
                &output,
                limit.unwrap_or(config.max_eval_pairs),
            )
            .await
        }
        Commands::Evaluate {
            test,
            predictions,
            output,
            limit,
            markdown,
        } => {
            let _span = StageSpan::enter("evaluate", &run_id);
            let test = test.unwrap_or_else(|| layout.split_path(SplitName::Test));
            let output = output.unwrap_or_else(|| layout.report_path());
            cmd_evaluate(
                &config,
                &test,
                &predictions,
                &output,
                limit.unwrap_or(config.max_eval_pairs),
                markdown.as_deref(),
            )
        }
    };

    METRICS.flush();
    result
}

/// Curate a raw corpus and write the three splits plus a manifest.
fn cmd_curate(
    input: &Path,
    profile: Profile,
    ratios: Option<&str>,
    seed: u64,
    out_dir: &Path,
) -> Result<()> {
    let variant = PipelineVariant::from(profile);
    let mut curation_profile = CurationProfile::for_variant(variant);
    if let Some(r) = ratios {
        curation_profile = curation_profile.with_ratios(SplitRatios::parse(r)?);
    }

    info!("Loading corpus from {:?}", input);
    let records =
        read_corpus(input).with_context(|| format!("Failed to read corpus {:?}", input))?;

    let curated = DatasetCurator::new(variant).curate(&records);
    let splits = split(&curated.examples, curation_profile.ratios, seed)?;

    let manifest = write_splits(
        out_dir,
        &splits,
        &SplitRunInfo {
            profile: variant.to_string(),
            variant,
            seed,
            ratios: curation_profile.ratios,
            summary: curated.summary,
        },
    )?;

    println!(
        "Loaded {} records, {} usable ({} dropped)",
        curated.summary.raw_records, curated.summary.usable_records, curated.summary.dropped_records
    );
    println!("Created {} {} examples", curated.summary.examples, variant);
    for entry in &manifest.splits {
        println!(
            "  {:<5} {:>6} examples -> {}",
            entry.name,
            entry.count,
            out_dir.join(&entry.file).display()
        );
    }
    Ok(())
}

/// Print usable/dropped counts and the fault distribution.
fn cmd_stats(input: &Path) -> Result<()> {
    let records =
        read_corpus(input).with_context(|| format!("Failed to read corpus {:?}", input))?;
    let usable = records.iter().filter(|r| r.is_usable()).count();

    println!("Total rows:   {}", records.len());
    println!("Usable rows:  {}", usable);
    println!("Dropped rows: {}", records.len() - usable);
    println!();
    println!("Fault type distribution:");
    for entry in fault_distribution(&records) {
        let acronym = if entry.fault_acronym.is_empty() {
            "(none)"
        } else {
            entry.fault_acronym.as_str()
        };
        println!("  {:<6} {:>6}  {}", acronym, entry.count, entry.category);
    }
    Ok(())
}

fn cmd_classify(code: &str) -> Result<()> {
    let c = classify(code);
    println!("Category: {}", c.category);
    println!("Fix:      {}", c.fix_suggestion);
    if !c.is_known() {
        println!("(not in taxonomy)");
    }
    Ok(())
}

/// Generate predictions for a split and write them as a JSON array.
async fn cmd_predict(
    config: &BrainbugConfig,
    test: &Path,
    endpoint: &str,
    token: Option<&str>,
    output: &Path,
    limit: usize,
) -> Result<()> {
    let examples = read_examples(test)?;

    let mut http_config = HttpInferenceConfig::new(endpoint, config.max_length);
    if let Some(t) = token {
        http_config = http_config.with_token(t);
    }
    let backend = HttpInferenceBackend::new(http_config)?;

    let predictions = generate_predictions(&backend, &examples, limit, config.batch_size).await?;
    write_predictions(output, &predictions)?;

    println!(
        "Wrote {} predictions to {}",
        predictions.len(),
        output.display()
    );
    Ok(())
}

/// Examples the predictions are paired with.
///
/// `predict` writes one prediction per example up to the cap, so a
/// prediction file may cover the whole split or exactly its capped prefix.
/// Any other length is compared against the whole split and rejected by
/// the harness; the harness applies the cap after that check.
fn scored_examples(
    examples: &[CuratedExample],
    predictions: usize,
    limit: usize,
) -> &[CuratedExample] {
    let capped = examples.len().min(limit);
    if predictions != examples.len() && predictions == capped {
        &examples[..capped]
    } else {
        examples
    }
}

/// Score predictions against the references of a split.
fn cmd_evaluate(
    config: &BrainbugConfig,
    test: &Path,
    predictions_path: &Path,
    output: &Path,
    limit: usize,
    markdown: Option<&Path>,
) -> Result<()> {
    let examples = read_examples(test)?;
    let predictions = read_predictions(predictions_path)?;

    let candidates = scored_examples(&examples, predictions.len(), limit);
    let inputs: Vec<&str> = candidates.iter().map(|e| e.input_code()).collect();
    let references: Vec<&str> = candidates.iter().map(|e| e.reference()).collect();

    let harness = EvaluationHarness::new()
        .with_max_pairs(limit)
        .with_sample_size(config.sample_size);
    let report = harness
        .evaluate_with_inputs(&inputs[..], &predictions[..], &references[..])
        .context("Evaluation failed")?;

    write_evaluation_report(output, &report)?;
    if let Some(md_path) = markdown {
        std::fs::write(md_path, render_report_md(&report))
            .with_context(|| format!("write {:?}", md_path))?;
    }

    println!("{}", "=".repeat(60));
    println!("EVALUATION RESULTS");
    println!("{}", "=".repeat(60));
    println!("Test Examples:        {}", report.test_examples);
    println!("Exact Match Accuracy: {:.2}%", report.exact_match_accuracy * 100.0);
    println!("Token-Level Accuracy: {:.2}%", report.token_level_accuracy * 100.0);
    println!("Average Similarity:   {:.2}%", report.average_similarity * 100.0);
    println!("{}", "=".repeat(60));
    println!("Metrics saved to: {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn curate_parses_profile_and_ratios() {
        let cli = Cli::try_parse_from([
            "brainbug",
            "curate",
            "--input",
            "corpus.csv",
            "--profile",
            "detection",
            "--ratios",
            "0.8,0.1,0.1",
        ])
        .expect("parse");
        match cli.command {
            Commands::Curate {
                profile, ratios, ..
            } => {
                assert!(matches!(profile, Profile::Detection));
                assert_eq!(ratios.as_deref(), Some("0.8,0.1,0.1"));
            }
            _ => panic!("expected curate"),
        }
    }

    #[test]
    fn only_pipeline_stages_write_run_log() {
        let stage = Cli::try_parse_from(["brainbug", "stats", "--input", "c.csv"]).expect("parse");
        assert!(!stage.command.writes_run_log());

        let stage = Cli::try_parse_from(["brainbug", "evaluate", "--predictions", "p.json"])
            .expect("parse");
        assert!(stage.command.writes_run_log());
    }

    #[test]
    fn evaluate_end_to_end_writes_report() {
        let dir = tempfile::tempdir().expect("tempdir");
        let test_path = dir.path().join("test.json");
        let preds_path = dir.path().join("preds.json");
        let report_path = dir.path().join("out").join("report.json");

        let examples = serde_json::json!([
            {
                "code": "a()",
                "label": 1,
                "bug_type": "MFC",
                "bug_description": "",
                "fixed_code": "a(); b()"
            },
            {
                "code": "a(); b()",
                "label": 0,
                "bug_type": "none",
                "bug_description": "",
                "fixed_code": "a(); b()"
            }
        ]);
        std::fs::write(&test_path, examples.to_string()).expect("write test");
        std::fs::write(&preds_path, r#"["a(); b()", "a(); c()"]"#).expect("write preds");

        cmd_evaluate(
            &BrainbugConfig::default(),
            &test_path,
            &preds_path,
            &report_path,
            500,
            None,
        )
        .expect("evaluate");

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&report_path).expect("read report"))
                .expect("parse report");
        assert_eq!(raw["test_examples"], serde_json::json!(2));
        assert_eq!(raw["exact_match_accuracy"], serde_json::json!(0.5));
    }

    fn write_split(path: &Path, n: usize) {
        let examples: Vec<CuratedExample> = (0..n)
            .map(|i| {
                CuratedExample::Detection(brainbug_core::DetectionExample {
                    code: format!("f({i})"),
                    label: 1,
                    bug_type: "MPFC".to_string(),
                    bug_description: String::new(),
                    fixed_code: format!("f({i}, y)"),
                })
            })
            .collect();
        std::fs::write(path, serde_json::to_string(&examples).expect("serialize"))
            .expect("write split");
    }

    fn write_preds(path: &Path, n: usize) {
        let preds: Vec<String> = (0..n).map(|i| format!("f({i}, y)")).collect();
        write_predictions(path, &preds).expect("write preds");
    }

    fn evaluated_pairs(
        dir: &Path,
        split_len: usize,
        preds_len: usize,
        limit: usize,
    ) -> Result<u64> {
        let test_path = dir.join("test.json");
        let preds_path = dir.join("preds.json");
        let report_path = dir.join("report.json");
        write_split(&test_path, split_len);
        write_preds(&preds_path, preds_len);

        cmd_evaluate(
            &BrainbugConfig::default(),
            &test_path,
            &preds_path,
            &report_path,
            limit,
            None,
        )?;
        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&report_path).expect("read report"))
                .expect("parse report");
        Ok(raw["test_examples"].as_u64().expect("test_examples"))
    }

    #[test]
    fn evaluate_caps_full_length_predictions() {
        let dir = tempfile::tempdir().expect("tempdir");
        let scored = evaluated_pairs(dir.path(), 600, 600, 500).expect("evaluate");
        assert_eq!(scored, 500);
    }

    #[test]
    fn evaluate_accepts_predictions_for_capped_prefix() {
        let dir = tempfile::tempdir().expect("tempdir");
        let scored = evaluated_pairs(dir.path(), 600, 500, 500).expect("evaluate");
        assert_eq!(scored, 500);
    }

    #[test]
    fn evaluate_rejects_real_length_mismatch() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = evaluated_pairs(dir.path(), 600, 550, 500).expect_err("should fail");
        assert!(format!("{:#}", err).contains("550 predictions vs 600 references"));
    }
}
