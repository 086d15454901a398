//! Tracing setup for the `brainbug` binary.
//!
//! Human-facing logs go to stderr so stdout stays usable for command
//! output. Long-running stages (curate, predict, evaluate) also append to
//! `<logging_dir>/brainbug.log` so a run can be inspected after the fact.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

use crate::domain::error::Result;

/// File name of the run log inside the logging directory.
pub const LOG_FILE_NAME: &str = "brainbug.log";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Path of the run log for a logging directory.
pub fn log_file_path(logging_dir: &Path) -> PathBuf {
    logging_dir.join(LOG_FILE_NAME)
}

fn open_log_file(logging_dir: &Path) -> Result<File> {
    std::fs::create_dir_all(logging_dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path(logging_dir))?;
    Ok(file)
}

/// Install the global subscriber.
///
/// `level` applies when `RUST_LOG` is unset. With `json`, both stderr and
/// the log file get newline-delimited JSON. When `logging_dir` is given the
/// directory is created and the log file opened before anything is
/// installed, so an unwritable directory is reported instead of silently
/// dropping the file log. A second call keeps the first subscriber.
pub fn init_tracing(json: bool, level: Level, logging_dir: Option<&Path>) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let mut layers: Vec<BoxedLayer> = Vec::with_capacity(2);

    let stderr = fmt::layer().with_target(false).with_writer(std::io::stderr);
    layers.push(if json { stderr.json().boxed() } else { stderr.boxed() });

    if let Some(dir) = logging_dir {
        let file = fmt::layer()
            .with_ansi(false)
            .with_writer(Mutex::new(open_log_file(dir)?));
        layers.push(if json { file.json().boxed() } else { file.boxed() });
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()
        .ok();
    Ok(())
}
