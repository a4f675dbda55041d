//! Batch rotation of every image in a directory tree.
//!
//! Images are processed strictly one after another. A failed image is
//! counted and skipped; it never stops the batch.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::device::RotateDevice;
use crate::pipeline::{output_path_for, process_image, ImageOutcome};
use crate::scan::{find_images_with_fallback, normalize_extension};
use crate::transform::InterpolationMode;

pub const DEFAULT_INPUT_DIR: &str = "data/aerials";
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_ANGLE: f64 = 45.0;
pub const DEFAULT_EXTENSION: &str = ".tiff";

/// Appended to each input's stem to name its output.
pub const OUTPUT_SUFFIX: &str = "_rotated";

/// Name of the plain-text log written into the output directory.
pub const LOG_FILE_NAME: &str = "processing_log.txt";

/// Error types for batch runs.
#[derive(Debug, Error)]
pub enum BatchError {
    /// Neither the requested nor any fallback extension matched.
    #[error("No supported image files found in {}", .0.display())]
    NoImagesFound(PathBuf),

    /// Angle is NaN or infinite.
    #[error("Invalid rotation angle: {0}")]
    InvalidAngle(f64),

    #[error("Failed to create output directory {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Batch settings, fixed once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    input_dir: PathBuf,
    output_dir: PathBuf,
    angle: f64,
    extension: String,
    interpolation: InterpolationMode,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            angle: DEFAULT_ANGLE,
            extension: DEFAULT_EXTENSION.to_string(),
            interpolation: InterpolationMode::Linear,
        }
    }
}

impl BatchConfig {
    /// Build a config, normalizing the extension and rejecting non-finite
    /// angles.
    pub fn new(
        input_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        angle: f64,
        extension: &str,
        interpolation: InterpolationMode,
    ) -> Result<Self, BatchError> {
        if !angle.is_finite() {
            return Err(BatchError::InvalidAngle(angle));
        }
        Ok(Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            angle,
            extension: normalize_extension(extension),
            interpolation,
        })
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Requested extension, lowercase with a leading dot.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn interpolation(&self) -> InterpolationMode {
        self.interpolation
    }

    pub fn log_path(&self) -> PathBuf {
        self.output_dir.join(LOG_FILE_NAME)
    }
}

/// Result of one image within a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageRecord {
    pub input: PathBuf,
    pub output: PathBuf,
    pub outcome: ImageOutcome,
    pub elapsed: Duration,
}

/// Everything a batch run produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub config: BatchConfig,
    /// Extension the files were actually found with.
    pub extension: String,
    /// Every discovered input, in processing order.
    pub files: Vec<PathBuf>,
    pub records: Vec<ImageRecord>,
    pub scan_errors: Vec<String>,
    /// Outputs written more than once because inputs in different
    /// subdirectories share a file name. The last write wins.
    pub overwritten: Vec<PathBuf>,
    pub succeeded: usize,
    pub failed: usize,
    pub total_time: Duration,
}

impl BatchReport {
    /// 0 if every image succeeded, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.failed == 0 {
            0
        } else {
            1
        }
    }

    pub fn total_ms(&self) -> u128 {
        self.total_time.as_millis()
    }

    /// Integer average over all discovered files, 0 when there are none.
    pub fn average_ms(&self) -> u128 {
        match self.files.len() {
            0 => 0,
            n => self.total_ms() / n as u128,
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &ImageRecord> {
        self.records.iter().filter(|r| !r.outcome.is_success())
    }

    /// Summary block printed at the end of a run.
    pub fn summary(&self) -> String {
        let rule = "=".repeat(50);
        let mut out = String::new();
        out.push_str(&format!("{rule}\nPROCESSING SUMMARY\n{rule}\n"));
        out.push_str(&format!("Total images processed: {}\n", self.files.len()));
        out.push_str(&format!("Successful: {}\n", self.succeeded));
        out.push_str(&format!("Failed: {}\n", self.failed));
        out.push_str(&format!("Total time: {} ms\n", self.total_ms()));
        out.push_str(&format!("Average time per image: {} ms\n", self.average_ms()));
        out.push_str(&format!(
            "Output directory: {}\n",
            self.config.output_dir().display()
        ));
        out.push_str(&rule);
        out
    }
}

/// Scan `config.input_dir()` and rotate every matching image into
/// `config.output_dir()`.
///
/// # Errors
///
/// Fails before processing anything if the output directory cannot be
/// created or no images are found. Per-image failures are recorded in the
/// report instead.
pub fn run_batch<D: RotateDevice>(
    device: &D,
    config: &BatchConfig,
) -> Result<BatchReport, BatchError> {
    fs::create_dir_all(config.output_dir()).map_err(|source| BatchError::OutputDir {
        path: config.output_dir().to_path_buf(),
        source,
    })?;

    info!(
        dir = %config.input_dir().display(),
        extension = config.extension(),
        "Scanning directory"
    );
    let scan = find_images_with_fallback(config.input_dir(), config.extension());

    if scan.files.is_empty() {
        error!(dir = %config.input_dir().display(), "No supported image files found");
        return Err(BatchError::NoImagesFound(config.input_dir().to_path_buf()));
    }

    let total = scan.files.len();
    info!(
        count = total,
        angle = config.angle(),
        interpolation = %config.interpolation(),
        "Found images to process"
    );

    let started = Instant::now();
    let mut records = Vec::with_capacity(total);
    let mut succeeded = 0;
    let mut failed = 0;
    let mut seen_outputs = HashSet::with_capacity(total);
    let mut overwritten = Vec::new();

    for (i, input) in scan.files.iter().enumerate() {
        let output = output_path_for(input, config.output_dir(), OUTPUT_SUFFIX);
        info!("[{}/{}] {}", i + 1, total, input.display());
        if !seen_outputs.insert(output.clone()) {
            warn!(
                input = %input.display(),
                output = %output.display(),
                "Output path already used in this run, overwriting"
            );
            overwritten.push(output.clone());
        }

        let image_started = Instant::now();
        let outcome = process_image(
            device,
            input,
            &output,
            config.angle(),
            config.interpolation(),
        );
        let elapsed = image_started.elapsed();

        if outcome.is_success() {
            succeeded += 1;
            info!(time_ms = elapsed.as_millis() as u64, "Done");
        } else {
            failed += 1;
            warn!(
                input = %input.display(),
                time_ms = elapsed.as_millis() as u64,
                "{}",
                outcome.describe()
            );
        }

        records.push(ImageRecord {
            input: input.clone(),
            output,
            outcome,
            elapsed,
        });
    }

    Ok(BatchReport {
        config: config.clone(),
        extension: scan.extension,
        files: scan.files,
        records,
        scan_errors: scan.errors,
        overwritten,
        succeeded,
        failed,
        total_time: started.elapsed(),
    })
}
