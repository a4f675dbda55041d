//! Rotation of a single file.
//!
//! Unlike a batch, any failure here is fatal to the run.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::device::RotateDevice;
use crate::pipeline::{process_image, ImageOutcome, ImageReport};
use crate::transform::InterpolationMode;

/// Bundled sample used when no input is given.
pub const DEFAULT_SAMPLE: &str = "teapot512.pgm";

pub const DEFAULT_ANGLE: f64 = 45.0;

/// Replaces the input's extension to name the default output.
pub const OUTPUT_SUFFIX: &str = "_rotate.pgm";

/// Error types for single-file runs.
#[derive(Debug, Error)]
pub enum SingleError {
    #[error("Unable to open: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Sample file {name} not found in any of: {searched}")]
    SampleNotFound { name: String, searched: String },

    #[error("Invalid rotation angle: {0}")]
    InvalidAngle(f64),

    #[error("Failed to rotate {}: {}", .input.display(), .outcome.describe())]
    Failed { input: PathBuf, outcome: ImageOutcome },
}

/// Single-file settings, fixed once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleConfig {
    input: PathBuf,
    output: PathBuf,
    angle: f64,
    interpolation: InterpolationMode,
}

impl SingleConfig {
    /// Build a config. Without `output`, the result goes next to the input
    /// as `<stem>_rotate.pgm`.
    pub fn new(
        input: impl Into<PathBuf>,
        output: Option<PathBuf>,
        angle: f64,
        interpolation: InterpolationMode,
    ) -> Result<Self, SingleError> {
        if !angle.is_finite() {
            return Err(SingleError::InvalidAngle(angle));
        }
        let input = input.into();
        let output = output.unwrap_or_else(|| default_output_for(&input));
        Ok(Self {
            input,
            output,
            angle,
            interpolation,
        })
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn interpolation(&self) -> InterpolationMode {
        self.interpolation
    }
}

/// `dir/name.ext` -> `dir/name_rotate.pgm`.
pub fn default_output_for(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}{OUTPUT_SUFFIX}"))
}

/// Directories searched for bundled sample data, in order.
pub fn sample_search_dirs() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = [".", "data", "../data", "../../data"]
        .iter()
        .map(PathBuf::from)
        .collect();

    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        dirs.push(exe_dir.join("data"));
    }

    dirs
}

/// First `dir/name` that exists among `dirs`.
pub fn find_sample_file(name: &str, dirs: &[PathBuf]) -> Result<PathBuf, SingleError> {
    for dir in dirs {
        let candidate = dir.join(name);
        if candidate.is_file() {
            debug!(path = %candidate.display(), "Found sample file");
            return Ok(candidate);
        }
    }

    let searched = dirs
        .iter()
        .map(|d| d.display().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    Err(SingleError::SampleNotFound {
        name: name.to_string(),
        searched,
    })
}

/// Rotate `config.input()` into `config.output()`.
pub fn run_single<D: RotateDevice>(
    device: &D,
    config: &SingleConfig,
) -> Result<ImageReport, SingleError> {
    if !config.input().is_file() {
        return Err(SingleError::InputNotFound(config.input().to_path_buf()));
    }
    info!(input = %config.input().display(), "Opened input file");

    match process_image(
        device,
        config.input(),
        config.output(),
        config.angle(),
        config.interpolation(),
    ) {
        ImageOutcome::Success(report) => Ok(report),
        outcome => Err(SingleError::Failed {
            input: config.input().to_path_buf(),
            outcome,
        }),
    }
}
