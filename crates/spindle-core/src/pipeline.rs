//! Per-image rotation pipeline.
//!
//! Load → upload → bounding box → allocate → rotate → download → save.
//! Every failure is turned into an [`ImageOutcome`] at the image boundary,
//! so a caller looping over many images never sees a panic or an early
//! return from one bad file. Device buffers are scoped to
//! [`rotate_file`] and released before it returns.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::device::{DeviceBuffer, DeviceError, RotateDevice, Status};
use crate::host::{load_gray, save_gray, ImageIoError};
use crate::transform::{InterpolationMode, Point, RotateParams};

/// Failure inside the pipeline, before it is tagged as an outcome.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error(transparent)]
    Io(#[from] ImageIoError),
}

/// Details of one successfully rotated image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub source_size: (u32, u32),
    pub output_size: (u32, u32),
    pub params: RotateParams,
    pub elapsed: Duration,
}

/// Tagged result of processing one image.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "detail")]
pub enum ImageOutcome {
    Success(ImageReport),
    /// The device returned a non-success status.
    LibraryError(Status),
    /// The input could not be read or the output could not be written.
    IoError(String),
    /// Anything else, including a panic inside the device.
    UnknownError(String),
}

impl ImageOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ImageOutcome::Success(_))
    }

    /// One-line description for logs and summaries.
    pub fn describe(&self) -> String {
        match self {
            ImageOutcome::Success(report) => format!(
                "ok {}x{} -> {}x{}",
                report.source_size.0,
                report.source_size.1,
                report.output_size.0,
                report.output_size.1
            ),
            ImageOutcome::LibraryError(status) => format!("library error: {status}"),
            ImageOutcome::IoError(reason) => format!("I/O error: {reason}"),
            ImageOutcome::UnknownError(reason) => format!("unknown error: {reason}"),
        }
    }
}

impl From<PipelineError> for ImageOutcome {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Device(DeviceError::Status(status)) => ImageOutcome::LibraryError(status),
            PipelineError::Device(other) => ImageOutcome::UnknownError(other.to_string()),
            PipelineError::Io(io) => ImageOutcome::IoError(io.to_string()),
        }
    }
}

/// `<output_dir>/<stem><suffix><.ext>` for `input`.
///
/// ```
/// use std::path::Path;
/// use spindle_core::pipeline::output_path_for;
///
/// let out = output_path_for(Path::new("data/a.tiff"), Path::new("out"), "_rotated");
/// assert_eq!(out, Path::new("out/a_rotated.tiff"));
/// ```
pub fn output_path_for(input: &Path, output_dir: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match input.extension() {
        Some(ext) => format!("{stem}{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}{suffix}"),
    };
    output_dir.join(name)
}

/// Run the whole pipeline for one file, propagating the first failure.
pub fn rotate_file<D: RotateDevice>(
    device: &D,
    input: &Path,
    output: &Path,
    angle: f64,
    interpolation: InterpolationMode,
) -> Result<ImageReport, PipelineError> {
    let started = Instant::now();

    let host_src = load_gray(input)?;
    let device_src = device.upload(&host_src)?;
    let source_size = device_src.size();

    let dst_rect = device.rotate_bound(source_size.0, source_size.1, angle)?;
    let mut device_dst = device.allocate(dst_rect.width, dst_rect.height)?;

    let params = RotateParams {
        angle,
        center: Point::center_of(source_size.0, source_size.1),
        dst_rect,
        interpolation,
    };
    debug!(?params, "Rotating");
    device.rotate(&device_src, &mut device_dst, &params)?;

    let host_dst = device.download(&device_dst)?;
    drop(device_dst);
    drop(device_src);

    save_gray(output, &host_dst)?;
    info!(output = %output.display(), "Saved");

    Ok(ImageReport {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        source_size,
        output_size: host_dst.dimensions(),
        params,
        elapsed: started.elapsed(),
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Process one image and tag the result. Never panics or returns early.
pub fn process_image<D: RotateDevice>(
    device: &D,
    input: &Path,
    output: &Path,
    angle: f64,
    interpolation: InterpolationMode,
) -> ImageOutcome {
    info!(input = %input.display(), "Processing");

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        rotate_file(device, input, output, angle, interpolation)
    }));

    match result {
        Ok(Ok(report)) => ImageOutcome::Success(report),
        Ok(Err(err)) => err.into(),
        Err(payload) => ImageOutcome::UnknownError(panic_message(payload.as_ref())),
    }
}
