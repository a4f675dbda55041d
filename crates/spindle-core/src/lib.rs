//! Spindle Core - image rotation pipeline
//!
//! This crate provides everything behind the Spindle command-line tools:
//! host and device image buffers, rotated bounding boxes, the rotate
//! primitive, directory scanning, and the batch and single-file runners.
//!
//! # Pipeline
//!
//! Each image goes through the same steps:
//! 1. Load from disk into a [`HostImage`](host::HostImage)
//! 2. Upload to a device buffer
//! 3. Compute the rotated bounding box and allocate the destination
//! 4. Rotate, download, save
//!
//! Device buffers are released when dropped, so each image's buffers are
//! gone before the next image starts.

pub mod batch;
pub mod device;
pub mod host;
pub mod pipeline;
pub mod report;
pub mod scan;
pub mod single;
pub mod transform;

#[cfg(test)]
mod test_utils;

pub use batch::{run_batch, BatchConfig, BatchError, BatchReport};
pub use device::{DeviceError, RotateDevice, SoftwareDevice, Status};
pub use pipeline::{process_image, ImageOutcome, ImageReport};
pub use single::{run_single, SingleConfig, SingleError};
pub use transform::{rotated_bounds, InterpolationMode, RotateParams};
