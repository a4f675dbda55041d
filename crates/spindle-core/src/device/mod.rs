//! Device abstraction: pitched device buffers, transfers and the rotate
//! primitive.
//!
//! # Ownership
//!
//! A device buffer belongs to exactly one owner and is released when it is
//! dropped. Every implementation of [`RotateDevice`] must release the
//! underlying memory in the buffer's `Drop`, so a buffer created inside a
//! per-image routine is gone by the time the routine returns, on success
//! and error paths alike.
//!
//! # Out-of-footprint pixels
//!
//! Buffers returned by [`RotateDevice::allocate`] are zero-filled and
//! [`RotateDevice::rotate`] only writes pixels covered by the rotated
//! source, so the corners of a rotated image read as 0.

mod software;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::host::HostImage;
use crate::transform::{rotated_rect, Point, Rect, RotateParams};

pub use software::{DeviceImage, SoftwareDevice, DEFAULT_PITCH_ALIGNMENT};

/// Non-success status codes reported by device calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// Kernel launch or execution failed.
    KernelExecutionError,
    /// Zero or negative width/height, or a destination too small.
    SizeError,
    /// A buffer that should exist does not.
    NullPointerError,
    /// Device memory could not be allocated.
    MemoryAllocationError,
    /// Row pitch smaller than the row width.
    StepError,
    /// Unsupported interpolation mode.
    InterpolationError,
    /// Empty or malformed destination rectangle.
    RectangleError,
    /// Operation not supported by this device.
    NotSupportedModeError,
}

impl Status {
    /// Numeric status code; always negative.
    pub fn code(self) -> i32 {
        match self {
            Status::KernelExecutionError => -3,
            Status::SizeError => -6,
            Status::NullPointerError => -8,
            Status::MemoryAllocationError => -12,
            Status::StepError => -14,
            Status::InterpolationError => -22,
            Status::RectangleError => -57,
            Status::NotSupportedModeError => -9999,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, self.code())
    }
}

/// Compute capability as `major.minor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Capability {
    pub major: u32,
    pub minor: u32,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Error types for device operations.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// A device call returned a non-success status.
    #[error("device call failed with status {0}")]
    Status(Status),

    /// No usable device could be initialised.
    #[error("no usable device: {0}")]
    Unavailable(String),

    /// The device is older than the program requires.
    #[error("device capability {found} is below the required {required}")]
    InsufficientCapability {
        required: Capability,
        found: Capability,
    },
}

impl From<Status> for DeviceError {
    fn from(status: Status) -> Self {
        DeviceError::Status(status)
    }
}

/// Diagnostic version information printed at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub library_version: String,
    pub device_name: String,
    pub runtime_version: String,
    pub capability: Capability,
    /// Row alignment applied to every device allocation, in bytes.
    pub pitch_alignment: usize,
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Spindle Library Version {}", self.library_version)?;
        writeln!(f, "  Device: {}", self.device_name)?;
        writeln!(f, "  Runtime Version: {}", self.runtime_version)?;
        writeln!(f, "  Compute Capability: {}", self.capability)?;
        write!(f, "  Pitch Alignment: {} bytes", self.pitch_alignment)
    }
}

/// A single-channel 8-bit image resident in device memory.
pub trait DeviceBuffer {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Byte offset between row starts; may exceed `width`.
    fn pitch(&self) -> usize;

    fn size(&self) -> (u32, u32) {
        (self.width(), self.height())
    }
}

/// A device that can hold images and rotate them.
///
/// All calls are synchronous: when a call returns, its work is complete.
pub trait RotateDevice {
    type Image: DeviceBuffer;

    fn info(&self) -> DeviceInfo;

    /// Allocate a zero-filled `width` x `height` buffer.
    fn allocate(&self, width: u32, height: u32) -> Result<Self::Image, DeviceError>;

    /// Copy a host image into a new device buffer.
    fn upload(&self, host: &HostImage) -> Result<Self::Image, DeviceError>;

    /// Copy a device buffer back into a tightly packed host image.
    fn download(&self, image: &Self::Image) -> Result<HostImage, DeviceError>;

    /// Rotate `src` into `dst`.
    fn rotate(
        &self,
        src: &Self::Image,
        dst: &mut Self::Image,
        params: &RotateParams,
    ) -> Result<(), DeviceError>;

    /// Destination rectangle for rotating a whole image about its center.
    fn rotate_bound(&self, width: u32, height: u32, angle: f64) -> Result<Rect, DeviceError> {
        if width == 0 || height == 0 {
            return Err(Status::SizeError.into());
        }
        Ok(rotated_rect(
            width,
            height,
            angle,
            Point::center_of(width, height),
        ))
    }

    /// Fail unless the device is at least `major.minor`.
    fn check_capability(&self, major: u32, minor: u32) -> Result<(), DeviceError> {
        let required = Capability { major, minor };
        let found = self.info().capability;
        if found < required {
            return Err(DeviceError::InsufficientCapability { required, found });
        }
        Ok(())
    }
}
