//! Host-emulated device.
//!
//! Device memory lives in ordinary heap allocations, but is otherwise
//! treated like real device memory: rows are padded to the pitch
//! alignment, data only moves through explicit upload/download calls, and
//! every live allocation is accounted for until its buffer is dropped.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::{debug, trace};

use super::{Capability, DeviceBuffer, DeviceError, DeviceInfo, RotateDevice, Status};
use crate::host::HostImage;
use crate::transform::{rotate_plane, Plane, PlaneMut, RotateParams};

/// Row alignment used by [`SoftwareDevice::new`], in bytes.
pub const DEFAULT_PITCH_ALIGNMENT: usize = 512;

#[derive(Debug, Default)]
struct AllocationTracker {
    live_buffers: AtomicUsize,
    live_bytes: AtomicUsize,
    total_allocations: AtomicU64,
}

impl AllocationTracker {
    fn acquire(&self, bytes: usize) {
        self.live_buffers.fetch_add(1, Ordering::Relaxed);
        self.live_bytes.fetch_add(bytes, Ordering::Relaxed);
        self.total_allocations.fetch_add(1, Ordering::Relaxed);
    }

    fn release(&self, bytes: usize) {
        self.live_buffers.fetch_sub(1, Ordering::Relaxed);
        self.live_bytes.fetch_sub(bytes, Ordering::Relaxed);
    }
}

/// A pitched buffer in emulated device memory. Released on drop.
#[derive(Debug)]
pub struct DeviceImage {
    width: u32,
    height: u32,
    pitch: usize,
    data: Vec<u8>,
    tracker: Arc<AllocationTracker>,
}

impl DeviceBuffer for DeviceImage {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn pitch(&self) -> usize {
        self.pitch
    }
}

impl DeviceImage {
    fn plane(&self) -> Plane<'_> {
        Plane {
            data: &self.data,
            width: self.width,
            height: self.height,
            pitch: self.pitch,
        }
    }

    fn plane_mut(&mut self) -> PlaneMut<'_> {
        PlaneMut {
            data: &mut self.data,
            width: self.width,
            height: self.height,
            pitch: self.pitch,
        }
    }
}

impl Drop for DeviceImage {
    fn drop(&mut self) {
        self.tracker.release(self.data.len());
        trace!(
            width = self.width,
            height = self.height,
            bytes = self.data.len(),
            "Released device buffer"
        );
    }
}

/// Device that runs the rotate primitive on the CPU.
#[derive(Debug, Clone)]
pub struct SoftwareDevice {
    alignment: usize,
    memory_limit: Option<usize>,
    tracker: Arc<AllocationTracker>,
}

impl Default for SoftwareDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl SoftwareDevice {
    pub fn new() -> Self {
        Self::with_alignment(DEFAULT_PITCH_ALIGNMENT)
    }

    /// Use `alignment` bytes as the row alignment (rounded up to at least 1).
    pub fn with_alignment(alignment: usize) -> Self {
        Self {
            alignment: alignment.max(1),
            memory_limit: None,
            tracker: Arc::new(AllocationTracker::default()),
        }
    }

    /// Fail allocations that would push live memory past `bytes`.
    pub fn with_memory_limit(mut self, bytes: usize) -> Self {
        self.memory_limit = Some(bytes);
        self
    }

    /// Number of buffers currently allocated.
    pub fn live_buffers(&self) -> usize {
        self.tracker.live_buffers.load(Ordering::Relaxed)
    }

    /// Bytes currently allocated, including row padding.
    pub fn live_bytes(&self) -> usize {
        self.tracker.live_bytes.load(Ordering::Relaxed)
    }

    /// Allocations made since the device was created.
    pub fn total_allocations(&self) -> u64 {
        self.tracker.total_allocations.load(Ordering::Relaxed)
    }

    fn pitch_for(&self, width: u32) -> Option<usize> {
        (width as usize)
            .checked_next_multiple_of(self.alignment)
            .filter(|&p| p > 0)
    }
}

impl RotateDevice for SoftwareDevice {
    type Image = DeviceImage;

    fn info(&self) -> DeviceInfo {
        DeviceInfo {
            library_version: env!("CARGO_PKG_VERSION").to_string(),
            device_name: "software (host emulated)".to_string(),
            runtime_version: format!("{} {}", std::env::consts::OS, std::env::consts::ARCH),
            capability: Capability { major: 1, minor: 0 },
            pitch_alignment: self.alignment,
        }
    }

    fn allocate(&self, width: u32, height: u32) -> Result<DeviceImage, DeviceError> {
        if width == 0 || height == 0 {
            return Err(Status::SizeError.into());
        }

        let pitch = self.pitch_for(width).ok_or(Status::MemoryAllocationError)?;
        let bytes = pitch
            .checked_mul(height as usize)
            .ok_or(Status::MemoryAllocationError)?;

        if let Some(limit) = self.memory_limit {
            if self.live_bytes().saturating_add(bytes) > limit {
                debug!(bytes, limit, live = self.live_bytes(), "Device memory limit reached");
                return Err(Status::MemoryAllocationError.into());
            }
        }

        self.tracker.acquire(bytes);
        trace!(width, height, pitch, bytes, "Allocated device buffer");

        Ok(DeviceImage {
            width,
            height,
            pitch,
            data: vec![0u8; bytes],
            tracker: Arc::clone(&self.tracker),
        })
    }

    fn upload(&self, host: &HostImage) -> Result<DeviceImage, DeviceError> {
        let mut image = self.allocate(host.width(), host.height())?;
        let width = host.width() as usize;

        for y in 0..host.height() {
            let start = y as usize * image.pitch;
            image.data[start..start + width].copy_from_slice(host.row(y));
        }

        Ok(image)
    }

    fn download(&self, image: &DeviceImage) -> Result<HostImage, DeviceError> {
        let mut host = HostImage::new(image.width, image.height);
        let width = image.width as usize;

        for y in 0..image.height {
            let start = y as usize * image.pitch;
            host.row_mut(y)
                .copy_from_slice(&image.data[start..start + width]);
        }

        Ok(host)
    }

    fn rotate(
        &self,
        src: &DeviceImage,
        dst: &mut DeviceImage,
        params: &RotateParams,
    ) -> Result<(), DeviceError> {
        if params.dst_rect.is_empty() {
            return Err(Status::RectangleError.into());
        }
        if dst.width < params.dst_rect.width || dst.height < params.dst_rect.height {
            return Err(Status::SizeError.into());
        }
        if !params.angle.is_finite() {
            return Err(Status::NotSupportedModeError.into());
        }

        rotate_plane(&src.plane(), &mut dst.plane_mut(), params);
        Ok(())
    }
}
