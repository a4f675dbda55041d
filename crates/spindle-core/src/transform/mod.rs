//! Rotation geometry and the reference rotation kernel.
//!
//! # Coordinate System
//!
//! - Rotation angles are in degrees, positive = counter-clockwise
//! - Origin is the top-left corner, y points down
//! - The rotation center is the source's geometric center, truncated to
//!   integer coordinates
//!
//! [`rotated_bounds`] is the one bounding-box function in the crate; device
//! backends expose it through [`RotateDevice::rotate_bound`] rather than
//! computing their own.
//!
//! [`RotateDevice::rotate_bound`]: crate::device::RotateDevice::rotate_bound

mod bounds;
mod rotation;

pub use bounds::{rotated_bounds, rotated_rect, Point, Rect};
pub use rotation::{rotate_plane, InterpolationMode, Plane, PlaneMut, RotateParams};
