//! Image rotation with nearest-neighbour and bilinear interpolation.
//!
//! The rotation uses inverse mapping: for each pixel in the destination
//! rectangle, we calculate which source position lands on it and sample
//! the source there.
//!
//! Pixel `(i, j)` covers the unit square `[i, i+1) x [j, j+1)`, so its
//! center sits at `(i + 0.5, j + 0.5)`. For destination pixel `(dx, dy)`
//! and rotation center `c`, the source position is:
//!
//! ```text
//! rx = rect.x + dx + 0.5 - cx
//! ry = rect.y + dy + 0.5 - cy
//! src_x = rx * cos(θ) - ry * sin(θ) + cx
//! src_y = rx * sin(θ) + ry * cos(θ) + cy
//! ```
//!
//! Destination pixels whose source position falls outside the source
//! image are not written.

use serde::{Deserialize, Serialize};

use super::bounds::{rotated_rect, sin_cos_degrees, Point, Rect};

/// Interpolation mode for rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationMode {
    /// Take the source pixel containing the sample position.
    Nearest,
    /// Weight the 4 nearest pixel centers by distance.
    #[default]
    Linear,
}

impl InterpolationMode {
    pub fn as_str(self) -> &'static str {
        match self {
            InterpolationMode::Nearest => "nearest",
            InterpolationMode::Linear => "linear",
        }
    }
}

impl std::fmt::Display for InterpolationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters for one rotate call. Recomputed per image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotateParams {
    /// Rotation angle in degrees (positive = counter-clockwise).
    pub angle: f64,
    /// Point held fixed by the rotation, in source coordinates.
    pub center: Point,
    /// Region of the rotated frame written to the destination.
    pub dst_rect: Rect,
    pub interpolation: InterpolationMode,
}

impl RotateParams {
    /// Rotate a whole `width` x `height` image about its truncated center
    /// into a destination that fits the full rotated footprint.
    pub fn for_source(
        width: u32,
        height: u32,
        angle: f64,
        interpolation: InterpolationMode,
    ) -> Self {
        let center = Point::center_of(width, height);
        Self {
            angle,
            center,
            dst_rect: rotated_rect(width, height, angle, center),
            interpolation,
        }
    }
}

/// A read-only view of a pitched 8-bit plane.
#[derive(Debug, Clone, Copy)]
pub struct Plane<'a> {
    pub data: &'a [u8],
    pub width: u32,
    pub height: u32,
    pub pitch: usize,
}

/// A writable view of a pitched 8-bit plane.
#[derive(Debug)]
pub struct PlaneMut<'a> {
    pub data: &'a mut [u8],
    pub width: u32,
    pub height: u32,
    pub pitch: usize,
}

impl Plane<'_> {
    #[inline]
    fn at(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.pitch + x]
    }
}

/// Rotate `src` into `dst` according to `params`.
///
/// Writes at most `min(dst_rect, dst)` pixels. Callers validate geometry.
pub fn rotate_plane(src: &Plane<'_>, dst: &mut PlaneMut<'_>, params: &RotateParams) {
    let (sin, cos) = sin_cos_degrees(params.angle);
    let cx = params.center.x as f64;
    let cy = params.center.y as f64;

    let cols = params.dst_rect.width.min(dst.width) as usize;
    let rows = params.dst_rect.height.min(dst.height) as usize;

    for dy in 0..rows {
        let ry = params.dst_rect.y as f64 + dy as f64 + 0.5 - cy;
        let start = dy * dst.pitch;
        let row = &mut dst.data[start..start + cols];

        for (dx, out) in row.iter_mut().enumerate() {
            let rx = params.dst_rect.x as f64 + dx as f64 + 0.5 - cx;

            // Apply inverse rotation to find source coordinates
            let src_x = rx * cos - ry * sin + cx;
            let src_y = rx * sin + ry * cos + cy;

            let sample = match params.interpolation {
                InterpolationMode::Nearest => sample_nearest(src, src_x, src_y),
                InterpolationMode::Linear => sample_bilinear(src, src_x, src_y),
            };

            if let Some(value) = sample {
                *out = value;
            }
        }
    }
}

#[inline]
fn inside(src: &Plane<'_>, x: f64, y: f64) -> bool {
    x >= 0.0 && y >= 0.0 && x < src.width as f64 && y < src.height as f64
}

/// Sample the source pixel whose square contains `(x, y)`.
fn sample_nearest(src: &Plane<'_>, x: f64, y: f64) -> Option<u8> {
    if !inside(src, x, y) {
        return None;
    }
    Some(src.at(x as usize, y as usize))
}

/// Sample a pixel using bilinear interpolation between pixel centers.
///
/// Positions inside the footprint but beyond the outermost centers are
/// clamped to the edge pixels.
fn sample_bilinear(src: &Plane<'_>, x: f64, y: f64) -> Option<u8> {
    if !inside(src, x, y) {
        return None;
    }

    let max_x = (src.width - 1) as f64;
    let max_y = (src.height - 1) as f64;
    let tx = (x - 0.5).clamp(0.0, max_x);
    let ty = (y - 0.5).clamp(0.0, max_y);

    let x0 = tx.floor() as usize;
    let y0 = ty.floor() as usize;
    let x1 = (x0 + 1).min(src.width as usize - 1);
    let y1 = (y0 + 1).min(src.height as usize - 1);

    // Fractional distances
    let fx = tx - x0 as f64;
    let fy = ty - y0 as f64;

    let p00 = src.at(x0, y0) as f64;
    let p10 = src.at(x1, y0) as f64;
    let p01 = src.at(x0, y1) as f64;
    let p11 = src.at(x1, y1) as f64;

    let v = p00 * (1.0 - fx) * (1.0 - fy)
        + p10 * fx * (1.0 - fy)
        + p01 * (1.0 - fx) * fy
        + p11 * fx * fy;

    Some(v.clamp(0.0, 255.0).round() as u8)
}
