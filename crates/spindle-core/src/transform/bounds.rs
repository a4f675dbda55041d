//! Bounding boxes of rotated rectangles.
//!
//! Angles are in degrees, positive = counter-clockwise as viewed. Image
//! coordinates have their origin at the top-left corner with y pointing
//! down, so the forward transform of a point `(x, y)` relative to the
//! rotation center is:
//!
//! ```text
//! x' =  x * cos(θ) + y * sin(θ)
//! y' = -x * sin(θ) + y * cos(θ)
//! ```

use serde::{Deserialize, Serialize};

/// Angles within this many degrees of a multiple of 90 are snapped to it.
const ANGLE_EPSILON: f64 = 0.001;

/// Floating error tolerated before rounding an extent up.
const EXTENT_EPSILON: f64 = 1e-9;

/// An integer point in source image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Geometric center of a `width` x `height` image, truncated to integers.
    pub fn center_of(width: u32, height: u32) -> Self {
        Self {
            x: (width / 2) as i32,
            y: (height / 2) as i32,
        }
    }
}

/// An axis-aligned integer rectangle. `x` and `y` may be negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// `(sin θ, cos θ)` for an angle in degrees, exact at multiples of 90.
pub(crate) fn sin_cos_degrees(angle_degrees: f64) -> (f64, f64) {
    let normalized = angle_degrees.rem_euclid(360.0);
    let quarter = (normalized / 90.0).round();

    if (normalized - quarter * 90.0).abs() < ANGLE_EPSILON {
        return match quarter as i64 % 4 {
            0 => (0.0, 1.0),
            1 => (1.0, 0.0),
            2 => (0.0, -1.0),
            _ => (-1.0, 0.0),
        };
    }

    angle_degrees.to_radians().sin_cos()
}

#[inline]
fn rotate_point(x: f64, y: f64, sin: f64, cos: f64) -> (f64, f64) {
    (x * cos + y * sin, -x * sin + y * cos)
}

/// Rotate the corners and return `(min_x, max_x, min_y, max_y)`.
fn rotated_extents(corners: [(f64, f64); 4], sin: f64, cos: f64) -> (f64, f64, f64, f64) {
    corners.iter().fold(
        (
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::INFINITY,
            f64::NEG_INFINITY,
        ),
        |(min_x, max_x, min_y, max_y), &(x, y)| {
            let (rx, ry) = rotate_point(x, y, sin, cos);
            (min_x.min(rx), max_x.max(rx), min_y.min(ry), max_y.max(ry))
        },
    )
}

#[inline]
fn span(extent: f64) -> u32 {
    // NaN and negative values saturate to 0 in the cast
    ((extent - EXTENT_EPSILON).ceil() as u32).max(1)
}

/// Index of the first pixel whose center `i + 0.5` is at or after `edge`.
#[inline]
fn first_center(edge: f64) -> i32 {
    (edge - 0.5 - EXTENT_EPSILON).ceil() as i32
}

/// Compute the dimensions of the bounding box for a rotated image.
///
/// Rotates the four corner offsets `(±w/2, ±h/2)` about the origin and
/// rounds each axis extent up, so the result always contains the whole
/// rotated footprint. Each dimension is at least 1.
///
/// Equivalent to `W' = |w·cos θ| + |h·sin θ|`, `H' = |w·sin θ| + |h·cos θ|`
/// rounded up.
///
/// # Example
///
/// ```
/// use spindle_core::transform::rotated_bounds;
///
/// // 90-degree rotation swaps dimensions
/// assert_eq!(rotated_bounds(100, 50, 90.0), (50, 100));
///
/// // No rotation preserves dimensions
/// assert_eq!(rotated_bounds(100, 50, 0.0), (100, 50));
/// ```
pub fn rotated_bounds(width: u32, height: u32, angle_degrees: f64) -> (u32, u32) {
    let (sin, cos) = sin_cos_degrees(angle_degrees);
    let hw = width as f64 / 2.0;
    let hh = height as f64 / 2.0;

    let (min_x, max_x, min_y, max_y) =
        rotated_extents([(-hw, -hh), (hw, -hh), (hw, hh), (-hw, hh)], sin, cos);

    (span(max_x - min_x), span(max_y - min_y))
}

/// Destination rectangle for rotating a `width` x `height` image about
/// `center`.
///
/// The size always equals [`rotated_bounds`]. The origin is the first pixel
/// whose center lies inside the rotated footprint, so destination pixel
/// `(dx, dy)` corresponds to the rotated-frame pixel `(x + dx, y + dy)`.
/// A run of `ceil(extent)` pixels starting there covers every pixel center
/// in the footprint.
pub fn rotated_rect(width: u32, height: u32, angle_degrees: f64, center: Point) -> Rect {
    let (sin, cos) = sin_cos_degrees(angle_degrees);
    let cx = center.x as f64;
    let cy = center.y as f64;
    let w = width as f64;
    let h = height as f64;

    let (min_x, _, min_y, _) = rotated_extents(
        [(-cx, -cy), (w - cx, -cy), (w - cx, h - cy), (-cx, h - cy)],
        sin,
        cos,
    );

    let (out_w, out_h) = rotated_bounds(width, height, angle_degrees);

    Rect {
        x: first_center(cx + min_x),
        y: first_center(cy + min_y),
        width: out_w,
        height: out_h,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_no_rotation_bounds() {
        assert_eq!(rotated_bounds(100, 50, 0.0), (100, 50));
        assert_eq!(rotated_bounds(1, 1, 0.0), (1, 1));
    }

    #[test]
    fn test_tiny_rotation_snaps_to_zero() {
        assert_eq!(rotated_bounds(100, 50, 0.0001), (100, 50));
        assert_eq!(rotated_bounds(100, 50, -0.0001), (100, 50));
    }

    #[test]
    fn test_90_degree_rotation_bounds() {
        assert_eq!(rotated_bounds(100, 50, 90.0), (50, 100));
        assert_eq!(rotated_bounds(100, 50, -90.0), (50, 100));
    }

    #[test]
    fn test_180_and_270_degree_rotation_bounds() {
        assert_eq!(rotated_bounds(100, 50, 180.0), (100, 50));
        assert_eq!(rotated_bounds(100, 50, 270.0), (50, 100));
    }

    #[test]
    fn test_45_degree_rotation_bounds() {
        // Diagonal of 100x100 square is ~141.42, rounded up
        assert_eq!(rotated_bounds(100, 100, 45.0), (142, 142));
    }

    #[test]
    fn test_30_degree_rotation_bounds() {
        // 100*cos30 + 50*sin30 = 111.60, 100*sin30 + 50*cos30 = 93.30
        assert_eq!(rotated_bounds(100, 50, 30.0), (112, 94));
    }

    #[test]
    fn test_large_rotation_angles() {
        assert_eq!(rotated_bounds(100, 50, 720.0), (100, 50));
        assert_eq!(rotated_bounds(100, 50, 450.0), (50, 100));
        assert_eq!(rotated_bounds(100, 50, -630.0), (50, 100));
    }

    #[test]
    fn test_opposite_rotations_same_bounds() {
        assert_eq!(rotated_bounds(100, 80, 30.0), rotated_bounds(100, 80, -30.0));
    }

    #[test]
    fn test_bounds_never_zero() {
        for angle in [1.0, 15.0, 45.0, 89.0, 90.0, 135.0, 179.0, 180.0, 270.0, 359.0] {
            let (w, h) = rotated_bounds(1, 1, angle);
            assert!(w > 0, "Width should be > 0 for angle {}", angle);
            assert!(h > 0, "Height should be > 0 for angle {}", angle);
        }
    }

    #[test]
    fn test_non_finite_angle_clamps_to_one() {
        assert_eq!(rotated_bounds(10, 10, f64::NAN), (1, 1));
    }

    #[test]
    fn test_sin_cos_snapping() {
        assert_eq!(sin_cos_degrees(0.0), (0.0, 1.0));
        assert_eq!(sin_cos_degrees(90.0), (1.0, 0.0));
        assert_eq!(sin_cos_degrees(-90.0), (-1.0, 0.0));
        assert_eq!(sin_cos_degrees(180.0005), (0.0, -1.0));
        assert_eq!(sin_cos_degrees(359.9999), (0.0, 1.0));

        let (sin, cos) = sin_cos_degrees(30.0);
        assert!((sin - 0.5).abs() < 1e-12);
        assert!((cos - 3f64.sqrt() / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_center_truncates() {
        assert_eq!(Point::center_of(5, 4), Point::new(2, 2));
        assert_eq!(Point::center_of(1, 1), Point::new(0, 0));
    }

    #[test]
    fn test_rect_identity() {
        let rect = rotated_rect(7, 5, 0.0, Point::center_of(7, 5));
        assert_eq!(rect, Rect::new(0, 0, 7, 5));
    }

    #[test]
    fn test_rect_half_turn_odd_width() {
        // Center (2, 1): the flipped footprint spans x in [-1, 4)
        let rect = rotated_rect(5, 3, 180.0, Point::center_of(5, 3));
        assert_eq!(rect, Rect::new(-1, -1, 5, 3));
    }

    #[test]
    fn test_rect_quarter_turn() {
        let rect = rotated_rect(4, 2, 90.0, Point::center_of(4, 2));
        assert_eq!(rect, Rect::new(1, -1, 2, 4));
    }

    #[test]
    fn test_rect_size_matches_bounds() {
        for angle in [12.5, 45.0, 133.0, -61.0, 300.0] {
            let rect = rotated_rect(64, 48, angle, Point::center_of(64, 48));
            assert_eq!(rect.size(), rotated_bounds(64, 48, angle));
        }
    }

    /// Pixels in the one-pixel ring around `rect` whose centers map back
    /// inside the source image.
    fn uncovered_ring_pixels(width: u32, height: u32, angle: f64) -> Vec<(i64, i64)> {
        let center = Point::center_of(width, height);
        let rect = rotated_rect(width, height, angle, center);
        let (sin, cos) = sin_cos_degrees(angle);
        let (cx, cy) = (center.x as f64, center.y as f64);
        let (w, h) = (width as f64, height as f64);
        let margin = 1e-6;

        let (x0, y0) = (rect.x as i64 - 1, rect.y as i64 - 1);
        let (x1, y1) = (
            rect.x as i64 + rect.width as i64,
            rect.y as i64 + rect.height as i64,
        );

        let mut hits = Vec::new();
        for py in y0..=y1 {
            for px in x0..=x1 {
                if px != x0 && px != x1 && py != y0 && py != y1 {
                    continue;
                }
                let rx = px as f64 + 0.5 - cx;
                let ry = py as f64 + 0.5 - cy;
                let sx = rx * cos - ry * sin + cx;
                let sy = rx * sin + ry * cos + cy;
                if sx > margin && sy > margin && sx < w - margin && sy < h - margin {
                    hits.push((px, py));
                }
            }
        }
        hits
    }

    #[test]
    fn test_rect_covers_small_odd_footprint() {
        // Flooring the footprint edge here used to drop the last row and column
        let rect = rotated_rect(2, 3, 19.0, Point::center_of(2, 3));
        assert_eq!(rect.size(), rotated_bounds(2, 3, 19.0));
        assert_eq!(uncovered_ring_pixels(2, 3, 19.0), vec![]);
    }

    #[test]
    fn test_rect_covers_footprint_sweep() {
        for width in 1..=12 {
            for height in 1..=12 {
                for angle in [7.0, 19.0, 33.3, 45.0, 61.0, 120.0, 200.5, -17.0] {
                    let hits = uncovered_ring_pixels(width, height, angle);
                    assert!(
                        hits.is_empty(),
                        "{}x{} at {}: {:?}",
                        width,
                        height,
                        angle,
                        hits
                    );
                }
            }
        }
    }

    fn dimensions_strategy() -> impl Strategy<Value = (u32, u32)> {
        (1u32..=4000, 1u32..=4000)
    }

    fn angle_strategy() -> impl Strategy<Value = f64> {
        -720.0f64..720.0
    }

    fn close(a: (u32, u32), b: (u32, u32)) -> bool {
        a.0.abs_diff(b.0) <= 1 && a.1.abs_diff(b.1) <= 1
    }

    proptest! {
        /// Property: Output dimensions are always positive.
        #[test]
        fn prop_bounds_positive(
            (width, height) in dimensions_strategy(),
            angle in angle_strategy(),
        ) {
            let (w, h) = rotated_bounds(width, height, angle);
            prop_assert!(w >= 1, "Width should be at least 1");
            prop_assert!(h >= 1, "Height should be at least 1");
        }

        /// Property: A half turn does not change the bounding box.
        #[test]
        fn prop_half_turn_symmetry(
            (width, height) in dimensions_strategy(),
            angle in angle_strategy(),
        ) {
            let a = rotated_bounds(width, height, angle);
            let b = rotated_bounds(width, height, angle + 180.0);
            prop_assert!(close(a, b), "{:?} vs {:?} at {}", a, b, angle);
        }

        /// Property: Swapping the sides and adding a quarter turn gives the same box.
        #[test]
        fn prop_quarter_turn_transpose(
            (width, height) in dimensions_strategy(),
            angle in angle_strategy(),
        ) {
            let a = rotated_bounds(width, height, angle);
            let b = rotated_bounds(height, width, angle + 90.0);
            prop_assert!(close(a, b), "{:?} vs {:?} at {}", a, b, angle);
        }

        /// Property: The box never undercuts the closed-form extent.
        #[test]
        fn prop_bounds_contain_footprint(
            (width, height) in dimensions_strategy(),
            angle in angle_strategy(),
        ) {
            // Snapped angles are covered by the exact tests above
            let off_axis = (angle.rem_euclid(90.0)).min(90.0 - angle.rem_euclid(90.0));
            prop_assume!(off_axis > 0.01);

            let (sin, cos) = angle.to_radians().sin_cos();
            let (w, h) = (width as f64, height as f64);
            let exact_w = (w * cos).abs() + (h * sin).abs();
            let exact_h = (w * sin).abs() + (h * cos).abs();

            let (bw, bh) = rotated_bounds(width, height, angle);
            prop_assert!(bw as f64 >= exact_w - 1e-3);
            prop_assert!(bh as f64 >= exact_h - 1e-3);
            prop_assert!((bw as f64) < exact_w + 1.0 + 1e-3);
            prop_assert!((bh as f64) < exact_h + 1.0 + 1e-3);
        }

        /// Property: No pixel just outside the rectangle belongs to the footprint.
        #[test]
        fn prop_rect_covers_footprint(
            width in 1u32..=64,
            height in 1u32..=64,
            angle in angle_strategy(),
        ) {
            let hits = uncovered_ring_pixels(width, height, angle);
            prop_assert!(hits.is_empty(), "{}x{} at {}: {:?}", width, height, angle, hits);
        }
    }
}
