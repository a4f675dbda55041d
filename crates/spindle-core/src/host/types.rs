//! Core types for host-side image buffers.

use thiserror::Error;

/// Error types for loading and saving host images.
#[derive(Debug, Error)]
pub enum ImageIoError {
    /// The file does not exist or cannot be read.
    #[error("Unable to open: {path}")]
    NotFound { path: String },

    /// The file exists but could not be decoded.
    #[error("Failed to load {path}: {reason}")]
    Load { path: String, reason: String },

    /// The image could not be encoded or written.
    #[error("Failed to save {path}: {reason}")]
    Save { path: String, reason: String },

    /// Width or height is zero.
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// Pixel data length doesn't match pitch and height.
    #[error("Invalid pixel data: expected at least {expected} bytes, got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },
}

/// An 8-bit single channel image resident in host memory.
///
/// Rows are `pitch` bytes apart. Only the first `width` bytes of each row
/// carry pixels; the rest is padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostImage {
    width: u32,
    height: u32,
    pitch: usize,
    data: Vec<u8>,
}

impl HostImage {
    /// Create a zero-filled, tightly packed image.
    pub fn new(width: u32, height: u32) -> Self {
        let pitch = width as usize;
        Self {
            width,
            height,
            pitch,
            data: vec![0u8; pitch * height as usize],
        }
    }

    /// Wrap tightly packed row-major pixels.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, ImageIoError> {
        Self::with_pitch(width, height, width as usize, pixels)
    }

    /// Wrap pixels whose rows are `pitch` bytes apart.
    pub fn with_pitch(
        width: u32,
        height: u32,
        pitch: usize,
        data: Vec<u8>,
    ) -> Result<Self, ImageIoError> {
        if width == 0 || height == 0 {
            return Err(ImageIoError::InvalidDimensions { width, height });
        }
        let pitch = pitch.max(width as usize);
        let expected = pitch * (height as usize - 1) + width as usize;
        if data.len() < expected {
            return Err(ImageIoError::InvalidPixelData {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pitch,
            data,
        })
    }

    /// Create a HostImage from an image::GrayImage.
    pub fn from_gray_image(img: image::GrayImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pitch: width as usize,
            data: img.into_raw(),
        }
    }

    /// Convert to a tightly packed image::GrayImage for encoding.
    pub fn to_gray_image(&self) -> Option<image::GrayImage> {
        image::GrayImage::from_raw(self.width, self.height, self.to_packed())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Byte offset between the starts of consecutive rows.
    pub fn pitch(&self) -> usize {
        self.pitch
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Pixels of row `y`, without padding.
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.pitch;
        &self.data[start..start + self.width as usize]
    }

    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let start = y as usize * self.pitch;
        let width = self.width as usize;
        &mut self.data[start..start + width]
    }

    pub fn pixel(&self, x: u32, y: u32) -> u8 {
        self.data[y as usize * self.pitch + x as usize]
    }

    /// Copy out the pixels with padding removed.
    pub fn to_packed(&self) -> Vec<u8> {
        if self.pitch == self.width as usize {
            return self.data[..self.width as usize * self.height as usize].to_vec();
        }
        let mut out = Vec::with_capacity(self.width as usize * self.height as usize);
        for y in 0..self.height {
            out.extend_from_slice(self.row(y));
        }
        out
    }

    /// Get the total number of pixels.
    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zeroed_and_packed() {
        let img = HostImage::new(7, 3);
        assert_eq!(img.dimensions(), (7, 3));
        assert_eq!(img.pitch(), 7);
        assert!(img.to_packed().iter().all(|&p| p == 0));
        assert_eq!(img.pixel_count(), 21);
    }

    #[test]
    fn test_with_pitch_strips_padding() {
        // 3x2 image with 2 bytes of padding per row
        let data = vec![1, 2, 3, 99, 99, 4, 5, 6, 99, 99];
        let img = HostImage::with_pitch(3, 2, 5, data).unwrap();

        assert_eq!(img.pitch(), 5);
        assert_eq!(img.row(1), &[4, 5, 6]);
        assert_eq!(img.pixel(2, 0), 3);
        assert_eq!(img.to_packed(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_last_row_padding_is_optional() {
        let data = vec![1, 2, 0, 0, 3, 4];
        let img = HostImage::with_pitch(2, 2, 4, data).unwrap();
        assert_eq!(img.to_packed(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_rejects_short_buffer() {
        let err = HostImage::with_pitch(4, 4, 8, vec![0; 20]).unwrap_err();
        assert!(matches!(
            err,
            ImageIoError::InvalidPixelData {
                expected: 28,
                actual: 20
            }
        ));
    }

    #[test]
    fn test_rejects_zero_dimensions() {
        let err = HostImage::from_pixels(0, 5, vec![]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid dimensions: width (0) and height (5) must be non-zero"
        );
    }

    #[test]
    fn test_gray_image_conversion() {
        let gray = image::GrayImage::from_fn(4, 2, |x, y| image::Luma([(x + y * 4) as u8]));
        let img = HostImage::from_gray_image(gray.clone());
        assert_eq!(img.row(1), &[4, 5, 6, 7]);
        assert_eq!(img.to_gray_image().unwrap(), gray);
    }

    #[test]
    fn test_row_mut_writes_through() {
        let mut img = HostImage::new(3, 3);
        img.row_mut(2).copy_from_slice(&[7, 8, 9]);
        assert_eq!(img.pixel(1, 2), 8);
    }
}
