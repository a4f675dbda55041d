//! Loading and saving grayscale images.
//!
//! The on-disk format is chosen by the `image` crate from the file
//! extension. Color inputs are converted to 8-bit luma on load.

use std::path::Path;

use image::ImageReader;

use super::{HostImage, ImageIoError};

/// Load an image from disk as 8-bit grayscale.
///
/// # Errors
///
/// Returns `ImageIoError::NotFound` if the file cannot be opened and
/// `ImageIoError::Load` if it cannot be decoded.
pub fn load_gray(path: &Path) -> Result<HostImage, ImageIoError> {
    let display = path.display().to_string();

    if !path.is_file() {
        return Err(ImageIoError::NotFound { path: display });
    }

    let reader = ImageReader::open(path)
        .map_err(|_| ImageIoError::NotFound {
            path: display.clone(),
        })?
        .with_guessed_format()
        .map_err(|e| ImageIoError::Load {
            path: display.clone(),
            reason: e.to_string(),
        })?;

    let img = reader.decode().map_err(|e| ImageIoError::Load {
        path: display.clone(),
        reason: e.to_string(),
    })?;

    let gray = img.into_luma8();
    if gray.width() == 0 || gray.height() == 0 {
        return Err(ImageIoError::InvalidDimensions {
            width: gray.width(),
            height: gray.height(),
        });
    }

    Ok(HostImage::from_gray_image(gray))
}

/// Save a grayscale image, picking the format from the extension.
pub fn save_gray(path: &Path, image: &HostImage) -> Result<(), ImageIoError> {
    let display = path.display().to_string();

    let gray = image.to_gray_image().ok_or(ImageIoError::InvalidPixelData {
        expected: image.pixel_count() as usize,
        actual: 0,
    })?;

    gray.save(path).map_err(|e| ImageIoError::Save {
        path: display,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::unique_temp_dir;

    fn gradient(width: u32, height: u32) -> HostImage {
        let pixels = (0..width * height).map(|i| (i % 251) as u8).collect();
        HostImage::from_pixels(width, height, pixels).unwrap()
    }

    #[test]
    fn test_pgm_save_and_load() {
        let dir = unique_temp_dir("io_pgm");
        let path = dir.join("gradient.pgm");
        let img = gradient(17, 9);

        save_gray(&path, &img).unwrap();
        let loaded = load_gray(&path).unwrap();

        assert_eq!(loaded.dimensions(), (17, 9));
        assert_eq!(loaded.to_packed(), img.to_packed());
    }

    #[test]
    fn test_padded_image_saves_without_padding() {
        let dir = unique_temp_dir("io_padded");
        let path = dir.join("padded.png");
        let img = HostImage::with_pitch(2, 2, 4, vec![10, 20, 0, 0, 30, 40, 0, 0]).unwrap();

        save_gray(&path, &img).unwrap();
        let loaded = load_gray(&path).unwrap();
        assert_eq!(loaded.to_packed(), vec![10, 20, 30, 40]);
    }

    #[test]
    fn test_color_input_converted_to_luma() {
        let dir = unique_temp_dir("io_color");
        let path = dir.join("color.ppm");
        let rgb = image::RgbImage::from_pixel(3, 2, image::Rgb([200, 200, 200]));
        rgb.save(&path).unwrap();

        let loaded = load_gray(&path).unwrap();
        assert_eq!(loaded.dimensions(), (3, 2));
        assert!(loaded.to_packed().iter().all(|&p| p == 200));
    }

    #[test]
    fn test_missing_file() {
        let dir = unique_temp_dir("io_missing");
        let err = load_gray(&dir.join("nope.pgm")).unwrap_err();
        assert!(matches!(err, ImageIoError::NotFound { .. }));
        assert!(err.to_string().starts_with("Unable to open: "));
    }

    #[test]
    fn test_corrupt_file() {
        let dir = unique_temp_dir("io_corrupt");
        let path = dir.join("broken.pgm");
        std::fs::write(&path, b"not an image at all").unwrap();

        let err = load_gray(&path).unwrap_err();
        assert!(matches!(err, ImageIoError::Load { .. }));
    }

    #[test]
    fn test_unsupported_output_extension() {
        let dir = unique_temp_dir("io_ext");
        let err = save_gray(&dir.join("out.unknownext"), &gradient(2, 2)).unwrap_err();
        assert!(matches!(err, ImageIoError::Save { .. }));
    }
}
