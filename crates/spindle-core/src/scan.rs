//! Recursive directory scanning for input images.
//!
//! Files are returned in filesystem enumeration order, which is not
//! guaranteed to be stable across platforms. Traversal errors never abort
//! a scan; they are logged and collected next to whatever was found.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Extensions tried, in order, when the requested one matches nothing.
pub const FALLBACK_EXTENSIONS: [&str; 5] = [".pgm", ".ppm", ".jpg", ".png", ".bmp"];

/// Files found by a scan, plus any traversal errors hit along the way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    pub files: Vec<PathBuf>,
    pub errors: Vec<String>,
}

/// Outcome of [`find_images_with_fallback`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FallbackScan {
    /// Extension that produced `files`: the requested one, or the first
    /// fallback with matches. The requested one if nothing matched.
    pub extension: String,
    pub files: Vec<PathBuf>,
    pub errors: Vec<String>,
    pub used_fallback: bool,
}

/// Lowercase `ext` and make sure it starts with a dot.
///
/// ```
/// use spindle_core::scan::normalize_extension;
///
/// assert_eq!(normalize_extension("TIFF"), ".tiff");
/// assert_eq!(normalize_extension(".pgm"), ".pgm");
/// ```
pub fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{ext}")
    }
}

/// Case-insensitive extension test. `extension` must be normalized.
pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| extension.strip_prefix('.') == Some(e.to_lowercase().as_str()))
}

/// Recursively collect regular files under `root` with `extension`.
///
/// Symlinked directories are not descended into. A missing or
/// non-directory root yields an empty result.
pub fn find_images(root: &Path, extension: &str) -> ScanResult {
    let extension = normalize_extension(extension);
    let mut result = ScanResult::default();

    if !root.is_dir() {
        debug!(root = %root.display(), "Scan root is not a directory");
        return result;
    }

    for entry in WalkDir::new(root) {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_file() && has_extension(entry.path(), &extension) {
                    result.files.push(entry.into_path());
                }
            }
            Err(err) => {
                warn!(error = %err, "Filesystem error");
                result.errors.push(err.to_string());
            }
        }
    }

    result
}

/// Scan for `extension`, then for each of [`FALLBACK_EXTENSIONS`] in turn
/// until one matches.
pub fn find_images_with_fallback(root: &Path, extension: &str) -> FallbackScan {
    let requested = normalize_extension(extension);
    let primary = find_images(root, &requested);

    if !primary.files.is_empty() {
        return FallbackScan {
            extension: requested,
            files: primary.files,
            errors: primary.errors,
            used_fallback: false,
        };
    }

    info!(
        extension = %requested,
        root = %root.display(),
        "No images found, trying alternative extensions"
    );

    let mut errors = primary.errors;
    for candidate in FALLBACK_EXTENSIONS {
        let found = find_images(root, candidate);
        errors.extend(found.errors);

        if !found.files.is_empty() {
            info!(
                count = found.files.len(),
                extension = candidate,
                "Found images with alternative extension"
            );
            return FallbackScan {
                extension: candidate.to_string(),
                files: found.files,
                errors,
                used_fallback: true,
            };
        }
    }

    FallbackScan {
        extension: requested,
        files: Vec::new(),
        errors,
        used_fallback: true,
    }
}
