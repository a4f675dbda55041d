//! Host-side image buffers and file I/O.
//!
//! A [`HostImage`] is the general-memory side of every transfer: images are
//! loaded into one, uploaded to a device, and the rotated result is
//! downloaded into another before being written back to disk.
//!
//! # Examples
//!
//! ```ignore
//! use spindle_core::host::{load_gray, save_gray};
//!
//! let image = load_gray(Path::new("teapot512.pgm"))?;
//! println!("Loaded {}x{} image", image.width(), image.height());
//! save_gray(Path::new("copy.pgm"), &image)?;
//! ```

mod io;
mod types;

pub use io::{load_gray, save_gray};
pub use types::{HostImage, ImageIoError};
