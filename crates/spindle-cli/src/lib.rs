//! Shared plumbing for the Spindle command-line tools.
//!
//! ```bash
//! spindle-batch --input-dir data/aerials --output-dir output --angle 30 --extension tiff
//! spindle-rotate --input data/teapot512.pgm --angle 90
//! ```

use std::io::IsTerminal;

use clap::ValueEnum;
use spindle_core::device::{DeviceError, RotateDevice};
use spindle_core::InterpolationMode;

/// Minimum compute capability the tools accept.
pub const REQUIRED_CAPABILITY: (u32, u32) = (1, 0);

/// Interpolation flag values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InterpolationArg {
    Nearest,
    Linear,
}

impl From<InterpolationArg> for InterpolationMode {
    fn from(arg: InterpolationArg) -> Self {
        match arg {
            InterpolationArg::Nearest => InterpolationMode::Nearest,
            InterpolationArg::Linear => InterpolationMode::Linear,
        }
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
    let ansi_enabled = std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_ansi(ansi_enabled)
        .init();
}

/// Print device version info and verify its capability.
pub fn open_device<D: RotateDevice>(device: &D) -> Result<(), DeviceError> {
    println!("{}", device.info());
    let (major, minor) = REQUIRED_CAPABILITY;
    device.check_capability(major, minor)
}
