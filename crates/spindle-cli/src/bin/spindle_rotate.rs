//! Rotate a single image file.

use std::path::PathBuf;

use clap::Parser;
use spindle_cli::{init_tracing, open_device, InterpolationArg};
use spindle_core::single::{find_sample_file, sample_search_dirs, DEFAULT_ANGLE, DEFAULT_SAMPLE};
use spindle_core::{run_single, SingleConfig, SoftwareDevice};

#[derive(Parser, Debug)]
#[command(
    name = "spindle-rotate",
    version,
    about = "Rotate a single grayscale image",
    after_help = "Examples:\n  spindle-rotate\n  spindle-rotate --input photo.pgm --output photo_r.pgm --angle -15"
)]
struct Args {
    /// Input image. Defaults to the bundled sample found on the data search path.
    #[arg(long = "input")]
    input: Option<PathBuf>,

    /// Output image. Defaults to the input with `_rotate.pgm` in place of its extension.
    #[arg(long = "output")]
    output: Option<PathBuf>,

    /// Rotation angle in degrees, counter-clockwise.
    #[arg(long = "angle", default_value_t = DEFAULT_ANGLE, allow_negative_numbers = true)]
    angle: f64,

    /// Sampling used by the rotation.
    #[arg(long = "interpolation", value_enum, default_value_t = InterpolationArg::Nearest)]
    interpolation: InterpolationArg,
}

fn main() {
    init_tracing();
    let args = Args::parse();

    let device = SoftwareDevice::new();
    if let Err(err) = open_device(&device) {
        tracing::error!(error = %err, "Device initialisation failed");
        std::process::exit(1);
    }

    let input = match args.input {
        Some(input) => input,
        None => match find_sample_file(DEFAULT_SAMPLE, &sample_search_dirs()) {
            Ok(path) => path,
            Err(err) => {
                tracing::error!(error = %err, "No input given");
                std::process::exit(1);
            }
        },
    };

    let config = match SingleConfig::new(input, args.output, args.angle, args.interpolation.into())
    {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "Invalid configuration");
            std::process::exit(1);
        }
    };

    match run_single(&device, &config) {
        Ok(report) => {
            println!(
                "Rotated {} ({}x{}) -> {} ({}x{}) in {} ms",
                report.input.display(),
                report.source_size.0,
                report.source_size.1,
                report.output.display(),
                report.output_size.0,
                report.output_size.1,
                report.elapsed.as_millis()
            );
            println!("Saved image: {}", report.output.display());
        }
        Err(err) => {
            tracing::error!(error = %err, "Rotation failed");
            std::process::exit(1);
        }
    }
}
