//! Rotate every image in a directory tree.

use std::path::PathBuf;

use clap::Parser;
use spindle_cli::{init_tracing, open_device, InterpolationArg};
use spindle_core::batch::{
    DEFAULT_ANGLE, DEFAULT_EXTENSION, DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR,
};
use spindle_core::report::{write_json_summary, write_log};
use spindle_core::{run_batch, BatchConfig, SoftwareDevice};

#[derive(Parser, Debug)]
#[command(
    name = "spindle-batch",
    version,
    about = "Rotate every matching image in a directory",
    after_help = "Examples:\n  spindle-batch --input-dir data/aerials --angle 30\n  spindle-batch --extension png --interpolation nearest --summary-json out.json"
)]
struct Args {
    /// Directory searched recursively for input images.
    #[arg(long = "input-dir", default_value = DEFAULT_INPUT_DIR)]
    input_dir: PathBuf,

    /// Directory receiving rotated images and the processing log.
    #[arg(long = "output-dir", default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Rotation angle in degrees, counter-clockwise.
    #[arg(long = "angle", default_value_t = DEFAULT_ANGLE, allow_negative_numbers = true)]
    angle: f64,

    /// File extension to match; a leading dot is added when missing.
    #[arg(long = "extension", default_value = DEFAULT_EXTENSION)]
    extension: String,

    /// Sampling used by the rotation.
    #[arg(long = "interpolation", value_enum, default_value_t = InterpolationArg::Linear)]
    interpolation: InterpolationArg,

    /// Optional path to also write the run summary as JSON.
    #[arg(long = "summary-json")]
    summary_json: Option<PathBuf>,
}

fn main() {
    init_tracing();
    let args = Args::parse();

    let device = SoftwareDevice::new();
    if let Err(err) = open_device(&device) {
        tracing::error!(error = %err, "Device initialisation failed");
        std::process::exit(1);
    }

    let config = match BatchConfig::new(
        args.input_dir,
        args.output_dir,
        args.angle,
        &args.extension,
        args.interpolation.into(),
    ) {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "Invalid configuration");
            std::process::exit(1);
        }
    };

    let report = match run_batch(&device, &config) {
        Ok(report) => report,
        Err(err) => {
            tracing::error!(error = %err, "Batch failed");
            std::process::exit(1);
        }
    };

    println!("{}", report.summary());

    let log_path = config.log_path();
    match write_log(&report, &log_path) {
        Ok(()) => println!("Processing log saved to: {}", log_path.display()),
        Err(err) => tracing::warn!(path = %log_path.display(), error = %err, "Failed to write processing log"),
    }

    if let Some(path) = args.summary_json {
        if let Err(err) = write_json_summary(&report, &path) {
            tracing::error!(path = %path.display(), error = %err, "Failed to write summary JSON");
            std::process::exit(1);
        }
    }

    std::process::exit(report.exit_code());
}
