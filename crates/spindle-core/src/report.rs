//! Processing log and JSON summary for batch runs.

use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use chrono::Local;

use crate::batch::BatchReport;

/// Render the plain-text processing log.
///
/// `Processed files` lists every discovered input, whether or not it was
/// rotated successfully.
pub fn render_log(report: &BatchReport, date: &str) -> String {
    let config = &report.config;
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(out, "Spindle Image Rotation Processing Log");
    let _ = writeln!(out, "=====================================");
    let _ = writeln!(out);
    let _ = writeln!(out, "Date: {date}");
    let _ = writeln!(out, "Input directory: {}", config.input_dir().display());
    let _ = writeln!(out, "Output directory: {}", config.output_dir().display());
    let _ = writeln!(out, "Rotation angle: {} degrees", config.angle());
    let _ = writeln!(out, "Interpolation: {}", config.interpolation());
    let _ = writeln!(out, "Extension filter: {}", report.extension);
    let _ = writeln!(out);
    let _ = writeln!(out, "Results:");
    let _ = writeln!(out, "  Total images: {}", report.files.len());
    let _ = writeln!(out, "  Successful: {}", report.succeeded);
    let _ = writeln!(out, "  Failed: {}", report.failed);
    let _ = writeln!(out, "  Total time: {} ms", report.total_ms());
    let _ = writeln!(out, "  Average time: {} ms", report.average_ms());
    let _ = writeln!(out);
    let _ = writeln!(out, "Processed files:");
    for file in &report.files {
        let _ = writeln!(out, "  - {}", file.display());
    }

    if report.failed > 0 {
        let _ = writeln!(out);
        let _ = writeln!(out, "Failures:");
        for record in report.failures() {
            let _ = writeln!(
                out,
                "  {}: {}",
                record.input.display(),
                record.outcome.describe()
            );
        }
    }

    if !report.overwritten.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Overwritten outputs:");
        for path in &report.overwritten {
            let _ = writeln!(out, "  {}", path.display());
        }
    }

    if !report.scan_errors.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Scan errors:");
        for err in &report.scan_errors {
            let _ = writeln!(out, "  {err}");
        }
    }

    out
}

/// Write the processing log to `path`, stamped with the local time.
pub fn write_log(report: &BatchReport, path: &Path) -> io::Result<()> {
    let date = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    fs::write(path, render_log(report, &date))
}

/// Write the full report as pretty-printed JSON.
pub fn write_json_summary(report: &BatchReport, path: &Path) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.write_all(b"\n")?;
    writer.flush()
}
