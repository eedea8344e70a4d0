//! imgforge - batch image format converter
//!
//! The library crate exposes the batch converter and configuration so the
//! conversion can be driven programmatically and from integration tests.

pub mod config;
pub mod converter;

pub use converter::{
    check_input_dir, BatchError, BatchReport, ConversionFailure, ConversionTask, ConvertOptions,
    Converter,
};

use anyhow::Result;
use imgforge_av::{command::DEFAULT_TIMEOUT, select_backend, BackendKind};
use std::path::Path;

/// Convert every HEIC file in `input_dir` to PNG.
///
/// Outputs go to `output_dir`, or next to the inputs when it is `None`.
/// Existing outputs are skipped unless `overwrite` is set. The backend is
/// picked automatically. Returns the number of files converted.
///
/// # Errors
///
/// Fails when the input directory is missing or unreadable, the output
/// directory cannot be created, or no backend on this host can decode HEIC.
/// Individual file failures are logged and not counted.
pub fn convert(input_dir: &Path, output_dir: Option<&Path>, overwrite: bool) -> Result<usize> {
    check_input_dir(input_dir)?;

    let options = ConvertOptions {
        overwrite,
        ..ConvertOptions::default()
    };
    let backend = select_backend(
        BackendKind::Auto,
        options.source_format,
        options.target_format,
        DEFAULT_TIMEOUT,
    )?;

    let report = Converter::new(backend, options).run(input_dir, output_dir.unwrap_or(input_dir))?;
    Ok(report.converted)
}
