//! Native conversion through macOS `sips`.

use crate::command::ToolCommand;
use crate::format::ImageFormat;
use crate::tools::SIPS;
use crate::Result;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::ConversionBackend;

/// Backend that shells out to `sips -s format <fmt> <src> --out <dst>`.
#[derive(Debug, Clone)]
pub struct SipsBackend {
    program: PathBuf,
    timeout: Duration,
}

impl SipsBackend {
    /// Use the `sips` executable at `program`.
    pub fn new(program: PathBuf, timeout: Duration) -> Self {
        Self { program, timeout }
    }

    /// Locate `sips` on this host.
    ///
    /// Returns `None` off macOS, even if something named `sips` is on `PATH`.
    pub fn detect(timeout: Duration) -> Option<Self> {
        if !cfg!(target_os = "macos") {
            return None;
        }
        let program = crate::tools::require_tool(SIPS).ok()?;

        #[cfg(feature = "tracing")]
        tracing::debug!("Found sips at {:?}", program);

        Some(Self::new(program, timeout))
    }

    /// Arguments passed to `sips` for one conversion.
    fn arguments(source: &Path, destination: &Path, target: ImageFormat) -> Vec<String> {
        vec![
            "-s".to_string(),
            "format".to_string(),
            target.sips_name().to_string(),
            source.to_string_lossy().to_string(),
            "--out".to_string(),
            destination.to_string_lossy().to_string(),
        ]
    }
}

impl ConversionBackend for SipsBackend {
    fn name(&self) -> &'static str {
        SIPS
    }

    fn supports(&self, _from: ImageFormat, to: ImageFormat) -> bool {
        // sips reads WebP on recent macOS releases but cannot write it.
        to != ImageFormat::Webp
    }

    fn convert(&self, source: &Path, destination: &Path, target: ImageFormat) -> Result<()> {
        #[cfg(feature = "tracing")]
        tracing::debug!("Converting with sips: {:?} -> {:?}", source, destination);

        ToolCommand::new(self.program.clone())
            .args(Self::arguments(source, destination, target))
            .timeout(self.timeout)
            .execute()?;

        Ok(())
    }
}
