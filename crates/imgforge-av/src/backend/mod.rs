//! Conversion backends and capability-based selection.
//!
//! A backend converts one file. Which backend a process uses is decided once
//! by [`select_backend`] and the result is handed to whoever runs the batch.

mod library;
mod native;

pub use library::ImageLibraryBackend;
pub use native::SipsBackend;

use crate::format::ImageFormat;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// A mechanism that converts one image file to another format.
pub trait ConversionBackend {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Whether this backend can convert `from` into `to`.
    fn supports(&self, from: ImageFormat, to: ImageFormat) -> bool;

    /// Convert `source` into `destination`, encoded as `target`.
    ///
    /// `destination` is written whole; callers stage it and move it into
    /// place themselves.
    fn convert(&self, source: &Path, destination: &Path, target: ImageFormat) -> Result<()>;
}

/// Which backend to use for conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Native tool when available, otherwise the image library
    #[default]
    Auto,
    /// Platform image tool (`sips`, macOS only)
    Native,
    /// In-process decode/encode through the `image` crate
    Library,
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(BackendKind::Auto),
            "native" | "sips" => Ok(BackendKind::Native),
            "library" | "image" => Ok(BackendKind::Library),
            _ => Err(format!("Unknown backend: {}", s)),
        }
    }
}

/// Probe the host once and pick a backend able to convert `from` into `to`.
///
/// # Errors
///
/// - [`Error::ToolNotFound`] when the native backend was requested but `sips`
///   is not available on this host.
/// - [`Error::Unsupported`] when the chosen (or every) backend cannot handle
///   the format pair.
pub fn select_backend(
    kind: BackendKind,
    from: ImageFormat,
    to: ImageFormat,
    timeout: Duration,
) -> Result<Box<dyn ConversionBackend>> {
    let backend: Box<dyn ConversionBackend> = match kind {
        BackendKind::Auto => {
            match SipsBackend::detect(timeout).filter(|sips| sips.supports(from, to)) {
                Some(sips) => Box::new(sips),
                None => Box::new(ImageLibraryBackend::new()),
            }
        }
        BackendKind::Native => Box::new(
            SipsBackend::detect(timeout).ok_or_else(|| Error::tool_not_found(crate::tools::SIPS))?,
        ),
        BackendKind::Library => Box::new(ImageLibraryBackend::new()),
    };

    if !backend.supports(from, to) {
        return Err(Error::Unsupported(unsupported_message(backend.name(), from, to)));
    }

    #[cfg(feature = "tracing")]
    tracing::info!("Using {} for {} -> {} conversion", backend.name(), from.label(), to.label());

    Ok(backend)
}

fn unsupported_message(backend: &str, from: ImageFormat, to: ImageFormat) -> String {
    let mut message = format!(
        "{} cannot convert {} to {} on this host",
        backend,
        from.label(),
        to.label()
    );
    if from == ImageFormat::Heic && !cfg!(feature = "heif") {
        message.push_str(" (HEIC decoding needs macOS sips or a build with the `heif` feature)");
    }
    message
}
