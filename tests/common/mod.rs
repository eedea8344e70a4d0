//! Shared helpers for integration tests.
//!
//! Provides [`FakeBackend`], a conversion backend that writes a small text
//! file instead of decoding anything, so batch behaviour can be tested
//! without sips or HEIC fixtures.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use imgforge_av::{ConversionBackend, Error, ImageFormat, Result};

/// Backend that "converts" by writing the source path into the destination.
///
/// Sources whose stem starts with `bad` fail.
#[derive(Clone, Default)]
pub struct FakeBackend {
    calls: Arc<AtomicUsize>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times `convert` was invoked, across clones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ConversionBackend for FakeBackend {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn supports(&self, _from: ImageFormat, _to: ImageFormat) -> bool {
        true
    }

    fn convert(&self, source: &Path, destination: &Path, _target: ImageFormat) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        if stem.starts_with("bad") {
            // Leave a partial file behind to check it never reaches the destination.
            std::fs::write(destination, b"partial")?;
            return Err(Error::tool_failed("fake", format!("cannot decode {}", stem)));
        }

        std::fs::write(destination, source.to_string_lossy().as_bytes())?;
        Ok(())
    }
}

/// Create `names` as small files under `dir`.
pub fn touch_all(dir: &Path, names: &[&str]) {
    for name in names {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, b"fixture").unwrap();
    }
}

/// Sorted file names directly inside `dir`, ignoring directories.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}
