//! Staging workspace for a single conversion.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Prefix of the hidden staging directories created next to outputs.
pub const STAGING_PREFIX: &str = ".imgforge-";

/// Workspace for one conversion.
///
/// Provides a hidden temporary directory beside the destination so that the
/// backend writes to a staging path and the finished file is moved into place
/// with a same-filesystem rename. Dropping the workspace without finalizing
/// discards whatever the backend produced.
///
/// # Example
///
/// ```no_run
/// use imgforge_av::Workspace;
///
/// let workspace = Workspace::new("/photos/out/IMG_0001.png")?;
/// // Let a backend write to workspace.staging()
/// workspace.finalize()?;
/// # Ok::<(), imgforge_av::Error>(())
/// ```
pub struct Workspace {
    temp_dir: TempDir,
    staging_path: PathBuf,
    destination: PathBuf,
}

impl Workspace {
    /// Create a workspace for producing `destination`.
    ///
    /// The destination's parent directory must already exist, and the
    /// destination itself must be absent or a regular file.
    pub fn new<P: AsRef<Path>>(destination: P) -> Result<Self> {
        let destination = destination.as_ref();
        ensure_replaceable(destination)?;

        let file_name = destination
            .file_name()
            .ok_or_else(|| Error::InvalidInput("Invalid destination file path".to_string()))?;
        let parent = match destination.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        let temp_dir = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(parent)
            .map_err(|e| Error::Workspace(format!("Failed to create staging directory: {}", e)))?;

        let staging_path = temp_dir.path().join(file_name);

        Ok(Self {
            temp_dir,
            staging_path,
            destination: destination.to_path_buf(),
        })
    }

    /// Path the backend should write to.
    pub fn staging(&self) -> &Path {
        &self.staging_path
    }

    /// Move the staged output onto the destination.
    ///
    /// An existing destination is first renamed to a backup; if the move
    /// fails the backup is restored. Only regular files are ever replaced.
    pub fn finalize(self) -> Result<PathBuf> {
        let dest = &self.destination;
        ensure_replaceable(dest)?;

        if !self.staging_path.is_file() {
            return Err(Error::Workspace(format!(
                "Backend produced no output at {:?}",
                self.staging_path
            )));
        }

        if dest.exists() {
            let backup = self.temp_dir.path().join(".previous");
            std::fs::rename(dest, &backup).map_err(|e| {
                Error::Workspace(format!("Failed to back up existing output: {}", e))
            })?;

            if let Err(e) = std::fs::rename(&self.staging_path, dest) {
                let _ = std::fs::rename(&backup, dest);
                return Err(Error::Workspace(format!(
                    "Failed to move output to destination: {}",
                    e
                )));
            }
        } else {
            std::fs::rename(&self.staging_path, dest).map_err(|e| {
                Error::Workspace(format!("Failed to move output to destination: {}", e))
            })?;
        }

        Ok(dest.clone())
    }
}

/// Refuse destinations that exist but are not regular files.
///
/// The backup of a replaced destination lives inside the staging directory
/// and is removed with it, so replacing a directory would delete its contents.
fn ensure_replaceable(dest: &Path) -> Result<()> {
    if dest.exists() && !dest.is_file() {
        return Err(Error::Workspace(format!(
            "Destination exists and is not a regular file: {}",
            dest.display()
        )));
    }
    Ok(())
}

/// Whether `path` is a staging directory created by [`Workspace`].
pub fn is_staging_dir(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(STAGING_PREFIX))
}
