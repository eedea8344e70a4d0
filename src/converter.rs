//! Batch conversion of a directory of images.
//!
//! [`Converter`] owns the backend chosen at startup and applies it to every
//! matching file of an input directory, one file at a time. Per-file failures
//! are logged and collected in the [`BatchReport`]; only problems with the
//! directories themselves abort a run.

use std::path::{Path, PathBuf};

use imgforge_av::workspace::is_staging_dir;
use imgforge_av::{ConversionBackend, ImageFormat, Workspace};
use walkdir::WalkDir;

/// Errors that abort a whole batch.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Input directory not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("Input path is not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },

    #[error("Failed to read input directory {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create output directory {}: {source}", path.display())]
    CreateOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Options controlling a batch run.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub source_format: ImageFormat,
    pub target_format: ImageFormat,
    /// Re-run the backend even when the destination already exists
    pub overwrite: bool,
    /// Descend into subdirectories and mirror them under the output directory
    pub recursive: bool,
    /// Report what would be converted without touching the filesystem
    pub dry_run: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            source_format: ImageFormat::Heic,
            target_format: ImageFormat::Png,
            overwrite: false,
            recursive: false,
            dry_run: false,
        }
    }
}

/// One file to convert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionTask {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// A file the backend could not convert.
#[derive(Debug, Clone)]
pub struct ConversionFailure {
    pub source: PathBuf,
    pub message: String,
}

/// Outcome of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Files successfully converted
    pub converted: usize,
    /// Files skipped because the destination already existed
    pub skipped: usize,
    /// Files a dry run would have converted
    pub planned: usize,
    pub failures: Vec<ConversionFailure>,
}

impl BatchReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Check that `path` exists, is a directory and can be listed.
pub fn check_input_dir(path: &Path) -> Result<(), BatchError> {
    if !path.exists() {
        return Err(BatchError::InputNotFound {
            path: path.to_path_buf(),
        });
    }
    if !path.is_dir() {
        return Err(BatchError::NotADirectory {
            path: path.to_path_buf(),
        });
    }
    std::fs::read_dir(path).map_err(|source| BatchError::ReadDir {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Converts every matching file of a directory with one backend.
pub struct Converter {
    backend: Box<dyn ConversionBackend>,
    options: ConvertOptions,
}

impl Converter {
    /// Create a converter around an already selected backend.
    pub fn new(backend: Box<dyn ConversionBackend>, options: ConvertOptions) -> Self {
        Self { backend, options }
    }

    /// Convert the matching files of `input_dir` into `output_dir`.
    ///
    /// `output_dir` is created if absent (except on a dry run).
    ///
    /// # Errors
    ///
    /// Returns a [`BatchError`] when the input directory is missing or
    /// unreadable, or the output directory cannot be created. Failures of
    /// individual files are reported in [`BatchReport::failures`] instead.
    pub fn run(&self, input_dir: &Path, output_dir: &Path) -> Result<BatchReport, BatchError> {
        check_input_dir(input_dir)?;

        if !self.options.dry_run {
            std::fs::create_dir_all(output_dir).map_err(|source| BatchError::CreateOutput {
                path: output_dir.to_path_buf(),
                source,
            })?;
        }

        let tasks = self.collect_tasks(input_dir, output_dir);
        tracing::debug!(
            "Found {} {} file(s) in {:?}, converting with {}",
            tasks.len(),
            self.options.source_format.label(),
            input_dir,
            self.backend.name()
        );

        let mut report = BatchReport::default();

        for task in tasks {
            let name = display_name(input_dir, &task.source);

            // Anything other than a regular file at the destination falls
            // through and is reported as a failure by the workspace.
            if task.destination.is_file() && !self.options.overwrite {
                tracing::debug!("Skipping {} (output already exists)", name);
                report.skipped += 1;
                continue;
            }

            if self.options.dry_run {
                tracing::info!("Would convert {} -> {:?}", name, task.destination);
                report.planned += 1;
                continue;
            }

            tracing::info!("Converting {}...", name);

            match self.convert_one(&task) {
                Ok(()) => {
                    report.converted += 1;
                    tracing::info!("Successfully converted {}", name);
                }
                Err(e) => {
                    tracing::error!("Failed to convert {}: {}", name, e);
                    report.failures.push(ConversionFailure {
                        source: task.source,
                        message: e.to_string(),
                    });
                }
            }
        }

        if self.options.dry_run {
            tracing::info!(
                "Dry run complete. Would convert {} file(s), {} already converted",
                report.planned,
                report.skipped
            );
        } else if report.has_failures() {
            tracing::warn!("Completed with {} error(s)", report.failures.len());
        } else {
            tracing::info!(
                "Completed successfully. Converted {} file(s)",
                report.converted
            );
        }

        Ok(report)
    }

    /// List the conversion tasks for `input_dir`, sorted by path.
    ///
    /// Entries that cannot be read below the top level are logged and left out.
    pub fn collect_tasks(&self, input_dir: &Path, output_dir: &Path) -> Vec<ConversionTask> {
        let max_depth = if self.options.recursive { usize::MAX } else { 1 };

        let walker = WalkDir::new(input_dir)
            .min_depth(1)
            .max_depth(max_depth)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !is_staging_dir(entry.path()));

        let mut tasks = Vec::new();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            let path = entry.path();
            if !entry.file_type().is_file() || !self.options.source_format.matches(path) {
                continue;
            }

            let dest_dir = match path.strip_prefix(input_dir).ok().and_then(Path::parent) {
                Some(relative) => output_dir.join(relative),
                None => output_dir.to_path_buf(),
            };

            if let Some(destination) = self.options.target_format.output_name(path, &dest_dir) {
                tasks.push(ConversionTask {
                    source: path.to_path_buf(),
                    destination,
                });
            }
        }

        tasks
    }

    fn convert_one(&self, task: &ConversionTask) -> imgforge_av::Result<()> {
        if let Some(parent) = task.destination.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let workspace = Workspace::new(&task.destination)?;
        self.backend
            .convert(&task.source, workspace.staging(), self.options.target_format)?;
        workspace.finalize()?;

        Ok(())
    }
}

fn display_name(input_dir: &Path, source: &Path) -> String {
    source
        .strip_prefix(input_dir)
        .unwrap_or(source)
        .display()
        .to_string()
}
