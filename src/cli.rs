use clap::Parser;
use imgforge::config::Config;
use imgforge_av::{BackendKind, ImageFormat};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "imgforge")]
#[command(
    author,
    version,
    about = "Convert a directory of images to another format (HEIC to PNG by default)",
    after_help = "Examples:\n  imgforge                          # Convert files in ./data\n  imgforge -i ./photos -o ./output  # Custom directories\n  imgforge --overwrite              # Overwrite existing files"
)]
pub struct Cli {
    /// Input directory containing source images (default: ./data)
    #[arg(short, long, value_name = "DIR")]
    pub input: Option<PathBuf>,

    /// Output directory for converted images (default: same as input)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Overwrite existing output files
    #[arg(long)]
    pub overwrite: bool,

    /// Descend into subdirectories, mirroring them in the output directory
    #[arg(short, long)]
    pub recursive: bool,

    /// Show what would be converted without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Source format (default: heic)
    #[arg(long, value_name = "FORMAT")]
    pub from: Option<ImageFormat>,

    /// Target format (default: png)
    #[arg(long, value_name = "FORMAT")]
    pub to: Option<ImageFormat>,

    /// Conversion backend: auto, native or library
    #[arg(long, value_name = "BACKEND")]
    pub backend: Option<BackendKind>,

    /// Per-file timeout for the native tool, in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose (debug) logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Check that external conversion tools are available and exit
    #[arg(long)]
    pub check_tools: bool,
}

impl Cli {
    /// Override config values with the flags given on the command line.
    pub fn apply(&self, config: &mut Config) {
        if let Some(ref input) = self.input {
            config.input = input.clone();
        }
        if let Some(ref output) = self.output {
            config.output = Some(output.clone());
        }
        config.overwrite |= self.overwrite;
        config.recursive |= self.recursive;
        if let Some(from) = self.from {
            config.conversion.from = from;
        }
        if let Some(to) = self.to {
            config.conversion.to = to;
        }
        if let Some(backend) = self.backend {
            config.conversion.backend = backend;
        }
        if let Some(timeout) = self.timeout {
            config.conversion.timeout_secs = timeout;
        }
    }
}
