use imgforge_av::{BackendKind, ImageFormat};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Directory scanned for source images
    #[serde(default = "default_input")]
    pub input: PathBuf,

    /// Directory converted images are written to (defaults to `input`)
    #[serde(default)]
    pub output: Option<PathBuf>,

    /// Replace outputs that already exist
    #[serde(default)]
    pub overwrite: bool,

    /// Descend into subdirectories, mirroring them under the output directory
    #[serde(default)]
    pub recursive: bool,

    #[serde(default)]
    pub conversion: ConversionConfig,
}

fn default_input() -> PathBuf {
    PathBuf::from("./data")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: default_input(),
            output: None,
            overwrite: false,
            recursive: false,
            conversion: ConversionConfig::default(),
        }
    }
}

impl Config {
    /// Output directory, falling back to the input directory.
    pub fn output_dir(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| self.input.clone())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConversionConfig {
    #[serde(default = "default_from")]
    pub from: ImageFormat,

    #[serde(default = "default_to")]
    pub to: ImageFormat,

    #[serde(default)]
    pub backend: BackendKind,

    /// Per-file limit for native tool invocations
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_from() -> ImageFormat {
    ImageFormat::Heic
}
fn default_to() -> ImageFormat {
    ImageFormat::Png
}
fn default_timeout_secs() -> u64 {
    60
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            from: default_from(),
            to: default_to(),
            backend: BackendKind::default(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ConversionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
