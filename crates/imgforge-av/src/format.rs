//! Image format descriptors.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Image formats the converter knows how to name, match and hand to a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ImageFormat {
    /// High Efficiency Image Container
    Heic,
    /// Portable Network Graphics
    Png,
    /// JPEG
    Jpeg,
    /// Tagged Image File Format
    Tiff,
    /// Windows bitmap
    Bmp,
    /// Graphics Interchange Format
    Gif,
    /// WebP
    Webp,
}

impl ImageFormat {
    /// Canonical file extension, lowercase, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Heic => "heic",
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Tiff => "tiff",
            ImageFormat::Bmp => "bmp",
            ImageFormat::Gif => "gif",
            ImageFormat::Webp => "webp",
        }
    }

    /// Short uppercase label for user-facing messages.
    pub fn label(&self) -> &'static str {
        match self {
            ImageFormat::Heic => "HEIC",
            ImageFormat::Png => "PNG",
            ImageFormat::Jpeg => "JPEG",
            ImageFormat::Tiff => "TIFF",
            ImageFormat::Bmp => "BMP",
            ImageFormat::Gif => "GIF",
            ImageFormat::Webp => "WebP",
        }
    }

    /// Whether `path` carries this format's extension, ignoring ASCII case.
    ///
    /// Only the canonical extension matches, so two inputs in one directory
    /// can never map to the same destination.
    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(self.extension()))
    }

    /// Name `path` would have after conversion to this format: same stem,
    /// this format's extension, placed under `dir`.
    pub fn output_name(&self, path: &Path, dir: &Path) -> Option<PathBuf> {
        let stem = path.file_stem()?;
        let mut name = stem.to_os_string();
        name.push(".");
        name.push(self.extension());
        Some(dir.join(name))
    }

    /// Matching `image` crate format, if the library can handle it.
    pub(crate) fn image_format(&self) -> Option<image::ImageFormat> {
        match self {
            ImageFormat::Heic => None,
            ImageFormat::Png => Some(image::ImageFormat::Png),
            ImageFormat::Jpeg => Some(image::ImageFormat::Jpeg),
            ImageFormat::Tiff => Some(image::ImageFormat::Tiff),
            ImageFormat::Bmp => Some(image::ImageFormat::Bmp),
            ImageFormat::Gif => Some(image::ImageFormat::Gif),
            ImageFormat::Webp => Some(image::ImageFormat::WebP),
        }
    }

    /// Format name understood by `sips -s format`.
    pub(crate) fn sips_name(&self) -> &'static str {
        match self {
            ImageFormat::Heic => "heic",
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Tiff => "tiff",
            ImageFormat::Bmp => "bmp",
            ImageFormat::Gif => "gif",
            ImageFormat::Webp => "webp",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl std::str::FromStr for ImageFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim_start_matches('.').to_lowercase().as_str() {
            "heic" | "heif" => Ok(ImageFormat::Heic),
            "png" => Ok(ImageFormat::Png),
            "jpg" | "jpeg" => Ok(ImageFormat::Jpeg),
            "tiff" | "tif" => Ok(ImageFormat::Tiff),
            "bmp" => Ok(ImageFormat::Bmp),
            "gif" => Ok(ImageFormat::Gif),
            "webp" => Ok(ImageFormat::Webp),
            _ => Err(format!("Unknown image format: {}", s)),
        }
    }
}

impl TryFrom<String> for ImageFormat {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ImageFormat> for String {
    fn from(format: ImageFormat) -> Self {
        format.extension().to_string()
    }
}
