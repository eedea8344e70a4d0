//! In-process conversion through the `image` crate.

use crate::format::ImageFormat;
use crate::{Error, Result};
use image::DynamicImage;
use std::path::Path;

use super::ConversionBackend;

/// Backend that decodes and re-encodes images in-process.
///
/// HEIC input is decoded through libheif when the `heif` feature is enabled.
/// Everything else goes through the `image` crate. HEIC output is not
/// supported.
#[derive(Debug, Clone, Default)]
pub struct ImageLibraryBackend;

impl ImageLibraryBackend {
    /// Create a new library backend.
    pub fn new() -> Self {
        Self
    }

    /// Whether `format` can be decoded by this build.
    pub fn can_decode(format: ImageFormat) -> bool {
        match format {
            ImageFormat::Heic => cfg!(feature = "heif"),
            other => other.image_format().is_some(),
        }
    }

    /// Whether `format` can be encoded by this build.
    pub fn can_encode(format: ImageFormat) -> bool {
        format.image_format().is_some()
    }

    fn decode(source: &Path) -> Result<DynamicImage> {
        if !source.is_file() {
            return Err(Error::file_not_found(source));
        }

        if ImageFormat::Heic.matches(source) {
            return decode_heif(source);
        }

        Ok(image::open(source)?)
    }
}

impl ConversionBackend for ImageLibraryBackend {
    fn name(&self) -> &'static str {
        "image"
    }

    fn supports(&self, from: ImageFormat, to: ImageFormat) -> bool {
        Self::can_decode(from) && Self::can_encode(to)
    }

    fn convert(&self, source: &Path, destination: &Path, target: ImageFormat) -> Result<()> {
        let encoding = target.image_format().ok_or_else(|| {
            Error::Unsupported(format!("{} cannot be encoded in-process", target.label()))
        })?;

        #[cfg(feature = "tracing")]
        tracing::debug!("Converting with image library: {:?} -> {:?}", source, destination);

        let decoded = Self::decode(source)?;

        // JPEG has no alpha and the WebP/GIF/BMP encoders only take 8-bit samples.
        let prepared = match target {
            ImageFormat::Jpeg => DynamicImage::ImageRgb8(decoded.to_rgb8()),
            ImageFormat::Png | ImageFormat::Tiff => decoded,
            _ => DynamicImage::ImageRgba8(decoded.to_rgba8()),
        };

        prepared.save_with_format(destination, encoding)?;
        Ok(())
    }
}

#[cfg(feature = "heif")]
fn decode_heif(source: &Path) -> Result<DynamicImage> {
    use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

    let path = source
        .to_str()
        .ok_or_else(|| Error::InvalidInput(format!("Non UTF-8 path: {:?}", source)))?;

    let lib_heif = LibHeif::new();
    let context = HeifContext::read_from_file(path)?;
    let handle = context.primary_image_handle()?;
    let decoded = lib_heif.decode(&handle, ColorSpace::Rgb(RgbChroma::Rgba), None)?;

    let planes = decoded.planes();
    let plane = planes
        .interleaved
        .ok_or_else(|| Error::Heif("decoded image has no interleaved plane".to_string()))?;

    let width = plane.width;
    let height = plane.height;
    let row_bytes = width as usize * 4;

    let mut pixels = Vec::with_capacity(row_bytes * height as usize);
    for row in plane.data.chunks(plane.stride).take(height as usize) {
        pixels.extend_from_slice(&row[..row_bytes]);
    }

    let buffer = image::RgbaImage::from_raw(width, height, pixels)
        .ok_or_else(|| Error::Heif("decoded buffer does not match image size".to_string()))?;

    Ok(DynamicImage::ImageRgba8(buffer))
}

#[cfg(not(feature = "heif"))]
fn decode_heif(_source: &Path) -> Result<DynamicImage> {
    Err(Error::Unsupported(
        "HEIC decoding requires the `heif` feature".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};
    use tempfile::tempdir;

    fn write_sample_bmp(path: &Path) {
        let img = RgbImage::from_fn(4, 3, |x, y| Rgb([x as u8 * 60, y as u8 * 80, 200]));
        img.save_with_format(path, image::ImageFormat::Bmp).unwrap();
    }

    #[test]
    fn test_supports() {
        let backend = ImageLibraryBackend::new();
        assert!(backend.supports(ImageFormat::Bmp, ImageFormat::Png));
        assert!(backend.supports(ImageFormat::Png, ImageFormat::Jpeg));
        assert!(!backend.supports(ImageFormat::Png, ImageFormat::Heic));
        assert_eq!(
            backend.supports(ImageFormat::Heic, ImageFormat::Png),
            cfg!(feature = "heif")
        );
    }

    #[test]
    fn test_convert_bmp_to_png() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("sample.bmp");
        let destination = dir.path().join("sample.png");
        write_sample_bmp(&source);

        ImageLibraryBackend::new()
            .convert(&source, &destination, ImageFormat::Png)
            .unwrap();

        let converted = image::open(&destination).unwrap();
        assert_eq!((converted.width(), converted.height()), (4, 3));
        assert_eq!(
            image::ImageFormat::from_path(&destination).unwrap(),
            image::ImageFormat::Png
        );
        assert_eq!(converted.to_rgb8().get_pixel(1, 2), &Rgb([60, 160, 200]));
    }

    #[test]
    fn test_convert_rgba_png_to_jpeg() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("alpha.png");
        let destination = dir.path().join("alpha.jpg");
        RgbaImage::from_pixel(8, 8, Rgba([10, 20, 30, 128]))
            .save_with_format(&source, image::ImageFormat::Png)
            .unwrap();

        ImageLibraryBackend::new()
            .convert(&source, &destination, ImageFormat::Jpeg)
            .unwrap();

        let converted = image::open(&destination).unwrap();
        assert_eq!((converted.width(), converted.height()), (8, 8));
    }

    #[test]
    fn test_missing_source() {
        let dir = tempdir().unwrap();
        let err = ImageLibraryBackend::new()
            .convert(
                &dir.path().join("missing.bmp"),
                &dir.path().join("missing.png"),
                ImageFormat::Png,
            )
            .unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_corrupt_source() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("broken.bmp");
        std::fs::write(&source, b"not a bitmap").unwrap();

        let err = ImageLibraryBackend::new()
            .convert(&source, &dir.path().join("broken.png"), ImageFormat::Png)
            .unwrap_err();
        assert!(matches!(err, Error::Image(_)));
    }

    #[cfg(not(feature = "heif"))]
    #[test]
    fn test_heic_without_feature() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("photo.HEIC");
        std::fs::write(&source, b"ftypheic").unwrap();

        let err = ImageLibraryBackend::new()
            .convert(&source, &dir.path().join("photo.png"), ImageFormat::Png)
            .unwrap_err();
        assert!(matches!(err, Error::Unsupported(_)));
    }

    #[test]
    fn test_heic_target_unsupported() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("sample.bmp");
        write_sample_bmp(&source);

        let err = ImageLibraryBackend::new()
            .convert(&source, &dir.path().join("sample.heic"), ImageFormat::Heic)
            .unwrap_err();
        assert!(matches!(err, Error::Unsupported(_)));
    }
}
