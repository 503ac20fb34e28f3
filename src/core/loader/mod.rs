//! # Loader Module
//!
//! Decodes source screenshots into images the slicer accepts.
//!
//! Uses zune-jpeg for JPEG files and falls back to the image crate for
//! everything else. Decoded images are normalized to 8-bit grayscale or
//! 8-bit RGB.

use crate::error::LoadError;
use image::{DynamicImage, ImageBuffer, ImageReader, Luma, Rgb};
use std::fs;
use std::io::Cursor;
use std::path::Path;
use zune_core::colorspace::ColorSpace;
use zune_core::options::DecoderOptions;
use zune_jpeg::JpegDecoder;

/// Formats with a dedicated decode path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Other,
}

impl ImageFormat {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref()
        {
            Some("jpg" | "jpeg") => Self::Jpeg,
            _ => Self::Other,
        }
    }
}

/// Decodes image files from disk
pub struct ImageLoader;

impl ImageLoader {
    /// Decode `path` and normalize it to `Luma8` or `Rgb8`.
    ///
    /// JPEG files that zune-jpeg cannot handle are retried with the image
    /// crate before giving up.
    pub fn load(path: &Path) -> Result<DynamicImage, LoadError> {
        let bytes = fs::read(path).map_err(|e| LoadError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let image = match ImageFormat::from_path(path) {
            ImageFormat::Jpeg => {
                Self::decode_jpeg(path, &bytes).or_else(|_| Self::decode_fallback(path, &bytes))?
            }
            ImageFormat::Other => Self::decode_fallback(path, &bytes)?,
        };

        if image.width() == 0 || image.height() == 0 {
            return Err(LoadError::EmptyImage {
                path: path.to_path_buf(),
            });
        }

        Ok(normalize(image))
    }

    fn decode_jpeg(path: &Path, bytes: &[u8]) -> Result<DynamicImage, LoadError> {
        let options = DecoderOptions::new_fast().jpeg_set_out_colorspace(ColorSpace::RGB);
        let mut decoder = JpegDecoder::new_with_options(bytes, options);

        let pixels = decoder.decode().map_err(|e| LoadError::DecodeError {
            path: path.to_path_buf(),
            reason: format!("zune-jpeg decode failed: {:?}", e),
        })?;

        let info = decoder.info().ok_or_else(|| LoadError::DecodeError {
            path: path.to_path_buf(),
            reason: "Failed to get image info".to_string(),
        })?;
        let width = info.width as u32;
        let height = info.height as u32;

        let buffer_error = |kind: &str| LoadError::DecodeError {
            path: path.to_path_buf(),
            reason: format!("Failed to create {} buffer", kind),
        };

        match decoder.get_output_colorspace().unwrap_or(ColorSpace::RGB) {
            ColorSpace::RGB => {
                let buffer: ImageBuffer<Rgb<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels).ok_or_else(|| buffer_error("RGB"))?;
                Ok(DynamicImage::ImageRgb8(buffer))
            }
            ColorSpace::Luma => {
                let buffer: ImageBuffer<Luma<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels).ok_or_else(|| buffer_error("Luma"))?;
                Ok(DynamicImage::ImageLuma8(buffer))
            }
            other => Err(LoadError::DecodeError {
                path: path.to_path_buf(),
                reason: format!("unsupported JPEG output colorspace {:?}", other),
            }),
        }
    }

    fn decode_fallback(path: &Path, bytes: &[u8]) -> Result<DynamicImage, LoadError> {
        let decode_error = |reason: String| LoadError::DecodeError {
            path: path.to_path_buf(),
            reason,
        };

        ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| decode_error(e.to_string()))?
            .decode()
            .map_err(|e| decode_error(e.to_string()))
    }
}

/// Keep 8-bit gray and 8-bit RGB as they are, convert everything else to RGB
fn normalize(image: DynamicImage) -> DynamicImage {
    match image {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => image,
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    }
}
