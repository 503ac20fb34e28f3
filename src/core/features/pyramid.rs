//! Scale pyramid built with SIMD-accelerated resizing.
//!
//! Uses fast_image_resize, which picks AVX2/NEON kernels when available.

use crate::error::ScoreError;
use fast_image_resize::{images::Image, PixelType, ResizeOptions, Resizer};
use image::{GrayImage, ImageBuffer, Luma};

/// One pyramid level and the factor mapping its coordinates back to level 0
#[derive(Debug, Clone)]
pub struct PyramidLevel {
    pub image: GrayImage,
    pub scale: f32,
}

/// Grayscale resizer reused across the levels of one pyramid
pub struct FastResizer {
    resizer: Resizer,
}

impl FastResizer {
    pub fn new() -> Self {
        Self {
            resizer: Resizer::new(),
        }
    }

    /// Resize a grayscale image with a bilinear filter
    pub fn resize_gray(
        &mut self,
        gray: &GrayImage,
        width: u32,
        height: u32,
    ) -> Result<GrayImage, ScoreError> {
        if gray.width() == 0 || gray.height() == 0 || width == 0 || height == 0 {
            return Err(ScoreError::Pyramid {
                reason: format!(
                    "cannot resize {}x{} to {}x{}",
                    gray.width(),
                    gray.height(),
                    width,
                    height
                ),
            });
        }

        let src_image = Image::from_vec_u8(
            gray.width(),
            gray.height(),
            gray.as_raw().clone(),
            PixelType::U8,
        )
        .map_err(|e| ScoreError::Pyramid {
            reason: format!("failed to create source image: {}", e),
        })?;

        let mut dst_image = Image::new(width, height, PixelType::U8);

        let options = ResizeOptions::new().resize_alg(fast_image_resize::ResizeAlg::Convolution(
            fast_image_resize::FilterType::Bilinear,
        ));

        self.resizer
            .resize(&src_image, &mut dst_image, &options)
            .map_err(|e| ScoreError::Pyramid {
                reason: format!("resize failed: {}", e),
            })?;

        let buffer: ImageBuffer<Luma<u8>, Vec<u8>> =
            ImageBuffer::from_raw(width, height, dst_image.into_vec()).ok_or_else(|| {
                ScoreError::Pyramid {
                    reason: "failed to create result buffer".to_string(),
                }
            })?;

        Ok(buffer)
    }
}

impl Default for FastResizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Build up to `levels` levels, each `scale_factor` times smaller than the last.
///
/// Stops early once a level is no larger than `min_side` in either dimension.
pub fn build_pyramid(
    base: &GrayImage,
    levels: usize,
    scale_factor: f32,
    min_side: u32,
) -> Result<Vec<PyramidLevel>, ScoreError> {
    let mut pyramid = Vec::with_capacity(levels);
    if base.width() <= min_side || base.height() <= min_side {
        return Ok(pyramid);
    }

    pyramid.push(PyramidLevel {
        image: base.clone(),
        scale: 1.0,
    });

    let mut resizer = FastResizer::new();
    for level in 1..levels {
        let scale = scale_factor.powi(level as i32);
        let width = (base.width() as f32 / scale).round() as u32;
        let height = (base.height() as f32 / scale).round() as u32;
        if width <= min_side || height <= min_side {
            break;
        }

        let image = resizer.resize_gray(base, width, height)?;
        pyramid.push(PyramidLevel { image, scale });
    }

    Ok(pyramid)
}
