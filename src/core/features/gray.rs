//! Grayscale conversion shared by the similarity strategies.

use image::{DynamicImage, GrayImage, Luma, RgbImage};
use std::borrow::Cow;

/// Rec. 601 luma: `(299·R + 587·G + 114·B + 500) / 1000`.
///
/// Grayscale input is borrowed unchanged.
pub fn to_gray(image: &DynamicImage) -> Cow<'_, GrayImage> {
    match image {
        DynamicImage::ImageLuma8(gray) => Cow::Borrowed(gray),
        DynamicImage::ImageRgb8(rgb) => Cow::Owned(rgb_to_gray(rgb)),
        other => Cow::Owned(rgb_to_gray(&other.to_rgb8())),
    }
}

fn rgb_to_gray(rgb: &RgbImage) -> GrayImage {
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        let luma = (299 * r as u32 + 587 * g as u32 + 114 * b as u32 + 500) / 1000;
        Luma([luma as u8])
    })
}
