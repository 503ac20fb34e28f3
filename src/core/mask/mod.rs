//! # Mask Module
//!
//! Blacks out decorative colors (backgrounds, borders, UI chrome) so that
//! tiles sharing the same frame are not scored as similar because of it.
//!
//! Each palette color defines an inclusive per-channel band of
//! `color ± tolerance`, clamped to `0..=255`. A pixel inside the band on all
//! three channels becomes black. The transform is pure: the input image is
//! never touched and the output is always 3-channel.

use crate::core::tile::Tile;
use crate::error::TileDiffError;
use image::{DynamicImage, Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Default per-channel half-width of a mask band
pub const DEFAULT_TOLERANCE: f64 = 30.0;

/// A palette color in blue, green, red channel order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BgrColor {
    pub b: u8,
    pub g: u8,
    pub r: u8,
}

impl BgrColor {
    pub fn new(b: u8, g: u8, r: u8) -> Self {
        Self { b, g, r }
    }

    /// Channels in the order pixels are stored in an `RgbImage`
    fn to_rgb(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl FromStr for BgrColor {
    type Err = TileDiffError;

    /// Parse `#RRGGBB` or `RRGGBB`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        let invalid = || TileDiffError::Config(format!("invalid color '{}', expected #RRGGBB", s));

        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| invalid())
        };

        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }
}

impl std::fmt::Display for BgrColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Inclusive per-channel band, stored in RGB order
#[derive(Debug, Clone, Copy)]
struct Band {
    low: [u8; 3],
    high: [u8; 3],
}

impl Band {
    fn around(color: BgrColor, tolerance: f64) -> Self {
        let center = color.to_rgb();
        let clamp = |v: f64| v.clamp(0.0, 255.0) as u8;

        let mut low = [0u8; 3];
        let mut high = [0u8; 3];
        for channel in 0..3 {
            let c = center[channel] as f64;
            low[channel] = clamp((c - tolerance).ceil());
            high[channel] = clamp((c + tolerance).floor());
        }
        Self { low, high }
    }

    fn contains(&self, pixel: &Rgb<u8>) -> bool {
        (0..3).all(|c| self.low[c] <= pixel[c] && pixel[c] <= self.high[c])
    }
}

/// Palette of colors to black out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorMask {
    palette: Vec<BgrColor>,
    tolerance: f64,
}

impl ColorMask {
    /// Create a mask. Negative (or NaN) tolerance is treated as zero.
    pub fn new(palette: Vec<BgrColor>, tolerance: f64) -> Self {
        let tolerance = if tolerance.is_nan() { 0.0 } else { tolerance.max(0.0) };
        Self { palette, tolerance }
    }

    pub fn palette(&self) -> &[BgrColor] {
        &self.palette
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn is_empty(&self) -> bool {
        self.palette.is_empty()
    }

    /// Return a masked RGB copy of `image`
    pub fn apply(&self, image: &DynamicImage) -> DynamicImage {
        let mut rgb: RgbImage = image.to_rgb8();
        let bands: Vec<Band> = self
            .palette
            .iter()
            .map(|&color| Band::around(color, self.tolerance))
            .collect();

        if !bands.is_empty() {
            for pixel in rgb.pixels_mut() {
                if bands.iter().any(|band| band.contains(pixel)) {
                    *pixel = Rgb([0, 0, 0]);
                }
            }
        }

        DynamicImage::ImageRgb8(rgb)
    }

    /// Return a masked copy of `tile`, keeping its provenance
    pub fn apply_tile(&self, tile: &Tile) -> Tile {
        tile.with_image(self.apply(tile.image()))
    }
}

impl Default for ColorMask {
    fn default() -> Self {
        Self::new(Vec::new(), DEFAULT_TOLERANCE)
    }
}

/// Mask `image` with an ad-hoc palette
pub fn apply_mask(image: &DynamicImage, palette: &[BgrColor], tolerance: f64) -> DynamicImage {
    ColorMask::new(palette.to_vec(), tolerance).apply(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageBuffer;

    fn striped_image() -> DynamicImage {
        // Columns: near-white chrome, saturated red, mid gray, near-white
        let img = ImageBuffer::from_fn(40, 10, |x, _| match x / 10 {
            0 => Rgb([250, 245, 240]),
            1 => Rgb([200, 10, 10]),
            2 => Rgb([128, 128, 128]),
            _ => Rgb([230, 230, 230]),
        });
        DynamicImage::ImageRgb8(img)
    }

    fn pixel(image: &DynamicImage, x: u32, y: u32) -> [u8; 3] {
        image.as_rgb8().unwrap().get_pixel(x, y).0
    }

    #[test]
    fn in_band_pixels_become_black() {
        let white = BgrColor::new(255, 255, 255);
        let masked = apply_mask(&striped_image(), &[white], DEFAULT_TOLERANCE);

        assert_eq!(pixel(&masked, 5, 5), [0, 0, 0]);
        assert_eq!(pixel(&masked, 35, 5), [0, 0, 0]);
        assert_eq!(pixel(&masked, 15, 5), [200, 10, 10]);
        assert_eq!(pixel(&masked, 25, 5), [128, 128, 128]);
    }

    #[test]
    fn all_three_channels_must_be_in_band() {
        // Blue-ish palette entry matches red and green of the gray stripe but not blue
        let color = BgrColor::new(20, 128, 128);
        let masked = apply_mask(&striped_image(), &[color], 10.0);

        assert_eq!(pixel(&masked, 25, 5), [128, 128, 128]);
    }

    #[test]
    fn band_is_inclusive() {
        let color = BgrColor::new(128, 128, 98);
        let masked = apply_mask(&striped_image(), &[color], 30.0);

        assert_eq!(pixel(&masked, 25, 5), [0, 0, 0]);
    }

    #[test]
    fn palette_is_in_bgr_order() {
        // Saturated red written as B, G, R
        let red = BgrColor::new(10, 10, 200);
        let masked = apply_mask(&striped_image(), &[red], 0.0);

        assert_eq!(pixel(&masked, 15, 5), [0, 0, 0]);
    }

    #[test]
    fn masking_is_idempotent() {
        let mask = ColorMask::new(
            vec![BgrColor::new(255, 255, 255), BgrColor::new(10, 10, 200)],
            DEFAULT_TOLERANCE,
        );
        let once = mask.apply(&striped_image());
        let twice = mask.apply(&once);

        assert_eq!(once.as_rgb8(), twice.as_rgb8());
    }

    #[test]
    fn input_is_not_mutated() {
        let original = striped_image();
        let before = original.clone();
        let _ = apply_mask(&original, &[BgrColor::new(255, 255, 255)], DEFAULT_TOLERANCE);

        assert_eq!(original.as_rgb8(), before.as_rgb8());
    }

    #[test]
    fn grayscale_input_becomes_rgb_with_same_size() {
        let gray = DynamicImage::new_luma8(7, 3);
        let masked = apply_mask(&gray, &[], DEFAULT_TOLERANCE);

        assert!(matches!(masked, DynamicImage::ImageRgb8(_)));
        assert_eq!((masked.width(), masked.height()), (7, 3));
    }

    #[test]
    fn huge_tolerance_clamps_to_channel_range() {
        let masked = apply_mask(&striped_image(), &[BgrColor::new(0, 0, 0)], 1000.0);
        let rgb = masked.as_rgb8().unwrap();

        assert!(rgb.pixels().all(|p| p.0 == [0, 0, 0]));
    }

    #[test]
    fn negative_tolerance_is_exact_match() {
        let mask = ColorMask::new(vec![BgrColor::new(128, 128, 128)], -5.0);
        assert_eq!(mask.tolerance(), 0.0);

        let masked = mask.apply(&striped_image());
        assert_eq!(pixel(&masked, 25, 5), [0, 0, 0]);
        assert_eq!(pixel(&masked, 35, 5), [230, 230, 230]);
    }

    #[test]
    fn parses_hex_colors() {
        let color: BgrColor = "#9146FF".parse().unwrap();
        assert_eq!(color, BgrColor::new(0xFF, 0x46, 0x91));
        assert_eq!(color.to_string(), "#9146ff");

        assert!("#12345".parse::<BgrColor>().is_err());
        assert!("zzzzzz".parse::<BgrColor>().is_err());
    }
}
