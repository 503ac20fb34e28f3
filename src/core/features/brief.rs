//! Rotated BRIEF binary descriptors.
//!
//! Each descriptor bit compares the smoothed intensity at two sample points
//! around the keypoint. Sample points are rotated by the keypoint orientation
//! before lookup, which makes the descriptor rotation invariant.

use super::{Descriptor, DESCRIPTOR_BITS};
use image::GrayImage;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::sync::OnceLock;

/// Sample points lie within this radius of the keypoint
pub const PATTERN_RADIUS: i32 = 13;

const PATTERN_SEED: u64 = 0x0B5E_55ED;

/// Fixed sampling pattern: `[x1, y1, x2, y2]` per descriptor bit.
///
/// Seeded so that every tile, in every run, is described with the same pairs.
pub fn sampling_pattern() -> &'static [[i32; 4]] {
    static PATTERN: OnceLock<Vec<[i32; 4]>> = OnceLock::new();

    PATTERN.get_or_init(|| {
        let mut rng = StdRng::seed_from_u64(PATTERN_SEED);
        let mut point = || loop {
            let x = rng.random_range(-PATTERN_RADIUS..=PATTERN_RADIUS);
            let y = rng.random_range(-PATTERN_RADIUS..=PATTERN_RADIUS);
            if x * x + y * y <= PATTERN_RADIUS * PATTERN_RADIUS {
                return (x, y);
            }
        };

        let mut pairs = Vec::with_capacity(DESCRIPTOR_BITS);
        while pairs.len() < DESCRIPTOR_BITS {
            let (x1, y1) = point();
            let (x2, y2) = point();
            if (x1, y1) != (x2, y2) {
                pairs.push([x1, y1, x2, y2]);
            }
        }
        pairs
    })
}

/// Intensity at `(x, y)`, clamped to the image bounds
#[inline]
pub(crate) fn sample(image: &GrayImage, x: i64, y: i64) -> u8 {
    let x = x.clamp(0, image.width() as i64 - 1) as u32;
    let y = y.clamp(0, image.height() as i64 - 1) as u32;
    image.get_pixel(x, y)[0]
}

/// Describe the keypoint at `(x, y)` with orientation `angle` (radians).
///
/// `smoothed` must be the blurred version of the pyramid level the keypoint
/// was detected on.
pub fn describe(smoothed: &GrayImage, x: u32, y: u32, angle: f32) -> Descriptor {
    let (sin, cos) = angle.sin_cos();
    let (cx, cy) = (x as i64, y as i64);
    let rotate = |px: i32, py: i32| {
        let (px, py) = (px as f32, py as f32);
        (
            (cos * px - sin * py).round() as i64,
            (sin * px + cos * py).round() as i64,
        )
    };

    let mut descriptor = [0u8; DESCRIPTOR_BITS / 8];
    for (bit, &[x1, y1, x2, y2]) in sampling_pattern().iter().enumerate() {
        let (rx1, ry1) = rotate(x1, y1);
        let (rx2, ry2) = rotate(x2, y2);

        let first = sample(smoothed, cx + rx1, cy + ry1);
        let second = sample(smoothed, cx + rx2, cy + ry2);

        if first < second {
            descriptor[bit / 8] |= 1 << (bit % 8);
        }
    }

    descriptor
}
