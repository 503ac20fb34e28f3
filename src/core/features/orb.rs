//! Oriented FAST keypoints with rotated BRIEF descriptors.
//!
//! Per pyramid level:
//! 1. FAST-9 corners, minus those too close to the border
//! 2. 3x3 non-maximum suppression on the corner score
//! 3. Strongest corners kept, up to the level's share of `max_features`
//! 4. Orientation from the intensity centroid of a disc around the corner
//! 5. Rotated BRIEF descriptor on a Gaussian-smoothed copy of the level

use super::brief::{self, PATTERN_RADIUS};
use super::pyramid::build_pyramid;
use super::{FeatureSet, Keypoint};
use crate::error::ScoreError;
use image::GrayImage;
use imageproc::corners::{corners_fast9, Corner};
use imageproc::filter::gaussian_blur_f32;
use serde::{Deserialize, Serialize};

/// Radius of the disc used for the intensity centroid
const ORIENTATION_RADIUS: i64 = 15;

/// Detector settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbConfig {
    /// Upper bound on keypoints per tile, across all levels
    pub max_features: usize,
    /// Downscale ratio between consecutive pyramid levels
    pub scale_factor: f32,
    /// Maximum number of pyramid levels
    pub levels: usize,
    /// FAST intensity threshold
    pub fast_threshold: u8,
    /// Corners closer than this to a level border are dropped
    pub edge_threshold: u32,
    /// Gaussian sigma applied before sampling descriptors
    pub blur_sigma: f32,
}

impl Default for OrbConfig {
    fn default() -> Self {
        Self {
            max_features: 500,
            scale_factor: 1.2,
            levels: 8,
            fast_threshold: 20,
            edge_threshold: 16,
            blur_sigma: 2.0,
        }
    }
}

/// ORB-class feature detector
#[derive(Debug, Clone, Default)]
pub struct OrbDetector {
    config: OrbConfig,
}

impl OrbDetector {
    pub fn new(config: OrbConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OrbConfig {
        &self.config
    }

    /// Detect keypoints and compute descriptors for a grayscale image
    pub fn detect_and_compute(&self, gray: &GrayImage) -> Result<FeatureSet, ScoreError> {
        let config = &self.config;
        let edge = config.edge_threshold.max(1);
        let scale_factor = config.scale_factor.max(1.0 + f32::EPSILON);

        let pyramid = build_pyramid(gray, config.levels.max(1), scale_factor, 2 * edge)?;
        let budgets = level_budgets(config.max_features, scale_factor, pyramid.len());

        let mut features = FeatureSet::default();
        for (level, (layer, budget)) in pyramid.iter().zip(budgets).enumerate() {
            if budget == 0 {
                continue;
            }

            let corners = strongest_corners(&layer.image, config.fast_threshold, edge, budget);
            if corners.is_empty() {
                continue;
            }

            let smoothed = gaussian_blur_f32(&layer.image, config.blur_sigma.max(0.1));
            for corner in corners {
                let angle = orientation(&layer.image, corner.x, corner.y);
                let descriptor = brief::describe(&smoothed, corner.x, corner.y, angle);

                features.push(
                    Keypoint {
                        x: corner.x as f32 * layer.scale,
                        y: corner.y as f32 * layer.scale,
                        level,
                        angle,
                        response: corner.score,
                    },
                    descriptor,
                );
            }
        }

        Ok(features)
    }
}

/// Split `total` features over `levels` with a geometric falloff, smaller levels getting fewer
fn level_budgets(total: usize, scale_factor: f32, levels: usize) -> Vec<usize> {
    if levels == 0 {
        return Vec::new();
    }

    let factor = 1.0 / scale_factor as f64;
    let first = total as f64 * (1.0 - factor) / (1.0 - factor.powi(levels as i32));

    let mut budgets = Vec::with_capacity(levels);
    let mut assigned = 0usize;
    for level in 0..levels - 1 {
        let share = (first * factor.powi(level as i32)).round() as usize;
        let share = share.min(total - assigned);
        budgets.push(share);
        assigned += share;
    }
    budgets.push(total - assigned);
    budgets
}

/// FAST corners away from the border, non-max suppressed, strongest first
fn strongest_corners(image: &GrayImage, threshold: u8, edge: u32, budget: usize) -> Vec<Corner> {
    let (width, height) = image.dimensions();
    let margin = edge.max(PATTERN_RADIUS as u32 + 1);
    if width <= 2 * margin || height <= 2 * margin {
        return Vec::new();
    }

    let inside = |c: &Corner| {
        c.x >= margin && c.y >= margin && c.x < width - margin && c.y < height - margin
    };
    let candidates: Vec<Corner> = corners_fast9(image, threshold)
        .into_iter()
        .filter(inside)
        .collect();

    let mut scores = vec![f32::NEG_INFINITY; (width * height) as usize];
    for c in &candidates {
        scores[(c.y * width + c.x) as usize] = c.score;
    }

    // A neighbor suppresses a corner if it scores higher, or equal and earlier in raster order
    let is_local_max = |c: &Corner| {
        for dy in -1i64..=1 {
            for dx in -1i64..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let (nx, ny) = (c.x as i64 + dx, c.y as i64 + dy);
                let neighbor = scores[(ny as u32 * width + nx as u32) as usize];
                let earlier = (ny, nx) < (c.y as i64, c.x as i64);
                if neighbor > c.score || (neighbor == c.score && earlier) {
                    return false;
                }
            }
        }
        true
    };

    let mut kept: Vec<Corner> = candidates.iter().copied().filter(is_local_max).collect();
    kept.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then(a.y.cmp(&b.y))
            .then(a.x.cmp(&b.x))
    });
    kept.truncate(budget);
    kept
}

/// Orientation of the intensity centroid around `(x, y)`, in radians
fn orientation(image: &GrayImage, x: u32, y: u32) -> f32 {
    let (cx, cy) = (x as i64, y as i64);
    let mut m01 = 0i64;
    let mut m10 = 0i64;

    for dy in -ORIENTATION_RADIUS..=ORIENTATION_RADIUS {
        let span = ((ORIENTATION_RADIUS * ORIENTATION_RADIUS - dy * dy) as f64).sqrt() as i64;
        for dx in -span..=span {
            let value = brief::sample(image, cx + dx, cy + dy) as i64;
            m10 += dx * value;
            m01 += dy * value;
        }
    }

    (m01 as f32).atan2(m10 as f32)
}
