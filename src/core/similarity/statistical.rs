//! Statistical similarity index.
//!
//! A global, single-statistic approximation of SSIM:
//!
//! ```text
//! ssim = ((2·μ1·μ2 + C1)(2·σ1·σ2 + C1)) / ((μ1² + μ2² + C1)(σ1² + σ2² + C1))
//! ```
//!
//! with `C1 = 1` keeping the denominator non-zero for black, flat tiles.
//! Cheap, and good at catching near-duplicate flat regions, but blind to
//! where in the tile the intensities are.

use super::traits::{
    ensure_non_empty, GrayStatistics, SimilarityKind, SimilarityScorer, TileSignature,
};
use crate::core::features::to_gray;
use crate::core::tile::Tile;
use crate::error::ScoreError;
use image::DynamicImage;

/// Stabilizing constant
const C1: f64 = 1.0;

/// Default verdict threshold
pub const DEFAULT_SSIM_THRESHOLD: f64 = 0.75;

/// Similar iff the statistical index exceeds a threshold
#[derive(Debug, Clone)]
pub struct StatisticalScorer {
    threshold: f64,
}

impl StatisticalScorer {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Index of two tiles, in `[-1, 1]` in theory, 1 for identical statistics
    pub fn ssim_index(&self, a: &Tile, b: &Tile) -> Result<f64, ScoreError> {
        ensure_non_empty(a)?;
        ensure_non_empty(b)?;
        Ok(ssim_index(
            &gray_statistics(a.image()),
            &gray_statistics(b.image()),
        ))
    }
}

impl Default for StatisticalScorer {
    fn default() -> Self {
        Self::new(DEFAULT_SSIM_THRESHOLD)
    }
}

impl SimilarityScorer for StatisticalScorer {
    fn signature(&self, tile: &Tile) -> Result<TileSignature, ScoreError> {
        ensure_non_empty(tile)?;
        Ok(TileSignature::Statistics(gray_statistics(tile.image())))
    }

    fn matches(&self, a: &TileSignature, b: &TileSignature) -> bool {
        match (a, b) {
            (TileSignature::Statistics(a), TileSignature::Statistics(b)) => {
                ssim_index(a, b) > self.threshold
            }
            _ => false,
        }
    }

    fn kind(&self) -> SimilarityKind {
        SimilarityKind::Statistical
    }

    fn description(&self) -> String {
        format!(
            "Statistical strategy: tiles with index > {} are considered the same",
            self.threshold
        )
    }
}

/// Mean and population standard deviation of the grayscale intensities
pub fn gray_statistics(image: &DynamicImage) -> GrayStatistics {
    let gray = to_gray(image);

    let n = gray.as_raw().len();
    if n == 0 {
        return GrayStatistics {
            mean: 0.0,
            std_dev: 0.0,
        };
    }

    let mean = gray.as_raw().iter().map(|&v| v as f64).sum::<f64>() / n as f64;
    let variance = gray
        .as_raw()
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n as f64;

    GrayStatistics {
        mean,
        std_dev: variance.sqrt(),
    }
}

/// Statistical similarity index of two sets of statistics
pub fn ssim_index(a: &GrayStatistics, b: &GrayStatistics) -> f64 {
    let (mu1, mu2) = (a.mean, b.mean);
    let (sigma1, sigma2) = (a.std_dev, b.std_dev);

    ((2.0 * mu1 * mu2 + C1) * (2.0 * sigma1 * sigma2 + C1))
        / ((mu1 * mu1 + mu2 * mu2 + C1) * (sigma1 * sigma1 + sigma2 * sigma2 + C1))
}
