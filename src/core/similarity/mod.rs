//! # Similarity Module
//!
//! Decides whether two tiles show the same thing.
//!
//! ## Strategies
//! - **Statistical** - global mean / standard deviation index, cheap
//! - **Features** - ORB keypoints, Hamming kNN and ratio test, robust to
//!   compression noise and small shifts
//! - **Exact** - pixel-identical tiles only
//!
//! All implement [`SimilarityScorer`], so the difference engine works with
//! either one unchanged.
//!
//! ## Example
//! ```rust,ignore
//! use tile_diff::core::similarity::{ScorerConfig, SimilarityKind};
//!
//! let scorer = ScorerConfig::new()
//!     .kind(SimilarityKind::Features)
//!     .min_good_matches(40)
//!     .build()?;
//!
//! let same = scorer.is_similar(&tile_a, &tile_b)?;
//! ```

mod exact;
mod feature;
mod statistical;
mod traits;

pub use exact::ExactScorer;
pub use feature::{FeatureScorer, DEFAULT_MIN_GOOD_MATCHES, DEFAULT_RATIO};
pub use statistical::{gray_statistics, ssim_index, StatisticalScorer, DEFAULT_SSIM_THRESHOLD};
pub use traits::{GrayStatistics, SimilarityKind, SimilarityScorer, TileSignature};

use crate::core::features::OrbConfig;
use crate::error::TileDiffError;
use serde::{Deserialize, Serialize};

/// Configuration builder for similarity scorers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorerConfig {
    kind: SimilarityKind,
    ssim_threshold: f64,
    ratio: f32,
    min_good_matches: usize,
    orb: OrbConfig,
}

impl ScorerConfig {
    /// Create a configuration with defaults (feature matching)
    pub fn new() -> Self {
        Self {
            kind: SimilarityKind::Features,
            ssim_threshold: DEFAULT_SSIM_THRESHOLD,
            ratio: DEFAULT_RATIO,
            min_good_matches: DEFAULT_MIN_GOOD_MATCHES,
            orb: OrbConfig::default(),
        }
    }

    /// Set the strategy
    pub fn kind(mut self, kind: SimilarityKind) -> Self {
        self.kind = kind;
        self
    }

    /// Statistical index a pair must exceed
    pub fn ssim_threshold(mut self, threshold: f64) -> Self {
        self.ssim_threshold = threshold;
        self
    }

    /// Best / second-best distance ratio for the feature strategy
    pub fn ratio(mut self, ratio: f32) -> Self {
        self.ratio = ratio;
        self
    }

    /// Good-match count a pair must exceed.
    ///
    /// Scale this with tile size: 90 suits tiles of a few hundred pixels,
    /// 100 px tiles carry far fewer corners.
    pub fn min_good_matches(mut self, count: usize) -> Self {
        self.min_good_matches = count;
        self
    }

    /// Detector settings for the feature strategy
    pub fn orb(mut self, orb: OrbConfig) -> Self {
        self.orb = orb;
        self
    }

    pub fn selected_kind(&self) -> SimilarityKind {
        self.kind
    }

    /// Build the scorer
    pub fn build(self) -> Result<Box<dyn SimilarityScorer>, TileDiffError> {
        match self.kind {
            SimilarityKind::Statistical => {
                if !(-1.0..=1.0).contains(&self.ssim_threshold) {
                    return Err(TileDiffError::Config(format!(
                        "SSIM threshold {} is outside [-1, 1]",
                        self.ssim_threshold
                    )));
                }
                Ok(Box::new(StatisticalScorer::new(self.ssim_threshold)))
            }
            SimilarityKind::Features => {
                if !(self.ratio > 0.0 && self.ratio <= 1.0) {
                    return Err(TileDiffError::Config(format!(
                        "ratio {} is outside (0, 1]",
                        self.ratio
                    )));
                }
                if self.orb.scale_factor <= 1.0 {
                    return Err(TileDiffError::Config(format!(
                        "pyramid scale factor {} must be greater than 1",
                        self.orb.scale_factor
                    )));
                }
                Ok(Box::new(FeatureScorer::new(
                    self.orb,
                    self.ratio,
                    self.min_good_matches,
                )))
            }
            SimilarityKind::Exact => Ok(Box::new(ExactScorer::new())),
        }
    }
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self::new()
    }
}
