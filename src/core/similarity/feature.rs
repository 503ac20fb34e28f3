//! Feature-matching similarity.
//!
//! Tiles are the same when enough ORB descriptors of the first tile find an
//! unambiguous nearest neighbor in the second. A tile without any descriptor
//! (flat color, too small for the detector) never matches anything.

use super::traits::{ensure_non_empty, SimilarityKind, SimilarityScorer, TileSignature};
use crate::core::features::{count_good_matches, to_gray, FeatureSet, OrbConfig, OrbDetector};
use crate::core::tile::Tile;
use crate::error::ScoreError;
use tracing::debug;

/// Default ratio between best and second-best match distance
pub const DEFAULT_RATIO: f32 = 0.75;

/// Default number of good matches a pair must exceed.
///
/// Tuned for tiles around 100-300 px; smaller or flatter tiles need less.
pub const DEFAULT_MIN_GOOD_MATCHES: usize = 90;

/// Similar iff the ratio-tested match count exceeds a threshold
#[derive(Debug, Clone)]
pub struct FeatureScorer {
    detector: OrbDetector,
    ratio: f32,
    min_good_matches: usize,
}

impl FeatureScorer {
    pub fn new(orb: OrbConfig, ratio: f32, min_good_matches: usize) -> Self {
        Self {
            detector: OrbDetector::new(orb),
            ratio,
            min_good_matches,
        }
    }

    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    pub fn min_good_matches(&self) -> usize {
        self.min_good_matches
    }

    /// Detect features on one tile
    pub fn features(&self, tile: &Tile) -> Result<FeatureSet, ScoreError> {
        ensure_non_empty(tile)?;
        self.detector.detect_and_compute(&to_gray(tile.image()))
    }

    /// Number of good matches from `a` into `b`
    pub fn good_matches(&self, a: &Tile, b: &Tile) -> Result<usize, ScoreError> {
        let a = self.features(a)?;
        let b = self.features(b)?;
        Ok(count_good_matches(a.descriptors(), b.descriptors(), self.ratio))
    }
}

impl Default for FeatureScorer {
    fn default() -> Self {
        Self::new(OrbConfig::default(), DEFAULT_RATIO, DEFAULT_MIN_GOOD_MATCHES)
    }
}

impl SimilarityScorer for FeatureScorer {
    fn signature(&self, tile: &Tile) -> Result<TileSignature, ScoreError> {
        let features = self.features(tile)?;
        if features.is_empty() {
            debug!(tile = %tile, "no descriptors, tile cannot match");
        }
        Ok(TileSignature::Features(features))
    }

    fn matches(&self, a: &TileSignature, b: &TileSignature) -> bool {
        let (TileSignature::Features(a), TileSignature::Features(b)) = (a, b) else {
            return false;
        };

        if a.is_empty() || b.is_empty() {
            return false;
        }

        count_good_matches(a.descriptors(), b.descriptors(), self.ratio) > self.min_good_matches
    }

    fn kind(&self) -> SimilarityKind {
        SimilarityKind::Features
    }

    fn description(&self) -> String {
        format!(
            "Feature strategy: tiles with more than {} matches passing the {} ratio test are considered the same",
            self.min_good_matches, self.ratio
        )
    }
}
