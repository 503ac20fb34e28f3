//! Trait definitions for tile similarity strategies.

use crate::core::features::FeatureSet;
use crate::core::tile::Tile;
use crate::error::ScoreError;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

/// Available similarity strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimilarityKind {
    /// Global mean / standard deviation index - fast, blind to layout
    Statistical,
    /// Keypoint matching with a ratio test - robust to shifts and noise
    Features,
    /// Pixel-identical tiles only
    Exact,
}

impl SimilarityKind {
    /// Get a human-readable description of the strategy
    pub fn description(&self) -> &'static str {
        match self {
            SimilarityKind::Statistical => {
                "Statistical index - compares grayscale mean and standard deviation"
            }
            SimilarityKind::Features => {
                "Feature matching - counts unambiguous ORB descriptor matches"
            }
            SimilarityKind::Exact => "Exact - tiles must be pixel-for-pixel identical",
        }
    }
}

impl std::fmt::Display for SimilarityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimilarityKind::Statistical => write!(f, "statistical"),
            SimilarityKind::Features => write!(f, "features"),
            SimilarityKind::Exact => write!(f, "exact"),
        }
    }
}

/// Grayscale intensity statistics of one tile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrayStatistics {
    pub mean: f64,
    pub std_dev: f64,
}

/// Everything a strategy needs to know about one tile, computed once
#[derive(Debug, Clone)]
pub enum TileSignature {
    Statistics(GrayStatistics),
    Features(FeatureSet),
    Pixels(DynamicImage),
}

/// Strategy trait for deciding whether two tiles show the same thing
pub trait SimilarityScorer: Send + Sync {
    /// Validate a tile and precompute what `matches` compares.
    ///
    /// Fails with `InvalidInput` for a tile without pixels.
    fn signature(&self, tile: &Tile) -> Result<TileSignature, ScoreError>;

    /// Verdict on two precomputed signatures.
    ///
    /// Signatures produced by a different strategy never match.
    fn matches(&self, a: &TileSignature, b: &TileSignature) -> bool;

    /// Whether two tiles are considered the same
    fn is_similar(&self, a: &Tile, b: &Tile) -> Result<bool, ScoreError> {
        let a = self.signature(a)?;
        let b = self.signature(b)?;
        Ok(self.matches(&a, &b))
    }

    /// Get the strategy kind
    fn kind(&self) -> SimilarityKind;

    /// Human-readable description including thresholds
    fn description(&self) -> String;
}

/// Reject tiles that have no pixels
pub(crate) fn ensure_non_empty(tile: &Tile) -> Result<(), ScoreError> {
    if tile.is_empty() {
        return Err(ScoreError::InvalidInput {
            width: tile.width(),
            height: tile.height(),
            source_path: tile.source().to_path_buf(),
        });
    }
    Ok(())
}
