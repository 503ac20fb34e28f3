//! Pixel-identical comparison.

use super::traits::{ensure_non_empty, SimilarityKind, SimilarityScorer, TileSignature};
use crate::core::tile::Tile;
use crate::error::ScoreError;

/// Similar iff both tiles have the same size, channel layout and pixels.
///
/// Useful for lossless screenshot sets, where any re-encoding would already
/// count as a change.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactScorer;

impl ExactScorer {
    pub fn new() -> Self {
        Self
    }
}

impl SimilarityScorer for ExactScorer {
    fn signature(&self, tile: &Tile) -> Result<TileSignature, ScoreError> {
        ensure_non_empty(tile)?;
        Ok(TileSignature::Pixels(tile.image().clone()))
    }

    fn matches(&self, a: &TileSignature, b: &TileSignature) -> bool {
        match (a, b) {
            (TileSignature::Pixels(a), TileSignature::Pixels(b)) => {
                a.color() == b.color()
                    && a.width() == b.width()
                    && a.height() == b.height()
                    && a.as_bytes() == b.as_bytes()
            }
            _ => false,
        }
    }

    fn kind(&self) -> SimilarityKind {
        SimilarityKind::Exact
    }

    fn description(&self) -> String {
        "Exact strategy: only pixel-identical tiles are considered the same".to_string()
    }
}
