//! # Reporter Module
//!
//! Turns a comparison result into something a person can look at.
//!
//! ## Outputs
//! - **Mosaic**: the unmatched tiles pasted onto one PNG, one per cell
//! - **DifferenceReport**: a serializable listing of every unmatched tile
//!   with its source image and grid cell, for JSON output

mod mosaic;

pub use mosaic::{Mosaic, DEFAULT_MOSAIC_COLUMNS};

use crate::core::slicer::GridSpec;
use crate::core::tile::{GridCell, Tile};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One unmatched tile in a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileEntry {
    /// Human-readable label, `<file name> [r<row>c<col>]`
    pub label: String,
    /// Image the tile was cut from
    pub source: PathBuf,
    pub row: u32,
    pub col: u32,
    pub width: u32,
    pub height: u32,
}

impl TileEntry {
    pub fn from_tile(tile: &Tile) -> Self {
        let GridCell { row, col } = tile.cell();
        let name = tile
            .source()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| tile.source().display().to_string());

        Self {
            label: format!("{} [{}]", name, tile.cell()),
            source: tile.source().to_path_buf(),
            row,
            col,
            width: tile.width(),
            height: tile.height(),
        }
    }
}

/// Complete report for one comparison of two collections
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DifferenceReport {
    pub collection_a: PathBuf,
    pub collection_b: PathBuf,
    /// Strategy name, e.g. `features`
    pub algorithm: String,
    pub grid: GridSpec,
    /// Source images read from each collection
    pub images_a: usize,
    pub images_b: usize,
    /// Tiles extracted from each collection
    pub tiles_a: usize,
    pub tiles_b: usize,
    /// Tiles of A with no similar tile in B
    pub only_in_a: Vec<TileEntry>,
    /// Tiles of B with no similar tile in A
    pub only_in_b: Vec<TileEntry>,
    /// Non-fatal problems (unreadable files, images too small for the grid)
    pub errors: Vec<String>,
    pub duration_ms: u64,
}

impl DifferenceReport {
    /// One-line summary for quick scanning
    pub fn summary(&self) -> String {
        format!(
            "{} tile(s) only in A, {} tile(s) only in B ({} vs {} tiles compared)",
            self.only_in_a.len(),
            self.only_in_b.len(),
            self.tiles_a,
            self.tiles_b
        )
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Entries for a list of tiles, in the same order
pub fn entries(tiles: &[Tile]) -> Vec<TileEntry> {
    tiles.iter().map(TileEntry::from_tile).collect()
}
