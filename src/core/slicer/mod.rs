//! # Slicer Module
//!
//! Cuts a composite screenshot into a fixed grid of tiles.
//!
//! Cell size comes from integer division of the source dimensions, so any
//! remainder pixels on the right and bottom edges are left out of every tile.
//! Tiles are emitted in row-major order.

use crate::core::tile::{GridCell, Tile};
use crate::error::SliceError;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Number of rows and columns in a composite screenshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSpec {
    pub rows: u32,
    pub cols: u32,
}

impl GridSpec {
    pub fn new(rows: u32, cols: u32) -> Self {
        Self { rows, cols }
    }

    /// Number of tiles one source image yields
    pub fn cell_count(&self) -> usize {
        self.rows as usize * self.cols as usize
    }
}

impl Default for GridSpec {
    fn default() -> Self {
        Self::new(5, 5)
    }
}

/// Slices images into `rows x cols` tiles
#[derive(Debug, Clone, Default)]
pub struct GridSlicer {
    grid: GridSpec,
}

impl GridSlicer {
    pub fn new(grid: GridSpec) -> Self {
        Self { grid }
    }

    pub fn grid(&self) -> GridSpec {
        self.grid
    }

    /// Slice `image` into tiles tagged with `source`.
    ///
    /// Fails with `InvalidGeometry` when the grid is empty, the image has no
    /// pixels, or a cell would be narrower or shorter than one pixel.
    pub fn slice(&self, image: &DynamicImage, source: &Path) -> Result<Vec<Tile>, SliceError> {
        let GridSpec { rows, cols } = self.grid;
        let (width, height) = (image.width(), image.height());

        let geometry_error = || SliceError::InvalidGeometry {
            rows,
            cols,
            width,
            height,
        };

        if rows == 0 || cols == 0 || width == 0 || height == 0 {
            return Err(geometry_error());
        }

        let cell_width = width / cols;
        let cell_height = height / rows;
        if cell_width == 0 || cell_height == 0 {
            return Err(geometry_error());
        }

        let normalized = normalize_channels(image);

        let mut tiles = Vec::with_capacity(self.grid.cell_count());
        for row in 0..rows {
            for col in 0..cols {
                let cell = normalized.crop_imm(
                    col * cell_width,
                    row * cell_height,
                    cell_width,
                    cell_height,
                );
                tiles.push(Tile::new(cell, source, GridCell { row, col }));
            }
        }

        Ok(tiles)
    }
}

/// Slice with an ad-hoc grid
pub fn slice(
    image: &DynamicImage,
    source: &Path,
    rows: u32,
    cols: u32,
) -> Result<Vec<Tile>, SliceError> {
    GridSlicer::new(GridSpec::new(rows, cols)).slice(image, source)
}

/// Keep 8-bit grayscale as is, convert everything else to 8-bit RGB
pub(crate) fn normalize_channels(image: &DynamicImage) -> DynamicImage {
    match image {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => image.clone(),
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    }
}
