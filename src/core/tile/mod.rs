//! # Tile Module
//!
//! A tile is one rectangular cell cut out of a composite screenshot, tagged
//! with where it came from.

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Position of a tile inside its source grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCell {
    /// Zero-based row index
    pub row: u32,
    /// Zero-based column index
    pub col: u32,
}

impl std::fmt::Display for GridCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "r{}c{}", self.row, self.col)
    }
}

/// One grid cell image with provenance
#[derive(Debug, Clone)]
pub struct Tile {
    image: DynamicImage,
    source: PathBuf,
    cell: GridCell,
}

impl Tile {
    /// Create a tile from an image and its provenance
    pub fn new(image: DynamicImage, source: impl Into<PathBuf>, cell: GridCell) -> Self {
        Self {
            image,
            source: source.into(),
            cell,
        }
    }

    /// The cell image
    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// Consume the tile, returning its image
    pub fn into_image(self) -> DynamicImage {
        self.image
    }

    /// The file or label the tile was extracted from
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Grid position within the source
    pub fn cell(&self) -> GridCell {
        self.cell
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Whether the tile has at least one pixel
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Replace the pixels, keeping provenance
    pub fn with_image(&self, image: DynamicImage) -> Self {
        Self {
            image,
            source: self.source.clone(),
            cell: self.cell,
        }
    }
}

impl std::fmt::Display for Tile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]", self.source.display(), self.cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    #[test]
    fn display_includes_source_and_cell() {
        let image = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(4, 4, Rgb([1, 2, 3])));
        let tile = Tile::new(image, "/drops/a.png", GridCell { row: 2, col: 3 });

        assert_eq!(tile.to_string(), "/drops/a.png [r2c3]");
        assert!(!tile.is_empty());
    }

    #[test]
    fn with_image_keeps_provenance() {
        let image = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(4, 4, Rgb([1, 2, 3])));
        let tile = Tile::new(image, "/drops/a.png", GridCell { row: 0, col: 1 });
        let replaced = tile.with_image(DynamicImage::new_luma8(2, 2));

        assert_eq!(replaced.source(), Path::new("/drops/a.png"));
        assert_eq!(replaced.cell(), GridCell { row: 0, col: 1 });
        assert_eq!(replaced.width(), 2);
    }
}
