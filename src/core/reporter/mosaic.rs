//! Mosaic assembly for unmatched tiles.

use crate::core::tile::Tile;
use crate::error::OutputError;
use image::{imageops, ImageFormat, Rgb, RgbImage};
use std::path::Path;

/// Tiles per mosaic row unless configured otherwise
pub const DEFAULT_MOSAIC_COLUMNS: usize = 5;

/// Grid layout of tiles on a single canvas.
///
/// Every tile gets a cell as large as the largest tile, so tiles of
/// different sizes still line up. Unused canvas is black.
#[derive(Debug, Clone)]
pub struct Mosaic<'a> {
    tiles: Vec<&'a Tile>,
    columns: usize,
    cell_width: u32,
    cell_height: u32,
}

impl<'a> Mosaic<'a> {
    /// Lay out `tiles` left to right, top to bottom.
    ///
    /// `columns = 0` puts every tile on one horizontal strip.
    pub fn layout<I>(tiles: I, columns: usize) -> Self
    where
        I: IntoIterator<Item = &'a Tile>,
    {
        let tiles: Vec<&Tile> = tiles.into_iter().collect();
        let columns = if columns == 0 {
            tiles.len()
        } else {
            columns.min(tiles.len())
        };

        Self {
            cell_width: tiles.iter().map(|t| t.width()).max().unwrap_or(0),
            cell_height: tiles.iter().map(|t| t.height()).max().unwrap_or(0),
            tiles,
            columns,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Number of tiles per row
    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        if self.columns == 0 {
            0
        } else {
            self.tiles.len().div_ceil(self.columns)
        }
    }

    /// Canvas size in pixels
    pub fn dimensions(&self) -> (u32, u32) {
        (
            self.cell_width * self.columns as u32,
            self.cell_height * self.rows() as u32,
        )
    }

    /// Top-left corner of the `index`-th tile
    pub fn position(&self, index: usize) -> (u32, u32) {
        let columns = self.columns.max(1);
        (
            (index % columns) as u32 * self.cell_width,
            (index / columns) as u32 * self.cell_height,
        )
    }

    /// Paint all tiles onto a black RGB canvas
    pub fn render(&self) -> RgbImage {
        let (width, height) = self.dimensions();
        let mut canvas = RgbImage::from_pixel(width, height, Rgb([0, 0, 0]));

        for (index, tile) in self.tiles.iter().enumerate() {
            let (x, y) = self.position(index);
            imageops::replace(&mut canvas, &tile.image().to_rgb8(), x as i64, y as i64);
        }

        canvas
    }

    /// Render and write as PNG
    pub fn save(&self, path: &Path) -> Result<(), OutputError> {
        if self.is_empty() {
            return Err(OutputError::NothingToWrite {
                path: path.to_path_buf(),
            });
        }

        self.render()
            .save_with_format(path, ImageFormat::Png)
            .map_err(|e| OutputError::SaveFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        tracing::info!("Wrote {} tile(s) to {}", self.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tile::GridCell;
    use image::{DynamicImage, ImageBuffer, Luma};
    use tempfile::TempDir;

    fn solid(value: u8, width: u32, height: u32, col: u32) -> Tile {
        Tile::new(
            DynamicImage::ImageRgb8(ImageBuffer::from_pixel(width, height, Rgb([value, 0, 0]))),
            "grid.png",
            GridCell { row: 0, col },
        )
    }

    #[test]
    fn zero_columns_is_a_horizontal_strip() {
        let tiles = vec![solid(10, 4, 3, 0), solid(20, 4, 3, 1), solid(30, 4, 3, 2)];
        let mosaic = Mosaic::layout(&tiles, 0);

        assert_eq!(mosaic.columns(), 3);
        assert_eq!(mosaic.rows(), 1);
        assert_eq!(mosaic.dimensions(), (12, 3));
    }

    #[test]
    fn tiles_wrap_after_column_count() {
        let tiles: Vec<Tile> = (0..7).map(|i| solid(i as u8, 10, 5, i)).collect();
        let mosaic = Mosaic::layout(&tiles, 3);

        assert_eq!(mosaic.rows(), 3);
        assert_eq!(mosaic.dimensions(), (30, 15));
        assert_eq!(mosaic.position(4), (10, 5));
        assert_eq!(mosaic.position(6), (0, 10));
    }

    #[test]
    fn fewer_tiles_than_columns_shrinks_canvas() {
        let tiles = vec![solid(1, 8, 8, 0), solid(2, 8, 8, 1)];
        let mosaic = Mosaic::layout(&tiles, DEFAULT_MOSAIC_COLUMNS);
        assert_eq!(mosaic.dimensions(), (16, 8));
    }

    #[test]
    fn render_places_tiles_and_pads_with_black() {
        let tiles = vec![solid(200, 4, 4, 0), solid(100, 2, 2, 1)];
        let canvas = Mosaic::layout(&tiles, 0).render();

        assert_eq!(canvas.dimensions(), (8, 4));
        assert_eq!(canvas.get_pixel(0, 0), &Rgb([200, 0, 0]));
        assert_eq!(canvas.get_pixel(4, 0), &Rgb([100, 0, 0]));
        assert_eq!(canvas.get_pixel(7, 3), &Rgb([0, 0, 0]));
    }

    #[test]
    fn grayscale_tiles_render_as_gray() {
        let tile = Tile::new(
            DynamicImage::ImageLuma8(ImageBuffer::from_pixel(2, 2, Luma([90]))),
            "gray.png",
            GridCell { row: 0, col: 0 },
        );
        let canvas = Mosaic::layout([&tile], 1).render();
        assert_eq!(canvas.get_pixel(1, 1), &Rgb([90, 90, 90]));
    }

    #[test]
    fn save_writes_png() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("only_in_a.png");
        let tiles = vec![solid(50, 6, 6, 0)];

        Mosaic::layout(&tiles, 5).save(&path).unwrap();

        let written = image::open(&path).unwrap();
        assert_eq!((written.width(), written.height()), (6, 6));
    }

    #[test]
    fn save_without_tiles_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.png");
        let result = Mosaic::layout(std::iter::empty(), 5).save(&path);

        assert!(matches!(result, Err(OutputError::NothingToWrite { .. })));
        assert!(!path.exists());
    }
}
