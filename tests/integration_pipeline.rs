//! Integration tests for the pipeline module.
//!
//! These tests run the whole workflow on synthetic grid screenshots:
//! - Feature matching finds the one cell that changed
//! - Mosaics of the unmatched tiles are written
//! - Empty and missing collections

use assert_fs::prelude::*;
use assert_fs::TempDir;
use image::{Rgb, RgbImage};
use predicates::prelude::*;
use tile_diff::core::pipeline::Pipeline;
use tile_diff::core::reporter::Mosaic;
use tile_diff::core::similarity::{ScorerConfig, SimilarityKind};
use tile_diff::core::slicer::GridSpec;
use tile_diff::error::{ScanError, TileDiffError};

const SIZE: u32 = 500;
const CELL: u32 = 100;

fn mix(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x7feb_352d);
    h ^= h >> 15;
    h = h.wrapping_mul(0x846c_a68b);
    h ^ (h >> 16)
}

/// 5x5 grid screenshot, every cell a different blocky noise texture.
///
/// The cells must be mutually distinct: flat or repeating cells (a plain
/// checkerboard) have equal statistics and no usable corners, so any tile
/// would match every other one and hide the changed cell.
///
/// `red_cell` is covered by an 80x80 filled red square, which leaves the
/// cell without corners away from its border.
fn grid_screenshot(red_cell: Option<(u32, u32)>) -> RgbImage {
    RgbImage::from_fn(SIZE, SIZE, |x, y| {
        let (row, col) = (y / CELL, x / CELL);
        let (cx, cy) = (x % CELL, y % CELL);

        if red_cell == Some((row, col)) && (10..90).contains(&cx) && (10..90).contains(&cy) {
            return Rgb([255, 0, 0]);
        }

        let seed = row * 5 + col + 1;
        let v = (mix(cx / 6 + (cy / 6) * 1000 + seed * 1_000_000) >> 24) as u8;
        Rgb([v, v, v / 3])
    })
}

fn collections(temp: &TempDir) -> (std::path::PathBuf, std::path::PathBuf) {
    let dir_a = temp.child("week1");
    let dir_b = temp.child("week2");
    dir_a.create_dir_all().unwrap();
    dir_b.create_dir_all().unwrap();

    grid_screenshot(None)
        .save(dir_a.child("drops.png").path())
        .unwrap();
    grid_screenshot(Some((2, 3)))
        .save(dir_b.child("drops.png").path())
        .unwrap();

    (dir_a.path().to_path_buf(), dir_b.path().to_path_buf())
}

#[test]
fn feature_matching_finds_the_changed_cell_in_both_directions() {
    let temp = TempDir::new().unwrap();
    let (dir_a, dir_b) = collections(&temp);

    // 100 px tiles carry far fewer corners than the default assumes
    let result = Pipeline::builder()
        .collection_a(&dir_a)
        .collection_b(&dir_b)
        .grid(GridSpec::new(5, 5))
        .scorer(ScorerConfig::new().kind(SimilarityKind::Features).min_good_matches(20))
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert_eq!((result.tiles_a, result.tiles_b), (25, 25));
    assert!(result.errors.is_empty());

    assert_eq!(result.only_in_a.len(), 1);
    assert_eq!(result.only_in_a[0].cell().to_string(), "r2c3");
    assert!(result.only_in_a[0].source().starts_with(&dir_a));

    assert_eq!(result.only_in_b.len(), 1);
    assert_eq!(result.only_in_b[0].cell().to_string(), "r2c3");
    assert!(result.only_in_b[0].source().starts_with(&dir_b));
}

#[test]
fn exact_strategy_agrees_on_lossless_screenshots() {
    let temp = TempDir::new().unwrap();
    let (dir_a, dir_b) = collections(&temp);

    let result = Pipeline::builder()
        .collection_a(&dir_a)
        .collection_b(&dir_b)
        .scorer(ScorerConfig::new().kind(SimilarityKind::Exact))
        .build()
        .unwrap()
        .run()
        .unwrap();

    let report = result.report();
    assert_eq!(report.only_in_a.len(), 1);
    assert_eq!(report.only_in_b.len(), 1);
    assert_eq!((report.only_in_a[0].row, report.only_in_a[0].col), (2, 3));
    assert_eq!(report.only_in_a[0].label, "drops.png [r2c3]");
    assert_eq!(report.algorithm, "exact");
}

#[test]
fn unmatched_tiles_are_written_as_mosaics() {
    let temp = TempDir::new().unwrap();
    let (dir_a, dir_b) = collections(&temp);

    let result = Pipeline::builder()
        .collection_a(&dir_a)
        .collection_b(&dir_b)
        .scorer(ScorerConfig::new().kind(SimilarityKind::Exact))
        .build()
        .unwrap()
        .run()
        .unwrap();

    let out = temp.child("out");
    out.create_dir_all().unwrap();
    let mosaic_path = out.child("only_in_b.png");
    Mosaic::layout(&result.only_in_b, 0)
        .save(mosaic_path.path())
        .unwrap();

    mosaic_path.assert(predicate::path::is_file());
    out.child("only_in_a.png")
        .assert(predicate::path::missing());

    let written = image::open(mosaic_path.path()).unwrap().to_rgb8();
    assert_eq!(written.dimensions(), (CELL, CELL));
    assert_eq!(written.get_pixel(50, 50), &Rgb([255, 0, 0]));
}

#[test]
fn pipeline_handles_empty_collections() {
    let temp = TempDir::new().unwrap();
    temp.child("a").create_dir_all().unwrap();
    temp.child("b").create_dir_all().unwrap();

    let result = Pipeline::builder()
        .collection_a(temp.child("a").path())
        .collection_b(temp.child("b").path())
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert_eq!((result.images_a, result.images_b), (0, 0));
    assert!(result.only_in_a.is_empty());
    assert!(result.only_in_b.is_empty());
}

#[test]
fn pipeline_handles_corrupt_file_gracefully() {
    let temp = TempDir::new().unwrap();
    let (dir_a, dir_b) = collections(&temp);
    std::fs::write(dir_a.join("corrupt.jpg"), b"this is not a valid image file").unwrap();

    let result = Pipeline::builder()
        .collection_a(&dir_a)
        .collection_b(&dir_b)
        .scorer(ScorerConfig::new().kind(SimilarityKind::Exact))
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(result.images_a, 2);
    assert_eq!(result.tiles_a, 25);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("corrupt.jpg"));
}

#[test]
fn pipeline_rejects_nonexistent_collection() {
    let temp = TempDir::new().unwrap();
    temp.child("a").create_dir_all().unwrap();

    let result = Pipeline::builder()
        .collection_a(temp.child("a").path())
        .collection_b("/nonexistent/path/that/does/not/exist")
        .build()
        .unwrap()
        .run();

    assert!(matches!(
        result,
        Err(TileDiffError::Scan(ScanError::DirectoryNotFound { .. }))
    ));
}
