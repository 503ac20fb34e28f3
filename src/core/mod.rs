//! # Core Module
//!
//! The UI-agnostic tile difference engine.
//!
//! ## Modules
//! - `tile` - A grid cell image with its provenance
//! - `slicer` - Cuts composite screenshots into grid tiles
//! - `mask` - Blacks out decorative colors
//! - `features` - ORB keypoints, binary descriptors and Hamming matching
//! - `similarity` - Decides whether two tiles show the same thing
//! - `difference` - Finds tiles of one collection missing from another
//! - `scanner` - Discovers screenshots in directories
//! - `loader` - Decodes screenshots from disk
//! - `reporter` - Mosaics and serializable reports
//! - `pipeline` - Orchestrates the full workflow

pub mod cancel;
pub mod difference;
pub mod features;
pub mod loader;
pub mod mask;
pub mod pipeline;
pub mod reporter;
pub mod scanner;
pub mod similarity;
pub mod slicer;
pub mod tile;

// Re-export commonly used types
pub use difference::{difference, CollectionDiff, DifferenceEngine};
pub use mask::{apply_mask, BgrColor, ColorMask};
pub use similarity::{ScorerConfig, SimilarityKind, SimilarityScorer};
pub use slicer::{slice, GridSlicer, GridSpec};
pub use tile::{GridCell, Tile};
