//! # Scanner Module
//!
//! Discovers the screenshot files that make up one collection.
//!
//! ## Supported Formats
//! - PNG (.png)
//! - JPEG (.jpg, .jpeg)
//! - WebP (.webp)
//! - BMP (.bmp)
//! - GIF (.gif)
//! - TIFF (.tiff, .tif)
//!
//! Results are sorted by path, so tile order (and therefore report order)
//! does not depend on the filesystem's directory iteration order.
//!
//! ## Example
//! ```rust,ignore
//! use tile_diff::core::scanner::{ImageScanner, ScanConfig, WalkDirScanner};
//!
//! let scanner = WalkDirScanner::new(ScanConfig::default());
//! let result = scanner.scan("/screenshots/week1".as_ref())?;
//! ```

mod filter;
mod walker;

pub use filter::ImageFilter;
pub use walker::{ScanConfig, WalkDirScanner};

use crate::error::ScanError;
use crate::events::EventSender;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A discovered image file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFile {
    /// Path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

/// Result of a scan operation
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Discovered images, sorted by path
    pub images: Vec<ImageFile>,
    /// Errors that occurred during scanning (non-fatal)
    pub errors: Vec<ScanError>,
}

impl ScanResult {
    pub fn paths(&self) -> Vec<PathBuf> {
        self.images.iter().map(|image| image.path.clone()).collect()
    }
}

/// Trait for collection scanners
///
/// Implement this trait to feed the pipeline from somewhere other than a
/// directory tree (e.g., in tests).
pub trait ImageScanner: Send + Sync {
    /// Scan one collection root.
    ///
    /// A missing root is an error; unreadable entries below it are
    /// recorded in [`ScanResult::errors`].
    fn scan(&self, root: &Path) -> Result<ScanResult, ScanError>;

    /// Scan with progress reporting via events
    fn scan_with_events(&self, root: &Path, events: &EventSender)
        -> Result<ScanResult, ScanError>;
}
