//! # Error Module
//!
//! Error types for the tile difference finder.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, dimensions, what went wrong
//! - **Fail fast** - geometry and input errors abort the operation with no partial result

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum TileDiffError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Loading error: {0}")]
    Load(#[from] LoadError),

    #[error("Slicing error: {0}")]
    Slice(#[from] SliceError),

    #[error("Scoring error: {0}")]
    Score(#[from] ScoreError),

    #[error("Comparison error: {0}")]
    Compare(#[from] CompareError),

    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Operation was cancelled")]
    Cancelled,
}

/// Errors that occur while enumerating image files
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while decoding a source image
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to decode image {path}: {reason}")]
    DecodeError { path: PathBuf, reason: String },

    #[error("Image is empty or corrupted: {path}")]
    EmptyImage { path: PathBuf },

    #[error("Failed to open image file {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by the grid slicer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SliceError {
    #[error(
        "Invalid grid geometry: {rows}x{cols} grid cannot be cut from a {width}x{height} image"
    )]
    InvalidGeometry {
        rows: u32,
        cols: u32,
        width: u32,
        height: u32,
    },
}

/// Errors raised at the entry of a similarity scorer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoreError {
    #[error("Invalid tile from {source_path}: {width}x{height} has no pixels")]
    InvalidInput {
        width: u32,
        height: u32,
        source_path: PathBuf,
    },

    #[error("Failed to build image pyramid: {reason}")]
    Pyramid { reason: String },
}

/// Errors that occur while computing a set difference
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompareError {
    #[error(transparent)]
    Score(#[from] ScoreError),

    #[error("Comparison was cancelled")]
    Cancelled,
}

/// Errors that occur while writing results
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("No tiles to write to {path}")]
    NothingToWrite { path: PathBuf },

    #[error("Failed to save image {path}: {reason}")]
    SaveFailed { path: PathBuf, reason: String },

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to create output directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, TileDiffError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_error_includes_path() {
        let error = ScanError::DirectoryNotFound {
            path: PathBuf::from("/screenshots/week1"),
        };
        let message = error.to_string();
        assert!(message.contains("/screenshots/week1"));
    }

    #[test]
    fn geometry_error_includes_dimensions() {
        let error = SliceError::InvalidGeometry {
            rows: 5,
            cols: 0,
            width: 500,
            height: 400,
        };
        let message = error.to_string();
        assert!(message.contains("5x0"));
        assert!(message.contains("500x400"));
    }

    #[test]
    fn score_error_converts_into_compare_error() {
        let error: CompareError = ScoreError::InvalidInput {
            width: 0,
            height: 10,
            source_path: PathBuf::from("/a.png"),
        }
        .into();
        assert!(error.to_string().contains("/a.png"));
    }

    #[test]
    fn load_error_includes_reason() {
        let error = LoadError::DecodeError {
            path: PathBuf::from("/drops/broken.jpg"),
            reason: "invalid JPEG".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("/drops/broken.jpg"));
        assert!(message.contains("invalid JPEG"));
    }
}
