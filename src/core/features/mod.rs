//! # Features Module
//!
//! Local keypoints and binary descriptors for tile matching.
//!
//! ## How It Works
//! 1. Build a scale pyramid of the grayscale tile
//! 2. Detect oriented FAST corners on every level
//! 3. Describe each corner with a 256-bit rotated BRIEF descriptor
//! 4. Match descriptor sets by Hamming distance (k = 2) and keep matches
//!    that pass the ratio test
//!
//! ## Example
//! ```rust,ignore
//! use tile_diff::core::features::{count_good_matches, OrbDetector};
//!
//! let detector = OrbDetector::default();
//! let a = detector.detect_and_compute(&gray_a)?;
//! let b = detector.detect_and_compute(&gray_b)?;
//! let good = count_good_matches(a.descriptors(), b.descriptors(), 0.75);
//! ```

pub mod brief;
mod gray;
mod matcher;
mod orb;
pub mod pyramid;

pub use gray::to_gray;
pub use matcher::{count_good_matches, hamming, knn2, KnnMatch};
pub use orb::{OrbConfig, OrbDetector};

/// Descriptor length in bits
pub const DESCRIPTOR_BITS: usize = 256;

/// 256-bit binary descriptor
pub type Descriptor = [u8; DESCRIPTOR_BITS / 8];

/// A detected corner, in level-0 pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    /// Pyramid level the corner was found on
    pub level: usize,
    /// Orientation in radians
    pub angle: f32,
    /// FAST corner score
    pub response: f32,
}

/// Keypoints and their descriptors, index-aligned
#[derive(Debug, Clone, Default)]
pub struct FeatureSet {
    keypoints: Vec<Keypoint>,
    descriptors: Vec<Descriptor>,
}

impl FeatureSet {
    pub fn push(&mut self, keypoint: Keypoint, descriptor: Descriptor) {
        self.keypoints.push(keypoint);
        self.descriptors.push(descriptor);
    }

    pub fn keypoints(&self) -> &[Keypoint] {
        &self.keypoints
    }

    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
