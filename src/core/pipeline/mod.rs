//! # Pipeline Module
//!
//! Orchestrates a full comparison of two screenshot collections.
//!
//! ## Pipeline Stages
//! 1. **Scan** - Discover the screenshots in each collection directory
//! 2. **Slice** - Decode each screenshot, cut it into grid tiles and mask
//!    decorative colors
//! 3. **Compare** - Find the tiles of A missing from B and of B missing
//!    from A
//!
//! ## Parallelism
//! Uses rayon for parallel decoding and slicing across source images, and
//! inside the difference engine for the comparison itself.
//!
//! ## Example
//! ```rust,ignore
//! let result = Pipeline::builder()
//!     .collection_a("/drops/old")
//!     .collection_b("/drops/new")
//!     .scorer(ScorerConfig::new().min_good_matches(40))
//!     .build()?
//!     .run()?;
//!
//! println!("{}", result.report().summary());
//! ```

mod executor;

pub use crate::core::cancel::CancellationToken;
pub use executor::{Pipeline, PipelineBuilder, PipelineConfig, PipelineResult};
