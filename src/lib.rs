//! # Tile Diff
//!
//! Finds the screenshot tiles that exist in one image collection but not in
//! another.
//!
//! Composite screenshots (for example a 5x5 grid of reward icons) are cut
//! into cells, decorative colors are optionally masked, and every cell of
//! one collection is looked up among the cells of the other with either a
//! cheap statistical index or ORB feature matching.
//!
//! ## Architecture
//! The library is split into a core engine (UI-agnostic) and presentation layers:
//! - `core` - Slicing, masking, similarity and the set difference
//! - `events` - Event-driven progress reporting
//! - `error` - Error types with context
//! - `cli` - Command-line interface (binary only)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{Result, TileDiffError};

use tracing_subscriber::EnvFilter;

/// Initialize tracing for the library
///
/// This should be called by the application entry point. `RUST_LOG`
/// takes precedence; otherwise `verbose` selects debug over warn.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "tile_diff=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A subscriber installed earlier (e.g. by a test harness) wins
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
