//! # tile-diff CLI
//!
//! Command-line interface for the screenshot tile difference finder.
//!
//! ## Usage
//! ```bash
//! tile-diff compare ./drops/old ./drops/new
//! tile-diff compare ./old ./new --algorithm statistical --format json
//! ```

mod cli;

use tile_diff::Result;

fn main() -> Result<()> {
    cli::run()
}
