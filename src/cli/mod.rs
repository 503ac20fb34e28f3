//! # CLI Module
//!
//! Command-line interface for the tile difference finder.
//!
//! ## Usage
//! ```bash
//! # Compare two folders of 5x5 grid screenshots
//! tile-diff compare ./drops/old ./drops/new
//!
//! # 4x6 grids, statistical index, black out the decorative purple
//! tile-diff compare ./old ./new --rows 4 --cols 6 --algorithm statistical --mask-color "#9146FF"
//!
//! # JSON output
//! tile-diff compare ./old ./new --format json
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use tile_diff::core::features::OrbConfig;
use tile_diff::core::mask::{BgrColor, DEFAULT_TOLERANCE};
use tile_diff::core::pipeline::{Pipeline, PipelineResult};
use tile_diff::core::reporter::{Mosaic, TileEntry, DEFAULT_MOSAIC_COLUMNS};
use tile_diff::core::scanner::ScanConfig;
use tile_diff::core::similarity::{
    ScorerConfig, SimilarityKind, DEFAULT_MIN_GOOD_MATCHES, DEFAULT_RATIO,
    DEFAULT_SSIM_THRESHOLD,
};
use tile_diff::core::slicer::GridSpec;
use tile_diff::error::{OutputError, Result};
use tile_diff::events::{CompareEvent, Event, EventChannel, PipelineEvent, SliceEvent};

/// Tile Diff - find the grid tiles one screenshot collection has and the other lacks
#[derive(Parser, Debug)]
#[command(name = "tile-diff")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compare two directories of grid screenshots
    Compare(CompareArgs),
}

#[derive(Args, Debug)]
struct CompareArgs {
    /// Directory holding collection A
    dir_a: PathBuf,

    /// Directory holding collection B
    dir_b: PathBuf,

    /// Grid rows per screenshot
    #[arg(long, default_value_t = 5)]
    rows: u32,

    /// Grid columns per screenshot
    #[arg(long, default_value_t = 5)]
    cols: u32,

    /// Similarity strategy
    #[arg(short, long, default_value = "features")]
    algorithm: Algorithm,

    /// Decorative color to black out before comparing, as #RRGGBB (repeatable)
    #[arg(long = "mask-color", value_name = "#RRGGBB")]
    mask_colors: Vec<BgrColor>,

    /// Per-channel tolerance for mask colors
    #[arg(long, default_value_t = DEFAULT_TOLERANCE)]
    tolerance: f64,

    /// Statistical index a pair must exceed (statistical strategy)
    #[arg(long, default_value_t = DEFAULT_SSIM_THRESHOLD)]
    ssim_threshold: f64,

    /// Nearest / second-nearest distance ratio (features strategy)
    #[arg(long, default_value_t = DEFAULT_RATIO)]
    ratio: f32,

    /// Good matches a pair must exceed (features strategy)
    #[arg(long = "min-matches", default_value_t = DEFAULT_MIN_GOOD_MATCHES)]
    min_matches: usize,

    /// Maximum keypoints per tile (features strategy)
    #[arg(long, default_value_t = OrbConfig::default().max_features)]
    max_features: usize,

    /// Where only_in_a.png and only_in_b.png are written
    #[arg(short = 'o', long, default_value = ".")]
    output_dir: PathBuf,

    /// Tiles per mosaic row (0 = a single strip)
    #[arg(long, default_value_t = DEFAULT_MOSAIC_COLUMNS)]
    mosaic_columns: usize,

    /// Skip writing mosaics
    #[arg(long)]
    no_mosaic: bool,

    /// Output format
    #[arg(short, long, default_value = "pretty")]
    format: OutputFormat,

    /// Descend into subdirectories
    #[arg(short, long)]
    recursive: bool,

    /// Include hidden files
    #[arg(long)]
    include_hidden: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Algorithm {
    /// ORB feature matching - robust to noise and small shifts (default)
    Features,
    /// Global mean / standard deviation index - fast
    Statistical,
    /// Pixel-identical tiles only
    Exact,
}

impl From<Algorithm> for SimilarityKind {
    fn from(algo: Algorithm) -> Self {
        match algo {
            Algorithm::Features => SimilarityKind::Features,
            Algorithm::Statistical => SimilarityKind::Statistical,
            Algorithm::Exact => SimilarityKind::Exact,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (one unmatched tile per line)
    Minimal,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Compare(args) => {
            tile_diff::init_tracing(args.verbose);
            run_compare(args)
        }
    }
}

fn run_compare(args: CompareArgs) -> Result<()> {
    let term = Term::stderr();
    let pretty = matches!(args.format, OutputFormat::Pretty);

    if pretty {
        term.write_line(&format!(
            "{} {}",
            style("Tile Diff").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    let orb = OrbConfig {
        max_features: args.max_features,
        ..OrbConfig::default()
    };
    let scorer = ScorerConfig::new()
        .kind(args.algorithm.into())
        .ssim_threshold(args.ssim_threshold)
        .ratio(args.ratio)
        .min_good_matches(args.min_matches)
        .orb(orb);

    let pipeline = Pipeline::builder()
        .collection_a(&args.dir_a)
        .collection_b(&args.dir_b)
        .grid(GridSpec::new(args.rows, args.cols))
        .palette(args.mask_colors.clone())
        .tolerance(args.tolerance)
        .scorer(scorer)
        .scan_config(ScanConfig {
            recursive: args.recursive,
            include_hidden: args.include_hidden,
            ..ScanConfig::default()
        })
        .build()?;

    let (sender, receiver) = EventChannel::new();

    // Progress bar for pretty output
    let progress = if pretty {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        let Some(pb) = progress_clone else {
            // Drain so the pipeline never waits on a full channel
            for _ in receiver.iter() {}
            return;
        };

        for event in receiver.iter() {
            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    pb.set_message(format!("{}", phase));
                }
                Event::Slice(SliceEvent::Started { total_images }) => {
                    pb.set_length(total_images as u64);
                    pb.set_position(0);
                }
                Event::Slice(SliceEvent::Progress(p)) => {
                    pb.set_position(p.completed as u64);
                }
                Event::Compare(CompareEvent::Started { side, tiles, .. }) => {
                    pb.set_length(tiles as u64);
                    pb.set_position(0);
                    pb.set_message(format!("Comparing tiles of {}", side));
                }
                Event::Compare(CompareEvent::Progress(p)) => {
                    pb.set_position(p.tiles_completed as u64);
                }
                Event::Pipeline(
                    PipelineEvent::Completed { .. }
                    | PipelineEvent::Cancelled
                    | PipelineEvent::Error { .. },
                ) => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }
    });

    let result = pipeline.run_with_events(&sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let result = result?;

    let written = if args.no_mosaic {
        Vec::new()
    } else {
        write_mosaics(&result, &args.output_dir, args.mosaic_columns)?
    };

    match args.format {
        OutputFormat::Pretty => print_pretty_results(&term, &result, &written, args.verbose),
        OutputFormat::Json => print_json_results(&result)?,
        OutputFormat::Minimal => print_minimal_results(&result),
    }

    Ok(())
}

/// Write one mosaic per non-empty direction, returning the files written
fn write_mosaics(
    result: &PipelineResult,
    output_dir: &Path,
    columns: usize,
) -> std::result::Result<Vec<PathBuf>, OutputError> {
    let mut written = Vec::new();

    for (name, tiles) in [
        ("only_in_a.png", &result.only_in_a),
        ("only_in_b.png", &result.only_in_b),
    ] {
        if tiles.is_empty() {
            continue;
        }

        fs::create_dir_all(output_dir).map_err(|e| OutputError::Io {
            path: output_dir.to_path_buf(),
            source: e,
        })?;

        let path = output_dir.join(name);
        Mosaic::layout(tiles, columns).save(&path)?;
        written.push(path);
    }

    Ok(written)
}

fn print_pretty_results(term: &Term, result: &PipelineResult, written: &[PathBuf], verbose: bool) {
    term.write_line(&format!("{} Comparison Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    // Summary
    term.write_line(&format!(
        "  {} tiles from {} image(s) in A, {} tiles from {} image(s) in B, {:.1}s",
        style(result.tiles_a).cyan(),
        result.images_a,
        style(result.tiles_b).cyan(),
        result.images_b,
        result.duration_ms as f64 / 1000.0
    ))
    .ok();
    term.write_line(&format!(
        "  {} strategy, {}x{} grid",
        style(result.algorithm).dim(),
        result.grid.rows,
        result.grid.cols
    ))
    .ok();
    term.write_line("").ok();

    let report = result.report();
    print_tile_section(term, "Only in A:", &report.only_in_a, verbose);
    print_tile_section(term, "Only in B:", &report.only_in_b, verbose);

    for path in written {
        term.write_line(&format!(
            "  {} {}",
            style("Wrote").dim(),
            style(path.display()).green()
        ))
        .ok();
    }

    if !result.errors.is_empty() {
        term.write_line("").ok();
        term.write_line(&format!(
            "{} {} file(s) skipped",
            style("!").yellow().bold(),
            result.errors.len()
        ))
        .ok();
        for error in &result.errors {
            term.write_line(&format!("    {}", style(error).dim())).ok();
        }
    }
}

fn print_tile_section(term: &Term, title: &str, tiles: &[TileEntry], verbose: bool) {
    term.write_line(&format!(
        "{} {}",
        style(title).bold().underlined(),
        style(tiles.len()).yellow()
    ))
    .ok();

    if tiles.is_empty() {
        term.write_line(&format!("    {}", style("none").dim())).ok();
    }
    for tile in tiles {
        if verbose {
            term.write_line(&format!(
                "    {} {} ({}x{})",
                style("○").dim(),
                tile.source.display(),
                tile.width,
                tile.height
            ))
            .ok();
        }
        term.write_line(&format!("    {} {}", style("•").cyan(), tile.label))
            .ok();
    }
    term.write_line("").ok();
}

fn print_json_results(result: &PipelineResult) -> std::result::Result<(), OutputError> {
    println!("{}", result.report().to_json()?);
    Ok(())
}

fn print_minimal_results(result: &PipelineResult) {
    for (side, tiles) in [("A", &result.only_in_a), ("B", &result.only_in_b)] {
        for tile in tiles {
            println!("{}\t{}\t{}", side, tile.source().display(), tile.cell());
        }
    }
}
