//! Pipeline execution implementation.

use crate::core::cancel::CancellationToken;
use crate::core::difference::DifferenceEngine;
use crate::core::loader::ImageLoader;
use crate::core::mask::{BgrColor, ColorMask, DEFAULT_TOLERANCE};
use crate::core::reporter::{entries, DifferenceReport};
use crate::core::scanner::{ImageScanner, ScanConfig, WalkDirScanner};
use crate::core::similarity::{ScorerConfig, SimilarityKind};
use crate::core::slicer::{GridSlicer, GridSpec};
use crate::core::tile::Tile;
use crate::error::{CompareError, TileDiffError};
use crate::events::{
    null_sender, CollectionSide, Event, EventSender, PipelineEvent, PipelinePhase,
    PipelineSummary, SliceEvent, SliceProgress,
};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

/// Result of pipeline execution
#[derive(Debug)]
pub struct PipelineResult {
    pub collection_a: PathBuf,
    pub collection_b: PathBuf,
    /// Strategy the tiles were compared with
    pub algorithm: SimilarityKind,
    pub grid: GridSpec,
    /// Tiles of A with no similar tile in B, in scan order
    pub only_in_a: Vec<Tile>,
    /// Tiles of B with no similar tile in A, in scan order
    pub only_in_b: Vec<Tile>,
    /// Source images found in each collection
    pub images_a: usize,
    pub images_b: usize,
    /// Tiles extracted from each collection
    pub tiles_a: usize,
    pub tiles_b: usize,
    /// Errors encountered (non-fatal)
    pub errors: Vec<String>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl PipelineResult {
    /// Serializable listing of the result
    pub fn report(&self) -> DifferenceReport {
        DifferenceReport {
            collection_a: self.collection_a.clone(),
            collection_b: self.collection_b.clone(),
            algorithm: self.algorithm.to_string(),
            grid: self.grid,
            images_a: self.images_a,
            images_b: self.images_b,
            tiles_a: self.tiles_a,
            tiles_b: self.tiles_b,
            only_in_a: entries(&self.only_in_a),
            only_in_b: entries(&self.only_in_b),
            errors: self.errors.clone(),
            duration_ms: self.duration_ms,
        }
    }

    pub fn summary(&self) -> PipelineSummary {
        PipelineSummary {
            tiles_a: self.tiles_a,
            tiles_b: self.tiles_b,
            only_in_a: self.only_in_a.len(),
            only_in_b: self.only_in_b.len(),
            duration_ms: self.duration_ms,
        }
    }
}

/// Configuration for the pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory holding collection A
    pub collection_a: PathBuf,
    /// Directory holding collection B
    pub collection_b: PathBuf,
    /// Grid every screenshot is cut into
    pub grid: GridSpec,
    /// Decorative colors blacked out before comparison
    pub palette: Vec<BgrColor>,
    /// Per-channel tolerance for the palette
    pub tolerance: f64,
    /// Similarity strategy and thresholds
    pub scorer: ScorerConfig,
    /// Scanner configuration
    pub scan_config: ScanConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            collection_a: PathBuf::new(),
            collection_b: PathBuf::new(),
            grid: GridSpec::default(),
            palette: Vec::new(),
            tolerance: DEFAULT_TOLERANCE,
            scorer: ScorerConfig::default(),
            scan_config: ScanConfig::default(),
        }
    }
}

/// Builder for pipeline configuration
pub struct PipelineBuilder {
    config: PipelineConfig,
    scanner: Option<Box<dyn ImageScanner>>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            scanner: None,
        }
    }

    /// Set the directory of collection A
    pub fn collection_a(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.collection_a = path.into();
        self
    }

    /// Set the directory of collection B
    pub fn collection_b(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.collection_b = path.into();
        self
    }

    /// Set the grid geometry
    pub fn grid(mut self, grid: GridSpec) -> Self {
        self.config.grid = grid;
        self
    }

    /// Set the decorative colors to mask
    pub fn palette(mut self, palette: Vec<BgrColor>) -> Self {
        self.config.palette = palette;
        self
    }

    /// Set the mask tolerance
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.config.tolerance = tolerance;
        self
    }

    /// Set the similarity configuration
    pub fn scorer(mut self, scorer: ScorerConfig) -> Self {
        self.config.scorer = scorer;
        self
    }

    /// Set scanner configuration
    pub fn scan_config(mut self, config: ScanConfig) -> Self {
        self.config.scan_config = config;
        self
    }

    /// Descend into subdirectories of each collection
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.config.scan_config.recursive = recursive;
        self
    }

    /// Replace the directory scanner
    pub fn scanner(mut self, scanner: Box<dyn ImageScanner>) -> Self {
        self.scanner = Some(scanner);
        self
    }

    /// Build the pipeline, validating the configuration
    pub fn build(self) -> Result<Pipeline, TileDiffError> {
        let config = self.config;

        if config.collection_a.as_os_str().is_empty() || config.collection_b.as_os_str().is_empty()
        {
            return Err(TileDiffError::Config(
                "both collection directories must be set".to_string(),
            ));
        }
        if config.grid.rows == 0 || config.grid.cols == 0 {
            return Err(TileDiffError::Config(format!(
                "grid must have at least one row and one column, got {}x{}",
                config.grid.rows, config.grid.cols
            )));
        }

        let engine = DifferenceEngine::new(config.scorer.clone().build()?);
        let scanner = self
            .scanner
            .unwrap_or_else(|| Box::new(WalkDirScanner::new(config.scan_config.clone())));

        Ok(Pipeline {
            slicer: GridSlicer::new(config.grid),
            mask: ColorMask::new(config.palette.clone(), config.tolerance),
            engine,
            scanner,
            config,
        })
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The collection comparison pipeline
pub struct Pipeline {
    config: PipelineConfig,
    scanner: Box<dyn ImageScanner>,
    slicer: GridSlicer,
    mask: ColorMask,
    engine: DifferenceEngine,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline without events
    pub fn run(&self) -> Result<PipelineResult, TileDiffError> {
        self.run_with_events(&null_sender())
    }

    /// Run the pipeline with event reporting
    pub fn run_with_events(&self, events: &EventSender) -> Result<PipelineResult, TileDiffError> {
        self.run_with_cancel(events, &CancellationToken::new())
    }

    /// Run the pipeline with event reporting and cooperative cancellation.
    ///
    /// Cancellation is checked between phases, between source images and
    /// between tiles of the comparison.
    pub fn run_with_cancel(
        &self,
        events: &EventSender,
        cancel: &CancellationToken,
    ) -> Result<PipelineResult, TileDiffError> {
        let result = self.execute(events, cancel);

        match &result {
            Err(TileDiffError::Cancelled) => {
                events.send(Event::Pipeline(PipelineEvent::Cancelled));
            }
            Err(e) => {
                events.send(Event::Pipeline(PipelineEvent::Error {
                    message: e.to_string(),
                }));
            }
            Ok(_) => {}
        }

        result
    }

    fn execute(
        &self,
        events: &EventSender,
        cancel: &CancellationToken,
    ) -> Result<PipelineResult, TileDiffError> {
        let start_time = Instant::now();
        let mut errors = Vec::new();

        events.send(Event::Pipeline(PipelineEvent::Started));

        // Phase 1: Scanning
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Scanning,
        }));

        let scan_a = self
            .scanner
            .scan_with_events(&self.config.collection_a, events)?;
        let scan_b = self
            .scanner
            .scan_with_events(&self.config.collection_b, events)?;

        errors.extend(scan_a.errors.iter().map(|e| e.to_string()));
        errors.extend(scan_b.errors.iter().map(|e| e.to_string()));

        let paths_a = scan_a.paths();
        let paths_b = scan_b.paths();
        tracing::info!(
            "Found {} image(s) in A and {} image(s) in B",
            paths_a.len(),
            paths_b.len()
        );
        check_cancelled(cancel)?;

        // Phase 2: Slicing
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Slicing,
        }));

        let tiles_a = self.extract_tiles(&paths_a, CollectionSide::A, events, cancel, &mut errors)?;
        let tiles_b = self.extract_tiles(&paths_b, CollectionSide::B, events, cancel, &mut errors)?;
        let (tile_count_a, tile_count_b) = (tiles_a.len(), tiles_b.len());
        check_cancelled(cancel)?;

        // Phase 3: Comparing
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Comparing,
        }));

        let diff = self
            .engine
            .compare_collections_with_events(tiles_a, tiles_b, events, cancel)
            .map_err(|e| match e {
                CompareError::Cancelled => TileDiffError::Cancelled,
                other => TileDiffError::Compare(other),
            })?;

        let result = PipelineResult {
            collection_a: self.config.collection_a.clone(),
            collection_b: self.config.collection_b.clone(),
            algorithm: self.engine.scorer().kind(),
            grid: self.config.grid,
            only_in_a: diff.only_in_a,
            only_in_b: diff.only_in_b,
            images_a: paths_a.len(),
            images_b: paths_b.len(),
            tiles_a: tile_count_a,
            tiles_b: tile_count_b,
            errors,
            duration_ms: start_time.elapsed().as_millis() as u64,
        };

        tracing::info!(
            "{} tile(s) only in A, {} tile(s) only in B in {} ms",
            result.only_in_a.len(),
            result.only_in_b.len(),
            result.duration_ms
        );

        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: result.summary(),
        }));

        Ok(result)
    }

    /// Decode, slice and mask every image of one collection.
    ///
    /// An image that fails to load or slice contributes no tiles; the
    /// failure is recorded and the run continues.
    fn extract_tiles(
        &self,
        paths: &[PathBuf],
        side: CollectionSide,
        events: &EventSender,
        cancel: &CancellationToken,
        errors: &mut Vec<String>,
    ) -> Result<Vec<Tile>, TileDiffError> {
        let total = paths.len();
        events.send(Event::Slice(SliceEvent::Started {
            total_images: total,
        }));

        let completed = AtomicUsize::new(0);

        let per_image: Vec<Result<Vec<Tile>, String>> = paths
            .par_iter()
            .map(|path| {
                if cancel.is_cancelled() {
                    return Ok(Vec::new());
                }

                let outcome = self.tiles_for(path).map_err(|e| {
                    tracing::warn!("Skipping {} in collection {}: {}", path.display(), side, e);
                    events.send(Event::Slice(SliceEvent::Error {
                        path: path.clone(),
                        message: e.to_string(),
                    }));
                    e.to_string()
                });

                let current = completed.fetch_add(1, Ordering::SeqCst) + 1;
                events.send(Event::Slice(SliceEvent::Progress(SliceProgress {
                    completed: current,
                    total,
                    current_path: path.clone(),
                })));

                outcome
            })
            .collect();

        check_cancelled(cancel)?;

        let mut tiles = Vec::with_capacity(total * self.config.grid.cell_count());
        for outcome in per_image {
            match outcome {
                Ok(image_tiles) => tiles.extend(image_tiles),
                Err(message) => errors.push(message),
            }
        }

        events.send(Event::Slice(SliceEvent::Completed {
            total_tiles: tiles.len(),
        }));

        Ok(tiles)
    }

    fn tiles_for(&self, path: &Path) -> Result<Vec<Tile>, TileDiffError> {
        let image = ImageLoader::load(path)?;
        let tiles = self.slicer.slice(&image, path)?;

        if self.mask.is_empty() {
            return Ok(tiles);
        }
        Ok(tiles.iter().map(|tile| self.mask.apply_tile(tile)).collect())
    }
}

fn check_cancelled(cancel: &CancellationToken) -> Result<(), TileDiffError> {
    if cancel.is_cancelled() {
        return Err(TileDiffError::Cancelled);
    }
    Ok(())
}
