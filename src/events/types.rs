//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the tile difference pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Scanning phase events
    Scan(ScanEvent),
    /// Loading and slicing phase events
    Slice(SliceEvent),
    /// Comparison phase events
    Compare(CompareEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Which of the two collections an event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectionSide {
    A,
    B,
}

impl std::fmt::Display for CollectionSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectionSide::A => write!(f, "A"),
            CollectionSide::B => write!(f, "B"),
        }
    }
}

/// Events during the scanning phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Scanning has started
    Started { paths: Vec<PathBuf> },
    /// An image file was found
    ImageFound { path: PathBuf },
    /// An error occurred but scanning continues
    Error { path: PathBuf, message: String },
    /// Scanning completed
    Completed { total_images: usize },
}

/// Events during the loading and slicing phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SliceEvent {
    /// Slicing has started
    Started { total_images: usize },
    /// Progress update after one source image
    Progress(SliceProgress),
    /// A source image could not be loaded or sliced; it contributes no tiles
    Error { path: PathBuf, message: String },
    /// Slicing completed
    Completed { total_tiles: usize },
}

/// Progress information during slicing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SliceProgress {
    /// Number of source images processed so far
    pub completed: usize,
    /// Total number of source images
    pub total: usize,
    /// Image just processed
    pub current_path: PathBuf,
}

/// Events during the comparison phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CompareEvent {
    /// One direction of the comparison has started
    Started {
        side: CollectionSide,
        tiles: usize,
        candidates: usize,
    },
    /// Progress update during comparison
    Progress(CompareProgress),
    /// One direction of the comparison completed
    Completed {
        side: CollectionSide,
        unmatched: usize,
    },
}

/// Progress information during comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareProgress {
    /// Direction being compared
    pub side: CollectionSide,
    /// Number of tiles fully classified
    pub tiles_completed: usize,
    /// Number of tiles to classify
    pub total_tiles: usize,
    /// Tiles without a match so far
    pub unmatched: usize,
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Pipeline has started
    Started,
    /// Moving to a new phase
    PhaseChanged { phase: PipelinePhase },
    /// Pipeline completed successfully
    Completed { summary: PipelineSummary },
    /// Pipeline was cancelled
    Cancelled,
    /// Pipeline encountered a fatal error
    Error { message: String },
}

/// Phases of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Scanning,
    Slicing,
    Comparing,
}

/// Summary of pipeline results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Tiles extracted from collection A
    pub tiles_a: usize,
    /// Tiles extracted from collection B
    pub tiles_b: usize,
    /// Tiles of A without a match in B
    pub only_in_a: usize,
    /// Tiles of B without a match in A
    pub only_in_b: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Scanning => write!(f, "Scanning"),
            PipelinePhase::Slicing => write!(f, "Slicing"),
            PipelinePhase::Comparing => write!(f, "Comparing"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_serializable() {
        let event = Event::Slice(SliceEvent::Progress(SliceProgress {
            completed: 3,
            total: 8,
            current_path: PathBuf::from("/drops/week1.png"),
        }));

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: Event = serde_json::from_str(&json).unwrap();

        match deserialized {
            Event::Slice(SliceEvent::Progress(p)) => {
                assert_eq!(p.completed, 3);
                assert_eq!(p.total, 8);
            }
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn pipeline_summary_is_serializable() {
        let summary = PipelineSummary {
            tiles_a: 250,
            tiles_b: 275,
            only_in_a: 3,
            only_in_b: 28,
            duration_ms: 5000,
        };

        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"only_in_b\":28"));
    }

    #[test]
    fn phase_display() {
        assert_eq!(PipelinePhase::Slicing.to_string(), "Slicing");
        assert_eq!(CollectionSide::B.to_string(), "B");
    }
}
