//! # Difference Module
//!
//! Finds the tiles of one collection that have no similar counterpart in
//! another.
//!
//! ## How It Works
//! 1. Compute every tile's signature once (in parallel)
//! 2. For each tile of A, look for any tile of B the scorer accepts
//! 3. Keep the tiles of A that found none, in A's order
//!
//! The relation is asymmetric: `difference(A, B)` and `difference(B, A)`
//! answer different questions, so [`DifferenceEngine::compare_collections`]
//! runs both directions over the same signatures.
//!
//! ## Parallelism
//! The outer loop over A runs on rayon with an order-preserving collect.
//! The inner search over B stops at the first accepted candidate.

use crate::core::cancel::CancellationToken;
use crate::core::similarity::{SimilarityScorer, TileSignature};
use crate::core::tile::Tile;
use crate::error::{CompareError, ScoreError};
use crate::events::{
    null_sender, CollectionSide, CompareEvent, CompareProgress, Event, EventSender,
};
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Both directions of a collection comparison
#[derive(Debug, Clone, Default)]
pub struct CollectionDiff {
    /// Tiles of A with no similar tile in B
    pub only_in_a: Vec<Tile>,
    /// Tiles of B with no similar tile in A
    pub only_in_b: Vec<Tile>,
}

impl CollectionDiff {
    /// True when neither collection has a tile the other lacks
    pub fn is_empty(&self) -> bool {
        self.only_in_a.is_empty() && self.only_in_b.is_empty()
    }
}

/// Computes set differences with a configured similarity strategy
pub struct DifferenceEngine {
    scorer: Box<dyn SimilarityScorer>,
}

impl DifferenceEngine {
    pub fn new(scorer: Box<dyn SimilarityScorer>) -> Self {
        Self { scorer }
    }

    pub fn scorer(&self) -> &dyn SimilarityScorer {
        self.scorer.as_ref()
    }

    /// Tiles of `a` with no similar tile in `b`, in `a`'s order
    pub fn difference<'a>(&self, a: &'a [Tile], b: &[Tile]) -> Result<Vec<&'a Tile>, CompareError> {
        difference(a, b, self.scorer.as_ref())
    }

    /// Same as [`difference`](Self::difference), reporting progress and
    /// honoring cancellation between tiles of `a`.
    pub fn difference_with_events<'a>(
        &self,
        a: &'a [Tile],
        b: &[Tile],
        side: CollectionSide,
        events: &EventSender,
        cancel: &CancellationToken,
    ) -> Result<Vec<&'a Tile>, CompareError> {
        let sig_a = signatures(self.scorer.as_ref(), a)?;
        let sig_b = signatures(self.scorer.as_ref(), b)?;
        let unmatched = unmatched_indices(self.scorer.as_ref(), &sig_a, &sig_b, side, events, cancel)?;

        Ok(unmatched.into_iter().map(|i| &a[i]).collect())
    }

    /// Both directions at once, computing each tile's signature only once
    pub fn compare_collections(
        &self,
        a: Vec<Tile>,
        b: Vec<Tile>,
    ) -> Result<CollectionDiff, CompareError> {
        self.compare_collections_with_events(a, b, &null_sender(), &CancellationToken::new())
    }

    pub fn compare_collections_with_events(
        &self,
        a: Vec<Tile>,
        b: Vec<Tile>,
        events: &EventSender,
        cancel: &CancellationToken,
    ) -> Result<CollectionDiff, CompareError> {
        let scorer = self.scorer.as_ref();
        let sig_a = signatures(scorer, &a)?;
        let sig_b = signatures(scorer, &b)?;

        let only_a = unmatched_indices(scorer, &sig_a, &sig_b, CollectionSide::A, events, cancel)?;
        let only_b = unmatched_indices(scorer, &sig_b, &sig_a, CollectionSide::B, events, cancel)?;

        Ok(CollectionDiff {
            only_in_a: keep_indices(a, &only_a),
            only_in_b: keep_indices(b, &only_b),
        })
    }
}

/// Tiles of `a` with no tile in `b` that `scorer` considers similar.
///
/// Any scoring error aborts the whole computation; no partial result is
/// returned.
pub fn difference<'a>(
    a: &'a [Tile],
    b: &[Tile],
    scorer: &dyn SimilarityScorer,
) -> Result<Vec<&'a Tile>, CompareError> {
    let sig_a = signatures(scorer, a)?;
    let sig_b = signatures(scorer, b)?;
    let unmatched = unmatched_indices(
        scorer,
        &sig_a,
        &sig_b,
        CollectionSide::A,
        &null_sender(),
        &CancellationToken::new(),
    )?;

    Ok(unmatched.into_iter().map(|i| &a[i]).collect())
}

fn signatures(
    scorer: &dyn SimilarityScorer,
    tiles: &[Tile],
) -> Result<Vec<TileSignature>, ScoreError> {
    tiles.par_iter().map(|tile| scorer.signature(tile)).collect()
}

fn unmatched_indices(
    scorer: &dyn SimilarityScorer,
    a: &[TileSignature],
    b: &[TileSignature],
    side: CollectionSide,
    events: &EventSender,
    cancel: &CancellationToken,
) -> Result<Vec<usize>, CompareError> {
    let total_tiles = a.len();
    events.send(Event::Compare(CompareEvent::Started {
        side,
        tiles: total_tiles,
        candidates: b.len(),
    }));

    let completed = AtomicUsize::new(0);
    let unmatched_so_far = AtomicUsize::new(0);
    let update_interval = std::cmp::max(1, total_tiles / 50);

    let verdicts: Vec<Option<usize>> = a
        .par_iter()
        .enumerate()
        .map(|(index, signature)| {
            if cancel.is_cancelled() {
                return Err(CompareError::Cancelled);
            }

            let found = b.par_iter().any(|candidate| scorer.matches(signature, candidate));
            if !found {
                unmatched_so_far.fetch_add(1, Ordering::Relaxed);
            }

            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            if done % update_interval == 0 || done == total_tiles {
                events.send(Event::Compare(CompareEvent::Progress(CompareProgress {
                    side,
                    tiles_completed: done,
                    total_tiles,
                    unmatched: unmatched_so_far.load(Ordering::Relaxed),
                })));
            }

            Ok((!found).then_some(index))
        })
        .collect::<Result<_, _>>()?;

    let unmatched: Vec<usize> = verdicts.into_iter().flatten().collect();
    tracing::debug!(
        "{}: {} of {} tiles without a match among {} candidates",
        side,
        unmatched.len(),
        total_tiles,
        b.len()
    );

    events.send(Event::Compare(CompareEvent::Completed {
        side,
        unmatched: unmatched.len(),
    }));

    Ok(unmatched)
}

/// Move the tiles at the given ascending indices out of `tiles`
fn keep_indices(tiles: Vec<Tile>, indices: &[usize]) -> Vec<Tile> {
    let mut wanted = indices.iter().peekable();
    tiles
        .into_iter()
        .enumerate()
        .filter_map(|(i, tile)| {
            if wanted.peek() == Some(&&i) {
                wanted.next();
                Some(tile)
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::similarity::{ExactScorer, StatisticalScorer};
    use crate::core::tile::GridCell;
    use crate::events::EventChannel;
    use image::{DynamicImage, ImageBuffer, Rgb};

    fn tile(value: u8, col: u32) -> Tile {
        Tile::new(
            DynamicImage::ImageRgb8(ImageBuffer::from_fn(8, 8, |x, y| {
                Rgb([value, (x * 10) as u8, (y * 10) as u8])
            })),
            "set.png",
            GridCell { row: 0, col },
        )
    }

    fn collection(values: &[u8]) -> Vec<Tile> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| tile(v, i as u32))
            .collect()
    }

    fn cells(tiles: &[&Tile]) -> Vec<u32> {
        tiles.iter().map(|t| t.cell().col).collect()
    }

    #[test]
    fn difference_with_itself_is_empty() {
        let a = collection(&[1, 2, 3, 4]);
        let result = difference(&a, &a, &ExactScorer).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn difference_with_empty_returns_all_in_order() {
        let a = collection(&[9, 3, 7]);
        let result = difference(&a, &[], &ExactScorer).unwrap();
        assert_eq!(cells(&result), vec![0, 1, 2]);
    }

    #[test]
    fn empty_minus_anything_is_empty() {
        let b = collection(&[1, 2]);
        assert!(difference(&[], &b, &ExactScorer).unwrap().is_empty());
    }

    #[test]
    fn difference_is_asymmetric() {
        let a = collection(&[1, 2, 3]);
        let b = collection(&[2, 3, 4, 5]);

        let only_a = difference(&a, &b, &ExactScorer).unwrap();
        let only_b = difference(&b, &a, &ExactScorer).unwrap();

        assert_eq!(cells(&only_a), vec![0]);
        assert_eq!(cells(&only_b), vec![2, 3]);
    }

    #[test]
    fn result_is_subset_of_a_in_a_order() {
        let a = collection(&[10, 20, 30, 40, 50, 60]);
        let b = collection(&[20, 50]);

        let result = difference(&a, &b, &ExactScorer).unwrap();
        assert_eq!(cells(&result), vec![0, 2, 3, 5]);
        for t in &result {
            assert!(a.iter().any(|x| std::ptr::eq(x, *t)));
        }
    }

    #[test]
    fn duplicates_in_a_are_kept_each() {
        let a = collection(&[7, 7, 8]);
        let b = collection(&[8]);

        let result = difference(&a, &b, &ExactScorer).unwrap();
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn engine_uses_its_scorer() {
        let engine = DifferenceEngine::new(Box::new(StatisticalScorer::default()));
        let a = collection(&[0, 255]);
        let b = collection(&[0]);

        let result = engine.difference(&a, &b).unwrap();
        assert_eq!(cells(&result), vec![1]);
    }

    #[test]
    fn scoring_error_aborts_without_partial_result() {
        let mut a = collection(&[1, 2]);
        a.push(Tile::new(
            DynamicImage::new_rgb8(0, 4),
            "broken.png",
            GridCell { row: 0, col: 9 },
        ));
        let b = collection(&[1]);

        let result = difference(&a, &b, &ExactScorer);
        assert!(matches!(
            result,
            Err(CompareError::Score(ScoreError::InvalidInput { .. }))
        ));
    }

    #[test]
    fn compare_collections_runs_both_directions() {
        let engine = DifferenceEngine::new(Box::new(ExactScorer));
        let a = collection(&[1, 2, 3]);
        let b = collection(&[3, 4]);

        let diff = engine.compare_collections(a, b).unwrap();
        let only_a: Vec<u32> = diff.only_in_a.iter().map(|t| t.cell().col).collect();
        let only_b: Vec<u32> = diff.only_in_b.iter().map(|t| t.cell().col).collect();

        assert_eq!(only_a, vec![0, 1]);
        assert_eq!(only_b, vec![1]);
        assert!(!diff.is_empty());
    }

    #[test]
    fn cancelled_comparison_returns_cancelled() {
        let engine = DifferenceEngine::new(Box::new(ExactScorer));
        let a = collection(&[1, 2, 3]);
        let b = collection(&[4]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result =
            engine.difference_with_events(&a, &b, CollectionSide::A, &null_sender(), &cancel);
        assert!(matches!(result, Err(CompareError::Cancelled)));
    }

    #[test]
    fn progress_events_are_emitted() {
        let engine = DifferenceEngine::new(Box::new(ExactScorer));
        let a = collection(&[1, 2, 3]);
        let b = collection(&[2]);
        let (sender, receiver) = EventChannel::new();

        let result = engine
            .difference_with_events(&a, &b, CollectionSide::B, &sender, &CancellationToken::new())
            .unwrap();
        drop(sender);

        let events: Vec<Event> = receiver.iter().collect();
        assert!(matches!(
            events.first(),
            Some(Event::Compare(CompareEvent::Started { side: CollectionSide::B, tiles: 3, candidates: 1 }))
        ));
        assert!(matches!(
            events.last(),
            Some(Event::Compare(CompareEvent::Completed { unmatched: 2, .. }))
        ));
        assert_eq!(result.len(), 2);
    }
}
