//! Brute-force Hamming matching with Lowe's ratio test.

use super::Descriptor;

/// Hamming distance: count differing bits
#[inline]
pub fn hamming(a: &Descriptor, b: &Descriptor) -> u32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x ^ y).count_ones()).sum()
}

/// The two nearest train descriptors for one query descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnnMatch {
    /// Index into the query set
    pub query: usize,
    /// Index of the nearest train descriptor
    pub best: usize,
    pub best_distance: u32,
    /// Distance of the runner-up, absent when the train set has one element
    pub second_distance: Option<u32>,
}

impl KnnMatch {
    /// Accept the nearest neighbor only if it is clearly closer than the runner-up
    pub fn passes_ratio(&self, ratio: f32) -> bool {
        match self.second_distance {
            Some(second) => (self.best_distance as f64) < ratio as f64 * second as f64,
            None => false,
        }
    }
}

/// Find the two nearest train descriptors for every query descriptor.
///
/// Ties keep the lower train index, so the result is deterministic.
/// Returns an empty vector when either side is empty.
pub fn knn2(query: &[Descriptor], train: &[Descriptor]) -> Vec<KnnMatch> {
    if train.is_empty() {
        return Vec::new();
    }

    query
        .iter()
        .enumerate()
        .map(|(qi, q)| {
            let mut best = (u32::MAX, 0usize);
            let mut second = u32::MAX;

            for (ti, t) in train.iter().enumerate() {
                let d = hamming(q, t);
                if d < best.0 {
                    second = best.0;
                    best = (d, ti);
                } else if d < second {
                    second = d;
                }
            }

            KnnMatch {
                query: qi,
                best: best.1,
                best_distance: best.0,
                second_distance: (train.len() > 1).then_some(second),
            }
        })
        .collect()
}

/// Number of query descriptors whose nearest neighbor passes the ratio test
pub fn count_good_matches(query: &[Descriptor], train: &[Descriptor], ratio: f32) -> usize {
    knn2(query, train)
        .iter()
        .filter(|m| m.passes_ratio(ratio))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(fill: u8, ones_in_first: u32) -> Descriptor {
        let mut d = [fill; 32];
        d[0] = if ones_in_first >= 8 {
            0xFF
        } else {
            (1u16 << ones_in_first) as u8 - 1
        };
        d
    }

    #[test]
    fn hamming_counts_differing_bits() {
        assert_eq!(hamming(&[0u8; 32], &[0u8; 32]), 0);
        assert_eq!(hamming(&[0u8; 32], &[0xFF; 32]), 256);
        assert_eq!(hamming(&descriptor(0, 3), &descriptor(0, 0)), 3);
    }

    #[test]
    fn knn_finds_two_nearest() {
        let query = [descriptor(0, 0)];
        let train = [descriptor(0, 5), descriptor(0, 1), descriptor(0, 3)];

        let matches = knn2(&query, &train);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].best, 1);
        assert_eq!(matches[0].best_distance, 1);
        assert_eq!(matches[0].second_distance, Some(3));
    }

    #[test]
    fn ties_keep_lower_index() {
        let query = [descriptor(0, 0)];
        let train = [descriptor(0, 2), descriptor(0, 2)];

        let m = knn2(&query, &train)[0];
        assert_eq!(m.best, 0);
        assert_eq!(m.second_distance, Some(2));
        assert!(!m.passes_ratio(0.75));
    }

    #[test]
    fn ratio_test_rejects_ambiguous_matches() {
        let clear = KnnMatch {
            query: 0,
            best: 0,
            best_distance: 10,
            second_distance: Some(40),
        };
        let ambiguous = KnnMatch {
            second_distance: Some(12),
            ..clear
        };
        let exact_duplicate = KnnMatch {
            best_distance: 0,
            second_distance: Some(0),
            ..clear
        };

        assert!(clear.passes_ratio(0.75));
        assert!(!ambiguous.passes_ratio(0.75));
        assert!(!exact_duplicate.passes_ratio(0.75));
    }

    #[test]
    fn single_train_descriptor_never_passes() {
        let query = [descriptor(0, 0)];
        let train = [descriptor(0, 0)];

        let m = knn2(&query, &train)[0];
        assert_eq!(m.second_distance, None);
        assert_eq!(count_good_matches(&query, &train, 0.75), 0);
    }

    #[test]
    fn empty_train_set_has_no_matches() {
        assert!(knn2(&[descriptor(0, 0)], &[]).is_empty());
        assert_eq!(count_good_matches(&[], &[descriptor(0, 0)], 0.75), 0);
    }
}
