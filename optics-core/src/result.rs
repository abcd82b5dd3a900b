//! Result types for cluster extraction.
//!
//! Provides flat label assignments with explicit noise and validation of
//! cluster identifier constraints.

use std::collections::HashSet;
use thiserror::Error;

/// Integer label used for noise points by [`ClusteringResult::labels`].
pub const NOISE_LABEL: i64 = -1;

/// Flat labels produced by one extraction over a fitted ordering.
///
/// Assignments are indexed by original point index; `None` marks noise.
///
/// # Examples
/// ```
/// use optics_core::{ClusterId, ClusteringResult};
///
/// let result = ClusteringResult::try_from_assignments(vec![
///     Some(ClusterId::new(0)),
///     None,
///     Some(ClusterId::new(1)),
/// ])
/// .expect("identifiers are contiguous");
/// assert_eq!(result.cluster_count(), 2);
/// assert_eq!(result.noise_count(), 1);
/// assert_eq!(result.labels(), [0, -1, 1]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusteringResult {
    assignments: Vec<Option<ClusterId>>,
    cluster_count: usize,
}

/// Error returned when cluster identifiers are not contiguous starting at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NonContiguousClusterIds {
    /// The assignments do not include cluster `0`.
    #[error("cluster identifiers must include 0")]
    MissingZero,
    /// The assignments skip identifiers.
    #[error("cluster identifiers must be contiguous without gaps")]
    Gap,
    /// The assignments require identifiers that cannot be rendered as labels.
    #[error("cluster identifiers exceed the signed label range")]
    Overflow,
}

impl ClusteringResult {
    /// Builds a result from identifiers the caller already numbered densely.
    pub(crate) fn from_dense_assignments(
        assignments: Vec<Option<ClusterId>>,
        cluster_count: usize,
    ) -> Self {
        debug_assert!(
            assignments
                .iter()
                .flatten()
                .all(|id| usize::try_from(id.get()).is_ok_and(|v| v < cluster_count))
        );
        Self {
            assignments,
            cluster_count,
        }
    }

    /// Attempts to build a result from cluster assignments.
    ///
    /// Identifiers must be contiguous starting at zero. An input with no
    /// clustered points (empty, or entirely noise) yields `cluster_count == 0`.
    ///
    /// # Errors
    /// Returns [`NonContiguousClusterIds::MissingZero`] when the assignments omit
    /// cluster `0`, [`NonContiguousClusterIds::Gap`] when identifiers skip values,
    /// and [`NonContiguousClusterIds::Overflow`] when an identifier cannot be
    /// represented as a signed label.
    pub fn try_from_assignments(
        assignments: Vec<Option<ClusterId>>,
    ) -> Result<Self, NonContiguousClusterIds> {
        let mut seen = HashSet::new();
        let mut max_id = None::<u64>;

        for id in assignments.iter().flatten() {
            let value = id.get();
            if i64::try_from(value).is_err() {
                return Err(NonContiguousClusterIds::Overflow);
            }
            seen.insert(value);
            max_id = Some(max_id.map_or(value, |current| current.max(value)));
        }

        let Some(max_id) = max_id else {
            return Ok(Self {
                assignments,
                cluster_count: 0,
            });
        };

        if !seen.contains(&0) {
            return Err(NonContiguousClusterIds::MissingZero);
        }
        let expected = usize::try_from(max_id).map_err(|_| NonContiguousClusterIds::Overflow)?;
        if seen.len() != expected + 1 {
            return Err(NonContiguousClusterIds::Gap);
        }

        Ok(Self {
            assignments,
            cluster_count: seen.len(),
        })
    }

    /// Returns the assignments indexed by original point index.
    #[must_use]
    pub fn assignments(&self) -> &[Option<ClusterId>] {
        &self.assignments
    }

    /// Counts how many distinct clusters exist within the assignments.
    #[must_use]
    pub fn cluster_count(&self) -> usize {
        self.cluster_count
    }

    /// Counts the points labelled as noise.
    #[must_use]
    pub fn noise_count(&self) -> usize {
        self.assignments.iter().filter(|id| id.is_none()).count()
    }

    /// Renders the assignments as integer labels with [`NOISE_LABEL`] for
    /// noise.
    #[must_use]
    pub fn labels(&self) -> Vec<i64> {
        self.assignments
            .iter()
            .map(|id| {
                id.and_then(|id| i64::try_from(id.get()).ok())
                    .unwrap_or(NOISE_LABEL)
            })
            .collect()
    }

    /// Returns the number of points in each cluster, indexed by identifier.
    ///
    /// # Examples
    /// ```
    /// use optics_core::{ClusterId, ClusteringResult};
    ///
    /// let result = ClusteringResult::try_from_assignments(vec![
    ///     Some(ClusterId::new(1)),
    ///     Some(ClusterId::new(0)),
    ///     Some(ClusterId::new(1)),
    /// ])
    /// .expect("identifiers are contiguous");
    /// assert_eq!(result.cluster_sizes(), [1, 2]);
    /// ```
    #[must_use]
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.cluster_count];
        for id in self.assignments.iter().flatten() {
            if let Some(slot) = usize::try_from(id.get())
                .ok()
                .and_then(|index| sizes.get_mut(index))
            {
                *slot += 1;
            }
        }
        sizes
    }
}

/// Identifier assigned to a cluster.
///
/// # Examples
/// ```
/// use optics_core::ClusterId;
///
/// let id = ClusterId::new(4);
/// assert_eq!(id.get(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClusterId(u64);

impl ClusterId {
    /// Creates a new cluster identifier.
    #[rustfmt::skip]
    #[must_use]
    pub const fn new(id: u64) -> Self { Self(id) }

    /// Returns the underlying numeric identifier.
    #[rustfmt::skip]
    #[must_use]
    pub const fn get(self) -> u64 { self.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn ids(raw: &[i64]) -> Vec<Option<ClusterId>> {
        raw.iter()
            .map(|&value| u64::try_from(value).ok().map(ClusterId::new))
            .collect()
    }

    #[rstest]
    #[case::empty(&[], 0)]
    #[case::all_noise(&[-1, -1], 0)]
    #[case::mixed(&[0, -1, 1, 1, 2], 3)]
    fn accepts_contiguous_assignments(#[case] raw: &[i64], #[case] clusters: usize) {
        let result = ClusteringResult::try_from_assignments(ids(raw)).expect("contiguous ids");
        assert_eq!(result.cluster_count(), clusters);
        assert_eq!(result.labels(), raw);
    }

    #[rstest]
    #[case::missing_zero(&[1, 2], NonContiguousClusterIds::MissingZero)]
    #[case::gap(&[0, -1, 2], NonContiguousClusterIds::Gap)]
    fn rejects_non_contiguous_assignments(
        #[case] raw: &[i64],
        #[case] expected: NonContiguousClusterIds,
    ) {
        assert_eq!(
            ClusteringResult::try_from_assignments(ids(raw)),
            Err(expected)
        );
    }

    #[test]
    fn rejects_identifiers_beyond_the_label_range() {
        let err = ClusteringResult::try_from_assignments(vec![Some(ClusterId::new(u64::MAX))])
            .expect_err("u64::MAX cannot be rendered as a label");
        assert_eq!(err, NonContiguousClusterIds::Overflow);
    }

    #[test]
    fn counts_noise_and_cluster_sizes() {
        let result =
            ClusteringResult::try_from_assignments(ids(&[0, 0, -1, 1, -1])).expect("valid");
        assert_eq!(result.noise_count(), 2);
        assert_eq!(result.cluster_sizes(), [2, 1]);
    }
}
