//! Data source abstractions consumed by the reachability expander.

use crate::error::DataSourceError;

/// A point returned by a radius query together with its distance to the
/// query point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbour {
    /// Index of the neighbouring point.
    pub index: usize,
    /// Distance from the query point.
    pub distance: f64,
}

/// Abstraction over a collection of items that can yield pairwise distances
/// and radius neighbourhoods.
///
/// # Examples
/// ```
/// use optics_core::{DataSource, DataSourceError};
///
/// struct Line(Vec<f64>);
///
/// impl DataSource for Line {
///     fn len(&self) -> usize { self.0.len() }
///     fn name(&self) -> &str { "line" }
///     fn distance(&self, i: usize, j: usize) -> Result<f64, DataSourceError> {
///         let a = self.0.get(i).ok_or(DataSourceError::OutOfBounds { index: i })?;
///         let b = self.0.get(j).ok_or(DataSourceError::OutOfBounds { index: j })?;
///         Ok((a - b).abs())
///     }
/// }
///
/// let src = Line(vec![1.0, 2.0, 4.0]);
/// assert_eq!(src.len(), 3);
/// assert_eq!(src.distance(0, 2)?, 3.0);
/// assert_eq!(src.batch_distances(0, &[1, 2])?, [1.0, 3.0]);
///
/// let near: Vec<usize> = src
///     .neighbours_within(1, 1.5)?
///     .into_iter()
///     .map(|n| n.index)
///     .collect();
/// assert_eq!(near, [0, 1]);
/// # Ok::<(), DataSourceError>(())
/// ```
pub trait DataSource {
    /// Returns number of items in the source.
    fn len(&self) -> usize;

    /// Returns whether the source contains no items.
    #[must_use]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a human-readable name.
    fn name(&self) -> &str;

    /// Computes the distance between two items.
    fn distance(&self, i: usize, j: usize) -> Result<f64, DataSourceError>;

    /// Computes the distances from `query` to every entry in `candidates`.
    ///
    /// Implementations can override this method to provide vectorised
    /// kernels. The default implementation calls [`Self::distance`]
    /// repeatedly and collects the results.
    ///
    /// # Errors
    /// Returns any [`DataSourceError`] surfaced by [`Self::distance`].
    fn batch_distances(
        &self,
        query: usize,
        candidates: &[usize],
    ) -> Result<Vec<f64>, DataSourceError> {
        candidates
            .iter()
            .map(|&candidate| self.distance(query, candidate))
            .collect()
    }

    /// Returns every point whose distance to `point` is at most `radius`,
    /// including `point` itself, in ascending index order.
    ///
    /// The default implementation scans the whole source through
    /// [`Self::batch_distances`]. Sources backed by a spatial index should
    /// override it; the expander issues exactly one query per point.
    /// Distances that are NaN are kept so that callers can reject them.
    ///
    /// # Errors
    /// Returns any [`DataSourceError`] surfaced by [`Self::batch_distances`].
    fn neighbours_within(
        &self,
        point: usize,
        radius: f64,
    ) -> Result<Vec<Neighbour>, DataSourceError> {
        let candidates: Vec<usize> = (0..self.len()).collect();
        let distances = self.batch_distances(point, &candidates)?;
        Ok(candidates
            .into_iter()
            .zip(distances)
            .filter(|&(_, distance)| !(distance > radius))
            .map(|(index, distance)| Neighbour { index, distance })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::CountingSource;
    use rstest::rstest;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    #[test]
    fn batch_distances_invokes_scalar_distance() {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = CountingSource::new(vec![0.0, 1.0, 3.0], Arc::clone(&calls));

        let distances = source
            .batch_distances(0, &[1, 2])
            .expect("batch distances should succeed");

        assert_eq!(distances, vec![1.0, 3.0]);
        assert_eq!(source.calls().load(Ordering::Relaxed), 2);
    }

    #[test]
    fn batch_distances_propagates_errors() {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = CountingSource::new(vec![0.0, 1.0], calls);

        let err = source
            .batch_distances(0, &[1, 5])
            .expect_err("invalid candidate must fail");

        assert!(
            matches!(err, DataSourceError::OutOfBounds { index: 5 }),
            "expected OutOfBounds with index 5, got {err:?}",
        );
    }

    #[rstest]
    #[case::tight(0.5, vec![2])]
    #[case::inclusive_edge(1.0, vec![1, 2])]
    #[case::everything(f64::INFINITY, vec![0, 1, 2, 3])]
    fn neighbours_within_includes_query_and_boundary(
        #[case] radius: f64,
        #[case] expected: Vec<usize>,
    ) {
        let source = CountingSource::new(vec![0.0, 2.0, 3.0, 7.0], Arc::new(AtomicUsize::new(0)));
        let found: Vec<usize> = source
            .neighbours_within(2, radius)
            .expect("query must succeed")
            .into_iter()
            .map(|n| n.index)
            .collect();
        assert_eq!(found, expected);
    }
}
