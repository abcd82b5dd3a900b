//! Core-distance oracle.

use std::{num::NonZeroUsize, sync::Arc};

use crate::{
    datasource::DataSource,
    error::{OpticsError, Result},
};

/// Returns the `min_samples`-th smallest value of `neighbour_distances`, or
/// `+inf` when fewer than `min_samples` distances are supplied.
///
/// `neighbour_distances` must hold the distances from one point to every
/// point within the search radius, the point itself included. The slice is
/// reordered in place.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use optics_core::core_distance;
///
/// let mut distances = [0.0, 3.0, 1.0, 2.0];
/// let two = NonZeroUsize::new(2).expect("non-zero");
/// assert_eq!(core_distance(&mut distances, two), 1.0);
///
/// let five = NonZeroUsize::new(5).expect("non-zero");
/// assert_eq!(core_distance(&mut distances, five), f64::INFINITY);
/// ```
#[must_use]
pub fn core_distance(neighbour_distances: &mut [f64], min_samples: NonZeroUsize) -> f64 {
    let rank = min_samples.get() - 1;
    if rank >= neighbour_distances.len() {
        return f64::INFINITY;
    }
    let (_, kth, _) = neighbour_distances.select_nth_unstable_by(rank, f64::total_cmp);
    *kth
}

/// Computes the core distance of every point in `source`, indexed by point.
///
/// The expander evaluates core distances lazily as points are finalised;
/// this helper exposes the same values without running an expansion.
///
/// # Errors
/// Returns [`OpticsError::DataSource`] when a neighbourhood query fails and
/// [`OpticsError::InvalidDistance`] when a returned distance is NaN,
/// infinite, or negative.
pub fn core_distances<D: DataSource>(
    source: &D,
    min_samples: NonZeroUsize,
    max_bound: f64,
) -> Result<Vec<f64>> {
    (0..source.len())
        .map(|point| {
            let mut distances = neighbour_distances(source, point, max_bound)?
                .into_iter()
                .map(|(_, distance)| distance)
                .collect::<Vec<_>>();
            Ok(core_distance(&mut distances, min_samples))
        })
        .collect()
}

/// Queries the neighbourhood of `point` and validates every distance.
pub(crate) fn neighbour_distances<D: DataSource>(
    source: &D,
    point: usize,
    radius: f64,
) -> Result<Vec<(usize, f64)>> {
    let neighbours =
        source
            .neighbours_within(point, radius)
            .map_err(|error| OpticsError::DataSource {
                data_source: Arc::from(source.name()),
                error,
            })?;
    neighbours
        .into_iter()
        .map(|neighbour| {
            if neighbour.distance.is_finite() && neighbour.distance >= 0.0 {
                Ok((neighbour.index, neighbour.distance))
            } else {
                Err(OpticsError::InvalidDistance {
                    data_source: Arc::from(source.name()),
                    left: point,
                    right: neighbour.index,
                    distance: neighbour.distance,
                })
            }
        })
        .collect()
}
