//! Reachability ordering for OPTICS.
//!
//! The expander finalises points one at a time in order of increasing
//! reachability distance, growing each density-connected region before moving
//! to the next. The result is a permutation of the input (the *ordering*) and
//! the reachability of each point at the moment it was finalised (the
//! *reachability plot*). Both extractors consume this ordering read-only.

mod core_distance;
mod heap;

use std::{num::NonZeroUsize, sync::Arc};

use tracing::{info, instrument};

use crate::{
    datasource::DataSource,
    error::{DataSourceError, OpticsError, Result},
};

pub use self::core_distance::{core_distance, core_distances};

use self::{core_distance::neighbour_distances, heap::IndexedMinHeap};

/// Immutable output of an expansion.
///
/// `ordering` and `reachability` are co-indexed by ordering position;
/// `core_distances` and `predecessors` are indexed by original point index.
#[derive(Clone, Debug, PartialEq)]
pub struct ReachabilityOrdering {
    ordering: Vec<usize>,
    reachability: Vec<f64>,
    core_distances: Vec<f64>,
    predecessors: Vec<Option<usize>>,
    min_samples: NonZeroUsize,
    max_bound: f64,
}

impl ReachabilityOrdering {
    /// Point indices in the order they were finalised.
    #[must_use]
    pub fn ordering(&self) -> &[usize] {
        &self.ordering
    }

    /// Reachability distance of the point at each ordering position.
    ///
    /// Position 0 is always `+inf`; so is the first position of every
    /// further density-disconnected region.
    #[must_use]
    pub fn reachability(&self) -> &[f64] {
        &self.reachability
    }

    /// Core distance of every point, indexed by original point index.
    #[must_use]
    pub fn core_distances(&self) -> &[f64] {
        &self.core_distances
    }

    /// The point whose expansion last lowered each point's reachability,
    /// indexed by original point index. `None` for points that started a
    /// region.
    #[must_use]
    pub fn predecessors(&self) -> &[Option<usize>] {
        &self.predecessors
    }

    /// Number of points in the ordering.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ordering.len()
    }

    /// Whether the ordering is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ordering.is_empty()
    }

    /// The `min_samples` the ordering was built with.
    #[must_use]
    pub const fn min_samples(&self) -> NonZeroUsize {
        self.min_samples
    }

    /// The neighbourhood radius the ordering was built with.
    #[must_use]
    pub const fn max_bound(&self) -> f64 {
        self.max_bound
    }

    /// Iterates `(point, reachability)` pairs in ordering order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.ordering
            .iter()
            .copied()
            .zip(self.reachability.iter().copied())
    }
}

/// Per-point bookkeeping owned by the expander.
struct Frontier {
    processed: Vec<bool>,
    reachability: Vec<f64>,
    predecessors: Vec<Option<usize>>,
    heap: IndexedMinHeap,
    next_seed: usize,
}

impl Frontier {
    fn new(items: usize) -> Self {
        Self {
            processed: vec![false; items],
            reachability: vec![f64::INFINITY; items],
            predecessors: vec![None; items],
            heap: IndexedMinHeap::with_capacity(items),
            next_seed: 0,
        }
    }

    /// Pops the closest queued point, or falls back to the smallest-index
    /// unprocessed point when the queue is empty. Returns the point and
    /// whether it starts a new region.
    fn next(&mut self) -> Option<(usize, bool)> {
        if let Some(entry) = self.heap.pop() {
            return Some((entry.point, false));
        }
        while self.processed.get(self.next_seed).copied()? {
            self.next_seed += 1;
        }
        Some((self.next_seed, true))
    }

    fn is_processed(&self, point: usize) -> bool {
        self.processed.get(point).copied().unwrap_or(true)
    }

    fn finalise(&mut self, point: usize) -> f64 {
        if let Some(flag) = self.processed.get_mut(point) {
            *flag = true;
        }
        self.reachability
            .get(point)
            .copied()
            .unwrap_or(f64::INFINITY)
    }

    /// Lowers the reachability of `target` through `via`; returns whether the
    /// value changed.
    fn relax(&mut self, via: usize, target: usize, candidate: f64) -> bool {
        let Some(current) = self.reachability.get_mut(target) else {
            return false;
        };
        if candidate >= *current {
            return false;
        }
        *current = candidate;
        if let Some(predecessor) = self.predecessors.get_mut(target) {
            *predecessor = Some(via);
        }
        self.heap.push_or_decrease(target, candidate);
        true
    }
}

/// Computes the reachability ordering of `source`.
///
/// Each finalised point issues one [`DataSource::neighbours_within`] query
/// with radius `max_bound`. The same neighbourhood yields the point's core
/// distance and, when that is finite, relaxes every unprocessed neighbour to
/// `max(core(p), d(p, q))`. Ties in reachability are broken by the smaller
/// point index.
///
/// # Errors
/// Returns [`OpticsError::DataSource`] when a query fails or yields an
/// out-of-range index, and [`OpticsError::InvalidDistance`] when a distance
/// is NaN, infinite, or negative.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use optics_core::{DataSource, DataSourceError, expand};
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
/// let two = NonZeroUsize::new(2).expect("non-zero");
/// let ordering = expand(&Line(vec![0.0, 10.0, 1.0, 11.0]), two, f64::INFINITY)?;
/// assert_eq!(ordering.ordering(), [0, 2, 1, 3]);
/// assert_eq!(ordering.reachability()[1], 1.0);
/// assert_eq!(ordering.reachability()[2], 9.0);
/// # Ok::<(), optics_core::OpticsError>(())
/// ```
#[instrument(
    name = "core.expand",
    err,
    skip(source),
    fields(
        data_source = %source.name(),
        items = source.len(),
        min_samples = min_samples.get(),
        max_bound = max_bound,
    ),
)]
pub fn expand<D: DataSource>(
    source: &D,
    min_samples: NonZeroUsize,
    max_bound: f64,
) -> Result<ReachabilityOrdering> {
    let items = source.len();
    let mut frontier = Frontier::new(items);
    let mut ordering = Vec::with_capacity(items);
    let mut plot = Vec::with_capacity(items);
    let mut core_distances = vec![f64::INFINITY; items];
    let mut updates = 0_u64;
    let mut regions = 0_usize;

    while let Some((point, starts_region)) = frontier.next() {
        if starts_region {
            regions += 1;
        }
        ordering.push(point);
        plot.push(frontier.finalise(point));

        let neighbours = neighbour_distances(source, point, max_bound)?;
        let mut distances: Vec<f64> = neighbours.iter().map(|&(_, distance)| distance).collect();
        let point_core = core_distance(&mut distances, min_samples);
        if let Some(slot) = core_distances.get_mut(point) {
            *slot = point_core;
        }
        if !point_core.is_finite() {
            continue;
        }

        for (neighbour, distance) in neighbours {
            if neighbour >= items {
                return Err(OpticsError::DataSource {
                    data_source: Arc::from(source.name()),
                    error: DataSourceError::OutOfBounds { index: neighbour },
                });
            }
            if frontier.is_processed(neighbour) {
                continue;
            }
            if frontier.relax(point, neighbour, point_core.max(distance)) {
                updates += 1;
            }
        }
    }

    record_expansion(items, updates);
    info!(
        points = ordering.len(),
        regions,
        reachability_updates = updates,
        "reachability ordering completed"
    );

    Ok(ReachabilityOrdering {
        ordering,
        reachability: plot,
        core_distances,
        predecessors: frontier.predecessors,
        min_samples,
        max_bound,
    })
}

#[cfg(feature = "metrics")]
fn record_expansion(items: usize, updates: u64) {
    metrics::counter!("optics_points_expanded_total").increment(items as u64);
    metrics::counter!("optics_reachability_updates_total").increment(updates);
}

#[cfg(not(feature = "metrics"))]
const fn record_expansion(_items: usize, _updates: u64) {}

#[cfg(test)]
mod tests;
