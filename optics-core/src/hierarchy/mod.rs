//! Hierarchical cluster extraction from a reachability plot.
//!
//! This module implements the parameter-light extractor:
//!
//! - Normalising the plot so every threshold is scale-free.
//! - Finding local maxima, which are candidate cluster boundaries.
//! - Recursively splitting the ordering at the most prominent maxima while
//!   pruning insignificant, unbalanced, or undersized splits
//!   ([`ClusterTree`]).
//! - Labelling every leaf of the resulting tree that is large enough and
//!   holds density-reachable points, left to right; all other points are
//!   noise.

mod maxima;
mod tree;

use std::{num::NonZeroUsize, ops::Range};

use tracing::{info, instrument};

use crate::{
    error::{OpticsError, Result},
    reachability::ReachabilityOrdering,
    result::{ClusterId, ClusteringResult},
};

pub use self::maxima::find_local_maxima;
pub use self::tree::{ClusterTree, NodeId, TreeNode, TreeParams};

/// Relative tolerance under which a fractional size snaps to an integer.
const FRACTION_SNAP_TOLERANCE: f64 = 1e-9;

/// Smallest cluster the hierarchical extractor will emit.
const MIN_EFFECTIVE_CLUSTER_SIZE: usize = 2;

/// Minimum cluster size, either absolute or relative to the dataset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ClusterSize {
    /// An absolute number of points.
    Count(NonZeroUsize),
    /// A fraction of the dataset in `(0, 1]`.
    Fraction(f64),
}

impl ClusterSize {
    /// Resolves the size against a dataset of `items` points.
    ///
    /// Fractions round up, except that values within floating-point noise of
    /// an integer snap to it, so `Fraction(k / n)` resolves to `k`. Both forms
    /// are floored at two points.
    ///
    /// # Examples
    /// ```
    /// use std::num::NonZeroUsize;
    /// use optics_core::ClusterSize;
    ///
    /// assert_eq!(ClusterSize::Fraction(0.1).resolve(600), 60);
    /// assert_eq!(ClusterSize::Fraction(0.005).resolve(100), 2);
    /// assert_eq!(ClusterSize::Fraction(0.25).resolve(9), 3);
    /// let one = NonZeroUsize::new(1).expect("non-zero");
    /// assert_eq!(ClusterSize::Count(one).resolve(10), 2);
    /// ```
    #[must_use]
    pub fn resolve(self, items: usize) -> usize {
        let resolved = match self {
            Self::Count(count) => count.get(),
            Self::Fraction(fraction) => {
                let raw = fraction * items as f64;
                let nearest = raw.round();
                let tolerance = FRACTION_SNAP_TOLERANCE * items.max(1) as f64;
                let snapped = if (raw - nearest).abs() < tolerance {
                    nearest
                } else {
                    raw.ceil()
                };
                snapped.max(0.0) as usize
            }
        };
        resolved.max(MIN_EFFECTIVE_CLUSTER_SIZE)
    }

    fn validate(self) -> Result<()> {
        match self {
            Self::Count(_) => Ok(()),
            Self::Fraction(fraction) if fraction > 0.0 && fraction <= 1.0 => Ok(()),
            Self::Fraction(fraction) => Err(OpticsError::InvalidParameter {
                name: "min_cluster_size",
                expected: "a fraction in (0, 1]",
                got: fraction,
            }),
        }
    }
}

impl From<NonZeroUsize> for ClusterSize {
    fn from(count: NonZeroUsize) -> Self {
        Self::Count(count)
    }
}

/// Tunables for the hierarchical extractor.
///
/// # Examples
/// ```
/// use optics_core::{ClusterSize, HierarchyConfig};
///
/// let config = HierarchyConfig::default()
///     .with_min_cluster_size(ClusterSize::Fraction(0.05))
///     .with_significant_min(0.01);
/// assert_eq!(config.similarity_ratio(), 0.75);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HierarchyConfig {
    min_cluster_size: ClusterSize,
    neighbourhood: Option<NonZeroUsize>,
    significant_min: f64,
    similarity_ratio: f64,
    rejection_ratio: f64,
    collapse_ratio: f64,
    min_maxima_ratio: f64,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            min_cluster_size: ClusterSize::Fraction(0.005),
            neighbourhood: None,
            significant_min: 0.003,
            similarity_ratio: 0.75,
            rejection_ratio: 0.7,
            collapse_ratio: 0.4,
            min_maxima_ratio: 0.001,
        }
    }
}

impl HierarchyConfig {
    /// Creates a configuration populated with default tunables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the minimum cluster size.
    #[must_use]
    pub const fn with_min_cluster_size(mut self, size: ClusterSize) -> Self {
        self.min_cluster_size = size;
        self
    }

    /// Overrides the local-maxima half-width, which otherwise follows the
    /// ordering's `min_samples`.
    #[must_use]
    pub const fn with_neighbourhood(mut self, neighbourhood: NonZeroUsize) -> Self {
        self.neighbourhood = Some(neighbourhood);
        self
    }

    /// Overrides the smallest normalised reachability a split may have.
    #[must_use]
    pub const fn with_significant_min(mut self, value: f64) -> Self {
        self.significant_min = value;
        self
    }

    /// Overrides the boundary similarity ratio.
    #[must_use]
    pub const fn with_similarity_ratio(mut self, value: f64) -> Self {
        self.similarity_ratio = value;
        self
    }

    /// Overrides the one-sided rejection ratio.
    #[must_use]
    pub const fn with_rejection_ratio(mut self, value: f64) -> Self {
        self.rejection_ratio = value;
        self
    }

    /// Overrides the parent-collapse ratio.
    #[must_use]
    pub const fn with_collapse_ratio(mut self, value: f64) -> Self {
        self.collapse_ratio = value;
        self
    }

    /// Overrides the minimum relative height of a usable local maximum.
    #[must_use]
    pub const fn with_min_maxima_ratio(mut self, value: f64) -> Self {
        self.min_maxima_ratio = value;
        self
    }

    /// Returns the minimum cluster size.
    #[must_use]
    pub const fn min_cluster_size(&self) -> ClusterSize {
        self.min_cluster_size
    }

    /// Returns the explicit local-maxima half-width, if any.
    #[must_use]
    pub const fn neighbourhood(&self) -> Option<NonZeroUsize> {
        self.neighbourhood
    }

    /// Returns the significant minimum.
    #[must_use]
    pub const fn significant_min(&self) -> f64 {
        self.significant_min
    }

    /// Returns the similarity ratio.
    #[must_use]
    pub const fn similarity_ratio(&self) -> f64 {
        self.similarity_ratio
    }

    /// Returns the rejection ratio.
    #[must_use]
    pub const fn rejection_ratio(&self) -> f64 {
        self.rejection_ratio
    }

    /// Returns the collapse ratio.
    #[must_use]
    pub const fn collapse_ratio(&self) -> f64 {
        self.collapse_ratio
    }

    /// Returns the minimum maxima ratio.
    #[must_use]
    pub const fn min_maxima_ratio(&self) -> f64 {
        self.min_maxima_ratio
    }

    /// Checks every tunable against its accepted range.
    ///
    /// # Errors
    /// Returns [`OpticsError::InvalidParameter`] naming the first offending
    /// tunable.
    pub fn validate(&self) -> Result<()> {
        self.min_cluster_size.validate()?;
        check(
            "significant_min",
            "finite and non-negative",
            self.significant_min,
            |v| v.is_finite() && v >= 0.0,
        )?;
        for (name, value) in [
            ("similarity_ratio", self.similarity_ratio),
            ("rejection_ratio", self.rejection_ratio),
            ("collapse_ratio", self.collapse_ratio),
        ] {
            check(name, "in (0, 1]", value, |v| v > 0.0 && v <= 1.0)?;
        }
        check(
            "min_maxima_ratio",
            "in [0, 1)",
            self.min_maxima_ratio,
            |v| (0.0..1.0).contains(&v),
        )
    }

    /// Resolves the tunables against a dataset of `items` points.
    ///
    /// # Errors
    /// Returns [`OpticsError::MinClusterSizeTooLarge`] when the resolved
    /// minimum cluster size exceeds `items`.
    pub fn tree_params(&self, items: usize) -> Result<TreeParams> {
        let min_cluster_size = self.min_cluster_size.resolve(items);
        if min_cluster_size > items {
            return Err(OpticsError::MinClusterSizeTooLarge {
                min_cluster_size,
                n_samples: items,
            });
        }
        Ok(TreeParams {
            min_cluster_size,
            significant_min: self.significant_min,
            similarity_ratio: self.similarity_ratio,
            rejection_ratio: self.rejection_ratio,
            collapse_ratio: self.collapse_ratio,
            min_maxima_ratio: self.min_maxima_ratio,
        })
    }
}

fn check(
    name: &'static str,
    expected: &'static str,
    value: f64,
    accept: impl Fn(f64) -> bool,
) -> Result<()> {
    if accept(value) {
        Ok(())
    } else {
        Err(OpticsError::InvalidParameter {
            name,
            expected,
            got: value,
        })
    }
}

/// Scales a reachability plot into `[0, 1]`.
///
/// Finite values after position 0 are divided by their maximum (when it is
/// positive). Infinite values after position 0 mark the start of a new
/// density-disconnected region and become `1.0`, the tallest possible peak.
/// Position 0 stays `+inf`.
///
/// # Examples
/// ```
/// use optics_core::normalise_plot;
///
/// let plot = [f64::INFINITY, 1.0, 4.0, f64::INFINITY, 2.0];
/// assert_eq!(normalise_plot(&plot), [f64::INFINITY, 0.25, 1.0, 1.0, 0.5]);
/// ```
#[must_use]
pub fn normalise_plot(plot: &[f64]) -> Vec<f64> {
    let top = plot
        .iter()
        .skip(1)
        .copied()
        .filter(|value| value.is_finite())
        .fold(0.0, f64::max);
    let scale = if top > 0.0 { top } else { 1.0 };
    plot.iter()
        .enumerate()
        .map(|(position, &value)| match (position, value.is_finite()) {
            (0, _) => value,
            (_, true) => value / scale,
            (_, false) => 1.0,
        })
        .collect()
}

/// Labels and tree produced by one hierarchical extraction.
#[derive(Clone, Debug, PartialEq)]
pub struct HierarchyExtraction {
    labels: ClusteringResult,
    tree: ClusterTree,
    min_cluster_size: usize,
}

impl HierarchyExtraction {
    /// Flat labels indexed by original point index.
    #[must_use]
    pub fn labels(&self) -> &ClusteringResult {
        &self.labels
    }

    /// The cluster tree the labels were read from.
    #[must_use]
    pub fn tree(&self) -> &ClusterTree {
        &self.tree
    }

    /// The resolved minimum cluster size.
    #[must_use]
    pub const fn min_cluster_size(&self) -> usize {
        self.min_cluster_size
    }

    /// Consumes the extraction, keeping only the labels.
    #[must_use]
    pub fn into_labels(self) -> ClusteringResult {
        self.labels
    }
}

/// Extracts flat labels from `ordering` by building a [`ClusterTree`] over
/// its normalised reachability plot.
///
/// Leaves of the tree are labelled left to right when they hold at least the
/// resolved minimum cluster size; every other point is noise.
///
/// # Errors
/// Returns [`OpticsError::InvalidParameter`] for out-of-range tunables and
/// [`OpticsError::MinClusterSizeTooLarge`] when the minimum cluster size
/// exceeds the number of points.
#[instrument(
    name = "core.extract_hierarchy",
    err,
    skip(ordering, config),
    fields(items = ordering.len(), min_samples = ordering.min_samples().get()),
)]
pub fn extract_hierarchy(
    ordering: &ReachabilityOrdering,
    config: &HierarchyConfig,
) -> Result<HierarchyExtraction> {
    config.validate()?;
    let items = ordering.len();
    let params = config.tree_params(items)?;
    let neighbourhood = config
        .neighbourhood()
        .unwrap_or_else(|| ordering.min_samples())
        .get();

    let plot = normalise_plot(ordering.reachability());
    let maxima = find_local_maxima(&plot, neighbourhood);
    let tree = ClusterTree::build(&plot, &maxima, &params);

    let mut assignments = vec![None; items];
    let mut next_id = 0_u64;
    for leaf in tree.leaves() {
        let Some(node) = tree.node(leaf) else {
            continue;
        };
        if node.len() < params.min_cluster_size
            || !has_reachable_members(ordering.reachability(), node.range())
        {
            continue;
        }
        let id = ClusterId::new(next_id);
        next_id += 1;
        for point in ordering.ordering().get(node.range()).unwrap_or_default() {
            if let Some(slot) = assignments.get_mut(*point) {
                *slot = Some(id);
            }
        }
    }

    let cluster_count = usize::try_from(next_id).unwrap_or(usize::MAX);
    let labels = ClusteringResult::from_dense_assignments(assignments, cluster_count);
    info!(
        candidates = maxima.len(),
        clusters = labels.cluster_count(),
        noise = labels.noise_count(),
        min_cluster_size = params.min_cluster_size,
        "hierarchical extraction completed"
    );
    Ok(HierarchyExtraction {
        labels,
        tree,
        min_cluster_size: params.min_cluster_size,
    })
}

/// Whether any position after the first in `range` was reached at a
/// finite distance. A leaf where every later point starts its own region
/// holds no density-connected points and stays noise.
fn has_reachable_members(reachability: &[f64], range: Range<usize>) -> bool {
    reachability
        .get(range.start.saturating_add(1)..range.end)
        .is_some_and(|tail| tail.iter().any(|value| value.is_finite()))
}
