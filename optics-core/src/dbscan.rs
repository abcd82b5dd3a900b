//! DBSCAN-equivalent cluster extraction from a reachability ordering.

use std::fmt;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{info, instrument, warn};

use crate::{
    error::{OpticsError, Result},
    reachability::ReachabilityOrdering,
    result::{ClusterId, ClusteringResult},
};

/// Relative distance from `max_bound` at which `eps` is treated as equal.
const BOUND_TOLERANCE: f64 = 1e-9;

/// Non-fatal conditions detected while extracting DBSCAN-style labels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ExtractionWarning {
    /// `eps` sits close enough to `max_bound` that neighbourhoods were
    /// truncated near the extraction radius; border assignments may differ
    /// from a direct DBSCAN run.
    UnstableBound {
        /// Requested extraction radius.
        eps: f64,
        /// The `max_bound` used while fitting.
        max_bound: f64,
    },
    /// Fewer than two clusters were found although the dataset is large
    /// enough to hold several.
    FewClusters {
        /// Number of clusters found.
        clusters: usize,
        /// Number of points in the dataset.
        items: usize,
    },
}

impl fmt::Display for ExtractionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnstableBound { eps, max_bound } => write!(
                f,
                "eps={eps} is close to max_bound={max_bound}; increase max_bound for stable border assignments"
            ),
            Self::FewClusters { clusters, items } => write!(
                f,
                "only {clusters} cluster(s) found among {items} points; consider a different eps"
            ),
        }
    }
}

/// Labels produced by one DBSCAN-style extraction.
#[derive(Clone, Debug, PartialEq)]
pub struct DbscanExtraction {
    eps: f64,
    core_indices: Vec<usize>,
    labels: ClusteringResult,
    warnings: Vec<ExtractionWarning>,
}

impl DbscanExtraction {
    /// The extraction radius.
    #[must_use]
    pub const fn eps(&self) -> f64 {
        self.eps
    }

    /// Points whose core distance is at most `eps`, ascending.
    #[must_use]
    pub fn core_indices(&self) -> &[usize] {
        &self.core_indices
    }

    /// Flat labels indexed by original point index.
    #[must_use]
    pub fn labels(&self) -> &ClusteringResult {
        &self.labels
    }

    /// Warnings raised during extraction.
    #[must_use]
    pub fn warnings(&self) -> &[ExtractionWarning] {
        &self.warnings
    }

    /// Consumes the extraction, keeping only the labels.
    #[must_use]
    pub fn into_labels(self) -> ClusteringResult {
        self.labels
    }
}

/// Extracts the clustering DBSCAN would produce with radius `eps` and the
/// ordering's `min_samples`.
///
/// Walking the ordering, a point whose reachability exceeds `eps` starts a
/// new cluster when it is itself a core point at `eps`, and is noise
/// otherwise; every other point joins the current cluster. Core points match
/// DBSCAN exactly; border points may be assigned differently when reachable
/// from several clusters.
///
/// # Errors
/// Returns [`OpticsError::InvalidEpsilon`] when `eps` is NaN, infinite, or
/// negative, and [`OpticsError::EpsilonTooLarge`] when `eps` is not strictly
/// below the ordering's `max_bound`.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use optics_core::{DataSource, DataSourceError, expand, extract_dbscan};
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
/// let extraction = extract_dbscan(&ordering, 2.0)?;
/// assert_eq!(extraction.labels().labels(), [0, 1, 0, 1]);
/// assert_eq!(extraction.core_indices(), [0, 1, 2, 3]);
/// # Ok::<(), optics_core::OpticsError>(())
/// ```
#[instrument(
    name = "core.extract_dbscan",
    err,
    skip(ordering),
    fields(items = ordering.len(), max_bound = ordering.max_bound()),
)]
pub fn extract_dbscan(ordering: &ReachabilityOrdering, eps: f64) -> Result<DbscanExtraction> {
    validate_eps(eps, ordering.max_bound())?;

    let cores = ordering.core_distances();
    let is_core = |point: usize| cores.get(point).is_some_and(|&core| core <= eps);

    let mut assignments = vec![None; ordering.len()];
    let mut current: Option<ClusterId> = None;
    let mut next_id = 0_u64;
    for (point, reach) in ordering.iter() {
        let label = if reach > eps {
            if is_core(point) {
                let id = ClusterId::new(next_id);
                next_id += 1;
                current = Some(id);
                Some(id)
            } else {
                None
            }
        } else {
            current
        };
        if let Some(slot) = assignments.get_mut(point) {
            *slot = label;
        }
    }

    let core_indices: Vec<usize> = (0..cores.len()).filter(|&point| is_core(point)).collect();
    let cluster_count = usize::try_from(next_id).unwrap_or(usize::MAX);
    let labels = ClusteringResult::from_dense_assignments(assignments, cluster_count);
    let warnings = collect_warnings(ordering, eps, labels.cluster_count());
    for warning in &warnings {
        warn!(eps, %warning, "dbscan extraction warning");
    }
    info!(
        eps,
        clusters = labels.cluster_count(),
        noise = labels.noise_count(),
        core_points = core_indices.len(),
        "dbscan extraction completed"
    );

    Ok(DbscanExtraction {
        eps,
        core_indices,
        labels,
        warnings,
    })
}

/// Runs [`extract_dbscan`] for every radius in `eps`, preserving input order.
///
/// Extractions share the ordering read-only and run on the rayon pool when
/// the `parallel` feature is enabled.
///
/// # Errors
/// Returns the first error any single extraction reports.
#[cfg(feature = "parallel")]
pub fn extract_dbscan_sweep(
    ordering: &ReachabilityOrdering,
    eps: &[f64],
) -> Result<Vec<DbscanExtraction>> {
    eps.par_iter()
        .map(|&radius| extract_dbscan(ordering, radius))
        .collect()
}

/// Runs [`extract_dbscan`] for every radius in `eps`, preserving input order.
///
/// # Errors
/// Returns the first error any single extraction reports.
#[cfg(not(feature = "parallel"))]
pub fn extract_dbscan_sweep(
    ordering: &ReachabilityOrdering,
    eps: &[f64],
) -> Result<Vec<DbscanExtraction>> {
    eps.iter()
        .map(|&radius| extract_dbscan(ordering, radius))
        .collect()
}

fn validate_eps(eps: f64, max_bound: f64) -> Result<()> {
    if !eps.is_finite() || eps < 0.0 {
        return Err(OpticsError::InvalidEpsilon { got: eps });
    }
    if max_bound.is_finite() {
        let tolerance = BOUND_TOLERANCE * max_bound.abs().max(1.0);
        if eps > max_bound || (max_bound - eps).abs() <= tolerance {
            return Err(OpticsError::EpsilonTooLarge { eps, max_bound });
        }
    }
    Ok(())
}

fn collect_warnings(
    ordering: &ReachabilityOrdering,
    eps: f64,
    clusters: usize,
) -> Vec<ExtractionWarning> {
    let mut warnings = Vec::new();
    let max_bound = ordering.max_bound();
    if 5.0 * eps > 1.05 * max_bound {
        warnings.push(ExtractionWarning::UnstableBound { eps, max_bound });
    }
    let items = ordering.len();
    if clusters < 2 && items >= 2 * ordering.min_samples().get() {
        warnings.push(ExtractionWarning::FewClusters { clusters, items });
    }
    warnings
}
