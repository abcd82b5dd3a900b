//! The OPTICS estimator.
//!
//! Provides the [`Optics`] entry point: `fit` computes and retains the
//! reachability ordering of a [`DataSource`] together with hierarchical
//! labels, after which any number of extractions can be read from it.

use std::{num::NonZeroUsize, sync::Arc};

use tracing::{info, instrument, warn};

use crate::{
    Result,
    datasource::DataSource,
    dbscan::{self, DbscanExtraction},
    error::OpticsError,
    hierarchy::{self, HierarchyConfig, HierarchyExtraction},
    reachability::{self, ReachabilityOrdering},
    result::ClusteringResult,
};

/// State retained by a successful [`Optics::fit`].
#[derive(Clone, Debug, PartialEq)]
pub struct OpticsFit {
    data_source: Arc<str>,
    ordering: ReachabilityOrdering,
    labels: ClusteringResult,
}

impl OpticsFit {
    /// Name of the data source the estimator was fitted on.
    #[must_use]
    pub fn data_source(&self) -> &str {
        &self.data_source
    }

    /// The reachability ordering.
    #[must_use]
    pub fn ordering(&self) -> &ReachabilityOrdering {
        &self.ordering
    }

    /// Hierarchical labels computed with the estimator's configuration.
    #[must_use]
    pub fn labels(&self) -> &ClusteringResult {
        &self.labels
    }
}

/// Density-based clustering via reachability ordering.
///
/// # Examples
/// ```
/// use optics_core::{ClusterSize, DataSource, DataSourceError, OpticsBuilder};
/// use std::num::NonZeroUsize;
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
/// let three = NonZeroUsize::new(3).expect("non-zero");
/// let mut optics = OpticsBuilder::new()
///     .with_min_samples(2)
///     .with_min_cluster_size(ClusterSize::Count(three))
///     .build()?;
/// let source = Line(vec![0.0, 1.0, 2.0, 3.0, 4.0, 100.0, 101.0, 102.0, 103.0, 104.0]);
/// let fit = optics.fit(&source)?;
/// assert_eq!(fit.labels().cluster_count(), 2);
///
/// let dbscan = optics.extract_dbscan(1.5)?;
/// assert_eq!(dbscan.labels().labels(), [0, 0, 0, 0, 0, 1, 1, 1, 1, 1]);
/// # Ok::<(), optics_core::OpticsError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Optics {
    min_samples: NonZeroUsize,
    max_bound: f64,
    hierarchy: HierarchyConfig,
    fitted: Option<OpticsFit>,
}

impl Optics {
    pub(crate) fn new(
        min_samples: NonZeroUsize,
        max_bound: f64,
        hierarchy: HierarchyConfig,
    ) -> Self {
        Self {
            min_samples,
            max_bound,
            hierarchy,
            fitted: None,
        }
    }

    /// Returns the configured `min_samples`.
    #[must_use]
    pub fn min_samples(&self) -> NonZeroUsize {
        self.min_samples
    }

    /// Returns the configured neighbourhood radius.
    #[must_use]
    pub fn max_bound(&self) -> f64 {
        self.max_bound
    }

    /// Returns the hierarchical extraction tunables used by `fit`.
    #[must_use]
    pub fn hierarchy(&self) -> &HierarchyConfig {
        &self.hierarchy
    }

    /// Returns the fitted state, if `fit` has succeeded.
    #[must_use]
    pub fn fitted(&self) -> Option<&OpticsFit> {
        self.fitted.as_ref()
    }

    /// Computes the reachability ordering of `source` and its hierarchical
    /// labels, replacing any earlier fit.
    ///
    /// A failed fit leaves the estimator unfitted.
    ///
    /// # Errors
    /// Returns [`OpticsError::EmptySource`] for an empty source,
    /// [`OpticsError::InsufficientSamples`] when the source does not hold
    /// more points than `min_samples`, [`OpticsError::MinClusterSizeTooLarge`]
    /// when the minimum cluster size exceeds the number of points, and any
    /// error raised by the expansion itself.
    pub fn fit<D: DataSource>(&mut self, source: &D) -> Result<&OpticsFit> {
        let items = source.len();
        self.fitted = None;
        let fit = self.fit_with_len(source, items)?;
        Ok(self.fitted.insert(fit))
    }

    #[instrument(
        name = "core.fit",
        err,
        skip(self, source),
        fields(
            data_source = %source.name(),
            items = items,
            min_samples = self.min_samples.get(),
            max_bound = self.max_bound,
        ),
    )]
    fn fit_with_len<D: DataSource>(&self, source: &D, items: usize) -> Result<OpticsFit> {
        if items == 0 {
            warn!(
                data_source = source.name(),
                "data source is empty, returning error"
            );
            return Err(OpticsError::EmptySource {
                data_source: Arc::from(source.name()),
            });
        }
        if items <= self.min_samples.get() {
            return Err(OpticsError::InsufficientSamples {
                data_source: Arc::from(source.name()),
                n_samples: items,
                min_samples: self.min_samples.get(),
            });
        }
        self.hierarchy.tree_params(items)?;

        let ordering = reachability::expand(source, self.min_samples, self.max_bound)?;
        let labels = hierarchy::extract_hierarchy(&ordering, &self.hierarchy)?.into_labels();
        info!(
            clusters = labels.cluster_count(),
            noise = labels.noise_count(),
            "fit completed"
        );

        Ok(OpticsFit {
            data_source: Arc::from(source.name()),
            ordering,
            labels,
        })
    }

    fn require_fit(&self) -> Result<&OpticsFit> {
        self.fitted.as_ref().ok_or(OpticsError::NotFitted)
    }

    /// Point indices in reachability order.
    ///
    /// # Errors
    /// Returns [`OpticsError::NotFitted`] before a successful `fit`.
    pub fn ordering(&self) -> Result<&[usize]> {
        Ok(self.require_fit()?.ordering.ordering())
    }

    /// Reachability of the point at each ordering position.
    ///
    /// Position 0 is always `+inf`, as is the first position of every further
    /// density-disconnected region.
    ///
    /// # Errors
    /// Returns [`OpticsError::NotFitted`] before a successful `fit`.
    pub fn reachability(&self) -> Result<&[f64]> {
        Ok(self.require_fit()?.ordering.reachability())
    }

    /// Core distance of each point, indexed by original point index.
    ///
    /// # Errors
    /// Returns [`OpticsError::NotFitted`] before a successful `fit`.
    pub fn core_distances(&self) -> Result<&[f64]> {
        Ok(self.require_fit()?.ordering.core_distances())
    }

    /// Hierarchical labels computed during `fit`.
    ///
    /// # Errors
    /// Returns [`OpticsError::NotFitted`] before a successful `fit`.
    pub fn labels(&self) -> Result<&ClusteringResult> {
        Ok(&self.require_fit()?.labels)
    }

    /// Extracts DBSCAN-equivalent labels at radius `eps`.
    ///
    /// # Errors
    /// Returns [`OpticsError::NotFitted`] before a successful `fit`, plus the
    /// validation errors of [`crate::extract_dbscan`].
    pub fn extract_dbscan(&self, eps: f64) -> Result<DbscanExtraction> {
        dbscan::extract_dbscan(&self.require_fit()?.ordering, eps)
    }

    /// Extracts DBSCAN-equivalent labels for several radii at once.
    ///
    /// # Errors
    /// Returns [`OpticsError::NotFitted`] before a successful `fit`, plus the
    /// validation errors of [`crate::extract_dbscan`].
    pub fn extract_dbscan_sweep(&self, eps: &[f64]) -> Result<Vec<DbscanExtraction>> {
        dbscan::extract_dbscan_sweep(&self.require_fit()?.ordering, eps)
    }

    /// Re-runs the hierarchical extraction with different tunables.
    ///
    /// # Errors
    /// Returns [`OpticsError::NotFitted`] before a successful `fit`, plus the
    /// validation errors of [`crate::extract_hierarchy`].
    pub fn extract_hierarchy(&self, config: &HierarchyConfig) -> Result<HierarchyExtraction> {
        hierarchy::extract_hierarchy(&self.require_fit()?.ordering, config)
    }
}
