//! Builder utilities for configuring [`Optics`] estimators.
//!
//! Collects the expansion parameters and the hierarchical extraction tunables
//! and validates them together before an estimator is constructed.

use std::num::NonZeroUsize;

use crate::{
    Result,
    error::OpticsError,
    hierarchy::{ClusterSize, HierarchyConfig},
    optics::Optics,
};

/// Configures and constructs [`Optics`] instances.
///
/// # Examples
/// ```
/// use optics_core::{ClusterSize, OpticsBuilder};
///
/// let optics = OpticsBuilder::new()
///     .with_min_samples(8)
///     .with_max_bound(2.5)
///     .with_min_cluster_size(ClusterSize::Fraction(0.05))
///     .build()
///     .expect("builder configuration is valid");
/// assert_eq!(optics.min_samples().get(), 8);
/// assert_eq!(optics.max_bound(), 2.5);
/// ```
#[derive(Debug, Clone)]
pub struct OpticsBuilder {
    min_samples: usize,
    max_bound: f64,
    hierarchy: HierarchyConfig,
}

impl Default for OpticsBuilder {
    fn default() -> Self {
        Self {
            min_samples: 5,
            max_bound: f64::INFINITY,
            hierarchy: HierarchyConfig::default(),
        }
    }
}

impl OpticsBuilder {
    /// Creates a builder populated with default parameters.
    ///
    /// # Examples
    /// ```
    /// use optics_core::OpticsBuilder;
    ///
    /// let builder = OpticsBuilder::new();
    /// assert_eq!(builder.min_samples(), 5);
    /// assert_eq!(builder.max_bound(), f64::INFINITY);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the number of points, the point itself included, that make
    /// a neighbourhood dense.
    #[must_use]
    pub fn with_min_samples(mut self, min_samples: usize) -> Self {
        self.min_samples = min_samples;
        self
    }

    /// Returns the configured `min_samples`.
    #[must_use]
    pub fn min_samples(&self) -> usize {
        self.min_samples
    }

    /// Overrides the neighbourhood radius searched during expansion.
    ///
    /// # Examples
    /// ```
    /// use optics_core::OpticsBuilder;
    ///
    /// let builder = OpticsBuilder::new().with_max_bound(0.5);
    /// assert_eq!(builder.max_bound(), 0.5);
    /// ```
    #[must_use]
    pub fn with_max_bound(mut self, max_bound: f64) -> Self {
        self.max_bound = max_bound;
        self
    }

    /// Returns the configured neighbourhood radius.
    #[must_use]
    pub fn max_bound(&self) -> f64 {
        self.max_bound
    }

    /// Overrides the minimum cluster size used by the hierarchical labels
    /// computed during [`Optics::fit`].
    #[must_use]
    pub fn with_min_cluster_size(mut self, size: ClusterSize) -> Self {
        self.hierarchy = self.hierarchy.with_min_cluster_size(size);
        self
    }

    /// Replaces every hierarchical extraction tunable at once.
    #[must_use]
    pub fn with_hierarchy(mut self, hierarchy: HierarchyConfig) -> Self {
        self.hierarchy = hierarchy;
        self
    }

    /// Returns the hierarchical extraction tunables.
    #[must_use]
    pub fn hierarchy(&self) -> &HierarchyConfig {
        &self.hierarchy
    }

    /// Validates the configuration and constructs an [`Optics`] instance.
    ///
    /// # Errors
    /// Returns [`OpticsError::InvalidMinSamples`] for a zero `min_samples`,
    /// [`OpticsError::InvalidMaxBound`] for a non-positive or NaN radius, and
    /// [`OpticsError::InvalidParameter`] for out-of-range hierarchy tunables.
    ///
    /// # Examples
    /// ```
    /// use optics_core::{OpticsBuilder, OpticsError};
    ///
    /// let err = OpticsBuilder::new().with_min_samples(0).build().unwrap_err();
    /// assert!(matches!(err, OpticsError::InvalidMinSamples { got: 0 }));
    /// ```
    pub fn build(self) -> Result<Optics> {
        let min_samples =
            NonZeroUsize::new(self.min_samples).ok_or(OpticsError::InvalidMinSamples {
                got: self.min_samples,
            })?;
        if self.max_bound.is_nan() || self.max_bound <= 0.0 {
            return Err(OpticsError::InvalidMaxBound {
                got: self.max_bound,
            });
        }
        self.hierarchy.validate()?;

        Ok(Optics::new(min_samples, self.max_bound, self.hierarchy))
    }
}
