//! Synthetic numeric data sources for benchmarking.

use std::f64::consts::PI;

use optics_core::{DataSource, DataSourceError, euclidean_distance};
use rand::{Rng, SeedableRng, rngs::SmallRng};

/// Errors raised while generating synthetic data.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SyntheticError {
    /// No points were requested.
    #[error("point count must be greater than zero")]
    ZeroPoints,
    /// Vectors must have at least one dimension.
    #[error("dimensions must be greater than zero")]
    ZeroDimensions,
    /// Blob generation needs at least one cluster.
    #[error("cluster count must be greater than zero")]
    ZeroClusters,
    /// More clusters than points were requested.
    #[error("cluster count {cluster_count} exceeds point count {point_count}")]
    ClusterCountExceedsPointCount {
        /// Requested clusters.
        cluster_count: usize,
        /// Requested points.
        point_count: usize,
    },
    /// A floating-point parameter was non-finite or non-positive.
    #[error("parameter `{parameter}` must be finite and positive")]
    InvalidFloatParameter {
        /// Name of the offending parameter.
        parameter: &'static str,
    },
    /// `point_count * dimensions` does not fit in memory.
    #[error("{point_count} points of dimension {dimensions} overflow the buffer size")]
    Overflow {
        /// Requested points.
        point_count: usize,
        /// Requested dimensions.
        dimensions: usize,
    },
}

/// Uniform random vector configuration.
#[derive(Clone, Debug)]
pub struct SyntheticConfig {
    /// Number of points to generate.
    pub point_count: usize,
    /// Dimensionality of each vector.
    pub dimensions: usize,
    /// RNG seed for reproducibility.
    pub seed: u64,
}

/// Configuration for isotropic Gaussian blobs on a circle.
#[derive(Clone, Debug)]
pub struct GaussianBlobConfig {
    /// Number of points to generate.
    pub point_count: usize,
    /// Dimensionality of each vector.
    pub dimensions: usize,
    /// Number of Gaussian clusters.
    pub cluster_count: usize,
    /// Radius of the circle the centroids sit on.
    pub separation: f64,
    /// Standard deviation of every blob.
    pub spread: f64,
    /// RNG seed for reproducibility.
    pub seed: u64,
}

/// A numeric synthetic [`DataSource`] using Euclidean distance.
#[derive(Clone, Debug)]
pub struct SyntheticSource {
    data: Vec<f64>,
    point_count: usize,
    dimensions: usize,
    name: &'static str,
}

impl SyntheticSource {
    /// Generates uniform random vectors in `[0.0, 1.0)`.
    ///
    /// # Errors
    /// Returns [`SyntheticError`] when the configuration is invalid.
    pub fn generate(config: &SyntheticConfig) -> Result<Self, SyntheticError> {
        let total = checked_total(config.point_count, config.dimensions)?;
        let mut rng = SmallRng::seed_from_u64(config.seed);
        let data = (0..total).map(|_| rng.gen_range(0.0..1.0)).collect();
        Ok(Self {
            data,
            point_count: config.point_count,
            dimensions: config.dimensions,
            name: "synthetic-uniform",
        })
    }

    /// Generates Gaussian blobs whose centroids are spread evenly on a circle
    /// in the first two dimensions. Points are assigned to blobs round-robin.
    ///
    /// # Errors
    /// Returns [`SyntheticError`] when the configuration is invalid.
    ///
    /// # Examples
    /// ```
    /// use optics_benches::source::{GaussianBlobConfig, SyntheticSource};
    /// use optics_core::DataSource;
    ///
    /// let source = SyntheticSource::generate_gaussian_blobs(&GaussianBlobConfig {
    ///     point_count: 30,
    ///     dimensions: 4,
    ///     cluster_count: 3,
    ///     separation: 10.0,
    ///     spread: 0.5,
    ///     seed: 7,
    /// })?;
    /// assert_eq!(source.len(), 30);
    /// assert_eq!(source.dimensions(), 4);
    /// # Ok::<(), optics_benches::source::SyntheticError>(())
    /// ```
    #[expect(
        clippy::float_arithmetic,
        reason = "blob members are offset from their centroid by scaled noise"
    )]
    pub fn generate_gaussian_blobs(config: &GaussianBlobConfig) -> Result<Self, SyntheticError> {
        validate_blob_config(config)?;
        let total = checked_total(config.point_count, config.dimensions)?;
        let centroids = blob_centroids(config);
        let mut rng = SmallRng::seed_from_u64(config.seed);
        let mut data = Vec::with_capacity(total);
        for point in 0..config.point_count {
            let centroid = &centroids[point % config.cluster_count];
            data.extend(
                centroid
                    .iter()
                    .map(|&mean| mean + config.spread * standard_normal(&mut rng)),
            );
        }
        Ok(Self {
            data,
            point_count: config.point_count,
            dimensions: config.dimensions,
            name: "synthetic-gaussian-blobs",
        })
    }

    /// Dimensionality of every point.
    #[must_use]
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn row(&self, index: usize) -> Result<&[f64], DataSourceError> {
        let start = index
            .checked_mul(self.dimensions)
            .ok_or(DataSourceError::OutOfBounds { index })?;
        self.data
            .get(start..start + self.dimensions)
            .ok_or(DataSourceError::OutOfBounds { index })
    }
}

impl DataSource for SyntheticSource {
    fn len(&self) -> usize {
        self.point_count
    }

    fn name(&self) -> &str {
        self.name
    }

    fn distance(&self, i: usize, j: usize) -> Result<f64, DataSourceError> {
        euclidean_distance(self.row(i)?, self.row(j)?).map_err(|source| {
            DataSourceError::Metric {
                left: i,
                right: j,
                source,
            }
        })
    }
}

fn checked_total(point_count: usize, dimensions: usize) -> Result<usize, SyntheticError> {
    if point_count == 0 {
        return Err(SyntheticError::ZeroPoints);
    }
    if dimensions == 0 {
        return Err(SyntheticError::ZeroDimensions);
    }
    point_count
        .checked_mul(dimensions)
        .ok_or(SyntheticError::Overflow {
            point_count,
            dimensions,
        })
}

fn validate_blob_config(config: &GaussianBlobConfig) -> Result<(), SyntheticError> {
    if config.cluster_count == 0 {
        return Err(SyntheticError::ZeroClusters);
    }
    if config.cluster_count > config.point_count {
        return Err(SyntheticError::ClusterCountExceedsPointCount {
            cluster_count: config.cluster_count,
            point_count: config.point_count,
        });
    }
    for (parameter, value) in [("separation", config.separation), ("spread", config.spread)] {
        if !value.is_finite() || value <= 0.0 {
            return Err(SyntheticError::InvalidFloatParameter { parameter });
        }
    }
    Ok(())
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "centroid angles divide the circle by the blob count"
)]
fn blob_centroids(config: &GaussianBlobConfig) -> Vec<Vec<f64>> {
    (0..config.cluster_count)
        .map(|cluster| {
            let angle = 2.0 * PI * cluster as f64 / config.cluster_count as f64;
            let mut centroid = vec![0.0; config.dimensions];
            if let Some(value) = centroid.get_mut(0) {
                *value = config.separation * angle.cos();
            }
            if let Some(value) = centroid.get_mut(1) {
                *value = config.separation * angle.sin();
            }
            centroid
        })
        .collect()
}

#[expect(
    clippy::float_arithmetic,
    reason = "Box-Muller transform of two uniform samples"
)]
fn standard_normal(rng: &mut SmallRng) -> f64 {
    let u1 = rng.gen_range(f64::EPSILON..1.0);
    let u2 = rng.gen_range(0.0..1.0);
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn blobs(point_count: usize, cluster_count: usize) -> GaussianBlobConfig {
        GaussianBlobConfig {
            point_count,
            dimensions: 3,
            cluster_count,
            separation: 20.0,
            spread: 0.1,
            seed: 11,
        }
    }

    #[rstest]
    #[case::zero_points(SyntheticConfig { point_count: 0, dimensions: 2, seed: 1 }, SyntheticError::ZeroPoints)]
    #[case::zero_dimensions(SyntheticConfig { point_count: 4, dimensions: 0, seed: 1 }, SyntheticError::ZeroDimensions)]
    fn uniform_rejects_empty_shapes(
        #[case] config: SyntheticConfig,
        #[case] expected: SyntheticError,
    ) {
        let err = SyntheticSource::generate(&config).expect_err("shape must be rejected");
        assert_eq!(err, expected);
    }

    #[rstest]
    #[case::no_clusters(blobs(10, 0), SyntheticError::ZeroClusters)]
    #[case::too_many_clusters(
        blobs(2, 3),
        SyntheticError::ClusterCountExceedsPointCount { cluster_count: 3, point_count: 2 },
    )]
    #[case::flat_spread(
        GaussianBlobConfig { spread: 0.0, ..blobs(10, 2) },
        SyntheticError::InvalidFloatParameter { parameter: "spread" },
    )]
    fn blobs_reject_invalid_configs(
        #[case] config: GaussianBlobConfig,
        #[case] expected: SyntheticError,
    ) {
        let err = SyntheticSource::generate_gaussian_blobs(&config).expect_err("config is invalid");
        assert_eq!(err, expected);
    }

    #[test]
    fn uniform_values_stay_in_the_unit_cube() {
        let source = SyntheticSource::generate(&SyntheticConfig {
            point_count: 50,
            dimensions: 3,
            seed: 5,
        })
        .expect("valid config");
        assert_eq!(source.len(), 50);
        assert!(source.data.iter().all(|v| (0.0..1.0).contains(v)));
    }

    #[test]
    fn blob_members_sit_closer_than_blob_neighbours() {
        let source = SyntheticSource::generate_gaussian_blobs(&blobs(40, 4)).expect("valid config");
        let same = source.distance(0, 4).expect("in range");
        let other = source.distance(0, 1).expect("in range");
        assert!(same < 2.0, "same-blob distance {same}");
        assert!(other > 20.0, "cross-blob distance {other}");
    }

    #[test]
    fn distance_reports_out_of_bounds() {
        let source = SyntheticSource::generate_gaussian_blobs(&blobs(8, 2)).expect("valid config");
        assert_eq!(
            source.distance(0, 8),
            Err(DataSourceError::OutOfBounds { index: 8 })
        );
    }
}
