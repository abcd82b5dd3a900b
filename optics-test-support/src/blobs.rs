//! Seeded synthetic point clouds with known cluster membership.

use std::f64::consts::PI;

use rand::{Rng, SeedableRng, rngs::SmallRng};

/// One isotropic Gaussian cluster.
#[derive(Clone, Debug, PartialEq)]
pub struct BlobSpec {
    /// Cluster mean; its length fixes the dimensionality.
    pub centre: Vec<f64>,
    /// Standard deviation along every axis.
    pub std_dev: f64,
    /// Number of points to draw.
    pub count: usize,
}

impl BlobSpec {
    /// Describes a blob of `count` points around `centre`.
    #[must_use]
    pub fn new(centre: impl Into<Vec<f64>>, std_dev: f64, count: usize) -> Self {
        Self {
            centre: centre.into(),
            std_dev,
            count,
        }
    }
}

/// Generated points together with the blob each was drawn from.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelledPoints {
    /// Point coordinates, blob by blob in specification order.
    pub points: Vec<Vec<f64>>,
    /// Index of the originating [`BlobSpec`] for every point.
    pub truth: Vec<usize>,
}

impl LabelledPoints {
    /// Number of generated points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether no points were generated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Draws every blob in `specs` from a generator seeded with `seed`.
///
/// # Examples
/// ```
/// use optics_test_support::blobs::{BlobSpec, gaussian_blobs};
///
/// let specs = [
///     BlobSpec::new([0.0, 0.0], 0.1, 3),
///     BlobSpec::new([5.0, 5.0], 0.1, 2),
/// ];
/// let data = gaussian_blobs(&specs, 7);
/// assert_eq!(data.len(), 5);
/// assert_eq!(data.truth, [0, 0, 0, 1, 1]);
/// assert_eq!(data, gaussian_blobs(&specs, 7));
/// ```
#[must_use]
pub fn gaussian_blobs(specs: &[BlobSpec], seed: u64) -> LabelledPoints {
    let mut rng = SmallRng::seed_from_u64(seed);
    let total = specs.iter().map(|spec| spec.count).sum();
    let mut points = Vec::with_capacity(total);
    let mut truth = Vec::with_capacity(total);
    for (blob, spec) in specs.iter().enumerate() {
        for _ in 0..spec.count {
            let point = spec
                .centre
                .iter()
                .map(|&mean| mean + spec.std_dev * standard_normal(&mut rng))
                .collect();
            points.push(point);
            truth.push(blob);
        }
    }
    LabelledPoints { points, truth }
}

/// Six well-separated two-dimensional blobs of varying spread with
/// `per_blob` points each.
#[must_use]
pub fn six_blobs(per_blob: usize, seed: u64) -> LabelledPoints {
    let specs = [
        ([-10.0, -10.0], 0.8),
        ([10.0, -10.0], 0.3),
        ([0.0, 0.0], 0.5),
        ([-10.0, 10.0], 0.4),
        ([10.0, 10.0], 1.0),
        ([0.0, 20.0], 0.6),
    ]
    .map(|(centre, std_dev)| BlobSpec::new(centre, std_dev, per_blob));
    gaussian_blobs(&specs, seed)
}

/// Draws `count` points uniformly from `[0, bound)` in every dimension.
#[must_use]
pub fn uniform_points(count: usize, dimensions: usize, bound: f64, seed: u64) -> Vec<Vec<f64>> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..count)
        .map(|_| (0..dimensions).map(|_| rng.gen_range(0.0..bound)).collect())
        .collect()
}

/// Samples the standard normal distribution with the Box-Muller transform.
fn standard_normal(rng: &mut SmallRng) -> f64 {
    let u1 = rng.gen_range(f64::EPSILON..1.0);
    let u2 = rng.gen_range(0.0..1.0);
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}
