//! Distance primitives for built-in numeric metrics.
//!
//! Every routine validates its inputs and surfaces a [`DistanceError`] rather
//! than producing NaN, so data sources can report bad rows precisely.

mod cosine;
mod euclidean;
mod minkowski;
mod types;

use std::{fmt, str::FromStr};

pub use self::cosine::cosine_distance;
pub use self::euclidean::euclidean_distance;
pub use self::minkowski::{chebyshev_distance, manhattan_distance, minkowski_distance};
pub use self::types::{DistanceError, Result, VectorKind};

/// Selects the metric a dense data source applies to its rows.
///
/// # Examples
/// ```
/// use optics_core::Metric;
///
/// let metric: Metric = "manhattan".parse().expect("known metric");
/// assert_eq!(metric.distance(&[0.0, 0.0], &[3.0, 4.0])?, 7.0);
/// # Ok::<(), optics_core::DistanceError>(())
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Metric {
    /// Straight-line (L2) distance.
    #[default]
    Euclidean,
    /// Sum of absolute differences (L1).
    Manhattan,
    /// Largest absolute difference (L-infinity).
    Chebyshev,
    /// Minkowski distance of the given order.
    Minkowski(f64),
    /// One minus the cosine similarity.
    Cosine,
}

impl Metric {
    /// Computes the distance between `left` and `right` under this metric.
    ///
    /// # Errors
    /// Propagates the [`DistanceError`] raised by the selected routine.
    pub fn distance(self, left: &[f64], right: &[f64]) -> Result<f64> {
        match self {
            Self::Euclidean => euclidean_distance(left, right),
            Self::Manhattan => manhattan_distance(left, right),
            Self::Chebyshev => chebyshev_distance(left, right),
            Self::Minkowski(p) => minkowski_distance(left, right, p),
            Self::Cosine => cosine_distance(left, right),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Euclidean => f.write_str("euclidean"),
            Self::Manhattan => f.write_str("manhattan"),
            Self::Chebyshev => f.write_str("chebyshev"),
            Self::Minkowski(p) => write!(f, "minkowski:{p}"),
            Self::Cosine => f.write_str("cosine"),
        }
    }
}

/// Error returned when a metric name cannot be parsed.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("unknown metric `{0}`; expected euclidean, manhattan, chebyshev, cosine, or minkowski:<p>")]
pub struct UnknownMetric(pub String);

impl FromStr for Metric {
    type Err = UnknownMetric;

    fn from_str(raw: &str) -> core::result::Result<Self, Self::Err> {
        let normalised = raw.trim().to_ascii_lowercase();
        match normalised.as_str() {
            "euclidean" | "l2" => Ok(Self::Euclidean),
            "manhattan" | "cityblock" | "l1" => Ok(Self::Manhattan),
            "chebyshev" => Ok(Self::Chebyshev),
            "cosine" => Ok(Self::Cosine),
            other => other
                .strip_prefix("minkowski:")
                .and_then(|p| p.parse::<f64>().ok())
                .filter(|p| p.is_finite() && *p >= 1.0)
                .map(Self::Minkowski)
                .ok_or_else(|| UnknownMetric(raw.to_owned())),
        }
    }
}
