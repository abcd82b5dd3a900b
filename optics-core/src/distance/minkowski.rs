//! The Minkowski family: Manhattan, Chebyshev, and general `p`.

use crate::distance::types::{DistanceError, Result, validated_pair};

/// Computes the Manhattan (L1) distance between two vectors.
///
/// # Errors
/// Fails under the same conditions as [`crate::euclidean_distance`].
pub fn manhattan_distance(left: &[f64], right: &[f64]) -> Result<f64> {
    let (left, right) = validated_pair(left, right)?;
    Ok(left
        .iter()
        .zip(right.iter())
        .map(|(&l, &r)| (l - r).abs())
        .sum())
}

/// Computes the Chebyshev (L-infinity) distance between two vectors.
///
/// # Errors
/// Fails under the same conditions as [`crate::euclidean_distance`].
pub fn chebyshev_distance(left: &[f64], right: &[f64]) -> Result<f64> {
    let (left, right) = validated_pair(left, right)?;
    Ok(left
        .iter()
        .zip(right.iter())
        .map(|(&l, &r)| (l - r).abs())
        .fold(0.0, f64::max))
}

/// Computes the Minkowski distance of order `p` between two vectors.
///
/// `p = 1` and `p = 2` reproduce the Manhattan and Euclidean distances.
///
/// # Examples
///
/// ```
/// use optics_core::minkowski_distance;
///
/// let d = minkowski_distance(&[0.0, 0.0], &[3.0, 4.0], 2.0)?;
/// assert!((d - 5.0).abs() < 1e-12);
/// # Ok::<(), optics_core::DistanceError>(())
/// ```
///
/// # Errors
/// Returns [`DistanceError::InvalidExponent`] when `p` is below one or not
/// finite, and otherwise fails under the same conditions as
/// [`crate::euclidean_distance`].
pub fn minkowski_distance(left: &[f64], right: &[f64], p: f64) -> Result<f64> {
    if !p.is_finite() || p < 1.0 {
        return Err(DistanceError::InvalidExponent { p });
    }
    let (left, right) = validated_pair(left, right)?;
    let sum: f64 = left
        .iter()
        .zip(right.iter())
        .map(|(&l, &r)| (l - r).abs().powf(p))
        .sum();
    Ok(sum.powf(p.recip()))
}
