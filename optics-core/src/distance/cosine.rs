use crate::distance::types::{DistanceError, Result, VectorKind, validated_pair};

/// Computes the cosine distance `1 - cos(theta)` between two vectors.
///
/// # Examples
///
/// ```
/// use optics_core::cosine_distance;
///
/// let orthogonal = cosine_distance(&[1.0, 0.0], &[0.0, 1.0])?;
/// assert!((orthogonal - 1.0).abs() < 1e-12);
/// # Ok::<(), optics_core::DistanceError>(())
/// ```
///
/// # Errors
///
/// - [`DistanceError::ZeroLength`] when any input is empty.
/// - [`DistanceError::DimensionMismatch`] when input lengths differ.
/// - [`DistanceError::NonFinite`] when a value is NaN or infinite.
/// - [`DistanceError::ZeroMagnitude`] when either vector has zero L2 norm.
pub fn cosine_distance(left: &[f64], right: &[f64]) -> Result<f64> {
    let (left, right) = validated_pair(left, right)?;

    let mut dot = 0.0_f64;
    let mut left_squares = 0.0_f64;
    let mut right_squares = 0.0_f64;
    for (&l, &r) in left.iter().zip(right.iter()) {
        dot += l * r;
        left_squares += l * l;
        right_squares += r * r;
    }

    if left_squares == 0.0 {
        return Err(DistanceError::ZeroMagnitude {
            which: VectorKind::Left,
        });
    }
    if right_squares == 0.0 {
        return Err(DistanceError::ZeroMagnitude {
            which: VectorKind::Right,
        });
    }

    // Theoretical range is [-1, 1], but numerical noise can spill over.
    let similarity = (dot / (left_squares.sqrt() * right_squares.sqrt())).clamp(-1.0, 1.0);
    Ok(1.0 - similarity)
}
