//! Domain primitives shared by the distance routines.

use core::{fmt, ops::Deref};

use thiserror::Error;

/// Which operand of a distance call an error refers to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VectorKind {
    /// The first operand.
    Left,
    /// The second operand.
    Right,
}

impl VectorKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for VectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasons a pair of vectors has no defined distance.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DistanceError {
    /// Either input vector had zero length.
    #[error("vectors must have positive dimension")]
    ZeroLength,
    /// Input vectors had different lengths.
    #[error("dimension mismatch: left={left}, right={right}")]
    DimensionMismatch {
        /// Dimensionality of the left-hand vector.
        left: usize,
        /// Dimensionality of the right-hand vector.
        right: usize,
    },
    /// Encountered a non-finite value in one of the vectors.
    #[error("{which} vector contains a non-finite value at index {index}: {value}")]
    NonFinite {
        /// Argument holding the value.
        which: VectorKind,
        /// Component index of the value.
        index: usize,
        /// The offending value.
        value: f64,
    },
    /// Cosine distance is undefined for zero-magnitude vectors.
    #[error("{which} vector has zero magnitude")]
    ZeroMagnitude {
        /// Argument with zero magnitude.
        which: VectorKind,
    },
    /// Minkowski exponents below one do not define a metric.
    #[error("minkowski exponent must be finite and at least 1 (got {p})")]
    InvalidExponent {
        /// The rejected exponent.
        p: f64,
    },
}

/// Convenient alias for distance computations.
pub type Result<T> = core::result::Result<T, DistanceError>;

/// A non-empty slice of finite components.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Vector<'a>(&'a [f64]);

impl<'a> Vector<'a> {
    pub(crate) fn new(values: &'a [f64], which: VectorKind) -> Result<Self> {
        if values.is_empty() {
            return Err(DistanceError::ZeroLength);
        }
        if let Some((index, value)) = values
            .iter()
            .enumerate()
            .find(|(_, value)| !value.is_finite())
        {
            return Err(DistanceError::NonFinite {
                which,
                index,
                value: *value,
            });
        }
        Ok(Self(values))
    }

    pub(crate) const fn dimension(&self) -> usize {
        self.0.len()
    }
}

impl Deref for Vector<'_> {
    type Target = [f64];

    fn deref(&self) -> &Self::Target {
        self.0
    }
}

/// Validates both operands and checks that their dimensions agree.
pub(crate) fn validated_pair<'a>(
    left: &'a [f64],
    right: &'a [f64],
) -> Result<(Vector<'a>, Vector<'a>)> {
    let left = Vector::new(left, VectorKind::Left)?;
    let right = Vector::new(right, VectorKind::Right)?;
    if left.dimension() != right.dimension() {
        return Err(DistanceError::DimensionMismatch {
            left: left.dimension(),
            right: right.dimension(),
        });
    }
    Ok((left, right))
}
