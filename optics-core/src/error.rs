//! Error types for the OPTICS core library.
//!
//! Defines the error enums exposed by the public API, their stable
//! machine-readable codes, and a convenient result alias.

use std::{fmt, sync::Arc};

use thiserror::Error;

use crate::distance::DistanceError;

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// An error produced by [`crate::DataSource`] operations.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DataSourceError {
    /// Requested index was outside the source's bounds.
    #[error("index {index} is out of bounds")]
    OutOfBounds {
        /// The requested row that exceeded the source bounds.
        index: usize,
    },
    /// Compared vectors had different dimensions.
    #[error("dimension mismatch: left={left}, right={right}")]
    DimensionMismatch {
        /// Dimensionality of the left-hand vector.
        left: usize,
        /// Dimensionality of the right-hand vector.
        right: usize,
    },
    /// Data source contained no rows.
    #[error("data source contains no rows")]
    EmptyData,
    /// Data source rows must have positive dimension.
    #[error("data source vectors must have positive dimension")]
    ZeroDimension,
    /// The configured metric rejected a pair of rows.
    #[error("distance between rows {left} and {right} is undefined: {source}")]
    Metric {
        /// Row index of the left-hand operand.
        left: usize,
        /// Row index of the right-hand operand.
        right: usize,
        /// Failure reported by the metric.
        #[source]
        source: DistanceError,
    },
}

define_error_codes! {
    /// Stable codes describing [`DataSourceError`] variants.
    enum DataSourceErrorCode for DataSourceError {
        /// Requested index was outside the source's bounds.
        OutOfBounds => OutOfBounds { .. } => "DATA_SOURCE_OUT_OF_BOUNDS",
        /// Compared vectors had different dimensions.
        DimensionMismatch => DimensionMismatch { .. } => "DATA_SOURCE_DIMENSION_MISMATCH",
        /// Data source contained no rows.
        EmptyData => EmptyData => "DATA_SOURCE_EMPTY",
        /// Data source rows must have positive dimension.
        ZeroDimension => ZeroDimension => "DATA_SOURCE_ZERO_DIMENSION",
        /// The configured metric rejected a pair of rows.
        Metric => Metric { .. } => "DATA_SOURCE_METRIC",
    }
}

/// Error type produced when configuring, fitting, or querying
/// [`crate::Optics`].
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum OpticsError {
    /// `min_samples` must be at least one.
    #[error("min_samples must be at least 1 (got {got})")]
    InvalidMinSamples {
        /// The rejected value.
        got: usize,
    },
    /// `max_bound` must be positive and not NaN.
    #[error("max_bound must be a positive distance (got {got})")]
    InvalidMaxBound {
        /// The rejected value.
        got: f64,
    },
    /// A tuning parameter fell outside its accepted range.
    #[error("{name} must be {expected} (got {got})")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// Human-readable description of the accepted range.
        expected: &'static str,
        /// The rejected value.
        got: f64,
    },
    /// The supplied [`crate::DataSource`] contained no items.
    #[error("data source `{data_source}` contains no items")]
    EmptySource {
        /// Identifier for the empty data source.
        data_source: Arc<str>,
    },
    /// The data source does not hold more points than `min_samples`.
    #[error(
        "number of training samples (n_samples={n_samples}) must be greater than min_samples (min_samples={min_samples}) used for clustering"
    )]
    InsufficientSamples {
        /// Identifier for the data source that was too small.
        data_source: Arc<str>,
        /// Number of points available.
        n_samples: usize,
        /// Configured `min_samples`.
        min_samples: usize,
    },
    /// The resolved minimum cluster size exceeds the number of points.
    #[error(
        "min_cluster_size resolves to {min_cluster_size} points but only {n_samples} are available"
    )]
    MinClusterSizeTooLarge {
        /// Effective minimum cluster size.
        min_cluster_size: usize,
        /// Number of points available.
        n_samples: usize,
    },
    /// The DBSCAN extraction radius must be finite and non-negative.
    #[error("epsilon must be a finite, non-negative distance (got {got})")]
    InvalidEpsilon {
        /// The rejected value.
        got: f64,
    },
    /// The DBSCAN extraction radius is not below the reachability cut-off.
    #[error("specify an epsilon smaller than {max_bound}; got {eps}")]
    EpsilonTooLarge {
        /// Requested extraction radius.
        eps: f64,
        /// The `max_bound` used while fitting.
        max_bound: f64,
    },
    /// Results were requested before [`crate::Optics::fit`] succeeded.
    #[error("this OPTICS instance is not fitted yet; call `fit` before extracting clusters")]
    NotFitted,
    /// A [`crate::DataSource`] operation failed while running the algorithm.
    #[error("data source `{data_source}` failed: {error}")]
    DataSource {
        /// Identifier for the data source that produced the error.
        data_source: Arc<str>,
        #[source]
        /// Underlying data source error bubbled up by the algorithm.
        error: DataSourceError,
    },
    /// A data source reported a NaN, infinite, or negative distance.
    #[error("data source `{data_source}` reported distance {distance} between {left} and {right}")]
    InvalidDistance {
        /// Identifier for the data source that produced the distance.
        data_source: Arc<str>,
        /// Query point.
        left: usize,
        /// Neighbour point.
        right: usize,
        /// The offending value.
        distance: f64,
    },
}

define_error_codes! {
    /// Stable codes describing [`OpticsError`] variants.
    enum OpticsErrorCode for OpticsError {
        /// `min_samples` must be at least one.
        InvalidMinSamples => InvalidMinSamples { .. } => "OPTICS_INVALID_MIN_SAMPLES",
        /// `max_bound` must be positive and not NaN.
        InvalidMaxBound => InvalidMaxBound { .. } => "OPTICS_INVALID_MAX_BOUND",
        /// A tuning parameter fell outside its accepted range.
        InvalidParameter => InvalidParameter { .. } => "OPTICS_INVALID_PARAMETER",
        /// The supplied [`crate::DataSource`] contained no items.
        EmptySource => EmptySource { .. } => "OPTICS_EMPTY_SOURCE",
        /// The data source does not hold more points than `min_samples`.
        InsufficientSamples => InsufficientSamples { .. } => "OPTICS_INSUFFICIENT_SAMPLES",
        /// The resolved minimum cluster size exceeds the number of points.
        MinClusterSizeTooLarge => MinClusterSizeTooLarge { .. } => "OPTICS_MIN_CLUSTER_SIZE_TOO_LARGE",
        /// The DBSCAN extraction radius must be finite and non-negative.
        InvalidEpsilon => InvalidEpsilon { .. } => "OPTICS_INVALID_EPSILON",
        /// The DBSCAN extraction radius is not below the reachability cut-off.
        EpsilonTooLarge => EpsilonTooLarge { .. } => "OPTICS_EPSILON_TOO_LARGE",
        /// Results were requested before fitting.
        NotFitted => NotFitted => "OPTICS_NOT_FITTED",
        /// A [`crate::DataSource`] operation failed while running the algorithm.
        DataSourceFailure => DataSource { .. } => "OPTICS_DATA_SOURCE_FAILURE",
        /// A data source reported an unusable distance.
        InvalidDistance => InvalidDistance { .. } => "OPTICS_INVALID_DISTANCE",
    }
}

impl OpticsError {
    /// Retrieve the inner [`DataSourceErrorCode`] when the error originated in
    /// a [`crate::DataSource`].
    #[must_use]
    pub const fn data_source_code(&self) -> Option<DataSourceErrorCode> {
        match self {
            Self::DataSource { error, .. } => Some(error.code()),
            _ => None,
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, OpticsError>;
