use arrow_schema::{ArrowError, DataType};
use thiserror::Error;

/// Errors raised while loading feature vectors into a dense matrix.
#[derive(Debug, Error)]
pub enum DenseMatrixProviderError {
    /// The requested feature column is absent from the schema.
    #[error("column `{column}` not found in Parquet schema")]
    ColumnNotFound { column: String },
    /// The feature column is not a fixed-size list.
    #[error("column `{column}` holds {actual:?}; expected FixedSizeList<Float32, D>")]
    InvalidColumnType { column: String, actual: DataType },
    /// List items must be `Float32`.
    #[error("feature values must be Float32, found {actual:?}")]
    InvalidListValueType { actual: DataType },
    /// The declared list width is zero or negative.
    #[error("feature width must be positive, found {actual}")]
    InvalidDimension { actual: i32 },
    /// Feature columns must be declared non-nullable at both levels.
    #[error("column `{column}` is declared nullable (child nullable: {nullable_child})")]
    NullableField {
        column: String,
        nullable_child: bool,
    },
    /// A whole feature vector is null.
    #[error("row {row} is null")]
    NullRow { row: usize },
    /// A single feature value is null.
    #[error("row {row} has a null feature at position {value_index}")]
    NullValue { row: usize, value_index: usize },
    /// A feature value is NaN or infinite.
    #[error("row {row} contains non-finite value {value} at position {value_index}")]
    NonFiniteValue {
        row: usize,
        value_index: usize,
        value: f32,
    },
    #[error("row {row} holds {actual} features; expected {expected}")]
    InvalidRowLength {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("{rows} rows of width {dimension} do not fit in memory")]
    CapacityOverflow { rows: usize, dimension: usize },
    /// Record batches disagree on the feature width.
    #[error("batch feature width {actual} differs from the first batch's {expected}")]
    InconsistentBatchDimension { expected: usize, actual: usize },
    #[error("arrow error: {0}")]
    Arrow(#[from] ArrowError),
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
