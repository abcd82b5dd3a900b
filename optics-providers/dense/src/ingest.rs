//! Widening of `FixedSizeList<Float32, D>` columns into row-major `f64`
//! buffers.
//!
//! Schema checks run before any rows are read; row checks report the
//! absolute row index across batches so errors point at the source file.

use arrow_array::{Array, FixedSizeListArray, Float32Array};
use arrow_schema::{DataType, Field};

use crate::errors::DenseMatrixProviderError;

/// Checks a schema field and returns the feature width it declares.
pub(crate) fn validate_fixed_size_list_field(
    field: &Field,
    column: &str,
) -> Result<usize, DenseMatrixProviderError> {
    let DataType::FixedSizeList(child, width) = field.data_type() else {
        return Err(DenseMatrixProviderError::InvalidColumnType {
            column: column.to_owned(),
            actual: field.data_type().clone(),
        });
    };
    if field.is_nullable() || child.is_nullable() {
        return Err(DenseMatrixProviderError::NullableField {
            column: column.to_owned(),
            nullable_child: child.is_nullable(),
        });
    }
    feature_width(child.data_type(), *width)
}

/// Checks an array's item type and returns its feature width.
pub(crate) fn validate_fixed_size_list(
    array: &FixedSizeListArray,
) -> Result<usize, DenseMatrixProviderError> {
    feature_width(&array.value_type(), array.value_length())
}

fn feature_width(item: &DataType, width: i32) -> Result<usize, DenseMatrixProviderError> {
    if item != &DataType::Float32 {
        return Err(DenseMatrixProviderError::InvalidListValueType {
            actual: item.clone(),
        });
    }
    usize::try_from(width)
        .ok()
        .filter(|&dimension| dimension > 0)
        .ok_or(DenseMatrixProviderError::InvalidDimension { actual: width })
}

/// Appends every row of `array` to `out` and returns the feature width.
///
/// `expected_dimension` is the width fixed by earlier batches, if any;
/// `first_row` is the absolute index of the array's first row.
pub(crate) fn append_fixed_size_list_values(
    array: &FixedSizeListArray,
    expected_dimension: Option<usize>,
    first_row: usize,
    out: &mut Vec<f64>,
) -> Result<usize, DenseMatrixProviderError> {
    let dimension = validate_fixed_size_list(array)?;
    match expected_dimension {
        Some(expected) if expected != dimension => {
            Err(DenseMatrixProviderError::InconsistentBatchDimension {
                expected,
                actual: dimension,
            })
        }
        _ => {
            widen_rows(array, dimension, first_row, out)?;
            Ok(dimension)
        }
    }
}

pub(crate) fn widen_rows(
    array: &FixedSizeListArray,
    dimension: usize,
    first_row: usize,
    out: &mut Vec<f64>,
) -> Result<(), DenseMatrixProviderError> {
    let rows = array.len();
    let values = rows
        .checked_mul(dimension)
        .ok_or(DenseMatrixProviderError::CapacityOverflow { rows, dimension })?;
    out.reserve(values);
    for offset in 0..rows {
        let row = first_row + offset;
        if array.is_null(offset) {
            return Err(DenseMatrixProviderError::NullRow { row });
        }
        let item = array.value(offset);
        let features = item.as_any().downcast_ref::<Float32Array>().ok_or_else(|| {
            DenseMatrixProviderError::InvalidListValueType {
                actual: item.data_type().clone(),
            }
        })?;
        if features.len() != dimension {
            return Err(DenseMatrixProviderError::InvalidRowLength {
                row,
                expected: dimension,
                actual: features.len(),
            });
        }
        widen_row(features, row, out)?;
    }
    Ok(())
}

fn widen_row(
    features: &Float32Array,
    row: usize,
    out: &mut Vec<f64>,
) -> Result<(), DenseMatrixProviderError> {
    for (value_index, value) in features.iter().enumerate() {
        match value {
            None => return Err(DenseMatrixProviderError::NullValue { row, value_index }),
            Some(value) if !value.is_finite() => {
                return Err(DenseMatrixProviderError::NonFiniteValue {
                    row,
                    value_index,
                    value,
                });
            }
            Some(value) => out.push(f64::from(value)),
        }
    }
    Ok(())
}
