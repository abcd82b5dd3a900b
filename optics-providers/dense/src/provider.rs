//! Row-major `f64` matrix loaded from Arrow or Parquet feature columns.
use std::{fs::File, path::Path};

use arrow_array::{Array, FixedSizeListArray, RecordBatch, RecordBatchReader};

use optics_core::{DataSource, DataSourceError, Metric};
use parquet::arrow::{ProjectionMask, arrow_reader::ParquetRecordBatchReaderBuilder};
use parquet::file::reader::ChunkReader;

use crate::errors::DenseMatrixProviderError;
use crate::ingest::{append_fixed_size_list_values, validate_fixed_size_list_field};

/// Feature vectors held contiguously, compared with a configurable
/// [`Metric`] (Euclidean unless overridden).
#[derive(Clone, Debug)]
pub struct DenseMatrixProvider {
    name: String,
    rows: usize,
    dimension: usize,
    values: Vec<f64>,
    metric: Metric,
}

impl DenseMatrixProvider {
    /// `values` must hold exactly `rows * dimension` entries.
    pub(crate) fn from_parts(
        name: impl Into<String>,
        rows: usize,
        dimension: usize,
        values: Vec<f64>,
    ) -> Self {
        debug_assert_eq!(values.len(), rows.saturating_mul(dimension));
        Self {
            name: name.into(),
            rows,
            dimension,
            values,
            metric: Metric::default(),
        }
    }

    /// Replaces the metric used to compare rows.
    #[must_use]
    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    /// Returns the metric used to compare rows.
    #[must_use]
    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// Number of features per row.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Every row, concatenated.
    #[must_use]
    pub fn data(&self) -> &[f64] {
        &self.values
    }

    /// Returns row `index`, or `None` when it is out of range.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&[f64]> {
        self.row_slice(index).ok()
    }

    /// Widens a single Arrow [`FixedSizeListArray`].
    ///
    /// # Errors
    /// Returns a [`DenseMatrixProviderError`] when the array is not a
    /// non-null `Float32` list or holds non-finite values.
    pub fn try_from_fixed_size_list(
        name: impl Into<String>,
        array: &FixedSizeListArray,
    ) -> Result<Self, DenseMatrixProviderError> {
        let mut values = Vec::new();
        let dimension = append_fixed_size_list_values(array, None, 0, &mut values)?;
        Ok(Self::from_parts(name, array.len(), dimension, values))
    }

    /// Loads `column` from a sequence of Arrow record batches.
    ///
    /// # Errors
    /// Returns [`DenseMatrixProviderError::ColumnNotFound`] when a batch lacks
    /// `column`, [`DenseMatrixProviderError::InconsistentBatchDimension`] when
    /// batches disagree on the row width, and any ingestion error.
    pub fn try_from_record_batches(
        name: impl Into<String>,
        column: &str,
        batches: impl IntoIterator<Item = RecordBatch>,
    ) -> Result<Self, DenseMatrixProviderError> {
        let mut values = Vec::new();
        let mut rows = 0_usize;
        let mut dimension: Option<usize> = None;

        for batch in batches {
            let schema = batch.schema();
            let index = column_index(&schema, column)?;
            let width = validate_fixed_size_list_field(schema.field(index), column)?;
            let expected = *dimension.get_or_insert(width);
            if expected != width {
                return Err(DenseMatrixProviderError::InconsistentBatchDimension {
                    expected,
                    actual: width,
                });
            }
            let list = downcast_list(&batch, index, column)?;
            append_fixed_size_list_values(list, dimension, rows, &mut values)?;
            rows += list.len();
        }

        Ok(Self::from_parts(
            name,
            rows,
            dimension.unwrap_or_default(),
            values,
        ))
    }

    /// Opens `path` and loads `column` from it.
    ///
    /// # Errors
    /// Returns [`DenseMatrixProviderError::Io`] when the file cannot be opened
    /// and any error reported by [`Self::try_from_parquet_reader`].
    pub fn try_from_parquet_path(
        name: impl Into<String>,
        path: impl AsRef<Path>,
        column: &str,
    ) -> Result<Self, DenseMatrixProviderError> {
        let file = File::open(path)?;
        Self::try_from_parquet_reader(name, file, column)
    }

    /// Loads `column` from any Parquet byte source, reading only that column.
    ///
    /// # Errors
    /// Returns [`DenseMatrixProviderError::ColumnNotFound`] when the schema
    /// lacks `column`, a schema error when the column is not a non-nullable
    /// `FixedSizeList<Float32, D>`, and any Parquet or ingestion error.
    pub fn try_from_parquet_reader<R>(
        name: impl Into<String>,
        reader: R,
        column: &str,
    ) -> Result<Self, DenseMatrixProviderError>
    where
        R: ChunkReader + Send + 'static,
    {
        let builder = ParquetRecordBatchReaderBuilder::try_new(reader)?;
        let mask = ProjectionMask::columns(builder.parquet_schema(), [column]);
        let reader = builder.with_projection(mask).build()?;
        let schema = reader.schema();
        let index = column_index(&schema, column)?;
        let dimension = validate_fixed_size_list_field(schema.field(index), column)?;
        let mut values = Vec::new();
        let mut rows = 0_usize;
        for batch in reader {
            let batch = batch?;
            let list = downcast_list(&batch, index, column)?;
            append_fixed_size_list_values(list, Some(dimension), rows, &mut values)?;
            rows += list.len();
        }
        Ok(Self::from_parts(name, rows, dimension, values))
    }

    fn row_slice(&self, index: usize) -> Result<&[f64], DataSourceError> {
        let out_of_bounds = DataSourceError::OutOfBounds { index };
        if index >= self.rows {
            return Err(out_of_bounds);
        }
        let start = index * self.dimension;
        self.values
            .get(start..start + self.dimension)
            .ok_or(out_of_bounds)
    }

    fn metric_distance(&self, left: usize, right: usize) -> Result<f64, DataSourceError> {
        self.metric
            .distance(self.row_slice(left)?, self.row_slice(right)?)
            .map_err(|source| DataSourceError::Metric {
                left,
                right,
                source,
            })
    }
}

fn column_index(
    schema: &arrow_schema::Schema,
    column: &str,
) -> Result<usize, DenseMatrixProviderError> {
    schema
        .index_of(column)
        .map_err(|_| DenseMatrixProviderError::ColumnNotFound {
            column: column.to_owned(),
        })
}

fn downcast_list<'a>(
    batch: &'a RecordBatch,
    index: usize,
    column: &str,
) -> Result<&'a FixedSizeListArray, DenseMatrixProviderError> {
    let array = batch.column(index);
    array
        .as_any()
        .downcast_ref::<FixedSizeListArray>()
        .ok_or_else(|| DenseMatrixProviderError::InvalidColumnType {
            column: column.to_owned(),
            actual: array.data_type().clone(),
        })
}

impl DataSource for DenseMatrixProvider {
    fn len(&self) -> usize {
        self.rows
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn distance(&self, i: usize, j: usize) -> Result<f64, DataSourceError> {
        self.metric_distance(i, j)
    }

    fn batch_distances(
        &self,
        query: usize,
        candidates: &[usize],
    ) -> Result<Vec<f64>, DataSourceError> {
        let anchor = self.row_slice(query)?;
        candidates
            .iter()
            .map(|&candidate| {
                self.metric
                    .distance(anchor, self.row_slice(candidate)?)
                    .map_err(|source| DataSourceError::Metric {
                        left: query,
                        right: candidate,
                        source,
                    })
            })
            .collect()
    }
}
