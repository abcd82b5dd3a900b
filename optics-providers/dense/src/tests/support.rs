//! Arrow and Parquet fixtures for the dense provider tests.

use arrow_array::{ArrayRef, FixedSizeListArray, Float32Array, RecordBatch};
use arrow_schema::{DataType, Field, Schema};
use bytes::Bytes;
use parquet::arrow::arrow_writer::ArrowWriter;
use std::sync::Arc;

const COLUMN: &str = "features";

fn width(dimension: usize) -> i32 {
    i32::try_from(dimension).expect("test widths fit in i32")
}

fn item_field(nullable: bool) -> Arc<Field> {
    Arc::new(Field::new("item", DataType::Float32, nullable))
}

/// Three-wide rows without nulls.
pub(crate) fn build_array(rows: &[[f32; 3]]) -> FixedSizeListArray {
    let rows: Vec<Vec<f32>> = rows.iter().map(|row| row.to_vec()).collect();
    build_list_array(&rows, 3, false)
}

pub(crate) fn build_list_array(
    rows: &[Vec<f32>],
    dimension: usize,
    child_nullable: bool,
) -> FixedSizeListArray {
    assert!(
        rows.iter().all(|row| row.len() == dimension),
        "fixture rows must share one width"
    );
    let values: ArrayRef = Arc::new(Float32Array::from_iter_values(
        rows.iter().flatten().copied(),
    ));
    FixedSizeListArray::new(item_field(child_nullable), width(dimension), values, None)
}

/// The `features` column definition.
pub(crate) fn feature_field(dimension: usize, child_nullable: bool, list_nullable: bool) -> Field {
    let list = DataType::FixedSizeList(item_field(child_nullable), width(dimension));
    Field::new(COLUMN, list, list_nullable)
}

fn single_column_batch(field: Field, array: FixedSizeListArray) -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![field]));
    RecordBatch::try_new(schema, vec![Arc::new(array) as ArrayRef]).expect("fixture batch")
}

pub(crate) fn feature_batch(rows: &[Vec<f32>], dimension: usize) -> RecordBatch {
    single_column_batch(
        feature_field(dimension, false, false),
        build_list_array(rows, dimension, false),
    )
}

pub(crate) fn write_parquet(array: FixedSizeListArray) -> Bytes {
    write_parquet_with_field(feature_field(3, false, false), array)
}

pub(crate) fn write_parquet_with_field(field: Field, array: FixedSizeListArray) -> Bytes {
    let batch = single_column_batch(field, array);
    write_batches(batch.schema(), &[batch])
}

/// Serialises `batches` into an in-memory Parquet file.
pub(crate) fn write_batches(schema: Arc<Schema>, batches: &[RecordBatch]) -> Bytes {
    let mut buffer = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buffer, schema, None).expect("parquet writer");
    for batch in batches {
        writer.write(batch).expect("batch write");
    }
    writer.close().expect("parquet footer");
    Bytes::from(buffer)
}
