//! Dense `f64` data sources for OPTICS, loaded from memory or from Parquet
//! `FixedSizeList<Float32, D>` columns.

mod errors;
mod ingest;
mod provider;
mod source;

pub use errors::DenseMatrixProviderError;
pub use provider::DenseMatrixProvider;
pub use source::DenseSource;

#[cfg(test)]
mod tests;
