//! Benchmark support crate for OPTICS.
//!
//! Provides synthetic data sources and parameter types used by Criterion
//! benchmarks for reachability expansion and both label extractors.

pub mod error;
pub mod params;
pub mod source;
