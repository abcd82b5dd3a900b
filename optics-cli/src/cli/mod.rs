//! Command-line interface orchestration for OPTICS.
//!
//! The `run` command loads a Parquet dense matrix, fits OPTICS, and reports
//! the reachability ordering with hierarchical or DBSCAN labels.

mod commands;

pub use commands::{
    Cli, CliError, Command, ExecutionSummary, ParquetArgs, RunCommand, RunSource, render_summary,
    run_cli,
};
