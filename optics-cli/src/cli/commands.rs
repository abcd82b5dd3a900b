//! Command implementations and argument parsing for the OPTICS CLI.

use std::io::{self, Write};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use optics_core::{ClusterSize, ClusteringResult, DataSource, Metric, OpticsBuilder, OpticsError};
use optics_providers_dense::{DenseMatrixProvider, DenseMatrixProviderError};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

const DEFAULT_MIN_SAMPLES: usize = 5;

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(name = "optics", about = "Order points by reachability and extract clusters.")]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Fit OPTICS to a data source and print the reachability ordering.
    Run(RunCommand),
}

/// Options accepted by the `run` command.
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Number of points, the point itself included, that make a point core.
    #[arg(long = "min-samples", default_value_t = DEFAULT_MIN_SAMPLES)]
    pub min_samples: usize,

    /// Largest radius searched around each point.
    #[arg(long = "max-bound", default_value_t = f64::INFINITY)]
    pub max_bound: f64,

    /// Minimum cluster size as a count (`12`) or a fraction of the points (`0.05`).
    #[arg(long = "min-cluster-size", value_parser = parse_cluster_size)]
    pub min_cluster_size: Option<ClusterSize>,

    /// Report DBSCAN labels at this radius instead of hierarchical labels.
    #[arg(long)]
    pub eps: Option<f64>,

    /// Data source configuration.
    #[command(subcommand)]
    pub source: RunSource,
}

/// Input data sources supported by the CLI.
#[derive(Debug, Subcommand, Clone)]
pub enum RunSource {
    /// Execute against a Parquet file containing a `FixedSizeList<Float32, D>` column.
    Parquet(ParquetArgs),
}

/// Parquet ingestion arguments.
#[derive(Debug, Args, Clone)]
pub struct ParquetArgs {
    /// Path to the Parquet file containing feature vectors.
    pub path: PathBuf,

    /// Column containing `FixedSizeList<Float32, D>` rows.
    #[arg(long)]
    pub column: String,

    /// Distance metric: euclidean, manhattan, chebyshev, cosine, or minkowski:<p>.
    #[arg(long, default_value_t = Metric::Euclidean)]
    pub metric: Metric,

    /// Override name for the data source (defaults to the file name).
    #[arg(long)]
    pub name: Option<String>,
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Dense matrix ingestion failed.
    #[error(transparent)]
    Dense(#[from] DenseMatrixProviderError),
    /// Configuration, fitting, or extraction failed.
    #[error(transparent)]
    Core(#[from] OpticsError),
}

/// Summarises the outcome of executing a CLI command.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionSummary {
    /// Name reported by the data source implementation.
    pub data_source: String,
    /// Point indices in reachability order.
    pub ordering: Vec<usize>,
    /// Reachability at each ordering position.
    pub reachability: Vec<f64>,
    /// DBSCAN radius used for the labels, if any.
    pub eps: Option<f64>,
    /// Cluster labels indexed by point.
    pub labels: ClusteringResult,
}

/// Parses `--min-cluster-size`: integers are counts, anything with a decimal
/// point or exponent is a fraction of the data set.
pub(super) fn parse_cluster_size(raw: &str) -> Result<ClusterSize, String> {
    let raw = raw.trim();
    if raw.contains(['.', 'e', 'E']) {
        let fraction = raw
            .parse::<f64>()
            .map_err(|err| format!("`{raw}` is not a fraction: {err}"))?;
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(format!("fraction must lie in (0, 1], got {fraction}"));
        }
        return Ok(ClusterSize::Fraction(fraction));
    }
    raw.parse::<NonZeroUsize>()
        .map(ClusterSize::Count)
        .map_err(|err| format!("`{raw}` is not a positive count: {err}"))
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when configuration, ingestion, or clustering fails.
#[instrument(
    name = "cli.run",
    err,
    skip(cli),
    fields(command = field::Empty),
)]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    match cli.command {
        Command::Run(run) => {
            Span::current().record("command", field::display("run"));
            run_command(run)
        }
    }
}

#[instrument(
    name = "cli.execute",
    err,
    skip(command),
    fields(
        min_samples = command.min_samples,
        max_bound = command.max_bound,
        min_cluster_size = field::Empty,
        source = field::Empty,
    ),
)]
pub(super) fn run_command(command: RunCommand) -> Result<ExecutionSummary, CliError> {
    let mut builder = OpticsBuilder::new()
        .with_min_samples(command.min_samples)
        .with_max_bound(command.max_bound);
    if let Some(size) = command.min_cluster_size {
        builder = builder.with_min_cluster_size(size);
    }
    let span = Span::current();
    span.record(
        "min_cluster_size",
        field::debug(builder.hierarchy().min_cluster_size()),
    );
    let mut optics = builder.build()?;

    let provider = match command.source {
        RunSource::Parquet(args) => {
            span.record("source", field::display("parquet"));
            load_parquet(args)?
        }
    };

    let fit = optics.fit(&provider)?;
    let ordering = fit.ordering().ordering().to_vec();
    let reachability = fit.ordering().reachability().to_vec();
    let labels = match command.eps {
        Some(eps) => optics.extract_dbscan(eps)?.into_labels(),
        None => optics.labels()?.clone(),
    };

    info!(
        data_source = provider.name(),
        clusters = labels.cluster_count(),
        noise = labels.noise_count(),
        "command completed"
    );
    Ok(ExecutionSummary {
        data_source: provider.name().to_owned(),
        ordering,
        reachability,
        eps: command.eps,
        labels,
    })
}

#[instrument(
    name = "cli.load_parquet",
    err,
    skip(args),
    fields(
        path = field::Empty,
        column = field::Empty,
        metric = field::Empty,
        override_name = field::Empty,
    ),
)]
pub(super) fn load_parquet(args: ParquetArgs) -> Result<DenseMatrixProvider, CliError> {
    let ParquetArgs {
        path,
        column,
        metric,
        name,
    } = args;
    let span = Span::current();
    span.record("path", field::display(path.display()));
    span.record("column", field::display(&column));
    span.record("metric", field::display(metric));
    span.record(
        "override_name",
        field::display(name.as_deref().unwrap_or("<derived>")),
    );
    let chosen_name = derive_data_source_name(&path, name.as_deref());
    let provider = DenseMatrixProvider::try_from_parquet_path(chosen_name, &path, &column)?
        .with_metric(metric);
    info!(
        data_source = provider.name(),
        rows = provider.len(),
        dimension = provider.dimension(),
        "parquet source loaded"
    );
    Ok(provider)
}

pub(super) fn derive_data_source_name(path: &Path, override_name: Option<&str>) -> String {
    if let Some(name) = override_name {
        return name.to_owned();
    }

    path.file_stem()
        .and_then(|value| value.to_str())
        .map_or_else(|| "data_source".to_owned(), ToOwned::to_owned)
}

/// Renders `summary` to `writer` as a header followed by one tab-separated
/// `position point reachability label` line per ordering position.
///
/// Noise is labelled `-1`.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use optics_cli::cli::{ExecutionSummary, render_summary};
/// # use optics_core::{ClusterId, ClusteringResult};
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let summary = ExecutionSummary {
///     data_source: "demo".into(),
///     ordering: vec![1, 0, 2],
///     reachability: vec![f64::INFINITY, 0.5, 4.0],
///     eps: None,
///     labels: ClusteringResult::try_from_assignments(vec![
///         Some(ClusterId::new(0)),
///         Some(ClusterId::new(0)),
///         None,
///     ])?,
/// };
/// let mut buffer = Vec::new();
/// render_summary(&summary, &mut buffer)?;
/// let text = String::from_utf8(buffer)?;
/// assert!(text.ends_with("0\t1\tinf\t0\n1\t0\t0.5\t0\n2\t2\t4\t-1\n"));
/// # Ok(())
/// # }
/// ```
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    writeln!(writer, "data source: {}", summary.data_source)?;
    if let Some(eps) = summary.eps {
        writeln!(writer, "dbscan eps: {eps}")?;
    }
    writeln!(writer, "clusters: {}", summary.labels.cluster_count())?;
    writeln!(writer, "noise: {}", summary.labels.noise_count())?;
    let labels = summary.labels.labels();
    for (position, (&point, reachability)) in summary
        .ordering
        .iter()
        .zip(&summary.reachability)
        .enumerate()
    {
        let label = labels.get(point).copied().unwrap_or(-1);
        writeln!(writer, "{position}\t{point}\t{reachability}\t{label}")?;
    }
    Ok(())
}
