//! `optics` binary.
//!
//! Installs logging, runs the parsed command, and writes the reachability
//! listing to stdout. Failures are logged with their stable error codes
//! before the process exits non-zero.

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use optics_cli::{
    cli::{Cli, CliError, ExecutionSummary, render_summary, run_cli},
    logging::{self, LoggingError},
};
use optics_core::{DataSourceErrorCode, OpticsErrorCode};
use tracing::{error, field};

/// Stable codes attached to a failed run, when the failure came from the core.
#[derive(Default)]
struct FailureCodes {
    core: Option<OpticsErrorCode>,
    data_source: Option<DataSourceErrorCode>,
}

impl FailureCodes {
    fn of(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<CliError>() {
            Some(CliError::Core(core)) => Self {
                core: Some(core.code()),
                data_source: core.data_source_code(),
            },
            Some(CliError::Dense(_)) | None => Self::default(),
        }
    }
}

fn write_listing(summary: &ExecutionSummary) -> anyhow::Result<()> {
    let mut out = BufWriter::new(io::stdout().lock());
    render_summary(summary, &mut out).context("failed to render summary")?;
    out.flush().context("failed to flush output")
}

fn run() -> anyhow::Result<()> {
    let summary = run_cli(Cli::parse()).context("failed to execute command")?;
    write_listing(&summary)
}

fn main() -> ExitCode {
    if let Err(err) = logging::init_logging() {
        report_logging_init_error(&err);
        return ExitCode::FAILURE;
    }

    let Err(err) = run() else {
        return ExitCode::SUCCESS;
    };
    let codes = FailureCodes::of(&err);
    error!(
        error = format_args!("{err:#}"),
        code = codes.core.map(|code| field::display(code.as_str())),
        data_source_code = codes.data_source.map(|code| field::display(code.as_str())),
        "command execution failed"
    );
    ExitCode::FAILURE
}

#[expect(
    clippy::print_stderr,
    reason = "one-off diagnostic emitted before tracing is available"
)]
fn report_logging_init_error(err: &LoggingError) {
    eprintln!("optics: logging unavailable: {err}");
}
