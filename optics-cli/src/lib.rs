//! Support library for the `optics` CLI binary.
//!
//! Exposes the command pipeline and logging set-up so tests can exercise them
//! without forking a subprocess.

pub mod cli;
pub mod logging;
