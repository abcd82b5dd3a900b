//! Shared test utilities used across optics crates.
//!
//! - [`tracing`]: a layer that records spans and events for assertions.
//! - [`ci`]: environment-driven tuning for property-test suites.
//! - [`blobs`]: seeded synthetic point clouds with known cluster membership.

pub mod blobs;
pub mod ci;
pub mod tracing;
