//! Failures while preparing benchmark inputs.

use crate::source::SyntheticError;
use optics_core::OpticsError;

/// Raised before any measurement starts.
#[derive(Debug, thiserror::Error)]
pub enum BenchSetupError {
    /// Synthetic data generation failed.
    #[error("synthetic source generation failed: {0}")]
    Synthetic(#[from] SyntheticError),
    /// Expansion or extractor configuration failed.
    #[error("OPTICS operation failed: {0}")]
    Optics(#[from] OpticsError),
    /// A zero value was passed where a non-zero integer was required.
    #[error("expected a non-zero value for {context}")]
    ZeroValue {
        /// A description of the parameter that was unexpectedly zero.
        context: &'static str,
    },
}
