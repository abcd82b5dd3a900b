//! Benchmark parameter types.
//!
//! Each type renders as the Criterion benchmark identifier.

use std::fmt;

/// Parameters for a reachability expansion benchmark run.
#[derive(Clone, Debug)]
pub struct ExpansionBenchParams {
    /// Number of points in the dataset.
    pub point_count: usize,
    /// Neighbourhood size that makes a point core.
    pub min_samples: usize,
    /// Search radius; infinite for an unbounded scan.
    pub max_bound: f64,
}

impl fmt::Display for ExpansionBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "n={},min_samples={},max_bound={}",
            self.point_count, self.min_samples, self.max_bound
        )
    }
}

/// Parameters for a hierarchical extraction benchmark run.
#[derive(Clone, Debug)]
pub struct HierarchyBenchParams {
    /// Number of points in the dataset.
    pub point_count: usize,
    /// Minimum cluster size as a fraction of the points.
    pub min_cluster_fraction: f64,
}

impl fmt::Display for HierarchyBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "n={},min_fraction={}",
            self.point_count, self.min_cluster_fraction
        )
    }
}

/// Parameters for a DBSCAN extraction benchmark run.
#[derive(Clone, Debug)]
pub struct DbscanBenchParams {
    /// Number of points in the dataset.
    pub point_count: usize,
    /// Number of radii extracted per iteration.
    pub radii: usize,
}

impl fmt::Display for DbscanBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n={},radii={}", self.point_count, self.radii)
    }
}
