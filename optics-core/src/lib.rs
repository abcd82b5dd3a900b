//! OPTICS core library.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod datasource;
mod dbscan;
mod distance;
mod error;
mod hierarchy;
mod optics;
mod reachability;
mod result;
#[cfg(test)]
mod test_utils;

pub use crate::{
    builder::OpticsBuilder,
    datasource::{DataSource, Neighbour},
    dbscan::{DbscanExtraction, ExtractionWarning, extract_dbscan, extract_dbscan_sweep},
    distance::{
        DistanceError, Metric, UnknownMetric, VectorKind, chebyshev_distance, cosine_distance,
        euclidean_distance, manhattan_distance, minkowski_distance,
    },
    error::{DataSourceError, DataSourceErrorCode, OpticsError, OpticsErrorCode, Result},
    hierarchy::{
        ClusterSize, ClusterTree, HierarchyConfig, HierarchyExtraction, NodeId, TreeNode,
        TreeParams, extract_hierarchy, find_local_maxima, normalise_plot,
    },
    optics::{Optics, OpticsFit},
    reachability::{ReachabilityOrdering, core_distance, core_distances, expand},
    result::{ClusterId, ClusteringResult, NOISE_LABEL, NonContiguousClusterIds},
};
