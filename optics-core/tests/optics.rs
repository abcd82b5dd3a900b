//! Tests for the `Optics` estimator API.

mod common;

use std::{
    collections::{BTreeMap, BTreeSet},
    num::NonZeroUsize,
};

use common::Points;
use optics_core::{
    ClusterSize, DataSource, ExtractionWarning, HierarchyConfig, Optics, OpticsBuilder, OpticsError,
};
use optics_test_support::{
    blobs::{BlobSpec, gaussian_blobs, six_blobs},
    tracing::RecordingLayer,
};
use rstest::{fixture, rstest};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;

#[fixture]
fn blobs() -> (Points, Vec<usize>) {
    let data = six_blobs(100, 42);
    (Points::new(data.points), data.truth)
}

fn estimator(min_samples: usize) -> Optics {
    OpticsBuilder::new()
        .with_min_samples(min_samples)
        .build()
        .expect("configuration must be valid")
}

#[rstest]
fn builder_defaults() {
    let builder = OpticsBuilder::new();
    assert_eq!(builder.min_samples(), 5);
    assert_eq!(builder.max_bound(), f64::INFINITY);
    assert_eq!(builder.hierarchy(), &HierarchyConfig::default());
    assert_eq!(
        builder.hierarchy().min_cluster_size(),
        ClusterSize::Fraction(0.005)
    );
}

#[rstest]
fn builder_rejects_zero_min_samples() {
    let err = OpticsBuilder::new()
        .with_min_samples(0)
        .build()
        .expect_err("builder must reject zero min_samples");
    assert!(matches!(err, OpticsError::InvalidMinSamples { got: 0 }));
}

#[rstest]
fn recovers_separated_blobs_as_pure_clusters(blobs: (Points, Vec<usize>)) {
    let (points, truth) = blobs;
    let mut optics = estimator(9);
    let fit = optics.fit(&points).expect("fit must succeed");
    let labels = fit.labels();

    assert_eq!(labels.assignments().len(), points.rows().len());
    assert_eq!(labels.cluster_count(), 6);

    let mut blobs_per_cluster = vec![BTreeSet::new(); labels.cluster_count()];
    for (id, &blob) in labels.assignments().iter().zip(&truth) {
        if let Some(id) = id {
            blobs_per_cluster[id.get() as usize].insert(blob);
        }
    }
    assert!(
        blobs_per_cluster.iter().all(|blobs| blobs.len() == 1),
        "every cluster must come from a single blob: {blobs_per_cluster:?}"
    );
    let covered: BTreeSet<usize> = blobs_per_cluster.into_iter().flatten().collect();
    assert_eq!(covered, (0..6).collect());
}

/// Six overlapping blobs of 250 points with spreads from 0.1 to 2.0. The
/// widest two bleed into their neighbours.
fn crowded_blobs(seed: u64) -> (Points, Vec<usize>) {
    let specs = [
        ([-5.0, -2.0], 0.8),
        ([4.0, -1.0], 0.1),
        ([1.0, -2.0], 0.2),
        ([-2.0, 3.0], 0.3),
        ([3.0, -2.0], 1.6),
        ([5.0, 6.0], 2.0),
    ]
    .map(|(centre, std_dev)| BlobSpec::new(centre, std_dev, 250));
    let data = gaussian_blobs(&specs, seed);
    (Points::new(data.points), data.truth)
}

#[rstest]
#[case::seed_1(1)]
#[case::seed_3(3)]
fn crowded_blobs_absorb_the_widest_spread(#[case] seed: u64) {
    let (points, truth) = crowded_blobs(seed);
    let mut optics = estimator(9);
    let labels = optics.fit(&points).expect("fit must succeed").labels();

    assert_eq!(labels.cluster_count(), 5);
    assert!(labels.noise_count() > 0);

    let mut members = vec![BTreeMap::<usize, usize>::new(); labels.cluster_count()];
    for (id, &blob) in labels.assignments().iter().zip(&truth) {
        if let Some(id) = id {
            *members[id.get() as usize].entry(blob).or_default() += 1;
        }
    }
    let majorities: BTreeSet<usize> = members
        .iter()
        .filter_map(|counts| counts.iter().max_by_key(|(_, count)| **count))
        .map(|(blob, _)| *blob)
        .collect();
    assert_eq!(majorities, BTreeSet::from([0, 1, 2, 3, 5]));
}

#[rstest]
fn exposes_a_complete_reachability_ordering(blobs: (Points, Vec<usize>)) {
    let (points, _) = blobs;
    let mut optics = estimator(5);
    optics.fit(&points).expect("fit must succeed");

    let ordering = optics.ordering().expect("fitted");
    let mut sorted = ordering.to_vec();
    sorted.sort_unstable();
    assert_eq!(sorted, (0..points.len()).collect::<Vec<_>>());

    let reachability = optics.reachability().expect("fitted");
    assert_eq!(reachability.len(), points.len());
    assert_eq!(reachability[0], f64::INFINITY);
    assert!(reachability[1..].iter().all(|r| r.is_finite()));

    let cores = optics.core_distances().expect("fitted");
    assert_eq!(cores.len(), points.len());
    assert!(cores.iter().all(|c| c.is_finite() && *c > 0.0));
    assert_eq!(optics.fitted().map(|fit| fit.data_source()), Some("points"));
}

#[rstest]
fn fit_records_core_tracing(blobs: (Points, Vec<usize>)) {
    let (points, _) = blobs;
    let mut optics = estimator(9);
    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());

    tracing::subscriber::with_default(subscriber, || optics.fit(&points).map(|_| ()))
        .expect("fit must succeed");

    let fit_span = layer.span("core.fit").expect("core.fit span must exist");
    assert_eq!(fit_span.field("data_source"), Some("points"));
    assert_eq!(fit_span.field("items"), Some("600"));
    assert_eq!(fit_span.field("min_samples"), Some("9"));

    let expand_span = layer
        .span("core.expand")
        .expect("core.expand span must exist");
    assert_eq!(expand_span.field("items"), Some("600"));
    assert!(layer.span("core.extract_hierarchy").is_some());

    assert!(layer.has_message(Level::INFO, "reachability ordering completed"));
    assert!(layer.has_message(Level::INFO, "fit completed"));
}

#[rstest]
fn empty_source_logs_a_warning() {
    let mut optics = estimator(5);
    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());

    let err = tracing::subscriber::with_default(subscriber, || {
        optics.fit(&Points::new(vec![])).map(|_| ())
    })
    .expect_err("empty sources must fail");
    assert!(matches!(err, OpticsError::EmptySource { .. }));

    let fit_span = layer.span("core.fit").expect("core.fit span must exist");
    assert_eq!(fit_span.field("items"), Some("0"));
    assert!(layer.has_message(Level::WARN, "data source is empty, returning error"));
}

#[rstest]
#[case::single_point(vec![vec![0.0, 0.0]], 10)]
#[case::exactly_min_samples(vec![vec![0.0], vec![1.0], vec![2.0]], 3)]
fn rejects_sources_not_larger_than_min_samples(
    #[case] rows: Vec<Vec<f64>>,
    #[case] min_samples: usize,
) {
    let n_samples = rows.len();
    let mut optics = estimator(min_samples);
    let err = optics
        .fit(&Points::new(rows))
        .expect_err("source is too small");
    assert!(matches!(
        err,
        OpticsError::InsufficientSamples { n_samples: n, min_samples: m, .. }
            if n == n_samples && m == min_samples
    ));
    assert!(optics.fitted().is_none());
}

#[rstest]
fn rejects_cluster_size_above_dataset_before_expanding() {
    let rows: Vec<Vec<f64>> = (0..6).map(|i| vec![f64::from(i)]).collect();
    let seven = NonZeroUsize::new(7).expect("non-zero");
    let mut optics = OpticsBuilder::new()
        .with_min_samples(2)
        .with_min_cluster_size(ClusterSize::Count(seven))
        .build()
        .expect("configuration must be valid");
    let err = optics
        .fit(&Points::new(rows))
        .expect_err("size exceeds dataset");
    assert_eq!(
        err,
        OpticsError::MinClusterSizeTooLarge {
            min_cluster_size: 7,
            n_samples: 6,
        }
    );
}

#[rstest]
fn failed_refit_leaves_the_estimator_unfitted(blobs: (Points, Vec<usize>)) {
    let (points, _) = blobs;
    let mut optics = estimator(5);
    optics.fit(&points).expect("fit must succeed");
    assert!(optics.fitted().is_some());

    optics
        .fit(&Points::new(vec![vec![1.0]]))
        .expect_err("second fit must fail");
    assert!(matches!(optics.labels(), Err(OpticsError::NotFitted)));
}

#[rstest]
fn results_require_a_fit() {
    let optics = estimator(5);
    assert!(matches!(optics.ordering(), Err(OpticsError::NotFitted)));
    assert!(matches!(optics.reachability(), Err(OpticsError::NotFitted)));
    assert!(matches!(
        optics.core_distances(),
        Err(OpticsError::NotFitted)
    ));
    assert!(matches!(optics.labels(), Err(OpticsError::NotFitted)));
    assert!(matches!(
        optics.extract_dbscan(0.5),
        Err(OpticsError::NotFitted)
    ));
    assert!(matches!(
        optics.extract_dbscan_sweep(&[0.5]),
        Err(OpticsError::NotFitted)
    ));
    assert!(matches!(
        optics.extract_hierarchy(&HierarchyConfig::default()),
        Err(OpticsError::NotFitted)
    ));
}

#[rstest]
fn dbscan_extraction_respects_the_fitted_bound(blobs: (Points, Vec<usize>)) {
    let (points, _) = blobs;
    let mut optics = OpticsBuilder::new()
        .with_min_samples(5)
        .with_max_bound(1.0)
        .build()
        .expect("configuration must be valid");
    optics.fit(&points).expect("fit must succeed");

    let err = optics
        .extract_dbscan(1.0)
        .expect_err("eps equals max_bound");
    assert_eq!(err.to_string(), "specify an epsilon smaller than 1; got 1");
    assert!(matches!(
        optics.extract_dbscan(1.5),
        Err(OpticsError::EpsilonTooLarge { .. })
    ));

    let extraction = optics.extract_dbscan(0.5).expect("eps below bound");
    assert!(
        extraction
            .warnings()
            .contains(&ExtractionWarning::UnstableBound {
                eps: 0.5,
                max_bound: 1.0,
            })
    );
}

#[rstest]
fn repeated_hierarchy_extraction_matches_fit_labels(blobs: (Points, Vec<usize>)) {
    let (points, _) = blobs;
    let mut optics = estimator(9);
    optics.fit(&points).expect("fit must succeed");

    let again = optics
        .extract_hierarchy(optics.hierarchy())
        .expect("extraction must succeed");
    assert_eq!(Some(again.labels()), optics.labels().ok());

    let coarse = optics
        .extract_hierarchy(
            &HierarchyConfig::default().with_min_cluster_size(ClusterSize::Fraction(0.5)),
        )
        .expect("extraction must succeed");
    assert!(coarse.labels().cluster_count() <= 2);
    assert!(
        coarse
            .labels()
            .cluster_sizes()
            .iter()
            .all(|&size| size >= 300)
    );
}
