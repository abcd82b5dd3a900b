//! Unit and property tests for the reachability expander.

use std::{
    num::NonZeroUsize,
    sync::{Arc, atomic::AtomicUsize},
};

use optics_test_support::blobs::uniform_points;
use proptest::prelude::*;
use rstest::rstest;
use test_strategy::Arbitrary;

use crate::{
    DataSource, OpticsError,
    test_utils::{CountingSource, VectorSource, suite_proptest_config},
};

use super::expand;

fn nz(value: usize) -> NonZeroUsize {
    NonZeroUsize::new(value).expect("test values are non-zero")
}

fn line(values: &[f64]) -> CountingSource {
    CountingSource::new(values.to_vec(), Arc::new(AtomicUsize::new(0)))
}

#[test]
fn orders_two_separated_pairs() {
    let ordering =
        expand(&line(&[0.0, 10.0, 1.0, 11.0]), nz(2), f64::INFINITY).expect("expansion succeeds");
    assert_eq!(ordering.ordering(), [0, 2, 1, 3]);
    assert_eq!(ordering.reachability(), [f64::INFINITY, 1.0, 9.0, 1.0]);
    assert_eq!(ordering.core_distances(), [1.0; 4]);
    assert_eq!(ordering.predecessors(), [None, Some(2), Some(0), Some(1)]);
}

#[test]
fn restarts_at_smallest_unprocessed_index_when_frontier_empties() {
    // With max_bound 2 the two pairs are density-disconnected.
    let ordering = expand(&line(&[10.0, 0.0, 11.0, 1.0]), nz(2), 2.0).expect("expansion succeeds");
    assert_eq!(ordering.ordering(), [0, 2, 1, 3]);
    assert_eq!(
        ordering.reachability(),
        [f64::INFINITY, 1.0, f64::INFINITY, 1.0]
    );
}

#[test]
fn points_without_core_distance_do_not_expand() {
    // min_samples 3 leaves the isolated point 3 without a finite core distance.
    let ordering = expand(&line(&[0.0, 0.5, 1.0, 50.0]), nz(3), 5.0).expect("expansion succeeds");
    assert_eq!(ordering.ordering(), [0, 1, 2, 3]);
    assert_eq!(ordering.core_distances()[3], f64::INFINITY);
    assert_eq!(ordering.reachability()[3], f64::INFINITY);
}

#[rstest]
#[case::identical_points(vec![2.0; 5])]
#[case::single_point(vec![4.0])]
fn degenerate_inputs_yield_full_orderings(#[case] values: Vec<f64>) {
    let ordering = expand(&line(&values), nz(1), f64::INFINITY).expect("expansion succeeds");
    assert_eq!(ordering.len(), values.len());
    assert_eq!(ordering.reachability().first(), Some(&f64::INFINITY));
    assert!(ordering.reachability().iter().skip(1).all(|&r| r == 0.0));
}

#[test]
fn issues_one_neighbourhood_query_per_point() {
    let source = line(&[0.0, 1.0, 2.0, 3.0, 4.0]);
    expand(&source, nz(2), f64::INFINITY).expect("expansion succeeds");
    let calls = source.calls().load(std::sync::atomic::Ordering::Relaxed);
    assert_eq!(calls, 25, "each of 5 brute-force queries scans 5 points");
}

#[test]
fn wraps_data_source_failures() {
    struct ShortSource;
    impl DataSource for ShortSource {
        fn len(&self) -> usize {
            3
        }
        fn name(&self) -> &str {
            "short"
        }
        fn distance(&self, _: usize, j: usize) -> Result<f64, crate::DataSourceError> {
            if j == 2 {
                Err(crate::DataSourceError::OutOfBounds { index: j })
            } else {
                Ok(0.0)
            }
        }
    }

    let err = expand(&ShortSource, nz(1), f64::INFINITY).expect_err("query must fail");
    assert!(matches!(
        err,
        OpticsError::DataSource {
            ref data_source,
            error: crate::DataSourceError::OutOfBounds { index: 2 },
        } if &**data_source == "short"
    ));
}

#[test]
fn rejects_negative_distances() {
    struct Negative;
    impl DataSource for Negative {
        fn len(&self) -> usize {
            2
        }
        fn name(&self) -> &str {
            "negative"
        }
        fn distance(&self, i: usize, j: usize) -> Result<f64, crate::DataSourceError> {
            Ok(if i == j { 0.0 } else { -1.0 })
        }
    }

    let err = expand(&Negative, nz(1), f64::INFINITY).expect_err("negative distance");
    assert!(matches!(err, OpticsError::InvalidDistance { distance, .. } if distance == -1.0));
}

/// Shape of the point cloud fed to the property runners.
#[derive(Clone, Copy, Debug, Arbitrary)]
enum Layout {
    /// Points sampled uniformly in a square.
    #[weight(3)]
    Uniform,
    /// Points snapped to a coarse grid so distances tie frequently.
    #[weight(2)]
    Gridded,
    /// Uniform points where every row is duplicated.
    #[weight(1)]
    Duplicated,
}

fn generate(layout: Layout, count: usize, seed: u64) -> VectorSource {
    let points = uniform_points(count, 2, 10.0, seed);
    let rows = match layout {
        Layout::Uniform => points,
        Layout::Gridded => points
            .into_iter()
            .map(|row| row.into_iter().map(f64::round).collect())
            .collect(),
        Layout::Duplicated => points
            .into_iter()
            .take(count.div_ceil(2))
            .flat_map(|row| [row.clone(), row])
            .collect(),
    };
    VectorSource::new(rows)
}

fn brute_force_distance(source: &VectorSource, i: usize, j: usize) -> f64 {
    source.distance(i, j).expect("indices are in range")
}

proptest! {
    #![proptest_config(suite_proptest_config(64))]

    #[test]
    fn ordering_is_a_permutation_with_leading_infinity(
        layout: Layout,
        count in 2_usize..60,
        min_samples in 1_usize..8,
        max_bound in prop_oneof![Just(f64::INFINITY), 0.5_f64..8.0],
        seed: u64,
    ) {
        let source = generate(layout, count, seed);
        let ordering = expand(&source, nz(min_samples), max_bound).expect("expansion succeeds");

        let mut seen = ordering.ordering().to_vec();
        seen.sort_unstable();
        prop_assert_eq!(seen, (0..source.len()).collect::<Vec<_>>());
        prop_assert_eq!(ordering.reachability().len(), source.len());
        prop_assert_eq!(ordering.reachability().first().copied(), Some(f64::INFINITY));
    }

    #[test]
    fn core_distances_match_brute_force_neighbourhoods(
        layout: Layout,
        count in 2_usize..40,
        min_samples in 1_usize..6,
        max_bound in prop_oneof![Just(f64::INFINITY), 0.5_f64..8.0],
        seed: u64,
    ) {
        let source = generate(layout, count, seed);
        let ordering = expand(&source, nz(min_samples), max_bound).expect("expansion succeeds");

        for (point, &core) in ordering.core_distances().iter().enumerate() {
            let mut within: Vec<f64> = (0..source.len())
                .map(|other| brute_force_distance(&source, point, other))
                .filter(|&d| d <= max_bound)
                .collect();
            within.sort_by(f64::total_cmp);
            let expected = within.get(min_samples - 1).copied().unwrap_or(f64::INFINITY);
            prop_assert_eq!(core, expected);
            if core.is_finite() {
                prop_assert!(within.len() >= min_samples);
            }
        }
    }

    #[test]
    fn reachability_is_derived_from_the_predecessor(
        layout: Layout,
        count in 2_usize..40,
        min_samples in 1_usize..6,
        seed: u64,
    ) {
        let source = generate(layout, count, seed);
        let ordering = expand(&source, nz(min_samples), f64::INFINITY).expect("expansion succeeds");
        let mut position_of = vec![0; source.len()];
        for (position, &point) in ordering.ordering().iter().enumerate() {
            position_of[point] = position;
        }

        for (position, (point, reach)) in ordering.iter().enumerate() {
            match ordering.predecessors()[point] {
                None => prop_assert_eq!(reach, f64::INFINITY),
                Some(via) => {
                    prop_assert!(position_of[via] < position);
                    let core = ordering.core_distances()[via];
                    let expected = core.max(brute_force_distance(&source, via, point));
                    prop_assert_eq!(reach, expected);
                }
            }
        }
    }

    #[test]
    fn expansion_is_deterministic(layout: Layout, count in 2_usize..40, seed: u64) {
        let source = generate(layout, count, seed);
        let first = expand(&source, nz(3), f64::INFINITY).expect("expansion succeeds");
        let second = expand(&source, nz(3), f64::INFINITY).expect("expansion succeeds");
        prop_assert_eq!(first, second);
    }
}
