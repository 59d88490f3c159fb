//! End-to-end tests for the LSH index.
//!
//! These run against seeded random hyperplanes; the fixed-hyperplane recall
//! geometry lives with the unit tests next to the table implementation.

use coinrec::{EngineError, LshIndex, LshParams, Metric, Point};

fn euclidean_params(seed: u64) -> LshParams {
    LshParams {
        hyperplanes: 4,
        tables: 5,
        metric: Metric::Euclidean,
        seed: Some(seed),
    }
}

/// Points along a positive ray share every hyperplane sign, so they land in
/// the same bucket of every table regardless of the drawn hyperplanes.
fn ray_points() -> Vec<Point> {
    vec![
        Point::new("p1", vec![1.0, 2.0]),
        Point::new("p2", vec![2.0, 4.0]),
        Point::new("p3", vec![3.0, 6.0]),
    ]
}

// =============================================================================
// Retrieval
// =============================================================================

#[test]
fn inserting_then_querying_a_point_finds_it_at_distance_zero() {
    let mut index = LshIndex::new(2, euclidean_params(42)).unwrap();
    let mut handles = Vec::new();
    for point in ray_points() {
        handles.push(index.insert(point).unwrap());
    }

    let query = Point::new("q", vec![2.0, 4.0]);
    let result = index.find_all_neighbors(&query).unwrap();
    let nearest = result.nearest.expect("query point itself must be found");
    assert_eq!(result.neighbors[nearest], (handles[1], 0.0));

    let (handle, dist) = index.find_nearest(&query).unwrap().unwrap();
    assert_eq!((handle, dist), (handles[1], 0.0));
}

#[test]
fn ray_points_share_buckets_and_deduplicate_across_tables() {
    let mut index = LshIndex::new(2, euclidean_params(7)).unwrap();
    for point in ray_points() {
        index.insert(point).unwrap();
    }

    let result = index
        .find_all_neighbors(&Point::new("q", vec![1.0, 2.0]))
        .unwrap();
    // Five tables all report the same bucket members; each appears once.
    assert_eq!(result.neighbors.len(), 3);
}

#[test]
fn radius_bound_is_strict() {
    let mut index = LshIndex::new(2, euclidean_params(7)).unwrap();
    let a = index.insert(Point::new("a", vec![1.0, 0.0])).unwrap();
    index.insert(Point::new("b", vec![3.0, 0.0])).unwrap();

    // b sits at Euclidean distance exactly 2.0 from the query.
    let query = Point::new("q", vec![1.0, 0.0]);
    let bounded = index.find_all_neighbors_within(&query, 2.0).unwrap();
    assert_eq!(bounded.neighbors, vec![(a, 0.0)]);

    let wider = index.find_all_neighbors_within(&query, 2.5).unwrap();
    assert_eq!(wider.neighbors.len(), 2);
}

#[test]
fn empty_index_reports_no_neighbors() {
    let index = LshIndex::new(3, euclidean_params(1)).unwrap();
    let query = Point::new("q", vec![1.0, 2.0, 3.0]);

    let result = index.find_all_neighbors(&query).unwrap();
    assert!(result.neighbors.is_empty());
    assert_eq!(result.nearest, None);
    assert_eq!(index.find_nearest(&query).unwrap(), None);
}

// =============================================================================
// Dimension and parameter validation
// =============================================================================

#[test]
fn mismatched_dimensions_are_rejected_not_crashed() {
    let mut index = LshIndex::new(3, euclidean_params(1)).unwrap();
    index.insert(Point::new("a", vec![1.0, 2.0, 3.0])).unwrap();

    assert!(matches!(
        index.insert(Point::new("bad", vec![1.0, 2.0])),
        Err(EngineError::DimensionMismatch {
            point_dim: 2,
            expected_dim: 3
        })
    ));

    let query = Point::new("q", vec![1.0]);
    assert!(index.find_all_neighbors(&query).is_err());
    assert!(index.find_nearest(&query).is_err());

    // The failed calls left the index usable.
    assert_eq!(index.len(), 1);
    let ok = Point::new("q", vec![1.0, 2.0, 3.0]);
    assert!(index.find_all_neighbors(&ok).is_ok());
}

#[test]
fn invalid_parameters_are_construction_errors() {
    let cases = [
        (0, LshParams::default()),
        (
            2,
            LshParams {
                hyperplanes: 0,
                ..LshParams::default()
            },
        ),
        (
            2,
            LshParams {
                hyperplanes: 33,
                ..LshParams::default()
            },
        ),
        (
            2,
            LshParams {
                tables: 0,
                ..LshParams::default()
            },
        ),
    ];
    for (dimension, params) in cases {
        assert!(matches!(
            LshIndex::new(dimension, params),
            Err(EngineError::InvalidParameter(_))
        ));
    }
}

// =============================================================================
// Determinism
// =============================================================================

#[test]
fn repeated_queries_are_identical() {
    let mut index = LshIndex::new(2, euclidean_params(99)).unwrap();
    for point in ray_points() {
        index.insert(point).unwrap();
    }

    let query = Point::new("q", vec![1.5, 3.0]);
    let first = index.find_all_neighbors(&query).unwrap();
    let second = index.find_all_neighbors(&query).unwrap();
    assert_eq!(first, second);
}

#[test]
fn same_seed_builds_the_same_index() {
    let build = || {
        let mut index = LshIndex::new(2, euclidean_params(1234)).unwrap();
        for i in 0..40 {
            let angle = i as f32 * 0.37;
            index
                .insert(Point::new(format!("p{i}"), vec![angle.cos(), angle.sin()]))
                .unwrap();
        }
        index
    };

    let first = build();
    let second = build();
    let query = Point::new("q", vec![0.6, 0.8]);
    assert_eq!(
        first.find_all_neighbors(&query).unwrap(),
        second.find_all_neighbors(&query).unwrap()
    );
}
