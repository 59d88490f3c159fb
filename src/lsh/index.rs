//! L-table LSH index over an owned point arena.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{EngineError, Result};
use crate::lsh::table::HyperplaneTable;
use crate::metric::Metric;
use crate::point::Point;

/// LSH index parameters.
#[derive(Debug, Clone)]
pub struct LshParams {
    /// Hyperplanes per table (signature bits, 1..=32). More bits mean
    /// smaller buckets and fewer candidates per query.
    pub hyperplanes: usize,
    /// Number of independent tables. More tables mean better recall at L×
    /// storage and query cost.
    pub tables: usize,
    /// Comparison metric. The index treats smaller values as closer, so
    /// configuring [`Metric::CosineSimilarity`] inverts polarity.
    pub metric: Metric,
    /// Seed for hyperplane generation. `None` draws one from entropy.
    pub seed: Option<u64>,
}

impl Default for LshParams {
    fn default() -> Self {
        Self {
            hyperplanes: 4,
            tables: 5,
            metric: Metric::CosineDistance,
            seed: None,
        }
    }
}

/// Deduplicated cross-table query result.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NeighborSet {
    /// (handle, metric value) pairs; the first table to report a point wins,
    /// so each handle appears at most once.
    pub neighbors: Vec<(usize, f32)>,
    /// Position in `neighbors` of the globally closest point, `None` when
    /// every table's bucket came up empty.
    pub nearest: Option<usize>,
}

/// Approximate nearest-neighbor index: L hyperplane tables over one arena.
///
/// The index owns its points; queries hand back arena handles resolvable via
/// [`LshIndex::point`]. Build-then-query: feed every point through
/// [`LshIndex::insert`], then issue read-only lookups.
pub struct LshIndex {
    dimension: usize,
    metric: Metric,
    points: Vec<Point>,
    tables: Vec<HyperplaneTable>,
}

impl LshIndex {
    /// Create an index with `params.tables` independent tables of
    /// `params.hyperplanes` freshly drawn N(0, 1) hyperplanes each.
    pub fn new(dimension: usize, params: LshParams) -> Result<Self> {
        if dimension == 0 {
            return Err(EngineError::InvalidParameter(
                "dimension must be greater than 0".to_string(),
            ));
        }
        if params.hyperplanes == 0 || params.hyperplanes > 32 {
            return Err(EngineError::InvalidParameter(format!(
                "hyperplanes per table must be in 1..=32, got {}",
                params.hyperplanes
            )));
        }
        if params.tables == 0 {
            return Err(EngineError::InvalidParameter(
                "at least one table is required".to_string(),
            ));
        }

        let seed = params.seed.unwrap_or_else(|| rand::rng().random());
        let mut rng = StdRng::seed_from_u64(seed);
        let tables = (0..params.tables)
            .map(|_| HyperplaneTable::new(params.hyperplanes, dimension, &mut rng))
            .collect();

        Ok(Self {
            dimension,
            metric: params.metric,
            points: Vec::new(),
            tables,
        })
    }

    /// Test hook: build an index around fixed tables.
    #[cfg(test)]
    pub(crate) fn with_tables(
        dimension: usize,
        metric: Metric,
        tables: Vec<HyperplaneTable>,
    ) -> Self {
        Self {
            dimension,
            metric,
            points: Vec::new(),
            tables,
        }
    }

    /// Insert a point, broadcasting it to every table.
    ///
    /// Returns the point's arena handle, as used in query results.
    pub fn insert(&mut self, point: Point) -> Result<usize> {
        self.check_dim(&point)?;
        let handle = self.points.len();
        for table in &mut self.tables {
            table.insert(handle, &point);
        }
        self.points.push(point);
        Ok(handle)
    }

    /// Query every table and union the per-table hits.
    ///
    /// Deduplicates by handle, keeping the first table's metric value for
    /// each point; `nearest` tracks the single globally closest hit.
    pub fn find_all_neighbors(&self, query: &Point) -> Result<NeighborSet> {
        self.find_all_neighbors_within(query, f32::INFINITY)
    }

    /// As [`LshIndex::find_all_neighbors`], discarding neighbors whose
    /// metric value is not strictly below `radius`.
    pub fn find_all_neighbors_within(&self, query: &Point, radius: f32) -> Result<NeighborSet> {
        self.check_dim(query)?;

        let mut seen = HashSet::new();
        let mut out = NeighborSet::default();
        let mut best = f32::INFINITY;

        for table in &self.tables {
            let hits = table.search_within(query, &self.points, self.metric, radius);
            for (handle, value) in hits.hits {
                if !seen.insert(handle) {
                    continue;
                }
                out.neighbors.push((handle, value));
                if out.nearest.is_none() || value < best {
                    best = value;
                    out.nearest = Some(out.neighbors.len() - 1);
                }
            }
        }
        Ok(out)
    }

    /// Single globally nearest point across all tables.
    ///
    /// Short-circuits as soon as a table reports an exact match (metric
    /// value 0.0). `None` when every table's bucket came up empty.
    pub fn find_nearest(&self, query: &Point) -> Result<Option<(usize, f32)>> {
        self.check_dim(query)?;

        let mut best: Option<(usize, f32)> = None;
        for table in &self.tables {
            let hits = table.search(query, &self.points, self.metric);
            let Some(n) = hits.nearest else { continue };
            let (handle, value) = hits.hits[n];
            if value == 0.0 {
                return Ok(Some((handle, value)));
            }
            match best {
                Some((_, b)) if b <= value => {}
                _ => best = Some((handle, value)),
            }
        }
        Ok(best)
    }

    /// Resolve an arena handle returned by a query.
    pub fn point(&self, handle: usize) -> Option<&Point> {
        self.points.get(handle)
    }

    /// Number of inserted points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    fn check_dim(&self, point: &Point) -> Result<()> {
        if point.dim() != self.dimension {
            return Err(EngineError::DimensionMismatch {
                point_dim: point.dim(),
                expected_dim: self.dimension,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Index with a single table whose only hyperplane is the x-axis normal,
    /// so bucket membership is the sign of the x coordinate.
    fn x_axis_index() -> LshIndex {
        LshIndex::with_tables(
            2,
            Metric::Euclidean,
            vec![HyperplaneTable::with_hyperplanes(vec![vec![1.0, 0.0]])],
        )
    }

    #[test]
    fn recall_respects_the_hyperplane_partition() {
        let mut index = x_axis_index();
        let a = index.insert(Point::new("a", vec![1.0, 0.0])).unwrap();
        let b = index.insert(Point::new("b", vec![0.99, 0.1])).unwrap();
        let c = index.insert(Point::new("c", vec![-1.0, 0.0])).unwrap();
        let d = index.insert(Point::new("d", vec![-0.98, -0.1])).unwrap();

        let query = Point::new("a", vec![1.0, 0.0]);
        let result = index.find_all_neighbors(&query).unwrap();
        let handles: HashSet<usize> = result.neighbors.iter().map(|&(h, _)| h).collect();

        assert!(handles.contains(&a));
        assert!(handles.contains(&b));
        assert!(!handles.contains(&c));
        assert!(!handles.contains(&d));

        // The query point itself is the nearest, at distance zero.
        let nearest = result.nearest.unwrap();
        assert_eq!(result.neighbors[nearest], (a, 0.0));
    }

    #[test]
    fn duplicate_hits_across_tables_collapse_to_one() {
        let tables = vec![
            HyperplaneTable::with_hyperplanes(vec![vec![1.0, 0.0]]),
            HyperplaneTable::with_hyperplanes(vec![vec![0.0, 1.0]]),
        ];
        let mut index = LshIndex::with_tables(2, Metric::Euclidean, tables);
        index.insert(Point::new("a", vec![1.0, 1.0])).unwrap();
        index.insert(Point::new("b", vec![2.0, 2.0])).unwrap();

        // Both points land in the positive bucket of both tables.
        let result = index
            .find_all_neighbors(&Point::new("q", vec![1.0, 1.0]))
            .unwrap();
        assert_eq!(result.neighbors.len(), 2);
    }

    #[test]
    fn nearest_short_circuits_on_exact_match() {
        let mut index = x_axis_index();
        index.insert(Point::new("a", vec![2.0, 0.0])).unwrap();
        let b = index.insert(Point::new("b", vec![1.0, 0.0])).unwrap();

        let found = index
            .find_nearest(&Point::new("q", vec![1.0, 0.0]))
            .unwrap()
            .unwrap();
        assert_eq!(found, (b, 0.0));
    }

    #[test]
    fn empty_table_reports_no_neighbors() {
        let index = x_axis_index();
        let query = Point::new("q", vec![1.0, 0.0]);
        assert_eq!(index.find_all_neighbors(&query).unwrap(), NeighborSet::default());
        assert_eq!(index.find_nearest(&query).unwrap(), None);
    }
}
