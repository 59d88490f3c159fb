//! Single-table hyperplane hash: signature computation and bucket storage.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::StandardNormal;

use crate::metric::Metric;
use crate::point::Point;

/// Hits from one table's bucket scan.
#[derive(Debug, Default)]
pub(crate) struct TableHits {
    /// (arena handle, metric value) pairs for every surviving bucket member.
    pub hits: Vec<(usize, f32)>,
    /// Position in `hits` of the minimum value, when any hit exists.
    pub nearest: Option<usize>,
}

/// One hyperplane hash table over handles into the index's point arena.
///
/// Buckets are insert-only; the table is read-only once built.
pub(crate) struct HyperplaneTable {
    /// k vectors of the index dimensionality, drawn once at construction.
    hyperplanes: Vec<Vec<f32>>,
    /// Bucket key (the signature's integer value) to member handles.
    buckets: HashMap<u64, Vec<usize>>,
}

impl HyperplaneTable {
    /// Draw `k` fresh hyperplanes from N(0, 1) using the caller's RNG.
    pub(crate) fn new(k: usize, dimension: usize, rng: &mut StdRng) -> Self {
        let hyperplanes = (0..k)
            .map(|_| (0..dimension).map(|_| rng.sample(StandardNormal)).collect())
            .collect();
        Self {
            hyperplanes,
            buckets: HashMap::new(),
        }
    }

    /// Build a table around fixed hyperplanes, for deterministic geometry.
    #[cfg(test)]
    pub(crate) fn with_hyperplanes(hyperplanes: Vec<Vec<f32>>) -> Self {
        Self {
            hyperplanes,
            buckets: HashMap::new(),
        }
    }

    /// k-bit signature: bit i is set iff `dot(point, hyperplane_i) >= 0`.
    ///
    /// The signature's integer value (bit i contributes 2^i) doubles as the
    /// bucket key; the mapping is a bijection for fixed k, so equal keys
    /// imply equal signatures.
    pub(crate) fn signature(&self, point: &Point) -> u64 {
        let mut sig = 0u64;
        for (i, hyperplane) in self.hyperplanes.iter().enumerate() {
            if point.dot_coords(hyperplane) >= 0.0 {
                sig |= 1u64 << i;
            }
        }
        sig
    }

    /// Append the handle to its signature's bucket.
    pub(crate) fn insert(&mut self, handle: usize, point: &Point) {
        let key = self.signature(point);
        self.buckets.entry(key).or_default().push(handle);
    }

    /// Scan the query's bucket, reporting every member and the closest one.
    ///
    /// A missing bucket is an empty result, not a failure.
    pub(crate) fn search(&self, query: &Point, points: &[Point], metric: Metric) -> TableHits {
        self.search_within(query, points, metric, f32::INFINITY)
    }

    /// Bucket scan keeping only members strictly within `radius`.
    pub(crate) fn search_within(
        &self,
        query: &Point,
        points: &[Point],
        metric: Metric,
        radius: f32,
    ) -> TableHits {
        let mut out = TableHits::default();
        let Some(bucket) = self.buckets.get(&self.signature(query)) else {
            return out;
        };

        for &handle in bucket {
            let value = metric.evaluate(query, &points[handle]);
            if value < radius {
                out.hits.push((handle, value));
                match out.nearest {
                    // Ties keep the first member encountered.
                    Some(n) if out.hits[n].1 <= value => {}
                    _ => out.nearest = Some(out.hits.len() - 1),
                }
            }
        }
        out
    }
}
