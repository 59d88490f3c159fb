//! k-means clustering with centroid lifecycle management.
//!
//! Lloyd's iteration over a caller-owned point slice. Initial centroids are
//! aliases of real input points; once a cluster's mean moves away from its
//! centroid the model owns a synthetic mean point instead, and the displaced
//! real point rejoins its cluster as an ordinary member. A cluster that ends
//! an update pass with no members drops its centroid entirely, so the
//! effective number of clusters can fall below k.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::error::{EngineError, Result};
use crate::metric::Metric;
use crate::point::Point;

const DEFAULT_MAX_ITERATIONS: usize = 50;

/// A cluster's representative point.
///
/// `Alias` borrows a real input point by handle and is never freed by the
/// model; `Synthetic` is a coordinate-wise mean the model owns.
#[derive(Debug, Clone)]
pub enum Centroid {
    Alias(usize),
    Synthetic(Point),
}

struct Cluster {
    /// `None` once the cluster emptied and dropped its centroid.
    centroid: Option<Centroid>,
    /// Member handles. An alias centroid is held in `centroid`, not here;
    /// `occupants` merges the two views.
    members: Vec<usize>,
}

/// Silhouette scores for the current partition.
#[derive(Debug, Clone, PartialEq)]
pub struct Silhouette {
    /// Population average over every input point.
    pub overall: f32,
    /// Average per cluster, 0.0 for dead or empty clusters.
    pub per_cluster: Vec<f32>,
}

/// k-means over a borrowed point slice.
///
/// Cluster state is created and mutated only inside [`KMeansModel::run`];
/// every other method is a read-only query, so a built model can be shared
/// freely between readers.
pub struct KMeansModel<'a> {
    points: &'a [Point],
    metric: Metric,
    k: usize,
    max_iterations: usize,
    seed: Option<u64>,
    clusters: Vec<Cluster>,
    /// Transient cluster tag per point, `None` meaning unassigned. Lives in
    /// the model so the input points stay immutable.
    assignments: Vec<Option<usize>>,
}

impl<'a> KMeansModel<'a> {
    /// Create a model over `points` with `k` clusters.
    ///
    /// Rejects `k <= 1`, `k >= points.len()` and inconsistent dimensionality
    /// across the input as errors, never a process abort.
    pub fn new(points: &'a [Point], k: usize, metric: Metric) -> Result<Self> {
        if k <= 1 {
            return Err(EngineError::InvalidParameter(
                "k must be at least 2".to_string(),
            ));
        }
        if k >= points.len() {
            return Err(EngineError::InvalidParameter(format!(
                "k ({k}) must be smaller than the number of points ({})",
                points.len()
            )));
        }
        let dim = points[0].dim();
        for point in points {
            if point.dim() != dim {
                return Err(EngineError::DimensionMismatch {
                    point_dim: point.dim(),
                    expected_dim: dim,
                });
            }
        }

        Ok(Self {
            points,
            metric,
            k,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            seed: None,
            clusters: Vec::new(),
            assignments: vec![None; points.len()],
        })
    }

    /// Configure a deterministic seed for centroid initialization.
    ///
    /// When set, repeated `run()` calls on the same input produce identical
    /// partitions.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Override the iteration cap (default 50, minimum 1).
    #[must_use]
    pub fn with_max_iterations(mut self, cap: usize) -> Self {
        self.max_iterations = cap.max(1);
        self
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// Run the clustering loop and return the number of passes executed.
    ///
    /// Stops when an update pass makes zero centroid changes or the
    /// iteration cap is reached; a capped run is non-convergent but still
    /// usable. Repeated calls restart from fresh initial centroids.
    pub fn run(&mut self) -> usize {
        let seed = self.seed.unwrap_or_else(|| rand::rng().random());
        let mut rng = StdRng::seed_from_u64(seed);
        self.initialize(&mut rng);

        let mut iterations = 0;
        loop {
            self.reset();
            self.assign();
            let changes = self.update();
            iterations += 1;
            if changes == 0 || iterations >= self.max_iterations {
                return iterations;
            }
        }
    }

    /// Shuffle the handles and alias the first k as initial centroids.
    fn initialize(&mut self, rng: &mut StdRng) {
        let mut handles: Vec<usize> = (0..self.points.len()).collect();
        handles.shuffle(rng);

        self.assignments = vec![None; self.points.len()];
        self.clusters = Vec::with_capacity(self.k);
        for (cluster_idx, &handle) in handles[..self.k].iter().enumerate() {
            self.assignments[handle] = Some(cluster_idx);
            self.clusters.push(Cluster {
                centroid: Some(Centroid::Alias(handle)),
                members: Vec::new(),
            });
        }
    }

    /// Clear member lists and unassign every point that is not a live alias
    /// centroid.
    fn reset(&mut self) {
        for tag in &mut self.assignments {
            *tag = None;
        }
        for (cluster_idx, cluster) in self.clusters.iter_mut().enumerate() {
            cluster.members.clear();
            if let Some(Centroid::Alias(handle)) = cluster.centroid {
                self.assignments[handle] = Some(cluster_idx);
            }
        }
    }

    /// Assign every unassigned point to the strictly-closest live centroid.
    fn assign(&mut self) {
        for handle in 0..self.points.len() {
            if self.assignments[handle].is_some() {
                continue;
            }

            let point = &self.points[handle];
            let mut best: Option<(usize, f32)> = None;
            for (cluster_idx, cluster) in self.clusters.iter().enumerate() {
                let Some(centroid) = &cluster.centroid else {
                    continue;
                };
                let value = self.metric.evaluate(point, self.centroid_point(centroid));
                match best {
                    // Ties keep the lowest-index centroid.
                    Some((_, b)) if b <= value => {}
                    _ => best = Some((cluster_idx, value)),
                }
            }

            if let Some((cluster_idx, _)) = best {
                self.assignments[handle] = Some(cluster_idx);
                self.clusters[cluster_idx].members.push(handle);
            }
        }
    }

    /// Recompute each live cluster's centroid as its members' mean.
    ///
    /// Returns the number of centroid changes made this pass.
    fn update(&mut self) -> usize {
        let dim = self.points[0].dim();
        let mut changes = 0;

        for cluster_idx in 0..self.clusters.len() {
            let Some(current) = self.clusters[cluster_idx].centroid.take() else {
                continue;
            };

            if self.clusters[cluster_idx].members.is_empty() {
                // Emptied cluster: the centroid stays dropped and the
                // effective number of clusters shrinks below k. Dropping an
                // alias orphans a real input point, so it counts as a change
                // and the next pass reassigns that point to a live cluster;
                // a dropped synthetic frees nothing.
                if matches!(current, Centroid::Alias(_)) {
                    changes += 1;
                }
                continue;
            }

            let mut mean = Point::new(String::new(), vec![0.0; dim]);
            for &handle in &self.clusters[cluster_idx].members {
                mean.add(&self.points[handle]);
            }
            mean.divide(self.clusters[cluster_idx].members.len() as f32);

            if mean.same_coords(self.centroid_point(&current)) {
                self.clusters[cluster_idx].centroid = Some(current);
                continue;
            }

            if let Centroid::Alias(handle) = current {
                // The displaced real point rejoins its cluster as an
                // ordinary member for the next pass.
                self.clusters[cluster_idx].members.push(handle);
            }
            self.clusters[cluster_idx].centroid = Some(Centroid::Synthetic(mean));
            changes += 1;
        }

        changes
    }

    fn centroid_point<'c>(&'c self, centroid: &'c Centroid) -> &'c Point {
        match centroid {
            Centroid::Alias(handle) => &self.points[*handle],
            Centroid::Synthetic(point) => point,
        }
    }

    /// Member handles plus the alias centroid: every input point the cluster
    /// currently holds.
    fn occupants(&self, cluster_idx: usize) -> Vec<usize> {
        let cluster = &self.clusters[cluster_idx];
        let mut occupants = Vec::with_capacity(cluster.members.len() + 1);
        if let Some(Centroid::Alias(handle)) = cluster.centroid {
            occupants.push(handle);
        }
        occupants.extend_from_slice(&cluster.members);
        occupants
    }

    /// Per-cluster and overall silhouette scores for the current partition.
    ///
    /// `a(p)` is the mean distance to the other occupants of p's cluster,
    /// `b(p)` the mean distance to the occupants of the nearest other live
    /// cluster, and `s(p) = (b - a) / max(a, b)`, defined as 0 when
    /// `max(a, b)` is 0 or no other live cluster exists. Every average over
    /// a possibly-empty set is guarded to zero.
    pub fn silhouette(&self) -> Silhouette {
        let occupants: Vec<Vec<usize>> =
            (0..self.clusters.len()).map(|i| self.occupants(i)).collect();

        let mut per_cluster = vec![0.0f32; self.clusters.len()];
        let mut total = 0.0f32;

        for (cluster_idx, cluster_occupants) in occupants.iter().enumerate() {
            let mut sum = 0.0f32;
            for &handle in cluster_occupants {
                let s = self.silhouette_of(handle, cluster_idx, &occupants);
                sum += s;
                total += s;
            }
            if !cluster_occupants.is_empty() {
                per_cluster[cluster_idx] = sum / cluster_occupants.len() as f32;
            }
        }

        let overall = if self.points.is_empty() {
            0.0
        } else {
            total / self.points.len() as f32
        };
        Silhouette {
            overall,
            per_cluster,
        }
    }

    fn silhouette_of(&self, handle: usize, cluster_idx: usize, occupants: &[Vec<usize>]) -> f32 {
        let point = &self.points[handle];

        // a: mean distance to the other occupants of the point's own cluster.
        let own = &occupants[cluster_idx];
        let mut sum = 0.0f32;
        for &other in own {
            if other != handle {
                sum += self.metric.evaluate(point, &self.points[other]);
            }
        }
        let a = if own.len() > 1 {
            sum / (own.len() - 1) as f32
        } else {
            0.0
        };

        // b: mean distance to the occupants of the nearest other live
        // cluster, found by nearest-centroid search excluding our own.
        let (other_indices, other_centroids): (Vec<usize>, Vec<&Point>) = self
            .clusters
            .iter()
            .enumerate()
            .filter(|&(other_idx, _)| other_idx != cluster_idx)
            .filter_map(|(other_idx, cluster)| {
                let centroid = cluster.centroid.as_ref()?;
                Some((other_idx, self.centroid_point(centroid)))
            })
            .unzip();
        let Some((pos, _)) = point.nearest(other_centroids, self.metric) else {
            // Single live cluster: no "other" term exists.
            return 0.0;
        };

        let others = &occupants[other_indices[pos]];
        let mut sum = 0.0f32;
        for &other in others {
            sum += self.metric.evaluate(point, &self.points[other]);
        }
        let b = if others.is_empty() {
            0.0
        } else {
            sum / others.len() as f32
        };

        let max = a.max(b);
        if max == 0.0 {
            0.0
        } else {
            (b - a) / max
        }
    }

    /// Number of input points each cluster currently holds.
    pub fn cluster_sizes(&self) -> Vec<usize> {
        (0..self.clusters.len())
            .map(|i| self.occupants(i).len())
            .collect()
    }

    /// Identifier lists per cluster, for external aggregation such as
    /// building a cluster-level sentiment vector from member vectors.
    pub fn members_per_cluster(&self) -> Vec<Vec<String>> {
        (0..self.clusters.len())
            .map(|i| {
                self.occupants(i)
                    .iter()
                    .map(|&handle| self.points[handle].id().to_string())
                    .collect()
            })
            .collect()
    }

    /// Current centroids in cluster order; `None` marks a cluster that
    /// emptied and dropped its centroid.
    pub fn centroids(&self) -> impl Iterator<Item = Option<&Centroid>> {
        self.clusters.iter().map(|c| c.centroid.as_ref())
    }
}

/// Winning candidate from [`pick_best_k`].
#[derive(Debug, Clone, PartialEq)]
pub struct BestK {
    pub k: usize,
    /// Overall average silhouette of the winning run.
    pub silhouette: f32,
    /// Passes the winning run took.
    pub iterations: usize,
}

/// Run a seeded model per candidate k and keep the one with the highest
/// overall silhouette.
///
/// Candidates that fail construction (`k <= 1`, `k >= points.len()`,
/// inconsistent dimensions) are skipped; `None` when no candidate survives.
pub fn pick_best_k(
    points: &[Point],
    candidates: &[usize],
    metric: Metric,
    seed: u64,
) -> Option<BestK> {
    let mut best: Option<BestK> = None;
    for &k in candidates {
        let mut model = match KMeansModel::new(points, k, metric) {
            Ok(model) => model.with_seed(seed),
            Err(_) => continue,
        };
        let iterations = model.run();
        let score = model.silhouette().overall;
        match &best {
            Some(b) if b.silhouette >= score => {}
            _ => {
                best = Some(BestK {
                    k,
                    silhouette: score,
                    iterations,
                })
            }
        }
    }
    best
}
