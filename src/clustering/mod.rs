//! Exact partitional clustering: k-means with silhouette model selection.

mod kmeans;

pub use kmeans::{pick_best_k, BestK, Centroid, KMeansModel, Silhouette};
