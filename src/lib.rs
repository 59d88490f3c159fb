//! coinrec: similarity-search engines for coin recommendation.
//!
//! Recommends unseen cryptocurrency coins to social-media users by comparing
//! per-user sentiment vectors. Upstream plumbing (tweet tokenizing, sentiment
//! scoring, coin matching, file handling) produces plain
//! (identifier, vector) pairs; this crate supplies the two engines that
//! search over them:
//!
//! - [`lsh::LshIndex`]: approximate nearest-neighbor search via
//!   random-hyperplane locality-sensitive hashing.
//! - [`clustering::KMeansModel`]: exact partitional k-means clustering with
//!   silhouette-based model selection.
//!
//! Both engines are build-then-query: feed every point in, then issue
//! read-only lookups. Insertion and `run()` take `&mut self`, queries take
//! `&self`, so the borrow checker enforces the single-writer discipline and
//! concurrent reads of a built structure are safe.
//!
//! Comparisons treat smaller metric values as closer; see [`metric::Metric`]
//! for the cosine distance/similarity polarity caveat.
//!
//! Randomness (hyperplane generation, initial centroid selection) is
//! entropy-seeded by default; inject a seed for reproducible runs.

pub mod clustering;
pub mod error;
pub mod lsh;
pub mod metric;
pub mod point;

pub use clustering::{pick_best_k, BestK, Centroid, KMeansModel, Silhouette};
pub use error::{EngineError, Result};
pub use lsh::{LshIndex, LshParams, NeighborSet};
pub use metric::Metric;
pub use point::Point;
