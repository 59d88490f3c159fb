//! Random-hyperplane LSH for approximate nearest-neighbor search.
//!
//! Each table draws k hyperplanes from N(0, 1) and hashes a point to the
//! k-bit signature of its dot-product signs; a point lands in the bucket
//! keyed by the signature's integer value, so two points share a bucket iff
//! they share a signature. An index owns L such tables with independently
//! drawn hyperplanes: more tables cost L× storage and query work but shrink
//! the chance that one unlucky partition hides a true near neighbor.
//!
//! # References
//!
//! - Charikar (2002): "Similarity estimation techniques from rounding
//!   algorithms"
//! - Indyk & Motwani (1998): "Approximate nearest neighbors: towards removing
//!   the curse of dimensionality"

mod index;
mod table;

pub use index::{LshIndex, LshParams, NeighborSet};
