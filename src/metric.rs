//! Distance and similarity metrics over points.
//!
//! Three named semantics are kept deliberately distinct. [`Metric::Euclidean`]
//! and [`Metric::CosineDistance`] are distances (smaller is closer);
//! [`Metric::CosineSimilarity`] is the raw cosine (larger is closer). The
//! engines in this crate always compare smaller-is-closer, so configuring
//! `CosineSimilarity` as an engine's metric inverts polarity and makes the
//! engine favor the *least* similar candidate. Call sites pick explicitly;
//! nothing here unifies the two senses.

use crate::point::Point;

/// Comparison metric for a pair of points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Metric {
    /// Euclidean (L2) distance, smaller is closer.
    Euclidean,
    /// Cosine distance $1 - \cos(p, q)$, smaller is closer.
    #[default]
    CosineDistance,
    /// Raw cosine similarity $\cos(p, q)$, larger is closer.
    CosineSimilarity,
}

impl Metric {
    /// Evaluate the metric for a pair of points.
    ///
    /// Returns `f32::INFINITY` on dimension mismatch so a mismatched pair is
    /// never selected as a nearest neighbor.
    #[inline]
    #[must_use]
    pub fn evaluate(self, a: &Point, b: &Point) -> f32 {
        if a.dim() != b.dim() {
            return f32::INFINITY;
        }
        match self {
            Metric::Euclidean => euclidean_distance(a, b),
            Metric::CosineDistance => cosine_distance(a, b),
            Metric::CosineSimilarity => cosine_similarity(a, b),
        }
    }
}

/// Euclidean (L2) distance, `f32::INFINITY` on dimension mismatch.
#[inline]
#[must_use]
pub fn euclidean_distance(a: &Point, b: &Point) -> f32 {
    a.euclidean(b)
}

/// Cosine distance $1 - \cos(a, b)$, `f32::INFINITY` on dimension mismatch.
///
/// Results within 1e-10 of zero collapse to exactly 0.0, so identical
/// directions compare equal despite float rounding.
#[inline]
#[must_use]
pub fn cosine_distance(a: &Point, b: &Point) -> f32 {
    if a.dim() != b.dim() {
        return f32::INFINITY;
    }
    let d = 1.0 - cosine_similarity(a, b);
    if d < 1e-10 {
        0.0
    } else {
        d
    }
}

/// Raw cosine similarity using the points' cached norms.
///
/// 0.0 when either norm is zero or the dimensions mismatch.
#[inline]
#[must_use]
pub fn cosine_similarity(a: &Point, b: &Point) -> f32 {
    let denom = a.norm() * b.norm();
    if denom == 0.0 {
        return 0.0;
    }
    a.dot(b) / denom
}
