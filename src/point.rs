//! Sentiment vector points.
//!
//! A [`Point`] is a string identifier plus a fixed-length coordinate vector
//! with a cached Euclidean norm. Points are immutable by convention; the only
//! mutators are the coordinate-wise accumulation helpers used when computing
//! cluster means, and both refresh the cached norm.

use crate::error::{EngineError, Result};
use crate::metric::Metric;

/// An identified vector with a cached Euclidean norm.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    id: String,
    coords: Vec<f32>,
    norm: f32,
}

impl Point {
    /// Create a point. The norm is computed once here.
    pub fn new(id: impl Into<String>, coords: Vec<f32>) -> Self {
        let norm = l2_norm(&coords);
        Self {
            id: id.into(),
            coords,
            norm,
        }
    }

    /// Parse a delimited line `<id><delim><coord>...`.
    ///
    /// The delimiter is a tab or a comma; exactly one of the two may appear
    /// in the line, every field after the identifier must be numeric, and
    /// carriage returns are rejected outright (Windows line endings from
    /// upstream exports).
    pub fn parse(line: &str) -> Result<Self> {
        if line.contains('\r') {
            return Err(EngineError::InvalidPoint(
                "carriage return in line".to_string(),
            ));
        }

        let delim = match (line.contains('\t'), line.contains(',')) {
            (true, false) => '\t',
            (false, true) => ',',
            _ => {
                return Err(EngineError::InvalidPoint(
                    "expected exactly one of tab or comma as delimiter".to_string(),
                ))
            }
        };

        let mut fields = line.trim_start().split(delim);
        let id = match fields.next() {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => return Err(EngineError::InvalidPoint("missing identifier".to_string())),
        };

        let mut coords = Vec::new();
        for field in fields {
            let value: f32 = field.trim().parse().map_err(|_| {
                EngineError::InvalidPoint(format!("non-numeric coordinate {field:?}"))
            })?;
            coords.push(value);
        }
        if coords.is_empty() {
            return Err(EngineError::InvalidPoint("no coordinates".to_string()));
        }

        Ok(Self::new(id, coords))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn coords(&self) -> &[f32] {
        &self.coords
    }

    pub fn dim(&self) -> usize {
        self.coords.len()
    }

    /// Cached Euclidean norm.
    pub fn norm(&self) -> f32 {
        self.norm
    }

    /// Dot product with another point, or 0.0 on dimension mismatch.
    #[must_use]
    pub fn dot(&self, other: &Point) -> f32 {
        self.dot_coords(&other.coords)
    }

    /// Dot product with a raw coordinate vector, or 0.0 on dimension mismatch.
    #[must_use]
    pub fn dot_coords(&self, other: &[f32]) -> f32 {
        if self.coords.len() != other.len() {
            return 0.0;
        }
        self.coords.iter().zip(other).map(|(a, b)| a * b).sum()
    }

    /// Euclidean distance to another point.
    ///
    /// Returns `f32::INFINITY` on dimension mismatch so a mismatched pair is
    /// never selected as a nearest neighbor.
    #[must_use]
    pub fn euclidean(&self, other: &Point) -> f32 {
        if self.coords.len() != other.coords.len() {
            return f32::INFINITY;
        }
        self.coords
            .iter()
            .zip(&other.coords)
            .map(|(a, b)| {
                let d = a - b;
                d * d
            })
            .sum::<f32>()
            .sqrt()
    }

    /// Coordinate-wise in-place addition; refreshes the cached norm.
    ///
    /// Ignores mismatched dimensions.
    pub fn add(&mut self, other: &Point) {
        if self.coords.len() != other.coords.len() {
            return;
        }
        for (a, b) in self.coords.iter_mut().zip(&other.coords) {
            *a += b;
        }
        self.norm = l2_norm(&self.coords);
    }

    /// In-place scalar division; refreshes the cached norm.
    ///
    /// Ignores a zero divisor.
    pub fn divide(&mut self, divisor: f32) {
        if divisor == 0.0 {
            return;
        }
        for a in &mut self.coords {
            *a /= divisor;
        }
        self.norm = l2_norm(&self.coords);
    }

    /// Exact coordinate-vector equality; identifiers are ignored.
    #[must_use]
    pub fn same_coords(&self, other: &Point) -> bool {
        self.coords == other.coords
    }

    /// Brute-force scan for the closest candidate under `metric`.
    ///
    /// Returns the candidate's position and its metric value. `None` when the
    /// candidate list is empty or any candidate's dimensionality differs from
    /// this point's.
    pub fn nearest<'p, I>(&self, candidates: I, metric: Metric) -> Option<(usize, f32)>
    where
        I: IntoIterator<Item = &'p Point>,
    {
        let mut best: Option<(usize, f32)> = None;
        for (i, candidate) in candidates.into_iter().enumerate() {
            if candidate.dim() != self.dim() {
                return None;
            }
            let value = metric.evaluate(self, candidate);
            match best {
                // Ties keep the lowest-index candidate.
                Some((_, b)) if b <= value => {}
                _ => best = Some((i, value)),
            }
        }
        best
    }
}

fn l2_norm(coords: &[f32]) -> f32 {
    coords.iter().map(|x| x * x).sum::<f32>().sqrt()
}
