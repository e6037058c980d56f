//! Ordered (x, y) sample curves and min-max normalization.
//!
//! A [`Curve`] is the validated input to knee detection: finite points,
//! x strictly increasing, at least three samples. Construction drops
//! non-finite rows and collapses duplicate x values before validating,
//! so detection itself never has to re-check its input.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// An ordered sequence of (x, y) samples with strictly increasing x.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    points: Vec<(f64, f64)>,
}

impl Curve {
    /// Build a curve from points already ordered by x.
    ///
    /// Non-finite rows are dropped and consecutive duplicate x values are
    /// collapsed (first occurrence wins). Fails with
    /// [`Error::NonMonotonicX`] if the remaining x values ever decrease,
    /// and with [`Error::TooFewPoints`] if fewer than three points survive.
    pub fn new(points: Vec<(f64, f64)>) -> Result<Self> {
        let mut kept: Vec<(f64, f64)> = Vec::with_capacity(points.len());
        for (i, &(x, y)) in points.iter().enumerate() {
            if !x.is_finite() || !y.is_finite() {
                continue;
            }
            if let Some(&(prev_x, _)) = kept.last() {
                if x == prev_x {
                    continue;
                }
                if x < prev_x {
                    return Err(Error::NonMonotonicX { index: i });
                }
            }
            kept.push((x, y));
        }

        if kept.len() < 3 {
            return Err(Error::TooFewPoints { found: kept.len() });
        }

        Ok(Self { points: kept })
    }

    /// Build a curve from unordered points, sorting by x first.
    pub fn from_unsorted(mut points: Vec<(f64, f64)>) -> Result<Self> {
        points.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        Self::new(points)
    }

    /// Build a curve over the 1..=n index domain from a plain value series.
    ///
    /// This is the form a single dataset column takes: the row number is
    /// the x axis.
    pub fn from_values(values: &[f64]) -> Result<Self> {
        let points = values
            .iter()
            .enumerate()
            .map(|(i, &y)| ((i + 1) as f64, y))
            .collect();
        Self::new(points)
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false: construction requires at least three points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The validated samples, ordered by x.
    #[must_use]
    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// X values as an owned series.
    #[must_use]
    pub fn xs(&self) -> Vec<f64> {
        self.points.iter().map(|&(x, _)| x).collect()
    }

    /// Y values as an owned series.
    #[must_use]
    pub fn ys(&self) -> Vec<f64> {
        self.points.iter().map(|&(_, y)| y).collect()
    }
}

/// Min-max scale a series to [0, 1].
///
/// A degenerate series (zero span) maps to all zeros rather than dividing
/// by zero; a flat curve then produces an empty candidate set downstream.
#[must_use]
pub(crate) fn minmax_normalize(values: &[f64]) -> Vec<f64> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in values {
        min = min.min(v);
        max = max.max(v);
    }
    let span = max - min;
    if !span.is_finite() || span < f64::EPSILON {
        return vec![0.0; values.len()];
    }
    values.iter().map(|&v| (v - min) / span).collect()
}
