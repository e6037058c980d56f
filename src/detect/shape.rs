//! Curve shape priors and auto-detection heuristics.
//!
//! The detector needs to know which way the curve bows ([`Concavity`]) and
//! whether it rises or falls ([`Direction`]) to orient the difference
//! curve. Both can be declared up front or inferred from the data: concavity
//! from the mean second difference, direction from the sign of the
//! least-squares regression slope.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which way the curve bows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Concavity {
    /// Bows upward; levels off as x grows (e.g. `y = sqrt(x)`).
    Concave,
    /// Bows downward; steepens as x grows (e.g. `y = x^2`).
    Convex,
}

impl Concavity {
    /// Infer concavity from the mean acceleration of the series.
    ///
    /// Negative mean second difference reads as concave. Series too short
    /// to have a second difference read as convex.
    #[must_use]
    pub fn detect(y: &[f64]) -> Self {
        if y.len() < 3 {
            return Self::Convex;
        }
        let mut sum = 0.0;
        let mut count = 0usize;
        for w in y.windows(3) {
            let accel = (w[2] - w[1]) - (w[1] - w[0]);
            if accel.is_finite() {
                sum += accel;
                count += 1;
            }
        }
        if count > 0 && sum / (count as f64) < 0.0 {
            Self::Concave
        } else {
            Self::Convex
        }
    }
}

impl fmt::Display for Concavity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Concave => write!(f, "concave"),
            Self::Convex => write!(f, "convex"),
        }
    }
}

/// Whether the curve rises or falls over its domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Y grows with x.
    Increasing,
    /// Y shrinks with x.
    Decreasing,
}

impl Direction {
    /// Infer direction from the least-squares regression slope of y on x.
    #[must_use]
    pub fn detect(x: &[f64], y: &[f64]) -> Self {
        if regression_slope(x, y) > 0.0 {
            Self::Increasing
        } else {
            Self::Decreasing
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Increasing => write!(f, "increasing"),
            Self::Decreasing => write!(f, "decreasing"),
        }
    }
}

/// Ordinary least-squares slope of y on x. Returns 0 for degenerate input.
#[must_use]
pub(crate) fn regression_slope(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n < 2 {
        return 0.0;
    }
    let nf = n as f64;
    let sum_x: f64 = x[..n].iter().sum();
    let sum_y: f64 = y[..n].iter().sum();
    let sum_xy: f64 = x[..n].iter().zip(&y[..n]).map(|(a, b)| a * b).sum();
    let sum_x2: f64 = x[..n].iter().map(|a| a * a).sum();

    let denom = nf * sum_x2 - sum_x * sum_x;
    if denom.abs() < 1e-12 {
        return 0.0;
    }
    (nf * sum_xy - sum_x * sum_y) / denom
}
