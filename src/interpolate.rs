//! Smoothing policies for the difference curve.
//!
//! Noisy data creates spurious local maxima in the difference curve, which
//! read as false knees. [`InterpolationPolicy::Polynomial`] replaces the
//! observed y series with a least-squares polynomial fit evaluated at the
//! same x positions, trading a possible small shift of the true knee for
//! far fewer false positives. [`InterpolationPolicy::Raw`] uses the
//! observations as-is.

use serde::{Deserialize, Serialize};

use crate::curve::minmax_normalize;
use crate::error::{Error, Result};

/// Default degree for polynomial smoothing.
pub const DEFAULT_POLY_DEGREE: usize = 7;

/// How the y series fed into the difference curve is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum InterpolationPolicy {
    /// Use the observed samples directly.
    Raw,
    /// Replace y with a least-squares polynomial fit of the given degree,
    /// evaluated at the original x positions.
    Polynomial {
        /// Fit degree, >= 1. Clamped to n-1 for short series.
        degree: usize,
    },
}

impl Default for InterpolationPolicy {
    fn default() -> Self {
        Self::Raw
    }
}

impl InterpolationPolicy {
    /// Polynomial smoothing with the default degree of 7.
    #[must_use]
    pub fn polynomial() -> Self {
        Self::Polynomial {
            degree: DEFAULT_POLY_DEGREE,
        }
    }

    /// Whether this policy replaces the observed values.
    #[must_use]
    pub fn is_smoothing(&self) -> bool {
        !matches!(self, Self::Raw)
    }

    /// Validate the policy parameters.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Raw => Ok(()),
            Self::Polynomial { degree } => {
                if degree == 0 {
                    Err(Error::InvalidDegree(degree))
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Produce the y series the difference curve is built from.
    ///
    /// X is scaled to the unit interval before fitting so the Vandermonde
    /// sums stay well conditioned on wide domains.
    pub(crate) fn apply(&self, x: &[f64], y: &[f64]) -> Result<Vec<f64>> {
        self.validate()?;
        match *self {
            Self::Raw => Ok(y.to_vec()),
            Self::Polynomial { degree } => {
                let degree = degree.min(x.len().saturating_sub(1)).max(1);
                let xs = minmax_normalize(x);
                let coeffs = polyfit(&xs, y, degree)?;
                Ok(xs.iter().map(|&xi| eval_poly(&coeffs, xi)).collect())
            }
        }
    }
}

/// Least-squares polynomial fit via the normal equations.
///
/// Returns coefficients ordered lowest power first. Callers fitting over
/// wide x domains should rescale first; the detection path always fits on
/// unit-interval x.
pub fn polyfit(x: &[f64], y: &[f64], degree: usize) -> Result<Vec<f64>> {
    let n = x.len().min(y.len());
    let terms = degree + 1;
    if n < terms {
        return Err(Error::FitFailed(format!(
            "{n} points cannot determine a degree-{degree} polynomial"
        )));
    }

    // Normal equations: G c = b with G[j][k] = sum x^(j+k), b[j] = sum y x^j.
    let mut powers = vec![0.0; 2 * degree + 1];
    let mut b = vec![0.0; terms];
    for i in 0..n {
        let mut p = 1.0;
        for (j, slot) in powers.iter_mut().enumerate() {
            *slot += p;
            if j < 2 * degree {
                p *= x[i];
            }
        }
        let mut p = 1.0;
        for slot in b.iter_mut() {
            *slot += y[i] * p;
            p *= x[i];
        }
    }

    let mut g: Vec<Vec<f64>> = (0..terms)
        .map(|j| (0..terms).map(|k| powers[j + k]).collect())
        .collect();

    solve_symmetric(&mut g, &mut b)?;
    Ok(b)
}

/// Evaluate a polynomial with coefficients ordered lowest power first.
#[must_use]
pub fn eval_poly(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}

/// Gaussian elimination with partial pivoting, in place. `b` becomes the
/// solution vector.
fn solve_symmetric(a: &mut [Vec<f64>], b: &mut [f64]) -> Result<()> {
    let n = b.len();
    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&r1, &r2| {
                a[r1][col]
                    .abs()
                    .partial_cmp(&a[r2][col].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(col);
        if a[pivot_row][col].abs() < 1e-12 {
            return Err(Error::FitFailed("singular normal equations".to_string()));
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    for col in (0..n).rev() {
        let mut sum = b[col];
        for k in col + 1..n {
            sum -= a[col][k] * b[k];
        }
        b[col] = sum / a[col][col];
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polyfit_recovers_quadratic() {
        // y = 2x^2 - 3x + 1
        let x: Vec<f64> = (0..10).map(|i| i as f64 / 10.0).collect();
        let y: Vec<f64> = x.iter().map(|&v| 2.0 * v * v - 3.0 * v + 1.0).collect();

        let coeffs = polyfit(&x, &y, 2).unwrap();
        assert!((coeffs[0] - 1.0).abs() < 1e-8);
        assert!((coeffs[1] + 3.0).abs() < 1e-8);
        assert!((coeffs[2] - 2.0).abs() < 1e-8);
    }

    #[test]
    fn test_polyfit_underdetermined() {
        let err = polyfit(&[0.0, 1.0], &[1.0, 2.0], 3).unwrap_err();
        assert!(matches!(err, Error::FitFailed(_)));
    }

    #[test]
    fn test_eval_poly() {
        // 1 + 2x + 3x^2 at x = 2 -> 17
        assert_eq!(eval_poly(&[1.0, 2.0, 3.0], 2.0), 17.0);
    }

    #[test]
    fn test_raw_passthrough() {
        let y = [3.0, 1.0, 4.0];
        let out = InterpolationPolicy::Raw.apply(&[1.0, 2.0, 3.0], &y).unwrap();
        assert_eq!(out, y.to_vec());
    }

    #[test]
    fn test_polynomial_smooths_noise() {
        // Concave trend with a single noisy spike.
        let x: Vec<f64> = (1..=30).map(|i| i as f64).collect();
        let mut y: Vec<f64> = x.iter().map(|&v| v.sqrt()).collect();
        y[14] += 0.8;

        let smoothed = InterpolationPolicy::Polynomial { degree: 3 }
            .apply(&x, &y)
            .unwrap();
        // Fit pulls the spike back toward the trend.
        assert!((smoothed[14] - x[14].sqrt()).abs() < 0.4);
    }

    #[test]
    fn test_degree_clamped_for_short_series() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [1.0, 4.0, 9.0, 16.0];
        let out = InterpolationPolicy::Polynomial { degree: 7 }.apply(&x, &y);
        assert!(out.is_ok());
    }

    #[test]
    fn test_zero_degree_rejected() {
        let err = InterpolationPolicy::Polynomial { degree: 0 }
            .validate()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidDegree(0)));
    }
}
