//! Kneedle knee-point detection.
//!
//! Implements the Kneedle algorithm (Satopaa et al., "Finding a 'Kneedle'
//! in a Haystack"): min-max normalize the curve, rotate it into the
//! concave-increasing frame using the declared shape, and scan the signed
//! deviation from the chord diagonal for the local maximum whose prominence
//! survives a sensitivity-scaled threshold.
//!
//! The entire pass is a pure function of its inputs: no I/O, no logging,
//! no shared state, deterministic for identical inputs. Callers that want
//! request-level concurrency can invoke it freely from multiple threads.

pub mod shape;

use serde::{Deserialize, Serialize};

pub use shape::{Concavity, Direction};

use crate::curve::{Curve, minmax_normalize};
use crate::error::{Error, Result};
use crate::interpolate::InterpolationPolicy;

/// Difference-curve magnitudes below this are rounding noise, not signal.
/// Both series are normalized to [0, 1] before subtraction, so an absolute
/// floor is safe.
const DIFF_NOISE_FLOOR: f64 = 1e-12;

/// Validated detection parameters.
///
/// Shape priors orient the difference curve; sensitivity scales the
/// per-candidate confirmation threshold (0 = most aggressive, larger =
/// more conservative); the interpolation policy optionally smooths the
/// y series first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KneeParams {
    /// Which way the curve bows.
    pub concavity: Concavity,
    /// Whether the curve rises or falls.
    pub direction: Direction,
    /// Sensitivity S >= 0.
    pub sensitivity: f64,
    /// Smoothing policy for the difference curve.
    pub interpolation: InterpolationPolicy,
}

impl KneeParams {
    /// Build parameters, validating sensitivity and interpolation up front.
    pub fn new(
        concavity: Concavity,
        direction: Direction,
        sensitivity: f64,
        interpolation: InterpolationPolicy,
    ) -> Result<Self> {
        let params = Self {
            concavity,
            direction,
            sensitivity,
            interpolation,
        };
        params.validate()?;
        Ok(params)
    }

    /// Build parameters with both shape priors inferred from the curve.
    pub fn with_detected_shape(
        curve: &Curve,
        sensitivity: f64,
        interpolation: InterpolationPolicy,
    ) -> Result<Self> {
        let x = curve.xs();
        let y = curve.ys();
        Self::new(
            Concavity::detect(&y),
            Direction::detect(&x, &y),
            sensitivity,
            interpolation,
        )
    }

    /// Re-check invariants. Fields are public, so detection validates again
    /// at the boundary.
    pub fn validate(&self) -> Result<()> {
        if !self.sensitivity.is_finite() || self.sensitivity < 0.0 {
            return Err(Error::InvalidSensitivity(self.sensitivity));
        }
        self.interpolation.validate()
    }
}

/// A detected knee, mapped back to the original samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Knee {
    /// Index of the knee in the validated curve.
    pub index: usize,
    /// X coordinate of the knee sample.
    pub x: f64,
    /// Observed y at the knee. Always one of the original samples.
    pub y: f64,
    /// Fitted y at the knee when a smoothing policy was active.
    pub fitted_y: Option<f64>,
}

/// Locate the point of maximum curvature of `curve`.
///
/// Returns `Ok(None)` when no candidate survives the sensitivity
/// threshold — a straight line, a flat series, or a sensitivity high
/// enough that the difference curve never falls below any candidate's
/// threshold.
pub fn locate(curve: &Curve, params: &KneeParams) -> Result<Option<Knee>> {
    params.validate()?;

    let x = curve.xs();
    let y = curve.ys();
    let n = x.len();

    let fitted = params.interpolation.apply(&x, &y)?;
    let x_norm = minmax_normalize(&x);
    let y_norm = minmax_normalize(&fitted);
    let y_frame = to_concave_increasing(&y_norm, params.direction, params.concavity);

    // Signed deviation from the chord diagonal. The reflected frames
    // introduce ulp-level rounding against x_norm, which at S = 0 would
    // arm candidates on a perfectly straight line; deviations below the
    // noise floor snap to exactly zero so they never become candidates.
    let diff: Vec<f64> = y_frame
        .iter()
        .zip(&x_norm)
        .map(|(yi, xi)| {
            let d = yi - xi;
            if d.abs() < DIFF_NOISE_FLOOR { 0.0 } else { d }
        })
        .collect();

    let maxima = local_maxima(&diff);
    if maxima.is_empty() {
        return Ok(None);
    }
    let minima = local_minima(&diff);

    // Mean spacing of normalized x; one "unit" of threshold decay per S.
    let mean_step: f64 = x_norm
        .windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .sum::<f64>()
        / (n - 1) as f64;

    let thresholds: Vec<f64> = maxima
        .iter()
        .map(|&i| diff[i] - params.sensitivity * mean_step)
        .collect();

    // Scan forward from the first candidate. Each candidate arms its
    // threshold; a later local minimum re-arms at zero; the armed candidate
    // is confirmed the moment the difference curve drops below the
    // threshold. Reaching the end of the curve without a breach means no
    // knee.
    let mut threshold = 0.0;
    let mut threshold_index = maxima[0];
    let mut max_cursor = 0usize;
    let mut min_cursor = 0usize;

    for i in maxima[0]..n - 1 {
        if max_cursor < maxima.len() && maxima[max_cursor] == i {
            threshold = thresholds[max_cursor];
            threshold_index = i;
            max_cursor += 1;
        }
        while min_cursor < minima.len() && minima[min_cursor] <= i {
            if minima[min_cursor] == i {
                threshold = 0.0;
            }
            min_cursor += 1;
        }
        if diff[i + 1] < threshold {
            let index = frame_index(threshold_index, n, params.direction, params.concavity);
            return Ok(Some(Knee {
                index,
                x: x[index],
                y: y[index],
                fitted_y: params.interpolation.is_smoothing().then(|| fitted[index]),
            }));
        }
    }

    Ok(None)
}

/// Transform the normalized y series into the concave-increasing frame.
///
/// Decreasing concave curves are reversed; convex curves are reflected
/// about their maximum (and reversed when increasing), so every shape
/// presents its knee as a local maximum of the difference curve.
fn to_concave_increasing(y: &[f64], direction: Direction, concavity: Concavity) -> Vec<f64> {
    let max = y.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    match (direction, concavity) {
        (Direction::Increasing, Concavity::Concave) => y.to_vec(),
        (Direction::Increasing, Concavity::Convex) => {
            y.iter().rev().map(|v| max - v).collect()
        }
        (Direction::Decreasing, Concavity::Concave) => y.iter().rev().copied().collect(),
        (Direction::Decreasing, Concavity::Convex) => y.iter().map(|v| max - v).collect(),
    }
}

/// Map an index in the concave-increasing frame back to the original
/// orientation. Reversed frames mirror the index.
fn frame_index(i: usize, n: usize, direction: Direction, concavity: Concavity) -> usize {
    match (direction, concavity) {
        (Direction::Increasing, Concavity::Convex)
        | (Direction::Decreasing, Concavity::Concave) => n - 1 - i,
        _ => i,
    }
}

/// Interior local maxima of a series. Plateaus resolve to their earliest
/// index (strict rise on the left, non-strict on the right), so tied
/// maxima prefer the first occurrence and a flat series has no candidates.
fn local_maxima(d: &[f64]) -> Vec<usize> {
    (1..d.len().saturating_sub(1))
        .filter(|&i| d[i] > d[i - 1] && d[i] >= d[i + 1])
        .collect()
}

/// Interior local minima, mirrored convention of [`local_maxima`].
fn local_minima(d: &[f64]) -> Vec<usize> {
    (1..d.len().saturating_sub(1))
        .filter(|&i| d[i] < d[i - 1] && d[i] <= d[i + 1])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpolate::InterpolationPolicy;

    fn params(
        concavity: Concavity,
        direction: Direction,
        sensitivity: f64,
    ) -> KneeParams {
        KneeParams::new(concavity, direction, sensitivity, InterpolationPolicy::Raw).unwrap()
    }

    fn sqrt_curve(n: usize) -> Curve {
        let points: Vec<(f64, f64)> = (0..n)
            .map(|i| {
                let x = i as f64 / (n - 1) as f64;
                (x, x.sqrt())
            })
            .collect();
        Curve::new(points).unwrap()
    }

    #[test]
    fn test_straight_line_has_no_knee() {
        let points: Vec<(f64, f64)> = (0..50).map(|i| (i as f64, 2.0 * i as f64 + 1.0)).collect();
        let curve = Curve::new(points).unwrap();

        for concavity in [Concavity::Concave, Concavity::Convex] {
            for direction in [Direction::Increasing, Direction::Decreasing] {
                for s in [0.0, 1.0, 5.0] {
                    let knee = locate(&curve, &params(concavity, direction, s)).unwrap();
                    assert!(knee.is_none(), "{concavity} {direction} S={s}");
                }
            }
        }
    }

    #[test]
    fn test_reflected_frames_ignore_rounding_noise() {
        // The max-minus-y reflection leaves ulp-level residue against the
        // normalized diagonal; at S = 0 that residue must not surface as
        // candidates on an exactly linear series.
        let rising: Vec<(f64, f64)> =
            (0..50).map(|i| (i as f64, 2.0 * i as f64 + 1.0)).collect();
        let falling: Vec<(f64, f64)> =
            (0..50).map(|i| (i as f64, -3.0 * i as f64 + 7.0)).collect();

        let knee = locate(
            &Curve::new(rising).unwrap(),
            &params(Concavity::Convex, Direction::Increasing, 0.0),
        )
        .unwrap();
        assert!(knee.is_none());

        let knee = locate(
            &Curve::new(falling).unwrap(),
            &params(Concavity::Concave, Direction::Decreasing, 0.0),
        )
        .unwrap();
        assert!(knee.is_none());
    }

    #[test]
    fn test_flat_series_has_no_knee() {
        let curve = Curve::from_values(&[4.0; 20]).unwrap();
        let knee = locate(
            &curve,
            &params(Concavity::Concave, Direction::Increasing, 1.0),
        )
        .unwrap();
        assert!(knee.is_none());
    }

    #[test]
    fn test_sqrt_knee_near_difference_maximum() {
        // d(x) = sqrt(x) - x peaks at x = 0.25.
        let curve = sqrt_curve(101);
        let spacing = 0.01;
        let knee = locate(
            &curve,
            &params(Concavity::Concave, Direction::Increasing, 1.0),
        )
        .unwrap()
        .expect("knee expected");
        assert!(
            (knee.x - 0.25).abs() <= spacing + 1e-12,
            "knee at {}",
            knee.x
        );
        assert_eq!(knee.y, knee.x.sqrt());
        assert!(knee.fitted_y.is_none());
    }

    #[test]
    fn test_discrete_upturn_example() {
        // Sharp upturn between x=4 and x=5; low sensitivity flags x=4.
        let points = vec![
            (0.0, 1.0),
            (1.0, 2.0),
            (2.0, 3.0),
            (3.0, 4.0),
            (4.0, 5.0),
            (5.0, 10.0),
        ];
        let curve = Curve::new(points).unwrap();
        let knee = locate(
            &curve,
            &params(Concavity::Convex, Direction::Increasing, 1.0),
        )
        .unwrap()
        .expect("knee expected");
        assert_eq!(knee.x, 4.0);
        assert_eq!(knee.y, 5.0);
    }

    #[test]
    fn test_determinism() {
        let curve = sqrt_curve(57);
        let p = params(Concavity::Concave, Direction::Increasing, 1.0);
        let first = locate(&curve, &p).unwrap();
        let second = locate(&curve, &p).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_sensitivity_monotone_conservative() {
        let points = vec![
            (0.0, 1.0),
            (1.0, 2.0),
            (2.0, 3.0),
            (3.0, 4.0),
            (4.0, 5.0),
            (5.0, 10.0),
        ];
        let curve = Curve::new(points).unwrap();

        let mut last_x: Option<f64> = None;
        let mut seen_none = false;
        for s in [0.0, 0.5, 1.0, 2.0, 4.0, 8.0] {
            let knee = locate(
                &curve,
                &params(Concavity::Convex, Direction::Increasing, s),
            )
            .unwrap();
            match knee {
                Some(k) => {
                    assert!(!seen_none, "knee reappeared after none at S={s}");
                    if let Some(prev) = last_x {
                        assert!(k.x >= prev, "knee moved earlier at S={s}");
                    }
                    last_x = Some(k.x);
                }
                None => seen_none = true,
            }
        }
    }

    #[test]
    fn test_shape_symmetry_under_vertical_reflection() {
        // Reflecting a concave-increasing curve vertically gives a
        // convex-decreasing curve with the knee at the same x.
        let n = 81;
        let original = sqrt_curve(n);
        let reflected = Curve::new(
            original
                .points()
                .iter()
                .map(|&(x, y)| (x, -y))
                .collect(),
        )
        .unwrap();

        let a = locate(
            &original,
            &params(Concavity::Concave, Direction::Increasing, 1.0),
        )
        .unwrap()
        .expect("knee expected");
        let b = locate(
            &reflected,
            &params(Concavity::Convex, Direction::Decreasing, 1.0),
        )
        .unwrap()
        .expect("knee expected");
        assert_eq!(a.x, b.x);
    }

    #[test]
    fn test_high_sensitivity_yields_none() {
        let curve = sqrt_curve(20);
        let knee = locate(
            &curve,
            &params(Concavity::Concave, Direction::Increasing, 200.0),
        )
        .unwrap();
        assert!(knee.is_none());
    }

    #[test]
    fn test_negative_sensitivity_rejected() {
        let err = KneeParams::new(
            Concavity::Concave,
            Direction::Increasing,
            -0.5,
            InterpolationPolicy::Raw,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidSensitivity(_)));
    }

    #[test]
    fn test_smoothed_curve_reports_fitted_y() {
        let n = 61;
        let mut points: Vec<(f64, f64)> = (0..n)
            .map(|i| {
                let x = i as f64 / (n - 1) as f64;
                (x, x.sqrt())
            })
            .collect();
        // Small alternating noise.
        for (i, p) in points.iter_mut().enumerate() {
            p.1 += if i % 2 == 0 { 0.01 } else { -0.01 };
        }
        let curve = Curve::new(points).unwrap();

        let p = KneeParams::new(
            Concavity::Concave,
            Direction::Increasing,
            1.0,
            InterpolationPolicy::Polynomial { degree: 3 },
        )
        .unwrap();
        let knee = locate(&curve, &p).unwrap().expect("knee expected");
        let fitted = knee.fitted_y.expect("smoothing reports fitted y");
        // Original pair preserved, fitted ordinate close to the trend.
        assert_eq!(knee.y, curve.points()[knee.index].1);
        assert!((fitted - knee.x.sqrt()).abs() < 0.1);
    }

    #[test]
    fn test_with_detected_shape_matches_explicit() {
        let curve = sqrt_curve(50);
        let auto =
            KneeParams::with_detected_shape(&curve, 1.0, InterpolationPolicy::Raw).unwrap();
        assert_eq!(auto.concavity, Concavity::Concave);
        assert_eq!(auto.direction, Direction::Increasing);
    }

    #[test]
    fn test_decreasing_concave_frame() {
        // Mirror of sqrt about the y axis: concave decreasing.
        let n = 101;
        let points: Vec<(f64, f64)> = (0..n)
            .map(|i| {
                let x = i as f64 / (n - 1) as f64;
                (x, (1.0 - x).sqrt())
            })
            .collect();
        let curve = Curve::new(points).unwrap();
        let knee = locate(
            &curve,
            &params(Concavity::Concave, Direction::Decreasing, 1.0),
        )
        .unwrap()
        .expect("knee expected");
        // Knee mirrors to x = 0.75 on the uniform grid.
        assert!((knee.x - 0.75).abs() <= 0.01 + 1e-12, "knee at {}", knee.x);
    }
}
