//! Detection result records and delimited export.
//!
//! [`KneeReport`] is the downloadable one-row summary of a detection run
//! (knee coordinate, shape priors, sensitivity, timestamp). [`annotate_csv`]
//! writes the original series back out with an `is_knee` flag per row so
//! the detected point survives alongside the data it was found in.

use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::curve::Curve;
use crate::detect::{Concavity, Direction, Knee, KneeParams};
use crate::error::Result;

/// One-row summary of a detection run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KneeReport {
    /// Column the curve came from.
    pub column: String,
    /// X coordinate of the knee.
    pub knee_x: f64,
    /// Observed y at the knee.
    pub knee_y: f64,
    /// Shape prior used for detection.
    pub curve_type: Concavity,
    /// Direction prior used for detection.
    pub direction: Direction,
    /// Sensitivity used for detection.
    pub sensitivity: f64,
    /// ISO 8601 timestamp of the run.
    pub computed_at: String,
}

impl KneeReport {
    /// Build a report for a detected knee, stamped with the current time.
    #[must_use]
    pub fn new(column: impl Into<String>, knee: &Knee, params: &KneeParams) -> Self {
        Self {
            column: column.into(),
            knee_x: knee.x,
            knee_y: knee.y,
            curve_type: params.concavity,
            direction: params.direction,
            sensitivity: params.sensitivity,
            computed_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }

    /// Write this report as a one-row CSV file with a header.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.serialize(self)?;
        writer.flush()?;
        Ok(())
    }

    /// Pretty-printed JSON rendering.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Write several per-column reports into one CSV file.
pub fn write_reports_csv(reports: &[KneeReport], path: impl AsRef<Path>) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for report in reports {
        writer.serialize(report)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the curve samples with an `is_knee` flag per row.
pub fn annotate_csv(
    curve: &Curve,
    knee_index: Option<usize>,
    path: impl AsRef<Path>,
) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["x", "y", "is_knee"])?;
    for (i, &(x, y)) in curve.points().iter().enumerate() {
        writer.write_record([
            x.to_string(),
            y.to_string(),
            (Some(i) == knee_index).to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpolate::InterpolationPolicy;

    fn sample_report() -> KneeReport {
        let knee = Knee {
            index: 3,
            x: 4.0,
            y: 5.0,
            fitted_y: None,
        };
        let params = KneeParams::new(
            Concavity::Convex,
            Direction::Increasing,
            1.0,
            InterpolationPolicy::Raw,
        )
        .unwrap();
        KneeReport::new("value", &knee, &params)
    }

    #[test]
    fn test_report_csv_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("knee_result.csv");
        sample_report().write_csv(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next().unwrap(),
            "column,knee_x,knee_y,curve_type,direction,sensitivity,computed_at"
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("value,4.0,5.0,convex,increasing,1.0,"));
    }

    #[test]
    fn test_report_json_round_trip() {
        let report = sample_report();
        let json = report.to_json().unwrap();
        let parsed: KneeReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.knee_x, report.knee_x);
        assert_eq!(parsed.curve_type, Concavity::Convex);
    }

    #[test]
    fn test_annotate_marks_single_row() {
        let curve = Curve::from_values(&[1.0, 2.0, 3.0, 4.0, 5.0, 10.0]).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("annotated.csv");
        annotate_csv(&curve, Some(4), &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let flagged: Vec<&str> = contents
            .lines()
            .skip(1)
            .filter(|l| l.ends_with(",true"))
            .collect();
        assert_eq!(flagged, vec!["5,5,true"]);
    }

    #[test]
    fn test_annotate_without_knee() {
        let curve = Curve::from_values(&[1.0, 2.0, 3.0]).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("annotated.csv");
        annotate_csv(&curve, None, &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(!contents.contains("true"));
        assert_eq!(contents.lines().count(), 4);
    }
}
