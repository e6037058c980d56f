//! Delimited dataset ingest and batch detection.
//!
//! Loads CSV or TSV files into an in-memory [`Dataset`], skipping rows
//! whose field count doesn't match the header (a bad line is dropped and
//! counted, not fatal). Columns are addressed by header name,
//! case-insensitively, and extracted as numeric series with blank cells
//! dropped.

use std::path::Path;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::curve::Curve;
use crate::detect::{self, Knee, KneeParams};
use crate::error::{Error, Result};
use crate::interpolate::InterpolationPolicy;

/// Input file flavor, deciding the field delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    /// Comma-separated values.
    Csv,
    /// Tab-separated values.
    Tsv,
}

impl FileFormat {
    /// The field delimiter byte for this flavor.
    #[must_use]
    pub fn delimiter(self) -> u8 {
        match self {
            Self::Csv => b',',
            Self::Tsv => b'\t',
        }
    }

    /// Infer the flavor from a file extension. `.tsv` and `.tab` read as
    /// tab-separated; everything else as CSV.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tsv") || ext.eq_ignore_ascii_case("tab") => {
                Self::Tsv
            }
            _ => Self::Csv,
        }
    }
}

/// An in-memory tabular dataset with a header row.
#[derive(Debug, Clone)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    skipped_rows: usize,
}

impl Dataset {
    /// Load a dataset from a delimited file.
    ///
    /// When `format` is `None` the flavor is inferred from the extension.
    /// Rows whose field count differs from the header are skipped and
    /// counted in [`Dataset::skipped_rows`].
    pub fn from_path(path: impl AsRef<Path>, format: Option<FileFormat>) -> Result<Self> {
        let path = path.as_ref();
        let format = format.unwrap_or_else(|| FileFormat::from_path(path));

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(format.delimiter())
            .flexible(true)
            .from_path(path)?;

        let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
        if headers.is_empty() {
            return Err(Error::Import {
                line: 1,
                reason: "missing header row".to_string(),
            });
        }

        let mut rows = Vec::new();
        let mut skipped_rows = 0usize;
        for record in reader.records() {
            match record {
                Ok(r) if r.len() == headers.len() => {
                    rows.push(r.iter().map(String::from).collect());
                }
                _ => skipped_rows += 1,
            }
        }

        Ok(Self {
            headers,
            rows,
            skipped_rows,
        })
    }

    /// Column header names in file order.
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of well-formed data rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of malformed rows dropped during ingest.
    #[must_use]
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    /// Find a column index by name, case-insensitively.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
    }

    /// Extract a column as a numeric series.
    ///
    /// Blank cells and the usual NA spellings are dropped; any other
    /// unparseable cell rejects the whole column as non-numeric.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| Error::ColumnNotFound(name.to_string()))?;

        let mut values = Vec::with_capacity(self.rows.len());
        for (row_num, row) in self.rows.iter().enumerate() {
            let cell = row[idx].trim();
            if is_missing(cell) {
                continue;
            }
            match cell.parse::<f64>() {
                Ok(v) if v.is_finite() => values.push(v),
                Ok(_) => {}
                Err(_) => {
                    return Err(Error::NonNumericColumn {
                        column: self.headers[idx].clone(),
                        reason: format!("value '{cell}' at data row {}", row_num + 1),
                    });
                }
            }
        }

        if values.is_empty() {
            return Err(Error::NonNumericColumn {
                column: self.headers[idx].clone(),
                reason: "no numeric values".to_string(),
            });
        }

        Ok(values)
    }

    /// Headers of every column that extracts cleanly as a numeric series.
    #[must_use]
    pub fn numeric_columns(&self) -> Vec<String> {
        self.headers
            .iter()
            .filter(|h| self.numeric_column(h).is_ok())
            .cloned()
            .collect()
    }

    /// Run knee detection over every numeric column in parallel.
    ///
    /// Each column gets its shape priors auto-detected; columns too short
    /// to form a curve are skipped. The core stays a pure per-curve
    /// function; the parallel fan-out lives here.
    pub fn detect_knees(
        &self,
        sensitivity: f64,
        interpolation: InterpolationPolicy,
    ) -> Result<Vec<ColumnKnee>> {
        // Surface bad parameters once, before the parallel walk.
        KneeParams::new(
            crate::detect::Concavity::Convex,
            crate::detect::Direction::Increasing,
            sensitivity,
            interpolation,
        )?;

        let columns = self.numeric_columns();
        let mut results: Vec<ColumnKnee> = columns
            .par_iter()
            .filter_map(|name| {
                let values = self.numeric_column(name).ok()?;
                let curve = Curve::from_values(&values).ok()?;
                let params =
                    KneeParams::with_detected_shape(&curve, sensitivity, interpolation).ok()?;
                let knee = detect::locate(&curve, &params).ok()?;
                Some(ColumnKnee {
                    column: name.clone(),
                    params,
                    knee,
                })
            })
            .collect();
        results.sort_by(|a, b| {
            let pos = |c: &ColumnKnee| self.column_index(&c.column).unwrap_or(usize::MAX);
            pos(a).cmp(&pos(b))
        });
        Ok(results)
    }
}

/// Detection outcome for one dataset column.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnKnee {
    /// Column header.
    pub column: String,
    /// Parameters used, with auto-detected shape priors.
    pub params: KneeParams,
    /// The detected knee, if any survived the threshold.
    pub knee: Option<Knee>,
}

/// Blank and NA spellings dropped during numeric extraction.
fn is_missing(cell: &str) -> bool {
    cell.is_empty()
        || cell.eq_ignore_ascii_case("na")
        || cell.eq_ignore_ascii_case("nan")
        || cell.eq_ignore_ascii_case("null")
}
