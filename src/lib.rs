//! # kneedle
//!
//! Knee/elbow point detection for discrete curves, with the data-ingest
//! and export plumbing an interactive analysis tool needs around it.
//!
//! The core is a pure implementation of the Kneedle algorithm: given an
//! ordered (x, y) curve, shape priors, and a sensitivity, find the point
//! of maximum curvature — or report that there isn't one.
//!
//! ## Quick Start
//!
//! ```rust
//! use kneedle::{locate, Concavity, Curve, Direction, InterpolationPolicy, KneeParams};
//!
//! let curve = Curve::from_values(&[1.0, 2.0, 3.0, 4.0, 5.0, 10.0])?;
//! let params = KneeParams::new(
//!     Concavity::Convex,
//!     Direction::Increasing,
//!     1.0,
//!     InterpolationPolicy::Raw,
//! )?;
//!
//! let knee = locate(&curve, &params)?.expect("sharp upturn has a knee");
//! assert_eq!(knee.x, 5.0);
//! # Ok::<(), kneedle::Error>(())
//! ```
//!
//! ## Modules
//!
//! - [`error`]: Error types for the library
//! - [`curve`]: Validated (x, y) sample curves
//! - [`detect`]: The Kneedle detector and shape priors
//! - [`interpolate`]: Smoothing policies for noisy curves
//! - [`import`]: Delimited dataset ingest and batch detection
//! - [`report`]: Result records and CSV/JSON export
//! - [`chart`]: SVG rendering of a curve with its knee
//! - [`stats`]: Descriptive column statistics

pub mod chart;
pub mod curve;
pub mod detect;
pub mod error;
pub mod import;
pub mod interpolate;
pub mod report;
pub mod stats;

// Re-export commonly used types
pub use chart::{ChartConfig, render_curve_svg};
pub use curve::Curve;
pub use detect::{Concavity, Direction, Knee, KneeParams, locate};
pub use error::{Error, Result};
pub use import::{ColumnKnee, Dataset, FileFormat};
pub use interpolate::InterpolationPolicy;
pub use report::{KneeReport, annotate_csv, write_reports_csv};
pub use stats::Summary;
