//! SVG rendering of a curve with its detected knee.
//!
//! Produces a self-contained SVG line chart: the observed series, an
//! optional smoothed overlay, and an X marker at the knee. Light and dark
//! mode are handled with CSS media queries so the file drops into any
//! page or viewer.

use std::fmt::Write as _;

use crate::curve::Curve;
use crate::detect::Knee;

/// Chart layout and labeling.
#[derive(Debug, Clone)]
pub struct ChartConfig {
    /// Chart title.
    pub title: String,
    /// X-axis label.
    pub x_label: String,
    /// Y-axis label.
    pub y_label: String,
    /// Chart width in pixels.
    pub width: u32,
    /// Chart height in pixels.
    pub height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            title: "Knee Detection".to_string(),
            x_label: "Index".to_string(),
            y_label: "Value".to_string(),
            width: 700,
            height: 450,
        }
    }
}

impl ChartConfig {
    /// New configuration with the given title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Sets the axis labels.
    #[must_use]
    pub fn with_labels(mut self, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        self.x_label = x_label.into();
        self.y_label = y_label.into();
        self
    }

    /// Sets the chart dimensions.
    #[must_use]
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

/// Render the curve, an optional fitted overlay, and the knee marker.
///
/// Returns an empty string for a curve whose bounds collapse (all-equal
/// values in both axes cannot be plotted).
#[must_use]
pub fn render_curve_svg(
    curve: &Curve,
    fitted: Option<&[f64]>,
    knee: Option<&Knee>,
    config: &ChartConfig,
) -> String {
    let xs = curve.xs();
    let ys = curve.ys();

    let (min_x, max_x) = bounds_with_padding(&xs, 0.05);
    let mut all_y = ys.clone();
    if let Some(f) = fitted {
        all_y.extend_from_slice(f);
    }
    let (min_y, max_y) = bounds_with_padding(&all_y, 0.05);
    if max_x - min_x <= 0.0 || max_y - min_y <= 0.0 {
        return String::new();
    }

    let width = config.width;
    let height = config.height;
    let margin_top = 50;
    let margin_right = 40;
    let margin_bottom = 70;
    let margin_left = 90;
    let plot_width = width - margin_left - margin_right;
    let plot_height = height - margin_top - margin_bottom;

    let scale_x = |v: f64| -> f64 {
        f64::from(margin_left) + (v - min_x) / (max_x - min_x) * f64::from(plot_width)
    };
    let scale_y = |v: f64| -> f64 {
        f64::from(margin_top) + (1.0 - (v - min_y) / (max_y - min_y)) * f64::from(plot_height)
    };

    let mut svg = String::with_capacity(8192);

    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {} {}">"#,
        width, height
    );

    // CSS with dark mode support
    svg.push_str(
        r#"<style>
  :root {
    --bg-color: #ffffff;
    --text-color: #1a1a1a;
    --grid-color: #e0e0e0;
    --axis-color: #333333;
    --curve-color: #14b8a6;
    --fit-color: #8b5cf6;
    --knee-color: #dc2626;
  }
  @media (prefers-color-scheme: dark) {
    :root {
      --bg-color: #1a1a1a;
      --text-color: #e0e0e0;
      --grid-color: #404040;
      --axis-color: #b0b0b0;
      --curve-color: #2dd4bf;
      --fit-color: #a78bfa;
      --knee-color: #f87171;
    }
  }
  .background { fill: var(--bg-color); }
  .title { font: bold 18px system-ui, sans-serif; fill: var(--text-color); }
  .axis-label { font: 13px system-ui, sans-serif; fill: var(--text-color); }
  .tick-label { font: 11px system-ui, sans-serif; fill: var(--text-color); }
  .grid { stroke: var(--grid-color); stroke-width: 1; }
  .axis { stroke: var(--axis-color); stroke-width: 1.5; }
  .curve { stroke: var(--curve-color); stroke-width: 2.5; fill: none; }
  .fit { stroke: var(--fit-color); stroke-width: 1.5; stroke-dasharray: 5,4; fill: none; }
  .knee { stroke: var(--knee-color); stroke-width: 3; }
  .knee-label { font: bold 12px system-ui, sans-serif; fill: var(--knee-color); }
</style>
"#,
    );

    let _ = writeln!(
        svg,
        r#"<rect class="background" width="{}" height="{}"/>"#,
        width, height
    );

    let _ = writeln!(
        svg,
        r#"<text x="{}" y="30" text-anchor="middle" class="title">{}</text>"#,
        f64::from(width) / 2.0,
        config.title
    );

    // Grid and tick labels
    for i in 0..=5 {
        let frac = f64::from(i) / 5.0;
        let x_val = min_x + frac * (max_x - min_x);
        let y_val = min_y + frac * (max_y - min_y);
        let x = scale_x(x_val);
        let y = scale_y(y_val);

        let _ = writeln!(
            svg,
            r#"<line x1="{:.2}" y1="{}" x2="{:.2}" y2="{}" class="grid"/>"#,
            x,
            margin_top,
            x,
            height - margin_bottom
        );
        let _ = writeln!(
            svg,
            r#"<line x1="{}" y1="{:.2}" x2="{}" y2="{:.2}" class="grid"/>"#,
            margin_left,
            y,
            width - margin_right,
            y
        );
        let _ = writeln!(
            svg,
            r#"<text x="{:.2}" y="{}" text-anchor="middle" class="tick-label">{}</text>"#,
            x,
            height - margin_bottom + 20,
            format_tick(x_val)
        );
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="{:.2}" text-anchor="end" class="tick-label">{}</text>"#,
            margin_left - 10,
            y + 4.0,
            format_tick(y_val)
        );
    }

    // Axes
    let _ = writeln!(
        svg,
        r#"<line x1="{}" y1="{}" x2="{}" y2="{}" class="axis"/>"#,
        margin_left,
        height - margin_bottom,
        width - margin_right,
        height - margin_bottom
    );
    let _ = writeln!(
        svg,
        r#"<line x1="{}" y1="{}" x2="{}" y2="{}" class="axis"/>"#,
        margin_left,
        margin_top,
        margin_left,
        height - margin_bottom
    );

    // Axis labels
    let _ = writeln!(
        svg,
        r#"<text x="{}" y="{}" text-anchor="middle" class="axis-label">{}</text>"#,
        f64::from(width) / 2.0,
        height - 20,
        config.x_label
    );
    let _ = writeln!(
        svg,
        r#"<text x="25" y="{}" text-anchor="middle" class="axis-label" transform="rotate(-90 25 {})">{}</text>"#,
        f64::from(height) / 2.0,
        f64::from(height) / 2.0,
        config.y_label
    );

    // Observed series
    let mut path = String::new();
    for (i, (&x, &y)) in xs.iter().zip(&ys).enumerate() {
        let prefix = if i == 0 { "M" } else { " L" };
        let _ = write!(path, "{} {:.2},{:.2}", prefix, scale_x(x), scale_y(y));
    }
    let _ = writeln!(svg, r#"<path class="curve" d="{}"/>"#, path);

    // Fitted overlay
    if let Some(f) = fitted {
        let mut fit_path = String::new();
        for (i, (&x, &y)) in xs.iter().zip(f).enumerate() {
            let prefix = if i == 0 { "M" } else { " L" };
            let _ = write!(fit_path, "{} {:.2},{:.2}", prefix, scale_x(x), scale_y(y));
        }
        let _ = writeln!(svg, r#"<path class="fit" d="{}"/>"#, fit_path);
    }

    // Knee marker: an X at the knee point with a coordinate label.
    if let Some(k) = knee {
        let cx = scale_x(k.x);
        let cy = scale_y(k.y);
        let r = 6.0;
        let _ = writeln!(
            svg,
            r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" class="knee"/>"#,
            cx - r,
            cy - r,
            cx + r,
            cy + r
        );
        let _ = writeln!(
            svg,
            r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" class="knee"/>"#,
            cx - r,
            cy + r,
            cx + r,
            cy - r
        );
        let _ = writeln!(
            svg,
            r#"<text x="{:.2}" y="{:.2}" class="knee-label">knee ({}, {})</text>"#,
            cx + 10.0,
            cy - 8.0,
            format_tick(k.x),
            format_tick(k.y)
        );
    }

    svg.push_str("</svg>\n");
    svg
}

/// Min/max of a series, widened by `padding` of the span on both sides.
fn bounds_with_padding(values: &[f64], padding: f64) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let span = max - min;
    if span <= 0.0 {
        return (min - 0.5, max + 0.5);
    }
    (min - span * padding, max + span * padding)
}

/// Format a tick label to a precision that suits its magnitude.
fn format_tick(v: f64) -> String {
    if v == 0.0 {
        "0".to_string()
    } else if v.abs() >= 100.0 {
        format!("{v:.0}")
    } else if v.abs() >= 1.0 {
        format!("{v:.2}")
    } else {
        format!("{v:.4}")
    }
}
