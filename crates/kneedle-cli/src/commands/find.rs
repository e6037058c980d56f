//! Knee detection command.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use kneedle::{
    ChartConfig, Concavity, Curve, Dataset, Direction, InterpolationPolicy, Knee, KneeParams,
    KneeReport, render_curve_svg,
};

use crate::{CurveArg, DirectionArg, FormatArg};

/// Parsed arguments for `kneedle find`.
pub struct FindArgs {
    pub input: PathBuf,
    pub column: Option<String>,
    pub format: Option<FormatArg>,
    pub sensitivity: f64,
    pub curve: CurveArg,
    pub direction: DirectionArg,
    pub smooth: Option<usize>,
    pub all_columns: bool,
    pub output: Option<PathBuf>,
    pub json: Option<PathBuf>,
    pub annotate: Option<PathBuf>,
    pub chart: Option<PathBuf>,
    pub verbose: bool,
}

pub fn run(args: FindArgs) -> Result<()> {
    if args.verbose {
        eprintln!("Loading dataset from: {}", args.input.display());
    }

    let dataset = Dataset::from_path(&args.input, args.format.map(Into::into))
        .with_context(|| format!("Failed to read {}", args.input.display()))?;

    if args.verbose && dataset.skipped_rows() > 0 {
        eprintln!("Skipped {} malformed rows", dataset.skipped_rows());
    }

    let interpolation = match args.smooth {
        Some(degree) => InterpolationPolicy::Polynomial { degree },
        None => InterpolationPolicy::Raw,
    };

    if args.all_columns {
        return run_all_columns(&args, &dataset, interpolation);
    }

    let column = match &args.column {
        Some(name) => name.clone(),
        None => dataset
            .numeric_columns()
            .into_iter()
            .next()
            .context("No numeric column found in the dataset")?,
    };

    let values = dataset
        .numeric_column(&column)
        .with_context(|| format!("Cannot analyze column '{column}'"))?;
    if args.verbose {
        eprintln!("Column '{}': {} rows", column, values.len());
    }

    let curve = Curve::from_values(&values)?;
    let params = resolve_params(&curve, &args, interpolation)?;
    if args.verbose {
        eprintln!(
            "Shape: {} {}, sensitivity {}",
            params.concavity, params.direction, params.sensitivity
        );
    }

    let knee = kneedle::locate(&curve, &params)?;

    match &knee {
        Some(k) => {
            println!("Knee point: x = {}, y = {}", k.x, k.y);
            println!("Curve type: {}", params.concavity);
            println!("Direction:  {}", params.direction);
            if let Some(fitted) = k.fitted_y {
                println!("Fitted y:   {fitted:.6}");
            }
        }
        None => {
            println!("No knee found. Try a smaller sensitivity value.");
        }
    }

    write_outputs(&args, &column, &curve, &params, knee.as_ref())?;
    Ok(())
}

fn run_all_columns(
    args: &FindArgs,
    dataset: &Dataset,
    interpolation: InterpolationPolicy,
) -> Result<()> {
    if args.curve != CurveArg::Auto || args.direction != DirectionArg::Auto {
        bail!("--all-columns always auto-detects shape; drop --curve/--direction");
    }

    let results = dataset.detect_knees(args.sensitivity, interpolation)?;
    if results.is_empty() {
        bail!("No analyzable numeric columns in the dataset");
    }

    println!(
        "{:<20} {:>12} {:>12} {:>10} {:>12}",
        "Column", "Knee X", "Knee Y", "Shape", "Direction"
    );
    println!("{:-<70}", "");
    for result in &results {
        match &result.knee {
            Some(k) => println!(
                "{:<20} {:>12.4} {:>12.4} {:>10} {:>12}",
                result.column, k.x, k.y, result.params.concavity, result.params.direction
            ),
            None => println!("{:<20} {:>12} {:>12}", result.column, "-", "-"),
        }
    }

    let reports: Vec<KneeReport> = results
        .iter()
        .filter_map(|r| {
            r.knee
                .as_ref()
                .map(|k| KneeReport::new(&r.column, k, &r.params))
        })
        .collect();

    if let Some(path) = &args.output {
        kneedle::write_reports_csv(&reports, path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Saved results to: {}", path.display());
    }
    if let Some(path) = &args.json {
        std::fs::write(path, serde_json::to_string_pretty(&results)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Saved results to: {}", path.display());
    }
    Ok(())
}

fn resolve_params(
    curve: &Curve,
    args: &FindArgs,
    interpolation: InterpolationPolicy,
) -> Result<KneeParams> {
    let auto = KneeParams::with_detected_shape(curve, args.sensitivity, interpolation)?;
    let concavity = match args.curve {
        CurveArg::Auto => auto.concavity,
        CurveArg::Concave => Concavity::Concave,
        CurveArg::Convex => Concavity::Convex,
    };
    let direction = match args.direction {
        DirectionArg::Auto => auto.direction,
        DirectionArg::Increasing => Direction::Increasing,
        DirectionArg::Decreasing => Direction::Decreasing,
    };
    Ok(KneeParams::new(
        concavity,
        direction,
        args.sensitivity,
        interpolation,
    )?)
}

fn write_outputs(
    args: &FindArgs,
    column: &str,
    curve: &Curve,
    params: &KneeParams,
    knee: Option<&Knee>,
) -> Result<()> {
    if let Some(path) = &args.output {
        if let Some(k) = knee {
            KneeReport::new(column, k, params)
                .write_csv(path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Saved result to: {}", path.display());
        } else if args.verbose {
            eprintln!("No knee to export; skipping {}", path.display());
        }
    }

    if let Some(path) = &args.json {
        if let Some(k) = knee {
            let report = KneeReport::new(column, k, params);
            std::fs::write(path, report.to_json()?)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Saved result to: {}", path.display());
        } else if args.verbose {
            eprintln!("No knee to export; skipping {}", path.display());
        }
    }

    if let Some(path) = &args.annotate {
        kneedle::annotate_csv(curve, knee.map(|k| k.index), path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Saved annotated rows to: {}", path.display());
    }

    if let Some(path) = &args.chart {
        let config = ChartConfig::new(format!("Knee Detection: {column}"))
            .with_labels("Index", column.to_string());
        let svg = render_curve_svg(curve, None, knee, &config);
        if svg.is_empty() {
            bail!("Chart bounds collapsed; nothing to plot");
        }
        std::fs::write(path, svg)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Saved chart to: {}", path.display());
    }

    Ok(())
}
