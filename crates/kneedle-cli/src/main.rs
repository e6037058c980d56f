//! kneedle CLI - knee/elbow point detection for delimited datasets

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

mod commands;

/// Knee/elbow point detection tool.
#[derive(Parser)]
#[command(name = "kneedle")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect the knee of a dataset column
    Find {
        /// Input CSV or TSV file
        #[arg(short, long)]
        input: PathBuf,

        /// Column to analyze (default: first numeric column)
        #[arg(short, long)]
        column: Option<String>,

        /// Input format (default: inferred from extension)
        #[arg(long, value_enum)]
        format: Option<FormatArg>,

        /// Detection sensitivity; smaller flags knees quicker, larger is
        /// more conservative
        #[arg(short, long, default_value_t = 1.0)]
        sensitivity: f64,

        /// Curve shape prior
        #[arg(long, value_enum, default_value = "auto")]
        curve: CurveArg,

        /// Curve direction prior
        #[arg(long, value_enum, default_value = "auto")]
        direction: DirectionArg,

        /// Smooth with a polynomial fit of this degree before detection
        #[arg(long)]
        smooth: Option<usize>,

        /// Analyze every numeric column instead of one
        #[arg(long, conflicts_with = "column")]
        all_columns: bool,

        /// Write the result as CSV
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the result as JSON
        #[arg(long)]
        json: Option<PathBuf>,

        /// Write the input rows with an is_knee flag
        #[arg(long)]
        annotate: Option<PathBuf>,

        /// Write an SVG chart of the curve and knee
        #[arg(long)]
        chart: Option<PathBuf>,
    },

    /// List dataset columns with numeric summaries
    Columns {
        /// Input CSV or TSV file
        #[arg(short, long)]
        input: PathBuf,

        /// Input format (default: inferred from extension)
        #[arg(long, value_enum)]
        format: Option<FormatArg>,
    },
}

/// Input flavor argument.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Csv,
    Tsv,
}

impl From<FormatArg> for kneedle::FileFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Csv => Self::Csv,
            FormatArg::Tsv => Self::Tsv,
        }
    }
}

/// Concavity argument with auto-detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CurveArg {
    Auto,
    Concave,
    Convex,
}

/// Direction argument with auto-detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DirectionArg {
    Auto,
    Increasing,
    Decreasing,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Find {
            input,
            column,
            format,
            sensitivity,
            curve,
            direction,
            smooth,
            all_columns,
            output,
            json,
            annotate,
            chart,
        } => commands::find::run(commands::find::FindArgs {
            input,
            column,
            format,
            sensitivity,
            curve,
            direction,
            smooth,
            all_columns,
            output,
            json,
            annotate,
            chart,
            verbose: cli.verbose,
        }),
        Commands::Columns { input, format } => {
            commands::columns::run(input, format, cli.verbose)
        }
    }
}
