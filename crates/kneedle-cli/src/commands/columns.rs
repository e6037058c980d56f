//! Column listing command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use kneedle::{Dataset, Summary};

use crate::FormatArg;

pub fn run(input: PathBuf, format: Option<FormatArg>, verbose: bool) -> Result<()> {
    if verbose {
        eprintln!("Loading dataset from: {}", input.display());
    }

    let dataset = Dataset::from_path(&input, format.map(Into::into))
        .with_context(|| format!("Failed to read {}", input.display()))?;

    println!("Rows: {}", dataset.row_count());
    if dataset.skipped_rows() > 0 {
        println!("Skipped malformed rows: {}", dataset.skipped_rows());
    }
    println!();

    println!(
        "{:<20} {:>8} {:>12} {:>12} {:>12} {:>12}",
        "Column", "Numeric", "Mean", "Median", "Min", "Max"
    );
    println!("{:-<80}", "");

    for header in dataset.headers() {
        match dataset.numeric_column(header) {
            Ok(values) => {
                if let Some(summary) = Summary::compute(&values) {
                    println!(
                        "{:<20} {:>8} {:>12.4} {:>12.4} {:>12.4} {:>12.4}",
                        header, "yes", summary.mean, summary.median, summary.min, summary.max
                    );
                }
            }
            Err(_) => {
                println!("{:<20} {:>8}", header, "no");
            }
        }
    }

    Ok(())
}
