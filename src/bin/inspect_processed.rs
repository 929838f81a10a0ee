use anyhow::{Context, Result};
use covidprep::process::{
    load::load_raw_table,
    table::{Column, Field, RawTable},
};
use std::{collections::BTreeSet, env, path::Path, process::exit};

fn main() {
    // Expect exactly one CLI argument: path to a processed (or raw) CSV file.
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <CSV_FILE>", args[0]);
        exit(1);
    }
    if let Err(e) = inspect(Path::new(&args[1])) {
        eprintln!("Error: {:#}", e);
        exit(1);
    }
}

/// Print row/region counts, the date range, and per-column missing counts.
fn inspect(path: &Path) -> Result<()> {
    let table = load_raw_table(path).with_context(|| format!("reading {}", path.display()))?;

    let regions: BTreeSet<&str> = table.rows.iter().map(|r| r.location.as_str()).collect();
    let first = table.rows.iter().map(|r| r.date).min();
    let last = table.rows.iter().map(|r| r.date).max();

    println!("=== CSV File: {} ===", path.display());
    println!("Rows:        {}", table.rows.len());
    println!("Columns:     {}", table.layout.headers.len());
    println!("Regions:     {}", regions.len());
    match (first, last) {
        (Some(a), Some(b)) => println!("Date range:  {} .. {}", a, b),
        _ => println!("Date range:  <empty>"),
    }
    println!();

    println!("=== Missing values ===");
    for (name, missing) in missing_per_column(&table) {
        if missing > 0 {
            println!("- {:<40} {}", name, missing);
        }
    }
    Ok(())
}

fn missing_per_column(table: &RawTable) -> Vec<(&str, usize)> {
    table
        .layout
        .headers
        .iter()
        .zip(&table.layout.columns)
        .map(|(name, col)| {
            let missing = table
                .rows
                .iter()
                .filter(|r| match *col {
                    Column::Known(Field::Population) => r.population.is_none(),
                    Column::Known(Field::Count(c)) => r.count(c).is_none(),
                    Column::Known(_) => false,
                    Column::Passthrough(i) => r.extra.get(i).map_or(true, |v| v.trim().is_empty()),
                })
                .count();
            (name.as_str(), missing)
        })
        .collect()
}
