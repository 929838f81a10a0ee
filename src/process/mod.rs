// src/process/mod.rs
pub mod columnar;
pub mod date_parser;
pub mod derive;
pub mod filter;
pub mod groups;
pub mod impute;
pub mod load;
pub mod smooth;
pub mod table;
pub mod utils;
pub mod write;

use std::{io::Read, path::Path};
use tracing::{debug, info, instrument};

use crate::error::Result;
use groups::partition_by_region;
use table::{CleanTable, RawTable};

/// Counters gathered while cleaning one table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreprocessReport {
    pub input_rows: usize,
    pub aggregates_dropped: usize,
    pub regions: usize,
    pub forward_filled: usize,
    pub zero_filled: usize,
    pub output_rows: usize,
}

/// Where `preprocess_data` writes its results. `None` skips that output.
#[derive(Debug, Clone, Copy, Default)]
pub struct Outputs<'a> {
    pub csv: Option<&'a Path>,
    pub parquet: Option<&'a Path>,
}

/// Clean an already-parsed table: drop aggregates, impute, derive ratios, smooth.
/// Row order follows the input.
#[instrument(level = "info", skip_all, fields(rows = raw.rows.len()))]
pub fn clean(raw: RawTable) -> (CleanTable, PreprocessReport) {
    let RawTable { layout, mut rows } = raw;
    let mut report = PreprocessReport {
        input_rows: rows.len(),
        ..PreprocessReport::default()
    };

    report.aggregates_dropped = filter::drop_aggregates(&mut rows);

    let groups = partition_by_region(&rows, |r| (r.location.as_str(), r.date));
    report.regions = groups.len();
    report.forward_filled = impute::forward_fill(&mut rows, &groups);

    let mut cleaned = Vec::with_capacity(rows.len());
    for raw in rows {
        let (rec, zeroed) = impute::zero_fill(raw);
        report.zero_filled += zeroed;
        cleaned.push(rec);
    }

    derive::apply_ratios(&mut cleaned);
    // indices are still valid: zero-fill maps rows one to one
    smooth::apply_smoothing(&mut cleaned, &groups);

    report.output_rows = cleaned.len();
    debug!(?report, "cleaning finished");
    (
        CleanTable {
            layout,
            rows: cleaned,
        },
        report,
    )
}

/// Parse a raw CSV and clean it. Fails as a whole on a missing column or a bad field.
pub fn preprocess<R: Read>(input: R) -> Result<(CleanTable, PreprocessReport)> {
    let raw = load::read_raw_table(input)?;
    Ok(clean(raw))
}

/// Load `input`, clean it, and write the requested outputs. Nothing is written unless
/// every stage succeeds.
#[instrument(level = "info", skip(input, outputs), fields(path = %input.display()))]
pub fn preprocess_data(input: &Path, outputs: Outputs<'_>) -> Result<CleanTable> {
    info!("preprocessing data from {}", input.display());
    let raw = load::load_raw_table(input)?;
    let (table, report) = clean(raw);

    info!(
        rows = report.output_rows,
        columns = table.layout.headers.len() + table::DERIVED_COLUMNS.len(),
        regions = report.regions,
        aggregates_dropped = report.aggregates_dropped,
        forward_filled = report.forward_filled,
        zero_filled = report.zero_filled,
        "preprocessing complete"
    );

    if let Some(path) = outputs.csv {
        write::save_csv(&table, path)?;
    }
    if let Some(path) = outputs.parquet {
        columnar::save_parquet(&table, path)?;
    }
    Ok(table)
}
