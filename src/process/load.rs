use csv::{ReaderBuilder, StringRecord};
use std::{fs::File, io::Read, path::Path};
use tracing::{debug, info, instrument};

use super::date_parser::parse_date;
use super::table::{Column, Field, Layout, RawRecord, RawTable, COUNT_COLUMNS};
use super::utils::parse_optional_f64;
use crate::error::{PrepError, Result};

/// Read a headed CSV into typed rows.
///
/// The header is checked first, so a missing column fails before any row is parsed.
/// Any malformed row fails the whole read.
pub fn read_raw_table<R: Read>(reader: R) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let layout = Layout::from_headers(&headers)?;
    debug!(
        columns = headers.len(),
        passthrough = layout.passthrough_count(),
        "header resolved"
    );

    let mut rows = Vec::new();
    let mut record = StringRecord::new();
    while rdr.read_record(&mut record)? {
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        rows.push(parse_record(&layout, &record, line)?);
    }

    Ok(RawTable { layout, rows })
}

#[instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_raw_table(path: impl AsRef<Path>) -> Result<RawTable> {
    let file = File::open(path.as_ref())?;
    let table = read_raw_table(file)?;
    info!(rows = table.rows.len(), "loaded raw table");
    Ok(table)
}

fn parse_record(layout: &Layout, record: &StringRecord, line: u64) -> Result<RawRecord> {
    let mut location = None;
    let mut date = None;
    let mut population = None;
    let mut counts = [None; COUNT_COLUMNS];
    let mut extra = Vec::with_capacity(layout.passthrough_count());

    for (col, value) in layout.columns.iter().zip(record.iter()) {
        match *col {
            Column::Passthrough(_) => extra.push(value.to_string()),
            Column::Known(Field::Location) => {
                let v = value.trim();
                if v.is_empty() {
                    return Err(PrepError::parse(line, "location", value, "empty region"));
                }
                location = Some(v.to_string());
            }
            Column::Known(Field::Date) => {
                date = Some(parse_date(value).ok_or_else(|| {
                    PrepError::parse(line, "date", value, "expected YYYY-MM-DD")
                })?);
            }
            Column::Known(f @ Field::Population) => {
                population = number(line, f, value)?;
            }
            Column::Known(f @ Field::Count(c)) => {
                counts[c as usize] = number(line, f, value)?;
            }
        }
    }

    // csv rejects short rows unless flexible; guard anyway so a field is never silently absent
    match (location, date) {
        (Some(location), Some(date)) => Ok(RawRecord {
            location,
            date,
            population,
            counts,
            extra,
        }),
        (None, _) => Err(PrepError::parse(line, "location", "", "field absent")),
        (_, None) => Err(PrepError::parse(line, "date", "", "field absent")),
    }
}

fn number(line: u64, field: Field, value: &str) -> Result<Option<f64>> {
    parse_optional_f64(value).map_err(|reason| PrepError::parse(line, field.name(), value, reason))
}
