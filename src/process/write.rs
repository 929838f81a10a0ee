use csv::WriterBuilder;
use std::{
    io::{BufWriter, Write},
    path::Path,
};
use tracing::info;

use super::table::{CleanRecord, CleanTable, Column, Field, Layout};
use super::utils::format_optional_f64;
use crate::error::Result;
use crate::utils::write_atomic;

/// Write the cleaned table as CSV: input header order, then the derived columns.
pub fn write_csv<W: Write>(table: &CleanTable, writer: W) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    wtr.write_record(table.layout.output_headers())?;

    let mut fields = Vec::with_capacity(table.layout.columns.len() + 4);
    for row in &table.rows {
        fields.clear();
        render_row(&table.layout, row, &mut fields);
        wtr.write_record(&fields)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Atomically replace `path` with the CSV rendering of `table`.
pub fn save_csv(table: &CleanTable, path: &Path) -> Result<()> {
    write_atomic(path, |f| write_csv(table, BufWriter::new(f)))?;
    info!(rows = table.rows.len(), "processed data saved to {}", path.display());
    Ok(())
}

fn render_row(layout: &Layout, row: &CleanRecord, out: &mut Vec<String>) {
    for col in &layout.columns {
        out.push(match *col {
            Column::Known(Field::Date) => row.date.format("%Y-%m-%d").to_string(),
            Column::Known(Field::Location) => row.location.clone(),
            Column::Known(Field::Population) => format_optional_f64(row.population),
            Column::Known(Field::Count(c)) => row.count(c).to_string(),
            Column::Passthrough(i) => row.extra.get(i).cloned().unwrap_or_default(),
        });
    }
    out.push(row.death_rate.to_string());
    out.push(row.vaccination_rate.to_string());
    out.push(format_optional_f64(row.new_cases_smoothed));
    out.push(format_optional_f64(row.new_deaths_smoothed));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::table::COUNT_COLUMNS;
    use chrono::NaiveDate;

    #[test]
    fn renders_header_and_missing_smoothing_as_empty() {
        let layout = Layout::from_headers(&[
            "location",
            "date",
            "continent",
            "total_cases",
            "new_cases",
            "total_deaths",
            "new_deaths",
            "total_vaccinations",
            "people_vaccinated",
            "population",
        ])
        .unwrap();
        let mut counts = [0.0; COUNT_COLUMNS];
        counts[0] = 50.0;
        counts[1] = 1.0;
        let table = CleanTable {
            layout,
            rows: vec![CleanRecord {
                location: "Chile".into(),
                date: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
                population: None,
                counts,
                extra: vec!["South America".into()],
                death_rate: 2.0,
                vaccination_rate: 0.0,
                new_cases_smoothed: None,
                new_deaths_smoothed: Some(0.5),
            }],
        };

        let mut buf = Vec::new();
        write_csv(&table, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "location,date,continent,total_cases,new_cases,total_deaths,new_deaths,\
             total_vaccinations,people_vaccinated,population,death_rate,vaccination_rate,\
             new_cases_smoothed,new_deaths_smoothed"
        );
        assert_eq!(
            lines.next().unwrap(),
            "Chile,2021-01-01,South America,50,0,1,0,0,0,,2,0,,0.5"
        );
        assert!(lines.next().is_none());
    }
}
