use arrow::{
    array::{ArrayRef, Date32Array, Float64Array, StringArray},
    datatypes::{DataType, Field as ArrowField, Schema},
    record_batch::RecordBatch,
};
use chrono::NaiveDate;
use parquet::{arrow::ArrowWriter, basic::Compression, file::properties::WriterProperties};
use std::{io::Write, path::Path, sync::Arc};
use tracing::info;

use super::table::{CleanTable, Column, Field, DERIVED_COLUMNS};
use crate::error::Result;
use crate::utils::write_atomic;

fn days_since_epoch(d: NaiveDate) -> i32 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).expect("epoch is a valid date");
    (d - epoch).num_days() as i32
}

/// Arrow schema for the cleaned table: dates as Date32, numbers as Float64,
/// pass-through columns as text.
pub fn arrow_schema(table: &CleanTable) -> Schema {
    let mut fields: Vec<ArrowField> = table
        .layout
        .headers
        .iter()
        .zip(&table.layout.columns)
        .map(|(name, col)| match col {
            Column::Known(Field::Date) => ArrowField::new(name, DataType::Date32, false),
            Column::Known(Field::Location) => ArrowField::new(name, DataType::Utf8, false),
            Column::Known(Field::Population) => ArrowField::new(name, DataType::Float64, true),
            Column::Known(Field::Count(_)) => ArrowField::new(name, DataType::Float64, false),
            Column::Passthrough(_) => ArrowField::new(name, DataType::Utf8, false),
        })
        .collect();

    let [death, vacc, cases_sm, deaths_sm] = DERIVED_COLUMNS;
    fields.push(ArrowField::new(death, DataType::Float64, false));
    fields.push(ArrowField::new(vacc, DataType::Float64, false));
    fields.push(ArrowField::new(cases_sm, DataType::Float64, true));
    fields.push(ArrowField::new(deaths_sm, DataType::Float64, true));
    Schema::new(fields)
}

pub fn to_record_batch(table: &CleanTable) -> Result<RecordBatch> {
    let rows = &table.rows;
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(table.layout.columns.len() + 4);

    for col in &table.layout.columns {
        let arr: ArrayRef = match *col {
            Column::Known(Field::Date) => Arc::new(Date32Array::from(
                rows.iter().map(|r| days_since_epoch(r.date)).collect::<Vec<_>>(),
            )),
            Column::Known(Field::Location) => Arc::new(StringArray::from_iter_values(
                rows.iter().map(|r| r.location.as_str()),
            )),
            Column::Known(Field::Population) => Arc::new(Float64Array::from(
                rows.iter().map(|r| r.population).collect::<Vec<_>>(),
            )),
            Column::Known(Field::Count(c)) => Arc::new(Float64Array::from(
                rows.iter().map(|r| r.count(c)).collect::<Vec<_>>(),
            )),
            Column::Passthrough(i) => Arc::new(StringArray::from_iter_values(
                rows.iter().map(|r| r.extra.get(i).map(String::as_str).unwrap_or("")),
            )),
        };
        columns.push(arr);
    }

    columns.push(Arc::new(Float64Array::from(
        rows.iter().map(|r| r.death_rate).collect::<Vec<_>>(),
    )));
    columns.push(Arc::new(Float64Array::from(
        rows.iter().map(|r| r.vaccination_rate).collect::<Vec<_>>(),
    )));
    columns.push(Arc::new(Float64Array::from(
        rows.iter().map(|r| r.new_cases_smoothed).collect::<Vec<_>>(),
    )));
    columns.push(Arc::new(Float64Array::from(
        rows.iter().map(|r| r.new_deaths_smoothed).collect::<Vec<_>>(),
    )));

    Ok(RecordBatch::try_new(
        Arc::new(arrow_schema(table)),
        columns,
    )?)
}

pub fn write_parquet<W: Write + Send>(table: &CleanTable, writer: W) -> Result<()> {
    let batch = to_record_batch(table)?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(writer, batch.schema(), Some(props))?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

/// Atomically replace `path` with a Parquet file of `table`.
pub fn save_parquet(table: &CleanTable, path: &Path) -> Result<()> {
    write_atomic(path, |f| write_parquet(table, f))?;
    info!(rows = table.rows.len(), "parquet copy saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::table::{CleanRecord, Layout, COUNT_COLUMNS};
    use arrow::array::Array;
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use std::fs::File;
    use tempfile::tempdir;

    fn table() -> CleanTable {
        let layout = Layout::from_headers(&[
            "iso_code",
            "date",
            "location",
            "population",
            "total_cases",
            "total_deaths",
            "new_cases",
            "new_deaths",
            "total_vaccinations",
            "people_vaccinated",
        ])
        .unwrap();
        let rows = (1..=2)
            .map(|day| CleanRecord {
                location: "Chile".into(),
                date: NaiveDate::from_ymd_opt(2021, 1, day).unwrap(),
                population: if day == 1 { None } else { Some(100.0) },
                counts: [day as f64; COUNT_COLUMNS],
                extra: vec!["CHL".into()],
                death_rate: 100.0,
                vaccination_rate: 0.0,
                new_cases_smoothed: None,
                new_deaths_smoothed: None,
            })
            .collect();
        CleanTable { layout, rows }
    }

    #[test]
    fn writes_typed_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.parquet");
        save_parquet(&table(), &path).unwrap();

        let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(&path).unwrap())
            .unwrap()
            .build()
            .unwrap();
        let batches: Vec<RecordBatch> = reader.collect::<std::result::Result<_, _>>().unwrap();
        let batch = &batches[0];
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), 14);

        let dates = batch
            .column_by_name("date")
            .unwrap()
            .as_any()
            .downcast_ref::<Date32Array>()
            .unwrap();
        assert_eq!(dates.value(0), 18628); // 2021-01-01

        let pop = batch
            .column_by_name("population")
            .unwrap()
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap();
        assert!(pop.is_null(0));
        assert_eq!(pop.value(1), 100.0);

        let smoothed = batch.column_by_name("new_cases_smoothed").unwrap();
        assert_eq!(smoothed.null_count(), 2);
    }
}
