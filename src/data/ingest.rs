//! Reading and writing quarterly tables as CSV
//!
//! Layout: the first column holds the quarter label, every other column is
//! a field tag. Columns named `Unnamed*` are spreadsheet index leftovers and
//! are dropped.

use super::types::{CompanyKey, FieldTag, QuarterlyTable};
use crate::error::{Error, Result};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Reads a table from any CSV source
pub fn read_table_csv<R: Read>(key: CompanyKey, reader: R) -> Result<QuarterlyTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    if headers.len() < 2 {
        return Err(Error::InsufficientData(format!(
            "{}: table has no field columns",
            key
        )));
    }

    let kept: Vec<(usize, FieldTag)> = headers
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, h)| !h.starts_with("Unnamed"))
        .map(|(i, h)| (i, FieldTag::parse(h)))
        .collect();

    let mut table = QuarterlyTable::new(key, kept.iter().map(|(_, t)| t.clone()).collect());

    for row in rdr.records() {
        let row = row?;
        let quarter = row.get(0).unwrap_or_default();
        if quarter.is_empty() {
            continue;
        }
        let values: Vec<Option<f64>> = kept.iter().map(|(i, _)| parse_cell(row.get(*i))).collect();
        table.push_row(quarter, &values);
    }

    Ok(table)
}

/// Reads a table from a CSV file
pub fn read_table_csv_path<P: AsRef<Path>>(key: CompanyKey, path: P) -> Result<QuarterlyTable> {
    let file = File::open(path)?;
    read_table_csv(key, file)
}

/// Writes a table in the layout accepted by [`read_table_csv`]
pub fn write_table_csv<W: Write>(table: &QuarterlyTable, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = vec!["Quarter".to_string()];
    header.extend(table.columns.iter().map(|c| c.to_string()));
    wtr.write_record(&header)?;

    for record in &table.records {
        let mut row = vec![record.quarter.clone()];
        for tag in &table.columns {
            row.push(match record.values.get(tag).copied().flatten() {
                Some(v) => v.to_string(),
                None => String::new(),
            });
        }
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Empty cells and `NaN` are missing values
fn parse_cell(cell: Option<&str>) -> Option<f64> {
    let cell = cell?;
    if cell.is_empty() || cell.eq_ignore_ascii_case("nan") {
        return None;
    }
    cell.parse::<f64>().ok().filter(|v| !v.is_nan())
}
