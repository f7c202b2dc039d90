//! Parse resident sheets from xlsx workbook bytes

use std::io::Cursor;

use anyhow::{Context, Result, bail};
use calamine::{Data, Reader, Xlsx};

use crate::import::columns::ImportColumn;
use crate::import::records::RawRow;

/// Parse the first sheet of an xlsx workbook into raw rows.
///
/// The first row must be a header row carrying every required column with
/// its exact template spelling. A missing column aborts the whole file
/// with a single error naming all absent headers; no rows are produced.
/// Rows whose cells are all empty are skipped and never occupy an index.
pub fn parse_residents_xlsx(bytes: &[u8]) -> Result<Vec<RawRow>> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))
        .context("Failed to open workbook: not a valid xlsx file")?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .context("Workbook has no sheets")?
        .clone();

    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("Failed to read sheet: {}", sheet_name))?;

    let mut rows = range.rows();
    let header_row = rows.next().context("Sheet has no header row")?;
    let headers: Vec<String> = header_row.iter().map(cell_to_string).collect();

    check_required_columns(&headers)?;

    let mut parsed = Vec::new();
    for row in rows {
        if row.iter().all(|cell| cell_to_string(cell).trim().is_empty()) {
            continue;
        }

        let mut raw = RawRow::new();
        for (idx, cell) in row.iter().enumerate() {
            let Some(header) = headers.get(idx) else {
                continue;
            };
            if header.is_empty() {
                continue;
            }
            raw.insert(header.clone(), cell_to_string(cell));
        }
        parsed.push(raw);
    }

    Ok(parsed)
}

/// Reject the sheet unless every required column is present, reporting all
/// missing headers at once.
fn check_required_columns(headers: &[String]) -> Result<()> {
    let missing: Vec<&str> = ImportColumn::REQUIRED
        .iter()
        .filter(|column| !headers.iter().any(|header| header == column.header()))
        .map(|column| column.header())
        .collect();

    if !missing.is_empty() {
        bail!("Missing required columns: {}", missing.join(", "));
    }

    Ok(())
}

/// String form of a cell, the way the mapper consumes it.
///
/// Whole-number floats print without a fractional part so identifiers
/// survive the trip through a number-typed cell. Date cells keep their
/// serial form; the payload builder turns serials into dates later.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_float(*f),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => format_float(dt.as_f64()),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(_) => String::new(),
    }
}

fn format_float(f: f64) -> String {
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        format!("{}", f as i64)
    } else {
        format!("{}", f)
    }
}
