//! Write validation results to an Excel report

use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::import::validate::ValidationError;

/// Column layout of the Errors sheet
mod cols {
    pub const ROW: u16 = 0;
    pub const COLUMN: u16 = 1;
    pub const MESSAGE: u16 = 2;
}

/// Write a validation report next to the reviewed sheet: an `Errors` sheet
/// listing every failed rule and a `Summary` sheet with the counts. Row
/// numbers are 1-based, matching the review table.
pub fn write_validation_report(
    errors: &[ValidationError],
    total_rows: usize,
    path: &Path,
) -> Result<()> {
    let buffer = build_report(errors, total_rows)?;
    std::fs::write(path, &buffer)
        .with_context(|| format!("Failed to write report: {}", path.display()))?;
    Ok(())
}

/// Render the report workbook to an in-memory buffer.
pub fn build_report(errors: &[ValidationError], total_rows: usize) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();

    let errors_sheet = workbook.add_worksheet();
    errors_sheet.set_name("Errors")?;
    write_errors_sheet(errors_sheet, errors)?;

    let summary_sheet = workbook.add_worksheet();
    summary_sheet.set_name("Summary")?;
    write_summary_sheet(summary_sheet, errors, total_rows)?;

    let buffer = workbook
        .save_to_buffer()
        .context("Failed to render validation report")?;
    Ok(buffer)
}

fn write_errors_sheet(sheet: &mut Worksheet, errors: &[ValidationError]) -> Result<()> {
    let bold = Format::new().set_bold();
    sheet.write_string_with_format(0, cols::ROW, "Row", &bold)?;
    sheet.write_string_with_format(0, cols::COLUMN, "Column", &bold)?;
    sheet.write_string_with_format(0, cols::MESSAGE, "Message", &bold)?;

    for (i, error) in errors.iter().enumerate() {
        let row = (i + 1) as u32;
        sheet.write_number(row, cols::ROW, (error.row + 1) as f64)?;
        sheet.write_string(row, cols::COLUMN, error.column.header())?;
        sheet.write_string(row, cols::MESSAGE, &error.message)?;
    }

    Ok(())
}

fn write_summary_sheet(
    sheet: &mut Worksheet,
    errors: &[ValidationError],
    total_rows: usize,
) -> Result<()> {
    let mut errored_rows: Vec<usize> = errors.iter().map(|e| e.row).collect();
    errored_rows.sort_unstable();
    errored_rows.dedup();

    sheet.write_string(0, 0, "Rows parsed")?;
    sheet.write_number(0, 1, total_rows as f64)?;
    sheet.write_string(1, 0, "Rows with errors")?;
    sheet.write_number(1, 1, errored_rows.len() as f64)?;
    sheet.write_string(2, 0, "Total errors")?;
    sheet.write_number(2, 1, errors.len() as f64)?;

    Ok(())
}
