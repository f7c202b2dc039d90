//! Bulk resident import pipeline
//!
//! Strict forward flow: acquire workbook bytes, parse the sheet, map rows
//! onto resident records, validate, then submit in batches once the review
//! gate is passed. No stage reaches back into an earlier one.

pub mod columns;
pub mod excel;
pub mod mapper;
pub mod records;
pub mod submit;
pub mod validate;

pub use columns::ImportColumn;
pub use records::{RawRow, ResidentRecord, SignupPayload};
pub use submit::{BatchSubmitter, DEFAULT_BATCH_SIZE, SubmitOptions, SubmitSummary};
pub use validate::ValidationError;

use anyhow::{Result, bail};
use log::info;

/// One review-and-submit session over a parsed sheet.
///
/// Records and errors are fixed at load time. Views like the errors-only
/// preview are derived on demand so they always agree with the error set.
#[derive(Debug)]
pub struct ImportSession {
    records: Vec<ResidentRecord>,
    errors: Vec<ValidationError>,
}

impl ImportSession {
    /// Run parse, map and validate over workbook bytes.
    pub fn load(bytes: &[u8]) -> Result<Self> {
        let rows = excel::parse_residents_xlsx(bytes)?;
        let records = mapper::map_rows(&rows);
        Ok(Self::from_records(records))
    }

    /// Build a session from already-mapped records.
    pub fn from_records(records: Vec<ResidentRecord>) -> Self {
        let errors = validate::validate_records(&records);
        info!(
            "loaded {} records, {} validation errors",
            records.len(),
            errors.len()
        );
        Self { records, errors }
    }

    pub fn records(&self) -> &[ResidentRecord] {
        &self.records
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Zero-based indices of rows carrying at least one error, ascending,
    /// each row once.
    pub fn errored_rows(&self) -> Vec<usize> {
        let mut rows: Vec<usize> = self.errors.iter().map(|e| e.row).collect();
        rows.sort_unstable();
        rows.dedup();
        rows
    }

    /// Rows for the review table: the whole sheet, or only rows that carry
    /// errors. Indices are the same in both views.
    pub fn preview_rows(&self, errors_only: bool) -> Vec<(usize, &ResidentRecord)> {
        if errors_only {
            self.errored_rows()
                .into_iter()
                .filter_map(|row| self.records.get(row).map(|record| (row, record)))
                .collect()
        } else {
            self.records.iter().enumerate().collect()
        }
    }

    /// Submission is allowed only once the sheet validates cleanly.
    pub fn can_submit(&self) -> bool {
        self.errors.is_empty()
    }

    /// The review gate: an error describing the outstanding problems, or
    /// `Ok` when the sheet may be submitted.
    pub fn ensure_submittable(&self) -> Result<()> {
        if !self.can_submit() {
            bail!(
                "{} validation error(s) across {} row(s); fix the sheet and re-run",
                self.errors.len(),
                self.errored_rows().len()
            );
        }
        Ok(())
    }
}
