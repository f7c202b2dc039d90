//! Field-level validation of mapped resident records

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::import::columns::ImportColumn;
use crate::import::records::ResidentRecord;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
static MOBILE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[2-9][0-9]{9}$").unwrap());
static AADHAAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{12}$").unwrap());
static RATION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{10}$").unwrap());

/// One failed field rule, addressed by record position and sheet column.
///
/// `row` is the zero-based index into the mapped record sequence. It stays
/// meaningful as long as the sequence is not reordered, which nothing in
/// the import pipeline does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub row: usize,
    pub column: ImportColumn,
    pub message: String,
}

impl ValidationError {
    pub fn new(row: usize, column: ImportColumn, message: impl Into<String>) -> Self {
        Self {
            row,
            column,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "row {}, {}: {}",
            self.row + 1,
            self.column.header(),
            self.message
        )
    }
}

/// Validate every record against the field rules.
///
/// Pure and idempotent: the same records always yield the same errors, in
/// row order. Every rule runs for every row, so one record can contribute
/// several errors and no failure short-circuits another.
pub fn validate_records(records: &[ResidentRecord]) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (row, record) in records.iter().enumerate() {
        if record.name.trim().is_empty() {
            errors.push(ValidationError::new(
                row,
                ImportColumn::Name,
                "Name is required",
            ));
        }
        if !EMAIL_RE.is_match(&record.email) {
            errors.push(ValidationError::new(
                row,
                ImportColumn::Email,
                "Invalid email address",
            ));
        }
        if !MOBILE_RE.is_match(&record.mobile_no) {
            errors.push(ValidationError::new(
                row,
                ImportColumn::MobileNumber,
                "Mobile number must be 10 digits starting with 2-9",
            ));
        }
        if !AADHAAR_RE.is_match(&record.aadhaar_no) {
            errors.push(ValidationError::new(
                row,
                ImportColumn::AadhaarNumber,
                "Aadhaar number must be exactly 12 digits",
            ));
        }
        if !RATION_RE.is_match(&record.ration_id) {
            errors.push(ValidationError::new(
                row,
                ImportColumn::RationId,
                "Ration ID must be exactly 10 digits",
            ));
        }
    }

    errors
}
