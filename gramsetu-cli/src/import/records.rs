//! Resident records, raw sheet rows, and the signup wire payload

use std::collections::HashMap;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// One decoded spreadsheet row: header text to cell text.
///
/// Produced by the Excel reader, consumed by the mapper, then dropped.
/// Cells are already stringified, so the mapper never sees cell types.
#[derive(Debug, Clone, Default)]
pub struct RawRow {
    cells: HashMap<String, String>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, header: impl Into<String>, value: impl Into<String>) {
        self.cells.insert(header.into(), value.into());
    }

    /// Cell text under a header; empty string when the cell or the whole
    /// column is absent.
    pub fn get(&self, header: &str) -> &str {
        self.cells.get(header).map(String::as_str).unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.cells.values().all(|value| value.trim().is_empty())
    }
}

/// Canonical per-person record produced by the mapper.
///
/// Field values are carried exactly as the sheet held them; validation runs
/// separately so record indices stay aligned with the parsed row order.
/// The last four fields are synthesized at mapping time, never read from
/// the sheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResidentRecord {
    pub name: String,
    pub date_of_birth: String,
    pub gender: String,
    pub email: String,
    pub income: Option<String>,
    pub house_details: String,
    pub ward_number: String,
    pub place: String,
    pub locality: String,
    pub district: String,
    pub mobile_no: String,
    pub aadhaar_no: String,
    pub ration_id: String,
    pub owns_home: Option<bool>,
    pub photo: String,
    pub mapped_house: String,
    pub username: String,
    pub password: String,
}

/// Wire form of one record for `POST /user/resident_signup`.
///
/// Field names follow the backend's JSON contract. The date of birth is
/// normalized on the copy; the stored record is never written back.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupPayload {
    pub name: String,
    pub date_of_birth: String,
    pub gender: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub income: Option<String>,
    pub house_details: String,
    pub ward_number: String,
    pub place: String,
    pub locality: String,
    pub district: String,
    pub mobile_no: String,
    pub aadhaar_no: String,
    pub ration_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_owner_home: Option<bool>,
    pub photo: String,
    pub mapped_house: String,
    pub username: String,
    pub password: String,
}

impl SignupPayload {
    /// Build the wire payload for one record.
    pub fn from_record(record: &ResidentRecord) -> Self {
        Self {
            name: record.name.clone(),
            date_of_birth: normalize_date_of_birth(&record.date_of_birth),
            gender: record.gender.clone(),
            email: record.email.clone(),
            income: record.income.clone(),
            house_details: record.house_details.clone(),
            ward_number: record.ward_number.clone(),
            place: record.place.clone(),
            locality: record.locality.clone(),
            district: record.district.clone(),
            mobile_no: record.mobile_no.clone(),
            aadhaar_no: record.aadhaar_no.clone(),
            ration_id: record.ration_id.clone(),
            is_owner_home: record.owns_home,
            photo: record.photo.clone(),
            mapped_house: record.mapped_house.clone(),
            username: record.username.clone(),
            password: record.password.clone(),
        }
    }
}

static SERIAL_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+(\.[0-9]+)?$").unwrap());

/// Formats tried for textual dates, day-first before month-first.
const DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%d.%m.%Y",
];

/// Normalize a date of birth to `YYYY-MM-DD` for submission.
///
/// Purely numeric values are treated as spreadsheet serial dates, counted
/// in days from 1899-12-30 with any fractional day discarded. Anything
/// else is tried against [`DATE_FORMATS`]. Values that fit neither pass
/// through unchanged; normalization never fails a record.
pub fn normalize_date_of_birth(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return raw.to_string();
    }

    if SERIAL_DATE.is_match(trimmed) {
        return match serial_to_date(trimmed) {
            Some(date) => date.format("%Y-%m-%d").to_string(),
            None => raw.to_string(),
        };
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return date.format("%Y-%m-%d").to_string();
        }
    }

    raw.to_string()
}

fn serial_to_date(value: &str) -> Option<NaiveDate> {
    let serial = value.parse::<f64>().ok()?;
    let days = chrono::Duration::try_days(serial.trunc() as i64)?;
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_signed(days)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_date_unix_epoch() {
        assert_eq!(normalize_date_of_birth("25569"), "1970-01-01");
    }

    #[test]
    fn test_serial_date_modern() {
        assert_eq!(normalize_date_of_birth("44927"), "2023-01-01");
    }

    #[test]
    fn test_serial_date_fraction_discarded() {
        assert_eq!(normalize_date_of_birth("44927.731"), "2023-01-01");
    }

    #[test]
    fn test_textual_date_day_first() {
        assert_eq!(normalize_date_of_birth("13/05/1998"), "1998-05-13");
        assert_eq!(normalize_date_of_birth("13-05-1998"), "1998-05-13");
        assert_eq!(normalize_date_of_birth("13.05.1998"), "1998-05-13");
    }

    #[test]
    fn test_textual_date_month_first_fallback() {
        // Day-first cannot hold a 13th month, so the US format catches it.
        assert_eq!(normalize_date_of_birth("05/13/1998"), "1998-05-13");
    }

    #[test]
    fn test_iso_date_passes_through_normalized() {
        assert_eq!(normalize_date_of_birth("1998-05-13"), "1998-05-13");
        assert_eq!(normalize_date_of_birth("1998/05/13"), "1998-05-13");
    }

    #[test]
    fn test_unparseable_date_is_untouched() {
        assert_eq!(normalize_date_of_birth("born in 1998"), "born in 1998");
        assert_eq!(normalize_date_of_birth(""), "");
        assert_eq!(normalize_date_of_birth("31/02/1998"), "31/02/1998");
    }

    #[test]
    fn test_absurd_serial_is_untouched() {
        assert_eq!(
            normalize_date_of_birth("999999999999999999"),
            "999999999999999999"
        );
    }

    #[test]
    fn test_raw_row_missing_cell_is_empty() {
        let mut row = RawRow::new();
        row.insert("Name", "Anu");
        assert_eq!(row.get("Name"), "Anu");
        assert_eq!(row.get("Email"), "");
        assert!(!row.is_empty());
        assert!(RawRow::new().is_empty());
    }

    #[test]
    fn test_payload_uses_backend_field_names() {
        let record = ResidentRecord {
            name: "Anu Krishnan".into(),
            date_of_birth: "25569".into(),
            mobile_no: "9876543210".into(),
            owns_home: Some(true),
            ..Default::default()
        };

        let payload = SignupPayload::from_record(&record);
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["name"], "Anu Krishnan");
        assert_eq!(json["dateOfBirth"], "1970-01-01");
        assert_eq!(json["mobileNo"], "9876543210");
        assert_eq!(json["isOwnerHome"], true);
        assert!(json.get("income").is_none());
        assert!(json.get("mappedHouse").is_some());
        assert!(json.get("aadhaarNo").is_some());
        assert!(json.get("rationId").is_some());
    }

    #[test]
    fn test_payload_leaves_record_untouched() {
        let record = ResidentRecord {
            date_of_birth: "13/05/1998".into(),
            ..Default::default()
        };
        let before = record.clone();

        let payload = SignupPayload::from_record(&record);

        assert_eq!(payload.date_of_birth, "1998-05-13");
        assert_eq!(record, before);
    }
}
