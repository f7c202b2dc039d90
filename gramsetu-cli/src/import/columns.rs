//! The closed set of spreadsheet columns the resident importer understands

use std::fmt;

/// A recognized column in a resident import sheet.
///
/// Header matching is exact: no case folding, no trimming, no aliases.
/// Sheets are produced from the distributed template, so a mismatch means
/// the wrong file, not a typo worth guessing around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportColumn {
    Name,
    DateOfBirth,
    Gender,
    Email,
    Income,
    HouseDetails,
    WardNumber,
    Place,
    Locality,
    District,
    MobileNumber,
    AadhaarNumber,
    RationId,
    OwnsHouse,
}

impl ImportColumn {
    /// Every recognized column, in template order.
    pub const ALL: [ImportColumn; 14] = [
        ImportColumn::Name,
        ImportColumn::DateOfBirth,
        ImportColumn::Gender,
        ImportColumn::Email,
        ImportColumn::Income,
        ImportColumn::HouseDetails,
        ImportColumn::WardNumber,
        ImportColumn::Place,
        ImportColumn::Locality,
        ImportColumn::District,
        ImportColumn::MobileNumber,
        ImportColumn::AadhaarNumber,
        ImportColumn::RationId,
        ImportColumn::OwnsHouse,
    ];

    /// Columns a sheet must carry to be imported at all.
    pub const REQUIRED: [ImportColumn; 12] = [
        ImportColumn::Name,
        ImportColumn::DateOfBirth,
        ImportColumn::Gender,
        ImportColumn::Email,
        ImportColumn::HouseDetails,
        ImportColumn::WardNumber,
        ImportColumn::Place,
        ImportColumn::Locality,
        ImportColumn::District,
        ImportColumn::MobileNumber,
        ImportColumn::AadhaarNumber,
        ImportColumn::RationId,
    ];

    /// The exact header cell text for this column.
    pub fn header(&self) -> &'static str {
        match self {
            ImportColumn::Name => "Name",
            ImportColumn::DateOfBirth => "Date of Birth",
            ImportColumn::Gender => "Gender",
            ImportColumn::Email => "Email",
            ImportColumn::Income => "Income",
            ImportColumn::HouseDetails => "House Details",
            ImportColumn::WardNumber => "Ward Number",
            ImportColumn::Place => "Place",
            ImportColumn::Locality => "Locality",
            ImportColumn::District => "District",
            ImportColumn::MobileNumber => "Mobile Number",
            ImportColumn::AadhaarNumber => "Aadhaar Number",
            ImportColumn::RationId => "Ration ID",
            ImportColumn::OwnsHouse => "Owns House",
        }
    }

    /// Whether a sheet missing this column is rejected outright.
    pub fn is_required(&self) -> bool {
        !matches!(self, ImportColumn::Income | ImportColumn::OwnsHouse)
    }

    /// Exact-match lookup from a header cell.
    pub fn from_header(header: &str) -> Option<ImportColumn> {
        ImportColumn::ALL
            .iter()
            .copied()
            .find(|column| column.header() == header)
    }
}

impl fmt::Display for ImportColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.header())
    }
}
