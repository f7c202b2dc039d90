//! Map raw sheet rows onto resident records

use rand::Rng;

use crate::import::columns::ImportColumn;
use crate::import::records::{RawRow, ResidentRecord};

/// Placeholder portrait every imported resident starts with.
const DEFAULT_PHOTO_URL: &str = "https://placehold.co/128x128/png";

/// Fallback map point for imported households (10.8505 N, 76.2711 E,
/// central Kerala). Field work replaces it after the visit.
const DEFAULT_LATITUDE: f64 = 10.8505;
const DEFAULT_LONGITUDE: f64 = 76.2711;

/// Symbols a synthesized password ends with.
const PASSWORD_SYMBOLS: &[u8] = b"!@#$%^&*";

/// Alphabet for password fragments.
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of each random password fragment.
const FRAGMENT_LEN: usize = 8;

/// Longest name part a synthesized username keeps.
const USERNAME_NAME_CAP: usize = 10;

/// Map parsed rows onto resident records, preserving order.
pub fn map_rows(rows: &[RawRow]) -> Vec<ResidentRecord> {
    rows.iter().map(map_row).collect()
}

/// Map one raw row onto a record.
///
/// Every recognized column is copied independently of the others; only the
/// username combines two columns. Mapping never rejects a row, bad values
/// are caught by validation afterwards.
pub fn map_row(row: &RawRow) -> ResidentRecord {
    let mut record = ResidentRecord::default();

    for column in ImportColumn::ALL {
        let value = row.get(column.header());
        match column {
            ImportColumn::Name => record.name = value.to_string(),
            ImportColumn::DateOfBirth => record.date_of_birth = value.to_string(),
            ImportColumn::Gender => record.gender = value.to_string(),
            ImportColumn::Email => record.email = value.to_string(),
            ImportColumn::Income => record.income = optional(value),
            ImportColumn::HouseDetails => record.house_details = value.to_string(),
            ImportColumn::WardNumber => record.ward_number = value.to_string(),
            ImportColumn::Place => record.place = value.to_string(),
            ImportColumn::Locality => record.locality = value.to_string(),
            ImportColumn::District => record.district = value.to_string(),
            ImportColumn::MobileNumber => record.mobile_no = value.to_string(),
            ImportColumn::AadhaarNumber => record.aadhaar_no = value.to_string(),
            ImportColumn::RationId => record.ration_id = value.to_string(),
            ImportColumn::OwnsHouse => record.owns_home = parse_owner_flag(value),
        }
    }

    record.photo = DEFAULT_PHOTO_URL.to_string();
    record.mapped_house = default_mapped_house();
    record.username = derive_username(&record.name, &record.mobile_no);
    record.password = generate_password();
    record
}

/// Derive a username from the resident's name and mobile number.
///
/// Pure function of its inputs: lowercase the name, collapse whitespace
/// runs to single underscores, cap at [`USERNAME_NAME_CAP`] characters,
/// then append an underscore and the first four characters of the mobile
/// number. Collisions are possible; uniqueness is enforced backend-side.
pub fn derive_username(name: &str, mobile_no: &str) -> String {
    let lowered = name.to_lowercase();
    let joined = lowered.split_whitespace().collect::<Vec<_>>().join("_");
    let capped: String = joined.chars().take(USERNAME_NAME_CAP).collect();
    let prefix: String = mobile_no.chars().take(4).collect();
    format!("{}_{}", capped, prefix)
}

/// Synthesize a first-login password: an eight character lowercase
/// base-36 fragment, an eight character uppercase one, and one symbol.
/// Draws are independent per record.
pub fn generate_password() -> String {
    let mut rng = rand::rng();
    let mut password = String::with_capacity(FRAGMENT_LEN * 2 + 1);

    for _ in 0..FRAGMENT_LEN {
        password.push(BASE36[rng.random_range(0..BASE36.len())] as char);
    }
    for _ in 0..FRAGMENT_LEN {
        let c = BASE36[rng.random_range(0..BASE36.len())] as char;
        password.push(c.to_ascii_uppercase());
    }
    password.push(PASSWORD_SYMBOLS[rng.random_range(0..PASSWORD_SYMBOLS.len())] as char);

    password
}

/// JSON-encoded fallback location. The key spelling is load-bearing: map
/// screens elsewhere in the platform pull coordinates out of this string
/// by the `Latitude`/`Longitude` keys.
fn default_mapped_house() -> String {
    serde_json::json!({
        "Latitude": DEFAULT_LATITUDE,
        "Longitude": DEFAULT_LONGITUDE,
    })
    .to_string()
}

/// Parse an ownership flag cell. Unrecognized values map to `None`
/// rather than a guess.
fn parse_owner_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "yes" | "true" | "y" | "1" => Some(true),
        "no" | "false" | "n" | "0" => Some(false),
        _ => None,
    }
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
