//! Excel I/O for the import pipeline

pub mod reader;
pub mod report;

pub use reader::parse_residents_xlsx;
pub use report::write_validation_report;
