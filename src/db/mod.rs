pub mod connection;
pub mod scrapes;
pub mod zipcodes;

pub use zipcodes::{parse_zip_csv, save_zip_mappings};
