use crate::domain::schema::{Column, RENTAL_COLUMNS, SALE_COLUMNS};
use serde::Serialize;
use std::fmt;

/// Which search a table came from. Each kind has its own endpoint, payload shape and columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingKind {
    Sale,
    Rental,
}

impl ListingKind {
    pub fn columns(self) -> &'static [Column] {
        match self {
            ListingKind::Sale => SALE_COLUMNS,
            ListingKind::Rental => RENTAL_COLUMNS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ListingKind::Sale => "sale",
            ListingKind::Rental => "rental",
        }
    }
}

impl fmt::Display for ListingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
