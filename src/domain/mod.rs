pub mod listing;
pub mod schema;
pub mod scope;
pub mod table;

pub use listing::ListingKind;
pub use scope::{resolve_target_units, ScrapeScope, ZipCodeSource};
pub use table::{Cell, ListingRecord, ListingTable};
