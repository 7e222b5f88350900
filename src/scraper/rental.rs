use crate::domain::{ListingKind, ListingRecord};
use crate::scraper::extract::extract_records;
use crate::scraper::params::{ParamValue, QueryParameters};
use crate::scraper::source::{parse_json, ListingSource};
use crate::scraper::ScraperError;
use serde_json::Value;

pub const RENTAL_API_PATH: &str = "/stingray/api/v1/search/rentals";

/// Rentals (`/stingray/api/v1/search/rentals`). The whole body is the document.
#[derive(Debug, Default, Clone, Copy)]
pub struct RentalSource;

impl ListingSource for RentalSource {
    fn kind(&self) -> ListingKind {
        ListingKind::Rental
    }

    fn api_path(&self) -> &'static str {
        RENTAL_API_PATH
    }

    fn default_params(&self) -> QueryParameters {
        QueryParameters::new()
            .with("al", 1)
            .with("isRentals", "true")
            .with("include_nearby_homes", "false")
            .with("num_homes", 350)
            .with("ord", "days-on-redfin-asc")
            .with("page_number", 1)
            .with("sf", "1,2,3,4,5,6,7")
            .with("status", 9)
            .with("uipt", "1,3,4")
            .with("v", 8)
            .with("region_type", 2)
            .with("region_id", ParamValue::Absent)
    }

    fn try_decode(&self, text: &str) -> Result<Value, ScraperError> {
        parse_json(text.trim())
    }

    fn extract(&self, data: &Value) -> Vec<ListingRecord> {
        extract_records(data, &["homes"], self.columns())
    }
}
