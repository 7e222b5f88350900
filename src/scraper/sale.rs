use crate::domain::{ListingKind, ListingRecord};
use crate::scraper::extract::extract_records;
use crate::scraper::params::{ParamValue, QueryParameters};
use crate::scraper::source::{parse_json, ListingSource};
use crate::scraper::ScraperError;
use serde_json::Value;

pub const SALE_API_PATH: &str = "/stingray/api/gis";

/// Homes for sale (`/stingray/api/gis`).
/// Body is `{}&&{json}`; the document is the segment after the marker.
#[derive(Debug, Default, Clone, Copy)]
pub struct SaleSource;

impl ListingSource for SaleSource {
    fn kind(&self) -> ListingKind {
        ListingKind::Sale
    }

    fn api_path(&self) -> &'static str {
        SALE_API_PATH
    }

    fn default_params(&self) -> QueryParameters {
        QueryParameters::new()
            .with("al", 1)
            .with("include_nearby_homes", "false")
            .with("num_homes", 350)
            .with("ord", "days-on-redfin-asc")
            .with("page_number", 1)
            .with("sf", "1,2,3,4,5,6,7")
            .with("status", 9)
            .with("uipt", "1,3")
            .with("v", 8)
            .with("region_type", 2)
            .with("region_id", ParamValue::Absent)
    }

    fn try_decode(&self, text: &str) -> Result<Value, ScraperError> {
        let segment = text.split("&&").nth(1).ok_or_else(|| {
            ScraperError::MissingSeparator("no '&&' marker in sale response".into())
        })?;
        parse_json(segment.trim())
    }

    fn extract(&self, data: &Value) -> Vec<ListingRecord> {
        extract_records(data, &["payload", "homes"], self.columns())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Cell;
    use serde_json::json;

    #[test]
    fn decode_takes_segment_after_marker() {
        let v = SaleSource.decode(r#"xyz&&{"payload":{"homes":[]}}"#);
        assert_eq!(v, json!({"payload": {"homes": []}}));
    }

    #[test]
    fn decode_without_marker_is_empty() {
        assert_eq!(SaleSource.decode(r#"{"payload":{"homes":[]}}"#), json!({}));
        assert!(matches!(
            SaleSource.try_decode("no marker here"),
            Err(ScraperError::MissingSeparator(_))
        ));
    }

    #[test]
    fn decode_bad_json_is_empty() {
        assert_eq!(SaleSource.decode("{}&&{not json"), json!({}));
        assert!(matches!(
            SaleSource.try_decode("{}&&{not json"),
            Err(ScraperError::JsonParse(_))
        ));
    }

    #[test]
    fn default_params_serialize_without_region() {
        let qs = SaleSource.default_params().to_query_string();
        assert_eq!(
            qs,
            "al=1&include_nearby_homes=false&num_homes=350&ord=days-on-redfin-asc\
             &page_number=1&sf=1,2,3,4,5,6,7&status=9&uipt=1,3&v=8&region_type=2"
        );
    }

    #[test]
    fn extract_reads_nested_value_wrappers() {
        let data = json!({
            "payload": {"homes": [{
                "propertyId": 123,
                "listingId": 456,
                "mlsId": {"value": "A1"},
                "price": {"value": 500000},
                "beds": 3,
                "baths": 2.5,
                "latLong": {"value": {"latitude": 40.2, "longitude": -111.6}},
                "postalCode": {"value": "84604"},
                "city": "Provo"
            }]}
        });

        let rows = SaleSource.extract(&data);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        let cols = SaleSource.columns();
        let at = |name: &str| &row[cols.iter().position(|c| c.name == name).unwrap()];

        assert_eq!(row.len(), 23);
        assert_eq!(at("property_id"), &Cell::Int(123));
        assert_eq!(at("mls_id"), &Cell::Text("A1".into()));
        assert_eq!(at("price"), &Cell::Int(500000));
        assert_eq!(at("bathrooms"), &Cell::Float(2.5));
        assert_eq!(at("latitude"), &Cell::Float(40.2));
        assert_eq!(at("zip_code"), &Cell::Text("84604".into()));
        assert_eq!(at("hoa_fee"), &Cell::Null);
        assert_eq!(at("year_built"), &Cell::Null);
    }
}
