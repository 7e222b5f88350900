use crate::config::ScraperConfig;
use crate::domain::schema::Column;
use crate::domain::{ListingKind, ListingRecord};
use crate::scraper::fetcher::truncate;
use crate::scraper::params::QueryParameters;
use crate::scraper::ScraperError;
use serde_json::{Map, Value};
use tracing::warn;

/// What differs between the sale and rental searches. The batch loop is shared.
pub trait ListingSource: Send + Sync {
    fn kind(&self) -> ListingKind;

    /// Path of the listing endpoint, relative to the configured base URL.
    fn api_path(&self) -> &'static str;

    /// Fixed options for every query; `region_id` is filled in per unit.
    fn default_params(&self) -> QueryParameters;

    /// Pull the JSON document out of the (already de-markuped) body.
    fn try_decode(&self, text: &str) -> Result<Value, ScraperError>;

    /// Flat records, one per home, in provider order.
    fn extract(&self, data: &Value) -> Vec<ListingRecord>;

    fn columns(&self) -> &'static [Column] {
        self.kind().columns()
    }

    fn api_url(&self, config: &ScraperConfig) -> String {
        config.endpoint(self.api_path())
    }

    /// Like `try_decode`, but a malformed payload is logged and treated as an empty object.
    fn decode(&self, text: &str) -> Value {
        match self.try_decode(text) {
            Ok(v) => v,
            Err(e) => {
                warn!(kind = %self.kind(), "malformed response: {e}");
                empty_object()
            }
        }
    }
}

pub fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// Parse `candidate` as JSON, keeping a short excerpt of the text on failure.
pub fn parse_json(candidate: &str) -> Result<Value, ScraperError> {
    serde_json::from_str(candidate).map_err(|e| {
        ScraperError::JsonParse(format!("{e}; near: {:?}", truncate(candidate, 500)))
    })
}
