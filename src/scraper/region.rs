use crate::config::ScraperConfig;
use crate::scraper::extract::lookup;
use crate::scraper::fetcher::{html_to_text, Fetcher};
use crate::scraper::params::ParamValue;
use crate::scraper::ScraperError;
use serde_json::Value;
use std::fmt;
use tracing::debug;

pub const REGION_LOOKUP_PATH: &str = "/stingray/do/query-location";

/// Provider-internal region id for a zip, with the `<tag>_` prefix removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionHandle(String);

impl fmt::Display for RegionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<RegionHandle> for ParamValue {
    fn from(r: RegionHandle) -> Self {
        ParamValue::Text(r.0)
    }
}

pub fn region_lookup_url(config: &ScraperConfig, zip_code: &str) -> String {
    format!(
        "{}?location={}&v=2",
        config.endpoint(REGION_LOOKUP_PATH),
        zip_code
    )
}

/// Pull `payload.exactMatch.id` out of a location-query body.
/// Every kind of miss (no marker, bad JSON, missing key, no prefix) is `None`.
pub fn parse_region_id(text: &str) -> Option<RegionHandle> {
    let (_, json_text) = text.split_once("&&")?;
    let data: Value = serde_json::from_str(json_text.trim()).ok()?;
    let raw_id = lookup(&data, &["payload", "exactMatch", "id"])?.as_str()?;
    let (_, id) = raw_id.split_once('_')?;

    if id.is_empty() {
        return None;
    }
    Some(RegionHandle(id.to_string()))
}

/// Look a zip up against the provider.
/// `Ok(None)` means the provider has no exact match; `Err` is a transport failure.
pub fn resolve_region(
    fetcher: &dyn Fetcher,
    config: &ScraperConfig,
    zip_code: &str,
) -> Result<Option<RegionHandle>, ScraperError> {
    let body = fetcher.get_text(&region_lookup_url(config, zip_code))?;
    let region = parse_region_id(&html_to_text(&body));

    if region.is_none() {
        debug!(zip_code, "no exact region match");
    }
    Ok(region)
}
