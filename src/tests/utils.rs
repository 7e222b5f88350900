use crate::config::ScraperConfig;
use crate::db::connection::{init_db, Database};
use crate::scraper::{Fetcher, RedfinScraper, ScraperError};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// Canned responses keyed by URL substring, with a log of every URL requested.
#[derive(Clone, Default)]
pub struct FakeFetcher {
    routes: Arc<Mutex<Vec<(String, Result<String, String>)>>>,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, url_part: &str, body: &str) -> Self {
        self.routes
            .lock()
            .unwrap()
            .push((url_part.to_string(), Ok(body.to_string())));
        self
    }

    pub fn fail(self, url_part: &str, msg: &str) -> Self {
        self.routes
            .lock()
            .unwrap()
            .push((url_part.to_string(), Err(msg.to_string())));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Fetcher for FakeFetcher {
    fn get_text(&self, url: &str) -> Result<String, ScraperError> {
        self.calls.lock().unwrap().push(url.to_string());
        let routes = self.routes.lock().unwrap();
        match routes.iter().find(|(part, _)| url.contains(part.as_str())) {
            Some((_, Ok(body))) => Ok(body.clone()),
            Some((_, Err(msg))) => Err(ScraperError::Network(msg.clone())),
            None => Err(ScraperError::Network(format!("no route for {url}"))),
        }
    }
}

pub fn test_config() -> ScraperConfig {
    ScraperConfig {
        request_delay: Duration::ZERO,
        ..ScraperConfig::default()
    }
}

pub fn make_scraper(fetcher: &FakeFetcher, workers: usize) -> RedfinScraper {
    let config = ScraperConfig {
        workers,
        ..test_config()
    };
    RedfinScraper::with_fetcher(config, Box::new(fetcher.clone()))
}

/// Body the region endpoint returns for an exact match.
pub fn region_body(id: &str) -> String {
    format!(r#"{{}}&&{{"version":1,"payload":{{"exactMatch":{{"id":"2_{id}","name":"x"}}}}}}"#)
}

/// Sale search body with one home per `(property_id, city)`.
pub fn sale_body(homes: &[(i64, &str)]) -> String {
    let homes: Vec<String> = homes
        .iter()
        .map(|(id, city)| {
            format!(
                r#"{{"propertyId":{id},"listingId":"{id}0","price":{{"value":"350000"}},"beds":3,"baths":2,"city":"{city}","latLong":{{"value":{{"latitude":40.1,"longitude":-111.7}}}}}}"#
            )
        })
        .collect();
    format!(
        r#"{{}}&&{{"version":1,"payload":{{"homes":[{}]}}}}"#,
        homes.join(",")
    )
}

/// Fresh database on disk; keep the `TempDir` alive for the test's duration.
pub fn init_test_db() -> (TempDir, Database) {
    let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir failed: {e}"));
    let db = Database::new(dir.path().join("test_db.sqlite").to_string_lossy().to_string());
    init_db(&db).unwrap_or_else(|e| panic!("Database initialization failed: {e}"));
    (dir, db)
}
