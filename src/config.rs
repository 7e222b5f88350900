// config.rs
use crate::errors::AppError;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://www.redfin.com";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";
pub const MAX_WORKERS: usize = 8;

/// Runtime settings, read from the environment (and `.env` if present).
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub base_url: Url,
    pub db_path: String,
    pub user_agent: String,
    pub timeout: Duration,
    pub max_attempts: u32,
    pub workers: usize,
    pub request_delay: Duration,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base url is valid"),
            db_path: "scraper.sqlite3".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            max_attempts: 3,
            workers: 1,
            request_delay: Duration::from_millis(250),
        }
    }
}

impl ScraperConfig {
    pub fn from_env() -> Result<Self, AppError> {
        // Missing .env is fine; real env vars still apply.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup so tests don't have to touch process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(raw) = lookup("REDFIN_BASE_URL") {
            cfg.base_url = Url::parse(raw.trim())
                .map_err(|e| AppError::Config(format!("REDFIN_BASE_URL: {e}")))?;
        }
        if let Some(path) = lookup("SCRAPER_DB_PATH") {
            cfg.db_path = path;
        }
        if let Some(ua) = lookup("SCRAPER_USER_AGENT") {
            cfg.user_agent = ua;
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "SCRAPER_TIMEOUT_SECS")? {
            cfg.timeout = Duration::from_secs(secs);
        }
        if let Some(n) = parse_var::<u32>(&lookup, "SCRAPER_MAX_ATTEMPTS")? {
            cfg.max_attempts = n.max(1);
        }
        if let Some(n) = parse_var::<usize>(&lookup, "SCRAPER_WORKERS")? {
            cfg.workers = n;
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "SCRAPER_REQUEST_DELAY_MS")? {
            cfg.request_delay = Duration::from_millis(ms);
        }

        cfg.workers = clamp_workers(cfg.workers);
        Ok(cfg)
    }

    /// `{base}/stingray/...` with any trailing slash on the base dropped.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
    }
}

pub fn clamp_workers(n: usize) -> usize {
    n.clamp(1, MAX_WORKERS)
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, AppError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| AppError::Config(format!("{key} is not a valid number: {raw:?}"))),
    }
}
