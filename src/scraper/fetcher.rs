// fetcher.rs
use crate::config::ScraperConfig;
use crate::scraper::ScraperError;
use rand::Rng;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use scraper::Html;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// One blocking GET returning the response body as text.
pub trait Fetcher: Send + Sync {
    fn get_text(&self, url: &str) -> Result<String, ScraperError>;
}

pub struct HttpFetcher {
    client: Client,
    max_attempts: u32,
}

impl HttpFetcher {
    pub fn new(config: &ScraperConfig) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(|e| ScraperError::Network(e.to_string()))?;

        Ok(Self {
            client,
            max_attempts: config.max_attempts.max(1),
        })
    }

    fn try_get_text(&self, url: &str) -> Result<String, ScraperError> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| ScraperError::Network(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .map_err(|e| ScraperError::Network(e.to_string()))?;

        check_status(status, text)
    }
}

impl Fetcher for HttpFetcher {
    fn get_text(&self, url: &str) -> Result<String, ScraperError> {
        with_retries(
            self.max_attempts,
            |attempt| {
                let start = Instant::now();
                let result = self.try_get_text(url);
                match &result {
                    Ok(_) => debug!(attempt, elapsed = ?start.elapsed(), url, "fetched"),
                    Err(e) => warn!(attempt, elapsed = ?start.elapsed(), url, "⚠️ request failed: {e}"),
                }
                result
            },
            std::thread::sleep,
        )
    }
}

fn check_status(status: StatusCode, text: String) -> Result<String, ScraperError> {
    if status.is_success() {
        Ok(text)
    } else if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
        Err(ScraperError::Blocked(format!("HTTP {status}")))
    } else {
        Err(ScraperError::Network(format!(
            "HTTP {status}: {}",
            truncate(&text, 200)
        )))
    }
}

const MAX_BACKOFF_SECS: u64 = 10;
const JITTER_MAX_MS: u64 = 1000;

/// 2s, 4s, 8s, then capped at 10s.
fn backoff_base(attempt: u32) -> Duration {
    Duration::from_secs((1u64 << attempt.min(4)).min(MAX_BACKOFF_SECS))
}

/// Run `op` up to `max_attempts` times, sleeping between retryable failures.
/// Non-retryable errors are returned immediately.
fn with_retries<T, F, S>(max_attempts: u32, mut op: F, mut sleep: S) -> Result<T, ScraperError>
where
    F: FnMut(u32) -> Result<T, ScraperError>,
    S: FnMut(Duration),
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt) {
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                let jitter = rand::thread_rng().gen_range(0..=JITTER_MAX_MS);
                sleep(backoff_base(attempt) + Duration::from_millis(jitter));
                attempt += 1;
            }
            result => return result,
        }
    }
}

/// Text content of a response body with any markup stripped.
/// Bodies are sometimes served as HTML around the JSON we want.
pub fn html_to_text(body: &str) -> String {
    Html::parse_document(body).root_element().text().collect()
}

/// First `max` chars, for log lines.
pub fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_markup_around_json() {
        let body = r#"<html><body><pre>{}&&{"payload":{}}</pre></body></html>"#;
        assert_eq!(html_to_text(body), r#"{}&&{"payload":{}}"#);
    }

    #[test]
    fn plain_text_passes_through() {
        let body = r#"{"homes":[{"homeData":{"url":"/UT/Provo/home/1"}}]}"#;
        assert_eq!(html_to_text(body), body);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("hi", 10), "hi");
    }

    #[test]
    fn blocked_and_server_errors_are_classified() {
        assert!(matches!(
            check_status(StatusCode::FORBIDDEN, String::new()),
            Err(ScraperError::Blocked(_))
        ));
        assert!(matches!(
            check_status(StatusCode::TOO_MANY_REQUESTS, String::new()),
            Err(ScraperError::Blocked(_))
        ));
        assert!(matches!(
            check_status(StatusCode::BAD_GATEWAY, "upstream down".into()),
            Err(ScraperError::Network(msg)) if msg.contains("502") && msg.contains("upstream down")
        ));
        assert_eq!(check_status(StatusCode::OK, "ok".into()).unwrap(), "ok");
    }

    #[test]
    fn only_transport_errors_are_retryable() {
        assert!(ScraperError::Network("reset".into()).is_retryable());
        assert!(ScraperError::Blocked("HTTP 429".into()).is_retryable());
        assert!(!ScraperError::MissingSeparator("x".into()).is_retryable());
        assert!(!ScraperError::JsonParse("x".into()).is_retryable());
    }

    #[test]
    fn blocked_is_retried_until_success() {
        let mut calls = 0;
        let mut sleeps = Vec::new();
        let result = with_retries(
            3,
            |attempt| {
                calls += 1;
                if attempt < 3 {
                    Err(ScraperError::Blocked("HTTP 429".into()))
                } else {
                    Ok("body")
                }
            },
            |d| sleeps.push(d),
        );

        assert_eq!(result.unwrap(), "body");
        assert_eq!(calls, 3);
        assert_eq!(sleeps.len(), 2);
        assert!(sleeps[0] >= Duration::from_secs(2) && sleeps[0] <= Duration::from_millis(3000));
        assert!(sleeps[1] >= Duration::from_secs(4) && sleeps[1] <= Duration::from_millis(5000));
    }

    #[test]
    fn network_error_gives_up_after_max_attempts() {
        let mut calls = 0;
        let mut sleeps = 0;
        let result: Result<(), _> = with_retries(
            3,
            |_| {
                calls += 1;
                Err(ScraperError::Network("HTTP 503".into()))
            },
            |_| sleeps += 1,
        );

        assert!(matches!(result, Err(ScraperError::Network(_))));
        assert_eq!(calls, 3);
        assert_eq!(sleeps, 2);
    }

    #[test]
    fn non_retryable_error_returns_at_once() {
        let mut calls = 0;
        let mut sleeps = 0;
        let result: Result<(), _> = with_retries(
            5,
            |_| {
                calls += 1;
                Err(ScraperError::JsonParse("bad".into()))
            },
            |_| sleeps += 1,
        );

        assert!(matches!(result, Err(ScraperError::JsonParse(_))));
        assert_eq!(calls, 1);
        assert_eq!(sleeps, 0);
    }

    #[test]
    fn zero_attempts_still_tries_once() {
        let mut calls = 0;
        let result = with_retries(
            0,
            |_| {
                calls += 1;
                Ok::<_, ScraperError>(1)
            },
            |_| {},
        );
        assert_eq!(result.unwrap(), 1);
        assert_eq!(calls, 1);
    }

    #[test]
    fn backoff_doubles_then_caps() {
        let secs: Vec<u64> = (1..=5).map(|a| backoff_base(a).as_secs()).collect();
        assert_eq!(secs, vec![2, 4, 8, 10, 10]);
    }
}
