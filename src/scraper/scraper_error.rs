use thiserror::Error;

/// Failures below the orchestrator. None of these reach the caller of a batch;
/// they decide which `SkipReason` a unit gets.
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Blocked by site: {0}")]
    Blocked(String),
    #[error("Missing separator: {0}")]
    MissingSeparator(String),
    #[error("JSON parse error: {0}")]
    JsonParse(String),
}

impl ScraperError {
    /// Transport-level failures worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ScraperError::Network(_) | ScraperError::Blocked(_))
    }
}
