// errors.rs
use thiserror::Error;

/// Errors that terminate a batch or the process.
/// Per-unit failures never show up here; they are absorbed into the batch report.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid scope: {0}")]
    InvalidScope(String),
    #[error("Database error: {0}")]
    DbError(String),
    #[error("Config error: {0}")]
    Config(String),
    #[error("Export error: {0}")]
    XlsxError(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> Self {
        AppError::DbError(e.to_string())
    }
}
