use crate::domain::ListingKind;
use crate::errors::AppError;
use crate::scraper::BatchReport;
use rusqlite::{params, Connection};

#[derive(Debug)]
pub struct ScrapeRun {
    pub id: i64,
    pub kind: String,
    pub scope: String,
    pub started_at: i64,
    pub finished_at: Option<i64>,
    pub units_total: Option<i64>,
    pub units_with_records: Option<i64>,
    pub units_skipped: Option<i64>,
    pub records: Option<i64>,
    pub success: bool,
    pub error_message: Option<String>,
}

/// What gets written when a run ends.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub units_total: usize,
    pub units_with_records: usize,
    pub units_skipped: usize,
    pub records: usize,
    pub success: bool,
    pub error: Option<String>,
}

impl RunSummary {
    pub fn success(report: &BatchReport) -> Self {
        Self {
            units_total: report.units_total,
            units_with_records: report.units_with_records,
            units_skipped: report.skipped_count(),
            records: report.records,
            success: true,
            error: None,
        }
    }

    pub fn failure(error: String) -> Self {
        Self {
            error: Some(error),
            ..Default::default()
        }
    }
}

pub fn start_scrape_run(
    conn: &Connection,
    kind: ListingKind,
    scope: &str,
    now: i64,
) -> Result<i64, AppError> {
    conn.execute(
        "INSERT INTO scrape_runs (kind, scope, started_at, success) VALUES (?, ?, ?, 0)",
        params![kind.as_str(), scope, now],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn end_scrape_run(
    conn: &Connection,
    run_id: i64,
    now: i64,
    summary: &RunSummary,
) -> Result<(), AppError> {
    conn.execute(
        "UPDATE scrape_runs SET finished_at = ?, units_total = ?, units_with_records = ?, units_skipped = ?, records = ?, success = ?, error_message = ? WHERE id = ?",
        params![
            now,
            summary.units_total as i64,
            summary.units_with_records as i64,
            summary.units_skipped as i64,
            summary.records as i64,
            summary.success,
            summary.error,
            run_id
        ],
    )?;
    Ok(())
}

pub fn get_recent_scrapes(conn: &Connection) -> Result<Vec<ScrapeRun>, AppError> {
    let mut stmt = conn.prepare(
        "SELECT id, kind, scope, started_at, finished_at, units_total, units_with_records, units_skipped, records, success, error_message FROM scrape_runs ORDER BY id DESC LIMIT 50",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(ScrapeRun {
            id: row.get(0)?,
            kind: row.get(1)?,
            scope: row.get(2)?,
            started_at: row.get(3)?,
            finished_at: row.get(4)?,
            units_total: row.get(5)?,
            units_with_records: row.get(6)?,
            units_skipped: row.get(7)?,
            records: row.get(8)?,
            success: row.get(9)?,
            error_message: row.get(10)?,
        })
    })?;

    let mut runs = Vec::new();
    for r in rows {
        runs.push(r?);
    }
    Ok(runs)
}
