// scraper.rs
use crate::config::ScraperConfig;
use crate::db::connection::Database;
use crate::db::scrapes::{end_scrape_run, start_scrape_run, RunSummary};
use crate::domain::{resolve_target_units, ListingTable, ScrapeScope, ZipCodeSource};
use crate::errors::AppError;
use crate::scraper::fetcher::{html_to_text, Fetcher, HttpFetcher};
use crate::scraper::region::resolve_region;
use crate::scraper::source::ListingSource;
use crate::scraper::ScraperError;
use chrono::Utc;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Why a zip contributed no rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NoRegion,
    Network(String),
    Malformed(String),
    NoListings,
    Cancelled,
}

impl SkipReason {
    pub fn label(&self) -> &'static str {
        match self {
            SkipReason::NoRegion => "no_region",
            SkipReason::Network(_) => "network",
            SkipReason::Malformed(_) => "malformed",
            SkipReason::NoListings => "no_listings",
            SkipReason::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Network(msg) | SkipReason::Malformed(msg) => {
                write!(f, "{}: {msg}", self.label())
            }
            _ => f.write_str(self.label()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedUnit {
    pub zip_code: String,
    pub reason: SkipReason,
}

/// Per-batch accounting. Skips are never errors, but they are never silent either.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub units_total: usize,
    pub units_with_records: usize,
    pub records: usize,
    pub skipped: Vec<SkippedUnit>,
}

impl BatchReport {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// `(label, count)` for each reason seen, in first-seen order.
    pub fn skip_counts(&self) -> Vec<(&'static str, usize)> {
        let mut counts: Vec<(&'static str, usize)> = Vec::new();
        for s in &self.skipped {
            let label = s.reason.label();
            match counts.iter_mut().find(|(l, _)| *l == label) {
                Some((_, n)) => *n += 1,
                None => counts.push((label, 1)),
            }
        }
        counts
    }
}

#[derive(Debug)]
pub struct BatchOutcome {
    pub table: ListingTable,
    pub report: BatchReport,
}

/// Shared stop switch. Units not yet started when it is set are skipped as `Cancelled`.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub enum UnitOutcome {
    Records(ListingTable),
    Skipped(SkipReason),
}

/// Logs at 25/50/75% of units completed.
struct Progress {
    total: usize,
    marks: [usize; 3],
    done: AtomicUsize,
}

impl Progress {
    fn new(total: usize) -> Self {
        Self {
            total,
            marks: [total / 4, total / 2, total * 3 / 4],
            done: AtomicUsize::new(0),
        }
    }

    fn tick(&self) {
        let n = self.done.fetch_add(1, Ordering::SeqCst) + 1;
        if self.marks.contains(&n) {
            let pct = n * 100 / self.total;
            info!("Processing {pct}% done ({n}/{} zip codes)", self.total);
        }
    }
}

pub struct RedfinScraper {
    fetcher: Box<dyn Fetcher>,
    config: ScraperConfig,
}

impl RedfinScraper {
    pub fn new(config: ScraperConfig) -> Result<Self, ScraperError> {
        let fetcher = HttpFetcher::new(&config)?;
        Ok(Self::with_fetcher(config, Box::new(fetcher)))
    }

    pub fn with_fetcher(config: ScraperConfig, fetcher: Box<dyn Fetcher>) -> Self {
        Self { fetcher, config }
    }

    fn pause(&self) {
        if !self.config.request_delay.is_zero() {
            std::thread::sleep(self.config.request_delay);
        }
    }

    /// Resolve, query, decode and extract one zip. Never fails; failures become a skip reason.
    pub fn scrape_zip(&self, source: &dyn ListingSource, zip_code: &str) -> UnitOutcome {
        self.pause();
        let region = match resolve_region(self.fetcher.as_ref(), &self.config, zip_code) {
            Ok(Some(region)) => region,
            Ok(None) => return UnitOutcome::Skipped(SkipReason::NoRegion),
            Err(e) => {
                warn!(zip_code, "region lookup failed: {e}");
                return UnitOutcome::Skipped(SkipReason::Network(e.to_string()));
            }
        };

        let mut params = source.default_params();
        params.set("region_id", region);
        let url = format!("{}?{}", source.api_url(&self.config), params.to_query_string());

        self.pause();
        let body = match self.fetcher.get_text(&url) {
            Ok(body) => body,
            Err(e) => {
                warn!(zip_code, "listing query failed: {e}");
                return UnitOutcome::Skipped(SkipReason::Network(e.to_string()));
            }
        };

        let data = match source.try_decode(&html_to_text(&body)) {
            Ok(data) => data,
            Err(e) => {
                warn!(zip_code, kind = %source.kind(), "malformed response: {e}");
                return UnitOutcome::Skipped(SkipReason::Malformed(e.to_string()));
            }
        };

        let records = source.extract(&data);
        debug!(zip_code, count = records.len(), "extracted");
        if records.is_empty() {
            return UnitOutcome::Skipped(SkipReason::NoListings);
        }
        UnitOutcome::Records(ListingTable::from_records(source.kind(), records))
    }

    /// Expand `scope` into zips and scrape them all.
    /// Only an unusable scope (or a failing zip lookup) is an error.
    pub fn scrape(
        &self,
        source: &dyn ListingSource,
        scope: &ScrapeScope,
        zips: &dyn ZipCodeSource,
        cancel: &CancelFlag,
    ) -> Result<BatchOutcome, AppError> {
        let units = resolve_target_units(scope, zips)?;
        info!(
            "Scraping {} zip codes ({}) for {} listings",
            units.len(),
            scope.label(),
            source.kind()
        );
        Ok(self.scrape_units(source, &units, cancel))
    }

    pub fn scrape_units(
        &self,
        source: &dyn ListingSource,
        units: &[String],
        cancel: &CancelFlag,
    ) -> BatchOutcome {
        let progress = Progress::new(units.len());

        let outcomes = if self.config.workers > 1 && units.len() > 1 {
            self.run_pool(source, units, cancel, &progress)
        } else {
            units
                .iter()
                .map(|zip| {
                    let outcome = self.run_one(source, zip, cancel);
                    progress.tick();
                    outcome
                })
                .collect()
        };

        assemble(source, units, outcomes)
    }

    fn run_one(&self, source: &dyn ListingSource, zip: &str, cancel: &CancelFlag) -> UnitOutcome {
        if cancel.is_cancelled() {
            return UnitOutcome::Skipped(SkipReason::Cancelled);
        }
        self.scrape_zip(source, zip)
    }

    /// Bounded pool of scoped threads. Results come back in unit order.
    fn run_pool(
        &self,
        source: &dyn ListingSource,
        units: &[String],
        cancel: &CancelFlag,
        progress: &Progress,
    ) -> Vec<UnitOutcome> {
        let workers = self.config.workers.min(units.len());
        let next = AtomicUsize::new(0);

        let mut indexed: Vec<(usize, UnitOutcome)> = std::thread::scope(|s| {
            let mut handles = Vec::with_capacity(workers);
            for _ in 0..workers {
                handles.push(s.spawn(|| {
                    let mut local = Vec::new();
                    loop {
                        let i = next.fetch_add(1, Ordering::SeqCst);
                        let Some(zip) = units.get(i) else { break };
                        local.push((i, self.run_one(source, zip, cancel)));
                        progress.tick();
                    }
                    local
                }));
            }

            handles
                .into_iter()
                .flat_map(|h| match h.join() {
                    Ok(local) => local,
                    Err(_) => {
                        warn!("scrape worker panicked");
                        Vec::new()
                    }
                })
                .collect()
        });

        indexed.sort_by_key(|(i, _)| *i);

        // A panicked worker loses its units; report them as network failures.
        let mut out = Vec::with_capacity(units.len());
        let mut iter = indexed.into_iter().peekable();
        for i in 0..units.len() {
            match iter.peek() {
                Some((j, _)) if *j == i => {
                    if let Some((_, outcome)) = iter.next() {
                        out.push(outcome);
                    }
                }
                _ => out.push(UnitOutcome::Skipped(SkipReason::Network(
                    "worker panicked".into(),
                ))),
            }
        }
        out
    }

    /// `scrape`, with the run written to the `scrape_runs` ledger.
    pub fn run_recorded_scrape(
        &self,
        db: &Database,
        source: &dyn ListingSource,
        scope: &ScrapeScope,
        cancel: &CancelFlag,
    ) -> Result<BatchOutcome, AppError> {
        let run_id = db.with_conn(|conn| {
            start_scrape_run(conn, source.kind(), &scope.label(), Utc::now().timestamp())
        })?;

        let result = self.scrape(source, scope, db, cancel);
        let now_end = Utc::now().timestamp();

        let summary = match &result {
            Ok(outcome) => {
                info!("✅ Scrape complete");
                RunSummary::success(&outcome.report)
            }
            Err(e) => {
                warn!("Scrape failed: {e}");
                RunSummary::failure(e.to_string())
            }
        };

        // The batch result wins over a ledger failure.
        if let Err(e) = db.with_conn(|conn| end_scrape_run(conn, run_id, now_end, &summary)) {
            warn!(run_id, "failed to record end of scrape run: {e}");
        }
        result
    }
}

/// Concatenate the per-unit tables in unit order and normalise once.
fn assemble(source: &dyn ListingSource, units: &[String], outcomes: Vec<UnitOutcome>) -> BatchOutcome {
    let mut report = BatchReport {
        units_total: units.len(),
        ..Default::default()
    };
    let mut tables = Vec::new();

    for (zip, outcome) in units.iter().zip(outcomes) {
        match outcome {
            UnitOutcome::Records(table) => {
                report.units_with_records += 1;
                report.records += table.len();
                tables.push(table);
            }
            UnitOutcome::Skipped(reason) => report.skipped.push(SkippedUnit {
                zip_code: zip.clone(),
                reason,
            }),
        }
    }

    let table = if tables.is_empty() {
        ListingTable::empty(source.kind())
    } else {
        ListingTable::concat(source.kind(), tables).normalize()
    };

    info!(
        records = report.records,
        skipped = report.skipped_count(),
        "batch finished: {}/{} zip codes returned listings",
        report.units_with_records,
        report.units_total
    );

    BatchOutcome { table, report }
}
