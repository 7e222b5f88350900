use crate::config::{clamp_workers, ScraperConfig};
use crate::db::connection::{init_db, Database};
use crate::domain::{ListingKind, ListingTable, ScrapeScope};
use crate::scraper::{CancelFlag, ListingSource, RedfinScraper, RentalSource, SaleSource};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod db;
mod domain;
mod errors;
mod scraper;
mod spreadsheets;

#[cfg(test)]
mod tests;

#[derive(Parser)]
#[command(name = "redfin_scraper")]
#[command(about = "Collect sale and rental listings per zip code")]
#[command(version)]
struct Cli {
    /// SQLite database path (overrides SCRAPER_DB_PATH)
    #[arg(long)]
    db: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, ValueEnum)]
enum KindArg {
    Sale,
    Rental,
}

impl KindArg {
    fn source(self) -> Box<dyn ListingSource> {
        match self {
            KindArg::Sale => Box::new(SaleSource),
            KindArg::Rental => Box::new(RentalSource),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape listings for a state or a single zip code
    Scrape {
        #[arg(short, long, value_enum, default_value = "sale")]
        kind: KindArg,

        /// Two-letter state code; every zip in the reference table is scraped
        #[arg(short, long)]
        state: Option<String>,

        /// A single zip code (takes precedence over --state)
        #[arg(short, long)]
        zip: Option<String>,

        /// Only scrape the first N zip codes (0 = all)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Concurrent zip codes (overrides SCRAPER_WORKERS)
        #[arg(short, long)]
        workers: Option<usize>,

        /// Output file (.xlsx or .json); prints JSON to stdout when omitted
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Load `zip,state[,primary_city]` rows into the reference table
    LoadZips { csv: PathBuf },

    /// Decode a saved provider response and print the normalised rows
    Parse {
        #[arg(short, long, value_enum, default_value = "sale")]
        kind: KindArg,

        file: PathBuf,
    },

    /// Show recent scrape runs
    Runs,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ScraperConfig::from_env()?;
    run(cli, config)
}

fn run(cli: Cli, mut config: ScraperConfig) -> Result<()> {
    if let Some(path) = cli.db {
        config.db_path = path;
    }

    let db = Database::new(config.db_path.clone());

    match cli.command {
        Commands::Scrape {
            kind,
            state,
            zip,
            limit,
            workers,
            out,
        } => {
            if let Some(n) = workers {
                config.workers = clamp_workers(n);
            }
            let scope = ScrapeScope {
                state,
                zip_code: zip,
                limit,
            };
            open_db(&db)?;
            let source = kind.source();
            let scraper = RedfinScraper::new(config)?;

            let cancel = CancelFlag::new();
            let on_signal = cancel.clone();
            if let Err(e) = ctrlc::set_handler(move || {
                warn!("Interrupted; finishing in-flight zip codes");
                on_signal.cancel();
            }) {
                warn!("could not install Ctrl-C handler: {e}");
            }

            let outcome = scraper.run_recorded_scrape(&db, source.as_ref(), &scope, &cancel)?;

            for (reason, n) in outcome.report.skip_counts() {
                info!("skipped {n} zip codes: {reason}");
            }
            if outcome.table.is_empty() {
                warn!("No listings collected for {}", scope.label());
            }
            write_table(&outcome.table, out.as_deref())?;
        }

        Commands::LoadZips { csv } => {
            let text = std::fs::read_to_string(&csv)
                .with_context(|| format!("reading {}", csv.display()))?;
            let rows = db::parse_zip_csv(&text)?;
            open_db(&db)?;
            let n = db::save_zip_mappings(&db, &rows)?;
            info!("Loaded {n} zip codes");
        }

        Commands::Parse { kind, file } => {
            let body = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let table = parse_response(kind.source().as_ref(), &body);
            write_table(&table, None)?;
        }

        Commands::Runs => {
            open_db(&db)?;
            let runs = db.with_conn(|conn| db::scrapes::get_recent_scrapes(conn))?;
            for r in runs {
                println!(
                    "#{} {} {} started={} finished={} units={} with_records={} skipped={} records={} ok={} {}",
                    r.id,
                    r.kind,
                    r.scope,
                    r.started_at,
                    r.finished_at.map(|t| t.to_string()).unwrap_or_else(|| "-".into()),
                    r.units_total.unwrap_or(0),
                    r.units_with_records.unwrap_or(0),
                    r.units_skipped.unwrap_or(0),
                    r.records.unwrap_or(0),
                    r.success,
                    r.error_message.unwrap_or_default(),
                );
            }
        }
    }

    Ok(())
}

/// Decode a saved response body offline. Never touches the database.
fn parse_response(source: &dyn ListingSource, body: &str) -> ListingTable {
    let data = source.decode(&crate::scraper::html_to_text(body));
    ListingTable::from_records(source.kind(), source.extract(&data)).normalize()
}

fn open_db(db: &Database) -> Result<()> {
    init_db(db).context("database initialization failed")
}

fn write_table(table: &ListingTable, out: Option<&Path>) -> Result<()> {
    let kind: ListingKind = table.kind();
    match out {
        Some(path) if path.extension().is_some_and(|e| e == "xlsx") => {
            spreadsheets::export_listings_xlsx(table, path)?;
            info!("Wrote {} {kind} rows to {}", table.len(), path.display());
        }
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("creating {}", path.display()))?;
            serde_json::to_writer_pretty(std::io::BufWriter::new(file), table)?;
            info!("Wrote {} {kind} rows to {}", table.len(), path.display());
        }
        None => {
            println!("{}", serde_json::to_string_pretty(table)?);
        }
    }
    Ok(())
}
