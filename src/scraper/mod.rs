mod extract;
mod fetcher;
mod params;
mod region;
mod rental;
mod sale;
mod scraper;
mod scraper_error;
mod source;

pub use fetcher::html_to_text;
#[cfg(test)]
pub use fetcher::Fetcher;
pub use rental::RentalSource;
pub use sale::SaleSource;
pub use self::scraper::{BatchReport, CancelFlag, RedfinScraper};
#[cfg(test)]
pub use self::scraper::SkipReason;
pub use scraper_error::ScraperError;
pub use source::ListingSource;
