//! Scraper plumbing: the per-site scraper seam and dispatch
//!
//! Site scrapers are independently authored components that turn one fetched
//! page into zero or more structured items. The crawl core knows nothing
//! about their business logic; it only asks "does this URL concern you?" and
//! hands over the page. Failures in one scraper never reach the crawl loop
//! or other scrapers for the same page.

mod registry;
mod sink;

pub use registry::ScraperRegistry;
pub use sink::{ItemSink, JsonLinesSink, MemorySink, NullSink};

use crate::url::UrlRecord;
use thiserror::Error;

/// The common currency for scraped items.
///
/// Independently authored scrapers share one sink, so items cross the seam
/// as JSON values rather than concrete types.
pub type Item = serde_json::Value;

/// A fetched page as handed to scrapers.
#[derive(Debug, Clone)]
pub struct Page {
    /// The URL as it was claimed from the frontier
    pub url: UrlRecord,
    /// Final URL after redirects
    pub final_url: String,
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: String,
}

/// Error produced by a scraper for one page.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("failed to parse page: {0}")]
    Parse(String),

    #[error("expected content missing: {0}")]
    MissingContent(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// A per-site scraper.
///
/// Implementations are registered with a [`ScraperRegistry`] and invoked for
/// every fetched page whose URL they claim via [`Scraper::applicable`].
///
/// # Example
///
/// ```
/// use dredge::{Item, Page, ScrapeError, Scraper, UrlRecord};
/// use serde_json::json;
///
/// struct TitleScraper;
///
/// impl Scraper for TitleScraper {
///     fn name(&self) -> &str {
///         "titles"
///     }
///
///     fn applicable(&self, url: &UrlRecord) -> bool {
///         url.host() == "news.example"
///     }
///
///     fn scrape(&self, page: &Page) -> Result<Vec<Item>, ScrapeError> {
///         Ok(vec![json!({ "url": page.url.as_str(), "status": page.status })])
///     }
/// }
/// ```
pub trait Scraper: Send + Sync {
    /// A stable name used in logs and failure metrics.
    fn name(&self) -> &str;

    /// Whether this scraper wants pages from `url`.
    fn applicable(&self, url: &UrlRecord) -> bool;

    /// Turns one fetched page into structured items.
    fn scrape(&self, page: &Page) -> Result<Vec<Item>, ScrapeError>;
}
