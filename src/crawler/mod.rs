//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with bounded retry
//! - HTML link extraction
//! - The shared frontier of visited and queued URLs
//! - Depth and count limit enforcement
//! - Overall crawl coordination via a bounded worker pool

mod coordinator;
mod extractor;
mod fetcher;
mod frontier;
mod limits;

pub use coordinator::{Coordinator, StopHandle};
pub use extractor::extract_links;
pub use fetcher::{build_http_client, FetchOutcome, Fetcher};
pub use frontier::Frontier;
pub use limits::{CrawlLimits, ExceededLimit, LimitTracker};

use crate::config::Config;
use crate::output::CrawlReport;
use crate::scrape::{ItemSink, ScraperRegistry};
use crate::Result;
use std::sync::Arc;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Seed the frontier from the configured seed URLs
/// 2. Build the HTTP client
/// 3. Spawn the worker pool and fetch pages
/// 4. Extract and follow links within scope and limits
/// 5. Dispatch fetched pages to applicable scrapers
/// 6. Return a report describing the run
///
/// # Arguments
///
/// * `config` - The crawl configuration
/// * `registry` - The scrapers to run against fetched pages
/// * `sink` - Destination for scraped items
pub async fn crawl(
    config: Config,
    registry: ScraperRegistry,
    sink: Arc<dyn ItemSink>,
) -> Result<CrawlReport> {
    let coordinator = Coordinator::new(config, registry, sink)?;
    coordinator.run().await
}
