//! Crawl statistics and the final run report
//!
//! `CrawlStats` is the shared, atomically-updated counter block workers feed
//! during a run. `CrawlReport` is the consistent snapshot handed back to the
//! caller when the run ends, including why it stopped.

use crate::crawler::ExceededLimit;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Why a crawl run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The frontier drained with all limits unhit
    Exhausted,
    /// A configured ceiling was reached
    LimitReached(ExceededLimit),
    /// The external stop signal was raised
    Cancelled,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted => write!(f, "frontier exhausted"),
            Self::LimitReached(limit) => write!(f, "limit reached: {}", limit),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Shared counters updated by workers during a run.
#[derive(Default)]
pub struct CrawlStats {
    pages_fetched: AtomicU64,
    fetch_failures: AtomicU64,
    links_discovered: AtomicU64,
    links_enqueued: AtomicU64,
    items_scraped: AtomicU64,
    scraper_failures: Mutex<HashMap<String, u64>>,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_page_fetched(&self) {
        self.pages_fetched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch_failure(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_links(&self, discovered: u64, enqueued: u64) {
        self.links_discovered.fetch_add(discovered, Ordering::Relaxed);
        self.links_enqueued.fetch_add(enqueued, Ordering::Relaxed);
    }

    pub fn record_items_scraped(&self, n: u64) {
        self.items_scraped.fetch_add(n, Ordering::Relaxed);
    }

    pub fn record_scraper_failure(&self, scraper: &str) {
        let mut failures = self.scraper_failures.lock().unwrap();
        *failures.entry(scraper.to_string()).or_insert(0) += 1;
    }

    pub fn pages_fetched(&self) -> u64 {
        self.pages_fetched.load(Ordering::Relaxed)
    }

    pub fn fetch_failures(&self) -> u64 {
        self.fetch_failures.load(Ordering::Relaxed)
    }

    pub fn scraper_failures(&self) -> HashMap<String, u64> {
        self.scraper_failures.lock().unwrap().clone()
    }

    /// Takes a consistent snapshot for reporting.
    pub fn snapshot(
        &self,
        stop_reason: StopReason,
        frontier_remaining: usize,
        elapsed: Duration,
    ) -> CrawlReport {
        CrawlReport {
            crawled: self.pages_fetched.load(Ordering::SeqCst),
            failed: self.fetch_failures.load(Ordering::SeqCst),
            links_discovered: self.links_discovered.load(Ordering::SeqCst),
            links_enqueued: self.links_enqueued.load(Ordering::SeqCst),
            scraped: self.items_scraped.load(Ordering::SeqCst),
            scraper_failures: self.scraper_failures(),
            frontier_remaining,
            elapsed,
            stop_reason,
        }
    }
}

/// Final report for one crawl run.
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Pages fetched (attempted, successful or not is split below)
    pub crawled: u64,
    /// Fetches that failed after exhausting retries
    pub failed: u64,
    /// Candidate links seen during extraction
    pub links_discovered: u64,
    /// Links admitted to the frontier
    pub links_enqueued: u64,
    /// Items produced by scrapers
    pub scraped: u64,
    /// Failure count per scraper name
    pub scraper_failures: HashMap<String, u64>,
    /// URLs still queued when the run stopped
    pub frontier_remaining: usize,
    /// Wall-clock duration of the run
    pub elapsed: Duration,
    /// Why the run stopped
    pub stop_reason: StopReason,
}

impl CrawlReport {
    /// Whether the run stopped because of a configured ceiling.
    pub fn hit_limit(&self) -> bool {
        matches!(self.stop_reason, StopReason::LimitReached(_))
    }

    /// Renders the human-readable summary printed at the end of a run.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("=== Crawl Summary ===\n");
        out.push_str(&format!("Stopped:          {}\n", self.stop_reason));
        out.push_str(&format!("Elapsed:          {:.2?}\n", self.elapsed));
        out.push_str(&format!("Pages crawled:    {}\n", self.crawled));
        out.push_str(&format!("Fetch failures:   {}\n", self.failed));
        out.push_str(&format!(
            "Links:            {} discovered, {} enqueued\n",
            self.links_discovered, self.links_enqueued
        ));
        out.push_str(&format!("Items scraped:    {}\n", self.scraped));
        out.push_str(&format!("Frontier left:    {}\n", self.frontier_remaining));

        if !self.scraper_failures.is_empty() {
            out.push_str("Scraper failures:\n");
            let mut names: Vec<_> = self.scraper_failures.keys().collect();
            names.sort();
            for name in names {
                out.push_str(&format!("  {}: {}\n", name, self.scraper_failures[name]));
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reflects_counters() {
        let stats = CrawlStats::new();
        stats.record_page_fetched();
        stats.record_page_fetched();
        stats.record_fetch_failure();
        stats.record_links(10, 4);
        stats.record_items_scraped(3);
        stats.record_scraper_failure("news");
        stats.record_scraper_failure("news");

        let report = stats.snapshot(StopReason::Exhausted, 5, Duration::from_secs(1));
        assert_eq!(report.crawled, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.links_discovered, 10);
        assert_eq!(report.links_enqueued, 4);
        assert_eq!(report.scraped, 3);
        assert_eq!(report.scraper_failures.get("news"), Some(&2));
        assert_eq!(report.frontier_remaining, 5);
        assert!(!report.hit_limit());
    }

    #[test]
    fn test_hit_limit() {
        let stats = CrawlStats::new();
        let report = stats.snapshot(
            StopReason::LimitReached(ExceededLimit::MaxCrawled(1)),
            0,
            Duration::ZERO,
        );
        assert!(report.hit_limit());
    }

    #[test]
    fn test_stop_reason_display() {
        assert_eq!(StopReason::Exhausted.to_string(), "frontier exhausted");
        assert_eq!(StopReason::Cancelled.to_string(), "cancelled");
        assert!(StopReason::LimitReached(ExceededLimit::MaxScraped(5))
            .to_string()
            .contains("max scraped items (5)"));
    }

    #[test]
    fn test_render_contains_counts() {
        let stats = CrawlStats::new();
        stats.record_page_fetched();
        stats.record_scraper_failure("broken");

        let report = stats.snapshot(StopReason::Exhausted, 0, Duration::from_millis(10));
        let rendered = report.render();
        assert!(rendered.contains("Pages crawled:    1"));
        assert!(rendered.contains("broken: 1"));
    }
}
