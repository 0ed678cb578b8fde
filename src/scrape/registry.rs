use crate::output::CrawlStats;
use crate::scrape::{ItemSink, Page, Scraper};
use crate::url::UrlRecord;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Registry of site scrapers, populated externally before a crawl starts.
///
/// Dispatch isolates each scraper: an error or panic in one is logged and
/// counted against that scraper's name, and neither the worker nor the other
/// scrapers for the same page are affected.
#[derive(Default, Clone)]
pub struct ScraperRegistry {
    scrapers: Vec<Arc<dyn Scraper>>,
}

impl ScraperRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a scraper.
    pub fn register(&mut self, scraper: Arc<dyn Scraper>) {
        tracing::debug!("Registered scraper `{}`", scraper.name());
        self.scrapers.push(scraper);
    }

    pub fn len(&self) -> usize {
        self.scrapers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scrapers.is_empty()
    }

    /// The scrapers that claim `url`.
    pub fn applicable_scrapers(&self, url: &UrlRecord) -> Vec<Arc<dyn Scraper>> {
        self.scrapers
            .iter()
            .filter(|s| s.applicable(url))
            .cloned()
            .collect()
    }

    /// Runs every applicable scraper against `page`, forwarding items to
    /// `sink`. Returns the number of items produced across all scrapers.
    pub fn dispatch(&self, page: &Page, sink: &dyn ItemSink, stats: &CrawlStats) -> u64 {
        let mut produced = 0;

        for scraper in self.applicable_scrapers(&page.url) {
            let name = scraper.name().to_string();

            // A buggy scraper must not take the worker down with it.
            let result = catch_unwind(AssertUnwindSafe(|| scraper.scrape(page)));

            match result {
                Ok(Ok(items)) => {
                    tracing::info!(
                        "Scraper `{}` produced {} items from {}",
                        name,
                        items.len(),
                        page.url
                    );
                    produced += items.len() as u64;
                    for item in items {
                        sink.accept(&name, item);
                    }
                }
                Ok(Err(e)) => {
                    tracing::error!("Scraper `{}` failed on {}: {}", name, page.url, e);
                    stats.record_scraper_failure(&name);
                }
                Err(_) => {
                    tracing::error!("Scraper `{}` panicked on {}", name, page.url);
                    stats.record_scraper_failure(&name);
                }
            }
        }

        produced
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrape::{Item, MemorySink, ScrapeError};
    use serde_json::json;

    struct HostScraper {
        name: String,
        host: String,
        fail: bool,
    }

    impl Scraper for HostScraper {
        fn name(&self) -> &str {
            &self.name
        }

        fn applicable(&self, url: &UrlRecord) -> bool {
            url.host() == self.host
        }

        fn scrape(&self, page: &Page) -> Result<Vec<Item>, ScrapeError> {
            if self.fail {
                return Err(ScrapeError::Parse("broken".to_string()));
            }
            Ok(vec![json!({ "from": page.url.as_str() })])
        }
    }

    struct PanickyScraper;

    impl Scraper for PanickyScraper {
        fn name(&self) -> &str {
            "panicky"
        }

        fn applicable(&self, _url: &UrlRecord) -> bool {
            true
        }

        fn scrape(&self, _page: &Page) -> Result<Vec<Item>, ScrapeError> {
            panic!("boom");
        }
    }

    fn page(url: &str) -> Page {
        Page {
            url: UrlRecord::parse(url).unwrap(),
            final_url: url.to_string(),
            status: 200,
            body: "<html></html>".to_string(),
        }
    }

    fn scraper(name: &str, host: &str, fail: bool) -> Arc<dyn Scraper> {
        Arc::new(HostScraper {
            name: name.to_string(),
            host: host.to_string(),
            fail,
        })
    }

    #[test]
    fn test_applicable_scrapers_by_host() {
        let mut registry = ScraperRegistry::new();
        registry.register(scraper("a", "a.example", false));
        registry.register(scraper("b", "b.example", false));

        let matches = registry.applicable_scrapers(&UrlRecord::parse("https://a.example/p").unwrap());
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name(), "a");
    }

    #[test]
    fn test_dispatch_forwards_items() {
        let mut registry = ScraperRegistry::new();
        registry.register(scraper("a", "a.example", false));

        let sink = MemorySink::new();
        let stats = CrawlStats::new();
        let produced = registry.dispatch(&page("https://a.example/p"), &sink, &stats);

        assert_eq!(produced, 1);
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.take()[0].0, "a");
    }

    #[test]
    fn test_dispatch_no_applicable_scraper() {
        let mut registry = ScraperRegistry::new();
        registry.register(scraper("a", "a.example", false));

        let sink = MemorySink::new();
        let stats = CrawlStats::new();
        let produced = registry.dispatch(&page("https://other.example/p"), &sink, &stats);

        assert_eq!(produced, 0);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_failing_scraper_is_isolated() {
        let mut registry = ScraperRegistry::new();
        registry.register(scraper("bad", "a.example", true));
        registry.register(scraper("good", "a.example", false));

        let sink = MemorySink::new();
        let stats = CrawlStats::new();
        let produced = registry.dispatch(&page("https://a.example/p"), &sink, &stats);

        // The good scraper still ran; the bad one was counted.
        assert_eq!(produced, 1);
        assert_eq!(stats.scraper_failures().get("bad"), Some(&1));
        assert_eq!(sink.take()[0].0, "good");
    }

    #[test]
    fn test_panicking_scraper_is_isolated() {
        let mut registry = ScraperRegistry::new();
        registry.register(Arc::new(PanickyScraper));
        registry.register(scraper("good", "a.example", false));

        let sink = MemorySink::new();
        let stats = CrawlStats::new();
        let produced = registry.dispatch(&page("https://a.example/p"), &sink, &stats);

        assert_eq!(produced, 1);
        assert_eq!(stats.scraper_failures().get("panicky"), Some(&1));
    }
}
