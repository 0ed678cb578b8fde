//! Crawl coordinator - main crawl orchestration logic
//!
//! This module contains the worker pool that drives a crawl, including:
//! - Seeding the frontier from configuration
//! - Spawning bounded concurrent workers
//! - Coordinating fetching, link extraction, and scraper dispatch
//! - Enforcing depth and count limits
//! - Handling external cancellation
//! - Producing the final crawl report

use crate::config::Config;
use crate::crawler::extractor::extract_links;
use crate::crawler::fetcher::{Fetcher, FetchOutcome};
use crate::crawler::frontier::Frontier;
use crate::crawler::limits::{CrawlLimits, LimitTracker};
use crate::output::{CrawlReport, CrawlStats, StopReason};
use crate::scrape::{ItemSink, Page, ScraperRegistry};
use crate::url::{UrlFilter, UrlRecord};
use crate::DredgeError;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How long an idle worker waits before re-checking the frontier.
const IDLE_POLL: Duration = Duration::from_millis(50);

/// Handle for stopping a running crawl from outside the worker pool.
///
/// Cloneable and safe to trigger from a signal handler or another task.
/// Workers finish their current page and then exit.
#[derive(Clone)]
pub struct StopHandle {
    flag: Arc<AtomicBool>,
}

impl StopHandle {
    /// Requests that the crawl stop. Idempotent.
    pub fn stop(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// State shared by every worker in the pool.
struct Shared {
    frontier: Frontier,
    fetcher: Fetcher,
    limits: LimitTracker,
    filter: UrlFilter,
    seed_hosts: HashSet<String>,
    same_site_only: bool,
    registry: ScraperRegistry,
    sink: Arc<dyn ItemSink>,
    stats: CrawlStats,
    stop: Arc<AtomicBool>,
    in_flight: AtomicUsize,
}

/// Main crawl coordinator structure
pub struct Coordinator {
    worker_count: u32,
    shared: Arc<Shared>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// Parses and enqueues the configured seeds at depth 0, builds the HTTP
    /// client, and wires up limits and filters. Seeds that fail to parse are
    /// rejected here rather than silently dropped.
    pub fn new(
        config: Config,
        registry: ScraperRegistry,
        sink: Arc<dyn ItemSink>,
    ) -> Result<Self, DredgeError> {
        let frontier = Frontier::new();
        let mut seed_hosts = HashSet::new();

        for seed in &config.crawler.seeds {
            let record = UrlRecord::parse(seed).map_err(|e| DredgeError::InvalidSeed {
                url: seed.clone(),
                reason: e.to_string(),
            })?;
            seed_hosts.insert(record.host().to_string());
            frontier.try_enqueue(record, 0);
        }

        let fetcher = Fetcher::new(&config.fetch)?;

        let limits = LimitTracker::new(CrawlLimits {
            max_depth: config.crawler.max_depth,
            max_crawled: config.crawler.max_crawled,
            max_scraped: config.crawler.max_scraped,
            max_time: config.crawler.max_time_secs.map(Duration::from_secs),
        });

        let filter = UrlFilter::new(
            config.crawler.include.clone(),
            config.crawler.exclude.clone(),
        );

        let shared = Shared {
            frontier,
            fetcher,
            limits,
            filter,
            seed_hosts,
            same_site_only: config.crawler.same_site_only,
            registry,
            sink,
            stats: CrawlStats::new(),
            stop: Arc::new(AtomicBool::new(false)),
            in_flight: AtomicUsize::new(0),
        };

        Ok(Self {
            worker_count: config.crawler.worker_count.max(1),
            shared: Arc::new(shared),
        })
    }

    /// Returns a handle that can stop this crawl from another task.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            flag: Arc::clone(&self.shared.stop),
        }
    }

    /// Runs the crawl to completion
    ///
    /// Spawns the worker pool and waits for it to drain the frontier, hit a
    /// configured limit, or observe a stop request. Always returns a report;
    /// a crawl where every fetch failed is still a completed crawl.
    pub async fn run(self) -> Result<CrawlReport, DredgeError> {
        let start_time = Instant::now();
        tracing::info!(
            workers = self.worker_count,
            seeds = self.shared.frontier.queued_len(),
            "starting crawl"
        );

        let mut handles = Vec::with_capacity(self.worker_count as usize);
        for worker_id in 0..self.worker_count {
            let shared = Arc::clone(&self.shared);
            handles.push(tokio::spawn(async move {
                worker_loop(worker_id, shared).await;
            }));
        }

        for handle in handles {
            handle
                .await
                .map_err(|e| DredgeError::Worker(e.to_string()))?;
        }

        let shared = &self.shared;
        let stop_reason = if shared.stop.load(Ordering::SeqCst) {
            StopReason::Cancelled
        } else if let Some(limit) = shared.limits.exceeded() {
            StopReason::LimitReached(limit)
        } else {
            StopReason::Exhausted
        };

        let report = shared.stats.snapshot(
            stop_reason,
            shared.frontier.queued_len(),
            start_time.elapsed(),
        );

        tracing::info!(
            crawled = report.crawled,
            failed = report.failed,
            scraped = report.scraped,
            elapsed = ?report.elapsed,
            "crawl finished: {}",
            report.stop_reason
        );

        Ok(report)
    }
}

/// One worker's claim-fetch-dispatch loop.
///
/// Termination condition: the queue is empty and no worker holds a claimed
/// URL. A worker that claims a URL raises `in_flight` before processing, so
/// an idle worker seeing `in_flight == 0` and an empty queue knows no more
/// URLs can appear.
async fn worker_loop(worker_id: u32, shared: Arc<Shared>) {
    tracing::debug!(worker_id, "worker started");

    loop {
        if shared.stop.load(Ordering::SeqCst) {
            break;
        }
        if !shared.limits.may_continue() {
            break;
        }

        shared.in_flight.fetch_add(1, Ordering::SeqCst);
        let claimed = shared.frontier.claim_next();

        let (url, depth) = match claimed {
            Some(c) => c,
            None => {
                shared.in_flight.fetch_sub(1, Ordering::SeqCst);
                if shared.in_flight.load(Ordering::SeqCst) == 0
                    && shared.frontier.queued_len() == 0
                {
                    break;
                }
                tokio::time::sleep(IDLE_POLL).await;
                continue;
            }
        };

        // Re-check after claiming: another worker may have stopped the run
        // or spent the fetch budget while we were idle. The slot reservation
        // is atomic, so the budget is never exceeded even under contention.
        if shared.stop.load(Ordering::SeqCst) || !shared.limits.try_start_crawl() {
            shared.in_flight.fetch_sub(1, Ordering::SeqCst);
            break;
        }

        process_url(worker_id, &shared, url, depth).await;
        shared.in_flight.fetch_sub(1, Ordering::SeqCst);

        let crawled = shared.limits.crawled();
        if crawled % 10 == 0 {
            tracing::info!(
                crawled,
                queued = shared.frontier.queued_len(),
                "crawl progress"
            );
        }
    }

    tracing::debug!(worker_id, "worker finished");
}

/// Fetches one URL, extracts and enqueues its links, and dispatches the page
/// to applicable scrapers.
async fn process_url(worker_id: u32, shared: &Shared, url: UrlRecord, depth: u32) {
    tracing::debug!(worker_id, url = %url, depth, "processing URL");

    let outcome = shared.fetcher.fetch(url.url()).await;

    // A stop raised mid-fetch abandons the page before extraction and
    // dispatch, so shutdown latency is bounded by the fetch timeout.
    if shared.stop.load(Ordering::SeqCst) {
        tracing::debug!(url = %url, "stop raised during fetch, page dropped");
        return;
    }

    let (final_url, status, body) = match outcome {
        FetchOutcome::Success {
            final_url,
            status,
            body,
        } => (final_url, status, body),
        FetchOutcome::Failure { reason, status } => {
            shared.stats.record_fetch_failure();
            tracing::warn!(url = %url, status = ?status, "fetch failed: {}", reason);
            return;
        }
    };

    shared.stats.record_page_fetched();

    let links = extract_links(&body, url.url());
    let discovered = links.len() as u64;
    let mut enqueued = 0u64;

    let next_depth = depth + 1;
    if shared.limits.next_depth_allowed(next_depth) {
        for link in links {
            if shared.same_site_only && !shared.seed_hosts.contains(link.host()) {
                tracing::trace!(url = %link, "discarding off-site link");
                continue;
            }
            if !shared.filter.allows(&link) {
                tracing::trace!(url = %link, "link rejected by filter");
                continue;
            }
            if !shared.limits.may_continue() {
                break;
            }
            if shared.frontier.try_enqueue(link, next_depth) {
                enqueued += 1;
            }
        }
    } else {
        tracing::debug!(url = %url, next_depth, "links beyond depth limit, not enqueued");
    }

    shared.stats.record_links(discovered, enqueued);

    let page = Page {
        url,
        final_url,
        status,
        body,
    };
    let produced = shared
        .registry
        .dispatch(&page, shared.sink.as_ref(), &shared.stats);
    if produced > 0 {
        shared.stats.record_items_scraped(produced);
        shared.limits.record_scraped(produced);
    }
}
