//! Crawl limits: depth, fetch-count, and item-count ceilings
//!
//! Limits are not errors. Hitting one flips a one-way latch that tells every
//! worker to stop starting new work, and the tripped limit is recorded so the
//! final report can distinguish "hit a ceiling" from "ran out of frontier".

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Configured ceilings; `None` means unbounded.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrawlLimits {
    /// Maximum link depth from the seeds (seeds are depth 0)
    pub max_depth: Option<u32>,
    /// Maximum number of pages to fetch
    pub max_crawled: Option<u64>,
    /// Maximum number of items to scrape
    pub max_scraped: Option<u64>,
    /// Maximum run duration, measured from tracker construction
    pub max_time: Option<Duration>,
}

/// Which ceiling ended the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceededLimit {
    MaxCrawled(u64),
    MaxScraped(u64),
    MaxTime(Duration),
}

impl fmt::Display for ExceededLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaxCrawled(n) => write!(f, "max crawled pages ({})", n),
            Self::MaxScraped(n) => write!(f, "max scraped items ({})", n),
            Self::MaxTime(d) => write!(f, "max run time ({:?})", d),
        }
    }
}

/// Shared, thread-safe limit state consulted by every worker.
///
/// `may_continue` is monotone: once it has returned false it returns false
/// for the rest of the run, even though the counters keep their final values.
pub struct LimitTracker {
    limits: CrawlLimits,
    started: Instant,
    crawled: AtomicU64,
    scraped: AtomicU64,
    halted: AtomicBool,
    tripped: Mutex<Option<ExceededLimit>>,
}

impl LimitTracker {
    pub fn new(limits: CrawlLimits) -> Self {
        Self {
            limits,
            started: Instant::now(),
            crawled: AtomicU64::new(0),
            scraped: AtomicU64::new(0),
            halted: AtomicBool::new(false),
            tripped: Mutex::new(None),
        }
    }

    /// Whether exploration may proceed. One-way: false stays false.
    pub fn may_continue(&self) -> bool {
        if self.halted.load(Ordering::SeqCst) {
            return false;
        }

        if let Some(max) = self.limits.max_time {
            if self.started.elapsed() >= max {
                self.trip(ExceededLimit::MaxTime(max));
                return false;
            }
        }

        if let Some(max) = self.limits.max_crawled {
            if self.crawled.load(Ordering::SeqCst) >= max {
                self.trip(ExceededLimit::MaxCrawled(max));
                return false;
            }
        }

        if let Some(max) = self.limits.max_scraped {
            if self.scraped.load(Ordering::SeqCst) >= max {
                self.trip(ExceededLimit::MaxScraped(max));
                return false;
            }
        }

        true
    }

    /// Records one page fetch committed to.
    pub fn record_crawled(&self) {
        self.crawled.fetch_add(1, Ordering::SeqCst);
    }

    /// Atomically reserves one fetch slot.
    ///
    /// Equivalent to `may_continue` followed by `record_crawled`, but safe
    /// against two workers both passing the check before either records.
    /// Returns false and trips the latch once the fetch ceiling is spent.
    pub fn try_start_crawl(&self) -> bool {
        if !self.may_continue() {
            return false;
        }

        match self.limits.max_crawled {
            Some(max) => {
                let prev = self.crawled.fetch_add(1, Ordering::SeqCst);
                if prev >= max {
                    self.crawled.fetch_sub(1, Ordering::SeqCst);
                    self.trip(ExceededLimit::MaxCrawled(max));
                    false
                } else {
                    true
                }
            }
            None => {
                self.crawled.fetch_add(1, Ordering::SeqCst);
                true
            }
        }
    }

    /// Records `n` scraped items.
    pub fn record_scraped(&self, n: u64) {
        self.scraped.fetch_add(n, Ordering::SeqCst);
    }

    /// Whether a URL discovered at `depth` is still within the depth ceiling.
    pub fn next_depth_allowed(&self, depth: u32) -> bool {
        match self.limits.max_depth {
            Some(max) => depth <= max,
            None => true,
        }
    }

    /// The limit that halted the run, if any.
    pub fn exceeded(&self) -> Option<ExceededLimit> {
        *self.tripped.lock().unwrap()
    }

    pub fn crawled(&self) -> u64 {
        self.crawled.load(Ordering::SeqCst)
    }

    pub fn scraped(&self) -> u64 {
        self.scraped.load(Ordering::SeqCst)
    }

    fn trip(&self, limit: ExceededLimit) {
        if !self.halted.swap(true, Ordering::SeqCst) {
            tracing::info!("Crawl limit reached: {}", limit);
            *self.tripped.lock().unwrap() = Some(limit);
        }
    }
}
