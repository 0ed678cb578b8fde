//! Crawl frontier: visited/queued URL bookkeeping
//!
//! One mutex guards both sets and the FIFO queue. Every operation is O(1)
//! average and short-lived, so a single coarse lock closes the
//! check-then-insert race without finer-grained machinery. Callers never see
//! the underlying sets, only the atomic operations below.

use crate::url::UrlRecord;
use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

#[derive(Default)]
struct FrontierInner {
    /// URLs a worker has claimed (fetch attempted or abandoned past claim)
    visited: HashSet<UrlRecord>,
    /// Membership mirror of `queue` for O(1) duplicate checks
    queued: HashSet<UrlRecord>,
    /// FIFO of (url, discovery depth)
    queue: VecDeque<(UrlRecord, u32)>,
}

/// Concurrency-safe frontier shared by all crawl workers.
///
/// Invariants maintained under the lock:
/// - a URL is never in `visited` and `queued` at the same time
/// - `try_enqueue` admits a URL at most once per run
/// - `claim_next` hands each queued URL to exactly one caller
#[derive(Default)]
pub struct Frontier {
    inner: Mutex<FrontierInner>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically schedules `url` at `depth` unless it was ever seen before.
    ///
    /// Returns true when the URL was admitted; false means it is already
    /// queued or visited and the call was a no-op. This check-and-insert is
    /// the linearization point that keeps concurrent workers from scheduling
    /// the same URL twice.
    pub fn try_enqueue(&self, url: UrlRecord, depth: u32) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if inner.visited.contains(&url) || inner.queued.contains(&url) {
            return false;
        }
        inner.queued.insert(url.clone());
        inner.queue.push_back((url, depth));
        true
    }

    /// Atomically claims the oldest queued URL, moving it to `visited`.
    ///
    /// An empty result is not terminal by itself: other workers may still be
    /// producing new entries, so pool shutdown also requires zero in-flight
    /// claims.
    pub fn claim_next(&self) -> Option<(UrlRecord, u32)> {
        let mut inner = self.inner.lock().unwrap();
        let (url, depth) = inner.queue.pop_front()?;
        inner.queued.remove(&url);
        inner.visited.insert(url.clone());
        Some((url, depth))
    }

    /// Number of URLs waiting to be claimed.
    pub fn queued_len(&self) -> usize {
        self.inner.lock().unwrap().queue.len()
    }

    /// Number of URLs claimed so far.
    pub fn visited_len(&self) -> usize {
        self.inner.lock().unwrap().visited.len()
    }
}
