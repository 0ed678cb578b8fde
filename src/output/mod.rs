//! Run statistics and reporting

mod stats;

pub use stats::{CrawlReport, CrawlStats, StopReason};
