//! Crawl statistics counters

use crate::crawler::Page;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Counters shared by all workers
#[derive(Debug, Default)]
pub struct CrawlStats {
    pages_crawled: AtomicU64,
    pages_ok: AtomicU64,
    pages_failed: AtomicU64,
    /// Total step time in nanoseconds
    total_crawl_time: AtomicU64,
}

/// Point-in-time copy of [`CrawlStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub pages_crawled: u64,
    pub pages_ok: u64,
    pub pages_failed: u64,
    pub total_crawl_time: Duration,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a fetched page; status codes below 300 count as ok
    ///
    /// # Returns
    ///
    /// The number of pages crawled so far
    pub fn update(&self, page: &Page, elapsed: Duration) -> u64 {
        if page.status_code() < 300 {
            self.pages_ok.fetch_add(1, Ordering::Relaxed);
        } else {
            self.pages_failed.fetch_add(1, Ordering::Relaxed);
        }
        self.add_time(elapsed);
        self.pages_crawled.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Records a fetch that failed before a response was read
    pub fn record_failure(&self) -> u64 {
        self.pages_failed.fetch_add(1, Ordering::Relaxed);
        self.pages_crawled.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn add_time(&self, elapsed: Duration) {
        let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        self.total_crawl_time.fetch_add(nanos, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            pages_crawled: self.pages_crawled.load(Ordering::Relaxed),
            pages_ok: self.pages_ok.load(Ordering::Relaxed),
            pages_failed: self.pages_failed.load(Ordering::Relaxed),
            total_crawl_time: Duration::from_nanos(self.total_crawl_time.load(Ordering::Relaxed)),
        }
    }

    pub fn average_crawl_time(&self) -> Option<Duration> {
        self.snapshot().average_crawl_time()
    }
}

impl StatsSnapshot {
    /// Mean step time per crawled page, `None` before the first page
    pub fn average_crawl_time(&self) -> Option<Duration> {
        let crawled = u32::try_from(self.pages_crawled).ok()?;
        if crawled == 0 {
            return None;
        }
        Some(self.total_crawl_time / crawled)
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} pages crawled ({} ok, {} failed)",
            self.pages_crawled, self.pages_ok, self.pages_failed
        )?;
        if let Some(avg) = self.average_crawl_time() {
            write!(f, ", {:.2?} per page", avg)?;
        }
        Ok(())
    }
}
