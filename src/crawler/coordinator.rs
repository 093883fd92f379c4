//! Crawler coordinator - main crawl orchestration logic
//!
//! One [`Crawler`] is shared by every worker. Each call to [`Crawler::step`]
//! takes one URL through the whole pipeline:
//! - pop it from the frontier
//! - make sure the domain's robots.txt is known
//! - check robots rules and the crawl delay
//! - fetch the page
//! - admit and enqueue its links
//! - update statistics and persist the page

use crate::compliance::{check, ComplianceEngine, RobotsVerdict};
use crate::config::CrawlerOptions;
use crate::crawler::fetcher::{build_http_client, fetch_page, fetch_robots_txt};
use crate::crawler::stats::CrawlStats;
use crate::crawler::Page;
use crate::frontier::Frontier;
use crate::net::HostValidator;
use crate::robots::{DomainEntry, ParsedRobots, RobotsCache, SharedDomainEntry};
use crate::storage::Storage;
use crate::url::get_protocol_and_domain_from_url;
use crate::{short_url, CrawlError};
use chrono::Utc;
use parking_lot::Mutex;
use reqwest::Client;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// How long an idle worker waits before looking at the frontier again
const IDLE_WAIT: Duration = Duration::from_millis(200);

/// Result of one crawl step
#[derive(Debug)]
pub enum StepOutcome {
    /// A page was fetched (any status code)
    Fetched(Box<Page>),
    /// robots.txt disallows the URL
    Denied,
    /// The domain's crawl delay has not elapsed; the URL was put back
    Deferred(Duration),
    /// The response body was empty
    Empty,
    /// The fetch failed; the error has been logged
    Failed,
}

/// Shared crawl engine
pub struct Crawler {
    options: Arc<CrawlerOptions>,
    frontier: Arc<Frontier>,
    compliance: ComplianceEngine,
    client: Client,
    storage: Mutex<Box<dyn Storage + Send>>,
    robots: RobotsCache,
    stats: CrawlStats,
}

impl Crawler {
    /// Creates a crawler over a frontier and a storage backend
    ///
    /// # Arguments
    ///
    /// * `options` - Crawler options
    /// * `frontier` - The shared frontier
    /// * `storage` - Where pages and domain records are persisted
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to step
    /// * `Err(CrawlError)` - The HTTP client could not be built
    pub fn new(
        options: Arc<CrawlerOptions>,
        frontier: Arc<Frontier>,
        storage: Box<dyn Storage + Send>,
    ) -> Result<Self, CrawlError> {
        Self::with_host_validator(options, frontier, storage, HostValidator::from_system())
    }

    /// Like [`Crawler::new`] with an explicit host validator
    pub fn with_host_validator(
        options: Arc<CrawlerOptions>,
        frontier: Arc<Frontier>,
        storage: Box<dyn Storage + Send>,
        validator: HostValidator,
    ) -> Result<Self, CrawlError> {
        let client = build_http_client(&options)?;

        Ok(Self {
            compliance: ComplianceEngine::new(Arc::clone(&options), validator),
            robots: RobotsCache::new(options.robots_cache_size),
            stats: CrawlStats::new(),
            storage: Mutex::new(storage),
            options,
            frontier,
            client,
        })
    }

    pub fn options(&self) -> &CrawlerOptions {
        &self.options
    }

    pub fn frontier(&self) -> &Arc<Frontier> {
        &self.frontier
    }

    pub fn stats(&self) -> &CrawlStats {
        &self.stats
    }

    /// Runs a closure against the storage backend
    pub fn with_storage<T>(&self, f: impl FnOnce(&mut dyn Storage) -> T) -> T {
        let mut storage = self.storage.lock();
        f(&mut **storage)
    }

    /// Crawls one URL from the frontier
    ///
    /// # Errors
    ///
    /// Only [`CrawlError::NoUrl`] is returned. Every other failure is logged
    /// and reported as [`StepOutcome::Failed`].
    pub async fn step(&self) -> Result<StepOutcome, CrawlError> {
        let start = Instant::now();
        let in_flight = self.frontier.next_in_flight()?;
        let url = in_flight.url().to_string();

        match self.process(&url, start).await {
            Ok(StepOutcome::Deferred(wait)) => {
                tracing::debug!("Deferring {} for {:?}", short_url(&url), wait);
                in_flight.requeue();
                Ok(StepOutcome::Deferred(wait))
            }
            Ok(outcome) => Ok(outcome),
            Err(e) if e.is_connection() => {
                tracing::info!("Request error on page {}: {}", short_url(&url), e);
                self.stats.record_failure();
                Ok(StepOutcome::Failed)
            }
            Err(e) => {
                tracing::error!("Error in step for {}: {}", short_url(&url), e);
                Ok(StepOutcome::Failed)
            }
        }
    }

    async fn process(&self, url: &str, start: Instant) -> Result<StepOutcome, CrawlError> {
        let (protocol, domain) = get_protocol_and_domain_from_url(url)?;
        let entry = self.robots.entry(&domain);

        {
            let mut guard = entry.lock().await;
            if !guard.is_resolved() {
                self.resolve_domain(&mut guard, &protocol, &domain).await;
            }

            let now = Utc::now();
            if self.options.follow_robots_txt {
                let state = &mut *guard;
                let robots = state.robots.get_or_insert_with(ParsedRobots::allow_all);
                match check(&self.options, url, robots, state.last_crawled, now) {
                    RobotsVerdict::Allowed => {}
                    RobotsVerdict::Denied => {
                        tracing::info!("Page {} conflicts with robots.txt", short_url(url));
                        return Ok(StepOutcome::Denied);
                    }
                    RobotsVerdict::RetryAfter(wait) => return Ok(StepOutcome::Deferred(wait)),
                }
            }

            // Claimed under the domain lock so a concurrent worker sees it
            guard.last_crawled = Some(now);
        }

        tracing::info!("Crawling page {}", short_url(url));
        let fetched = fetch_page(&self.client, &self.options, url).await;
        self.finish_domain_fetch(&entry).await;

        let Some(page) = fetched? else {
            return Ok(StepOutcome::Empty);
        };

        if page.is_success() {
            self.enqueue_links(&page).await;
        } else {
            tracing::info!("HTTP {} @ {}", page.status_code(), short_url(url));
        }

        let crawled = self.stats.update(&page, start.elapsed());
        if crawled % 10 == 0 {
            tracing::info!(
                "Progress: {}, {} URLs in frontier across {} domains",
                self.stats.snapshot(),
                self.frontier.len(),
                self.frontier.domain_count()
            );
        }

        self.persist_page(&page);

        Ok(StepOutcome::Fetched(Box::new(page)))
    }

    /// Loads the domain's record from storage, or fetches robots.txt and
    /// creates one
    ///
    /// A robots.txt that cannot be fetched is treated as empty and not stored.
    async fn resolve_domain(&self, entry: &mut DomainEntry, protocol: &str, domain: &str) {
        match self.with_storage(|storage| storage.lookup_domain(domain)) {
            Ok(Some(record)) => {
                *entry = DomainEntry::from_record(record);
                return;
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Failed to look up domain {}: {}", domain, e),
        }

        let body = match fetch_robots_txt(&self.client, &self.options, protocol, domain).await {
            Ok(body) => body,
            Err(e) => {
                tracing::info!("Could not get robots.txt for {}: {}", domain, e);
                entry.robots = Some(ParsedRobots::allow_all());
                return;
            }
        };

        match self.with_storage(|storage| storage.create_domain(domain, &body)) {
            Ok(record) => *entry = DomainEntry::from_record(record),
            Err(e) => {
                tracing::warn!("Failed to store domain {}: {}", domain, e);
                entry.robots = Some(ParsedRobots::from_content(&body));
            }
        }
    }

    async fn finish_domain_fetch(&self, entry: &SharedDomainEntry) {
        let mut guard = entry.lock().await;
        let now = Utc::now();
        guard.last_crawled = Some(now);

        if let Some(record) = guard.record.as_mut() {
            let result = self.with_storage(|storage| storage.update_last_crawled(record, now));
            if let Err(e) = result {
                tracing::warn!("Failed to update last crawl time for {}: {}", record.domain, e);
            }
        }
    }

    async fn enqueue_links(&self, page: &Page) {
        let links: Vec<String> = page.links().into_iter().collect();
        let verdicts =
            futures_util::future::join_all(links.iter().map(|link| self.compliance.admit(link)))
                .await;

        let passed = links
            .into_iter()
            .zip(verdicts)
            .filter_map(|(link, admitted)| admitted.then_some(link));

        let added = self.frontier.add_many(passed);
        tracing::debug!("Added {} new URLs from {}", added, short_url(page.url()));
    }

    fn persist_page(&self, page: &Page) {
        let result = self.with_storage(|storage| {
            if storage.page_passes_policy(page) {
                storage.store_page(page).map(Some)
            } else {
                Ok(None)
            }
        });

        match result {
            Ok(Some(_)) => tracing::debug!("Wrote {} to database", short_url(page.url())),
            Ok(None) => tracing::info!(
                "{} doesn't follow database rules",
                short_url(page.url())
            ),
            Err(e) => tracing::error!("Failed to store {}: {}", short_url(page.url()), e),
        }
    }
}

/// Steps the crawler until stopped or the frontier is exhausted
///
/// When the frontier is momentarily empty but other workers still have URLs
/// in flight, the worker waits and tries again, since those fetches may
/// discover new links.
pub async fn run_worker(crawler: Arc<Crawler>, mut stop: watch::Receiver<bool>) {
    loop {
        if *stop.borrow() {
            break;
        }

        let wait = match crawler.step().await {
            Ok(StepOutcome::Deferred(wait)) => Some(wait.min(IDLE_WAIT)),
            Ok(_) => None,
            Err(CrawlError::NoUrl) => {
                if crawler.frontier().is_exhausted() {
                    tracing::info!("{}", CrawlError::NoUrl);
                    break;
                }
                Some(IDLE_WAIT)
            }
            Err(e) => {
                tracing::error!("Worker error: {}", e);
                None
            }
        };

        if let Some(wait) = wait {
            tokio::select! {
                _ = stop.changed() => {}
                _ = tokio::time::sleep(wait) => {}
            }
        }
    }
}

/// Spawns `workers` tasks running [`run_worker`] and waits for all of them
pub async fn run_workers(crawler: Arc<Crawler>, workers: usize, stop: watch::Receiver<bool>) {
    let handles: Vec<_> = (0..workers.max(1))
        .map(|_| tokio::spawn(run_worker(Arc::clone(&crawler), stop.clone())))
        .collect();

    for handle in handles {
        if let Err(e) = handle.await {
            tracing::error!("Worker task failed: {}", e);
        }
    }
}
