use crate::url::{get_protocol_and_domain_from_url, is_http_url};
use crate::{CrawlError, UrlResult};
use parking_lot::Mutex;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Serializable frontier state
///
/// `to_crawl` maps each domain to its pending URLs; `enqueued` lists every
/// URL ever admitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrontierSnapshot {
    pub to_crawl: BTreeMap<String, Vec<String>>,
    pub enqueued: Vec<String>,
}

#[derive(Debug, Default)]
struct FrontierState {
    buckets: HashMap<String, Vec<String>>,
    enqueued: HashSet<String>,
    in_flight: usize,
}

impl FrontierState {
    fn push(&mut self, domain: String, url: String) {
        self.buckets.entry(domain).or_default().push(url);
    }

    fn admit(&mut self, url: &str, domain: Option<&str>) -> bool {
        if !is_http_url(url) || self.enqueued.contains(url) {
            return false;
        }

        let domain = match domain {
            Some(domain) => domain.to_string(),
            None => match get_protocol_and_domain_from_url(url) {
                Ok((_, domain)) => domain,
                Err(_) => return false,
            },
        };

        self.enqueued.insert(url.to_string());
        self.push(domain, url.to_string());
        true
    }
}

/// Domain-partitioned crawl queue shared by all workers
///
/// Pending URLs are grouped by domain. [`Frontier::get_next_url`] picks a
/// domain uniformly at random, then a URL within it, so one large site cannot
/// starve the others. Every operation runs under a single lock.
#[derive(Debug, Default)]
pub struct Frontier {
    state: Mutex<FrontierState>,
}

impl Frontier {
    /// Creates a frontier holding only the seed URL
    pub fn new(seed_url: &str) -> UrlResult<Self> {
        let (_, domain) = get_protocol_and_domain_from_url(seed_url)?;

        let frontier = Self::default();
        {
            let mut state = frontier.state.lock();
            state.enqueued.insert(seed_url.to_string());
            state.push(domain, seed_url.to_string());
        }
        Ok(frontier)
    }

    /// Rebuilds a frontier from a snapshot
    ///
    /// Empty buckets are dropped; pending URLs missing from `enqueued` are
    /// added to it.
    pub fn from_snapshot(snapshot: FrontierSnapshot) -> Self {
        let mut state = FrontierState {
            enqueued: snapshot.enqueued.into_iter().collect(),
            ..FrontierState::default()
        };

        for (domain, urls) in snapshot.to_crawl {
            for url in urls {
                state.enqueued.insert(url.clone());
                state.push(domain.clone(), url);
            }
        }

        Self {
            state: Mutex::new(state),
        }
    }

    /// Copies the pending URLs and the enqueued set
    pub fn snapshot(&self) -> FrontierSnapshot {
        let state = self.state.lock();

        let mut enqueued: Vec<String> = state.enqueued.iter().cloned().collect();
        enqueued.sort();

        FrontierSnapshot {
            to_crawl: state
                .buckets
                .iter()
                .map(|(domain, urls)| (domain.clone(), urls.clone()))
                .collect(),
            enqueued,
        }
    }

    /// Removes and returns a URL from a random domain
    ///
    /// The URL counts as in flight until [`Frontier::mark_done`] or
    /// [`Frontier::requeue`] is called for it.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError::NoUrl`] if no URLs are pending.
    pub fn get_next_url(&self) -> Result<String, CrawlError> {
        let mut state = self.state.lock();

        if state.buckets.is_empty() {
            return Err(CrawlError::NoUrl);
        }

        let mut rng = rand::rng();
        let domain_index = rng.random_range(0..state.buckets.len());
        let domain = state
            .buckets
            .keys()
            .nth(domain_index)
            .cloned()
            .ok_or(CrawlError::NoUrl)?;

        let bucket = state.buckets.get_mut(&domain).ok_or(CrawlError::NoUrl)?;
        let url_index = rng.random_range(0..bucket.len());
        let url = bucket.swap_remove(url_index);

        if bucket.is_empty() {
            state.buckets.remove(&domain);
        }

        state.in_flight += 1;
        Ok(url)
    }

    /// Like [`Frontier::get_next_url`], returning a guard that marks the URL
    /// done when dropped
    pub fn next_in_flight(&self) -> Result<InFlight<'_>, CrawlError> {
        let url = self.get_next_url()?;
        Ok(InFlight {
            frontier: self,
            url,
            released: false,
        })
    }

    /// Adds a URL to its domain's bucket
    ///
    /// Returns false if the URL is not http(s), has no domain, or was already
    /// enqueued.
    ///
    /// # Arguments
    ///
    /// * `url` - The absolute URL
    /// * `domain` - The URL's domain, computed from the URL if `None`
    pub fn add_to_queue(&self, url: &str, domain: Option<&str>) -> bool {
        self.state.lock().admit(url, domain)
    }

    /// Adds every URL not already enqueued
    ///
    /// # Returns
    ///
    /// The number of URLs added
    pub fn add_many<I>(&self, urls: I) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        let mut state = self.state.lock();
        urls.into_iter()
            .filter(|url| state.admit(url, None))
            .count()
    }

    /// Puts a URL handed out by [`Frontier::get_next_url`] back into its bucket
    ///
    /// The enqueued set is not consulted, and the URL stops counting as in
    /// flight.
    pub fn requeue(&self, url: &str) -> bool {
        let mut state = self.state.lock();
        state.in_flight = state.in_flight.saturating_sub(1);

        match get_protocol_and_domain_from_url(url) {
            Ok((_, domain)) => {
                state.push(domain, url.to_string());
                true
            }
            Err(_) => false,
        }
    }

    /// Marks one handed-out URL as finished
    pub fn mark_done(&self) {
        let mut state = self.state.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
    }

    /// Returns true when nothing is pending and nothing is in flight
    pub fn is_exhausted(&self) -> bool {
        let state = self.state.lock();
        state.buckets.is_empty() && state.in_flight == 0
    }

    /// Number of pending URLs
    pub fn len(&self) -> usize {
        self.state.lock().buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().buckets.is_empty()
    }

    /// Number of domains with pending URLs
    pub fn domain_count(&self) -> usize {
        self.state.lock().buckets.len()
    }

    pub fn contains_domain(&self, domain: &str) -> bool {
        self.state.lock().buckets.contains_key(domain)
    }

    pub fn is_enqueued(&self, url: &str) -> bool {
        self.state.lock().enqueued.contains(url)
    }

    pub fn enqueued_count(&self) -> usize {
        self.state.lock().enqueued.len()
    }

    pub fn in_flight(&self) -> usize {
        self.state.lock().in_flight
    }
}

/// A URL taken from the frontier
///
/// Dropping the guard marks the URL done; [`InFlight::requeue`] puts it back
/// instead.
#[derive(Debug)]
pub struct InFlight<'a> {
    frontier: &'a Frontier,
    url: String,
    released: bool,
}

impl InFlight<'_> {
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the URL to its bucket for a later attempt
    pub fn requeue(mut self) -> bool {
        self.released = true;
        self.frontier.requeue(&self.url)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.released {
            self.frontier.mark_done();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;
    use std::sync::Barrier;
    use std::thread;

    fn drain(frontier: &Frontier) -> Vec<String> {
        let mut urls = Vec::new();
        while let Ok(url) = frontier.get_next_url() {
            frontier.mark_done();
            urls.push(url);
        }
        urls
    }

    #[test]
    fn test_new_seeds_one_bucket() {
        let frontier = Frontier::new("https://example.com/start").unwrap();
        assert_eq!(frontier.len(), 1);
        assert!(frontier.contains_domain("example.com"));
        assert!(frontier.is_enqueued("https://example.com/start"));
    }

    #[test]
    fn test_new_rejects_invalid_seed() {
        assert!(Frontier::new("example.com").is_err());
    }

    #[test]
    fn test_empty_frontier_has_no_url() {
        let frontier = Frontier::default();
        assert!(matches!(frontier.get_next_url(), Err(CrawlError::NoUrl)));
        assert!(frontier.is_exhausted());
    }

    #[test]
    fn test_add_to_queue_rejects_non_http() {
        let frontier = Frontier::default();
        assert!(!frontier.add_to_queue("ftp://example.com/file", None));
        assert!(!frontier.add_to_queue("mailto:someone@example.com", None));
        assert!(frontier.add_to_queue("HTTP://example.com/", None));
        assert_eq!(frontier.len(), 1);
    }

    #[test]
    fn test_add_to_queue_uses_given_domain() {
        let frontier = Frontier::default();
        assert!(frontier.add_to_queue("https://a.com/x", Some("bucket")));
        assert!(frontier.contains_domain("bucket"));
        assert!(!frontier.contains_domain("a.com"));
    }

    #[test]
    fn test_add_many_skips_enqueued() {
        let frontier = Frontier::new("https://a.com/").unwrap();
        let added = frontier.add_many(vec![
            "https://a.com/".to_string(),
            "https://a.com/1".to_string(),
            "https://a.com/1".to_string(),
            "https://b.com/".to_string(),
        ]);

        assert_eq!(added, 2);
        assert_eq!(frontier.len(), 3);
        assert_eq!(frontier.domain_count(), 2);
    }

    #[test]
    fn test_fetched_urls_are_not_readmitted() {
        let frontier = Frontier::new("https://a.com/").unwrap();
        let url = frontier.get_next_url().unwrap();
        frontier.mark_done();

        assert_eq!(frontier.add_many(vec![url]), 0);
        assert!(frontier.is_exhausted());
    }

    #[test]
    fn test_bucket_removed_when_empty() {
        let frontier = Frontier::new("https://a.com/").unwrap();
        frontier.add_to_queue("https://b.com/", None);

        let url = frontier.get_next_url().unwrap();
        let (_, domain) = get_protocol_and_domain_from_url(&url).unwrap();

        assert!(!frontier.contains_domain(&domain));
        assert_eq!(frontier.domain_count(), 1);
    }

    #[test]
    fn test_in_flight_blocks_exhaustion() {
        let frontier = Frontier::new("https://a.com/").unwrap();

        let guard = frontier.next_in_flight().unwrap();
        assert!(frontier.is_empty());
        assert!(!frontier.is_exhausted());

        drop(guard);
        assert!(frontier.is_exhausted());
    }

    #[test]
    fn test_requeue_returns_url() {
        let frontier = Frontier::new("https://a.com/page").unwrap();

        let guard = frontier.next_in_flight().unwrap();
        assert_eq!(guard.url(), "https://a.com/page");
        assert!(guard.requeue());

        assert_eq!(frontier.in_flight(), 0);
        assert_eq!(frontier.get_next_url().unwrap(), "https://a.com/page");
    }

    #[test]
    fn test_snapshot_roundtrip_keeps_pending() {
        let frontier = Frontier::new("https://a.com/").unwrap();
        frontier.add_many(vec!["https://b.com/1".to_string(), "https://b.com/2".to_string()]);
        frontier.get_next_url().unwrap();
        frontier.mark_done();

        let snapshot = frontier.snapshot();
        let restored = Frontier::from_snapshot(snapshot.clone());

        assert_eq!(restored.len(), frontier.len());
        assert_eq!(restored.enqueued_count(), 3);
        assert_eq!(restored.snapshot(), snapshot);
    }

    #[test]
    fn test_from_snapshot_drops_empty_buckets() {
        let mut to_crawl = BTreeMap::new();
        to_crawl.insert("a.com".to_string(), vec![]);
        to_crawl.insert("b.com".to_string(), vec!["https://b.com/".to_string()]);

        let frontier = Frontier::from_snapshot(FrontierSnapshot {
            to_crawl,
            enqueued: vec![],
        });

        assert_eq!(frontier.domain_count(), 1);
        assert!(frontier.is_enqueued("https://b.com/"));
    }

    #[test]
    fn test_concurrent_workers_never_share_urls() {
        let frontier = Arc::new(Frontier::default());
        let urls: Vec<String> = (0..400)
            .map(|i| format!("https://d{}.com/p{}", i % 13, i))
            .collect();

        let adders: Vec<_> = (0..8)
            .map(|t| {
                let frontier = Arc::clone(&frontier);
                let urls = urls.clone();
                thread::spawn(move || {
                    // Overlapping slices so the same URL is offered many times
                    frontier.add_many(urls.into_iter().skip(t * 20))
                })
            })
            .collect();
        let added: usize = adders.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(added, urls.len());

        let takers: Vec<_> = (0..8)
            .map(|_| {
                let frontier = Arc::clone(&frontier);
                thread::spawn(move || drain(&frontier))
            })
            .collect();

        let mut taken: Vec<String> = takers
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        let total = taken.len();
        taken.sort();
        taken.dedup();

        assert_eq!(total, urls.len());
        assert_eq!(taken.len(), urls.len());
        assert!(frontier.is_exhausted());
    }

    /// Runs `threads` workers that alternate `add_many` over overlapping
    /// slices with `get_next_url`, then drains what is left
    ///
    /// Returns every URL handed out, in no particular order.
    fn interleaved_run(urls: &[String], threads: usize, chunk: usize, pops: usize) -> Vec<String> {
        let frontier = Arc::new(Frontier::default());
        let barrier = Arc::new(Barrier::new(threads));
        let stride = urls.len() / threads.max(1) / 2;

        let workers: Vec<_> = (0..threads)
            .map(|t| {
                let frontier = Arc::clone(&frontier);
                let barrier = Arc::clone(&barrier);
                // Each slice overlaps the next thread's slice by half
                let slice: Vec<String> = urls.iter().skip(t * stride).cloned().collect();
                thread::spawn(move || {
                    barrier.wait();
                    let mut taken = Vec::new();
                    for batch in slice.chunks(chunk.max(1)) {
                        frontier.add_many(batch.to_vec());
                        for _ in 0..pops {
                            match frontier.get_next_url() {
                                Ok(url) => {
                                    taken.push(url);
                                    frontier.mark_done();
                                }
                                Err(_) => break,
                            }
                        }
                    }
                    taken.extend(drain(&frontier));
                    taken
                })
            })
            .collect();

        let mut taken: Vec<String> = workers
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        taken.extend(drain(&frontier));

        assert!(frontier.is_exhausted());
        assert_eq!(frontier.in_flight(), 0);
        taken
    }

    #[test]
    fn test_interleaved_add_and_pop() {
        let urls: Vec<String> = (0..600)
            .map(|i| format!("https://d{}.com/p{}", i % 17, i))
            .collect();

        for (threads, chunk, pops) in [(8, 7, 3), (4, 1, 1), (16, 25, 10)] {
            let taken = interleaved_run(&urls, threads, chunk, pops);
            let unique: HashSet<&String> = taken.iter().collect();

            assert_eq!(taken.len(), urls.len(), "threads={}", threads);
            assert_eq!(unique.len(), urls.len(), "threads={}", threads);
        }
    }

    proptest! {
        #[test]
        fn prop_every_admitted_url_is_handed_out_once(
            picks in proptest::collection::vec((0usize..6, 0usize..30), 0..200)
        ) {
            let frontier = Frontier::default();
            let urls: Vec<String> = picks
                .iter()
                .map(|(d, p)| format!("https://site{}.org/page/{}", d, p))
                .collect();
            let unique: HashSet<String> = urls.iter().cloned().collect();

            let added = frontier.add_many(urls);
            prop_assert_eq!(added, unique.len());

            let mut seen = HashSet::new();
            while let Ok(url) = frontier.get_next_url() {
                prop_assert!(seen.insert(url.clone()), "{} handed out twice", url);
                prop_assert!(frontier.snapshot().to_crawl.values().all(|b| !b.is_empty()));
                frontier.mark_done();
            }

            prop_assert_eq!(seen, unique);
            prop_assert!(frontier.is_exhausted());
        }

        #[test]
        fn prop_interleaved_workers_hand_out_each_url_once(
            count in 1usize..150,
            domains in 1usize..8,
            threads in 2usize..6,
            chunk in 1usize..10,
            pops in 0usize..5,
        ) {
            let urls: Vec<String> = (0..count)
                .map(|i| format!("https://site{}.org/{}", i % domains, i))
                .collect();

            let taken = interleaved_run(&urls, threads, chunk, pops);
            let unique: HashSet<&String> = taken.iter().collect();

            prop_assert_eq!(taken.len(), urls.len());
            prop_assert_eq!(unique.len(), urls.len());
        }
    }
}
