//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - Bounded HTTP fetching of pages and robots.txt
//! - HTML parsing and link extraction
//! - Crawl statistics
//! - Overall crawl coordination across workers

mod coordinator;
mod fetcher;
mod page;
mod parser;
mod stats;

pub use coordinator::{run_worker, run_workers, Crawler, StepOutcome};
pub use fetcher::{build_http_client, fetch_page, fetch_robots_txt};
pub use page::Page;
pub use parser::{parse_html, ParsedHtml, MAX_LINKS_PER_PAGE};
pub use stats::{CrawlStats, StatsSnapshot};
