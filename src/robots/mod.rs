//! Robots.txt handling module
//!
//! This module provides parsing of robots.txt files (allow/disallow, crawl-delay
//! and request-rate) and the bounded per-domain cache the crawler consults
//! before every fetch.

mod cache;
mod parser;

pub use cache::{DomainEntry, RobotsCache, SharedDomainEntry};
pub use parser::{ParsedRobots, RequestRate};

/// Builds the robots.txt URL for a domain
///
/// # Arguments
///
/// * `protocol` - The scheme including the colon (e.g. `https:`)
/// * `domain` - The authority, possibly with a port
pub fn robots_url(protocol: &str, domain: &str) -> String {
    format!("{}//{}/robots.txt", protocol, domain)
}
