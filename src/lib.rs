//! OWS Crawler: a polite, security-conscious web crawler
//!
//! This crate implements the crawl orchestration engine: a domain-partitioned
//! frontier, a compliance engine (robots.txt, crawl-delay, ignored extensions,
//! private-network protection), a bounded streaming fetcher, and link
//! extraction feeding discovered URLs back into the frontier.

pub mod compliance;
pub mod config;
pub mod crawler;
pub mod frontier;
pub mod net;
pub mod robots;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for crawler operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("No URLs left to crawl!")]
    NoUrl,

    #[error("No usable seed URL in {0}")]
    NoSeed(String),

    #[error("Connection error for {url}: {source}")]
    Connection { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CrawlError {
    /// Returns true for transport failures that count as a failed crawl
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. } | Self::Timeout { .. })
    }

    /// Classifies a reqwest error raised while fetching `url`
    pub fn from_transport(url: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Connection {
                url: url.to_string(),
                source,
            }
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Failed to read ignored extensions from {path}: {source}")]
    IgnoredExtensions {
        path: String,
        source: std::io::Error,
    },
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("{0} is not a supported url.")]
    Invalid(String),
}

/// Result type alias for crawler operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

/// Shortens a URL for log lines: the first 60 characters, then `...`
pub fn short_url(url: &str) -> String {
    match url.char_indices().nth(60) {
        Some((idx, _)) => format!("{}...", &url[..idx]),
        None => url.to_string(),
    }
}

// Re-export commonly used types
pub use compliance::{ComplianceEngine, RobotsVerdict};
pub use config::CrawlerOptions;
pub use crawler::{Crawler, Page, StepOutcome};
pub use frontier::Frontier;
pub use crate::url::{get_protocol_and_domain_from_url, resolve_link};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_url_keeps_short_urls() {
        assert_eq!(short_url("https://example.com/"), "https://example.com/");
    }

    #[test]
    fn test_short_url_truncates_long_urls() {
        let long = format!("https://example.com/{}", "a".repeat(100));
        let short = short_url(&long);
        assert!(short.ends_with("..."));
        assert_eq!(short.chars().count(), 63);
    }

    #[test]
    fn test_no_url_message() {
        assert_eq!(CrawlError::NoUrl.to_string(), "No URLs left to crawl!");
    }

    #[test]
    fn test_timeout_is_connection_class() {
        let err = CrawlError::Timeout {
            url: "https://example.com/".to_string(),
        };
        assert!(err.is_connection());
        assert!(!CrawlError::NoUrl.is_connection());
    }
}
