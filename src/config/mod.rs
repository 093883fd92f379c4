//! Configuration module for the crawler
//!
//! This module handles loading, parsing, and validating the TOML configuration
//! file, and resolving it into the immutable [`CrawlerOptions`] every
//! component reads.
//!
//! # Example
//!
//! ```no_run
//! use ows_crawler::config::{load_config, CrawlerOptions};
//! use std::path::Path;
//!
//! let config = load_config(Path::new("configs/crawler.toml")).unwrap();
//! let options = CrawlerOptions::from_config(&config.crawler).unwrap();
//! println!("Max page size: {}", options.max_page_size);
//! ```

mod options;
mod parser;
mod types;
mod validation;

pub use options::{load_ignored_extensions, CrawlerOptions};
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use types::{Config, CrawlerConfig, OutputConfig, DEFAULT_USER_AGENT};
