//! Storage module for persisting crawl data
//!
//! This module handles all database operations for the crawler:
//! - SQLite database initialization and schema management
//! - Per-domain robots.txt records and last crawl times
//! - Fetched pages that pass the persistence policy

mod policy;
mod schema;
mod sqlite;
mod traits;

pub use policy::PagePolicy;
pub use sqlite::{SqliteStorage, DB_MAX_CONTENT};
pub use traits::{Storage, StorageError, StorageResult};

use chrono::{DateTime, Utc};
use std::path::Path;

/// Opens the storage database, creating its parent directory if needed
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
/// * `policy` - Which pages get persisted
pub fn open_storage(path: &Path, policy: PagePolicy) -> StorageResult<SqliteStorage> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    SqliteStorage::new(path, policy)
}

/// Represents a domain in the database
#[derive(Debug, Clone, PartialEq)]
pub struct DomainRecord {
    pub id: i64,
    pub domain: String,
    pub robots: String,
    pub last_crawled: Option<DateTime<Utc>>,
}

/// Represents a stored page
#[derive(Debug, Clone)]
pub struct PageRecord {
    pub id: i64,
    pub status_code: u16,
    /// Response time in seconds
    pub elapsed: f64,
    pub crawled_at: DateTime<Utc>,
    pub url: String,
    pub domain: String,
    pub title: String,
    pub content: Vec<u8>,
}
