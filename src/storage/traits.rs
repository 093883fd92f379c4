//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::crawler::Page;
use crate::storage::{DomainRecord, PageRecord};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Domain not found: {0}")]
    DomainNotFound(String),

    #[error("Invalid timestamp in database: {0}")]
    InvalidTimestamp(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Persists fetched pages and the per-domain robots record. The crawler
/// shares one backend between workers behind a mutex.
pub trait Storage {
    // ===== Domain Records =====

    /// Looks up a domain record, ignoring case
    fn lookup_domain(&self, domain: &str) -> StorageResult<Option<DomainRecord>>;

    /// Creates the record for a domain with its robots.txt body
    ///
    /// If a record already exists (in any case) it is returned unchanged.
    fn create_domain(&mut self, domain: &str, robots: &str) -> StorageResult<DomainRecord>;

    /// Sets the time a domain was last crawled, in the record and the backend
    fn update_last_crawled(
        &mut self,
        record: &mut DomainRecord,
        at: DateTime<Utc>,
    ) -> StorageResult<()>;

    // ===== Pages =====

    /// Returns true if the page should be persisted
    fn page_passes_policy(&self, page: &Page) -> bool;

    /// Stores a fetched page
    ///
    /// # Returns
    ///
    /// The ID of the new page row
    fn store_page(&mut self, page: &Page) -> StorageResult<i64>;

    /// Gets the most recently stored page for a URL
    fn get_page_by_url(&self, url: &str) -> StorageResult<Option<PageRecord>>;

    // ===== Statistics =====

    /// Gets total page count
    fn count_pages(&self) -> StorageResult<u64>;

    /// Gets the number of known domains
    fn count_domains(&self) -> StorageResult<u64>;
}
