//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::crawler::Page;
use crate::storage::policy::PagePolicy;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{DomainRecord, PageRecord};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// Maximum number of content bytes written per page
pub const DB_MAX_CONTENT: usize = 15_000_000;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
    policy: PagePolicy,
}

impl SqliteStorage {
    /// Opens or creates the database at `path`
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    /// * `policy` - Which pages get persisted
    pub fn new(path: &Path, policy: PagePolicy) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            PRAGMA mmap_size = 268435456;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn, policy })
    }

    /// Creates an in-memory database
    pub fn in_memory(policy: PagePolicy) -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn, policy })
    }

    pub fn policy(&self) -> &PagePolicy {
        &self.policy
    }
}

fn parse_timestamp(raw: Option<String>) -> StorageResult<Option<DateTime<Utc>>> {
    raw.map(|value| {
        DateTime::parse_from_rfc3339(&value)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(|_| StorageError::InvalidTimestamp(value))
    })
    .transpose()
}

fn domain_from_row(row: &Row<'_>) -> rusqlite::Result<(i64, String, String, Option<String>)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

impl Storage for SqliteStorage {
    // ===== Domain Records =====

    fn lookup_domain(&self, domain: &str) -> StorageResult<Option<DomainRecord>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, domain, robots, last_crawled FROM domains WHERE lower(domain) = lower(?1)",
                params![domain],
                domain_from_row,
            )
            .optional()?;

        match row {
            Some((id, domain, robots, last_crawled)) => Ok(Some(DomainRecord {
                id,
                domain,
                robots,
                last_crawled: parse_timestamp(last_crawled)?,
            })),
            None => Ok(None),
        }
    }

    fn create_domain(&mut self, domain: &str, robots: &str) -> StorageResult<DomainRecord> {
        self.conn.execute(
            "INSERT OR IGNORE INTO domains (domain, robots) VALUES (?1, ?2)",
            params![domain, robots],
        )?;

        self.lookup_domain(domain)?
            .ok_or_else(|| StorageError::DomainNotFound(domain.to_string()))
    }

    fn update_last_crawled(
        &mut self,
        record: &mut DomainRecord,
        at: DateTime<Utc>,
    ) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE domains SET last_crawled = ?1 WHERE id = ?2",
            params![at.to_rfc3339(), record.id],
        )?;

        if updated == 0 {
            return Err(StorageError::DomainNotFound(record.domain.clone()));
        }

        record.last_crawled = Some(at);
        Ok(())
    }

    // ===== Pages =====

    fn page_passes_policy(&self, page: &Page) -> bool {
        self.policy.allows(page.headers())
    }

    fn store_page(&mut self, page: &Page) -> StorageResult<i64> {
        let content = page.content();
        let content = &content[..content.len().min(DB_MAX_CONTENT)];

        self.conn.execute(
            "INSERT INTO pages (status_code, elapsed, crawled_at, url, domain, title, content)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                page.status_code(),
                page.elapsed().as_secs_f64(),
                Utc::now().to_rfc3339(),
                page.url(),
                page.domain(),
                page.html_title(),
                content,
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get_page_by_url(&self, url: &str) -> StorageResult<Option<PageRecord>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, status_code, elapsed, crawled_at, url, domain, title, content
                 FROM pages WHERE url = ?1 ORDER BY id DESC LIMIT 1",
                params![url],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, u16>(1)?,
                        row.get::<_, f64>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, String>(5)?,
                        row.get::<_, Option<String>>(6)?,
                        row.get::<_, Option<Vec<u8>>>(7)?,
                    ))
                },
            )
            .optional()?;

        let Some((id, status_code, elapsed, crawled_at, url, domain, title, content)) = row else {
            return Ok(None);
        };

        let crawled_at = parse_timestamp(Some(crawled_at))?
            .ok_or_else(|| StorageError::InvalidTimestamp(url.clone()))?;

        Ok(Some(PageRecord {
            id,
            status_code,
            elapsed,
            crawled_at,
            url,
            domain,
            title: title.unwrap_or_default(),
            content: content.unwrap_or_default(),
        }))
    }

    // ===== Statistics =====

    fn count_pages(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM pages", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_domains(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM domains", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
