//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the LinkStore trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{LinkStore, StorageError, StorageResult};
use crate::storage::{LinkRecord, NewLink, OwnerSummary};
use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::path::Path;

const LINK_COLUMNS: &str = "id, owner_id, url, url_key, category, title, description, thumbnail, created_at, updated_at";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn query_links(
        &self,
        sql_tail: &str,
        params: impl rusqlite::Params,
    ) -> StorageResult<Vec<LinkRecord>> {
        let sql = format!("SELECT {} FROM links {}", LINK_COLUMNS, sql_tail);
        let mut stmt = self.conn.prepare(&sql)?;
        let links = stmt
            .query_map(params, row_to_link)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(links)
    }
}

fn row_to_link(row: &Row<'_>) -> rusqlite::Result<LinkRecord> {
    Ok(LinkRecord {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        url: row.get(2)?,
        url_key: row.get(3)?,
        category: row.get(4)?,
        title: row.get(5)?,
        description: row.get(6)?,
        thumbnail: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

/// Fixed-width UTC timestamp so that text order is time order
fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ErrorCode::ConstraintViolation
                && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

impl LinkStore for SqliteStorage {
    // ===== Links =====

    fn create(&mut self, link: &NewLink) -> StorageResult<LinkRecord> {
        let now = now();
        let inserted = self.conn.execute(
            "INSERT INTO links (owner_id, url, url_key, category, title, description, thumbnail, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
            params![
                link.owner_id,
                link.url,
                link.url_key,
                link.category,
                link.title,
                link.description,
                link.thumbnail,
                now
            ],
        );

        match inserted {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                return Err(StorageError::Duplicate {
                    owner_id: link.owner_id,
                    url_key: link.url_key.clone(),
                })
            }
            Err(e) => return Err(e.into()),
        }

        Ok(LinkRecord {
            id: self.conn.last_insert_rowid(),
            owner_id: link.owner_id,
            url: link.url.clone(),
            url_key: link.url_key.clone(),
            category: link.category.clone(),
            title: link.title.clone(),
            description: link.description.clone(),
            thumbnail: link.thumbnail.clone(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    fn find_by_owner_and_url(
        &self,
        owner_id: i64,
        url_key: &str,
    ) -> StorageResult<Option<LinkRecord>> {
        let sql = format!(
            "SELECT {} FROM links WHERE owner_id = ?1 AND url_key = ?2",
            LINK_COLUMNS
        );
        let link = self
            .conn
            .query_row(&sql, params![owner_id, url_key], row_to_link)
            .optional()?;
        Ok(link)
    }

    fn get_by_id(&self, owner_id: i64, link_id: i64) -> StorageResult<Option<LinkRecord>> {
        let sql = format!(
            "SELECT {} FROM links WHERE owner_id = ?1 AND id = ?2",
            LINK_COLUMNS
        );
        let link = self
            .conn
            .query_row(&sql, params![owner_id, link_id], row_to_link)
            .optional()?;
        Ok(link)
    }

    fn list_by_owner(&self, owner_id: i64) -> StorageResult<Vec<LinkRecord>> {
        self.query_links(
            "WHERE owner_id = ?1 ORDER BY created_at DESC, id DESC",
            params![owner_id],
        )
    }

    fn list_by_category(&self, owner_id: i64, category: &str) -> StorageResult<Vec<LinkRecord>> {
        self.query_links(
            "WHERE owner_id = ?1 AND category = ?2 ORDER BY created_at DESC, id DESC",
            params![owner_id, category],
        )
    }

    fn list_recent(&self, owner_id: i64, limit: usize) -> StorageResult<Vec<LinkRecord>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.query_links(
            "WHERE owner_id = ?1 ORDER BY created_at DESC, id DESC LIMIT ?2",
            params![owner_id, limit],
        )
    }

    fn delete(&mut self, owner_id: i64, link_id: i64) -> StorageResult<bool> {
        let deleted = self.conn.execute(
            "DELETE FROM links WHERE owner_id = ?1 AND id = ?2",
            params![owner_id, link_id],
        )?;
        Ok(deleted > 0)
    }

    fn count_by_owner(&self, owner_id: i64) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM links WHERE owner_id = ?1",
            params![owner_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    // ===== Open history =====

    fn record_open(&mut self, owner_id: i64, link_id: i64) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO link_opens (owner_id, link_id, opened_at) VALUES (?1, ?2, ?3)",
            params![owner_id, link_id, now()],
        )?;
        Ok(())
    }

    fn list_recently_opened(&self, owner_id: i64, limit: usize) -> StorageResult<Vec<LinkRecord>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.query_links(
            "JOIN (
                 SELECT link_id, MAX(opened_at) AS last_opened_at, MAX(id) AS last_open_id
                 FROM link_opens
                 WHERE owner_id = ?1
                 GROUP BY link_id
             ) opens ON opens.link_id = links.id
             WHERE links.owner_id = ?1
             ORDER BY opens.last_opened_at DESC, opens.last_open_id DESC
             LIMIT ?2",
            params![owner_id, limit],
        )
    }

    // ===== Owners =====

    fn upsert_owner(&mut self, owner: &OwnerSummary) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO owners (id, nick_name, image_uri) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET nick_name = excluded.nick_name, image_uri = excluded.image_uri",
            params![owner.id, owner.nick_name, owner.image_uri],
        )?;
        Ok(())
    }

    fn get_owner(&self, owner_id: i64) -> StorageResult<Option<OwnerSummary>> {
        let owner = self
            .conn
            .query_row(
                "SELECT id, nick_name, image_uri FROM owners WHERE id = ?1",
                params![owner_id],
                |row| {
                    Ok(OwnerSummary {
                        id: row.get(0)?,
                        nick_name: row.get(1)?,
                        image_uri: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(owner)
    }
}
