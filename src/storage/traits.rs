//! Storage traits and error types
//!
//! This module defines the trait interface for link stores and associated
//! error types.

use crate::storage::{LinkRecord, NewLink, OwnerSummary};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Link already stored for owner {owner_id}: {url_key}")]
    Duplicate { owner_id: i64, url_key: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for link store implementations
///
/// Every query is scoped to one owner; a link is never visible to or
/// removable by another owner. Lists are ordered newest first.
pub trait LinkStore {
    // ===== Links =====

    /// Inserts a new link
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Duplicate`] when the owner already has a link
    /// with the same dedup key.
    fn create(&mut self, link: &NewLink) -> StorageResult<LinkRecord>;

    /// Looks up a link by owner and dedup key
    fn find_by_owner_and_url(&self, owner_id: i64, url_key: &str)
        -> StorageResult<Option<LinkRecord>>;

    /// Gets a link by ID, only when it belongs to the owner
    fn get_by_id(&self, owner_id: i64, link_id: i64) -> StorageResult<Option<LinkRecord>>;

    /// All links of an owner
    fn list_by_owner(&self, owner_id: i64) -> StorageResult<Vec<LinkRecord>>;

    /// Links of an owner filed under one category label
    fn list_by_category(&self, owner_id: i64, category: &str) -> StorageResult<Vec<LinkRecord>>;

    /// The `limit` newest links of an owner
    fn list_recent(&self, owner_id: i64, limit: usize) -> StorageResult<Vec<LinkRecord>>;

    /// Deletes a link of the owner
    ///
    /// Returns false when no such link exists for that owner.
    fn delete(&mut self, owner_id: i64, link_id: i64) -> StorageResult<bool>;

    /// Number of links of an owner
    fn count_by_owner(&self, owner_id: i64) -> StorageResult<u64>;

    // ===== Open history =====

    /// Records that the owner opened one of their links
    fn record_open(&mut self, owner_id: i64, link_id: i64) -> StorageResult<()>;

    /// The `limit` links the owner opened most recently
    ///
    /// Each link appears once, ordered by its latest open.
    fn list_recently_opened(&self, owner_id: i64, limit: usize) -> StorageResult<Vec<LinkRecord>>;

    // ===== Owners =====

    /// Inserts or replaces an owner summary
    fn upsert_owner(&mut self, owner: &OwnerSummary) -> StorageResult<()>;

    /// Gets an owner summary
    fn get_owner(&self, owner_id: i64) -> StorageResult<Option<OwnerSummary>>;
}
