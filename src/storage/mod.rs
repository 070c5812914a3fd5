//! Storage module for persisting saved links
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Link persistence with per-owner uniqueness of the dedup key
//! - Owner summaries embedded in returned links

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{LinkStore, StorageError, StorageResult};

use serde::Serialize;

/// A saved link as stored in the database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRecord {
    pub id: i64,
    pub owner_id: i64,
    pub url: String,
    pub url_key: String,
    pub category: String,
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields of a link about to be created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLink {
    pub owner_id: i64,
    pub url: String,
    pub url_key: String,
    pub category: String,
    pub title: String,
    pub description: String,
    pub thumbnail: String,
}

/// The owner shape embedded in returned links
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnerSummary {
    pub id: i64,
    pub nick_name: String,
    pub image_uri: Option<String>,
}

impl OwnerSummary {
    /// Summary for an owner that never set a profile
    pub fn anonymous(id: i64) -> Self {
        Self {
            id,
            nick_name: String::new(),
            image_uri: None,
        }
    }
}
