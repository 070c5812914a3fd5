//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Linkshelf database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Owners of saved links, as embedded in returned links
CREATE TABLE IF NOT EXISTS owners (
    id INTEGER PRIMARY KEY,
    nick_name TEXT NOT NULL DEFAULT '',
    image_uri TEXT
);

-- Saved links, one per owner and dedup key
CREATE TABLE IF NOT EXISTS links (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_id INTEGER NOT NULL,
    url TEXT NOT NULL,
    url_key TEXT NOT NULL,
    category TEXT NOT NULL,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    thumbnail TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE(owner_id, url_key)
);

-- Every time an owner opens one of their links
CREATE TABLE IF NOT EXISTS link_opens (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_id INTEGER NOT NULL,
    link_id INTEGER NOT NULL REFERENCES links(id) ON DELETE CASCADE,
    opened_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_links_owner_created ON links(owner_id, created_at);
CREATE INDEX IF NOT EXISTS idx_links_owner_category ON links(owner_id, category);
CREATE INDEX IF NOT EXISTS idx_link_opens_owner_opened ON link_opens(owner_id, opened_at);
CREATE INDEX IF NOT EXISTS idx_link_opens_link ON link_opens(link_id);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
