//! Linkshelf: a link bookmarking pipeline
//!
//! This crate takes a user-submitted URL, fetches the page, extracts a text
//! summary and preview metadata, and files the link under one category of a
//! fixed taxonomy. Classification always succeeds: when the network, the page
//! or the AI backend fails, deterministic fallbacks pick the category.

pub mod classify;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod ingest;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for link operations surfaced to callers
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Link is already registered: {url}")]
    DuplicateLink { url: String },

    #[error("Unknown category: {0}")]
    InvalidCategory(String),

    #[error("Link not found: {0}")]
    LinkNotFound(i64),

    #[error("Failed to save link: {0}")]
    LinkSaveFailed(#[source] storage::StorageError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
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

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid keyword pattern for '{category}': {message}")]
    InvalidPattern { category: String, message: String },
}

/// URL validation errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("URL is {len} characters long, the limit is {max}")]
    TooLong { len: usize, max: usize },

    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),
}

/// Page fetch failures
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Domain does not exist: {url}")]
    DomainNotFound { url: String },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Access denied by {url}")]
    AccessDenied { url: String },

    #[error("Failed to crawl {url}: {message}")]
    CrawlFailure { url: String, message: String },
}

/// Content extraction failures
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Document is empty")]
    EmptyDocument,
}

/// Result type alias for link operations
pub type Result<T> = std::result::Result<T, LinkError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use classify::{Category, CategoryClassifier, PipelineStatus, Taxonomy};
pub use config::Config;
pub use ingest::LinkService;
pub use crate::url::{validate_url, CanonicalUrl};
