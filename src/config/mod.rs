//! Configuration module for Linkshelf
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use linkshelf::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("linkshelf.toml")).unwrap();
//! println!("Fetch timeout: {}s", config.fetcher.timeout_secs);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CategoryEntry, ClassifierConfig, Config, FetcherConfig, KeywordRule, MetadataConfig,
    PatternRule, StorageConfig, TaxonomyConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
