//! Crawler module for page fetching
//!
//! This module contains the network side of link ingestion:
//! - A browser-like HTTP client
//! - A single-shot page fetch with timeout and redirect limits
//! - Mapping of transport and HTTP failures to [`crate::FetchError`]

mod fetcher;

pub use fetcher::{build_http_client, http_client_builder, FetchedPage, PageFetcher};
