//! Link ingestion
//!
//! Runs a submitted URL through validation, the duplicate check, page
//! fetch, content extraction and classification, then persists the result.
//! Only validation, duplicates and store write failures reach the caller;
//! every enrichment failure degrades to a stored record with a status
//! category.

mod service;
mod stage;

pub use service::{LinkService, LinkView, DEFAULT_RECENT_LIMIT, MIN_CONTENT_CHARS};
pub use stage::IngestStage;
