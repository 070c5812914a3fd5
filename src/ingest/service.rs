use crate::classify::{Category, CategoryClassifier, CompletionBackend, PipelineStatus, Taxonomy};
use crate::config::Config;
use crate::crawler::PageFetcher;
use crate::extract::{ContentExtractor, PageMetadata};
use crate::ingest::stage::IngestStage;
use crate::storage::{LinkRecord, LinkStore, NewLink, OwnerSummary, StorageError};
use crate::url::{validate_url, CanonicalUrl};
use crate::{LinkError, Result};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};

/// Extracted text shorter than this is filed as insufficient content
pub const MIN_CONTENT_CHARS: usize = 50;

/// Number of links returned by [`LinkService::recent_links`] and
/// [`LinkService::recently_opened_links`] by default
pub const DEFAULT_RECENT_LIMIT: usize = 5;

/// A saved link as returned to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkView {
    pub id: i64,
    pub url: String,
    pub category: String,
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    pub created_at: String,
    pub updated_at: String,
    pub owner: OwnerSummary,
}

impl LinkView {
    fn new(record: LinkRecord, owner: OwnerSummary) -> Self {
        Self {
            id: record.id,
            url: record.url,
            category: record.category,
            title: record.title,
            description: record.description,
            thumbnail: record.thumbnail,
            created_at: record.created_at,
            updated_at: record.updated_at,
            owner,
        }
    }
}

/// Orchestrates link ingestion and owner-scoped link queries
///
/// Submissions share nothing but the store, which sits behind a mutex that
/// is only locked between awaits.
pub struct LinkService<S: LinkStore> {
    fetcher: PageFetcher,
    extractor: ContentExtractor,
    classifier: CategoryClassifier,
    store: Mutex<S>,
}

impl<S: LinkStore> LinkService<S> {
    pub fn new(
        fetcher: PageFetcher,
        extractor: ContentExtractor,
        classifier: CategoryClassifier,
        store: S,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            classifier,
            store: Mutex::new(store),
        }
    }

    /// Wires a service from configuration
    ///
    /// The taxonomy comes from the `[taxonomy]` section when present and
    /// from the built-in vocabulary otherwise.
    pub fn from_config(
        config: &Config,
        backend: Arc<dyn CompletionBackend>,
        store: S,
    ) -> Result<Self> {
        let taxonomy = match &config.taxonomy {
            Some(taxonomy) => Taxonomy::from_config(taxonomy)?,
            None => Taxonomy::default(),
        };

        Ok(Self::new(
            PageFetcher::new(&config.fetcher)?,
            ContentExtractor::new(&config.metadata),
            CategoryClassifier::new(Arc::new(taxonomy), backend, &config.classifier),
            store,
        ))
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        self.classifier.taxonomy()
    }

    fn store(&self) -> Result<MutexGuard<'_, S>> {
        self.store
            .lock()
            .map_err(|_| LinkError::Storage(StorageError::Database("link store lock poisoned".to_string())))
    }

    /// Embeds the owner summary; a failed owner lookup degrades to the
    /// anonymous summary so that an already stored link is still returned
    fn view(&self, store: &S, record: LinkRecord) -> LinkView {
        let owner = match store.get_owner(record.owner_id) {
            Ok(owner) => owner.unwrap_or_else(|| OwnerSummary::anonymous(record.owner_id)),
            Err(e) => {
                tracing::warn!(owner_id = record.owner_id, error = %e, "Owner lookup failed");
                OwnerSummary::anonymous(record.owner_id)
            }
        };
        LinkView::new(record, owner)
    }

    fn views(&self, store: &S, records: Vec<LinkRecord>) -> Vec<LinkView> {
        records
            .into_iter()
            .map(|record| self.view(store, record))
            .collect()
    }

    /// Validates, enriches, classifies and stores a submitted URL
    ///
    /// # Errors
    ///
    /// - [`LinkError::Url`] when the input is not an acceptable URL
    /// - [`LinkError::DuplicateLink`] when the owner already saved it
    /// - [`LinkError::LinkSaveFailed`] when the store rejects the write
    ///
    /// Fetch, extraction and classifier failures are not errors: the link is
    /// stored with a status category or a fallback category instead.
    pub async fn create_link(&self, owner_id: i64, raw_url: &str) -> Result<LinkView> {
        let url = match validate_url(raw_url) {
            Ok(url) => url,
            Err(e) => {
                tracing::info!(
                    owner_id,
                    stage = %IngestStage::RejectedInput,
                    error = %e,
                    "Rejected link submission"
                );
                return Err(e.into());
            }
        };
        tracing::debug!(owner_id, url = %url, stage = %IngestStage::Validating, "URL accepted");

        // Checked before any network call; the UNIQUE constraint covers races
        if self
            .store()?
            .find_by_owner_and_url(owner_id, url.dedup_key())?
            .is_some()
        {
            tracing::info!(owner_id, url = %url, stage = %IngestStage::RejectedInput, "Duplicate link");
            return Err(LinkError::DuplicateLink {
                url: url.to_string(),
            });
        }

        let (category, metadata) = self.enrich(&url).await;

        tracing::debug!(owner_id, url = %url, stage = %IngestStage::Persisting, "Storing link");
        let new_link = NewLink {
            owner_id,
            url: url.to_string(),
            url_key: url.dedup_key().to_string(),
            category: category.label().to_string(),
            title: metadata.title,
            description: metadata.description,
            thumbnail: metadata.thumbnail,
        };

        let view = {
            let mut store = self.store()?;
            let record = store.create(&new_link).map_err(|e| match e {
                StorageError::Duplicate { .. } => LinkError::DuplicateLink {
                    url: new_link.url.clone(),
                },
                other => {
                    tracing::error!(owner_id, url = %new_link.url, error = %other, "Failed to save link");
                    LinkError::LinkSaveFailed(other)
                }
            })?;
            self.view(&store, record)
        };

        tracing::info!(
            owner_id,
            link_id = view.id,
            url = %view.url,
            category = %view.category,
            stage = %IngestStage::Done,
            "Link saved"
        );

        Ok(view)
    }

    /// Fetch, extract and classify; every failure degrades to a status
    async fn enrich(&self, url: &CanonicalUrl) -> (Category, PageMetadata) {
        let degraded = |status: PipelineStatus| {
            (
                Category::Status(status),
                PageMetadata::placeholder(self.extractor.default_thumbnail()),
            )
        };

        tracing::debug!(url = %url, stage = %IngestStage::Fetching, "Fetching page");
        let page = match self.fetcher.fetch(url.as_url()).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(url = %url, stage = %IngestStage::Degraded, error = %e, "Fetch failed");
                return degraded(PipelineStatus::AnalysisFailed);
            }
        };

        tracing::debug!(
            url = %url,
            final_url = %page.final_url,
            content_type = page.content_type.as_deref().unwrap_or(""),
            stage = %IngestStage::Extracting,
            bytes = page.body.len(),
            "Extracting content"
        );
        let extraction = match self.extractor.extract(&page.body, &url.origin()) {
            Ok(extraction) => extraction,
            Err(e) => {
                tracing::warn!(url = %url, stage = %IngestStage::Degraded, error = %e, "Extraction failed");
                return degraded(PipelineStatus::AnalysisFailed);
            }
        };

        let chars = extraction.text.chars().count();
        if chars < MIN_CONTENT_CHARS {
            tracing::warn!(
                url = %url,
                stage = %IngestStage::Degraded,
                chars,
                "Not enough content to classify"
            );
            return (
                Category::Status(PipelineStatus::InsufficientContent),
                extraction.metadata,
            );
        }

        tracing::debug!(url = %url, stage = %IngestStage::Classifying, chars, "Classifying");
        let category = self.classifier.classify(&extraction.text, url).await;
        (category, extraction.metadata)
    }

    /// Gets one link of the owner and records the open
    ///
    /// A failed open-history write is logged; the link is still returned.
    pub fn get_link(&self, owner_id: i64, link_id: i64) -> Result<LinkView> {
        let mut store = self.store()?;
        let record = store
            .get_by_id(owner_id, link_id)?
            .ok_or(LinkError::LinkNotFound(link_id))?;

        if let Err(e) = store.record_open(owner_id, link_id) {
            tracing::warn!(owner_id, link_id, error = %e, "Failed to record link open");
        }

        Ok(self.view(&store, record))
    }

    /// Deletes one link of the owner
    pub fn delete_link(&self, owner_id: i64, link_id: i64) -> Result<()> {
        if self.store()?.delete(owner_id, link_id)? {
            tracing::info!(owner_id, link_id, "Link deleted");
            Ok(())
        } else {
            Err(LinkError::LinkNotFound(link_id))
        }
    }

    /// All links of the owner, newest first
    pub fn list_links(&self, owner_id: i64) -> Result<Vec<LinkView>> {
        let store = self.store()?;
        let records = store.list_by_owner(owner_id)?;
        Ok(self.views(&store, records))
    }

    /// Links of the owner under one category, newest first
    ///
    /// Accepts vocabulary labels and the status labels.
    pub fn list_links_by_category(&self, owner_id: i64, label: &str) -> Result<Vec<LinkView>> {
        let category = self
            .taxonomy()
            .category(label)
            .ok_or_else(|| LinkError::InvalidCategory(label.to_string()))?;

        let store = self.store()?;
        let records = store.list_by_category(owner_id, category.label())?;
        Ok(self.views(&store, records))
    }

    /// The `limit` newest links of the owner
    pub fn recent_links(&self, owner_id: i64, limit: Option<usize>) -> Result<Vec<LinkView>> {
        let store = self.store()?;
        let records = store.list_recent(owner_id, limit.unwrap_or(DEFAULT_RECENT_LIMIT))?;
        Ok(self.views(&store, records))
    }

    /// The `limit` links the owner opened most recently, each listed once
    pub fn recently_opened_links(
        &self,
        owner_id: i64,
        limit: Option<usize>,
    ) -> Result<Vec<LinkView>> {
        let store = self.store()?;
        let records =
            store.list_recently_opened(owner_id, limit.unwrap_or(DEFAULT_RECENT_LIMIT))?;
        Ok(self.views(&store, records))
    }

    /// Number of links the owner has saved
    pub fn count_links(&self, owner_id: i64) -> Result<u64> {
        Ok(self.store()?.count_by_owner(owner_id)?)
    }

    /// Sets the owner summary embedded in returned links
    pub fn set_owner(&self, owner: &OwnerSummary) -> Result<()> {
        Ok(self.store()?.upsert_owner(owner)?)
    }

    /// Gets the owner summary, anonymous when never set
    pub fn owner(&self, owner_id: i64) -> Result<OwnerSummary> {
        Ok(self
            .store()?
            .get_owner(owner_id)?
            .unwrap_or_else(|| OwnerSummary::anonymous(owner_id)))
    }
}
