//! Integration tests for link ingestion
//!
//! These tests use wiremock to serve pages and run submissions through the
//! whole pipeline: validation, fetch, extraction, classification and an
//! in-memory SQLite store. Pages are served under `docs.example.com`, which
//! the HTTP client resolves to the mock server.

use async_trait::async_trait;
use linkshelf::classify::{CategoryClassifier, CompletionBackend, CompletionRequest, Taxonomy};
use linkshelf::config::{ClassifierConfig, FetcherConfig, MetadataConfig};
use linkshelf::crawler::{http_client_builder, PageFetcher};
use linkshelf::extract::ContentExtractor;
use linkshelf::storage::{
    LinkRecord, LinkStore, NewLink, OwnerSummary, SqliteStorage, StorageError, StorageResult,
};
use linkshelf::{LinkError, LinkService, UrlError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HOST: &str = "docs.example.com";
const PLACEHOLDER: &str = "https://placehold.co/600x400?text=No+Image";

/// Backend that answers every call with the same scripted reply
struct ScriptedBackend {
    reply: Option<String>,
    calls: AtomicUsize,
}

impl ScriptedBackend {
    fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(reply.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(&self, _request: &CompletionRequest) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply
            .clone()
            .ok_or_else(|| anyhow::anyhow!("scripted backend failure"))
    }
}

/// How [`FailingStore`] answers `create`
enum CreateOutcome {
    Stored,
    Duplicate,
    DatabaseDown,
}

/// Store that never finds an existing link and fails on demand
struct FailingStore {
    create_outcome: CreateOutcome,
    owner_lookup_fails: bool,
}

impl FailingStore {
    fn new(create_outcome: CreateOutcome) -> Self {
        Self {
            create_outcome,
            owner_lookup_fails: false,
        }
    }
}

impl LinkStore for FailingStore {
    fn create(&mut self, link: &NewLink) -> StorageResult<LinkRecord> {
        match self.create_outcome {
            CreateOutcome::Stored => Ok(LinkRecord {
                id: 1,
                owner_id: link.owner_id,
                url: link.url.clone(),
                url_key: link.url_key.clone(),
                category: link.category.clone(),
                title: link.title.clone(),
                description: link.description.clone(),
                thumbnail: link.thumbnail.clone(),
                created_at: "2026-01-01T00:00:00.000000Z".to_string(),
                updated_at: "2026-01-01T00:00:00.000000Z".to_string(),
            }),
            CreateOutcome::Duplicate => Err(StorageError::Duplicate {
                owner_id: link.owner_id,
                url_key: link.url_key.clone(),
            }),
            CreateOutcome::DatabaseDown => {
                Err(StorageError::Database("disk I/O error".to_string()))
            }
        }
    }

    fn find_by_owner_and_url(
        &self,
        _owner_id: i64,
        _url_key: &str,
    ) -> StorageResult<Option<LinkRecord>> {
        Ok(None)
    }

    fn get_by_id(&self, _owner_id: i64, _link_id: i64) -> StorageResult<Option<LinkRecord>> {
        Ok(None)
    }

    fn list_by_owner(&self, _owner_id: i64) -> StorageResult<Vec<LinkRecord>> {
        Ok(Vec::new())
    }

    fn list_by_category(&self, _owner_id: i64, _category: &str) -> StorageResult<Vec<LinkRecord>> {
        Ok(Vec::new())
    }

    fn list_recent(&self, _owner_id: i64, _limit: usize) -> StorageResult<Vec<LinkRecord>> {
        Ok(Vec::new())
    }

    fn delete(&mut self, _owner_id: i64, _link_id: i64) -> StorageResult<bool> {
        Ok(false)
    }

    fn count_by_owner(&self, _owner_id: i64) -> StorageResult<u64> {
        Ok(0)
    }

    fn record_open(&mut self, _owner_id: i64, _link_id: i64) -> StorageResult<()> {
        Ok(())
    }

    fn list_recently_opened(&self, _owner_id: i64, _limit: usize) -> StorageResult<Vec<LinkRecord>> {
        Ok(Vec::new())
    }

    fn upsert_owner(&mut self, _owner: &OwnerSummary) -> StorageResult<()> {
        Ok(())
    }

    fn get_owner(&self, _owner_id: i64) -> StorageResult<Option<OwnerSummary>> {
        if self.owner_lookup_fails {
            Err(StorageError::Database("owners table is locked".to_string()))
        } else {
            Ok(None)
        }
    }
}

/// Creates a service whose fetcher resolves `docs.example.com` to the mock server
fn create_test_service(
    server: &MockServer,
    backend: Arc<ScriptedBackend>,
    fetcher_config: FetcherConfig,
) -> LinkService<SqliteStorage> {
    create_service_with_store(
        server,
        backend,
        fetcher_config,
        SqliteStorage::open_in_memory().expect("Failed to open in-memory database"),
    )
}

fn create_service_with_store<S: LinkStore>(
    server: &MockServer,
    backend: Arc<ScriptedBackend>,
    fetcher_config: FetcherConfig,
    store: S,
) -> LinkService<S> {
    let client = http_client_builder(&fetcher_config)
        .expect("valid fetcher config")
        .resolve(HOST, *server.address())
        .build()
        .expect("Failed to build HTTP client");

    let classifier = CategoryClassifier::new(
        Arc::new(Taxonomy::default()),
        backend,
        &ClassifierConfig::default(),
    );

    LinkService::new(
        PageFetcher::with_client(client),
        ContentExtractor::new(&MetadataConfig::default()),
        classifier,
        store,
    )
}

fn page_url(server: &MockServer, page_path: &str) -> String {
    format!("http://{}:{}{}", HOST, server.address().port(), page_path)
}

fn javascript_guide() -> String {
    r#"<!DOCTYPE html>
<html>
<head>
  <title>JavaScript Guide | MDN</title>
  <meta property="og:title" content="JavaScript 가이드">
  <meta name="description" content="JavaScript 언어의 기본 문법과 함수, 객체를 설명합니다.">
  <meta property="og:image" content="/static/guide-cover.png">
</head>
<body>
  <nav class="navbar"><a href="/">Home</a><a href="/login">Login</a></nav>
  <main>
    <h1>JavaScript 가이드</h1>
    <p>JavaScript는 웹 페이지에 동작을 더하는 프로그래밍 언어입니다.</p>
    <p>이 가이드는 변수, 함수, 객체, 비동기 프로그래밍과 DOM 조작을 다룹니다.</p>
    <pre><code>function greet(name) { return `Hello, ${name}`; }</code></pre>
  </main>
  <footer>Copyright</footer>
</body>
</html>"#
        .to_string()
}

async fn serve(server: &MockServer, page_path: &str, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(template)
        .mount(server)
        .await;
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html; charset=utf-8")
        .set_body_string(body)
}

#[tokio::test]
async fn test_backend_reply_files_link() {
    let server = MockServer::start().await;
    serve(&server, "/en/javascript/guide", html(javascript_guide())).await;

    let backend = ScriptedBackend::replying("IT");
    let service = create_test_service(&server, backend.clone(), FetcherConfig::default());

    let link = service
        .create_link(1, &page_url(&server, "/en/javascript/guide"))
        .await
        .expect("link should be created");

    assert_eq!(link.category, "IT");
    assert_eq!(link.title, "JavaScript 가이드");
    assert_eq!(
        link.description,
        "JavaScript 언어의 기본 문법과 함수, 객체를 설명합니다."
    );
    assert_eq!(
        link.thumbnail,
        page_url(&server, "/static/guide-cover.png")
    );
    assert_eq!(link.owner, OwnerSummary::anonymous(1));
    assert_eq!(backend.calls(), 1);
}

#[tokio::test]
async fn test_failing_backend_uses_url_hint() {
    let server = MockServer::start().await;
    serve(&server, "/en/javascript/guide", html(javascript_guide())).await;

    let service = create_test_service(&server, ScriptedBackend::failing(), FetcherConfig::default());

    let link = service
        .create_link(1, &page_url(&server, "/en/javascript/guide"))
        .await
        .expect("backend failure must not fail the submission");

    assert_eq!(link.category, "IT");
}

#[tokio::test]
async fn test_failing_backend_without_hint_uses_default() {
    let server = MockServer::start().await;
    serve(&server, "/notes/2024", html(javascript_guide())).await;

    let service = create_test_service(&server, ScriptedBackend::failing(), FetcherConfig::default());

    let link = service
        .create_link(1, &page_url(&server, "/notes/2024"))
        .await
        .unwrap();

    assert_eq!(link.category, "기타");
}

#[tokio::test]
async fn test_chatty_reply_is_cleaned() {
    let server = MockServer::start().await;
    serve(&server, "/notes/kimchi", html(javascript_guide())).await;

    let service = create_test_service(
        &server,
        ScriptedBackend::replying("\"음식\": 레시피 글입니다"),
        FetcherConfig::default(),
    );

    let link = service
        .create_link(1, &page_url(&server, "/notes/kimchi"))
        .await
        .unwrap();

    assert_eq!(link.category, "음식");
}

#[tokio::test]
async fn test_access_denied_is_stored_as_analysis_failed() {
    let server = MockServer::start().await;
    serve(&server, "/private", ResponseTemplate::new(403)).await;

    let backend = ScriptedBackend::replying("IT");
    let service = create_test_service(&server, backend.clone(), FetcherConfig::default());

    let link = service
        .create_link(1, &page_url(&server, "/private"))
        .await
        .expect("fetch failures degrade instead of failing");

    assert_eq!(link.category, "분석 실패");
    assert_eq!(link.title, "제목 없음");
    assert_eq!(link.description, "");
    assert_eq!(link.thumbnail, PLACEHOLDER);
    assert_eq!(backend.calls(), 0);
    assert_eq!(service.count_links(1).unwrap(), 1);
}

#[tokio::test]
async fn test_timeout_is_stored_as_analysis_failed() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/slow",
        html(javascript_guide()).set_delay(Duration::from_secs(3)),
    )
    .await;

    let config = FetcherConfig {
        timeout_secs: 1,
        ..FetcherConfig::default()
    };
    let service = create_test_service(&server, ScriptedBackend::replying("IT"), config);

    let link = service
        .create_link(1, &page_url(&server, "/slow"))
        .await
        .unwrap();

    assert_eq!(link.category, "분석 실패");
    assert_eq!(link.thumbnail, PLACEHOLDER);
}

#[tokio::test]
async fn test_short_page_is_stored_as_insufficient_content() {
    let server = MockServer::start().await;
    serve(&server, "/tiny", html("<html><body>hi</body></html>".to_string())).await;

    let backend = ScriptedBackend::replying("IT");
    let service = create_test_service(&server, backend.clone(), FetcherConfig::default());

    let link = service
        .create_link(1, &page_url(&server, "/tiny"))
        .await
        .unwrap();

    assert_eq!(link.category, "콘텐츠 부족");
    assert_eq!(link.title, "제목 없음");
    assert_eq!(link.thumbnail, PLACEHOLDER);
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_duplicate_submission_rejected() {
    let server = MockServer::start().await;
    serve(&server, "/en/javascript/guide", html(javascript_guide())).await;

    let backend = ScriptedBackend::replying("IT");
    let service = create_test_service(&server, backend.clone(), FetcherConfig::default());

    service
        .create_link(1, &page_url(&server, "/en/javascript/guide"))
        .await
        .unwrap();

    // Same dedup key: the fragment is not part of it
    let again = service
        .create_link(1, &page_url(&server, "/en/javascript/guide#functions"))
        .await;
    assert!(matches!(again, Err(LinkError::DuplicateLink { .. })));
    assert_eq!(backend.calls(), 1);

    // Another owner may save the same link
    service
        .create_link(2, &page_url(&server, "/en/javascript/guide"))
        .await
        .expect("other owners are independent");

    assert_eq!(service.count_links(1).unwrap(), 1);
    assert_eq!(service.count_links(2).unwrap(), 1);
}

#[tokio::test]
async fn test_invalid_url_rejected_without_side_effects() {
    let server = MockServer::start().await;
    let backend = ScriptedBackend::replying("IT");
    let service = create_test_service(&server, backend.clone(), FetcherConfig::default());

    for raw in ["", "not a url", "ftp://example.com/file", "http://localhost/"] {
        let result = service.create_link(1, raw).await;
        assert!(
            matches!(result, Err(LinkError::Url(UrlError::InvalidFormat(_)))),
            "{:?} should be rejected",
            raw
        );
    }

    let too_long = format!("https://example.com/{}", "a".repeat(3000));
    assert!(matches!(
        service.create_link(1, &too_long).await,
        Err(LinkError::Url(UrlError::TooLong { .. }))
    ));

    assert_eq!(service.count_links(1).unwrap(), 0);
    assert_eq!(backend.calls(), 0);
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_queries_are_owner_scoped() {
    let server = MockServer::start().await;
    serve(&server, "/en/javascript/guide", html(javascript_guide())).await;
    serve(&server, "/en/javascript/closures", html(javascript_guide())).await;
    serve(&server, "/private", ResponseTemplate::new(403)).await;

    let service = create_test_service(&server, ScriptedBackend::replying("IT"), FetcherConfig::default());

    let first = service
        .create_link(1, &page_url(&server, "/en/javascript/guide"))
        .await
        .unwrap();
    let second = service
        .create_link(1, &page_url(&server, "/en/javascript/closures"))
        .await
        .unwrap();
    let failed = service
        .create_link(1, &page_url(&server, "/private"))
        .await
        .unwrap();

    // Newest first
    let all = service.list_links(1).unwrap();
    let ids: Vec<i64> = all.iter().map(|link| link.id).collect();
    assert_eq!(ids, vec![failed.id, second.id, first.id]);

    let it_links = service.list_links_by_category(1, "IT").unwrap();
    assert_eq!(it_links.len(), 2);

    let failed_links = service.list_links_by_category(1, "분석 실패").unwrap();
    assert_eq!(failed_links.len(), 1);
    assert_eq!(failed_links[0].id, failed.id);

    assert!(service.list_links_by_category(1, "음식").unwrap().is_empty());
    assert!(matches!(
        service.list_links_by_category(1, "Cooking"),
        Err(LinkError::InvalidCategory(_))
    ));

    let recent = service.recent_links(1, Some(2)).unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].id, failed.id);
    assert_eq!(service.recent_links(1, None).unwrap().len(), 3);

    assert_eq!(service.get_link(1, first.id).unwrap(), first);
    assert!(matches!(
        service.get_link(2, first.id),
        Err(LinkError::LinkNotFound(_))
    ));
    assert!(service.list_links(2).unwrap().is_empty());

    assert!(matches!(
        service.delete_link(2, first.id),
        Err(LinkError::LinkNotFound(_))
    ));
    service.delete_link(1, first.id).unwrap();
    assert!(matches!(
        service.get_link(1, first.id),
        Err(LinkError::LinkNotFound(_))
    ));
    assert_eq!(service.count_links(1).unwrap(), 2);
}

#[tokio::test]
async fn test_owner_summary_embedded_in_links() {
    let server = MockServer::start().await;
    serve(&server, "/en/javascript/guide", html(javascript_guide())).await;

    let service = create_test_service(&server, ScriptedBackend::replying("IT"), FetcherConfig::default());

    let owner = OwnerSummary {
        id: 7,
        nick_name: "linkkeeper".to_string(),
        image_uri: Some("https://cdn.example.com/avatar.png".to_string()),
    };
    service.set_owner(&owner).unwrap();

    let link = service
        .create_link(7, &page_url(&server, "/en/javascript/guide"))
        .await
        .unwrap();

    assert_eq!(link.owner, owner);
    assert_eq!(service.owner(7).unwrap(), owner);
    assert_eq!(service.owner(8).unwrap(), OwnerSummary::anonymous(8));

    let json = serde_json::to_value(&link).unwrap();
    assert_eq!(json["owner"]["nick_name"], "linkkeeper");
    assert!(json.get("url_key").is_none());
}

#[tokio::test]
async fn test_store_duplicate_on_insert_is_duplicate_link() {
    let server = MockServer::start().await;
    serve(&server, "/en/javascript/guide", html(javascript_guide())).await;

    // The pre-check finds nothing; the insert loses the race
    let service = create_service_with_store(
        &server,
        ScriptedBackend::replying("IT"),
        FetcherConfig::default(),
        FailingStore::new(CreateOutcome::Duplicate),
    );

    let result = service
        .create_link(1, &page_url(&server, "/en/javascript/guide"))
        .await;

    match result {
        Err(LinkError::DuplicateLink { url }) => {
            assert_eq!(url, page_url(&server, "/en/javascript/guide"));
        }
        other => panic!("expected DuplicateLink, got {:?}", other),
    }
}

#[tokio::test]
async fn test_store_write_failure_is_link_save_failed() {
    let server = MockServer::start().await;
    serve(&server, "/en/javascript/guide", html(javascript_guide())).await;

    let service = create_service_with_store(
        &server,
        ScriptedBackend::replying("IT"),
        FetcherConfig::default(),
        FailingStore::new(CreateOutcome::DatabaseDown),
    );

    let result = service
        .create_link(1, &page_url(&server, "/en/javascript/guide"))
        .await;

    assert!(matches!(
        result,
        Err(LinkError::LinkSaveFailed(StorageError::Database(_)))
    ));
}

#[tokio::test]
async fn test_owner_lookup_failure_still_returns_saved_link() {
    let server = MockServer::start().await;
    serve(&server, "/en/javascript/guide", html(javascript_guide())).await;

    let mut store = FailingStore::new(CreateOutcome::Stored);
    store.owner_lookup_fails = true;
    let service = create_service_with_store(
        &server,
        ScriptedBackend::replying("IT"),
        FetcherConfig::default(),
        store,
    );

    let link = service
        .create_link(3, &page_url(&server, "/en/javascript/guide"))
        .await
        .expect("stored link is returned even when the owner lookup fails");

    assert_eq!(link.category, "IT");
    assert_eq!(link.owner, OwnerSummary::anonymous(3));
}

#[tokio::test]
async fn test_recently_opened_links_follow_get_link() {
    let server = MockServer::start().await;
    serve(&server, "/en/javascript/guide", html(javascript_guide())).await;
    serve(&server, "/en/javascript/closures", html(javascript_guide())).await;
    serve(&server, "/en/javascript/modules", html(javascript_guide())).await;

    let service = create_test_service(&server, ScriptedBackend::replying("IT"), FetcherConfig::default());

    let guide = service
        .create_link(1, &page_url(&server, "/en/javascript/guide"))
        .await
        .unwrap();
    let closures = service
        .create_link(1, &page_url(&server, "/en/javascript/closures"))
        .await
        .unwrap();
    let modules = service
        .create_link(1, &page_url(&server, "/en/javascript/modules"))
        .await
        .unwrap();

    // Saving alone is not opening
    assert!(service.recently_opened_links(1, None).unwrap().is_empty());

    service.get_link(1, guide.id).unwrap();
    service.get_link(1, closures.id).unwrap();
    service.get_link(1, modules.id).unwrap();
    service.get_link(1, guide.id).unwrap();

    let opened = service.recently_opened_links(1, None).unwrap();
    let ids: Vec<i64> = opened.iter().map(|link| link.id).collect();
    assert_eq!(ids, vec![guide.id, modules.id, closures.id]);

    let top = service.recently_opened_links(1, Some(1)).unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].id, guide.id);

    // A rejected open of another owner's link leaves no history
    assert!(service.get_link(2, guide.id).is_err());
    assert!(service.recently_opened_links(2, None).unwrap().is_empty());

    service.delete_link(1, guide.id).unwrap();
    let ids: Vec<i64> = service
        .recently_opened_links(1, None)
        .unwrap()
        .iter()
        .map(|link| link.id)
        .collect();
    assert_eq!(ids, vec![modules.id, closures.id]);
}
