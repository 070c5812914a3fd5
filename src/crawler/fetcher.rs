//! HTTP fetcher implementation
//!
//! This module handles the single page request made for every submitted link:
//! - Building an HTTP client that presents itself as a desktop browser
//! - One GET request with a bounded timeout and redirect chain
//! - Mapping transport and status failures to [`FetchError`]

use crate::config::FetcherConfig;
use crate::{ConfigError, FetchError, LinkError};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{redirect::Policy, Client, ClientBuilder, StatusCode};
use std::error::Error as StdError;
use std::time::Duration;
use url::Url;

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status_code: u16,
    /// Content-Type header value, if any
    pub content_type: Option<String>,
    /// Page body content
    pub body: String,
}

/// Builds a client builder with the browser fingerprint, timeout and
/// redirect policy from the configuration
///
/// Exposed separately from [`build_http_client`] so callers can add
/// transport settings (proxies, DNS overrides) before building.
pub fn http_client_builder(config: &FetcherConfig) -> Result<ClientBuilder, ConfigError> {
    let mut headers = HeaderMap::new();
    headers.insert(header::ACCEPT, header_value("accept", &config.accept)?);
    headers.insert(
        header::ACCEPT_LANGUAGE,
        header_value("accept-language", &config.accept_language)?,
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(
        header::UPGRADE_INSECURE_REQUESTS,
        HeaderValue::from_static("1"),
    );

    Ok(Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .redirect(Policy::limited(config.max_redirects))
        .gzip(true)
        .brotli(true))
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use linkshelf::config::FetcherConfig;
/// use linkshelf::crawler::build_http_client;
///
/// let client = build_http_client(&FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, LinkError> {
    Ok(http_client_builder(config)?.build()?)
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, ConfigError> {
    HeaderValue::from_str(value)
        .map_err(|e| ConfigError::Validation(format!("Invalid {} header value: {}", name, e)))
}

/// Fetches page markup for the ingestion pipeline
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    /// Creates a fetcher with a client built from the configuration
    pub fn new(config: &FetcherConfig) -> Result<Self, LinkError> {
        Ok(Self::with_client(build_http_client(config)?))
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Fetches a URL once
    ///
    /// # Error Mapping
    ///
    /// | Condition | Error |
    /// |-----------|-------|
    /// | Host does not resolve | `DomainNotFound` |
    /// | Timeout (connect, headers or body) | `Timeout` |
    /// | HTTP 403 | `AccessDenied` |
    /// | Any other status >= 400 | `CrawlFailure` |
    /// | Redirect limit, connection or body errors | `CrawlFailure` |
    ///
    /// No retries are performed.
    pub async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_transport_error(url.as_str(), &e))?;

        let status = response.status();
        let final_url = response.url().clone();

        if status == StatusCode::FORBIDDEN {
            return Err(FetchError::AccessDenied {
                url: url.to_string(),
            });
        }

        if status.as_u16() >= 400 {
            return Err(FetchError::CrawlFailure {
                url: url.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());

        let body = response
            .text()
            .await
            .map_err(|e| classify_transport_error(url.as_str(), &e))?;

        tracing::debug!(
            url = %url,
            final_url = %final_url,
            status = status.as_u16(),
            bytes = body.len(),
            "Fetched page"
        );

        Ok(FetchedPage {
            final_url,
            status_code: status.as_u16(),
            content_type,
            body,
        })
    }
}

/// Maps a reqwest failure onto the fetch error taxonomy
fn classify_transport_error(url: &str, err: &reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if is_dns_failure(err) {
        FetchError::DomainNotFound {
            url: url.to_string(),
        }
    } else if err.is_redirect() {
        FetchError::CrawlFailure {
            url: url.to_string(),
            message: "too many redirects".to_string(),
        }
    } else {
        FetchError::CrawlFailure {
            url: url.to_string(),
            message: error_chain(err),
        }
    }
}

/// Resolver failures only show up in the error chain's messages
fn is_dns_failure(err: &(dyn StdError + 'static)) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(e) = current {
        let message = e.to_string().to_lowercase();
        if message.contains("dns error")
            || message.contains("failed to lookup address")
            || message.contains("name or service not known")
            || message.contains("no such host")
            || message.contains("nodename nor servname")
        {
            return true;
        }
        current = e.source();
    }
    false
}

fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut parts = vec![err.to_string()];
    let mut current = err.source();
    while let Some(e) = current {
        parts.push(e.to_string());
        current = e.source();
    }
    parts.join(": ")
}
