use crate::url::domain::strip_www;
use crate::{UrlError, UrlResult};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Longest accepted raw input, in characters
pub const MAX_URL_LENGTH: usize = 2048;

/// Hosts whose watch pages keep only the video id in the query string
const VIDEO_HOSTS: &[&str] = &["youtube.com", "m.youtube.com"];

/// Query parameter identifying a video on [`VIDEO_HOSTS`]
const VIDEO_ID_PARAM: &str = "v";

/// URL-shaped prefix: an `http(s)://` scheme or a leading `www.`, a dotted
/// host ending in a 2-63 letter label, then anything up to whitespace, quotes
/// or angle brackets.
static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)^(?:https?://|www\.)[a-z0-9][-a-z0-9@:%._+~#=]{0,256}\.[a-z]{2,63}\b[^\s"<>]*"#)
        .expect("valid regex")
});

/// Validates a raw user-supplied string and turns it into an absolute URL
///
/// # Normalization Steps
///
/// 1. Reject inputs longer than [`MAX_URL_LENGTH`] characters
/// 2. Trim and match the URL-shaped pattern; keep only the matched prefix
///    (bare hosts such as `node.js` need a scheme or `www.`)
/// 3. Prepend `https://` to `www.` inputs
/// 4. Re-parse with the strict URL parser (lowercases the host)
/// 5. On video hosts, keep only the video id query parameter
///
/// # Examples
///
/// ```
/// use linkshelf::url::normalize_url;
///
/// let url = normalize_url("www.Example.COM/docs").unwrap();
/// assert_eq!(url.as_str(), "https://www.example.com/docs");
/// assert!(normalize_url("example.com/docs").is_err());
/// ```
pub fn normalize_url(raw: &str) -> UrlResult<Url> {
    // Step 1: Length limit
    let len = raw.chars().count();
    if len > MAX_URL_LENGTH {
        return Err(UrlError::TooLong {
            len,
            max: MAX_URL_LENGTH,
        });
    }

    // Step 2: Shape check
    let trimmed = raw.trim();
    let matched = URL_PATTERN
        .find(trimmed)
        .map(|m| m.as_str())
        .ok_or_else(|| UrlError::InvalidFormat(trimmed.to_string()))?;

    // Step 3: Default scheme
    let lower = matched.to_ascii_lowercase();
    let formatted = if lower.starts_with("http://") || lower.starts_with("https://") {
        matched.to_string()
    } else {
        format!("https://{}", matched)
    };

    // Step 4: Strict parse
    let mut url =
        Url::parse(&formatted).map_err(|e| UrlError::InvalidFormat(format!("{}: {}", formatted, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidFormat(format!(
            "unsupported scheme '{}'",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::InvalidFormat(format!("missing host: {}", formatted)));
    }

    // Step 5: Video carve-out
    retain_video_id(&mut url);

    Ok(url)
}

/// Builds the per-owner de-duplication key of an already normalized URL
///
/// The key is the lowercase host without `www.`, an explicit port if any,
/// the path and the query string. Scheme and fragment are ignored.
pub fn dedup_key(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default().to_lowercase();
    let mut key = strip_www(&host).to_string();

    if let Some(port) = url.port() {
        key.push(':');
        key.push_str(&port.to_string());
    }

    key.push_str(url.path());

    if let Some(query) = url.query().filter(|q| !q.is_empty()) {
        key.push('?');
        key.push_str(query);
    }

    key
}

/// Drops every query parameter except the video id on video hosts
fn retain_video_id(url: &mut Url) {
    let host = url.host_str().unwrap_or_default().to_lowercase();
    if !VIDEO_HOSTS.contains(&strip_www(&host)) {
        return;
    }

    let video_id = url
        .query_pairs()
        .find(|(key, _)| key == VIDEO_ID_PARAM)
        .map(|(_, value)| value.into_owned());

    if let Some(id) = video_id {
        url.query_pairs_mut()
            .clear()
            .append_pair(VIDEO_ID_PARAM, &id);
    }
}
