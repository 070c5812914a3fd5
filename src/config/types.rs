use serde::Deserialize;

/// Main configuration structure for Linkshelf
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub metadata: MetadataConfig,
    /// Replaces the built-in taxonomy when present
    #[serde(default)]
    pub taxonomy: Option<TaxonomyConfig>,
}

/// Page fetch behavior
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    /// Whole-request timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_fetch_timeout")]
    pub timeout_secs: u64,

    /// Maximum number of redirects to follow
    #[serde(rename = "max-redirects", default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Browser User-Agent sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_accept")]
    pub accept: String,

    #[serde(rename = "accept-language", default = "default_accept_language")]
    pub accept_language: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout(),
            max_redirects: default_max_redirects(),
            user_agent: default_user_agent(),
            accept: default_accept(),
            accept_language: default_accept_language(),
        }
    }
}

/// AI classifier backend settings
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    /// Base URL of an OpenAI-compatible API (without `/chat/completions`)
    #[serde(rename = "api-base-url", default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Name of the environment variable holding the API key
    #[serde(rename = "api-key-env", default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(rename = "max-tokens", default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(rename = "timeout-secs", default = "default_classifier_timeout")]
    pub timeout_secs: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_classifier_timeout(),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// Preview metadata settings
#[derive(Debug, Clone, Deserialize)]
pub struct MetadataConfig {
    /// Thumbnail stored when a page offers no usable image
    #[serde(rename = "default-thumbnail", default = "default_thumbnail")]
    pub default_thumbnail: String,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            default_thumbnail: default_thumbnail(),
        }
    }
}

/// Category vocabulary and fallback tables
#[derive(Debug, Clone, Deserialize)]
pub struct TaxonomyConfig {
    #[serde(default = "default_taxonomy_version")]
    pub version: u32,

    /// Category returned when every other strategy declines
    #[serde(rename = "default")]
    pub default_category: String,

    pub categories: Vec<CategoryEntry>,

    /// Domain substring rules, checked before path rules
    #[serde(rename = "domain-rule", default)]
    pub domain_rules: Vec<KeywordRule>,

    /// Path substring rules
    #[serde(rename = "path-rule", default)]
    pub path_rules: Vec<KeywordRule>,

    /// Regex rules applied to the AI response
    #[serde(rename = "keyword-rule", default)]
    pub keyword_rules: Vec<PatternRule>,
}

/// One vocabulary entry
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryEntry {
    pub name: String,

    /// Shown to the AI backend next to the name
    #[serde(default)]
    pub description: String,
}

/// Maps any of several substrings to a category
#[derive(Debug, Clone, Deserialize)]
pub struct KeywordRule {
    pub category: String,
    pub keywords: Vec<String>,
}

/// Maps a regex to a category
#[derive(Debug, Clone, Deserialize)]
pub struct PatternRule {
    pub category: String,
    pub pattern: String,
}

fn default_fetch_timeout() -> u64 {
    10
}

fn default_max_redirects() -> usize {
    5
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}

fn default_accept() -> String {
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8"
        .to_string()
}

fn default_accept_language() -> String {
    "ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7".to_string()
}

fn default_api_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_api_key_env() -> String {
    "GPT_KEY".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_max_tokens() -> u32 {
    30
}

fn default_classifier_timeout() -> u64 {
    30
}

fn default_thumbnail() -> String {
    "https://placehold.co/600x400?text=No+Image".to_string()
}

fn default_taxonomy_version() -> u32 {
    1
}
