//! Category classification
//!
//! The classifier asks a completion backend for a label and then runs the
//! reply through an ordered fallback chain (exact label, fuzzy containment,
//! keyword regexes, URL hint, default). Backend failures are logged and
//! treated as "no opinion", so `classify` always yields a vocabulary member.

mod backend;
mod fallback;
mod heuristics;
mod prompt;
mod taxonomy;

pub use backend::{CompletionBackend, CompletionRequest, DisabledBackend, OpenAiBackend};
pub use fallback::{clean_response, decide, Decision, Strategy, CHAIN};
pub use heuristics::url_hint;
pub use prompt::{system_prompt, user_prompt};
pub use taxonomy::{
    builtin, Category, HintRule, PatternMatcher, PipelineStatus, Taxonomy, TopicEntry,
    BUILTIN_DEFAULT, BUILTIN_VERSION,
};

use crate::config::ClassifierConfig;
use crate::url::CanonicalUrl;
use std::sync::Arc;

/// Assigns one taxonomy category to extracted page text
pub struct CategoryClassifier {
    taxonomy: Arc<Taxonomy>,
    backend: Arc<dyn CompletionBackend>,
    system_prompt: String,
    temperature: f32,
    max_tokens: u32,
}

impl CategoryClassifier {
    pub fn new(
        taxonomy: Arc<Taxonomy>,
        backend: Arc<dyn CompletionBackend>,
        config: &ClassifierConfig,
    ) -> Self {
        let system_prompt = system_prompt(&taxonomy);
        Self {
            taxonomy,
            backend,
            system_prompt,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// Classifies page text, never failing
    pub async fn classify(&self, text: &str, url: &CanonicalUrl) -> Category {
        let hint = url_hint(&self.taxonomy, url);

        let request = CompletionRequest {
            system_prompt: self.system_prompt.clone(),
            user_prompt: user_prompt(url, hint.as_ref(), text),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = match self.backend.complete(&request).await {
            Ok(reply) => Some(reply),
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Classifier backend failed, using fallbacks");
                None
            }
        };

        let decision = decide(&self.taxonomy, response.as_deref(), hint.as_ref());

        tracing::debug!(
            url = %url,
            response = response.as_deref().unwrap_or(""),
            hint = hint.as_ref().map(Category::label).unwrap_or(""),
            strategy = %decision.strategy,
            category = %decision.category,
            "Category decided"
        );

        decision.category
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::validate_url;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FixedBackend {
        reply: anyhow::Result<String>,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    impl FixedBackend {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(anyhow::anyhow!("backend unavailable")),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CompletionBackend for FixedBackend {
        async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<String> {
            self.seen.lock().unwrap().push(request.clone());
            match &self.reply {
                Ok(reply) => Ok(reply.clone()),
                Err(e) => Err(anyhow::anyhow!("{}", e)),
            }
        }
    }

    fn classifier(backend: Arc<FixedBackend>) -> CategoryClassifier {
        CategoryClassifier::new(
            Arc::new(Taxonomy::default()),
            backend,
            &ClassifierConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_backend_reply_used() {
        let backend = Arc::new(FixedBackend::replying("음식"));
        let url = validate_url("https://www.naver.com/").unwrap();
        let category = classifier(backend.clone()).classify("김치찌개 끓이는 법", &url).await;

        assert_eq!(category, Category::Topic("음식".to_string()));

        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].max_tokens, 30);
        assert!((seen[0].temperature - 0.1).abs() < f32::EPSILON);
        assert!(seen[0].user_prompt.contains("김치찌개 끓이는 법"));
    }

    #[tokio::test]
    async fn test_failing_backend_uses_url_hint() {
        let url = validate_url("https://developer.mozilla.org/en-US/docs/Web/JavaScript").unwrap();
        let category = classifier(Arc::new(FixedBackend::failing()))
            .classify("JavaScript function DOM", &url)
            .await;
        assert_eq!(category, Category::Topic("IT".to_string()));
    }

    #[tokio::test]
    async fn test_failing_backend_always_yields_vocabulary_member() {
        let classifier = classifier(Arc::new(FixedBackend::failing()));
        for raw in [
            "https://www.naver.com/",
            "https://example.org/a/b",
            "https://news.example.com/",
            "https://shop.example.co.kr/recipe",
        ] {
            let url = validate_url(raw).unwrap();
            let category = classifier.classify("text", &url).await;
            assert!(
                classifier.taxonomy().contains(category.label()),
                "{} produced {}",
                raw,
                category
            );
        }
    }

    #[tokio::test]
    async fn test_hint_reaches_prompt() {
        let backend = Arc::new(FixedBackend::replying("IT"));
        let url = validate_url("https://developer.mozilla.org/").unwrap();
        classifier(backend.clone()).classify("text", &url).await;

        let seen = backend.seen.lock().unwrap();
        assert!(seen[0].user_prompt.contains("URL 기반 예상 카테고리: IT"));
        assert!(seen[0].system_prompt.contains("- 생활 & 건강"));
    }
}
