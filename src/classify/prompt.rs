use crate::classify::taxonomy::{Category, Taxonomy};
use crate::url::CanonicalUrl;

/// Builds the system prompt naming the whole vocabulary
pub fn system_prompt(taxonomy: &Taxonomy) -> String {
    let mut prompt = String::from(
        "당신은 웹 콘텐츠 분류 전문가입니다. \
         제공된 웹페이지의 텍스트, URL, 도메인을 분석하여 가장 적합한 카테고리를 하나만 고릅니다. \
         반드시 아래 목록에 있는 카테고리 이름 하나만 정확히 반환하고, 설명이나 추가 텍스트는 붙이지 마세요.\n\n\
         카테고리 목록:\n",
    );

    for topic in taxonomy.topics() {
        if topic.description.is_empty() {
            prompt.push_str(&format!("- {}\n", topic.name));
        } else {
            prompt.push_str(&format!("- {}: {}\n", topic.name, topic.description));
        }
    }

    prompt
}

/// Builds the user payload with URL context and the extracted text
pub fn user_prompt(url: &CanonicalUrl, hint: Option<&Category>, text: &str) -> String {
    format!(
        "URL 정보:\n\
         전체 URL: {url}\n\
         도메인: {domain}\n\
         경로: {path}\n\
         URL 기반 예상 카테고리: {hint}\n\n\
         다음 웹페이지 콘텐츠를 분석하여 가장 적합한 카테고리 하나만 선택하세요:\n\n\
         {text}\n\n\
         카테고리 이름만 정확히 반환하세요.",
        url = url,
        domain = url.domain(),
        path = url.path(),
        hint = hint.map(Category::label).unwrap_or("알 수 없음"),
        text = text,
    )
}
