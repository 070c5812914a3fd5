use scraper::node::Element;
use scraper::ElementRef;

/// Elements that never carry page content
const NOISE_TAGS: &[&str] = &[
    "script", "style", "svg", "iframe", "nav", "footer", "header", "aside", "noscript",
];

/// Substrings of `class` or `id` that mark chrome around the content
const NOISE_MARKERS: &[&str] = &[
    "ads", "banner", "comment", "cookie", "popup", "sidebar", "footer", "header", "nav", "menu",
];

/// Returns true when the element itself is noise
///
/// `<html>` and `<body>` are never noise, whatever their attributes say.
pub fn is_noise(element: &Element) -> bool {
    let name = element.name();
    if name == "html" || name == "body" {
        return false;
    }

    if NOISE_TAGS.contains(&name) {
        return true;
    }

    if element.attr("aria-hidden") == Some("true")
        || element.attr("role") == Some("complementary")
    {
        return true;
    }

    let class = element.attr("class").unwrap_or_default().to_lowercase();
    let id = element.attr("id").unwrap_or_default().to_lowercase();
    NOISE_MARKERS
        .iter()
        .any(|marker| class.contains(marker) || id.contains(marker))
}

/// Returns true when the element or any of its ancestors is noise
pub fn in_noise(element: ElementRef<'_>) -> bool {
    is_noise(element.value())
        || element
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|ancestor| is_noise(ancestor.value()))
}
