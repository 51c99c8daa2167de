//! URL discovery for rendered storefront markup
//!
//! Links are found with a textual scan rather than an HTML parse: anything that
//! looks like an absolute http(s) URL counts, including URLs inside scripts,
//! inline JSON and comments. The scan may over-match but never misses a
//! syntactically plain absolute URL.

mod matcher;

use regex::Regex;
use std::sync::OnceLock;

pub use matcher::{classify, ProductPatterns};

/// `http(s)://` followed by anything up to whitespace or a quote
const ABSOLUTE_URL_PATTERN: &str = r#"https?://[^\s"']+"#;

fn absolute_url_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(ABSOLUTE_URL_PATTERN).expect("static URL pattern is valid"))
}

/// Extracts every absolute URL embedded in a markup string
///
/// Matches are returned in document order, duplicates included.
///
/// # Examples
///
/// ```
/// use product_scout::url::extract_urls;
///
/// let html = r#"<a href="https://x.com/product/123">a</a> <a href="https://x.com/about">b</a>"#;
/// assert_eq!(
///     extract_urls(html),
///     vec!["https://x.com/product/123", "https://x.com/about"]
/// );
/// assert!(extract_urls("").is_empty());
/// ```
pub fn extract_urls(markup: &str) -> Vec<String> {
    if markup.is_empty() {
        return Vec::new();
    }

    absolute_url_regex()
        .find_iter(markup)
        .map(|m| m.as_str().to_string())
        .collect()
}
