//! URL handling for link and image rules

use serde::{Deserialize, Serialize};
use url::Url;

/// Truncate matching URLs at a marker, dropping tracking suffixes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlCleanRule {
    /// Applies when the URL host contains this string
    pub host_contains: String,
    /// Everything from the first occurrence of this marker is removed
    pub marker: String,
}

impl UrlCleanRule {
    /// Amazon product links: `https://www.amazon.com/dp/B0ABC/ref=sr_1_1?...`
    pub fn amazon() -> Self {
        Self {
            host_contains: "amazon.".to_string(),
            marker: "/ref=".to_string(),
        }
    }

    /// Cleaned URL, or `None` if the rule does not apply
    pub fn apply(&self, url: &str) -> Option<String> {
        let parsed = Url::parse(url).ok()?;
        let host = parsed.host_str()?.to_ascii_lowercase();
        if !host.contains(&self.host_contains) {
            return None;
        }
        url.find(&self.marker).map(|index| url[..index].to_string())
    }
}

/// The rules shipped by default
pub fn default_clean_rules() -> Vec<UrlCleanRule> {
    vec![UrlCleanRule::amazon()]
}

/// Apply the first matching rule
pub fn clean_url(url: &str, rules: &[UrlCleanRule]) -> String {
    rules
        .iter()
        .find_map(|rule| rule.apply(url))
        .unwrap_or_else(|| url.to_string())
}

/// Backslash-escape parentheses so they cannot close a Markdown link early
pub fn escape_parens(url: &str) -> String {
    url.replace('(', "\\(").replace(')', "\\)")
}

/// Collapse every whitespace run to a single space and trim
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_absolute(raw: &str) -> bool {
    Url::parse(raw).is_ok()
}

fn has_scheme(raw: &str, scheme: &str) -> bool {
    raw.get(..scheme.len())
        .map(|prefix| prefix.eq_ignore_ascii_case(scheme))
        .unwrap_or(false)
}

fn resolve(raw: &str, base: Option<&Url>) -> String {
    match base {
        Some(base) => base
            .join(raw)
            .map(String::from)
            .unwrap_or_else(|_| raw.to_string()),
        None => raw.to_string(),
    }
}

/// Resolve a link `href` unless it is absolute or a `mailto:` link
pub fn resolve_href(href: &str, base: Option<&Url>) -> String {
    if is_absolute(href) || has_scheme(href, "mailto:") {
        href.to_string()
    } else {
        resolve(href, base)
    }
}

/// Resolve an image `src` unless it is absolute or a `data:` URI
pub fn resolve_src(src: &str, base: Option<&Url>) -> String {
    if is_absolute(src) || has_scheme(src, "data:") {
        src.to_string()
    } else {
        resolve(src, base)
    }
}
