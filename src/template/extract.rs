//! Field extraction from parsed HTML
//!
//! A field is located with three pieces of information:
//! - a CSS selector (empty: the node itself)
//! - an attribute name (empty: the element's text)
//! - a regex applied to the result (empty: no filtering)

use regex::Regex;
use scraper::{ElementRef, Selector};

/// Extracts a single trimmed value from `node`
///
/// # Extraction Rules
///
/// 1. A non-empty `selector` is matched against the node itself, then its
///    descendants in document order. The first match wins; no match gives `None`.
/// 2. A non-empty `attribute` reads that attribute, otherwise the element text
///    is used with whitespace runs collapsed.
/// 3. A non-empty `regex` replaces the content with its first match. When the
///    regex does not match, the unfiltered text is kept.
/// 4. An empty result gives `None`.
///
/// Unparsable selectors and regexes are logged and give `None`.
///
/// # Example
///
/// ```
/// use scraper::Html;
/// use shaarli_client::template::extract;
///
/// let html = Html::parse_fragment(r#"<div><span class="count"> 12 links </span></div>"#);
/// let root = html.root_element();
/// assert_eq!(extract(root, "span.count", "", r"\d+"), Some("12".to_string()));
/// ```
pub fn extract(node: ElementRef<'_>, selector: &str, attribute: &str, regex: &str) -> Option<String> {
    let element = if selector.is_empty() {
        node
    } else {
        let selector = match Selector::parse(selector) {
            Ok(selector) => selector,
            Err(e) => {
                tracing::warn!("Ignoring invalid selector '{}': {:?}", selector, e);
                return None;
            }
        };
        select_first(node, &selector)?
    };

    let content = if attribute.is_empty() {
        element_text(element)
    } else {
        element.value().attr(attribute)?.trim().to_string()
    };

    let content = if regex.is_empty() {
        content
    } else {
        let re = match Regex::new(regex) {
            Ok(re) => re,
            Err(e) => {
                tracing::warn!("Ignoring invalid regex '{}': {}", regex, e);
                return None;
            }
        };
        match re.find(&content) {
            Some(m) => m.as_str().trim().to_string(),
            None => content,
        }
    };

    if content.is_empty() {
        None
    } else {
        Some(content)
    }
}

/// Returns the node itself when it matches, else its first matching descendant
pub(crate) fn select_first<'a>(node: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    if selector.matches(&node) {
        return Some(node);
    }
    node.select(selector).next()
}

/// Visible text of an element, whitespace collapsed
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
