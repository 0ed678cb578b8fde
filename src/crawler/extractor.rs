//! Link extraction from fetched HTML
//!
//! Pulls candidate crawl URLs out of a page: `a[href]` elements resolved
//! against the source URL, http(s) only, fragments stripped, deduplicated.
//! Malformed hrefs are skipped, never fatal.

use crate::url::UrlRecord;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Extracts the set of absolute candidate URLs a page links to.
///
/// The result is a set: order carries no meaning and within-page duplicate
/// links (including fragment-only variants) collapse to one entry.
pub fn extract_links(html: &str, source_url: &Url) -> HashSet<UrlRecord> {
    let document = Html::parse_document(html);
    let mut links = HashSet::new();

    if let Ok(selector) = Selector::parse("a[href]") {
        for element in document.select(&selector) {
            // Download links point at files, not pages
            if element.value().attr("download").is_some() {
                continue;
            }

            if let Some(href) = element.value().attr("href") {
                if let Some(record) = resolve_link(href, source_url) {
                    links.insert(record);
                }
            }
        }
    }

    links
}

/// Resolves an href to a crawlable `UrlRecord`.
///
/// Returns None for hrefs the crawler should never follow:
/// - `javascript:`, `mailto:`, `tel:`, `data:` schemes
/// - fragment-only links (same-page anchors)
/// - anything that fails to resolve or lands on a non-http(s) scheme
fn resolve_link(href: &str, source_url: &Url) -> Option<UrlRecord> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    if href.starts_with('#') {
        return None;
    }

    let absolute = source_url.join(href).ok()?;
    UrlRecord::from_url(absolute).ok()
}
