use crate::url::UrlRecord;

/// Checks if a URL string matches a pattern with `*` wildcards.
///
/// A `*` matches any run of characters, including none, anywhere in the
/// pattern. A pattern without `*` must match the whole URL exactly.
///
/// # Examples
///
/// ```
/// use dredge::url::matches_pattern;
///
/// assert!(matches_pattern("https://example.com/blog/*", "https://example.com/blog/post-1"));
/// assert!(matches_pattern("*/login*", "https://example.com/login?next=/"));
/// assert!(!matches_pattern("https://example.com/blog/*", "https://example.com/shop"));
/// ```
pub fn matches_pattern(pattern: &str, candidate: &str) -> bool {
    let segments: Vec<&str> = pattern.split('*').collect();

    // No wildcard: exact match only
    if segments.len() == 1 {
        return candidate == pattern;
    }

    let mut rest = candidate;

    // First segment must anchor at the start
    let first = segments[0];
    if !rest.starts_with(first) {
        return false;
    }
    rest = &rest[first.len()..];

    // Middle segments match in order, greedily left to right
    for segment in &segments[1..segments.len() - 1] {
        if segment.is_empty() {
            continue;
        }
        match rest.find(segment) {
            Some(pos) => rest = &rest[pos + segment.len()..],
            None => return false,
        }
    }

    // Last segment must anchor at the end
    let last = segments[segments.len() - 1];
    last.is_empty() || rest.ends_with(last)
}

/// Include/exclude filtering over discovered URLs.
///
/// Exclude patterns win over include patterns. An empty include list allows
/// every URL not excluded; a non-empty include list allows only matches.
#[derive(Debug, Clone, Default)]
pub struct UrlFilter {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl UrlFilter {
    pub fn new(include: Vec<String>, exclude: Vec<String>) -> Self {
        Self { include, exclude }
    }

    /// Returns true when `url` passes the configured patterns.
    pub fn allows(&self, url: &UrlRecord) -> bool {
        let candidate = url.as_str();

        if self
            .exclude
            .iter()
            .any(|pattern| matches_pattern(pattern, candidate))
        {
            return false;
        }

        if self.include.is_empty() {
            return true;
        }

        self.include
            .iter()
            .any(|pattern| matches_pattern(pattern, candidate))
    }

    /// True when no patterns are configured at all.
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }
}
