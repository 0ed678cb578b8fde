use crate::UrlError;
use std::fmt;
use std::hash::{Hash, Hasher};
use url::Url;

/// A normalized URL value suitable for frontier bookkeeping.
///
/// Records are constructed at discovery time and immutable thereafter.
/// The fragment is stripped unconditionally before storage, so two URLs
/// that differ only in fragment compare equal and hash identically.
///
/// # Examples
///
/// ```
/// use dredge::UrlRecord;
///
/// let a = UrlRecord::parse("https://a.example/p#frag").unwrap();
/// let b = UrlRecord::parse("https://a.example/p").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.as_str(), "https://a.example/p");
/// ```
#[derive(Debug, Clone)]
pub struct UrlRecord {
    url: Url,
    host: String,
}

impl UrlRecord {
    /// Parses a URL string into a record.
    ///
    /// Only `http` and `https` URLs with a host are accepted; anything else
    /// is rejected so the frontier never holds unfetchable entries.
    pub fn parse(url_str: &str) -> Result<Self, UrlError> {
        let url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;
        Self::from_url(url)
    }

    /// Builds a record from an already-parsed URL, stripping the fragment.
    pub fn from_url(mut url: Url) -> Result<Self, UrlError> {
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(UrlError::InvalidScheme(url.scheme().to_string()));
        }

        // The host is compared and stored lowercase; the url crate already
        // lowercases registered names during parsing.
        let host = url.host_str().ok_or(UrlError::MissingHost)?.to_string();

        url.set_fragment(None);

        Ok(Self { url, host })
    }

    /// The fragment-stripped string form. Equality and hashing use this.
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// The underlying parsed URL (useful as a join base for relative links).
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The lowercase host component.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Whether `other` points at the same site.
    ///
    /// The default scope predicate is exact host equality; callers wanting a
    /// wider scope supply their own predicate over `host()`.
    pub fn is_same_site(&self, other: &Self) -> bool {
        self.host == other.host
    }
}

impl PartialEq for UrlRecord {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for UrlRecord {}

impl PartialOrd for UrlRecord {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for UrlRecord {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl Hash for UrlRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl fmt::Display for UrlRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
