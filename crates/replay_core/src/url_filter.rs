use url::Url;

/// Path substrings that mark listing, taxonomy, legal or platform pages.
pub const SKIP_PATH_PATTERNS: &[&str] = &[
    "/tag/",
    "/category/",
    "/author/",
    "/page/",
    "/about",
    "/contact",
    "/privacy",
    "/terms",
    "/feed",
    "/sitemap",
    "/wp-content/",
    "/wp-admin/",
];

/// Shared "is this probably a post?" test used by the discovery strategies.
#[derive(Debug, Clone)]
pub struct PostUrlFilter {
    host: Option<String>,
    port: Option<u16>,
}

impl PostUrlFilter {
    pub fn new(base: &Url) -> Self {
        Self {
            host: base.host_str().map(str::to_ascii_lowercase),
            port: base.port(),
        }
    }

    pub fn accepts(&self, candidate: &str) -> bool {
        let Ok(parsed) = Url::parse(candidate) else {
            return false;
        };
        if !self.same_site(&parsed) {
            return false;
        }
        let path = parsed.path().trim_end_matches('/');
        if path.is_empty() {
            return false;
        }
        let lowered = path.to_ascii_lowercase();
        if SKIP_PATH_PATTERNS.iter().any(|pat| lowered.contains(pat)) {
            return false;
        }
        path.split('/').any(|segment| !segment.is_empty())
    }

    /// Keep accepted URLs, preserving input order.
    pub fn retain<I, S>(&self, urls: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        urls.into_iter()
            .map(Into::into)
            .filter(|url| self.accepts(url))
            .collect()
    }

    pub fn same_site(&self, url: &Url) -> bool {
        url.host_str().map(str::to_ascii_lowercase) == self.host && url.port() == self.port
    }
}

/// Listing-page heuristic: at least two path segments, or one segment longer
/// than ten characters.
pub fn is_slug_like_path(path: &str) -> bool {
    let segments: Vec<&str> = path
        .trim_end_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();
    match segments.as_slice() {
        [] => false,
        [only] => only.chars().count() > 10,
        _ => true,
    }
}
