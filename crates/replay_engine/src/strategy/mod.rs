//! Post discovery strategies. Each one turns a blog's base URL into an ordered
//! list of posts, or reports that it found nothing usable.
mod link_archive;
mod platform_api;
mod sitemap;
mod snapshot;
mod structured_archive;

use std::collections::HashSet;
use std::time::Duration;

use replay_core::{ExtractedPost, PostUrlFilter};
use replay_logging::replay_debug;
use url::Url;

use crate::decode::DecodeError;
use crate::extract::ArticleExtractor;
use crate::retry::safe_fetch;
use crate::{FetchError, FetchOutput, Fetcher};

pub use link_archive::{slug_like_links, LinkArchive};
pub use platform_api::{PlatformApi, TOTAL_PAGES_HEADER};
pub use sitemap::{parse_sitemap, Sitemap, SitemapDocument};
pub use snapshot::{unique_captures, Capture, HistoricalSnapshot};
pub use structured_archive::{parse_archive_page, ArchiveEntry, StructuredArchive};

pub const SNAPSHOT_ENDPOINT: &str = "https://web.archive.org";

#[derive(Debug, thiserror::Error)]
pub enum StrategyError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),
    #[error("parse error: {0}")]
    Parse(String),
}

/// Candidate paths, endpoints and pacing shared by the strategies. Paths are
/// appended to the base URL; `""` is the site root.
#[derive(Debug, Clone)]
pub struct DiscoverySettings {
    pub archive_paths: Vec<String>,
    pub sitemap_paths: Vec<String>,
    pub listing_paths: Vec<String>,
    pub api_path: String,
    pub api_page_size: u32,
    pub snapshot_endpoint: String,
    pub snapshot_limit: usize,
    /// Fewer `<article>` blocks than this and a page is not an archive.
    pub min_article_blocks: usize,
    /// Pause between fetches of third-party resources.
    pub polite_delay: Duration,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            archive_paths: paths(&["/posts", "/archive", "/archives", ""]),
            sitemap_paths: paths(&["/sitemap.xml", "/sitemap_index.xml", "/post-sitemap.xml"]),
            listing_paths: paths(&["", "/archive", "/archives", "/blog", "/posts", "/all"]),
            api_path: "/wp-json/wp/v2/posts".to_string(),
            api_page_size: 100,
            snapshot_endpoint: SNAPSHOT_ENDPOINT.to_string(),
            snapshot_limit: 500,
            min_article_blocks: 5,
            polite_delay: Duration::from_secs(1),
        }
    }
}

fn paths(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Everything a strategy needs to evaluate one site.
pub struct SiteContext<'a> {
    base: String,
    url: Url,
    filter: PostUrlFilter,
    fetcher: &'a dyn Fetcher,
    extractor: &'a dyn ArticleExtractor,
    settings: &'a DiscoverySettings,
}

impl<'a> SiteContext<'a> {
    pub fn new(
        base_url: &str,
        fetcher: &'a dyn Fetcher,
        extractor: &'a dyn ArticleExtractor,
        settings: &'a DiscoverySettings,
    ) -> Result<Self, StrategyError> {
        let base = base_url.trim().trim_end_matches('/').to_string();
        let url = Url::parse(&base)
            .map_err(|err| StrategyError::Parse(format!("base url {base_url}: {err}")))?;
        Ok(Self {
            filter: PostUrlFilter::new(&url),
            base,
            url,
            fetcher,
            extractor,
            settings,
        })
    }

    /// Base URL without a trailing slash.
    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn filter(&self) -> &PostUrlFilter {
        &self.filter
    }

    pub fn fetcher(&self) -> &dyn Fetcher {
        self.fetcher
    }

    pub fn settings(&self) -> &DiscoverySettings {
        self.settings
    }

    /// `base` + `path`.
    pub fn page_url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Host plus explicit port, the way web archives key a domain.
    pub fn domain(&self) -> String {
        let host = self.url.host_str().unwrap_or_default();
        match self.url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        }
    }

    pub async fn fetch(&self, url: &str) -> Option<FetchOutput> {
        safe_fetch(self.fetcher, url).await
    }

    pub fn extract(&self, url: &str, html: &str) -> Option<ExtractedPost> {
        self.extractor.extract(url, html)
    }

    /// Fetch `fetch_url` and extract it, attributing the post to `post_url`.
    pub async fn fetch_and_extract_as(
        &self,
        fetch_url: &str,
        post_url: &str,
    ) -> Option<ExtractedPost> {
        let output = self.fetch(fetch_url).await?;
        self.extract(post_url, &output.text())
    }

    /// Fetch and extract each distinct URL in first-seen order, keeping what
    /// extracts cleanly.
    pub async fn fetch_and_extract_all(&self, urls: &[String]) -> Vec<ExtractedPost> {
        let urls = first_seen(urls.iter().map(String::as_str));
        let mut posts = Vec::new();
        for (i, url) in urls.iter().enumerate() {
            replay_debug!("Fetching {}/{}: {}", i + 1, urls.len(), url);
            if let Some(post) = self.fetch_and_extract_as(url, url).await {
                posts.push(post);
            }
        }
        posts
    }
}

/// One discovery algorithm. `Ok(None)` and `Ok(Some(vec![]))` both mean
/// "found nothing"; an `Err` is logged by the orchestrator and treated the same.
#[async_trait::async_trait]
pub trait Strategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn evaluate(
        &self,
        site: &SiteContext<'_>,
    ) -> Result<Option<Vec<ExtractedPost>>, StrategyError>;
}

/// Drop repeats, keeping the first occurrence of each URL.
pub(crate) fn first_seen<'u>(urls: impl IntoIterator<Item = &'u str>) -> Vec<&'u str> {
    let mut seen = HashSet::new();
    urls.into_iter().filter(|url| seen.insert(*url)).collect()
}

pub(crate) fn non_empty(posts: Vec<ExtractedPost>) -> Option<Vec<ExtractedPost>> {
    (!posts.is_empty()).then_some(posts)
}

/// The five strategies in priority order.
pub fn standard_strategies() -> Vec<Box<dyn Strategy>> {
    vec![
        Box::new(StructuredArchive),
        Box::new(Sitemap),
        Box::new(PlatformApi),
        Box::new(LinkArchive),
        Box::new(HistoricalSnapshot),
    ]
}
