use std::collections::HashMap;
use std::time::Duration;

use replay_core::{order_by_date_missing_last, slugify, ExtractedPost, PostUrlFilter};
use replay_logging::{replay_debug, replay_info};
use scraper::{Html, Selector};
use url::Url;

use crate::extract::{normalized_text, ArticleExtractor};
use crate::retry::safe_fetch;
use crate::strategy::StrategyError;
use crate::Fetcher;

/// A post link found on the index page and the themes it is listed under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub url: String,
    pub tags: Vec<String>,
}

/// Collects a site whose index page groups post links under `h2`/`h3`
/// theme headings.
pub struct ThemedIndex<'a> {
    fetcher: &'a dyn Fetcher,
    extractor: &'a dyn ArticleExtractor,
    polite_delay: Duration,
}

impl<'a> ThemedIndex<'a> {
    pub fn new(
        fetcher: &'a dyn Fetcher,
        extractor: &'a dyn ArticleExtractor,
        polite_delay: Duration,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            polite_delay,
        }
    }

    /// Fails only when the index page itself cannot be fetched or its URL is
    /// invalid. Undated posts are ordered after dated ones.
    pub async fn collect(&self, index_url: &str) -> Result<Vec<ExtractedPost>, StrategyError> {
        let output = self.fetcher.fetch(index_url).await?;
        let entries = parse_index(index_url, &output.text())?;
        replay_info!("Found {} themed links on {}", entries.len(), index_url);

        let mut posts = Vec::new();
        for (i, entry) in entries.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.polite_delay).await;
            }
            replay_debug!("Fetching {}/{}: {}", i + 1, entries.len(), entry.url);
            let Some(page) = safe_fetch(self.fetcher, &entry.url).await else {
                continue;
            };
            if let Some(post) = self.extractor.extract(&entry.url, &page.text()) {
                posts.push(post.with_tags(entry.tags.clone()));
            }
        }

        order_by_date_missing_last(&mut posts);
        Ok(posts)
    }
}

/// Post links in first-seen order, each tagged with the slugified headings
/// it appears under.
pub fn parse_index(index_url: &str, html: &str) -> Result<Vec<IndexEntry>, StrategyError> {
    let base = Url::parse(index_url)
        .map_err(|err| StrategyError::Parse(format!("index url {index_url}: {err}")))?;
    let walk = Selector::parse("h2, h3, a[href]")
        .map_err(|err| StrategyError::Parse(err.to_string()))?;
    let filter = PostUrlFilter::new(&base);
    let doc = Html::parse_document(html);

    let mut entries: Vec<IndexEntry> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut theme: Option<String> = None;

    for el in doc.select(&walk) {
        if el.value().name() != "a" {
            theme = Some(slugify(&normalized_text(el))).filter(|t| !t.is_empty());
            continue;
        }
        let Some(mut url) = el.value().attr("href").and_then(|h| base.join(h.trim()).ok()) else {
            continue;
        };
        url.set_fragment(None);
        if url.path() == base.path() || !filter.accepts(url.as_str()) {
            continue;
        }

        let url = String::from(url);
        let index = *positions.entry(url.clone()).or_insert_with(|| {
            entries.push(IndexEntry {
                url,
                tags: Vec::new(),
            });
            entries.len() - 1
        });
        if let (Some(theme), Some(entry)) = (theme.as_ref(), entries.get_mut(index)) {
            if !entry.tags.contains(theme) {
                entry.tags.push(theme.clone());
            }
        }
    }
    Ok(entries)
}
