use replay_core::{slugify, ExtractedPost};
use replay_logging::{replay_debug, replay_info};
use serde::{Deserialize, Serialize};

use crate::extract::ArticleExtractor;
use crate::retry::safe_fetch;
use crate::Fetcher;

/// Extracted titles longer than this are assumed to be page chrome.
pub const MAX_EXTRACTED_TITLE_CHARS: usize = 100;

/// One hand-picked post, as listed in a curated links file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CuratedLink {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub author: Option<String>,
}

/// Fetches a curated list of posts from any number of sites.
pub struct CuratedCollector<'a> {
    fetcher: &'a dyn Fetcher,
    extractor: &'a dyn ArticleExtractor,
}

impl<'a> CuratedCollector<'a> {
    pub fn new(fetcher: &'a dyn Fetcher, extractor: &'a dyn ArticleExtractor) -> Self {
        Self { fetcher, extractor }
    }

    /// Posts in curated order; links that fail to fetch or extract are skipped.
    pub async fn collect(&self, links: &[CuratedLink]) -> Vec<ExtractedPost> {
        let mut posts = Vec::new();
        for (i, link) in links.iter().enumerate() {
            replay_debug!("Fetching {}/{}: {}", i + 1, links.len(), link.url);
            let Some(output) = safe_fetch(self.fetcher, &link.url).await else {
                continue;
            };
            if let Some(post) = self.extractor.extract(&link.url, &output.text()) {
                posts.push(apply_curation(post, link));
            }
        }
        replay_info!("Collected {}/{} curated posts", posts.len(), links.len());
        posts
    }
}

fn apply_curation(mut post: ExtractedPost, link: &CuratedLink) -> ExtractedPost {
    let title_len = post.title.chars().count();
    if (title_len == 0 || title_len > MAX_EXTRACTED_TITLE_CHARS) && !link.title.is_empty() {
        post.title = link.title.clone();
        post.slug = slugify(&post.title);
    }
    if let Some(author) = link.author.as_deref().map(str::trim).filter(|a| !a.is_empty()) {
        post.tags = vec![slugify(author)];
    }
    post
}
