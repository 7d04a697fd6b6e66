use std::collections::HashSet;

use replay_core::{is_slug_like_path, ExtractedPost, PostUrlFilter};
use replay_logging::replay_info;
use scraper::{Html, Selector};
use url::Url;

use super::{non_empty, SiteContext, Strategy, StrategyError};

/// Harvest slug-like links from the home page or a listing page.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinkArchive;

#[async_trait::async_trait]
impl Strategy for LinkArchive {
    fn name(&self) -> &'static str {
        "link archive"
    }

    async fn evaluate(
        &self,
        site: &SiteContext<'_>,
    ) -> Result<Option<Vec<ExtractedPost>>, StrategyError> {
        let mut links = Vec::new();
        for path in &site.settings().listing_paths {
            let listing_url = site.page_url(path);
            let Some(output) = site.fetch(&listing_url).await else {
                continue;
            };
            links = slug_like_links(&listing_url, &output.text(), site.filter());
            if !links.is_empty() {
                break;
            }
        }

        let post_urls = site.filter().retain(links);
        if post_urls.is_empty() {
            return Ok(None);
        }
        replay_info!("Found {} post links on listing page", post_urls.len());
        Ok(non_empty(site.fetch_and_extract_all(&post_urls).await))
    }
}

/// Same-site links with a slug-like path, deduplicated in first-seen order.
pub fn slug_like_links(page_url: &str, html: &str, filter: &PostUrlFilter) -> Vec<String> {
    let (Ok(base), Ok(anchor)) = (Url::parse(page_url), Selector::parse("a[href]")) else {
        return Vec::new();
    };
    let doc = Html::parse_document(html);

    let mut seen = HashSet::new();
    doc.select(&anchor)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| base.join(href.trim()).ok())
        .filter(|url| filter.same_site(url) && is_slug_like_path(url.path()))
        .map(String::from)
        .filter(|url| seen.insert(url.clone()))
        .collect()
}
