use replay_core::{resolve_date, slugify, truncate_slug, ExtractedPost};
use replay_logging::{replay_debug, replay_info};
use scraper::Html;
use serde::Deserialize;

use super::{non_empty, SiteContext, Strategy, StrategyError};

pub const TOTAL_PAGES_HEADER: &str = "X-WP-TotalPages";

/// The WordPress REST content API. It separates title, body and date itself,
/// so no article extraction is needed.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlatformApi;

#[derive(Debug, Deserialize)]
struct ApiPost {
    #[serde(default)]
    title: Rendered,
    #[serde(default)]
    content: Rendered,
    #[serde(default)]
    link: String,
    #[serde(default)]
    slug: Option<String>,
    #[serde(default)]
    date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Rendered {
    #[serde(default)]
    rendered: String,
}

#[async_trait::async_trait]
impl Strategy for PlatformApi {
    fn name(&self) -> &'static str {
        "platform api"
    }

    async fn evaluate(
        &self,
        site: &SiteContext<'_>,
    ) -> Result<Option<Vec<ExtractedPost>>, StrategyError> {
        let settings = site.settings();
        let api_url = site.page_url(&settings.api_path);
        let mut posts = Vec::new();
        let mut page: u32 = 1;

        loop {
            let page_url = format!(
                "{api_url}?per_page={}&page={page}&orderby=date&order=asc",
                settings.api_page_size
            );
            let Some(output) = site.fetch(&page_url).await else {
                break;
            };
            let items: Vec<ApiPost> = serde_json::from_slice(&output.bytes)
                .map_err(|err| StrategyError::Parse(format!("{page_url}: {err}")))?;
            if items.is_empty() {
                break;
            }
            replay_debug!("platform_api.page page={} items={}", page, items.len());
            posts.extend(items.into_iter().filter_map(into_post));

            let total_pages = output
                .header(TOTAL_PAGES_HEADER)
                .and_then(|v| v.trim().parse::<u32>().ok())
                .unwrap_or(1);
            if page >= total_pages {
                break;
            }
            page += 1;
        }

        if !posts.is_empty() {
            replay_info!("Platform API returned {} posts", posts.len());
        }
        Ok(non_empty(posts))
    }
}

fn into_post(item: ApiPost) -> Option<ExtractedPost> {
    let title = strip_markup(&item.title.rendered);
    if title.is_empty() || item.content.rendered.is_empty() {
        return None;
    }
    let slug = item
        .slug
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map_or_else(|| slugify(&title), truncate_slug);
    let published_at = resolve_date(item.date.as_deref());
    let post = ExtractedPost {
        published_at,
        ..ExtractedPost::new(title, item.link, item.content.rendered, slug)
    };
    post.has_enough_content().then_some(post)
}

/// Text content of an HTML fragment, entities decoded.
fn strip_markup(fragment: &str) -> String {
    Html::parse_fragment(fragment)
        .root_element()
        .text()
        .collect::<String>()
        .trim()
        .to_string()
}
