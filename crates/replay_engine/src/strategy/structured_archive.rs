use std::collections::HashSet;

use replay_core::{resolve_date, slug_from_url_path, ExtractedPost};
use replay_logging::{replay_debug, replay_info};
use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::{non_empty, SiteContext, Strategy, StrategyError};
use crate::extract::normalized_text;

const TAXONOMY_MARKERS: &[&str] = &["/tag/", "/category/"];

/// Archive pages built from repeated `<article>` blocks, each carrying a
/// linked title, taxonomy links and a date.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredArchive;

/// What the archive listing says about one post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub title: String,
    pub url: String,
    pub tags: Vec<String>,
    pub date: Option<String>,
}

#[async_trait::async_trait]
impl Strategy for StructuredArchive {
    fn name(&self) -> &'static str {
        "structured archive"
    }

    async fn evaluate(
        &self,
        site: &SiteContext<'_>,
    ) -> Result<Option<Vec<ExtractedPost>>, StrategyError> {
        for path in &site.settings().archive_paths {
            let archive_url = site.page_url(path);
            let Some(output) = site.fetch(&archive_url).await else {
                continue;
            };
            let Some(entries) = parse_archive_page(
                &archive_url,
                &output.text(),
                site.settings().min_article_blocks,
            ) else {
                continue;
            };
            if entries.is_empty() {
                continue;
            }

            replay_info!(
                "Parsed {} posts with metadata from {}, fetching content",
                entries.len(),
                archive_url
            );
            let mut posts = Vec::new();
            for (i, entry) in entries.iter().enumerate() {
                replay_debug!("Fetching {}/{}: {}", i + 1, entries.len(), entry.url);
                if let Some(post) = site.fetch_and_extract_as(&entry.url, &entry.url).await {
                    posts.push(overlay(post, entry));
                }
            }
            return Ok(non_empty(posts));
        }
        Ok(None)
    }
}

/// Archive tags always win; the path slug wins when the path has one; the
/// archive date only fills a missing in-page date.
fn overlay(mut post: ExtractedPost, entry: &ArchiveEntry) -> ExtractedPost {
    post.tags = entry.tags.clone();
    if let Some(slug) = slug_from_url_path(&entry.url) {
        post.slug = slug;
    }
    if post.published_at.is_none() {
        post.published_at = resolve_date(entry.date.as_deref());
    }
    post
}

/// `None` when the page has fewer than `min_blocks` `<article>` elements.
pub fn parse_archive_page(
    page_url: &str,
    html: &str,
    min_blocks: usize,
) -> Option<Vec<ArchiveEntry>> {
    let doc = Html::parse_document(html);
    let article_sel = Selector::parse("article").ok()?;
    let articles: Vec<ElementRef<'_>> = doc.select(&article_sel).collect();
    if articles.len() < min_blocks {
        return None;
    }
    replay_debug!("Found {} <article> elements on {}", articles.len(), page_url);

    let base = Url::parse(page_url).ok()?;
    let mut seen = HashSet::new();
    Some(
        articles
            .into_iter()
            .filter_map(|article| parse_entry(&base, article))
            .filter(|entry| seen.insert(entry.url.clone()))
            .collect(),
    )
}

fn parse_entry(base: &Url, article: ElementRef<'_>) -> Option<ArchiveEntry> {
    let heading_sel = Selector::parse("h1, h2, h3").ok()?;
    let link_sel = Selector::parse("a[href]").ok()?;
    let dated_sel = Selector::parse("[class*=date]").ok()?;
    let time_sel = Selector::parse("time[datetime]").ok()?;

    let heading = article.select(&heading_sel).find(|h| {
        h.value()
            .attr("class")
            .map_or(true, |class| class.contains("title"))
    })?;
    let link = heading.select(&link_sel).next()?;
    let href = link.value().attr("href")?;
    let url = base.join(href.trim()).ok()?;

    let tags = article
        .select(&link_sel)
        .filter(|a| {
            a.value()
                .attr("href")
                .is_some_and(|h| TAXONOMY_MARKERS.iter().any(|m| h.contains(m)))
        })
        .map(|a| normalized_text(a).to_lowercase())
        .collect();

    let date = article
        .select(&dated_sel)
        .next()
        .map(normalized_text)
        .filter(|text| !text.is_empty())
        .or_else(|| {
            article
                .select(&time_sel)
                .next()
                .and_then(|t| t.value().attr("datetime"))
                .map(str::to_string)
        });

    Some(ArchiveEntry {
        title: normalized_text(link),
        url: url.to_string(),
        tags,
        date,
    })
}

#[cfg(test)]
mod tests {
    use super::parse_archive_page;

    fn block(n: usize) -> String {
        format!(
            r#"<article>
                <h2 class="entry-title"><a href="/2023/post-{n}">Post {n}</a></h2>
                <span class="post-date">March {n}, 2023</span>
                <a href="/tag/Rust">Rust</a>
                <a href="/category/Notes">Notes</a>
            </article>"#
        )
    }

    #[test]
    fn archive_needs_enough_article_blocks() {
        let html = format!("<html><body>{}</body></html>", (1..=4).map(block).collect::<String>());
        assert!(parse_archive_page("https://blog.example/archive", &html, 5).is_none());
    }

    #[test]
    fn archive_entries_carry_link_tags_and_date() {
        let html = format!("<html><body>{}</body></html>", (1..=5).map(block).collect::<String>());
        let entries = parse_archive_page("https://blog.example/archive", &html, 5).unwrap();
        assert_eq!(entries.len(), 5);
        assert_eq!(entries[0].title, "Post 1");
        assert_eq!(entries[0].url, "https://blog.example/2023/post-1");
        assert_eq!(entries[0].tags, vec!["rust", "notes"]);
        assert_eq!(entries[0].date.as_deref(), Some("March 1, 2023"));
    }

    #[test]
    fn repeated_posts_are_listed_once() {
        let blocks: String = [1, 2, 1, 3, 2].into_iter().map(block).collect();
        let html = format!("<html><body>{blocks}</body></html>");
        let entries = parse_archive_page("https://blog.example/archive", &html, 5).unwrap();
        let urls: Vec<&str> = entries.iter().map(|e| e.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://blog.example/2023/post-1",
                "https://blog.example/2023/post-2",
                "https://blog.example/2023/post-3",
            ]
        );
    }
}
