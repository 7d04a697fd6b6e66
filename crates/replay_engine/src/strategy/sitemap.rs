use quick_xml::events::Event;
use quick_xml::Reader;
use replay_core::ExtractedPost;
use replay_logging::{replay_debug, replay_info, replay_warn};

use super::{non_empty, SiteContext, Strategy, StrategyError};
use crate::decode::decode_html;
use crate::FetchOutput;

/// Standard sitemap locations. An index of sitemaps is followed one level.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sitemap;

/// `<loc>` values of one sitemap document, split by parent element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SitemapDocument {
    /// Children of a sitemap index (`<sitemap><loc>`).
    pub sitemaps: Vec<String>,
    /// Page entries (`<url><loc>`).
    pub urls: Vec<String>,
}

#[async_trait::async_trait]
impl Strategy for Sitemap {
    fn name(&self) -> &'static str {
        "sitemap"
    }

    async fn evaluate(
        &self,
        site: &SiteContext<'_>,
    ) -> Result<Option<Vec<ExtractedPost>>, StrategyError> {
        let mut found = Vec::new();
        for path in &site.settings().sitemap_paths {
            let sitemap_url = site.page_url(path);
            let Some(output) = site.fetch(&sitemap_url).await else {
                continue;
            };
            let document = match read_sitemap(&output) {
                Ok(document) => document,
                Err(err) => {
                    replay_warn!("sitemap.skip url={} error={}", sitemap_url, err);
                    continue;
                }
            };
            let urls = if document.sitemaps.is_empty() {
                document.urls
            } else {
                leaf_urls(site, &document.sitemaps).await
            };
            if !urls.is_empty() {
                found = urls;
                break;
            }
        }
        if found.is_empty() {
            return Ok(None);
        }

        let post_urls = site.filter().retain(found);
        replay_info!("Found {} URLs in sitemap", post_urls.len());
        Ok(non_empty(site.fetch_and_extract_all(&post_urls).await))
    }
}

/// Page URLs from each child sitemap. Nested indexes are not followed further.
async fn leaf_urls(site: &SiteContext<'_>, children: &[String]) -> Vec<String> {
    let mut urls = Vec::new();
    for child in children {
        replay_debug!("sitemap.child url={}", child);
        let Some(output) = site.fetch(child).await else {
            continue;
        };
        match read_sitemap(&output) {
            Ok(document) => urls.extend(document.urls),
            Err(err) => replay_warn!("sitemap.skip url={} error={}", child, err),
        }
    }
    urls
}

fn read_sitemap(output: &FetchOutput) -> Result<SitemapDocument, StrategyError> {
    let xml = decode_html(&output.bytes, output.metadata.content_type.as_deref())?.html;
    parse_sitemap(&xml)
}

pub fn parse_sitemap(xml: &str) -> Result<SitemapDocument, StrategyError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut document = SitemapDocument::default();
    let mut open: Vec<String> = Vec::new();
    loop {
        let text = match reader.read_event() {
            Ok(Event::Start(start)) => {
                open.push(String::from_utf8_lossy(start.local_name().as_ref()).into_owned());
                continue;
            }
            Ok(Event::End(_)) => {
                open.pop();
                continue;
            }
            Ok(Event::Text(text)) => text
                .unescape()
                .map_err(|err| StrategyError::Parse(format!("sitemap text: {err}")))?
                .into_owned(),
            Ok(Event::CData(data)) => String::from_utf8_lossy(&data.into_inner()).into_owned(),
            Ok(Event::Eof) => break,
            Ok(_) => continue,
            Err(err) => {
                return Err(StrategyError::Parse(format!(
                    "sitemap xml at byte {}: {err}",
                    reader.buffer_position()
                )))
            }
        };

        let loc = text.trim();
        if loc.is_empty() {
            continue;
        }
        match open.as_slice() {
            [.., parent, last] if last == "loc" && parent == "sitemap" => {
                document.sitemaps.push(loc.to_string())
            }
            [.., parent, last] if last == "loc" && parent == "url" => {
                document.urls.push(loc.to_string())
            }
            _ => {}
        }
    }
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::parse_sitemap;

    #[test]
    fn url_set_entries_are_read_in_order() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
            <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
              <url><loc>https://blog.example/2023/first</loc><lastmod>2023-01-01</lastmod></url>
              <url><loc> https://blog.example/2023/second?a=1&amp;b=2 </loc></url>
            </urlset>"#;
        let doc = parse_sitemap(xml).unwrap();
        assert!(doc.sitemaps.is_empty());
        assert_eq!(
            doc.urls,
            vec![
                "https://blog.example/2023/first",
                "https://blog.example/2023/second?a=1&b=2"
            ]
        );
    }

    #[test]
    fn index_entries_are_kept_apart_from_pages() {
        let xml = r#"<sitemapindex>
              <sitemap><loc><![CDATA[https://blog.example/post-sitemap.xml]]></loc></sitemap>
            </sitemapindex>"#;
        let doc = parse_sitemap(xml).unwrap();
        assert_eq!(doc.sitemaps, vec!["https://blog.example/post-sitemap.xml"]);
        assert!(doc.urls.is_empty());
    }

    #[test]
    fn malformed_xml_is_a_parse_error() {
        assert!(parse_sitemap("<urlset><url><loc>x</url></urlset>").is_err());
    }
}
