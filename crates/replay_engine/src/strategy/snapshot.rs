use std::collections::HashSet;

use replay_core::ExtractedPost;
use replay_logging::{replay_debug, replay_info};

use super::{non_empty, SiteContext, Strategy, StrategyError};

/// Last resort: previously crawled copies of the site from a public web
/// archive's CDX index.
#[derive(Debug, Default, Clone, Copy)]
pub struct HistoricalSnapshot;

/// One archived capture of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    pub timestamp: String,
    pub original: String,
}

impl Capture {
    /// The archive's URL-rewriting form of this capture.
    pub fn archive_url(&self, endpoint: &str) -> String {
        format!(
            "{}/web/{}/{}",
            endpoint.trim_end_matches('/'),
            self.timestamp,
            self.original
        )
    }
}

#[async_trait::async_trait]
impl Strategy for HistoricalSnapshot {
    fn name(&self) -> &'static str {
        "historical snapshot"
    }

    async fn evaluate(
        &self,
        site: &SiteContext<'_>,
    ) -> Result<Option<Vec<ExtractedPost>>, StrategyError> {
        let settings = site.settings();
        let endpoint = settings.snapshot_endpoint.trim_end_matches('/');
        let index_url = format!(
            "{endpoint}/cdx/search/cdx?url={}/*&output=json&fl=timestamp,original,statuscode\
             &filter=statuscode:200&filter=mimetype:text/html&collapse=urlkey&limit={}",
            site.domain(),
            settings.snapshot_limit
        );
        let Some(output) = site.fetch(&index_url).await else {
            return Ok(None);
        };
        let rows: Vec<Vec<String>> = serde_json::from_slice(&output.bytes)
            .map_err(|err| StrategyError::Parse(format!("capture index: {err}")))?;

        let captures: Vec<Capture> = unique_captures(&rows)
            .into_iter()
            .filter(|capture| site.filter().accepts(&capture.original))
            .collect();
        if captures.is_empty() {
            return Ok(None);
        }
        replay_info!("Found {} archived URLs", captures.len());

        let mut posts = Vec::new();
        for (i, capture) in captures.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(settings.polite_delay).await;
            }
            replay_debug!("Fetching from archive: {}", capture.original);
            let archived = capture.archive_url(endpoint);
            if let Some(post) = site.fetch_and_extract_as(&archived, &capture.original).await {
                posts.push(post);
            }
        }
        Ok(non_empty(posts))
    }
}

/// Skip the header row, keep the first capture of each original URL.
pub fn unique_captures(rows: &[Vec<String>]) -> Vec<Capture> {
    let mut seen = HashSet::new();
    rows.iter()
        .skip(1)
        .filter_map(|row| match row.as_slice() {
            [timestamp, original, ..] => Some(Capture {
                timestamp: timestamp.clone(),
                original: original.clone(),
            }),
            _ => None,
        })
        .filter(|capture| seen.insert(capture.original.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::unique_captures;

    fn row(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn header_row_and_repeat_originals_are_dropped() {
        let rows = vec![
            row(&["timestamp", "original", "statuscode"]),
            row(&["20200101000000", "https://blog.example/2019/a", "200"]),
            row(&["20210101000000", "https://blog.example/2019/a", "200"]),
            row(&["20200202000000", "https://blog.example/2019/b", "200"]),
        ];
        let captures = unique_captures(&rows);
        assert_eq!(captures.len(), 2);
        assert_eq!(captures[0].timestamp, "20200101000000");
        assert_eq!(
            captures[1].archive_url("https://web.archive.org/"),
            "https://web.archive.org/web/20200202000000/https://blog.example/2019/b"
        );
    }
}
