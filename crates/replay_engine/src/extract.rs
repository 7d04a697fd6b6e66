use std::collections::HashMap;

use ego_tree::NodeId;
use replay_core::{resolve_date, slugify, ExtractedPost};
use replay_logging::replay_debug;
use scraper::{ElementRef, Html, Selector};

/// Structured metadata names checked for a publish date, in priority order.
pub const DATE_META_CANDIDATES: &[&str] = &["article:published_time", "datePublished", "date"];

/// A title segment this long is taken to be the post title on its own.
const MIN_TITLE_SEGMENT_WORDS: usize = 4;

const TITLE_SEPARATORS: &[&str] = &[" | ", " - ", " \u{2013} ", " \u{2014} ", " :: ", " / "];

const PARAGRAPH_SELECTOR: &str = "p, pre, td, blockquote";
const MIN_PARAGRAPH_CHARS: usize = 25;
const CLASS_WEIGHT: f64 = 25.0;

const POSITIVE_HINTS: &[&str] = &["article", "content", "entry", "post", "body", "text", "main"];
const NEGATIVE_HINTS: &[&str] = &[
    "comment", "sidebar", "footer", "nav", "menu", "share", "promo", "related", "widget", "ad-",
];

/// Used when no paragraph scores at all (very short or list-only pages).
const FALLBACK_CONTAINERS: &[&str] = &[
    "main",
    "article",
    "[role='main']",
    ".post-content",
    ".entry-content",
    "#content",
    ".content",
    "body",
];

/// Converts one fetched page into a post, or `None` when the page does not
/// look like an article.
pub trait ArticleExtractor: Send + Sync {
    fn extract(&self, url: &str, html: &str) -> Option<ExtractedPost>;
}

/// Readability-style extractor:
/// - title from `<title>`, shortened by dropping the site name
/// - content from the best-scoring paragraph container
/// - date from `<time datetime>`, then structured `<meta>` tags.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReadabilityExtractor;

impl ArticleExtractor for ReadabilityExtractor {
    fn extract(&self, url: &str, html: &str) -> Option<ExtractedPost> {
        let doc = Html::parse_document(html);

        let Some(title) = extract_title(&doc) else {
            replay_debug!("extract.miss url={} reason=no-title", url);
            return None;
        };
        let content_html = main_content(&doc).unwrap_or_default();
        let post = ExtractedPost::new(title, url, content_html, "");
        if post.content_html.trim().is_empty() || !post.has_enough_content() {
            replay_debug!("extract.miss url={} reason=short-content", url);
            return None;
        }

        let slug = slugify(&post.title);
        Some(ExtractedPost {
            slug,
            published_at: find_published_at(&doc),
            ..post
        })
    }
}

pub fn extract_title(doc: &Html) -> Option<String> {
    let headings = texts(doc, "h1, h2");
    match first_text(doc, "title") {
        Some(raw) => Some(shorten_title(&raw, &headings)),
        None => first_text(doc, "h1"),
    }
}

/// Drop a " | Site Name" style suffix or prefix. A segment echoed by a page
/// heading wins; otherwise a first or last segment of at least
/// [`MIN_TITLE_SEGMENT_WORDS`] words; otherwise the whole title is kept.
fn shorten_title(raw: &str, headings: &[String]) -> String {
    if headings.iter().any(|h| h == raw) {
        return raw.to_string();
    }
    let Some(sep) = TITLE_SEPARATORS.iter().find(|sep| raw.contains(*sep)) else {
        return raw.to_string();
    };
    let parts: Vec<&str> = raw
        .split(sep)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();

    let lowered: Vec<String> = headings.iter().map(|h| h.to_lowercase()).collect();
    let echoed = parts
        .iter()
        .find(|part| headings.iter().any(|h| h.as_str() == **part))
        .or_else(|| {
            parts.iter().find(|part| {
                let part = part.to_lowercase();
                lowered.iter().any(|h| h.starts_with(&part))
            })
        });
    if let Some(part) = echoed {
        return part.to_string();
    }

    let wordy = |part: &&str| part.split_whitespace().count() >= MIN_TITLE_SEGMENT_WORDS;
    parts
        .first()
        .copied()
        .filter(wordy)
        .or_else(|| parts.last().copied().filter(wordy))
        .map_or_else(|| raw.to_string(), str::to_string)
}

/// Resolve the publish date: `<time datetime>` first, then each metadata
/// candidate by `property`, then by `name`.
pub fn find_published_at(doc: &Html) -> Option<String> {
    let time_value = Selector::parse("time[datetime]")
        .ok()
        .and_then(|sel| doc.select(&sel).next())
        .and_then(|el| el.value().attr("datetime"));
    if let Some(date) = resolve_date(time_value) {
        return Some(date);
    }

    for candidate in DATE_META_CANDIDATES {
        for attr in ["property", "name"] {
            let css = format!("meta[{attr}=\"{candidate}\"]");
            let content = Selector::parse(&css)
                .ok()
                .and_then(|sel| doc.select(&sel).next())
                .and_then(|el| el.value().attr("content"));
            if let Some(date) = resolve_date(content) {
                return Some(date);
            }
        }
    }
    None
}

/// Outer HTML of the element most likely to hold the article body.
pub fn main_content(doc: &Html) -> Option<String> {
    best_scoring_candidate(doc)
        .or_else(|| first_matching(doc, FALLBACK_CONTAINERS))
        .map(|el| el.html())
}

fn best_scoring_candidate(doc: &Html) -> Option<ElementRef<'_>> {
    let sel = Selector::parse(PARAGRAPH_SELECTOR).ok()?;

    // document order, so ties resolve to the earliest candidate
    let mut order: Vec<NodeId> = Vec::new();
    let mut scores: HashMap<NodeId, f64> = HashMap::new();
    let mut credit = |el: ElementRef<'_>, amount: f64| {
        let entry = scores.entry(el.id()).or_insert_with(|| {
            order.push(el.id());
            initial_score(el)
        });
        *entry += amount;
    };

    for paragraph in doc.select(&sel) {
        let text = normalized_text(paragraph);
        let len = text.chars().count();
        if len < MIN_PARAGRAPH_CHARS {
            continue;
        }
        let score = 1.0 + text.matches(',').count() as f64 + (len as f64 / 100.0).min(3.0);
        if let Some(parent) = parent_element(paragraph) {
            credit(parent, score);
            if let Some(grandparent) = parent_element(parent) {
                credit(grandparent, score / 2.0);
            }
        }
    }

    let mut best: Option<(ElementRef<'_>, f64)> = None;
    for id in order {
        let Some(el) = doc.tree.get(id).and_then(ElementRef::wrap) else {
            continue;
        };
        let score = scores.get(&id).copied().unwrap_or_default() * (1.0 - link_density(el));
        if score > 0.0 && best.map_or(true, |(_, top)| score > top) {
            best = Some((el, score));
        }
    }
    best.map(|(el, _)| el)
}

fn initial_score(el: ElementRef<'_>) -> f64 {
    let tag_score = match el.value().name() {
        "div" => 5.0,
        "pre" | "td" | "blockquote" => 3.0,
        "address" | "ol" | "ul" | "dl" | "dd" | "dt" | "li" | "form" => -3.0,
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "th" => -5.0,
        _ => 0.0,
    };
    tag_score + class_weight(el)
}

fn class_weight(el: ElementRef<'_>) -> f64 {
    let mut weight = 0.0;
    for hint_source in [el.value().attr("class"), el.value().attr("id")]
        .into_iter()
        .flatten()
    {
        let lowered = hint_source.to_ascii_lowercase();
        if NEGATIVE_HINTS.iter().any(|hint| lowered.contains(hint)) {
            weight -= CLASS_WEIGHT;
        }
        if POSITIVE_HINTS.iter().any(|hint| lowered.contains(hint)) {
            weight += CLASS_WEIGHT;
        }
    }
    weight
}

fn link_density(el: ElementRef<'_>) -> f64 {
    let total = normalized_text(el).chars().count();
    if total == 0 {
        return 0.0;
    }
    let Ok(anchor) = Selector::parse("a") else {
        return 0.0;
    };
    let linked: usize = el
        .select(&anchor)
        .map(|a| normalized_text(a).chars().count())
        .sum();
    (linked as f64 / total as f64).min(1.0)
}

fn parent_element(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.parent().and_then(ElementRef::wrap)
}

fn first_matching<'a>(doc: &'a Html, selectors: &[&str]) -> Option<ElementRef<'a>> {
    selectors.iter().find_map(|css| {
        let sel = Selector::parse(css).ok()?;
        doc.select(&sel).next()
    })
}

pub(crate) fn normalized_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().split_whitespace().collect::<Vec<_>>().join(" ")
}

fn first_text(doc: &Html, css: &str) -> Option<String> {
    texts(doc, css).into_iter().next()
}

fn texts(doc: &Html, css: &str) -> Vec<String> {
    let Ok(sel) = Selector::parse(css) else {
        return Vec::new();
    };
    doc.select(&sel)
        .map(normalized_text)
        .filter(|t| !t.is_empty())
        .collect()
}
