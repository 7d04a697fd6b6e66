//! Email-safe normalization of extracted post markup.
//!
//! Stages run in a fixed order, each producing a new tree:
//! parse, strip denylisted subtrees, absolutize URLs, take the image
//! inventory, select the body, sanitize against the allow-list, inline CSS,
//! then derive text metrics from the result.
pub mod dom;
pub mod inline;
pub mod rules;
pub mod sanitize;
pub mod text;

use replay_core::{
    excerpt, reading_time_minutes, word_count, CleanedPost, ExtractedPost, ImageRef,
};
use replay_logging::{replay_debug, replay_warn};

pub use inline::{InlineError, Styled};

#[derive(Debug, Clone, Default)]
pub struct NormalizeOptions {
    /// Relative links and images resolve against this.
    pub base_url: String,
    /// Carried for the upload stage; normalization does not use it.
    pub cdn_url: Option<String>,
    /// CSS inlined into `style` attributes.
    pub stylesheet: Option<String>,
}

/// Normalized markup and everything derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedContent {
    pub content_html: String,
    pub content_text: String,
    pub excerpt: String,
    pub word_count: usize,
    pub reading_time_minutes: u32,
    pub images: Vec<ImageRef>,
    /// Set when CSS inlining failed and unstyled markup was kept.
    pub style_degraded: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    options: NormalizeOptions,
}

impl Normalizer {
    pub fn new(options: NormalizeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    /// Never fails; a failed styling stage degrades to unstyled output.
    pub fn normalize(&self, raw_html: &str) -> NormalizedContent {
        let tree = dom::parse_document(raw_html);
        let tree = sanitize::strip_denied(tree);
        let tree = sanitize::absolutize(tree, &self.options.base_url);
        let images = sanitize::collect_images(&tree);
        let tree = dom::body_or_all(tree);
        let tree = sanitize::sanitize(tree);

        let styled = inline::inline_styles(tree, self.options.stylesheet.as_deref());
        let style_degraded = styled.is_degraded();
        if let Styled::Degraded { error, .. } = &styled {
            replay_warn!("CSS inlining failed, using unstyled markup: {}", error);
        }
        let content_html = dom::serialize(&styled.into_nodes()).trim().to_string();

        let content_text = text::plain_text(&dom::parse_fragment(&content_html));
        let words = word_count(&content_text);
        let minutes = reading_time_minutes(words);
        replay_debug!(
            "Cleaned: {} words, ~{} min read, {} images",
            words,
            minutes,
            images.len()
        );

        NormalizedContent {
            excerpt: excerpt(&content_text),
            content_html,
            content_text,
            word_count: words,
            reading_time_minutes: minutes,
            images,
            style_degraded,
        }
    }

    /// Everything but `content_html` is carried over from `post` unchanged.
    pub fn clean_post(&self, post: ExtractedPost) -> CleanedPost {
        let normalized = self.normalize(&post.content_html);
        CleanedPost {
            post: ExtractedPost {
                content_html: normalized.content_html,
                ..post
            },
            content_text: normalized.content_text,
            excerpt: normalized.excerpt,
            word_count: normalized.word_count,
            reading_time_minutes: normalized.reading_time_minutes,
            images: normalized.images,
        }
    }
}
