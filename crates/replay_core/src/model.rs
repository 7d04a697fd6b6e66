use serde::{Deserialize, Serialize};

/// Content shorter than this (in characters) is extraction noise, not a post.
pub const MIN_CONTENT_LEN: usize = 100;

/// One discovered post, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedPost {
    pub title: String,
    /// Canonical absolute URL; unique within one extraction run.
    pub url: String,
    /// Raw, unsanitized body fragment.
    pub content_html: String,
    pub slug: String,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ExtractedPost {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        content_html: impl Into<String>,
        slug: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            content_html: content_html.into(),
            slug: slug.into(),
            published_at: None,
            tags: Vec::new(),
        }
    }

    pub fn with_published_at(mut self, published_at: impl Into<String>) -> Self {
        self.published_at = Some(published_at.into());
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// True when the body is long enough to be emitted.
    pub fn has_enough_content(&self) -> bool {
        self.content_html.chars().count() >= MIN_CONTENT_LEN
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub src: String,
    #[serde(default)]
    pub alt: String,
}

/// An [`ExtractedPost`] after the normalization pass.
///
/// `post.content_html` holds the sanitized markup; every other field of
/// `post` is carried forward unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanedPost {
    #[serde(flatten)]
    pub post: ExtractedPost,
    pub content_text: String,
    pub excerpt: String,
    pub word_count: usize,
    pub reading_time_minutes: u32,
    #[serde(default)]
    pub images: Vec<ImageRef>,
}

/// Interchange record: a post plus its 1-based position in the delivery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedPost<T> {
    #[serde(flatten)]
    pub post: T,
    pub post_index: usize,
}

impl<T> IndexedPost<T> {
    /// Number a sequence in array order, starting at 1.
    pub fn number_all(posts: impl IntoIterator<Item = T>) -> Vec<Self> {
        posts
            .into_iter()
            .enumerate()
            .map(|(i, post)| Self {
                post,
                post_index: i + 1,
            })
            .collect()
    }
}
