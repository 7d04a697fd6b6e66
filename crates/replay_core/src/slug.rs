use url::Url;

pub const MAX_SLUG_LEN: usize = 80;

/// URL-safe identifier derived from free text.
///
/// Keeps word characters, collapses whitespace/hyphen runs into a single `-`
/// and truncates to [`MAX_SLUG_LEN`] characters.
pub fn slugify(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut pending_sep = false;
    for c in lowered.chars() {
        if c.is_alphanumeric() || c == '_' {
            if pending_sep && !slug.is_empty() {
                slug.push('-');
            }
            pending_sep = false;
            slug.push(c);
        } else if c.is_whitespace() || c == '-' {
            pending_sep = true;
        }
        // everything else is dropped without breaking the current word
    }
    let truncated: String = slug.chars().take(MAX_SLUG_LEN).collect();
    truncated.trim_end_matches('-').to_string()
}

/// Last non-empty path segment of `url`, if any, cut to [`MAX_SLUG_LEN`].
pub fn slug_from_url_path(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .path()
        .trim_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(truncate_slug)
}

/// Cut an externally supplied slug to [`MAX_SLUG_LEN`] characters.
pub fn truncate_slug(slug: &str) -> String {
    slug.chars().take(MAX_SLUG_LEN).collect()
}
