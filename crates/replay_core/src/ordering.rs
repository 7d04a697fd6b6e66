use crate::ExtractedPost;

/// Final ordering applied by the orchestrator: oldest first, undated posts
/// before dated ones, ties broken by URL. Stable.
pub fn order_for_delivery(posts: &mut [ExtractedPost]) {
    posts.sort_by(|a, b| {
        let left = (a.published_at.as_deref().unwrap_or(""), a.url.as_str());
        let right = (b.published_at.as_deref().unwrap_or(""), b.url.as_str());
        left.cmp(&right)
    });
}

/// Ordering used by the themed-index collector: oldest first, undated posts
/// sort after every dated one. Stable.
// NOTE: undated posts sort last here but first in `order_for_delivery`.
pub fn order_by_date_missing_last(posts: &mut [ExtractedPost]) {
    posts.sort_by(|a, b| {
        let left = (a.published_at.as_deref().unwrap_or("9999"), a.url.as_str());
        let right = (b.published_at.as_deref().unwrap_or("9999"), b.url.as_str());
        left.cmp(&right)
    });
}
