//! Replay core: pure post model, heuristics and run-state machine.
mod date;
mod metrics;
mod model;
mod ordering;
mod run_state;
mod slug;
mod url_filter;

pub use date::{parse_date, resolve_date, ParsedDate};
pub use metrics::{
    excerpt, reading_time_minutes, word_count, EXCERPT_MAX_CHARS, WORDS_PER_MINUTE,
};
pub use model::{CleanedPost, ExtractedPost, ImageRef, IndexedPost, MIN_CONTENT_LEN};
pub use ordering::{order_by_date_missing_last, order_for_delivery};
pub use run_state::{advance, RunEvent, RunState};
pub use slug::{slug_from_url_path, slugify, truncate_slug, MAX_SLUG_LEN};
pub use url_filter::{is_slug_like_path, PostUrlFilter, SKIP_PATH_PATTERNS};
