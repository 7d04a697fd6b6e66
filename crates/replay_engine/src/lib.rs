//! Replay engine: fetching, post discovery, extraction and normalization.
mod curated;
mod decode;
mod export;
mod extract;
mod fetch;
pub mod normalize;
mod orchestrator;
mod persist;
mod retry;
pub mod strategy;
mod themed_index;
mod types;

pub use curated::{CuratedCollector, CuratedLink, MAX_EXTRACTED_TITLE_CHARS};
pub use decode::{decode_html, decode_html_lossy, DecodeError, DecodedHtml};
pub use export::{
    clean_posts, cleaned_path_for, images_path_for, read_raw_posts, write_cleaned_posts,
    write_raw_posts, CleanedExport, ExportError,
};
pub use extract::{
    extract_title, find_published_at, main_content, ArticleExtractor, ReadabilityExtractor,
    DATE_META_CANDIDATES,
};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher, ACCEPT_HTML, USER_AGENT};
pub use normalize::{NormalizeOptions, NormalizedContent, Normalizer};
pub use orchestrator::{Orchestrator, RunReport};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use retry::{safe_fetch, RetryPolicy, RetryingFetcher};
pub use strategy::{DiscoverySettings, SiteContext, Strategy, StrategyError};
pub use themed_index::{parse_index, IndexEntry, ThemedIndex};
pub use types::{FailureKind, FetchError, FetchMetadata, FetchOutput};
