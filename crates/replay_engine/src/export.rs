use std::fs;
use std::path::{Path, PathBuf};

use replay_core::{CleanedPost, ExtractedPost, ImageRef, IndexedPost};
use replay_logging::replay_info;
use serde::Serialize;

use crate::normalize::Normalizer;
use crate::persist::{AtomicFileWriter, PersistError};

const CLEANED_SUFFIX: &str = "_cleaned.json";
const IMAGES_SUFFIX: &str = "_images.json";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("json error in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedExport {
    pub post_count: usize,
    pub output_path: PathBuf,
    /// Written only when at least one image was found.
    pub images_path: Option<PathBuf>,
    pub image_count: usize,
}

/// Number `posts` from 1 in delivery order and write them as a JSON array.
pub fn write_raw_posts(path: &Path, posts: &[ExtractedPost]) -> Result<PathBuf, ExportError> {
    let records = IndexedPost::number_all(posts.iter());
    write_json(path, &records)
}

pub fn read_raw_posts(path: &Path) -> Result<Vec<IndexedPost<ExtractedPost>>, ExportError> {
    let display = path.display().to_string();
    let content = fs::read_to_string(path).map_err(|source| ExportError::Io {
        path: display.clone(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ExportError::Json {
        path: display,
        source,
    })
}

/// Normalize every record that has content, keeping its `post_index`.
pub fn clean_posts(
    normalizer: &Normalizer,
    posts: Vec<IndexedPost<ExtractedPost>>,
) -> Vec<IndexedPost<CleanedPost>> {
    posts
        .into_iter()
        .filter(|record| !record.post.content_html.is_empty())
        .map(|record| IndexedPost {
            post: normalizer.clean_post(record.post),
            post_index: record.post_index,
        })
        .collect()
}

/// Write cleaned records to `path`, plus the aggregated image list beside it.
pub fn write_cleaned_posts(
    path: &Path,
    posts: &[IndexedPost<CleanedPost>],
) -> Result<CleanedExport, ExportError> {
    let output_path = write_json(path, posts)?;

    let images: Vec<&ImageRef> = posts.iter().flat_map(|r| r.post.images.iter()).collect();
    let images_path = if images.is_empty() {
        None
    } else {
        Some(write_json(&images_path_for(path), &images)?)
    };
    replay_info!(
        "Saved {} cleaned posts and {} image URLs",
        posts.len(),
        images.len()
    );

    Ok(CleanedExport {
        post_count: posts.len(),
        output_path,
        images_path,
        image_count: images.len(),
    })
}

/// `posts.json` -> `posts_cleaned.json`.
pub fn cleaned_path_for(input: &Path) -> PathBuf {
    with_json_suffix(input, CLEANED_SUFFIX)
}

/// `posts_cleaned.json` -> `posts_cleaned_images.json`.
pub fn images_path_for(cleaned: &Path) -> PathBuf {
    with_json_suffix(cleaned, IMAGES_SUFFIX)
}

fn with_json_suffix(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{stem}{suffix}"))
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<PathBuf, ExportError> {
    let json = serde_json::to_string_pretty(value).map_err(|source| ExportError::Json {
        path: path.display().to_string(),
        source,
    })?;
    let (writer, filename) = AtomicFileWriter::for_path(path)?;
    Ok(writer.write(&filename, &json)?)
}
