//! Static media serving module
//!
//! Looks up a file by name in one of the flat media directories and returns
//! it with the category's fixed media type.

use crate::config::PathsConfig;
use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;

/// A flat directory of media served under one URL prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaCategory {
    Images,
    Poem,
    Music,
}

impl MediaCategory {
    pub const ALL: [Self; 3] = [Self::Images, Self::Poem, Self::Music];

    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Images => "/images/",
            Self::Poem => "/poem/",
            Self::Music => "/music/",
        }
    }

    pub const fn media_type(self) -> &'static str {
        match self {
            Self::Images => mime::IMAGE_JPEG,
            Self::Poem | Self::Music => mime::AUDIO_MPEG,
        }
    }

    /// Body of the 404 returned for a missing file
    pub const fn not_found_message(self) -> &'static str {
        match self {
            Self::Images => "Image not found",
            Self::Poem => "Poem not found",
            Self::Music => "Music not found",
        }
    }

    pub fn dir(self, paths: &PathsConfig) -> PathBuf {
        match self {
            Self::Images => paths.resolve(&paths.images_dir),
            Self::Poem => paths.resolve(&paths.poem_dir),
            Self::Music => paths.resolve(&paths.music_dir),
        }
    }

    /// Split a decoded request path into category and filename
    ///
    /// Only a single non-empty segment after the prefix matches.
    pub fn match_path(path: &str) -> Option<(Self, &str)> {
        Self::ALL.into_iter().find_map(|category| {
            let filename = path.strip_prefix(category.prefix())?;
            (!filename.is_empty() && !filename.contains('/')).then_some((category, filename))
        })
    }
}

/// Media file loaded from disk
#[derive(Debug)]
pub struct MediaFile {
    pub content: Vec<u8>,
    pub modified: Option<SystemTime>,
}

/// Serve a media file, or the category's JSON 404
pub async fn serve_media(
    ctx: &RequestContext<'_>,
    paths: &PathsConfig,
    category: MediaCategory,
    filename: &str,
) -> Response<Full<Bytes>> {
    let dir = category.dir(paths);

    match load_media_file(&dir, filename).await {
        Ok(Some(file)) => {
            let etag = cache::generate_etag(&file.content);
            if cache::check_etag_match(ctx.if_none_match.as_deref(), &etag) {
                return http::build_304_response(&etag);
            }
            let last_modified = file.modified.map(cache::http_date);
            http::build_media_response(
                file.content,
                category.media_type(),
                &etag,
                last_modified.as_deref(),
            )
        }
        Ok(None) => http::json_response(
            StatusCode::NOT_FOUND,
            &serde_json::json!({ "error": category.not_found_message() }),
        ),
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read '{filename}' from '{}': {e}",
                dir.display()
            ));
            http::build_500_response()
        }
    }
}

/// Load a file by name from a media directory
///
/// `Ok(None)` when the name does not resolve to a regular file inside
/// `dir`; `Err` only when an existing file cannot be read.
pub async fn load_media_file(dir: &Path, filename: &str) -> io::Result<Option<MediaFile>> {
    let Some(path) = resolve_within(dir, filename).await else {
        return Ok(None);
    };

    let metadata = match fs::metadata(&path).await {
        Ok(m) if m.is_file() => m,
        _ => return Ok(None),
    };

    let content = fs::read(&path).await?;
    Ok(Some(MediaFile {
        content,
        modified: metadata.modified().ok(),
    }))
}

/// Join `filename` onto `dir` and canonicalize, rejecting anything that
/// escapes the directory
async fn resolve_within(dir: &Path, filename: &str) -> Option<PathBuf> {
    let dir_canonical = match fs::canonicalize(dir).await {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Media directory not found or inaccessible '{}': {e}",
                dir.display()
            ));
            return None;
        }
    };

    // File not found is common (404), no need to log at warning level
    let file_canonical = fs::canonicalize(dir.join(filename)).await.ok()?;
    if !file_canonical.starts_with(&dir_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {filename} -> {}",
            file_canonical.display()
        ));
        return None;
    }

    Some(file_canonical)
}
