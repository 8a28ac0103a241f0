// src/images.rs
//! Downloads remote images once and rewrites article bodies to reference
//! stable local copies.
//!
//! Notion-hosted image URLs are pre-signed and expire; an article saved
//! with them would lose its images weeks later. Localization is a soft
//! operation: any failure leaves the original remote URL in place so the
//! document itself is never lost.

use crate::constants::{DEFAULT_IMAGE_EXTENSION, IMAGE_WEB_PREFIX};
use crate::error::AppError;
use crate::types::ArticleId;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

/// Markdown image syntax with an http(s) target.
static MARKDOWN_IMAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[([^\]]*)\]\((https?://[^\s)]+)\)").expect("valid image regex"));

/// The ability to fetch raw image bytes from a URL.
///
/// A trait so the localizer's caching contract is testable without a
/// network.
#[async_trait::async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, AppError>;
}

/// Production fetcher backed by reqwest.
pub struct HttpImageFetcher {
    client: reqwest::Client,
}

impl HttpImageFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpImageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, AppError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::ImageDownload {
                url: url.to_string(),
                status,
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

/// Ensures single local copies of remote images and rewrites references.
pub struct ImageLocalizer<'a> {
    fetcher: &'a dyn ImageFetcher,
    images_dir: PathBuf,
}

impl<'a> ImageLocalizer<'a> {
    pub fn new(fetcher: &'a dyn ImageFetcher, images_dir: impl Into<PathBuf>) -> Self {
        Self {
            fetcher,
            images_dir: images_dir.into(),
        }
    }

    /// Ensures a local copy of `remote_url` exists and returns the web
    /// path referencing it.
    ///
    /// Non-http(s) URLs pass through unchanged. An existing file of
    /// nonzero size is already-cached: no network call is made. Any
    /// download or filesystem failure falls back to the original remote
    /// URL.
    pub async fn localize(&self, remote_url: &str, article_id: &ArticleId, index: usize) -> String {
        if !remote_url.starts_with("http://") && !remote_url.starts_with("https://") {
            return remote_url.to_string();
        }

        match self.download_once(remote_url, article_id, index).await {
            Ok(web_path) => web_path,
            Err(e) => {
                log::warn!("Image download failed for {}: {}", remote_url, e);
                remote_url.to_string()
            }
        }
    }

    async fn download_once(
        &self,
        remote_url: &str,
        article_id: &ArticleId,
        index: usize,
    ) -> Result<String, AppError> {
        std::fs::create_dir_all(&self.images_dir)?;

        let filename = image_filename(article_id, index, remote_url);
        let filepath = self.images_dir.join(&filename);
        let web_path = format!("{}/{}", IMAGE_WEB_PREFIX, filename);

        // A nonzero-size file is already cached; never re-fetch it.
        if let Ok(metadata) = std::fs::metadata(&filepath) {
            if metadata.len() > 0 {
                return Ok(web_path);
            }
        }

        let bytes = self.fetcher.fetch(remote_url).await?;
        std::fs::write(&filepath, bytes)?;
        log::info!("Saved image {}", web_path);

        Ok(web_path)
    }

    /// Rewrites every `![alt](http…)` construct in the body to reference a
    /// localized copy, preserving alt text verbatim. Images are indexed in
    /// first-seen order starting from 1.
    pub async fn localize_all(&self, body: &str, article_id: &ArticleId) -> String {
        let matches: Vec<(String, String, String)> = MARKDOWN_IMAGE
            .captures_iter(body)
            .map(|caps| {
                (
                    caps[0].to_string(),
                    caps[1].to_string(),
                    caps[2].to_string(),
                )
            })
            .collect();

        let mut result = body.to_string();
        for (index, (construct, alt, url)) in matches.iter().enumerate() {
            let local = self.localize(url, article_id, index + 1).await;
            if local != *url {
                result = result.replace(construct, &format!("![{}]({})", alt, local));
            }
        }

        result
    }
}

/// Derives the deterministic local filename for `(articleId, index)`:
/// sanitized article id, the positional index, and an extension sniffed
/// from the URL path (`.jpg` when the path has none).
fn image_filename(article_id: &ArticleId, index: usize, remote_url: &str) -> String {
    let mut safe_id = article_id.sanitized();
    if safe_id.is_empty() {
        safe_id = "article".to_string();
    }
    format!("{}-{}{}", safe_id, index, extension_from_url(remote_url))
}

fn extension_from_url(remote_url: &str) -> String {
    url::Url::parse(remote_url)
        .ok()
        .and_then(|parsed| {
            Path::new(parsed.path())
                .extension()
                .map(|ext| format!(".{}", ext.to_string_lossy()))
        })
        .unwrap_or_else(|| DEFAULT_IMAGE_EXTENSION.to_string())
}
