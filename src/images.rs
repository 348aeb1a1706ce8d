use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::StatusCode;

// ── Constants ────────────────────────────────────────────────────────────────

/// Prefix written in place of a downloaded image's URL.
pub const ASSETS_PREFIX: &str = "assets";

// ── Lazy static regexes ──────────────────────────────────────────────────────

/// `![alt](url)` with no nested brackets in the alt text and no nested
/// parentheses in the URL.
static IMAGE_REF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[[^\[\]]*\]\([^()]*\)").unwrap());

static LEADING_IMAGE_REF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^!\[[^\[\]]*\]\([^()]*\)").unwrap());

// ── Public result types ──────────────────────────────────────────────────────

/// What happened to one image URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOutcome {
    /// Written to `path`; `bytes` is the body length.
    Saved { path: PathBuf, bytes: usize },
    /// Server answered with something other than 200.
    HttpStatus(u16),
    /// Request or body read failed.
    Transport(String),
    /// Download succeeded but the file could not be written.
    Write(String),
}

impl ImageOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, ImageOutcome::Saved { .. })
    }
}

/// One URL found in the document and its outcome.
#[derive(Debug, Clone)]
pub struct ImageReport {
    pub url: String,
    pub filename: String,
    pub outcome: ImageOutcome,
}

/// Rewritten document plus one report per URL, in document order.
#[derive(Debug, Clone)]
pub struct Materialized {
    pub document: String,
    pub images: Vec<ImageReport>,
}

// ── Extraction ───────────────────────────────────────────────────────────────

/// Return the URLs of every markdown image reference in `line`, left to right.
///
/// The URL is whatever sits between the first `(` of a match and the next `)`,
/// so URLs containing `)` are cut short.
pub fn extract_urls(line: &str) -> Vec<String> {
    IMAGE_REF_RE
        .find_iter(line)
        .filter_map(|m| m.as_str().split('(').nth(1))
        .filter_map(|rest| rest.split(')').next())
        .map(str::to_string)
        .collect()
}

/// True when the line begins, at column zero, with an image reference.
pub fn starts_with_image(line: &str) -> bool {
    LEADING_IMAGE_REF_RE.is_match(line)
}

/// Final path segment of a URL.
pub fn file_name_of(url: &str) -> &str {
    url.rsplit_once('/').map_or(url, |(_, name)| name)
}

// ── Materialization ──────────────────────────────────────────────────────────

/// Download every image referenced at the start of a line into `destination`
/// and point the document at the local copies.
///
/// Failed downloads are logged and leave the document untouched for that URL.
pub async fn materialize(
    client: &reqwest::Client,
    document: &str,
    destination: &Path,
) -> Materialized {
    let mut rewritten = document.to_string();
    let mut images = Vec::new();

    for line in document.split('\n') {
        if !starts_with_image(line) {
            continue;
        }
        for url in extract_urls(line) {
            let filename = file_name_of(&url).to_string();
            let target = destination.join(&filename);
            tracing::info!("downloading {} to {}", url, target.display());

            let outcome = download(client, &url, &target).await;
            match &outcome {
                ImageOutcome::Saved { .. } => {
                    let local = format!("{}/{}", ASSETS_PREFIX, filename);
                    rewritten = rewritten.replace(&url, &local);
                }
                ImageOutcome::HttpStatus(status) => {
                    tracing::warn!("error downloading {}: HTTP {}", url, status);
                }
                ImageOutcome::Transport(err) => {
                    tracing::warn!("error downloading {}: {}", url, err);
                }
                ImageOutcome::Write(err) => {
                    tracing::warn!("error saving {} to {}: {}", url, target.display(), err);
                }
            }
            images.push(ImageReport {
                url,
                filename,
                outcome,
            });
        }
    }

    Materialized {
        document: rewritten,
        images,
    }
}

/// Like [`materialize`], keeping only the rewritten document.
pub async fn materialize_images(
    client: &reqwest::Client,
    document: &str,
    destination: &Path,
) -> String {
    materialize(client, document, destination).await.document
}

async fn download(client: &reqwest::Client, url: &str, target: &Path) -> ImageOutcome {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => return ImageOutcome::Transport(e.to_string()),
    };

    if response.status() != StatusCode::OK {
        return ImageOutcome::HttpStatus(response.status().as_u16());
    }

    let bytes = match response.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => return ImageOutcome::Transport(e.to_string()),
    };

    match tokio::fs::write(target, &bytes).await {
        Ok(()) => ImageOutcome::Saved {
            path: target.to_path_buf(),
            bytes: bytes.len(),
        },
        Err(e) => ImageOutcome::Write(e.to_string()),
    }
}
