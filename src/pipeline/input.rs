//! Input resolution: turn a user-supplied path or URL into document bytes.
//!
//! Local files are checked for existence and read permission up front so the
//! caller gets a precise [`ServiceError`] instead of an opaque I/O failure.
//! URLs are fetched with `reqwest` under the configured timeout.

use crate::error::ServiceError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// A document ready for extraction.
#[derive(Debug, Clone)]
pub struct ResolvedDocument {
    /// File name used in status messages ("Extracting text from NAME...").
    pub name: String,
    pub bytes: Vec<u8>,
}

impl ResolvedDocument {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub fn is_pdf(&self) -> bool {
        looks_like_pdf(&self.bytes)
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// `%PDF` magic at the start of the buffer.
pub fn looks_like_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(b"%PDF")
}

/// Display name for `input` without touching the filesystem or network.
pub fn display_name(input: &str) -> String {
    if is_url(input) {
        return filename_from_url(input);
    }
    Path::new(input)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.to_string())
}

/// Resolve the input string to document bytes.
pub async fn resolve_input(
    input: &str,
    timeout_secs: u64,
) -> Result<ResolvedDocument, ServiceError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ServiceError::InvalidInput {
            input: input.to_string(),
        });
    }
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        read_local(input).await
    }
}

async fn read_local(path_str: &str) -> Result<ResolvedDocument, ServiceError> {
    let path = PathBuf::from(path_str);

    let bytes = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => ServiceError::FileNotFound { path: path.clone() },
        ErrorKind::PermissionDenied => ServiceError::PermissionDenied { path: path.clone() },
        _ => ServiceError::Internal(format!("reading {}: {e}", path.display())),
    })?;

    debug!("Read local document: {} ({} bytes)", path.display(), bytes.len());
    Ok(ResolvedDocument::new(display_name(path_str), bytes))
}

async fn download_url(url: &str, timeout_secs: u64) -> Result<ResolvedDocument, ServiceError> {
    info!("Downloading document from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| ServiceError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let classify = |e: reqwest::Error| {
        if e.is_timeout() {
            ServiceError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            ServiceError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    };

    let response = client.get(url).send().await.map_err(classify)?;

    if !response.status().is_success() {
        return Err(ServiceError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response.bytes().await.map_err(classify)?;
    info!("Downloaded {} bytes", bytes.len());

    Ok(ResolvedDocument::new(filename_from_url(url), bytes.to_vec()))
}

fn filename_from_url(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() {
                    return last.to_string();
                }
            }
        }
    }
    "downloaded.pdf".to_string()
}
