//! Document extraction: binary document → plain text.
//!
//! ## Why spawn_blocking?
//!
//! `pdfium-render` wraps the pdfium C++ library, which keeps thread-local
//! state and does CPU-bound work. Extraction therefore runs on tokio's
//! blocking pool so timer tasks driving playback are never starved while a
//! large book is being read in.
//!
//! Every extractor returns text that has already been through
//! [`normalize::clean_extracted`]: whitespace runs are single spaces before
//! the segmenter sees anything.

use crate::config::ReaderConfig;
use crate::error::ServiceError;
use crate::pipeline::input::ResolvedDocument;
use crate::pipeline::normalize;
use async_trait::async_trait;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Binary document in, plain text out.
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    async fn extract(&self, doc: &ResolvedDocument) -> Result<String, ServiceError>;
}

// ── PDF ──────────────────────────────────────────────────────────────────────

/// Text-layer extraction through pdfium.
#[derive(Debug, Clone, Default)]
pub struct PdfExtractor {
    password: Option<String>,
    library_path: Option<PathBuf>,
}

impl PdfExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ReaderConfig) -> Self {
        Self {
            password: config.password.clone(),
            library_path: config.pdfium_library_path.clone(),
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.library_path = Some(path.into());
        self
    }
}

#[async_trait]
impl DocumentExtractor for PdfExtractor {
    async fn extract(&self, doc: &ResolvedDocument) -> Result<String, ServiceError> {
        if !doc.is_pdf() {
            let mut magic = [0u8; 4];
            let n = doc.bytes.len().min(4);
            magic[..n].copy_from_slice(&doc.bytes[..n]);
            return Err(ServiceError::NotAPdf {
                name: doc.name.clone(),
                magic,
            });
        }

        let name = doc.name.clone();
        let bytes = doc.bytes.clone();
        let password = self.password.clone();
        let library_path = self.library_path.clone();

        let raw = tokio::task::spawn_blocking(move || {
            extract_pdf_blocking(&name, &bytes, password.as_deref(), library_path.as_deref())
        })
        .await
        .map_err(|e| ServiceError::Internal(format!("Extraction task panicked: {e}")))??;

        finish(&doc.name, &raw)
    }
}

fn bind_pdfium(library_path: Option<&Path>) -> Result<Pdfium, ServiceError> {
    let explicit = library_path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os("PDFIUM_LIB_PATH").map(PathBuf::from));

    let bindings = match explicit {
        Some(path) => {
            let lib = if path.is_dir() {
                Pdfium::pdfium_platform_library_name_at_path(&path)
            } else {
                path
            };
            debug!("Binding pdfium from {}", lib.display());
            Pdfium::bind_to_library(&lib)
        }
        None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| ServiceError::PdfiumUnavailable(format!("{e:?}")))?;

    Ok(Pdfium::new(bindings))
}

fn extract_pdf_blocking(
    name: &str,
    bytes: &[u8],
    password: Option<&str>,
    library_path: Option<&Path>,
) -> Result<String, ServiceError> {
    let pdfium = bind_pdfium(library_path)?;

    let document = pdfium
        .load_pdf_from_byte_slice(bytes, password)
        .map_err(|e| {
            let err_str = format!("{e:?}");
            if err_str.contains("Password") || err_str.contains("password") {
                if password.is_some() {
                    ServiceError::WrongPassword {
                        name: name.to_string(),
                    }
                } else {
                    ServiceError::PasswordRequired {
                        name: name.to_string(),
                    }
                }
            } else {
                ServiceError::CorruptDocument {
                    name: name.to_string(),
                    detail: err_str,
                }
            }
        })?;

    let pages = document.pages();
    info!("PDF loaded: {} pages", pages.len());

    let mut full_text = String::new();
    for (idx, page) in pages.iter().enumerate() {
        let text = page.text().map_err(|e| ServiceError::CorruptDocument {
            name: name.to_string(),
            detail: format!("page {}: {e:?}", idx + 1),
        })?;
        let page_text = text.all();
        debug!("Page {}: {} chars of text", idx + 1, page_text.len());
        full_text.push_str(&page_text);
        full_text.push(' ');
    }

    Ok(full_text)
}

// ── Plain text ───────────────────────────────────────────────────────────────

/// UTF-8 text files (invalid sequences are replaced, not rejected).
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

#[async_trait]
impl DocumentExtractor for PlainTextExtractor {
    async fn extract(&self, doc: &ResolvedDocument) -> Result<String, ServiceError> {
        let raw = String::from_utf8_lossy(&doc.bytes);
        finish(&doc.name, &raw)
    }
}

// ── Dispatch ─────────────────────────────────────────────────────────────────

/// Routes `%PDF` documents to [`PdfExtractor`] and everything else to
/// [`PlainTextExtractor`].
#[derive(Debug, Clone, Default)]
pub struct AutoExtractor {
    pdf: PdfExtractor,
}

impl AutoExtractor {
    pub fn new(pdf: PdfExtractor) -> Self {
        Self { pdf }
    }

    pub fn from_config(config: &ReaderConfig) -> Self {
        Self::new(PdfExtractor::from_config(config))
    }
}

#[async_trait]
impl DocumentExtractor for AutoExtractor {
    async fn extract(&self, doc: &ResolvedDocument) -> Result<String, ServiceError> {
        if doc.is_pdf() {
            self.pdf.extract(doc).await
        } else {
            PlainTextExtractor.extract(doc).await
        }
    }
}

fn finish(name: &str, raw: &str) -> Result<String, ServiceError> {
    let cleaned = normalize::clean_extracted(raw);
    if cleaned.is_empty() {
        return Err(ServiceError::EmptyDocument {
            name: name.to_string(),
        });
    }
    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn plain_text_is_collapsed() {
        let doc = ResolvedDocument::new("notes.txt", b"one  two\n\nthree\t".to_vec());
        let text = PlainTextExtractor.extract(&doc).await.unwrap();
        assert_eq!(text, "one two three");
    }

    #[tokio::test]
    async fn blank_text_is_empty_document() {
        let doc = ResolvedDocument::new("blank.txt", b" \n \t ".to_vec());
        let err = PlainTextExtractor.extract(&doc).await.unwrap_err();
        assert!(matches!(err, ServiceError::EmptyDocument { .. }));
    }

    #[tokio::test]
    async fn pdf_extractor_rejects_other_formats() {
        let doc = ResolvedDocument::new("book.epub", b"PK\x03\x04rest".to_vec());
        let err = PdfExtractor::new().extract(&doc).await.unwrap_err();
        match err {
            ServiceError::NotAPdf { name, magic } => {
                assert_eq!(name, "book.epub");
                assert_eq!(&magic, b"PK\x03\x04");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn short_buffers_do_not_panic() {
        let doc = ResolvedDocument::new("tiny", b"%P".to_vec());
        assert!(PdfExtractor::new().extract(&doc).await.is_err());
    }

    #[tokio::test]
    async fn auto_routes_text_to_plain() {
        let doc = ResolvedDocument::new("a.txt", "naïve café".as_bytes().to_vec());
        let text = AutoExtractor::default().extract(&doc).await.unwrap();
        assert_eq!(text, "naïve café");
    }
}
