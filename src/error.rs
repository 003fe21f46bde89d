//! Error types for the focusread library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`FocusReadError`] — **Fatal / contract**: the caller asked for something
//!   the core cannot represent (a speed outside the closed set, an invalid
//!   configuration, a scheduler with no async runtime). These are programming
//!   errors and are returned immediately.
//!
//! * [`ServiceError`] — **Non-fatal**: a text-source collaborator (document
//!   extraction, AI transformation) failed. The reading session is left
//!   exactly as it was, a transient status message is shown, and the reader
//!   can retry or keep reading the previously loaded text.

use std::path::PathBuf;
use thiserror::Error;

/// Contract violations and setup failures.
#[derive(Debug, Error)]
pub enum FocusReadError {
    /// A WPM value outside {300, 500, 700, 900} was supplied.
    #[error("Unsupported speed {wpm} WPM: choose one of 300, 500, 700, 900")]
    InvalidSpeed { wpm: u32 },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A tokio-backed scheduler was requested outside a runtime.
    #[error("No async runtime available: {0}")]
    NoRuntime(String),

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A failure reported by a text-source collaborator.
///
/// Returned from [`crate::player::Player::load_document`] and
/// [`crate::player::Player::transform`]; the session state is never touched
/// when one of these is produced.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum ServiceError {
    // ── Input errors ──────────────────────────────────────────────────────
    #[error("File not found: '{path}'")]
    FileNotFound { path: PathBuf },

    #[error("Permission denied reading '{path}'")]
    PermissionDenied { path: PathBuf },

    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    #[error("Failed to download '{url}': {reason}")]
    DownloadFailed { url: String, reason: String },

    #[error("Download timed out after {secs}s for '{url}'")]
    DownloadTimeout { url: String, secs: u64 },

    // ── Document errors ───────────────────────────────────────────────────
    #[error("'{name}' is not a PDF (first bytes: {magic:?})")]
    NotAPdf { name: String, magic: [u8; 4] },

    #[error("Document '{name}' is corrupt: {detail}")]
    CorruptDocument { name: String, detail: String },

    #[error("Document '{name}' is encrypted and requires a password")]
    PasswordRequired { name: String },

    #[error("Wrong password for document '{name}'")]
    WrongPassword { name: String },

    /// Could not bind to a pdfium shared library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium or install pdfium system-wide."
    )]
    PdfiumUnavailable(String),

    /// Extraction succeeded but produced no readable words.
    #[error("No readable text found in '{name}'")]
    EmptyDocument { name: String },

    // ── LLM errors ────────────────────────────────────────────────────────
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    #[error("LLM API error: {message}")]
    LlmApiError { message: String },

    #[error("LLM call timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The provider answered with nothing usable.
    #[error("LLM returned an empty response")]
    EmptyResponse,

    // ── Player errors ─────────────────────────────────────────────────────
    /// Another collaborator call is still running for this player.
    #[error("Another text source is still being processed")]
    Busy,

    /// Transformation requested with no source text loaded.
    #[error("No text loaded to transform")]
    NothingToTransform,

    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_speed_display_lists_choices() {
        let e = FocusReadError::InvalidSpeed { wpm: 450 };
        let msg = e.to_string();
        assert!(msg.contains("450"), "got: {msg}");
        assert!(msg.contains("300, 500, 700, 900"), "got: {msg}");
    }

    #[test]
    fn not_a_pdf_display() {
        let e = ServiceError::NotAPdf {
            name: "notes.docx".into(),
            magic: *b"PK\x03\x04",
        };
        assert!(e.to_string().contains("notes.docx"));
    }

    #[test]
    fn timeout_display() {
        let e = ServiceError::Timeout { secs: 60 };
        assert!(e.to_string().contains("60s"));
    }

    #[test]
    fn provider_not_configured_display() {
        let e = ServiceError::ProviderNotConfigured {
            provider: "gemini".into(),
            hint: "GEMINI_API_KEY is not set".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("gemini"));
        assert!(msg.contains("GEMINI_API_KEY"));
    }

    #[test]
    fn service_error_serialises() {
        let e = ServiceError::DownloadTimeout {
            url: "https://example.org/a.pdf".into(),
            secs: 5,
        };
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains("DownloadTimeout"), "got: {json}");
    }
}
