//! End-to-end integration tests for focusread.
//!
//! These tests need a pdfium library, PDF files in `./test_cases/`, network
//! access and, for the AI tests, a configured LLM provider. They are gated
//! behind the `E2E_ENABLED` environment variable so they do not run in CI
//! unless explicitly requested.
//!
//! Run with:
//!   E2E_ENABLED=1 PDFIUM_LIB_PATH=. cargo test --test e2e -- --nocapture

use focusread::{
    AutoExtractor, DocumentExtractor, LlmTransformer, ManualScheduler, PdfExtractor,
    PlaybackState, Player, ReaderConfig, ServiceError, TextTransformer, TransformKind,
    DEFAULT_TEXT,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn test_cases_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases")
}

/// Skip this test if E2E_ENABLED is not set *or* no file at `path`.
macro_rules! e2e_skip_unless_ready {
    ($path:expr) => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        let p: PathBuf = $path;
        if !p.exists() {
            println!("SKIP — test file not found: {}", p.display());
            return;
        }
        p
    }};
}

macro_rules! e2e_skip {
    () => {
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
    };
}

/// Text handed to the segmenter must be single-spaced plain words.
fn assert_reader_ready(text: &str, context: &str) {
    assert!(!text.is_empty(), "[{context}] text is empty");
    assert_eq!(text, text.trim(), "[{context}] text is not trimmed");
    assert!(!text.contains("  "), "[{context}] double space survived");
    assert!(!text.contains('\n'), "[{context}] newline survived");
    assert!(!text.starts_with("```"), "[{context}] code fence survived");
    for ch in ['\u{200B}', '\u{FEFF}', '\u{00AD}'] {
        assert!(
            !text.contains(ch),
            "[{context}] invisible char U+{:04X} survived",
            ch as u32
        );
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn manual_player(config: &ReaderConfig) -> Player {
    init_tracing();
    Player::new(config, Arc::new(ManualScheduler::new()))
}

// ── PDF extraction ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_extract_arxiv_paper() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("attention_is_all_you_need.pdf"));
    init_tracing();

    let doc = focusread::resolve_input(path.to_str().unwrap(), 30)
        .await
        .expect("resolve_input should succeed");
    let text = PdfExtractor::new()
        .extract(&doc)
        .await
        .expect("extract should succeed");

    assert_reader_ready(&text, "attention");
    assert!(text.contains("Attention"), "title word missing");
    println!("Extracted {} chars", text.len());
}

#[tokio::test]
async fn test_player_loads_pdf() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("attention_is_all_you_need.pdf"));

    let config = ReaderConfig::default();
    let player = manual_player(&config);
    let words = player
        .load_document(&AutoExtractor::from_config(&config), path.to_str().unwrap())
        .await
        .expect("load_document should succeed");

    assert!(words > 1000, "expected a full paper, got {words} words");
    assert_eq!(player.state(), PlaybackState::Paused);
    assert_eq!(player.frame().index, 0);
    assert_eq!(player.status(), None);
}

#[tokio::test]
async fn test_download_pdf_from_url() {
    e2e_skip!();

    let config = ReaderConfig::default();
    let player = manual_player(&config);
    let words = player
        .load_document(
            &AutoExtractor::from_config(&config),
            "https://arxiv.org/pdf/1706.03762",
        )
        .await
        .expect("download + extract should succeed");
    assert!(words > 1000);
}

#[tokio::test]
async fn test_text_file_is_not_a_pdf() {
    e2e_skip!();

    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml");
    let doc = focusread::resolve_input(path.to_str().unwrap(), 30)
        .await
        .unwrap();
    let err = PdfExtractor::new().extract(&doc).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotAPdf { .. }), "got: {err:?}");
}

// ── AI transformation (need LLM API) ─────────────────────────────────────────

#[tokio::test]
async fn test_summarize_default_text() {
    e2e_skip!();

    let config = ReaderConfig::builder().max_tokens(512).build().unwrap();
    let transformer = match LlmTransformer::from_config(&config) {
        Ok(t) => t,
        Err(e) => {
            println!("SKIP — no LLM provider: {e}");
            return;
        }
    };

    init_tracing();
    let summary = transformer
        .transform(DEFAULT_TEXT, TransformKind::Summarize)
        .await
        .expect("summarize should succeed");

    assert_reader_ready(&summary, "summary");
    assert!(
        summary.len() < DEFAULT_TEXT.len(),
        "summary is not shorter than the source"
    );
    println!("Summary: {summary}");
}

#[tokio::test]
async fn test_player_refines_loaded_text() {
    e2e_skip!();

    let config = ReaderConfig::builder().max_tokens(1024).build().unwrap();
    let transformer = match LlmTransformer::from_config(&config) {
        Ok(t) => t,
        Err(e) => {
            println!("SKIP — no LLM provider: {e}");
            return;
        }
    };

    let player = manual_player(&config);
    player.load_text(DEFAULT_TEXT);
    let words = player
        .transform(&transformer, TransformKind::Refine)
        .await
        .expect("refine should succeed");

    assert!(words > 10);
    assert_ne!(player.source_text(), DEFAULT_TEXT);
    assert_reader_ready(&player.source_text(), "refined");
}

#[tokio::test]
async fn test_unknown_provider_is_not_configured() {
    e2e_skip!();

    let config = ReaderConfig::builder()
        .provider_name("no-such-provider")
        .build()
        .unwrap();
    match LlmTransformer::from_config(&config) {
        Err(ServiceError::ProviderNotConfigured { provider, .. }) => {
            assert_eq!(provider, "no-such-provider")
        }
        Err(other) => panic!("unexpected error: {other:?}"),
        Ok(_) => println!("provider factory accepted an unknown name; nothing to check"),
    }
}
