//! Text-source collaborators that feed the reader.
//!
//! The core never performs I/O itself. These adapters turn outside material
//! into plain text the segmenter can consume, and report failures as
//! [`crate::error::ServiceError`] so the player can leave the session alone.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ normalize ──▶ Player::load_document
//! (URL/path) (pdfium)   (whitespace)
//!
//! source text ──▶ transform ──▶ normalize ──▶ Player::transform
//!                 (LLM)         (fences, whitespace)
//! ```
//!
//! 1. [`input`]: read a local file or download from a URL
//! 2. [`extract`]: PDF text layer via pdfium (in `spawn_blocking`), or
//!    UTF-8 text files
//! 3. [`transform`]: refine or summarize through an LLM, with optional
//!    retry/backoff; the only stage talking to a model
//! 4. [`normalize`]: deterministic cleanup shared by both paths

pub mod extract;
pub mod input;
pub mod normalize;
pub mod transform;
